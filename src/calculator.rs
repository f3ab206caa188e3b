//! Repayment math for the two supported schedules.
//!
//! - **Equal installment (本息平均攤還)**: the total payment is the same every
//!   period; the interest share shrinks as the balance is paid down.
//! - **Equal principal (本金平均攤還)**: the principal repaid is the same every
//!   period, so the total payment declines along with the interest.
//!
//! The calculator is total over numeric input: anything unusable is replaced
//! by a documented default before the math runs.

use log::debug;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::catalog::{BASE_UNITS_PER_PRINCIPAL_UNIT, Catalog};
use crate::error::LoanResult;

/// Principal used when the supplied amount is not a finite positive number.
pub const DEFAULT_PRINCIPAL_UNITS: Decimal = dec!(100);

/// Annual rate percentage used when the supplied rate is not finite or negative.
pub const DEFAULT_ANNUAL_RATE_PERCENT: Decimal = dec!(1.67);

/// Term used when the supplied term is not a positive number of years.
pub const DEFAULT_TERM_YEARS: u32 = 5;

/// Largest annual rate percentage the calculator accepts; higher rates are capped.
pub const MAX_ANNUAL_RATE_PERCENT: Decimal = dec!(1000);

/// Largest principal, in units of 10,000, the calculator accepts; larger amounts are capped.
pub const MAX_PRINCIPAL_UNITS: Decimal = dec!(1_000_000_000_000);

const MONTHS_PER_YEAR: u32 = 12;

/// Repayment schedule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RepaymentMethod {
    /// Constant total payment per period (annuity).
    #[default]
    EqualInstallment,
    /// Constant principal per period, declining interest.
    EqualPrincipal,
}

/// Input parameters for a single calculation.
///
/// Principal and term are expected to be clamped to the product caps by the
/// caller; the calculator only guards against unusable numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationInput {
    pub product_code: String,
    /// Principal in units of 10,000.
    pub principal_units: f64,
    /// Annual rate as a percentage (e.g., 2.0 for 2%).
    pub annual_rate_percent: f64,
    pub term_years: u32,
    pub method: RepaymentMethod,
}

/// Payment details for a single period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodPayment {
    /// 1-based period index.
    pub period: u32,
    /// Total paid this period.
    pub payment: Decimal,
    /// The portion of the payment that reduces the balance.
    pub principal_portion: Decimal,
    /// The portion of the payment that covers interest.
    pub interest_portion: Decimal,
    /// Balance left after this period's payment.
    pub closing_balance: Decimal,
}

/// Outcome of a calculation. Monetary fields are in base currency units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub product_display_name: String,
    pub method: RepaymentMethod,
    /// Payment per period; for equal principal this is the first (largest) payment.
    pub monthly_payment: Decimal,
    pub total_principal: Decimal,
    pub total_interest: Decimal,
    /// Always `total_principal + total_interest`.
    pub total_payment: Decimal,
    pub period_count: u32,
    /// Principal share of the total payment, in percent, one decimal.
    pub principal_ratio: Decimal,
    /// Interest share of the total payment, in percent, one decimal.
    pub interest_ratio: Decimal,
    pub schedule: Vec<PeriodPayment>,
}

/// Loan terms after defaults have been applied.
#[derive(Debug, Clone, Copy, PartialEq)]
struct LoanTerms {
    principal: Decimal,
    monthly_rate: Decimal,
    period_count: u32,
}

/// Unrounded totals produced by one of the repayment methods.
struct Amortization {
    monthly_payment: Decimal,
    total_interest: Decimal,
    schedule: Vec<PeriodPayment>,
}

/// Stateless calculator bound to an injected catalog.
#[derive(Debug, Clone, Default)]
pub struct Calculator {
    catalog: Catalog,
}

impl Calculator {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Computes payments and totals for `input`.
    ///
    /// # Errors
    ///
    /// Returns [`LoanError::UnknownProduct`](crate::LoanError::UnknownProduct)
    /// if the product code is not in the catalog. Numeric fields never fail.
    pub fn calculate(&self, input: &CalculationInput) -> LoanResult<CalculationResult> {
        let product = self.catalog.resolve(&input.product_code)?;
        let terms = sanitize(input);

        let amortization = match input.method {
            RepaymentMethod::EqualInstallment => equal_installment(terms),
            RepaymentMethod::EqualPrincipal => equal_principal(terms),
        };

        let total_principal = terms.principal.round_dp(2);
        let mut total_interest = amortization.total_interest.round_dp(2);
        if total_interest.is_sign_negative() {
            total_interest = Decimal::ZERO;
        }
        let total_payment = total_principal + total_interest;
        let (principal_ratio, interest_ratio) =
            ratios(total_principal, total_interest, total_payment);

        Ok(CalculationResult {
            product_display_name: product.display_name.clone(),
            method: input.method,
            monthly_payment: amortization.monthly_payment.round_dp(2),
            total_principal,
            total_interest,
            total_payment,
            period_count: terms.period_count,
            principal_ratio,
            interest_ratio,
            schedule: amortization.schedule,
        })
    }
}

fn sanitize(input: &CalculationInput) -> LoanTerms {
    let principal_units = if input.principal_units.is_finite() && input.principal_units > 0.0 {
        bounded(input.principal_units, MAX_PRINCIPAL_UNITS)
            .filter(|units| !units.is_zero())
            .unwrap_or(DEFAULT_PRINCIPAL_UNITS)
    } else {
        debug!(
            "Principal {} unusable, using {}",
            input.principal_units, DEFAULT_PRINCIPAL_UNITS
        );
        DEFAULT_PRINCIPAL_UNITS
    };
    let principal = principal_units * BASE_UNITS_PER_PRINCIPAL_UNIT;

    let annual_rate_percent =
        if input.annual_rate_percent.is_finite() && input.annual_rate_percent >= 0.0 {
            bounded(input.annual_rate_percent, MAX_ANNUAL_RATE_PERCENT)
                .unwrap_or(DEFAULT_ANNUAL_RATE_PERCENT)
        } else {
            debug!(
                "Rate {} unusable, using {}",
                input.annual_rate_percent, DEFAULT_ANNUAL_RATE_PERCENT
            );
            DEFAULT_ANNUAL_RATE_PERCENT
        };
    if principal_units == MAX_PRINCIPAL_UNITS || annual_rate_percent == MAX_ANNUAL_RATE_PERCENT {
        debug!(
            "Calculating at limit: {} units at {}%",
            principal_units, annual_rate_percent
        );
    }
    let monthly_rate = annual_rate_percent / dec!(100) / Decimal::from(MONTHS_PER_YEAR);

    let period_count = Some(input.term_years)
        .filter(|years| *years > 0)
        .and_then(|years| years.checked_mul(MONTHS_PER_YEAR))
        .unwrap_or_else(|| {
            debug!("Term {} unusable, using {} years", input.term_years, DEFAULT_TERM_YEARS);
            DEFAULT_TERM_YEARS * MONTHS_PER_YEAR
        });

    LoanTerms {
        principal,
        monthly_rate,
        period_count,
    }
}

/// Converts a finite, non-negative `value`, capping it at `limit`.
fn bounded(value: f64, limit: Decimal) -> Option<Decimal> {
    match Decimal::from_f64(value) {
        Some(decimal) if decimal <= limit => Some(decimal),
        Some(_) => Some(limit),
        // Too large for Decimal.
        None if value > 1.0 => Some(limit),
        None => None,
    }
}

/// Annuity payment: PMT = P * [i(1 + i)^n] / [(1 + i)^n – 1],
/// evaluated as P * i / [1 - (1 + i)^-n].
fn equal_installment(terms: LoanTerms) -> Amortization {
    let LoanTerms {
        principal,
        monthly_rate,
        period_count,
    } = terms;
    let periods = Decimal::from(period_count);

    let monthly_payment = if monthly_rate.is_zero() {
        principal / periods
    } else {
        match (Decimal::ONE + monthly_rate).checked_powu(period_count.into()) {
            Some(growth) => {
                let annuity_factor = Decimal::ONE - Decimal::ONE / growth;
                if annuity_factor > Decimal::ZERO {
                    principal * monthly_rate / annuity_factor
                } else {
                    // Rate below Decimal precision.
                    principal / periods
                }
            }
            // (1 + i)^n too large to represent: the payment has converged to P * i.
            None => principal * monthly_rate,
        }
    };

    let total_payment = monthly_payment * periods;
    let total_interest = if monthly_rate.is_zero() {
        Decimal::ZERO
    } else {
        total_payment - principal
    };

    let mut balance = principal;
    let mut schedule = Vec::with_capacity(period_count as usize);
    for period in 1..=period_count {
        let interest_portion = balance * monthly_rate;
        let principal_portion = monthly_payment - interest_portion;
        balance -= principal_portion;
        schedule.push(PeriodPayment {
            period,
            payment: monthly_payment,
            principal_portion,
            interest_portion,
            closing_balance: balance.max(Decimal::ZERO),
        });
    }

    Amortization {
        monthly_payment,
        total_interest,
        schedule,
    }
}

/// Constant principal; interest accrues on the declining balance each period.
fn equal_principal(terms: LoanTerms) -> Amortization {
    let LoanTerms {
        principal,
        monthly_rate,
        period_count,
    } = terms;
    let period_principal = principal / Decimal::from(period_count);

    let mut total_interest = Decimal::ZERO;
    let mut schedule = Vec::with_capacity(period_count as usize);
    for period in 1..=period_count {
        let remaining = principal - period_principal * Decimal::from(period - 1);
        let interest_portion = remaining * monthly_rate;
        total_interest += interest_portion;
        schedule.push(PeriodPayment {
            period,
            payment: period_principal + interest_portion,
            principal_portion: period_principal,
            interest_portion,
            closing_balance: (remaining - period_principal).max(Decimal::ZERO),
        });
    }

    Amortization {
        monthly_payment: period_principal + principal * monthly_rate,
        total_interest,
        schedule,
    }
}

fn ratios(
    total_principal: Decimal,
    total_interest: Decimal,
    total_payment: Decimal,
) -> (Decimal, Decimal) {
    if total_payment.is_zero() {
        return (Decimal::ZERO, Decimal::ZERO);
    }

    let percent = |part: Decimal| {
        (part / total_payment * dec!(100))
            .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
    };
    (percent(total_principal), percent(total_interest))
}
