//! `tw_loan_calc` computes repayment figures for a small catalog of policy loan products.
//!
//! Two amortization methods are supported:
//! - **Equal installment (本息平均攤還)**: the same total payment every month,
//!   with the interest share shrinking over time.
//! - **Equal principal (本金平均攤還)**: the same principal repaid every month,
//!   leading to decreasing total payments over time.
//!
//! Amounts are entered in units of 10,000 (萬) and reported in base currency.
//! The calculator never rejects numeric input: unusable values fall back to
//! a principal of 100 units, a rate of 1.67% and a term of 5 years.
//!
//! ## Usage
//!
//! ```rust
//! use tw_loan_calc::{CalculationInput, Calculator, Catalog, RepaymentMethod, ResultView};
//!
//! let calculator = Calculator::new(Catalog::builtin());
//! let input = CalculationInput {
//!     product_code: "sme".to_string(),
//!     principal_units: 100.0,
//!     annual_rate_percent: 2.0,
//!     term_years: 10,
//!     method: RepaymentMethod::EqualInstallment,
//! };
//!
//! match calculator.calculate(&input) {
//!     Ok(result) => {
//!         println!("Monthly payment: {:.2}", result.monthly_payment);
//!         println!("Total interest:  {:.2}", result.total_interest);
//!         println!("{}", ResultView::from(&result));
//!     }
//!     Err(e) => {
//!         eprintln!("Error calculating repayment: {}", e);
//!     }
//! }
//! ```

pub mod calculator;
pub mod catalog;
pub mod consult;
pub mod display;
pub mod error;
pub mod form;

pub use calculator::{
    CalculationInput, CalculationResult, Calculator, PeriodPayment, RepaymentMethod,
    DEFAULT_ANNUAL_RATE_PERCENT, DEFAULT_PRINCIPAL_UNITS, DEFAULT_TERM_YEARS,
    MAX_ANNUAL_RATE_PERCENT, MAX_PRINCIPAL_UNITS,
};
pub use catalog::{Catalog, LoanProduct, BASE_UNITS_PER_PRINCIPAL_UNIT};
pub use consult::{ConsultationError, ConsultationRequest};
pub use display::{format_currency, format_percent, ProportionBar, ResultView};
pub use error::{LoanError, LoanResult};
pub use form::{CalculatorForm, QuickQuote, QuoteError};
