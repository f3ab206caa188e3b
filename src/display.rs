//! Rendering of a [`CalculationResult`] into the strings the result panel shows.

use std::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::calculator::{CalculationResult, RepaymentMethod};

/// Whole-currency amount with comma grouping, e.g. `$1,104,161`.
pub fn format_currency(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let digits = rounded.abs().trunc().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

/// Percentage with one decimal, e.g. `90.6%`.
pub fn format_percent(value: Decimal) -> String {
    format!("{:.1}%", value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero))
}

/// Two-segment principal/interest bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProportionBar {
    /// Width of the principal segment, in percent of the bar.
    pub principal_width: Decimal,
    /// Width of the interest segment, in percent of the bar.
    pub interest_width: Decimal,
    pub principal_label: String,
    pub interest_label: String,
}

impl ProportionBar {
    pub fn new(principal_ratio: Decimal, interest_ratio: Decimal) -> Self {
        Self {
            principal_width: principal_ratio,
            interest_width: interest_ratio,
            principal_label: format!("本金 {}", format_percent(principal_ratio)),
            interest_label: format!("利息 {}", format_percent(interest_ratio)),
        }
    }

    /// Text bar of `width` cells, principal drawn with `█` and interest with `░`.
    pub fn render(&self, width: usize) -> String {
        let total = self.principal_width + self.interest_width;
        let filled = if total.is_zero() {
            0
        } else {
            let share = self.principal_width / total * Decimal::from(width);
            share
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                .to_usize()
                .unwrap_or(0)
                .min(width)
        };
        format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
    }
}

/// Display strings for the result panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultView {
    pub loan_type: String,
    pub method: String,
    pub monthly_payment: String,
    pub principal: String,
    pub total_interest: String,
    pub total_payment: String,
    pub periods: String,
    pub chart: ProportionBar,
}

impl From<&CalculationResult> for ResultView {
    fn from(result: &CalculationResult) -> Self {
        let method = match result.method {
            RepaymentMethod::EqualInstallment => "本息平均攤還",
            RepaymentMethod::EqualPrincipal => "本金平均攤還",
        };

        Self {
            loan_type: result.product_display_name.clone(),
            method: method.to_string(),
            monthly_payment: format_currency(result.monthly_payment),
            principal: format_currency(result.total_principal),
            total_interest: format_currency(result.total_interest),
            total_payment: format_currency(result.total_payment),
            periods: format!("{} 期", result.period_count),
            chart: ProportionBar::new(result.principal_ratio, result.interest_ratio),
        }
    }
}

impl fmt::Display for ResultView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({})", self.loan_type, self.method)?;
        writeln!(f, "  Monthly payment: {}", self.monthly_payment)?;
        writeln!(f, "  Principal:       {}", self.principal)?;
        writeln!(f, "  Total interest:  {}", self.total_interest)?;
        writeln!(f, "  Total payment:   {}", self.total_payment)?;
        writeln!(f, "  Periods:         {}", self.periods)?;
        write!(
            f,
            "  {} {} {}",
            self.chart.principal_label,
            self.chart.render(40),
            self.chart.interest_label
        )
    }
}
