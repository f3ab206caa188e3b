//! Calculator panel state: product selector, amount/term fields with their
//! sliders, the rate field and the repayment method toggle.
//!
//! Field text is parsed leniently the way browsers hand it over (leading
//! numeric prefix wins) and amount/term are kept inside the selected
//! product's caps. The rate field is passed through untouched so the
//! calculator's own defaults apply to it.

use std::sync::LazyLock;

use log::debug;
use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use thiserror::Error;

use crate::calculator::{CalculationInput, CalculationResult, Calculator, RepaymentMethod};
use crate::catalog::{Catalog, LoanProduct};
use crate::error::{LoanError, LoanResult};

const INITIAL_AMOUNT_UNITS: u32 = 100;
const INITIAL_TERM_YEARS: u32 = 5;
const QUICK_QUOTE_MAX_DEFAULT_TERM: u32 = 5;

static LEADING_INT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*([+-]?\d+)").unwrap());
static LEADING_FLOAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)").unwrap());

/// Integer prefix of `text`, or `None` when it does not start with digits.
pub fn parse_leading_int(text: &str) -> Option<i64> {
    let caps = LEADING_INT.captures(text)?;
    let digits = caps.get(1)?.as_str();
    // Overlong digit runs saturate instead of failing.
    digits.parse::<i64>().ok().or_else(|| {
        if digits.starts_with('-') {
            Some(i64::MIN)
        } else {
            Some(i64::MAX)
        }
    })
}

/// Float prefix of `text`, or NaN when there is none.
pub fn parse_leading_float(text: &str) -> f64 {
    LEADING_FLOAT
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

/// Parsed field value; missing or zero becomes 1, then clamped to `[1, max]`.
fn clamp_field(text: &str, max: u32) -> u32 {
    let value = parse_leading_int(text).filter(|v| *v != 0).unwrap_or(1);
    value.clamp(1, i64::from(max.max(1))) as u32
}

/// State of the calculator panel.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculatorForm {
    product: LoanProduct,
    amount_units: u32,
    term_years: u32,
    annual_rate_percent: f64,
    method: RepaymentMethod,
}

impl CalculatorForm {
    /// Panel as first rendered: the first product with the initial amount and term.
    pub fn new(catalog: &Catalog) -> Self {
        let product = catalog.products()[0].clone();
        let mut form = Self {
            annual_rate_percent: product.annual_rate_percent.to_f64().unwrap_or(f64::NAN),
            amount_units: INITIAL_AMOUNT_UNITS.min(product.max_principal_units),
            term_years: INITIAL_TERM_YEARS.min(product.max_term_years),
            method: RepaymentMethod::default(),
            product,
        };
        form.clamp_to_product();
        form
    }

    /// Switches product: rate follows the product, amount and term are pulled
    /// down to the new caps when they exceed them.
    pub fn select_product(&mut self, catalog: &Catalog, code: &str) -> LoanResult<()> {
        let product = catalog.resolve(code)?;
        self.product = product.clone();
        self.annual_rate_percent = product.annual_rate_percent.to_f64().unwrap_or(f64::NAN);
        self.clamp_to_product();
        Ok(())
    }

    pub fn set_amount_text(&mut self, text: &str) {
        self.amount_units = clamp_field(text, self.max_amount_units());
        debug!("Amount field '{}' -> {} units", text, self.amount_units);
    }

    pub fn set_amount_slider(&mut self, value: u32) {
        self.amount_units = value.clamp(1, self.max_amount_units());
    }

    pub fn set_term_text(&mut self, text: &str) {
        self.term_years = clamp_field(text, self.max_term_years());
        debug!("Term field '{}' -> {} years", text, self.term_years);
    }

    pub fn set_term_slider(&mut self, value: u32) {
        self.term_years = value.clamp(1, self.max_term_years());
    }

    /// Stores the rate as typed; unparsable text becomes NaN.
    pub fn set_rate_text(&mut self, text: &str) {
        self.annual_rate_percent = parse_leading_float(text);
    }

    pub fn set_method(&mut self, method: RepaymentMethod) {
        self.method = method;
    }

    pub fn product(&self) -> &LoanProduct {
        &self.product
    }

    pub fn amount_units(&self) -> u32 {
        self.amount_units
    }

    pub fn term_years(&self) -> u32 {
        self.term_years
    }

    pub fn annual_rate_percent(&self) -> f64 {
        self.annual_rate_percent
    }

    pub fn method(&self) -> RepaymentMethod {
        self.method
    }

    /// Amount slider upper bound.
    pub fn max_amount_units(&self) -> u32 {
        self.product.max_principal_units.max(1)
    }

    /// Term slider upper bound.
    pub fn max_term_years(&self) -> u32 {
        self.product.max_term_years.max(1)
    }

    pub fn input(&self) -> CalculationInput {
        CalculationInput {
            product_code: self.product.code.clone(),
            principal_units: f64::from(self.amount_units),
            annual_rate_percent: self.annual_rate_percent,
            term_years: self.term_years,
            method: self.method,
        }
    }

    pub fn calculate(&self, calculator: &Calculator) -> LoanResult<CalculationResult> {
        calculator.calculate(&self.input())
    }

    fn clamp_to_product(&mut self) {
        if self.amount_units > self.max_amount_units() {
            debug!("Amount {} above cap, using {}", self.amount_units, self.max_amount_units());
            self.amount_units = self.max_amount_units();
        }
        if self.term_years > self.max_term_years() {
            debug!("Term {} above cap, using {}", self.term_years, self.max_term_years());
            self.term_years = self.max_term_years();
        }
    }
}

/// Reasons the quick estimate cannot start.
#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("Please select a loan type")]
    ProductNotSelected,

    #[error("Please enter the expected loan amount")]
    AmountMissing,

    #[error(transparent)]
    Loan(#[from] LoanError),
}

/// The hero-section quick estimate, prepared for the calculator panel.
#[derive(Debug, Clone, PartialEq)]
pub struct QuickQuote {
    pub product: LoanProduct,
    pub amount_units: u32,
    /// True when the requested amount exceeded the product cap and was lowered.
    pub amount_adjusted: bool,
    pub term_years: u32,
}

impl QuickQuote {
    /// Validates the quick-estimate fields and derives panel values.
    pub fn prepare(
        catalog: &Catalog,
        product_code: &str,
        amount_text: &str,
    ) -> Result<Self, QuoteError> {
        if product_code.trim().is_empty() {
            return Err(QuoteError::ProductNotSelected);
        }
        let requested = parse_leading_int(amount_text)
            .filter(|v| *v >= 1)
            .ok_or(QuoteError::AmountMissing)?;
        let product = catalog.resolve(product_code)?.clone();

        let max = i64::from(product.max_principal_units);
        let amount_adjusted = requested > max;
        let amount_units = requested.min(max) as u32;
        let term_years = QUICK_QUOTE_MAX_DEFAULT_TERM.min(product.max_term_years.div_ceil(2));

        Ok(Self {
            product,
            amount_units,
            amount_adjusted,
            term_years,
        })
    }

    /// Panel state carrying the quote, with the product's rate.
    pub fn into_form(self, catalog: &Catalog) -> LoanResult<CalculatorForm> {
        let mut form = CalculatorForm::new(catalog);
        form.select_product(catalog, &self.product.code)?;
        form.set_amount_slider(self.amount_units);
        form.set_term_slider(self.term_years);
        Ok(form)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("42", Some(42))]
    #[case("  17abc", Some(17))]
    #[case("12.9", Some(12))]
    #[case("-3", Some(-3))]
    #[case("", None)]
    #[case("abc", None)]
    fn test_parse_leading_int(#[case] text: &str, #[case] expected: Option<i64>) {
        assert_eq!(parse_leading_int(text), expected);
    }

    #[rstest]
    #[case("1.775", 1.775)]
    #[case(" 2.5%", 2.5)]
    #[case(".5", 0.5)]
    #[case("3e-1", 0.3)]
    fn test_parse_leading_float(#[case] text: &str, #[case] expected: f64) {
        assert!((parse_leading_float(text) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_parse_leading_float_without_digits_is_nan() {
        assert!(parse_leading_float("rate").is_nan());
        assert!(parse_leading_float("").is_nan());
    }

    #[test]
    fn test_initial_form() {
        let form = CalculatorForm::new(&Catalog::builtin());

        assert_eq!(form.product().code, "youth-business");
        assert_eq!(form.amount_units(), 100);
        assert_eq!(form.term_years(), 5);
        assert!((form.annual_rate_percent() - 1.67).abs() < 1e-9);
        assert_eq!(form.method(), RepaymentMethod::EqualInstallment);
    }

    #[test]
    fn test_select_product_updates_rate_and_clamps() {
        let catalog = Catalog::builtin();
        let mut form = CalculatorForm::new(&catalog);
        form.set_amount_text("150");
        form.set_term_text("7");

        form.select_product(&catalog, "labor").unwrap();

        assert!((form.annual_rate_percent() - 1.718).abs() < 1e-9);
        assert_eq!(form.amount_units(), 10);
        assert_eq!(form.term_years(), 3);
        assert_eq!(form.max_amount_units(), 10);
        assert_eq!(form.max_term_years(), 3);
    }

    #[test]
    fn test_select_product_keeps_values_within_caps() {
        let catalog = Catalog::builtin();
        let mut form = CalculatorForm::new(&catalog);
        form.set_amount_text("150");

        form.select_product(&catalog, "first-home").unwrap();

        assert_eq!(form.amount_units(), 150);
        assert_eq!(form.term_years(), 5);
    }

    #[test]
    fn test_select_unknown_product_leaves_form_untouched() {
        let catalog = Catalog::builtin();
        let mut form = CalculatorForm::new(&catalog);
        let before = form.clone();

        assert!(form.select_product(&catalog, "car-loan").is_err());
        assert_eq!(form, before);
    }

    #[rstest]
    #[case("50", 50)]
    #[case("999", 200)]
    #[case("0", 1)]
    #[case("-20", 1)]
    #[case("", 1)]
    #[case("lots", 1)]
    fn test_amount_field_is_clamped(#[case] text: &str, #[case] expected: u32) {
        let mut form = CalculatorForm::new(&Catalog::builtin());
        form.set_amount_text(text);
        assert_eq!(form.amount_units(), expected);
    }

    #[rstest]
    #[case("3", 3)]
    #[case("40", 7)]
    #[case("0", 1)]
    fn test_term_field_is_clamped(#[case] text: &str, #[case] expected: u32) {
        let mut form = CalculatorForm::new(&Catalog::builtin());
        form.set_term_text(text);
        assert_eq!(form.term_years(), expected);
    }

    #[test]
    fn test_sliders_sync_into_fields() {
        let mut form = CalculatorForm::new(&Catalog::builtin());
        form.set_amount_slider(75);
        form.set_term_slider(6);

        let input = form.input();
        assert_eq!(input.principal_units, 75.0);
        assert_eq!(input.term_years, 6);
    }

    #[test]
    fn test_unparsable_rate_falls_back_to_calculator_default() {
        let catalog = Catalog::builtin();
        let calculator = Calculator::new(catalog.clone());
        let mut form = CalculatorForm::new(&catalog);
        form.select_product(&catalog, "sme").unwrap();
        form.set_rate_text("n/a");

        let defaulted = form.calculate(&calculator).unwrap();
        form.set_rate_text("1.67");
        let explicit = form.calculate(&calculator).unwrap();

        assert_eq!(defaulted, explicit);
    }

    #[test]
    fn test_form_calculation_uses_method() {
        let catalog = Catalog::builtin();
        let calculator = Calculator::new(catalog.clone());
        let mut form = CalculatorForm::new(&catalog);
        form.set_method(RepaymentMethod::EqualPrincipal);

        let result = form.calculate(&calculator).unwrap();
        assert_eq!(result.method, RepaymentMethod::EqualPrincipal);
        assert_eq!(result.product_display_name, "青年創業貸款");
        assert_eq!(result.period_count, 60);
    }

    #[test]
    fn test_quick_quote_within_cap() {
        let quote = QuickQuote::prepare(&Catalog::builtin(), "sme", "300").unwrap();

        assert_eq!(quote.amount_units, 300);
        assert!(!quote.amount_adjusted);
        assert_eq!(quote.term_years, 5);
    }

    #[test]
    fn test_quick_quote_clamps_amount() {
        let quote = QuickQuote::prepare(&Catalog::builtin(), "labor", "50").unwrap();

        assert_eq!(quote.amount_units, 10);
        assert!(quote.amount_adjusted);
        // min(5, ceil(3 / 2))
        assert_eq!(quote.term_years, 2);
    }

    #[rstest]
    #[case("youth-business", 4)]
    #[case("first-home", 5)]
    #[case("student", 4)]
    #[case("agriculture", 5)]
    #[case("sme", 5)]
    #[case("labor", 2)]
    fn test_quick_quote_default_term(#[case] code: &str, #[case] expected: u32) {
        let quote = QuickQuote::prepare(&Catalog::builtin(), code, "1").unwrap();
        assert_eq!(quote.term_years, expected);
    }

    #[rstest]
    #[case("", "100")]
    #[case("   ", "100")]
    fn test_quick_quote_requires_product(#[case] code: &str, #[case] amount: &str) {
        let result = QuickQuote::prepare(&Catalog::builtin(), code, amount);
        assert!(matches!(result, Err(QuoteError::ProductNotSelected)));
    }

    #[rstest]
    #[case("")]
    #[case("0")]
    #[case("-5")]
    #[case("0.5")]
    #[case("many")]
    fn test_quick_quote_requires_amount(#[case] amount: &str) {
        let result = QuickQuote::prepare(&Catalog::builtin(), "sme", amount);
        assert!(matches!(result, Err(QuoteError::AmountMissing)));
    }

    #[test]
    fn test_quick_quote_unknown_product() {
        let result = QuickQuote::prepare(&Catalog::builtin(), "car-loan", "10");
        assert!(matches!(result, Err(QuoteError::Loan(LoanError::UnknownProduct(_)))));
    }

    #[test]
    fn test_quick_quote_into_form() {
        let catalog = Catalog::builtin();
        let form = QuickQuote::prepare(&catalog, "first-home", "1200")
            .unwrap()
            .into_form(&catalog)
            .unwrap();

        assert_eq!(form.product().code, "first-home");
        assert_eq!(form.amount_units(), 800);
        assert_eq!(form.term_years(), 5);
        assert!((form.annual_rate_percent() - 1.775).abs() < 1e-9);
    }
}
