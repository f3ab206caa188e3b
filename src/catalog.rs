//! The closed set of loan products offered on the site.
//!
//! A [`Catalog`] is plain configuration: the builtin table is what the site
//! ships, and a substitute can be loaded from JSON and injected into a
//! [`Calculator`](crate::Calculator).

use std::collections::HashSet;
use std::path::Path;

use log::info;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{LoanError, LoanResult};

/// Base currency units per principal unit (amounts are quoted in 萬).
pub const BASE_UNITS_PER_PRINCIPAL_UNIT: Decimal = dec!(10000);

/// A single loan product with its nominal rate and caps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanProduct {
    /// Stable product key, e.g. `first-home`.
    pub code: String,
    /// Name shown in the result panel.
    pub display_name: String,
    /// Nominal annual rate as a percentage (e.g., 1.775 for 1.775%).
    pub annual_rate_percent: Decimal,
    /// Largest principal, in units of 10,000.
    pub max_principal_units: u32,
    /// Longest term in years.
    pub max_term_years: u32,
}

impl LoanProduct {
    fn new(
        code: &str,
        display_name: &str,
        rate: Decimal,
        max_principal_units: u32,
        max_term_years: u32,
    ) -> Self {
        Self {
            code: code.to_string(),
            display_name: display_name.to_string(),
            annual_rate_percent: rate,
            max_principal_units,
            max_term_years,
        }
    }
}

/// Immutable, ordered product table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    products: Vec<LoanProduct>,
}

impl Catalog {
    /// Builds a catalog, rejecting empty tables, duplicate codes and zero caps.
    pub fn new(products: Vec<LoanProduct>) -> LoanResult<Self> {
        if products.is_empty() {
            return Err(LoanError::InvalidCatalog("catalog has no products".to_string()));
        }

        let mut seen = HashSet::new();
        for product in &products {
            if product.code.trim().is_empty() {
                return Err(LoanError::InvalidCatalog("product code cannot be empty".to_string()));
            }
            if !seen.insert(product.code.as_str()) {
                return Err(LoanError::InvalidCatalog(format!(
                    "duplicate product code '{}'",
                    product.code
                )));
            }
            let rate = product.annual_rate_percent;
            if rate.is_sign_negative() && !rate.is_zero() {
                return Err(LoanError::InvalidCatalog(format!(
                    "'{}' has a negative rate",
                    product.code
                )));
            }
            if product.max_principal_units == 0 || product.max_term_years == 0 {
                return Err(LoanError::InvalidCatalog(format!(
                    "'{}' must have positive caps",
                    product.code
                )));
            }
        }

        Ok(Self { products })
    }

    /// The six products published on the site.
    pub fn builtin() -> Self {
        Self {
            products: vec![
                LoanProduct::new("youth-business", "青年創業貸款", dec!(1.67), 200, 7),
                LoanProduct::new("first-home", "青年首購房貸", dec!(1.775), 800, 30),
                LoanProduct::new("student", "就學貸款", dec!(1.15), 100, 8),
                LoanProduct::new("agriculture", "農業貸款", dec!(1.5), 500, 15),
                LoanProduct::new("sme", "中小企業貸款", dec!(2.0), 1500, 10),
                LoanProduct::new("labor", "勞工紓困貸款", dec!(1.718), 10, 3),
            ],
        }
    }

    /// Parses a JSON array of products.
    pub fn from_json_str(json: &str) -> LoanResult<Self> {
        let products: Vec<LoanProduct> = serde_json::from_str(json)?;
        Self::new(products)
    }

    /// Reads and parses a JSON catalog file.
    pub fn from_path(path: impl AsRef<Path>) -> LoanResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| LoanError::CatalogIo {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = Self::from_json_str(&json)?;
        info!("Loaded {} loan products from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    /// Looks up a product by code. An unknown code is a caller bug, not user input.
    pub fn resolve(&self, code: &str) -> LoanResult<&LoanProduct> {
        self.products
            .iter()
            .find(|p| p.code == code)
            .ok_or_else(|| LoanError::UnknownProduct(code.to_string()))
    }

    pub fn products(&self) -> &[LoanProduct] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}
