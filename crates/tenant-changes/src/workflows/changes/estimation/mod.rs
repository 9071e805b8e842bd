//! Pricing of change items against the static price list.
//!
//! The engine is a pure function of its input: every call resolves codes, prices
//! lines and aggregates totals from scratch. Items that cannot be priced
//! automatically are flagged as manual rows for the technical department instead
//! of failing the estimate.

mod classifier;
pub mod export;
mod pricer;

pub use classifier::{guess_code, resolve};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::catalog::{PriceCatalog, PriceCode, Unit};
use super::domain::{ChangeItem, Quantity};

/// VAT applied to every estimate, in percent.
pub const VAT_PERCENT: u32 = 23;

fn vat_rate() -> Decimal {
    Decimal::new(i64::from(VAT_PERCENT), 2)
}

/// VAT on a net amount, rounded half away from zero to whole grosze.
pub(crate) fn vat_for(subtotal: Decimal) -> Decimal {
    (subtotal * vat_rate()).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Stateless estimator bound to a price catalog.
#[derive(Debug, Clone, Copy)]
pub struct EstimationEngine {
    catalog: &'static PriceCatalog,
}

impl Default for EstimationEngine {
    fn default() -> Self {
        Self::new(PriceCatalog::standard())
    }
}

impl EstimationEngine {
    pub fn new(catalog: &'static PriceCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &'static PriceCatalog {
        self.catalog
    }

    /// Resolves and prices one item.
    pub fn price(&self, item: &ChangeItem) -> PricedRow {
        let code = resolve(item);
        pricer::price_line(item, code, self.catalog)
    }

    /// Prices every item in input order and sums the automatically priced rows.
    pub fn estimate(&self, items: &[ChangeItem]) -> Estimate {
        let rows: Vec<PricedRow> = items.iter().map(|item| self.price(item)).collect();

        let subtotal: Decimal = rows.iter().filter_map(|row| row.line_total).sum();
        let vat = vat_for(subtotal);
        let total = subtotal + vat;
        let manual_count = rows.iter().filter(|row| row.manual).count();

        Estimate {
            rows,
            subtotal,
            vat,
            total,
            manual_count,
        }
    }
}

/// Estimate for a list of items using the standard catalog.
pub fn estimate(items: &[ChangeItem]) -> Estimate {
    EstimationEngine::default().estimate(items)
}

/// A change item after code resolution and pricing.
///
/// `unit_price` and `line_total` are both present exactly when `manual` is false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedRow {
    pub room: String,
    pub branch: String,
    pub description: String,
    pub qty: Quantity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical_analysis: Option<String>,
    pub code: Option<PriceCode>,
    pub title: String,
    pub unit: Unit,
    pub unit_price: Option<Decimal>,
    pub line_total: Option<Decimal>,
    pub manual: bool,
}

/// Priced rows with the subtotal, VAT and gross total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Estimate {
    pub rows: Vec<PricedRow>,
    pub subtotal: Decimal,
    pub vat: Decimal,
    pub total: Decimal,
    pub manual_count: usize,
}

impl Estimate {
    pub fn summary(&self) -> EstimateSummary {
        EstimateSummary {
            subtotal: self.subtotal,
            vat: self.vat,
            total: self.total,
            manual_count: self.manual_count,
        }
    }
}

/// Totals snapshot stored with a request when it is saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateSummary {
    pub subtotal: Decimal,
    pub vat: Decimal,
    pub total: Decimal,
    pub manual_count: usize,
}
