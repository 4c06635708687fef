use serde::{Deserialize, Serialize};

use super::line_item::{LineItem, LineItemAction};
use crate::cache::{CachedRecord, RecordLookup};
use crate::widget::DeriveFields;

/// A labour/material rate that line items link to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub unit: String,
    pub hours_ratio: f64,
    pub materials_ratio: f64,
    /// Quantities are rounded to multiples of this; zero disables rounding.
    #[serde(default)]
    pub unit_increment: f64,
    /// Retired rates stay readable but cannot be newly selected.
    #[serde(default)]
    pub retired: bool,
}

impl CachedRecord for Rate {
    const ENTITY: &'static str = "rate";

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> String {
        if self.unit.is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, self.unit)
        }
    }

    fn is_selectable(&self) -> bool {
        !self.retired
    }
}

/// Values copied into a line item when a rate is picked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSelection {
    pub rate: String,
    pub hours_ratio: f64,
    pub materials_ratio: f64,
    pub unit_increment: f64,
}

impl RateSelection {
    pub fn from_rate(rate: &Rate) -> Self {
        Self {
            rate: rate.id.clone(),
            hours_ratio: rate.hours_ratio,
            materials_ratio: rate.materials_ratio,
            unit_increment: rate.unit_increment,
        }
    }
}

impl DeriveFields<LineItem> for RateSelection {
    /// `quantity` is listed so it is re-rounded to the new increment.
    fn fields(&self) -> &'static [&'static str] {
        &[
            "rate",
            "unit_increment",
            "quantity",
            "hours_ratio",
            "materials_ratio",
        ]
    }

    fn apply(self, item: LineItem) -> LineItem {
        LineItem {
            rate: Some(self.rate),
            hours_ratio: self.hours_ratio,
            materials_ratio: self.materials_ratio,
            unit_increment: self.unit_increment,
            ..item
        }
    }
}

/// Builds the action that links a line item to rate `id`.
///
/// Reads only what is already cached; returns `None` when the rate is not
/// loaded or can no longer be selected.
pub fn select_rate(cache: &dyn RecordLookup, id: &str) -> Option<LineItemAction> {
    let rate = cache.peek_record::<Rate>(id)?;
    if !rate.is_selectable() {
        tracing::debug!(rate = %id, "Rate is retired");
        return None;
    }
    Some(LineItemAction::Derive(RateSelection::from_rate(&rate)))
}
