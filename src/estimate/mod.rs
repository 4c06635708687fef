//! Estimating forms built on the widget engine.
//!
//! An [`Estimate`] is a named list of [`LineItem`]s. Each line item may link
//! to a [`Rate`]; picking one copies the rate's ratios and unit increment
//! into the item through a [`RateSelection`].

mod line_item;
mod rate;
mod script;

use serde::{Deserialize, Serialize};

pub use line_item::{
    line_item_widget, LineItem, LineItemAction, LineItemState, LineItemWidget, QuantityWidget,
};
pub use rate::{select_rate, Rate, RateSelection};
pub use script::{run_script, ScriptError, ScriptStep};

use crate::cache::{CacheKey, RecordCache};
use crate::config::FormsConfig;
use crate::record_widget;
use crate::widget::{ListWidget, NoDerive};
use crate::widgets::TextWidget;

record_widget! {
    #[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
    #[serde(default)]
    pub struct Estimate {
        name: String => Name(TextWidget),
        items: Vec<LineItem> => Items(ListWidget<LineItemWidget>),
    }

    #[derive(Debug, Clone)]
    pub widget EstimateWidget {
        state: EstimateState,
        action: EstimateAction,
        derive: NoDerive,
    }
}

/// The estimate editor, honoring form-level settings.
pub fn estimate_widget(config: &FormsConfig) -> EstimateWidget {
    EstimateWidget::new(
        TextWidget::new("Estimate name").required().max_len(200),
        ListWidget::new(line_item_widget())
            .label("Line items")
            .allow_empty(config.allow_empty_lists),
    )
    .label("Estimate")
}

/// Loads every rate the estimate links to, so validation can judge them.
pub async fn prefetch_rates(estimate: &Estimate, cache: &RecordCache) {
    for id in estimate.items.iter().filter_map(|item| item.rate.as_deref()) {
        let state = cache.resolve(&CacheKey::of::<Rate>(id)).await;
        tracing::debug!(rate = %id, settled = state.is_settled(), "Prefetched rate");
    }
}
