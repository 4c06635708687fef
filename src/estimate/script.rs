use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::rate::{select_rate, Rate};
use super::{EstimateAction, EstimateWidget};
use crate::cache::CacheKey;
use crate::form::{Form, FormError};
use crate::widget::ListAction;

/// One scripted edit of an estimate.
///
/// Either a plain action, e.g. `{"name": {"set": "Kitchen"}}`, or a rate
/// pick for a line item, `{"item": 0, "select_rate": "paint"}`, which
/// loads the rate first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScriptStep {
    SelectRate { item: usize, select_rate: String },
    Action(EstimateAction),
}

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Step {step}: rate '{rate}' is unknown or retired")]
    UnknownRate { step: usize, rate: String },

    #[error("Step {step}: estimate has no line item {item}")]
    NoSuchItem { step: usize, item: usize },

    #[error("Step {step}: {source}")]
    Form {
        step: usize,
        #[source]
        source: FormError,
    },
}

/// Applies `steps` in order and returns how many were applied.
pub async fn run_script(
    form: &mut Form<EstimateWidget>,
    steps: Vec<ScriptStep>,
) -> Result<usize, ScriptError> {
    let mut applied = 0;
    for (step, entry) in steps.into_iter().enumerate() {
        let action = match entry {
            ScriptStep::SelectRate { item, select_rate: rate } => {
                form.cache().resolve(&CacheKey::of::<Rate>(rate.as_str())).await;
                let action = select_rate(form.cache(), &rate)
                    .ok_or(ScriptError::UnknownRate { step, rate })?;
                EstimateAction::Items(ListAction::Item {
                    index: item,
                    action,
                })
            }
            ScriptStep::Action(action) => action,
        };

        if let EstimateAction::Items(ListAction::Item { index, .. }) = &action {
            if *index >= form.data().items.len() {
                return Err(ScriptError::NoSuchItem { step, item: *index });
            }
        }

        form.apply(action)
            .map_err(|source| ScriptError::Form { step, source })?;
        applied += 1;
    }
    Ok(applied)
}
