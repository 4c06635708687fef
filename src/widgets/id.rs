use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cache::RecordLookup;
use crate::widget::{
    Editor, InitParams, InputView, RenderProps, Snapshot, ValidationError, View, Widget,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdAction {
    Regenerate,
}

/// Identity of a record or list item.
///
/// Blank ids are filled on initialization, and a duplicated item always gets
/// a fresh id so no two items share one.
#[derive(Debug, Clone, Default)]
pub struct IdWidget;

impl IdWidget {
    pub fn new() -> Self {
        Self
    }

    fn generate() -> String {
        Uuid::new_v4().to_string()
    }
}

impl Widget for IdWidget {
    type Data = String;
    type State = ();
    type Action = IdAction;

    fn validate(&self, data: &String, _cache: &dyn RecordLookup) -> Vec<ValidationError> {
        if data.is_empty() {
            vec![ValidationError::empty()]
        } else {
            Vec::new()
        }
    }
}

impl<Ctx: ?Sized> Editor<Ctx> for IdWidget {
    fn initialize(&self, data: String, _ctx: &Ctx, params: &InitParams) -> Snapshot<(), String> {
        if data.is_empty() || params.is_duplicate() {
            Snapshot::new((), Self::generate())
        } else {
            Snapshot::new((), data)
        }
    }

    fn reduce(&self, state: (), _data: String, action: IdAction, _ctx: &Ctx) -> Snapshot<(), String> {
        match action {
            IdAction::Regenerate => Snapshot::new(state, Self::generate()),
        }
    }

    fn render(&self, props: RenderProps<'_, Self, Ctx>) -> View {
        View::Input(InputView {
            label: "Id".to_string(),
            value: props.data.clone(),
            enabled: false,
            highlighted: props.status.is_highlighted(),
            messages: props.status.messages(),
            on_input: None,
        })
    }
}
