use serde::{Deserialize, Serialize};

use crate::cache::RecordLookup;
use crate::widget::{
    Editor, InitParams, InputView, RenderProps, Snapshot, ValidationError, View, Widget,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAction {
    Set(String),
    Clear,
}

/// Free-form text field.
#[derive(Debug, Clone)]
pub struct TextWidget {
    label: String,
    required: bool,
    max_len: Option<usize>,
}

impl TextWidget {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            required: false,
            max_len: None,
        }
    }

    /// Blank (whitespace-only) text is reported as empty.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn max_len(mut self, max_len: usize) -> Self {
        self.max_len = Some(max_len);
        self
    }
}

impl Widget for TextWidget {
    type Data = String;
    type State = ();
    type Action = TextAction;

    fn validate(&self, data: &String, _cache: &dyn RecordLookup) -> Vec<ValidationError> {
        if data.trim().is_empty() {
            return if self.required {
                vec![ValidationError::empty()]
            } else {
                Vec::new()
            };
        }
        match self.max_len {
            Some(max) if data.chars().count() > max => vec![ValidationError::invalid(format!(
                "Must be at most {} characters",
                max
            ))],
            _ => Vec::new(),
        }
    }
}

impl<Ctx: ?Sized> Editor<Ctx> for TextWidget {
    fn initialize(&self, data: String, _ctx: &Ctx, _params: &InitParams) -> Snapshot<(), String> {
        Snapshot::new((), data)
    }

    fn reduce(&self, state: (), _data: String, action: TextAction, _ctx: &Ctx) -> Snapshot<(), String> {
        match action {
            TextAction::Set(text) => Snapshot::new(state, text),
            TextAction::Clear => Snapshot::new(state, String::new()),
        }
    }

    fn render(&self, props: RenderProps<'_, Self, Ctx>) -> View {
        View::Input(InputView::new(
            self.label.clone(),
            props.data.clone(),
            props.status,
            props.dispatch.map(TextAction::Set),
        ))
    }
}
