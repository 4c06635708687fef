use serde::{Deserialize, Serialize};

use crate::cache::RecordLookup;
use crate::widget::{
    Editor, InitParams, InputView, RenderProps, Snapshot, ValidationError, View, Widget,
};

/// Text the user is typing, kept even while it does not parse.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NumberState {
    pub text: String,
}

impl NumberState {
    pub fn parses(&self) -> bool {
        parse_number(&self.text).is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberAction {
    /// Raw keystrokes; the data only changes when the text parses.
    Input(String),
    Set(f64),
}

/// Numeric field with optional bounds.
#[derive(Debug, Clone)]
pub struct NumberWidget {
    label: String,
    min: Option<f64>,
    max: Option<f64>,
}

impl NumberWidget {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            min: None,
            max: None,
        }
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }
}

pub(crate) fn format_number(value: f64) -> String {
    value.to_string()
}

pub(crate) fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|value| value.is_finite())
}

impl Widget for NumberWidget {
    type Data = f64;
    type State = NumberState;
    type Action = NumberAction;

    fn validate(&self, data: &f64, _cache: &dyn RecordLookup) -> Vec<ValidationError> {
        if !data.is_finite() {
            return vec![ValidationError::invalid("Must be a number")];
        }
        if let Some(min) = self.min.filter(|min| data < min) {
            return vec![ValidationError::invalid(format!("Must be at least {}", min))];
        }
        if let Some(max) = self.max.filter(|max| data > max) {
            return vec![ValidationError::invalid(format!("Must be at most {}", max))];
        }
        Vec::new()
    }
}

impl<Ctx: ?Sized> Editor<Ctx> for NumberWidget {
    fn initialize(&self, data: f64, _ctx: &Ctx, _params: &InitParams) -> Snapshot<NumberState, f64> {
        Snapshot::new(
            NumberState {
                text: format_number(data),
            },
            data,
        )
    }

    fn reduce(
        &self,
        _state: NumberState,
        data: f64,
        action: NumberAction,
        _ctx: &Ctx,
    ) -> Snapshot<NumberState, f64> {
        match action {
            NumberAction::Input(text) => match parse_number(&text) {
                Some(value) => Snapshot::new(NumberState { text }, value),
                None => {
                    tracing::debug!(text = %text, "Keeping previous number for unparsable input");
                    Snapshot::new(NumberState { text }, data)
                }
            },
            NumberAction::Set(value) => Snapshot::new(
                NumberState {
                    text: format_number(value),
                },
                value,
            ),
        }
    }

    fn render(&self, props: RenderProps<'_, Self, Ctx>) -> View {
        let mut input = InputView::new(
            self.label.clone(),
            props.state.text.clone(),
            props.status,
            props.dispatch.map(NumberAction::Input),
        );
        if !props.state.parses() {
            input.highlighted = true;
            input.messages.push("Not a number".to_string());
        }
        View::Input(input)
    }
}
