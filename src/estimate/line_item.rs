use serde::{Deserialize, Serialize};

use super::rate::{Rate, RateSelection};
use crate::cache::RecordLookup;
use crate::record_widget;
use crate::widget::{
    Editor, InitParams, InputView, RenderProps, Scope, Snapshot, ValidationError, View, Widget,
};
use crate::widgets::{
    format_number, parse_number, IdWidget, LinkWidget, NumberAction, NumberState, NumberWidget,
    TextWidget,
};

record_widget! {
    #[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
    #[serde(default)]
    pub struct LineItem {
        id: String => Id(IdWidget),
        name: String => Name(TextWidget),
        rate: Option<String> => Rate(LinkWidget<Rate>),
        unit_increment: f64 => UnitIncrement(NumberWidget),
        quantity: f64 => Quantity(QuantityWidget),
        hours_ratio: f64 => HoursRatio(NumberWidget),
        materials_ratio: f64 => MaterialsRatio(NumberWidget),
    }

    #[derive(Debug, Clone)]
    pub widget LineItemWidget {
        state: LineItemState,
        action: LineItemAction,
        derive: RateSelection,
    }
}

/// Quantity of a line item, kept on the item's unit increment.
///
/// Reads `unit_increment` from the enclosing line item, so it must be
/// declared after that field.
#[derive(Debug, Clone)]
pub struct QuantityWidget {
    label: String,
}

impl QuantityWidget {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

fn round_to_increment(value: f64, increment: f64) -> f64 {
    if increment > 0.0 && increment.is_finite() {
        (value / increment).round() * increment
    } else {
        value
    }
}

impl Widget for QuantityWidget {
    type Data = f64;
    type State = NumberState;
    type Action = NumberAction;

    fn validate(&self, data: &f64, _cache: &dyn RecordLookup) -> Vec<ValidationError> {
        if !data.is_finite() {
            vec![ValidationError::invalid("Must be a number")]
        } else if *data < 0.0 {
            vec![ValidationError::invalid("Quantity must not be negative")]
        } else {
            Vec::new()
        }
    }
}

impl<'s, P: ?Sized> Editor<Scope<'s, LineItem, P>> for QuantityWidget {
    fn initialize(
        &self,
        data: f64,
        ctx: &Scope<'s, LineItem, P>,
        _params: &InitParams,
    ) -> Snapshot<NumberState, f64> {
        let quantity = round_to_increment(data, ctx.record.unit_increment);
        Snapshot::new(
            NumberState {
                text: format_number(quantity),
            },
            quantity,
        )
    }

    fn reduce(
        &self,
        _state: NumberState,
        data: f64,
        action: NumberAction,
        ctx: &Scope<'s, LineItem, P>,
    ) -> Snapshot<NumberState, f64> {
        let increment = ctx.record.unit_increment;
        match action {
            NumberAction::Input(text) => {
                match parse_number(&text) {
                    Some(value) => Snapshot::new(NumberState { text }, round_to_increment(value, increment)),
                    None => Snapshot::new(NumberState { text }, data),
                }
            }
            NumberAction::Set(value) => {
                let quantity = round_to_increment(value, increment);
                Snapshot::new(
                    NumberState {
                        text: format_number(quantity),
                    },
                    quantity,
                )
            }
        }
    }

    fn render(&self, props: RenderProps<'_, Self, Scope<'s, LineItem, P>>) -> View {
        let mut input = InputView::new(
            self.label.clone(),
            props.state.text.clone(),
            props.status,
            props.dispatch.map(NumberAction::Input),
        );
        let increment = props.ctx.record.unit_increment;
        if increment > 0.0 {
            input.label = format!("{} (x{})", self.label, increment);
        }
        if !props.state.parses() {
            input.highlighted = true;
            input.messages.push("Not a number".to_string());
        }
        View::Input(input)
    }
}

/// Ratios only matter for items priced from a rate.
fn keep_relevant_errors(item: &LineItem, error: &ValidationError) -> bool {
    let is_ratio = error
        .path
        .first()
        .is_some_and(|segment| segment.is_field("hours_ratio") || segment.is_field("materials_ratio"));
    item.rate.is_some() || !is_ratio
}

/// The line item editor used by estimates.
pub fn line_item_widget() -> LineItemWidget {
    LineItemWidget::new(
        IdWidget::new(),
        TextWidget::new("Name").required().max_len(120),
        LinkWidget::new("Rate"),
        NumberWidget::new("Unit increment").min(0.0),
        QuantityWidget::new("Quantity"),
        NumberWidget::new("Hours ratio").min(0.0),
        NumberWidget::new("Materials ratio").min(0.0),
    )
    .read_only("unit_increment")
    .retain_errors(keep_relevant_errors)
}
