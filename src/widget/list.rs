//! List composition.
//!
//! One child widget repeated over a `Vec`, with structural actions that
//! keep `state` and `data` the same length and paired index by index.

use serde::{Deserialize, Serialize};

use super::dispatch::Dispatch;
use super::status::WidgetStatus;
use super::traits::{Editor, InitParams, RenderProps, Snapshot, Widget};
use super::validation::{prefix_errors, ValidationError};
use super::view::{ListItemView, ListView, View};
use crate::cache::RecordLookup;

/// Actions accepted by a [`ListWidget`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ListAction<A> {
    /// Route `action` to the item at `index`.
    Item { index: usize, action: A },
    /// Insert a freshly initialized item at `at`, or append.
    Add {
        #[serde(default)]
        at: Option<usize>,
    },
    Remove { index: usize },
    /// Insert a re-initialized copy right after `index`.
    Duplicate { index: usize },
    Move { from: usize, to: usize },
}

/// Widget over `Vec<W::Data>`.
#[derive(Debug, Clone)]
pub struct ListWidget<W> {
    item: W,
    label: Option<String>,
    allow_empty: bool,
}

impl<W> ListWidget<W> {
    pub fn new(item: W) -> Self {
        Self {
            item,
            label: None,
            allow_empty: false,
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Accept an empty list instead of reporting it as missing.
    pub fn allow_empty(mut self, allow: bool) -> Self {
        self.allow_empty = allow;
        self
    }

    pub fn item_widget(&self) -> &W {
        &self.item
    }
}

impl<W: Widget> Widget for ListWidget<W> {
    type Data = Vec<W::Data>;
    type State = Vec<W::State>;
    type Action = ListAction<W::Action>;

    fn validate(&self, data: &Self::Data, cache: &dyn RecordLookup) -> Vec<ValidationError> {
        let mut errors: Vec<ValidationError> = data
            .iter()
            .enumerate()
            .flat_map(|(index, item)| prefix_errors(index, self.item.validate(item, cache)))
            .collect();

        if data.is_empty() && !self.allow_empty {
            errors.push(ValidationError::empty());
        }
        errors
    }
}

impl<W, Ctx> Editor<Ctx> for ListWidget<W>
where
    W: Editor<Ctx>,
    W::Data: Default,
    Ctx: ?Sized,
{
    fn initialize(
        &self,
        data: Self::Data,
        ctx: &Ctx,
        params: &InitParams,
    ) -> Snapshot<Self::State, Self::Data> {
        let (state, data) = data
            .into_iter()
            .map(|item| {
                let next = self.item.initialize(item, ctx, params);
                (next.state, next.data)
            })
            .unzip();
        Snapshot::new(state, data)
    }

    fn reduce(
        &self,
        state: Self::State,
        data: Self::Data,
        action: Self::Action,
        ctx: &Ctx,
    ) -> Snapshot<Self::State, Self::Data> {
        debug_assert_eq!(state.len(), data.len(), "list state out of step with data");
        let mut state = state;
        let mut data = data;
        let len = data.len();

        match action {
            ListAction::Item { index, action } => {
                debug_assert!(index < len, "action routed to item {} of {}", index, len);
                if index >= len {
                    tracing::error!(index, len, "Dropping action for missing list item");
                    return Snapshot::new(state, data);
                }
                let item_state = state.remove(index);
                let item_data = data.remove(index);
                let next = self.item.reduce(item_state, item_data, action, ctx);
                state.insert(index, next.state);
                data.insert(index, next.data);
            }
            ListAction::Add { at } => {
                let at = at.map_or(len, |at| at.min(len));
                let next = self
                    .item
                    .initialize(W::Data::default(), ctx, &InitParams::new_item());
                state.insert(at, next.state);
                data.insert(at, next.data);
            }
            ListAction::Remove { index } => {
                if index < len {
                    state.remove(index);
                    data.remove(index);
                } else {
                    tracing::debug!(index, len, "Ignoring remove of missing list item");
                }
            }
            ListAction::Duplicate { index } => {
                if index < len {
                    let copy = data[index].clone();
                    let next = self.item.initialize(copy, ctx, &InitParams::duplicate());
                    state.insert(index + 1, next.state);
                    data.insert(index + 1, next.data);
                } else {
                    tracing::debug!(index, len, "Ignoring duplicate of missing list item");
                }
            }
            ListAction::Move { from, to } => {
                if from != to && from < len && to < len {
                    let moved_state = state.remove(from);
                    let moved_data = data.remove(from);
                    state.insert(to, moved_state);
                    data.insert(to, moved_data);
                }
            }
        }

        debug_assert_eq!(state.len(), data.len());
        Snapshot::new(state, data)
    }

    fn render(&self, props: RenderProps<'_, Self, Ctx>) -> View {
        let mutable = props.status.mutable;
        let items = props
            .data
            .iter()
            .zip(props.state.iter())
            .enumerate()
            .map(|(index, (data, state))| {
                let status: WidgetStatus = props.status.item(index);
                let dispatch: Dispatch<W::Action> = props
                    .dispatch
                    .map(move |action| ListAction::Item { index, action });
                let view = self.item.render(RenderProps {
                    state,
                    data,
                    ctx: props.ctx,
                    status: &status,
                    dispatch,
                    cache: props.cache,
                });
                ListItemView {
                    view,
                    on_remove: mutable
                        .then(|| props.dispatch.map(move |()| ListAction::Remove { index })),
                    on_duplicate: mutable
                        .then(|| props.dispatch.map(move |()| ListAction::Duplicate { index })),
                }
            })
            .collect();

        View::List(ListView {
            label: self.label.clone(),
            items,
            highlighted: props.status.is_highlighted(),
            messages: props.status.messages(),
            on_add: mutable.then(|| props.dispatch.map(|()| ListAction::Add { at: None })),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheKey, EntryState};
    use std::collections::HashMap;

    /// Counts items as they are initialized, so fresh state is observable.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    struct Tally {
        generation: u32,
        value: i64,
    }

    struct Counter;

    impl Widget for Counter {
        type Data = Tally;
        type State = u32;
        type Action = i64;

        fn validate(&self, data: &Tally, _cache: &dyn RecordLookup) -> Vec<ValidationError> {
            if data.value < 0 {
                vec![ValidationError::invalid("negative")]
            } else {
                Vec::new()
            }
        }
    }

    impl Editor<()> for Counter {
        fn initialize(&self, data: Tally, _ctx: &(), params: &InitParams) -> Snapshot<u32, Tally> {
            let generation = if params.is_duplicate() {
                data.generation + 1
            } else {
                data.generation
            };
            Snapshot::new(generation * 100, Tally { generation, ..data })
        }

        fn reduce(&self, state: u32, data: Tally, action: i64, _ctx: &()) -> Snapshot<u32, Tally> {
            Snapshot::new(
                state + 1,
                Tally {
                    value: data.value + action,
                    ..data
                },
            )
        }

        fn render(&self, props: RenderProps<'_, Self, ()>) -> View {
            View::Text(props.data.value.to_string())
        }
    }

    fn tally(value: i64) -> Tally {
        Tally {
            generation: 0,
            value,
        }
    }

    fn loaded(values: &[i64]) -> (ListWidget<Counter>, Snapshot<Vec<u32>, Vec<Tally>>) {
        let widget = ListWidget::new(Counter);
        let data = values.iter().copied().map(tally).collect();
        let snapshot = widget.initialize(data, &(), &InitParams::load());
        (widget, snapshot)
    }

    fn apply(
        widget: &ListWidget<Counter>,
        snapshot: Snapshot<Vec<u32>, Vec<Tally>>,
        action: ListAction<i64>,
    ) -> Snapshot<Vec<u32>, Vec<Tally>> {
        widget.reduce(snapshot.state, snapshot.data, action, &())
    }

    fn no_cache() -> HashMap<CacheKey, EntryState> {
        HashMap::new()
    }

    #[test]
    fn item_action_touches_one_index() {
        let (widget, snapshot) = loaded(&[1, 2, 3]);
        let next = apply(&widget, snapshot, ListAction::Item { index: 1, action: 5 });
        assert_eq!(next.data, vec![tally(1), tally(7), tally(3)]);
        assert_eq!(next.state, vec![0, 1, 0]);
    }

    #[test]
    fn add_defaults_to_end_and_clamps() {
        let (widget, snapshot) = loaded(&[1]);
        let next = apply(&widget, snapshot, ListAction::Add { at: None });
        assert_eq!(next.data, vec![tally(1), tally(0)]);

        let next = apply(&widget, next, ListAction::Add { at: Some(0) });
        assert_eq!(next.data, vec![tally(0), tally(1), tally(0)]);

        let next = apply(&widget, next, ListAction::Add { at: Some(99) });
        assert_eq!(next.data.len(), 4);
        assert_eq!(next.state.len(), 4);
    }

    #[test]
    fn remove_shifts_pairs_together() {
        let (widget, snapshot) = loaded(&[1, 2, 3]);
        let next = apply(&widget, snapshot, ListAction::Item { index: 2, action: 1 });
        let next = apply(&widget, next, ListAction::Remove { index: 0 });
        assert_eq!(next.data, vec![tally(2), tally(4)]);
        assert_eq!(next.state, vec![0, 1]);
    }

    #[test]
    fn remove_out_of_range_is_noop() {
        let (widget, snapshot) = loaded(&[1, 2]);
        let before = snapshot.clone();
        let next = apply(&widget, snapshot, ListAction::Remove { index: 2 });
        assert_eq!(next, before);
    }

    #[test]
    fn duplicate_reinitializes_copy() {
        let (widget, snapshot) = loaded(&[1, 2]);
        let next = apply(&widget, snapshot, ListAction::Item { index: 0, action: 1 });
        let next = apply(&widget, next, ListAction::Duplicate { index: 0 });

        assert_eq!(next.data.len(), 3);
        assert_eq!(next.data[1].value, next.data[0].value);
        assert_eq!(next.data[1].generation, 1);
        assert_eq!(next.state, vec![1, 100, 0]);
    }

    #[test]
    fn duplicate_out_of_range_is_noop() {
        let (widget, snapshot) = loaded(&[1]);
        let next = apply(&widget, snapshot, ListAction::Duplicate { index: 5 });
        assert_eq!(next.data, vec![tally(1)]);
    }

    #[test]
    fn move_reorders_state_with_data() {
        let (widget, snapshot) = loaded(&[1, 2, 3]);
        let next = apply(&widget, snapshot, ListAction::Item { index: 0, action: 10 });
        let next = apply(&widget, next, ListAction::Move { from: 0, to: 2 });
        assert_eq!(next.data, vec![tally(2), tally(3), tally(11)]);
        assert_eq!(next.state, vec![0, 0, 1]);
    }

    #[test]
    fn move_in_place_keeps_buffers() {
        let (widget, snapshot) = loaded(&[1, 2]);
        let data_ptr = snapshot.data.as_ptr();
        let state_ptr = snapshot.state.as_ptr();
        let next = apply(&widget, snapshot, ListAction::Move { from: 1, to: 1 });
        assert_eq!(next.data.as_ptr(), data_ptr);
        assert_eq!(next.state.as_ptr(), state_ptr);
    }

    #[test]
    fn validate_tags_errors_with_index() {
        let widget = ListWidget::new(Counter);
        let errors = widget.validate(&vec![tally(1), tally(-1)], &no_cache());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path.to_string(), "1");
        assert!(errors[0].is_invalid());
    }

    #[test]
    fn empty_list_is_missing_unless_allowed() {
        let strict = ListWidget::new(Counter);
        let errors = strict.validate(&Vec::new(), &no_cache());
        assert_eq!(errors, vec![ValidationError::empty()]);

        let lenient = ListWidget::new(Counter).allow_empty(true);
        assert!(lenient.validate(&Vec::new(), &no_cache()).is_empty());
    }

    #[test]
    fn actions_use_type_tags() {
        let action: ListAction<i64> =
            serde_json::from_str(r#"{"type": "item", "index": 0, "action": 3}"#).unwrap();
        assert_eq!(action, ListAction::Item { index: 0, action: 3 });

        let add: ListAction<i64> = serde_json::from_str(r#"{"type": "add"}"#).unwrap();
        assert_eq!(add, ListAction::Add { at: None });
    }
}
