use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

use crate::cache::{CacheKey, CachedRecord, EntryState, RecordCache, RecordLookup};
use crate::widget::{
    Editor, InitParams, InputView, RenderProps, Snapshot, ValidationError, View, Widget,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkAction {
    /// Points the link at a record id, or clears it.
    Select(Option<String>),
}

/// Reference to a `T` record by id, displayed through the record cache.
pub struct LinkWidget<T> {
    label: String,
    required: bool,
    record: PhantomData<fn() -> T>,
}

impl<T> fmt::Debug for LinkWidget<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkWidget")
            .field("label", &self.label)
            .field("required", &self.required)
            .finish()
    }
}

impl<T> Clone for LinkWidget<T> {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            required: self.required,
            record: PhantomData,
        }
    }
}

impl<T: CachedRecord> LinkWidget<T> {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            required: false,
            record: PhantomData,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn display_value(&self, id: &str, cache: &RecordCache) -> String {
        if let Some(record) = cache.get_record::<T>(id) {
            return record.label();
        }
        match cache.peek(&CacheKey::of::<T>(id)) {
            EntryState::NotFound => format!("{} (missing)", id),
            EntryState::Failed => format!("{} (unavailable)", id),
            EntryState::Present(_) => format!("{} (unreadable)", id),
            EntryState::Absent | EntryState::Loading => format!("{} (loading)", id),
        }
    }
}

impl<T: CachedRecord> Widget for LinkWidget<T> {
    type Data = Option<String>;
    type State = ();
    type Action = LinkAction;

    /// Records that have not been fetched yet are not judged.
    fn validate(&self, data: &Option<String>, cache: &dyn RecordLookup) -> Vec<ValidationError> {
        let Some(id) = data else {
            return if self.required {
                vec![ValidationError::empty()]
            } else {
                Vec::new()
            };
        };

        match cache.peek(&CacheKey::of::<T>(id.as_str())) {
            EntryState::NotFound => vec![ValidationError::invalid(format!(
                "{} '{}' does not exist",
                self.label, id
            ))],
            EntryState::Present(_) => match cache.peek_record::<T>(id) {
                Some(record) if !record.is_selectable() => {
                    vec![ValidationError::invalid(format!(
                        "{} '{}' is no longer available",
                        self.label,
                        record.label()
                    ))]
                }
                Some(_) => Vec::new(),
                None => vec![ValidationError::invalid(format!(
                    "{} '{}' is malformed",
                    self.label, id
                ))],
            },
            EntryState::Absent | EntryState::Loading | EntryState::Failed => Vec::new(),
        }
    }
}

impl<T: CachedRecord, Ctx: ?Sized> Editor<Ctx> for LinkWidget<T> {
    fn initialize(
        &self,
        data: Option<String>,
        _ctx: &Ctx,
        _params: &InitParams,
    ) -> Snapshot<(), Option<String>> {
        Snapshot::new((), data.filter(|id| !id.is_empty()))
    }

    fn reduce(
        &self,
        state: (),
        _data: Option<String>,
        action: LinkAction,
        _ctx: &Ctx,
    ) -> Snapshot<(), Option<String>> {
        match action {
            LinkAction::Select(id) => Snapshot::new(state, id.filter(|id| !id.is_empty())),
        }
    }

    fn render(&self, props: RenderProps<'_, Self, Ctx>) -> View {
        let value = match props.data {
            Some(id) => self.display_value(id, props.cache),
            None => String::new(),
        };
        let dispatch = props
            .dispatch
            .map(|text: String| LinkAction::Select(Some(text)));
        View::Input(InputView::new(self.label.clone(), value, props.status, dispatch))
    }
}
