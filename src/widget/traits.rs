//! The widget contract.
//!
//! A widget is split over two traits:
//!
//! - [`Widget`] fixes the data, state and action types and validates data.
//!   Validation never sees context or state.
//! - [`Editor`] initializes, reduces and renders in a given context. The
//!   context is a type parameter, so a composite requires exactly the
//!   contexts its children require.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::dispatch::Dispatch;
use super::status::WidgetStatus;
use super::validation::ValidationError;
use super::view::View;
use crate::cache::{RecordCache, RecordLookup};

/// Data, state and validation of a composable widget.
pub trait Widget {
    /// The domain value the widget edits.
    type Data: Clone + PartialEq + fmt::Debug;

    /// Ephemeral editing state, rebuilt by `initialize` on every load.
    type State: Clone + PartialEq + fmt::Debug;

    /// Closed set of events the widget accepts.
    type Action: fmt::Debug + Send + 'static;

    /// Checks `data`. Must not depend on anything but its arguments.
    fn validate(&self, data: &Self::Data, cache: &dyn RecordLookup) -> Vec<ValidationError>;
}

/// Initialization, reduction and rendering of a widget in context `Ctx`.
pub trait Editor<Ctx: ?Sized>: Widget {
    /// Builds the state for freshly loaded data, normalizing the data if needed.
    ///
    /// With [`InitPurpose::Load`], calling this again on its own output
    /// changes nothing further.
    fn initialize(
        &self,
        data: Self::Data,
        ctx: &Ctx,
        params: &InitParams,
    ) -> Snapshot<Self::State, Self::Data>;

    /// Applies one action. Untouched parts of `state` and `data` are moved
    /// through as they are.
    fn reduce(
        &self,
        state: Self::State,
        data: Self::Data,
        action: Self::Action,
        ctx: &Ctx,
    ) -> Snapshot<Self::State, Self::Data>;

    /// Describes the UI. Actions go through `props.dispatch`, never `reduce`.
    fn render(&self, props: RenderProps<'_, Self, Ctx>) -> View;
}

/// A `{state, data}` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<S, D> {
    pub state: S,
    pub data: D,
}

impl<S, D> Snapshot<S, D> {
    pub fn new(state: S, data: D) -> Self {
        Self { state, data }
    }
}

/// Why a widget is being initialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitPurpose {
    /// Data was loaded from storage.
    #[default]
    Load,
    /// A blank item was added to a list.
    New,
    /// The data is a copy of an existing item; identities must regenerate.
    Duplicate,
}

/// Parameters an initialization ran with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct InitParams {
    pub purpose: InitPurpose,
}

impl InitParams {
    pub fn load() -> Self {
        Self {
            purpose: InitPurpose::Load,
        }
    }

    pub fn new_item() -> Self {
        Self {
            purpose: InitPurpose::New,
        }
    }

    pub fn duplicate() -> Self {
        Self {
            purpose: InitPurpose::Duplicate,
        }
    }

    pub fn is_duplicate(&self) -> bool {
        self.purpose == InitPurpose::Duplicate
    }
}

/// Context a record hands its fields: the record itself plus the record's
/// own context.
pub struct Scope<'a, R, P: ?Sized> {
    pub record: &'a R,
    pub parent: &'a P,
}

impl<'a, R, P: ?Sized> Scope<'a, R, P> {
    pub fn new(record: &'a R, parent: &'a P) -> Self {
        Self { record, parent }
    }
}

impl<R, P: ?Sized> Clone for Scope<'_, R, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R, P: ?Sized> Copy for Scope<'_, R, P> {}

/// Everything `render` receives.
pub struct RenderProps<'a, W: Widget + ?Sized, Ctx: ?Sized> {
    pub state: &'a W::State,
    pub data: &'a W::Data,
    pub ctx: &'a Ctx,
    pub status: &'a WidgetStatus,
    pub dispatch: Dispatch<W::Action>,
    pub cache: &'a RecordCache,
}
