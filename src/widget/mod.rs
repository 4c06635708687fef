//! Widget composition engine.
//!
//! Independently written widgets combine into one tree that shares a
//! single state value, a single action channel and a single validation
//! pass.
//!
//! # Architecture
//!
//! ```text
//! Action ──→ reduce ──→ {state, data} ──→ render ──→ View
//!    ↑                        │                        │
//!    │                        └──→ validate ──→ status ┘
//!    └──────────────── dispatch ───────────────────────┘
//! ```
//!
//! - **Widget / Editor**: the contract every composable unit implements
//! - **record_widget!**: a fixed set of named children over a record type
//! - **ListWidget**: one child repeated over a sequence
//! - **WidgetStatus**: enabled/error state narrowed from parent to child

mod dispatch;
mod list;
mod record;
mod status;
mod traits;
mod validation;
mod view;

pub use dispatch::Dispatch;
pub use list::{ListAction, ListWidget};
pub use record::{DeriveFields, NoDerive, RecordOptions};
pub use status::WidgetStatus;
pub use traits::{Editor, InitParams, InitPurpose, RenderProps, Scope, Snapshot, Widget};
pub use validation::{prefix_errors, ErrorKind, FieldPath, PathSegment, ValidationError};
pub use view::{GroupView, InputView, ListItemView, ListView, View};
