//! Composable form widgets.
//!
//! Atomic inputs, records and lists combine into one widget tree with a
//! single state value, a single action channel and a single validation
//! pass. The only I/O happens behind the linked-record cache.
//!
//! - [`widget`]: the composition engine
//! - [`widgets`]: leaf widgets
//! - [`cache`]: linked-record cache
//! - [`client`]: record persistence
//! - [`form`]: hosts a widget tree
//! - [`estimate`]: estimating forms built from the above

pub mod cache;
pub mod client;
pub mod config;
pub mod estimate;
pub mod form;
pub mod logging;
pub mod widget;
pub mod widgets;
