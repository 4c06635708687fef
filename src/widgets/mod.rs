//! Leaf widgets.

mod id;
mod link;
mod number;
mod text;

pub use id::{IdAction, IdWidget};
pub use link::{LinkAction, LinkWidget};
pub use number::{NumberAction, NumberState, NumberWidget};
pub(crate) use number::{format_number, parse_number};
pub use text::{TextAction, TextWidget};
