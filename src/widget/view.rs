//! Headless UI tree produced by `render`.
//!
//! The engine does not draw anything. `render` describes what a rendering
//! surface should show and carries the callbacks that surface invokes;
//! every callback is a [`Dispatch`] bound to the owning form.

use std::fmt;

use super::dispatch::Dispatch;
use super::status::WidgetStatus;

#[derive(Debug, Clone)]
pub enum View {
    Input(InputView),
    Group(GroupView),
    List(ListView),
    Text(String),
}

/// A single editable (or read-only) value.
#[derive(Debug, Clone)]
pub struct InputView {
    pub label: String,
    pub value: String,
    pub enabled: bool,
    pub highlighted: bool,
    pub messages: Vec<String>,
    /// None when the input is read-only.
    pub on_input: Option<Dispatch<String>>,
}

impl InputView {
    /// Builds an input whose enabled/error presentation follows `status`.
    pub fn new(
        label: impl Into<String>,
        value: impl Into<String>,
        status: &WidgetStatus,
        on_input: Dispatch<String>,
    ) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            enabled: status.mutable,
            highlighted: status.is_highlighted(),
            messages: status.messages(),
            on_input: status.mutable.then_some(on_input),
        }
    }

    /// Simulates the user typing `text`. Returns false when read-only.
    pub fn input(&self, text: impl Into<String>) -> bool {
        match &self.on_input {
            Some(dispatch) => {
                dispatch.send(text.into());
                true
            }
            None => false,
        }
    }
}

/// Named children of a record.
#[derive(Debug, Clone)]
pub struct GroupView {
    pub label: Option<String>,
    pub fields: Vec<(String, View)>,
    pub highlighted: bool,
    pub messages: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ListView {
    pub label: Option<String>,
    pub items: Vec<ListItemView>,
    pub highlighted: bool,
    pub messages: Vec<String>,
    pub on_add: Option<Dispatch<()>>,
}

#[derive(Debug, Clone)]
pub struct ListItemView {
    pub view: View,
    pub on_remove: Option<Dispatch<()>>,
    pub on_duplicate: Option<Dispatch<()>>,
}

impl View {
    /// Finds a descendant by field names and item indices, e.g. `["items", "0", "name"]`.
    pub fn find(&self, path: &[&str]) -> Option<&View> {
        let Some((head, rest)) = path.split_first() else {
            return Some(self);
        };
        match self {
            View::Group(group) => group
                .fields
                .iter()
                .find(|(name, _)| name == head)
                .and_then(|(_, view)| view.find(rest)),
            View::List(list) => {
                let index: usize = head.parse().ok()?;
                list.items.get(index).and_then(|item| item.view.find(rest))
            }
            View::Input(_) | View::Text(_) => None,
        }
    }

    pub fn as_input(&self) -> Option<&InputView> {
        match self {
            View::Input(input) => Some(input),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListView> {
        match self {
            View::List(list) => Some(list),
            _ => None,
        }
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let pad = "  ".repeat(depth);
        match self {
            View::Input(input) => {
                let marker = if input.highlighted { "!" } else { " " };
                let lock = if input.enabled { "" } else { " (read-only)" };
                writeln!(f, "{}{} {}: {}{}", pad, marker, input.label, input.value, lock)?;
                write_messages(f, &pad, &input.messages)
            }
            View::Group(group) => {
                if let Some(label) = &group.label {
                    writeln!(f, "{}[{}]", pad, label)?;
                }
                write_messages(f, &pad, &group.messages)?;
                group
                    .fields
                    .iter()
                    .try_for_each(|(_, view)| view.write_indented(f, depth + 1))
            }
            View::List(list) => {
                let label = list.label.as_deref().unwrap_or("items");
                writeln!(f, "{}{} ({})", pad, label, list.items.len())?;
                write_messages(f, &pad, &list.messages)?;
                for (index, item) in list.items.iter().enumerate() {
                    writeln!(f, "{}  #{}", pad, index + 1)?;
                    item.view.write_indented(f, depth + 2)?;
                }
                Ok(())
            }
            View::Text(text) => writeln!(f, "{}{}", pad, text),
        }
    }
}

fn write_messages(f: &mut fmt::Formatter<'_>, pad: &str, messages: &[String]) -> fmt::Result {
    messages
        .iter()
        .try_for_each(|message| writeln!(f, "{}    -> {}", pad, message))
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}
