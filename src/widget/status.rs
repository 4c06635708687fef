//! Top-down status propagation.

use super::validation::{PathSegment, ValidationError};

/// Enabled/error state handed from a parent widget to each child.
///
/// `validation` is always expressed relative to the widget receiving the
/// status: errors with an empty path belong to the widget itself.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetStatus {
    /// When false the whole subtree is read-only.
    pub mutable: bool,
    pub validation: Vec<ValidationError>,
    /// Finalization has been attempted at least once.
    pub submitted: bool,
}

impl Default for WidgetStatus {
    fn default() -> Self {
        Self::editable()
    }
}

impl WidgetStatus {
    pub fn editable() -> Self {
        Self {
            mutable: true,
            validation: Vec::new(),
            submitted: false,
        }
    }

    pub fn read_only() -> Self {
        Self {
            mutable: false,
            ..Self::editable()
        }
    }

    pub fn with_validation(mut self, validation: Vec<ValidationError>) -> Self {
        self.validation = validation;
        self
    }

    pub fn with_submitted(mut self, submitted: bool) -> Self {
        self.submitted = submitted;
        self
    }

    /// Status for record field `name`.
    pub fn field(&self, name: &str, read_only: bool) -> WidgetStatus {
        self.narrow(|segment| segment.is_field(name), !read_only)
    }

    /// Status for list item `index`.
    pub fn item(&self, index: usize) -> WidgetStatus {
        self.narrow(|segment| segment.is_index(index), true)
    }

    fn narrow(&self, matches: impl Fn(&PathSegment) -> bool, enabled: bool) -> WidgetStatus {
        let validation = self
            .validation
            .iter()
            .filter(|error| error.path.first().is_some_and(&matches))
            .map(|error| ValidationError {
                path: error.path.clone().strip_first(),
                ..error.clone()
            })
            .collect();

        WidgetStatus {
            mutable: self.mutable && enabled,
            validation,
            submitted: self.submitted,
        }
    }

    /// Errors reported by the widget itself rather than a descendant.
    pub fn own_errors(&self) -> impl Iterator<Item = &ValidationError> {
        self.validation.iter().filter(|error| error.path.is_root())
    }

    /// Whether the widget should be drawn in its error state.
    pub fn is_highlighted(&self) -> bool {
        self.own_errors().any(|error| error.blocks(self.submitted))
    }

    /// Messages to show next to the widget, empty until they are displayable.
    pub fn messages(&self) -> Vec<String> {
        self.own_errors()
            .filter(|error| error.blocks(self.submitted))
            .map(ValidationError::display_message)
            .collect()
    }
}
