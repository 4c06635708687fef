//! Path-tagged validation errors.
//!
//! Validators return a flat list of errors. Composite widgets prefix each
//! child error with the child's field name or list index, so the path of an
//! error always leads from the composite's data down to the value that
//! produced it.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One step of a [`FieldPath`]: a record field name or a list index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Index(usize),
    Field(String),
}

impl PathSegment {
    pub fn field(name: impl Into<String>) -> Self {
        PathSegment::Field(name.into())
    }

    pub fn index(index: usize) -> Self {
        PathSegment::Index(index)
    }

    pub fn is_field(&self, name: &str) -> bool {
        matches!(self, PathSegment::Field(field) if field == name)
    }

    pub fn is_index(&self, index: usize) -> bool {
        matches!(self, PathSegment::Index(i) if *i == index)
    }
}

impl From<&str> for PathSegment {
    fn from(name: &str) -> Self {
        PathSegment::Field(name.to_string())
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Field(name) => write!(f, "{}", name),
            PathSegment::Index(index) => write!(f, "{}", index),
        }
    }
}

/// Location of a value relative to the widget that reported an error.
///
/// The empty path means "the reporting widget itself".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn first(&self) -> Option<&PathSegment> {
        self.0.first()
    }

    /// Returns the path with `segment` in front.
    pub fn prepend(mut self, segment: PathSegment) -> Self {
        self.0.insert(0, segment);
        self
    }

    /// Returns the path without its first segment.
    pub fn strip_first(mut self) -> Self {
        if !self.0.is_empty() {
            self.0.remove(0);
        }
        self
    }

    /// Follows the path through a JSON rendition of the data.
    ///
    /// Field segments index objects, index segments index arrays.
    pub fn resolve<'v>(&self, root: &'v Value) -> Option<&'v Value> {
        self.0.iter().try_fold(root, |value, segment| match segment {
            PathSegment::Field(name) => value.get(name.as_str()),
            PathSegment::Index(index) => value.get(*index),
        })
    }
}

impl<S: Into<PathSegment>> FromIterator<S> for FieldPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

/// Kind of validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A required value is missing. Only shown once submission is attempted.
    Empty,
    /// A present value breaks a domain rule. Always shown.
    Invalid,
}

/// A single validation failure, tagged with the path of its origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub path: FieldPath,
    pub kind: ErrorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ValidationError {
    pub fn empty() -> Self {
        Self {
            path: FieldPath::root(),
            kind: ErrorKind::Empty,
            message: None,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            path: FieldPath::root(),
            kind: ErrorKind::Invalid,
            message: Some(message.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.kind == ErrorKind::Empty
    }

    pub fn is_invalid(&self) -> bool {
        self.kind == ErrorKind::Invalid
    }

    /// Re-tags the error as coming from `segment` of the enclosing widget.
    pub fn under(mut self, segment: PathSegment) -> Self {
        self.path = self.path.prepend(segment);
        self
    }

    /// Whether this error keeps a form from being finalized.
    pub fn blocks(&self, submitted: bool) -> bool {
        self.is_invalid() || (self.is_empty() && submitted)
    }

    /// Text shown next to the offending field.
    pub fn display_message(&self) -> String {
        match (&self.message, self.kind) {
            (Some(message), _) => message.clone(),
            (None, ErrorKind::Empty) => "This field is required".to_string(),
            (None, ErrorKind::Invalid) => "Invalid value".to_string(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_root() {
            write!(f, "{}", self.display_message())
        } else {
            write!(f, "{}: {}", self.path, self.display_message())
        }
    }
}

/// Tags every error in `errors` with `segment`.
pub fn prefix_errors(
    segment: impl Into<PathSegment>,
    errors: Vec<ValidationError>,
) -> impl Iterator<Item = ValidationError> {
    let segment = segment.into();
    errors
        .into_iter()
        .map(move |error| error.under(segment.clone()))
}
