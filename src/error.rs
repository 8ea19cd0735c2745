//! Error type shared by resolution, decode and encode.
//!
//! Resolution failures (`UnknownType`, `MissingTypeArgument`, `InvalidTimestampArgument`) and
//! `RecursiveSchema` are schema-authoring bugs. Everything else is raised per call against a concrete JSON value and
//! carries the trail of fields/indices/keys that led to it.
use std::fmt;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("unknown type `{0}`")]
    UnknownType(String),
    #[error("type `{0}` requires a concrete type argument")]
    MissingTypeArgument(String),
    #[error("invalid timestamp argument `{0}` (expected int, float or str)")]
    InvalidTimestampArgument(String),
    #[error("expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },
    #[error("required field `{0}` is missing")]
    RequiredFieldMissing(String),
    #[error("invalid timestamp {0}")]
    InvalidTimestamp(String),
    #[error("no declared field named `{0}`")]
    UndeclaredField(String),
    #[error("schema of `{0}` depends on itself while it is being built")]
    RecursiveSchema(&'static str),
    #[error("nesting deeper than {0} levels")]
    DepthExceeded(usize),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// One step of an error trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Field(String),
    Index(usize),
    Key(String),
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    path: Vec<PathSegment>,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, path: Vec::new() }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Outermost segment first.
    pub fn path(&self) -> &[PathSegment] {
        &self.path
    }

    pub fn path_string(&self) -> String {
        let mut out = String::new();
        for seg in &self.path {
            match seg {
                PathSegment::Field(name) => {
                    if !out.is_empty() {
                        out.push('.');
                    }
                    out.push_str(name);
                }
                PathSegment::Index(ix) => out.push_str(&format!("[{ix}]")),
                PathSegment::Key(key) => out.push_str(&format!("[{key:?}]")),
            }
        }
        out
    }

    pub(crate) fn at(mut self, seg: PathSegment) -> Self {
        self.path.insert(0, seg);
        self
    }

    pub(crate) fn at_field(self, name: impl Into<String>) -> Self {
        self.at(PathSegment::Field(name.into()))
    }

    pub(crate) fn unknown_type(name: impl ToString) -> Self {
        Self::new(ErrorKind::UnknownType(name.to_string()))
    }

    pub(crate) fn missing_type_argument(name: impl ToString) -> Self {
        Self::new(ErrorKind::MissingTypeArgument(name.to_string()))
    }

    pub(crate) fn mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::new(ErrorKind::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        })
    }

    pub(crate) fn invalid_timestamp(raw: impl fmt::Display) -> Self {
        Self::new(ErrorKind::InvalidTimestamp(raw.to_string()))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "at {}: {}", self.path_string(), self.kind)
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            ErrorKind::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::new(ErrorKind::Json(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trail_reads_outermost_first() {
        let err = Error::mismatch("object", "string")
            .at_field("kind")
            .at(PathSegment::Key("home".into()))
            .at_field("contacts")
            .at(PathSegment::Index(2))
            .at_field("people");
        assert_eq!(err.path_string(), r#"people[2].contacts["home"].kind"#);
        assert_eq!(
            err.to_string(),
            r#"at people[2].contacts["home"].kind: expected object, got string"#
        );
    }

    #[test]
    fn no_trail_no_prefix() {
        let err = Error::unknown_type("set<int>");
        assert_eq!(err.to_string(), "unknown type `set<int>`");
    }
}
