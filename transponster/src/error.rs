// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;

use crate::Name;

/// An error encountered while marshalling.
///
/// This type's `Display` impl shows the failure and, for deserialization
/// errors, the path of open elements at the point of failure. E.g.:
///
/// ```text
/// value "65536" out of range for port @ /domain/devices/graphics
/// ```
///
/// Cloning an `Error` is cheap, which matters because `Unordered` and
/// `Choice` matching may create and discard many of them while backtracking.
#[derive(Clone, Debug)]
pub struct Error(Arc<ErrorInner>);

#[derive(Debug)]
struct ErrorInner {
    kind: ErrorKind,
    path: Vec<Name>,
}

/// The four failure categories, plus wrappers for `xml-rs` I/O errors.
///
/// `Lexical`, `Semantic`, and `Structural` are data errors: recoverable by an
/// enclosing `Optional`, `Choice`, or `Unordered` descriptor, and hard
/// failures only in a mandatory position. `InvalidState` is a programming
/// error: a record holds a value the schema cannot express, detected before
/// any output is emitted.
#[derive(Debug)]
pub enum ErrorKind {
    /// Text did not match a scalar type's grammar.
    Lexical { leaf: &'static str, text: String },

    /// Text was lexically valid but failed the type's range/pattern check.
    Semantic { leaf: &'static str, text: String },

    /// An expected tag or cardinality was not found at the expected position.
    Structural(String),

    /// A record value `produce` cannot express.
    InvalidState(String),

    /// An error produced by `xml-rs` while reading, including I/O and syntax
    /// errors.
    Read(xml::reader::Error),

    /// An error produced by `xml-rs` while writing.
    Write(xml::writer::Error),
}

impl Error {
    pub fn lexical(leaf: &'static str, text: impl Into<String>) -> Self {
        Self::new(ErrorKind::Lexical {
            leaf,
            text: text.into(),
        })
    }

    pub fn semantic(leaf: &'static str, text: impl Into<String>) -> Self {
        Self::new(ErrorKind::Semantic {
            leaf,
            text: text.into(),
        })
    }

    pub fn structural(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Structural(msg.into()))
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidState(msg.into()))
    }

    pub(crate) fn read(e: xml::reader::Error) -> Self {
        Self::new(ErrorKind::Read(e))
    }

    pub(crate) fn write(e: xml::writer::Error) -> Self {
        Self::new(ErrorKind::Write(e))
    }

    fn new(kind: ErrorKind) -> Self {
        Error(Arc::new(ErrorInner {
            kind,
            path: Vec::new(),
        }))
    }

    /// Attaches the element path leading to the failure; called once, at
    /// creation, before the `Arc` is shared.
    pub(crate) fn with_path(mut self, path: Vec<Name>) -> Self {
        if let Some(inner) = Arc::get_mut(&mut self.0) {
            inner.path = path;
        }
        self
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.0.kind
    }

    /// The stack of open elements as of when this error occurred; `path()[0]`
    /// is the root. Empty for serialization errors.
    pub fn path(&self) -> &[Name] {
        &self.0.path
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = &*self.0;
        inner.kind.fmt(f)?;
        if !inner.path.is_empty() {
            write!(f, " @ ")?;
            for name in &inner.path {
                write!(f, "/{}", name)?;
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Lexical { leaf, text } => {
                write!(f, "invalid {} text {:?}", leaf, text)
            }
            ErrorKind::Semantic { leaf, text } => {
                write!(f, "value {:?} out of range for {}", text, leaf)
            }
            ErrorKind::Structural(msg) => msg.fmt(f),
            ErrorKind::InvalidState(msg) => write!(f, "invalid state: {}", msg),
            ErrorKind::Read(e) => e.msg().fmt(f),
            ErrorKind::Write(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.0.kind {
            ErrorKind::Read(e) => Some(e),
            _ => None,
        }
    }
}
