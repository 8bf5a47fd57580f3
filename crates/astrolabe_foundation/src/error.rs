//! Error types for the Astrolabe system.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.
//! Condition evaluation never surfaces these to callers; nodes convert them
//! into non-matches at their boundary.

use std::fmt;

use thiserror::Error;

use crate::id::{EmpireId, ObjectId};

/// Convenience alias for results carrying an Astrolabe [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for Astrolabe operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Creates an object not found error.
    #[must_use]
    pub fn object_not_found(id: ObjectId) -> Self {
        Self::new(ErrorKind::ObjectNotFound(id))
    }

    /// Creates a missing candidate error for the named reference.
    #[must_use]
    pub fn missing_candidate(reference: &'static str) -> Self {
        Self::new(ErrorKind::MissingCandidate(reference))
    }

    /// Creates a type mismatch error.
    #[must_use]
    pub fn type_mismatch(expected: &'static str, actual: &'static str) -> Self {
        Self::new(ErrorKind::TypeMismatch { expected, actual })
    }

    /// Creates an unknown empire error.
    #[must_use]
    pub fn unknown_empire(id: EmpireId) -> Self {
        Self::new(ErrorKind::UnknownEmpire(id))
    }

    /// Creates an unknown species error.
    #[must_use]
    pub fn unknown_species(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownSpecies(name.into()))
    }

    /// Creates an unresolved content error.
    #[must_use]
    pub fn unresolved_content(content: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnresolvedContent {
            content: content.into(),
            name: name.into(),
        })
    }

    /// Creates a cyclic resolution error.
    #[must_use]
    pub fn cyclic_resolution(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::CyclicResolution(name.into()))
    }

    /// Creates an invalid topology error (bad starlane or containment edit).
    #[must_use]
    pub fn invalid_topology(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidTopology(message.into()))
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// Object was not found in the universe.
    #[error("object not found: {0:?}")]
    ObjectNotFound(ObjectId),

    /// A reference (source, target, root or local candidate) was required but absent.
    #[error("missing candidate: no {0} object in context")]
    MissingCandidate(&'static str),

    /// A property had a different type than the reference expected.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// The expected type.
        expected: &'static str,
        /// The actual type encountered.
        actual: &'static str,
    },

    /// Empire is not known to the empire registry.
    #[error("unknown empire: {0:?}")]
    UnknownEmpire(EmpireId),

    /// Species is not known to the species registry.
    #[error("unknown species: {0}")]
    UnknownSpecies(String),

    /// Dynamic content lookup failed.
    #[error("unresolved {content} content: {name}")]
    UnresolvedContent {
        /// The kind of content that was looked up.
        content: String,
        /// The name that failed to resolve.
        name: String,
    },

    /// Dynamic content resolved back into the node being resolved.
    #[error("cyclic content resolution: {0}")]
    CyclicResolution(String),

    /// Division by zero in a value expression.
    #[error("division by zero")]
    DivisionByZero,

    /// Starlane or containment edit that would break the graph's shape.
    #[error("invalid topology: {0}")]
    InvalidTopology(String),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Condition or value reference being evaluated.
    pub node: Option<String>,
    /// Candidate object under test, if any.
    pub candidate: Option<ObjectId>,
    /// Chain of enclosing nodes, innermost last.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the node being evaluated.
    #[must_use]
    pub fn with_node(mut self, node: impl Into<String>) -> Self {
        self.node = Some(node.into());
        self
    }

    /// Sets the candidate under test.
    #[must_use]
    pub fn with_candidate(mut self, candidate: ObjectId) -> Self {
        self.candidate = Some(candidate);
        self
    }

    /// Adds an enclosing node frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(node) = &self.node {
            write!(f, "in {node}")?;
            if let Some(candidate) = self.candidate {
                write!(f, " for candidate {candidate}")?;
            }
        }
        if !self.stack.is_empty() {
            writeln!(f)?;
            for frame in &self.stack {
                writeln!(f, "  within {frame}")?;
            }
        }
        Ok(())
    }
}
