//! Error handling for geoedit
//!
//! Every failure an editing operation can report is a variant of
//! [`EditorError`]. All of them are recoverable: they are caught at the tool
//! or operation boundary, surfaced to the user as a single status message,
//! and the operation is aborted before the shape store or the selection set
//! is touched.
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Editing error type
///
/// Represents failures raised by the shape store, the boolean/offset
/// operations and the interactive tools.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditorError {
    /// A geometry value holds nothing (an empty collection or primitive).
    #[error("Geometry is empty")]
    EmptyGeometry,

    /// A nearest-vertex query was made against a store with no shapes.
    #[error("No shapes in the store")]
    EmptyStore,

    /// A numeric argument was malformed or out of range.
    #[error("Invalid parameter '{param}': {reason}")]
    InvalidParameter {
        /// The parameter name.
        param: String,
        /// The reason the parameter was rejected.
        reason: String,
    },

    /// Fewer shapes were selected than the operation requires.
    #[error("{operation} requires at least {required} selected shape(s), got {selected}")]
    InsufficientSelection {
        /// The operation that was attempted.
        operation: String,
        /// The minimum number of shapes required.
        required: usize,
        /// The number of shapes that were selected.
        selected: usize,
    },

    /// A drill operation was attempted without an active tool diameter.
    #[error("No tool diameter selected")]
    NoToolSelected,

    /// The operation has no rule for this kind of shape.
    #[error("{operation} does not support {kind} shapes")]
    UnsupportedShapeKind {
        /// The operation that was attempted.
        operation: String,
        /// The shape kind that was rejected.
        kind: String,
    },

    /// The operation ran but produced no geometry.
    #[error("{operation} produced an empty result")]
    EmptyResult {
        /// The operation that produced nothing.
        operation: String,
    },

    /// A previous background request of the active tool has not finished.
    #[error("{operation} is still running")]
    Busy {
        /// The operation that is still in flight.
        operation: String,
    },
}

impl EditorError {
    /// Shorthand for [`EditorError::InvalidParameter`].
    pub fn invalid_parameter(param: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param: param.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for [`EditorError::InsufficientSelection`].
    pub fn insufficient_selection(
        operation: impl Into<String>,
        required: usize,
        selected: usize,
    ) -> Self {
        Self::InsufficientSelection {
            operation: operation.into(),
            required,
            selected,
        }
    }

    /// Shorthand for [`EditorError::UnsupportedShapeKind`].
    pub fn unsupported(operation: impl Into<String>, kind: impl Into<String>) -> Self {
        Self::UnsupportedShapeKind {
            operation: operation.into(),
            kind: kind.into(),
        }
    }

    /// Shorthand for [`EditorError::EmptyResult`].
    pub fn empty_result(operation: impl Into<String>) -> Self {
        Self::EmptyResult {
            operation: operation.into(),
        }
    }
}

/// Result type alias for editing operations.
pub type EditorResult<T> = Result<T, EditorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editor_error_display() {
        assert_eq!(EditorError::EmptyStore.to_string(), "No shapes in the store");

        let err = EditorError::invalid_parameter("distance", "use buffer_interior instead");
        assert_eq!(
            err.to_string(),
            "Invalid parameter 'distance': use buffer_interior instead"
        );

        let err = EditorError::insufficient_selection("Intersection", 2, 1);
        assert_eq!(
            err.to_string(),
            "Intersection requires at least 2 selected shape(s), got 1"
        );

        let err = EditorError::unsupported("Cut", "Point");
        assert_eq!(err.to_string(), "Cut does not support Point shapes");
    }

    #[test]
    fn test_editor_error_equality() {
        assert_eq!(EditorError::NoToolSelected, EditorError::NoToolSelected);
        assert_ne!(EditorError::EmptyGeometry, EditorError::EmptyStore);
        assert!(matches!(
            EditorError::empty_result("Buffer"),
            EditorError::EmptyResult { .. }
        ));
    }
}
