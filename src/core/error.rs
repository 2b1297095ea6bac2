//! Error types for the acceleration structures.

use thiserror::Error;

/// Errors that can occur while packing tree nodes into their fixed
/// width binary encoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NodeError {
    /// A node field does not fit into its bit field.
    #[error("{field} = {value} is out of representable range (max {max})")]
    OutOfRange {
        /// Name of the offending field.
        field: &'static str,
        /// Value which was passed in.
        value: u64,
        /// Largest value the encoding can hold.
        max: u64,
    },
    /// Interior nodes need at least one child.
    #[error("interior node without children")]
    NoChildren,
}

/// Result type for node encoding and tree construction.
pub type Result<T> = std::result::Result<T, NodeError>;

/// Reject `value` if it is larger than `max`.
pub fn check_range(field: &'static str, value: u64, max: u64) -> Result<()> {
    if value > max {
        Err(NodeError::OutOfRange { field, value, max })
    } else {
        Ok(())
    }
}
