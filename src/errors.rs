use thiserror::Error;

/// Errors that can occur when operating on the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CursorListError {
    /// The requested cursor position lies past the terminal node.
    #[error("position {position} is out of range for a list of length {len}")]
    PositionOutOfRange { position: usize, len: usize },
}
