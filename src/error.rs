use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Returned by `at`/`at_mut` when the key is absent. Lookups that have a
    /// natural way of reporting absence (`find`, `get`, `count`, `erase`) never
    /// produce it.
    #[error("key not found")]
    KeyNotFound,

    /// A cursor was advanced past the end or moved back before the first entry.
    #[error("cursor moved out of range")]
    IteratorOutOfRange,

    /// Something tried to read through the end position, or to follow a
    /// level-0 link that was never initialized.
    #[error("dereferenced the end position")]
    DereferenceOfEndIterator,

    /// A level value left the range `0..=max`, or a node level index went
    /// past the node's own height.
    #[error("level out of bounds, valid range is 0..={max}")]
    LevelOutOfBounds { max: usize },

    /// A `Position` whose entry has been erased.
    #[error("position does not refer to a live entry")]
    InvalidPosition,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
