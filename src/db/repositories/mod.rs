pub mod movie;
pub mod user;

/// Result of a write guarded by a unique index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UniqueWrite<T> {
    Written(T),

    /// The index rejected the row; nothing was written.
    Duplicate,
}

impl<T> UniqueWrite<T> {
    pub fn written(self) -> Option<T> {
        match self {
            Self::Written(value) => Some(value),
            Self::Duplicate => None,
        }
    }
}
