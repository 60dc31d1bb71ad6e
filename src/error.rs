use thiserror::Error;

#[derive(Error, Debug)]
pub enum RingError {
    #[error("Entry not found: {0}")]
    NotFound(String),

    #[error("Ring has no entries")]
    EmptyRing,

    #[error("Node {0} has no marker in the data ring")]
    MissingMarker(String),

    #[error("Refusing to remove node marker {0} as a key")]
    ProtectedMarker(String),

    #[error("Id {0} is already used by a {1}")]
    Conflict(String, &'static str),

    #[error("Key strategy error: {0}")]
    Strategy(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl RingError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RingError::NotFound(_))
    }
}
