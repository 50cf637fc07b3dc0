use thiserror::Error;

/// Error type that captures the data core's failure modes.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;

/// Non-fatal advisory raised while committing a write. Warnings ride along
/// with a successful result and never block the commit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Warning {
    #[error("supplied total {supplied_cents} differs from computed total {computed_cents}")]
    TotalMismatch {
        supplied_cents: i64,
        computed_cents: i64,
    },
}

/// A committed write plus any advisories raised on the way in.
#[derive(Debug, Clone)]
pub struct Committed<T> {
    pub value: T,
    pub warnings: Vec<Warning>,
}

impl<T> Committed<T> {
    pub fn clean(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
