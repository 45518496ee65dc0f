use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum HmmError {
    /// Structurally invalid model parameters, raised at construction time
    #[error("InvalidModel: {0}")]
    InvalidModel(String),

    /// Observation sequence the model cannot be run on
    #[error("InvalidInput: {0}")]
    InvalidInput(String),
}

impl HmmError {
    pub(crate) fn model(reason: impl Into<String>) -> Self {
        HmmError::InvalidModel(reason.into())
    }

    pub(crate) fn input(reason: impl Into<String>) -> Self {
        HmmError::InvalidInput(reason.into())
    }
}
