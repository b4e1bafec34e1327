use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] soltick_core::ValidationError),

    #[error(
        "no token address given and DEFAULT_TOKEN_ADDRESS is not set; pass a mint address or add it to .env"
    )]
    MissingToken,

    #[error(transparent)]
    Core(#[from] soltick_core::CoreError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error("history file error: {0}")]
    History(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::MissingToken => 2,
            Self::Core(_) => 4,
            Self::Serialization(_) => 4,
            Self::History(_) => 10,
            Self::Io(_) => 10,
        }
    }
}
