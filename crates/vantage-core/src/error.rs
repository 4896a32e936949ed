use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid site config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("no element matches `{0}`")]
    MissingElement(String),

    #[error("render surface rejected {op}: {reason}")]
    Surface { op: &'static str, reason: String },
}

impl Error {
    pub fn surface(op: &'static str, reason: impl Into<String>) -> Self {
        Error::Surface {
            op,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
