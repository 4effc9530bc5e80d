use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The match service answered, but did not identify an episode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no match found (error code {error_code}){}", detail(.message))]
pub struct NoMatchFound {
    pub error_code: i32,
    pub message: Option<String>,
}

fn detail(message: &Option<String>) -> String {
    message.as_deref().map(|m| format!(": {m}")).unwrap_or_default()
}

impl NoMatchFound {
    /// An empty candidate list on an otherwise successful response.
    pub fn empty() -> Self {
        Self {
            error_code: 0,
            message: None,
        }
    }
}
