use thiserror::Error;

/// Failures of a single weather lookup. None of these are fatal.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Fill all required Input")]
    Validation,

    /// Non-2xx answer; `status_text` is shown to the user verbatim.
    #[error("{status_text}")]
    Provider { status_text: String },

    #[error("Unexpected response from weather provider: {0}")]
    MalformedResponse(String),

    #[error("Could not reach weather provider: {0}")]
    Network(#[from] reqwest::Error),

    #[error("A lookup is already in progress")]
    Busy,
}

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("History storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stored history is not valid: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("Failed to serialize history: {0}")]
    Serialize(#[source] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    History(#[from] HistoryError),

    /// Carries the zero-based index; the message shows it one-based.
    #[error("No history entry at position {}", .0 + 1)]
    NoSuchEntry(usize),
}

impl AppError {
    /// Message for the user; anything that is not a validation or provider
    /// failure collapses into a generic line.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Lookup(LookupError::Validation) => LookupError::Validation.to_string(),
            AppError::Lookup(LookupError::Provider { status_text }) => status_text.clone(),
            AppError::Lookup(LookupError::Busy) => LookupError::Busy.to_string(),
            AppError::NoSuchEntry(_) => self.to_string(),
            _ => "Something went wrong, please try again".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_shows_status_text_verbatim() {
        let err = AppError::from(LookupError::Provider { status_text: "Not Found".into() });
        assert_eq!(err.user_message(), "Not Found");
    }

    #[test]
    fn validation_message_matches_form_hint() {
        let err = AppError::from(LookupError::Validation);
        assert_eq!(err.user_message(), "Fill all required Input");
    }

    #[test]
    fn malformed_response_is_generic_for_user() {
        let err = AppError::from(LookupError::MalformedResponse("missing field `dt`".into()));
        assert_eq!(err.user_message(), "Something went wrong, please try again");
        assert!(err.to_string().contains("missing field `dt`"));
    }
}
