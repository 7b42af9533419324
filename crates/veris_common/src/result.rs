//! Common result and error types for the Veris front-end.

/// The standard result type for fallible internal operations.
///
/// `Err` indicates a contract violation (a bug in the caller or in Veris),
/// never a problem with the user's design. User-facing problems are
/// reported as diagnostics and the operation still returns `Ok`, possibly
/// with a degraded (invalid-marked) result.
pub type VerisResult<T> = Result<T, InternalError>;

/// A contract-violation error: the engine was used outside its documented
/// protocol (for example, adding a syntax tree after the design root has
/// been materialized, or reentering root elaboration).
#[derive(Debug, thiserror::Error)]
#[error("internal error: {message}")]
pub struct InternalError {
    /// Description of the violated contract.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_format() {
        let err = InternalError::new("tree added after finalize");
        assert_eq!(format!("{err}"), "internal error: tree added after finalize");
    }

    #[test]
    fn from_string() {
        let err: InternalError = "reentrant root".to_string().into();
        assert_eq!(err.message, "reentrant root");
    }

    #[test]
    fn result_paths() {
        let ok: VerisResult<u32> = Ok(1);
        assert!(ok.is_ok());
        let err: VerisResult<u32> = Err(InternalError::new("x"));
        assert!(err.is_err());
    }
}
