/// Process-level error carrying the exit code the binary reports.
///
/// Every failure belongs to one of three classes, each with its own
/// constructor and exit code:
/// - [`AppError::invalid_input`] (2): a caller-supplied value or file is
///   outside its documented domain
/// - [`AppError::scorer_unavailable`] / [`AppError::insufficient_data`] (3):
///   the scorecard cannot be loaded, or the supplied data cannot support the
///   requested operation
/// - [`AppError::internal`] (4): a fault that validated input should never
///   trigger
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    /// A caller-supplied value or file violates its documented domain.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self {
            exit_code: 2,
            message: message.into(),
        }
    }

    /// The scorecard is missing, unreadable, or fails validation.
    ///
    /// Kept distinct from [`AppError::invalid_input`] so callers can show a
    /// retry/error state instead of treating it as a bad form field.
    pub fn scorer_unavailable(message: impl Into<String>) -> Self {
        Self {
            exit_code: 3,
            message: message.into(),
        }
    }

    /// The supplied data cannot support the requested operation
    /// (e.g. no valid rows, single-class labels).
    pub fn insufficient_data(message: impl Into<String>) -> Self {
        Self {
            exit_code: 3,
            message: message.into(),
        }
    }

    /// A fault that validated input should never trigger.
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            exit_code: 4,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_encode_the_exit_code_taxonomy() {
        assert_eq!(AppError::invalid_input("x").exit_code(), 2);
        assert_eq!(AppError::scorer_unavailable("x").exit_code(), 3);
        assert_eq!(AppError::insufficient_data("x").exit_code(), 3);
        assert_eq!(AppError::internal("x").exit_code(), 4);
    }

    #[test]
    fn display_shows_the_message_only() {
        let err = AppError::invalid_input("Invalid `age`.");
        assert_eq!(err.to_string(), "Invalid `age`.");
    }
}
