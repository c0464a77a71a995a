/// Failure category of a run.
///
/// Every category maps to its own process exit code so wrapper scripts can tell
/// a bad slitlet range apart from a corrupt parameter file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid command-line value not caught by the argument parser.
    Usage,
    /// Malformed slitlet range token.
    Parse,
    /// Slitlet index or scan value outside declared/detector bounds.
    Range,
    /// Parameter file missing required fields or declaring the wrong model.
    Schema,
    /// Wrong instrument, or image dimensions not matching the header.
    HeaderValidation,
    /// Read/write failure on a source or destination file.
    Io,
}

impl ErrorKind {
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::Usage => 2,
            ErrorKind::Parse => 3,
            ErrorKind::Range => 4,
            ErrorKind::Schema => 5,
            ErrorKind::HeaderValidation => 6,
            ErrorKind::Io => 7,
        }
    }

    fn label(self) -> &'static str {
        match self {
            ErrorKind::Usage => "usage error",
            ErrorKind::Parse => "parse error",
            ErrorKind::Range => "range error",
            ErrorKind::Schema => "schema error",
            ErrorKind::HeaderValidation => "header validation error",
            ErrorKind::Io => "I/O error",
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    kind: ErrorKind,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Usage, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Parse, message)
    }

    pub fn range(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Range, message)
    }

    pub fn schema(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Schema, message)
    }

    pub fn header(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::HeaderValidation, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn exit_code(&self) -> u8 {
        self.kind.exit_code()
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind.label(), self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let kinds = [
            ErrorKind::Usage,
            ErrorKind::Parse,
            ErrorKind::Range,
            ErrorKind::Schema,
            ErrorKind::HeaderValidation,
            ErrorKind::Io,
        ];
        let mut codes: Vec<u8> = kinds.iter().map(|k| k.exit_code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), kinds.len());
        assert!(!codes.contains(&0));
    }

    #[test]
    fn display_names_the_category() {
        let err = AppError::range("slitlet 60 outside [2, 54]");
        assert_eq!(err.to_string(), "range error: slitlet 60 outside [2, 54]");
        assert_eq!(err.kind(), ErrorKind::Range);
    }
}
