use std::fmt;

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (zero window, bad retry schedule, etc.).
    ConfigValidation(String),
    /// A source is missing or empty. Raised before any grouping starts.
    InvalidInput(String),
    /// A source could not be turned into records (bad header, date, amount).
    CsvProcessing { source: String, message: String },
    /// A record cannot be keyed.
    MalformedRecord { record: String, message: String },
    /// Every retry attempt failed.
    RetryExhausted {
        operation: String,
        attempts: u32,
        last_error: Box<ReconError>,
    },
    /// IO error (file read, etc.).
    Io(String),
}

/// Error category with a fixed metadata row per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ConfigParse,
    ConfigValidation,
    InvalidInput,
    CsvProcessing,
    MalformedRecord,
    RetryExhausted,
    Io,
}

impl ErrorKind {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigParse => "CONFIG_PARSE_ERROR",
            Self::ConfigValidation => "CONFIG_VALIDATION_ERROR",
            Self::InvalidInput => "INVALID_FILE",
            Self::CsvProcessing => "CSV_PROCESSING_ERROR",
            Self::MalformedRecord => "MALFORMED_RECORD",
            Self::RetryExhausted => "RETRY_EXHAUSTED",
            Self::Io => "IO_ERROR",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::ConfigParse => "Config Parse Error",
            Self::ConfigValidation => "Config Validation Error",
            Self::InvalidInput => "Invalid File",
            Self::CsvProcessing => "CSV Processing Error",
            Self::MalformedRecord => "Malformed Record",
            Self::RetryExhausted => "Retry Attempts Exhausted",
            Self::Io => "IO Error",
        }
    }

    /// Whether running the same operation again could succeed.
    ///
    /// Everything except IO is a deterministic function of the input bytes,
    /// so only IO failures are worth another attempt.
    pub fn retryable(&self) -> bool {
        matches!(self, Self::Io)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl ReconError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConfigParse(_) => ErrorKind::ConfigParse,
            Self::ConfigValidation(_) => ErrorKind::ConfigValidation,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::CsvProcessing { .. } => ErrorKind::CsvProcessing,
            Self::MalformedRecord { .. } => ErrorKind::MalformedRecord,
            Self::RetryExhausted { .. } => ErrorKind::RetryExhausted,
            Self::Io(_) => ErrorKind::Io,
        }
    }
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            Self::CsvProcessing { source, message } => {
                write!(f, "failed to parse/group CSV '{source}': {message}")
            }
            Self::MalformedRecord { record, message } => {
                write!(f, "malformed record {record}: {message}")
            }
            Self::RetryExhausted { operation, attempts, last_error } => {
                write!(
                    f,
                    "operation '{operation}' failed after {attempts} attempt(s). Original error: {last_error}"
                )
            }
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::RetryExhausted { last_error, .. } => Some(last_error.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ReconError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
