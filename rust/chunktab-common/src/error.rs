use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

pub type StdErrorBoxed = Box<dyn std::error::Error + Send + Sync + 'static>;

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub fn invalid_format(element: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidFormat {
                element: element.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Error {
        Error(
            ErrorKind::Io {
                context: context.into(),
                source,
            }
            .into(),
        )
    }

    pub fn short_read(context: impl Into<String>, expected: u64, actual: u64) -> Error {
        Error(
            ErrorKind::ShortRead {
                context: context.into(),
                expected,
                actual,
            }
            .into(),
        )
    }

    pub fn serialization<E>(context: impl Into<String>, source: E) -> Error
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error(
            ErrorKind::Serialization {
                context: context.into(),
                source: Box::new(source),
            }
            .into(),
        )
    }

    /// Returns `true` if the error belongs to the configuration class: a missing
    /// table, attribute or column, or malformed metadata.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::TableNotFound { .. }
                | ErrorKind::AttributeNotFound { .. }
                | ErrorKind::AttributeType { .. }
                | ErrorKind::ColumnNotFound { .. }
                | ErrorKind::InvalidFormat { .. }
        )
    }

    /// Returns `true` for failures of the underlying storage (including short reads).
    pub fn is_io(&self) -> bool {
        matches!(self.kind(), ErrorKind::Io { .. } | ErrorKind::ShortRead { .. })
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("invalid storage format for '{element}': {message}")]
    InvalidFormat { element: String, message: String },

    #[error("table '{table}' not found")]
    TableNotFound { table: String },

    #[error("attribute '{name}' not found")]
    AttributeNotFound { name: String },

    #[error("unexpected type for attribute '{name}': expected string array, found {found}")]
    AttributeType { name: String, found: String },

    #[error("column '{name}' not found")]
    ColumnNotFound { name: String },

    #[error("IO error for '{context}': {source}")]
    Io {
        context: String,
        source: std::io::Error,
    },

    #[error("short read for '{context}': expected {expected} bytes, got {actual}")]
    ShortRead {
        context: String,
        expected: u64,
        actual: u64,
    },

    #[error("serialization error: {context}")]
    Serialization {
        context: String,
        source: StdErrorBoxed,
    },

    #[error(
        "rows of event {event} are not contiguous (resolved first row {first_row}, last row {last_row})"
    )]
    EventRowsNotContiguous {
        event: u64,
        first_row: i64,
        last_row: i64,
    },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::io("", e)
    }
}
