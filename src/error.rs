use thiserror::Error as ThisError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A line's token shape does not match the expected grammar.
    Format,
    /// A malformed numeric literal.
    Parse,
    UnexpectedEof,
    UnknownDirective,
    UnknownBlock,
    Cardinality,
    ShapeMismatch,
    UnrecognizedParameter,
    MissingParameter,
    Io,
}

/// 1-based position of the offending line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, ThisError)]
#[error("{message}{}", DisplayLocation(.location))]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
    pub location: Option<Location>,
}

struct DisplayLocation<'a>(&'a Option<Location>);

impl std::fmt::Display for DisplayLocation<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(location) => write!(f, " (line {}, column {})", location.line, location.column),
            None => Ok(()),
        }
    }
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            location: None,
        }
    }

    pub fn format(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Format, message)
    }

    /// Token-count mismatch for a line with the given expected arity.
    pub fn arity(expected: usize, what: &str, found: usize) -> Self {
        Self::format(format!(
            "expected {expected} space-separated token(s) for {what}, found {found}"
        ))
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Parse, message)
    }

    pub fn unexpected_eof(context: &str) -> Self {
        Self::new(
            ErrorKind::UnexpectedEof,
            format!("unexpected end of input in {context}"),
        )
    }

    pub fn unknown_directive(directive: &str) -> Self {
        Self::new(
            ErrorKind::UnknownDirective,
            format!("unknown array directive `{directive}`"),
        )
    }

    pub fn unknown_block(name: &str) -> Self {
        Self::new(ErrorKind::UnknownBlock, format!("unknown block `{name}`"))
    }

    pub fn cardinality(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cardinality, message)
    }

    pub fn shape_mismatch(expected: &[usize], found: &[usize]) -> Self {
        Self::new(
            ErrorKind::ShapeMismatch,
            format!("shape mismatch: expected {expected:?}, found {found:?}"),
        )
    }

    pub fn unrecognized_parameter(block: &str, key: &str) -> Self {
        Self::new(
            ErrorKind::UnrecognizedParameter,
            format!("unrecognized parameter `{key}` in block `{block}`"),
        )
    }

    pub fn missing_parameter(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MissingParameter, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, message)
    }

    pub fn with_location(mut self, line: usize, column: usize) -> Self {
        self.location = Some(Location { line, column });
        self
    }

    /// Attach a line number unless the error already carries one.
    pub fn at_line(self, line: usize) -> Self {
        if self.location.is_some() {
            return self;
        }
        self.with_location(line, 1)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::io(format!("i/o failure: {err}"))
    }
}
