use std::fmt::{self, Display};
use nom::error::ErrorKind;

#[derive(Debug, Clone, PartialEq)]
enum InnerError {
    Incomplete,
    Context(&'static str),
    Nom(ErrorKind),
}

impl fmt::Display for InnerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            InnerError::Context(ctx) => write!(f, "invalid {}", ctx),
            InnerError::Nom(ErrorKind::Eof) => write!(f, "trailing input"),
            InnerError::Nom(_err) => write!(f, "unexpected input"),
            InnerError::Incomplete => write!(f, "expected more input"),
        }
    }
}

/// Error type that contains the reason of the error and the unconsumed input.
///
/// The outermost [context](nom::error::context) label is used when displaying the error.
#[derive(Clone, Debug, PartialEq)]
pub struct ParseError {
    stack: Vec<(String, InnerError)>,
}

impl ParseError {
    pub(crate) fn incomplete() -> ParseError {
        ParseError {
            stack: vec![(String::new(), InnerError::Incomplete)],
        }
    }

    /// The input that was left unconsumed at the point of the outermost failure.
    pub fn rest(&self) -> &str {
        self.outermost().0.as_str()
    }

    fn outermost(&self) -> &(String, InnerError) {
        self.stack
            .iter()
            .rev()
            .find(|(_, kind)| matches!(kind, InnerError::Context(_)))
            .unwrap_or(&self.stack[0])
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (input, kind) = self.outermost();
        let excerpt: String = input.chars().take_while(|c| *c != '\n').take(20).collect();

        if excerpt.is_empty() {
            write!(f, "{} at end of input", kind)
        } else {
            write!(f, "{} at: {}", kind, excerpt)
        }
    }
}

impl std::error::Error for ParseError {}

impl nom::error::ParseError<&str> for ParseError {
    fn from_error_kind(input: &str, kind: ErrorKind) -> Self {
        ParseError {
            stack: vec![(input.to_string(), InnerError::Nom(kind))],
        }
    }

    fn append(input: &str, kind: ErrorKind, mut other: Self) -> Self {
        other.stack.push((input.to_string(), InnerError::Nom(kind)));
        other
    }

    fn add_context(input: &str, ctx: &'static str, mut other: Self) -> Self {
        other.stack.push((input.to_string(), InnerError::Context(ctx)));
        other
    }
}

/// Error returned when a program image cannot be placed into memory.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadError {
    /// The image is longer than the 64 KiB address space.
    ImageTooLarge {
        /// Length of the rejected image in bytes.
        size: usize,
    },
}

impl Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LoadError::ImageTooLarge { size } => write!(
                f,
                "program image of {} bytes does not fit in {} bytes of memory",
                size,
                crate::memory::MEMORY_SIZE,
            ),
        }
    }
}

impl std::error::Error for LoadError {}
