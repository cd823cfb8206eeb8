use crate::lexer::SourceRange;
use ariadne::{Color, Label, Report, ReportKind, Source};
use std::fmt;
use std::ops::Range;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorType {
    Parse,
    UnknownLabel,
    UninitializedRegister,
    EmptyCallStack,
    DivisionByZero,
    Overflow,
    StepLimitExceeded,
    Io,
}

impl ErrorType {
    fn title(&self) -> &'static str {
        match self {
            ErrorType::Parse => "Parse error",
            ErrorType::UnknownLabel => "Unknown label",
            ErrorType::UninitializedRegister => "Uninitialized register",
            ErrorType::EmptyCallStack => "Empty call stack",
            ErrorType::DivisionByZero => "Division by zero",
            ErrorType::Overflow => "Arithmetic overflow",
            ErrorType::StepLimitExceeded => "Step limit exceeded",
            ErrorType::Io => "I/O error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    pub error_type: ErrorType,
    pub message: String,
    pub range: Option<SourceRange>,
}

impl Error {
    pub fn new(error_type: ErrorType, message: String) -> Self {
        Self {
            error_type,
            message,
            range: None,
        }
    }

    pub fn new_with_range(error_type: ErrorType, message: String, range: SourceRange) -> Self {
        Self {
            error_type,
            message,
            range: Some(range),
        }
    }

    /// Attaches `range` unless the error already points somewhere more precise.
    pub fn or_range(mut self, range: Option<SourceRange>) -> Self {
        if self.range.is_none() {
            self.range = range;
        }
        self
    }

    pub fn print(&self, file: &str, source: &str) -> std::io::Result<()> {
        let offset = self.range.map(|r| r.start).unwrap_or(0);

        let mut report = Report::build(ReportKind::Error, file, offset)
            .with_message(format!("{}: {}", self.error_type.title(), self.message));

        if let Some(range) = self.range {
            report = report.with_label(
                Label::new((file, Range::from(range)))
                    .with_message(&self.message)
                    .with_color(Color::Red),
            );
        }

        report.finish().eprint((file, Source::from(source)))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error_type.title(), self.message)
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::new(ErrorType::Io, error.to_string())
    }
}
