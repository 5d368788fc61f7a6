use std::error::Error;
use std::fmt::{self, Display, Debug};

pub trait ErrorDescription {
    fn description(&self) -> impl Display;
    fn code(&self) -> Option<i32> {
        None
    }
    fn error_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        None
    }
}

impl<T> ErrorDescription for T
where
    T: Display,
{
    fn description(&self) -> impl Display {
        self
    }
}

/// Error wrapper shared by every fallible operation in the crate.
///
/// The wrapped description decides the message, the optional numeric code
/// and the underlying cause.
pub struct GenericError<T>(pub T) where T: ErrorDescription;

impl<T> GenericError<T>
where
    T: ErrorDescription,
{
    pub const fn new(err: T) -> Self {
        Self(err)
    }

    pub fn into_inner(self) -> T {
        self.0
    }

    pub fn as_inner(&self) -> &T {
        &self.0
    }

    pub fn error_name(&self) -> &'static str {
        self.0.error_name()
    }

    pub fn code(&self) -> Option<i32> {
        self.0.code()
    }
}

impl<T> Debug for GenericError<T>
where
    T: ErrorDescription,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0.code() {
            Some(code) => write!(f, "GenericError({}): {} ({})", self.error_name(), self.0.description(), code),
            None => write!(f, "GenericError({}): {}", self.error_name(), self.0.description()),
        }
    }
}

impl<T> Display for GenericError<T>
where
    T: ErrorDescription,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.description())
    }
}

impl<T> Error for GenericError<T>
where
    T: ErrorDescription,
{
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.0.source()
    }
}

impl<T> From<T> for GenericError<T>
where
    T: ErrorDescription,
{
    fn from(err: T) -> Self {
        Self::new(err)
    }
}

#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleErrorDescription {
    /// The request contained no speakable words.
    NothingToSpeak,
}

impl ErrorDescription for ScheduleErrorDescription {
    #[allow(refining_impl_trait)]
    fn description(&self) -> &'static str {
        match self {
            Self::NothingToSpeak => "Nothing to speak",
        }
    }

    fn code(&self) -> Option<i32> {
        match self {
            Self::NothingToSpeak => Some(1),
        }
    }
}

pub type ScheduleError = GenericError<ScheduleErrorDescription>;

#[non_exhaustive]
#[derive(Debug)]
pub enum DictionaryErrorDescription {
    Io(std::io::Error),
    MalformedLine { line: usize, content: String },
    Empty,
    /// The background loader thread went away without answering.
    LoaderGone,
}

impl ErrorDescription for DictionaryErrorDescription {
    #[allow(refining_impl_trait)]
    fn description(&self) -> String {
        match self {
            Self::Io(e) => format!("Failed to read dictionary: {}", e),
            Self::MalformedLine { line, content } => format!("Malformed dictionary line {}: {:?}", line, content),
            Self::Empty => "Dictionary contains no entries".to_string(),
            Self::LoaderGone => "Dictionary loader exited before replying".to_string(),
        }
    }

    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

pub type DictionaryError = GenericError<DictionaryErrorDescription>;

impl From<std::io::Error> for DictionaryError {
    fn from(err: std::io::Error) -> Self {
        Self::new(DictionaryErrorDescription::Io(err))
    }
}

#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberErrorDescription {
    Negative,
    OutOfRange,
    NotNumeric,
}

impl ErrorDescription for NumberErrorDescription {
    #[allow(refining_impl_trait)]
    fn description(&self) -> &'static str {
        match self {
            Self::Negative => "Negative numbers are not convertible",
            Self::OutOfRange => "Number is outside the supported magnitude",
            Self::NotNumeric => "Token is not a number",
        }
    }
}

pub type NumberError = GenericError<NumberErrorDescription>;

#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamsErrorDescription {
    InvalidSpeakingRate(f64),
}

impl ErrorDescription for ParamsErrorDescription {
    #[allow(refining_impl_trait)]
    fn description(&self) -> String {
        match self {
            Self::InvalidSpeakingRate(rate) => format!("Speaking rate must be a positive number, got {}", rate),
        }
    }
}

pub type ParamsError = GenericError<ParamsErrorDescription>;
