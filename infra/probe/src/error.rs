use std::borrow::Cow;

/// Failure of a single probe strategy. Never leaves this crate's public collector:
/// every error becomes a sentinel.
#[tether_derive::tether_error]
pub enum ProbeError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Command failed{}: {message}", format_context(.context))]
    ExitStatus { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The strategy ran but produced nothing usable.
    #[error("No value{}: {message}", format_context(.context))]
    Empty { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Unsupported platform{}: {message}", format_context(.context))]
    Unsupported { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal probe error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl ProbeError {
    pub(crate) fn empty(what: &'static str) -> Self {
        Self::Empty { message: Cow::Borrowed(what), context: None }
    }
}
