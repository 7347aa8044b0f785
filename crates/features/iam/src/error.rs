use std::borrow::Cow;

/// A specialized [`IamError`] enum of this crate.
#[tether_derive::tether_error]
pub enum IamError {
    /// Wrong admin password. The message is safe to show.
    #[error("Invalid password{}: {message}", format_context(.context))]
    InvalidPassword { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid input{}: {message}", format_context(.context))]
    InvalidInput { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The permission file is missing and could not be created.
    #[error("Permission configuration unavailable{}: {message}", format_context(.context))]
    Unavailable { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Permission file I/O failed{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Permission file is not valid JSON{}: {source}", format_context(.context))]
    Serialization { source: serde_json::Error, context: Option<Cow<'static, str>> },

    /// The actor task has stopped.
    #[error("Permission service stopped{}: {message}", format_context(.context))]
    ActorClosed { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal IAM error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl IamError {
    pub(crate) fn closed() -> Self {
        Self::ActorClosed { message: "request channel closed".into(), context: None }
    }
}
