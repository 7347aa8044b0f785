use std::borrow::Cow;

#[tether_derive::tether_error]
pub enum SecretsError {
    /// A required secret was not supplied by any permitted source.
    #[error("Missing secret{}: {message}", format_context(.context))]
    Missing { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid secret length{}: {message}", format_context(.context))]
    InvalidLength { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid secret encoding{}: {message}", format_context(.context))]
    InvalidEncoding { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The development secrets file exists but cannot be parsed.
    #[error("Secrets file error{}: {source}", format_context(.context))]
    DevFile { source: config::ConfigError, context: Option<Cow<'static, str>> },

    #[error("Internal secrets error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
