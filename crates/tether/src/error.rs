use std::borrow::Cow;

/// Errors raised while assembling an [`Engine`](crate::Engine).
#[tether_derive::tether_error]
pub enum EngineError {
    #[error("Record codec setup failed{}: {source}", format_context(.context))]
    Vault { source: tether_vault::VaultError, context: Option<Cow<'static, str>> },

    #[error("Secret material rejected{}: {source}", format_context(.context))]
    Secrets { source: tether_secrets::SecretsError, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal engine error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
