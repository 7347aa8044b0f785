use std::borrow::Cow;
use tether_domain::machine::MachineCodeParseError;

/// Error types specific to the licensing feature.
#[tether_derive::tether_error(user_message = "Activation failed")]
pub enum LicenseError {
    /// The candidate is not 64 hex characters. Raised before any MAC is computed.
    #[user_message("Invalid activation code")]
    #[error("Activation code format invalid{}: {message}", format_context(.context))]
    Format { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Well-formed, but not the code for this machine under this key.
    #[user_message("Invalid activation code")]
    #[error("Activation code mismatch{}: {message}", format_context(.context))]
    Mismatch { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Codes are only issued against current machine codes.
    #[error("Cannot issue against a legacy machine code{}: {message}", format_context(.context))]
    LegacyIssuance { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid machine code{}: {source}", format_context(.context))]
    MachineCode { source: MachineCodeParseError, context: Option<Cow<'static, str>> },

    #[user_message("Failed to save activation information")]
    #[error("Activation record error{}: {source}", format_context(.context))]
    Vault { source: tether_vault::VaultError, context: Option<Cow<'static, str>> },

    #[user_message("Failed to save activation information")]
    #[error("Activation file is not valid JSON{}: {source}", format_context(.context))]
    Serialization { source: serde_json::Error, context: Option<Cow<'static, str>> },

    #[user_message("Failed to save activation information")]
    #[error("Activation file I/O failed{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal licensing error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl LicenseError {
    /// True when the candidate code itself was rejected.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::Format { .. } | Self::Mismatch { .. })
    }
}
