use std::borrow::Cow;
use stratus_settings::SettingsError;

/// A specialized [`RegistrationError`] enum of this crate.
#[stratus_derive::stratus_error]
pub enum RegistrationError {
    /// The workspace already holds a registration; nothing was written.
    #[error("Workspace is already registered{}", format_context(.context))]
    AlreadyRegistered { context: Option<Cow<'static, str>> },

    /// Missing or malformed request input.
    #[error("Invalid query{}: {message}", format_context(.context))]
    InvalidQuery { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The cloud answered, but not with anything usable.
    #[error("Cloud service rejected the request{}: {message}", format_context(.context))]
    Remote { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Transport failure talking to the cloud (connect, timeout, body decoding).
    #[error("Cloud transport error{}: {source}", format_context(.context))]
    Http { source: reqwest::Error, context: Option<Cow<'static, str>> },

    /// The registration blob is not base64-encoded JSON object data.
    #[error("Invalid registration blob{}: {message}", format_context(.context))]
    Decode { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Registration storage error{}: {source}", format_context(.context))]
    Settings { source: SettingsError, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal registration error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
