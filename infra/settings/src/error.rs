use std::borrow::Cow;

#[stratus_derive::stratus_error]
pub enum SettingsError {
    #[error("Settings I/O failure{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Settings serialization failure{}: {source}", format_context(.context))]
    Serialization { source: serde_json::Error, context: Option<Cow<'static, str>> },

    /// The settings document on disk is valid JSON but not an object.
    #[error("Invalid settings document{}: {message}", format_context(.context))]
    InvalidDocument { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal settings error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
