use std::borrow::Cow;

/// Error types specific to the licensing feature.
#[stratus_derive::stratus_error]
pub enum LicenseError {
    /// The license file could not be read.
    #[error("License file I/O error{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    /// The license file is not a JSON array of license records.
    #[error("Malformed license records{}: {source}", format_context(.context))]
    Parse { source: serde_json::Error, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal licensing error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
