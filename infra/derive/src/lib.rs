#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by every Stratus crate.
//!
//! * [`stratus_error`] turns an enum into a contextual `thiserror` error type.
//! * [`stratus_slice`] wraps a feature state struct into a cheaply clonable slice handle.
//! * [`api_model`] and [`api_handler`] keep DTOs and Axum handlers consistent with the
//!   `OpenAPI` documentation.
//!
//! The examples below are `ignore`d because they need the consuming crates in scope.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemFn, ItemStruct, parse_macro_input};

/// Defines a domain error enum with context support.
///
/// # Generated Items
///
/// * `#[derive(Debug, thiserror::Error)]` unless already present.
/// * A `<ErrorName>Ext` trait adding `.context(...)` to `Result<T, ErrorName>` and to
///   `Result<T, Source>` for every variant that wraps a `source`.
/// * `From<Source>` for those variants, so `?` converts upstream errors.
/// * `From<&'static str>` and `From<String>` when the enum has an `Internal` variant.
/// * A private `format_context` helper for use inside `#[error(...)]` strings.
///
/// # Requirements
///
/// Variants must use named fields. A variant with a `source` (or a field marked
/// `#[source]`/`#[from]`) must also have `context: Option<Cow<'static, str>>`.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[stratus_derive::stratus_error]
/// pub enum SettingsError {
///     #[error("Settings I/O error{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal settings error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn load(path: &std::path::Path) -> Result<Vec<u8>, SettingsError> {
///     std::fs::read(path).context("Reading settings document")
/// }
/// ```
#[proc_macro_attribute]
pub fn stratus_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand(input).into()
}

/// Turns a struct into a feature slice handle.
///
/// The annotated struct becomes `<Name>Inner`; `<Name>` is generated as an `Arc` wrapper
/// that derefs to the inner state and implements
/// `stratus_kernel::domain::registry::FeatureSlice`.
///
/// # Example
/// ```rust,ignore
/// #[stratus_derive::stratus_slice]
/// pub struct Registration {
///     pub flow: RegistrationFlow,
/// }
///
/// let slice = Registration::new(RegistrationInner { flow });
/// ```
#[proc_macro_attribute]
pub fn stratus_slice(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::slice::expand(input).into()
}

/// Declares an API data model.
///
/// Adds `Debug`, `Serialize` and `Deserialize` when missing, `utoipa::ToSchema` when the
/// consuming crate enables its `server` feature, and serde `rename_all = "camelCase"` plus
/// `deny_unknown_fields` by default.
///
/// # Arguments
///
/// * `rename_all = "..."` overrides the rename policy.
/// * `deny_unknown_fields = false` accepts unknown fields.
///
/// # Example
///
/// ```rust,ignore
/// #[stratus_derive::api_model]
/// pub struct CreateIntentRequest {
///     pub resend: bool,
///     pub email: String,
/// }
/// ```
#[proc_macro_attribute]
pub fn api_model(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::api::expand_model(attr.into(), input).into()
}

/// Registers an Axum handler with `utoipa::path` when the `server` feature is enabled.
///
/// Accepts the usual `utoipa::path` arguments (`get`, `post`, `path = "..."`,
/// `params(...)`, `responses(...)`, `tag = "..."`).
///
/// # Example
///
/// ```rust,ignore
/// #[stratus_derive::api_handler(
///     get,
///     path = "/health",
///     responses((status = OK, body = HealthResponse)),
///     tag = SYSTEM_TAG,
/// )]
/// pub async fn health_handler() -> impl IntoResponse { /* ... */ }
/// ```
#[proc_macro_attribute]
pub fn api_handler(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::api::expand_handler(args.into(), input).into()
}
