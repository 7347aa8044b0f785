#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by the licensing workspace.
//! Two attribute macros live here: the error-enum wiring used by every crate and the
//! async entry point that boots the Tokio runtime.
//!
//! ## Usage
//! ```toml
//! [dependencies]
//! tether-derive.workspace = true
//! ```
//!
//! Doc examples are `ignore`d because proc-macro crates cannot use their own macros.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemFn, parse_macro_input};

/// Turns `async fn main() -> Result<..>` into a plain `fn main` driven by `tether_runtime::run`.
///
/// # Arguments
///
/// * `cooperative` - Current-thread scheduler. Also the default with no arguments.
/// * `multi_thread` - One worker per available core.
/// * `workers = N` - Multi-thread with exactly `N` workers (clamped to `1..=64`).
/// * `thread_name = ".."` - Name for runtime threads.
///
/// # Examples
///
/// ```rust,ignore
/// #[tether_runtime::main(multi_thread, thread_name = "tether-batch")]
/// async fn main() -> anyhow::Result<()> {
/// # Ok(())
/// }
/// ```
#[proc_macro_attribute]
pub fn main(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::runtime::expand_main(args.into(), input).into()
}

/// Attribute macro for defining domain-specific error enums.
///
/// # Features
///
/// * **Automatic Derives**: Injects `#[derive(Debug, thiserror::Error)]` when missing.
/// * **Context Support**: Generates a companion `...Ext` trait that adds `.context()`
///   to any `Result` that can be converted into this error type.
/// * **Standard Conversions**: Implements `From<T>` for variants containing a `source` field,
///   enabling the use of the `?` operator for upstream errors.
/// * **Internal Fallback**: Provides `From<&'static str>` and `From<String>` when an
///   `Internal` variant is present.
/// * **Stable Codes**: Generates `code(&self) -> &'static str` returning the snake-cased
///   variant name. Callers log it and branch on it without matching every variant.
/// * **User Messages**: Variants tagged `#[user_message("...")]` get that text from a generated
///   `user_message(&self) -> &'static str`. Untagged variants fall back to the
///   `user_message = "..."` macro argument, or to `"Operation failed"`. Nothing is generated
///   when neither the argument nor any tag is present.
///
/// # Requirements
///
/// 1. The macro must be applied to an **enum**.
/// 2. Variants that support context must include a `context: Option<Cow<'static, str>>` field.
/// 3. Variants wrapping external errors must include a `source: T` field or a field marked
///    with `#[source]`/`#[from]`.
/// 4. Tuple or unit variants are rejected to keep error wiring explicit.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[tether_derive::tether_error(user_message = "Storage unavailable")]
/// pub enum StoreError {
///     #[user_message("Could not read the activation file")]
///     #[error("IO error{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal fault{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn load(path: &Path) -> Result<Vec<u8>, StoreError> {
///     std::fs::read(path).context("Reading activation file")
/// }
///
/// let err = StoreError::from("boom");
/// assert_eq!(err.code(), "internal");
/// assert_eq!(err.user_message(), "Storage unavailable");
/// ```
#[proc_macro_attribute]
pub fn tether_error(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand(args.into(), input).into()
}
