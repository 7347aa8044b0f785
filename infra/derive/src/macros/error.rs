use fxhash::FxHashSet;
use proc_macro2::{Span, TokenStream};
use quote::{format_ident, quote};
use syn::parse::Parser;
use syn::punctuated::Punctuated;
use syn::token::Comma;
use syn::{
    Attribute, Data, DeriveInput, Error, Fields, FieldsNamed, GenericArgument, Ident, LitStr,
    PathArguments, Result, Type, Variant,
};

/// Variant attribute carrying the text safe to show to an end user.
const USER_MESSAGE: &str = "user_message";
const DEFAULT_USER_MESSAGE: &str = "Operation failed";

/// An error enum after validation. Helper attributes are already stripped from `input`.
struct ErrorEnum {
    input: DeriveInput,
    variants: Vec<ErrorVariant>,
    user_fallback: Option<LitStr>,
}

struct ErrorVariant {
    ident: Ident,
    code: String,
    source: Option<(Ident, Type)>,
    has_context: bool,
    user_message: Option<LitStr>,
    cfg_attrs: Vec<Attribute>,
}

/// Expands `#[tether_error]` / `#[tether_error(user_message = "..")]`.
pub fn expand(args: TokenStream, input: DeriveInput) -> TokenStream {
    ErrorEnum::parse(args, input).map_or_else(|err| err.to_compile_error(), |model| model.expand())
}

impl ErrorEnum {
    fn parse(args: TokenStream, mut input: DeriveInput) -> Result<Self> {
        let mut user_fallback = None;
        syn::meta::parser(|meta| {
            if meta.path.is_ident(USER_MESSAGE) {
                user_fallback = Some(meta.value()?.parse::<LitStr>()?);
                Ok(())
            } else {
                Err(meta.error("unsupported tether_error argument, expected `user_message`"))
            }
        })
        .parse2(args)?;

        let Data::Enum(data) = &mut input.data else {
            return Err(Error::new_spanned(&input.ident, "tether_error can only be applied to enums"));
        };
        let variants = data.variants.iter_mut().map(ErrorVariant::parse).collect::<Result<_>>()?;

        Ok(Self { input, variants, user_fallback })
    }

    fn expand(&self) -> TokenStream {
        let input = &self.input;
        let name = &input.ident;
        let ext = format_ident!("{name}Ext");

        let derives = missing_derives(input);
        let context = self.context_trait(&ext);
        let codes = self.code_fn();
        let user = self.user_message_fn();
        let conversions = self.variants.iter().filter_map(|v| v.source_conversion(name, &ext));
        let internal = self.internal_conversions();

        quote! {
            #[allow(non_shorthand_field_patterns)]
            #derives
            #input

            #context
            #codes
            #user
            #(#conversions)*
            #internal

            #[allow(dead_code)]
            fn format_context(context: &Option<std::borrow::Cow<'static, str>>) -> std::borrow::Cow<'static, str> {
                context.as_ref().map_or(std::borrow::Cow::Borrowed(""), |c| std::borrow::Cow::Owned(format!(" ({c})")))
            }
        }
    }

    fn context_trait(&self, ext: &Ident) -> TokenStream {
        let name = &self.input.ident;
        let arms = self.variants.iter().filter(|v| v.has_context).map(|v| {
            let (cfg, ident) = (&v.cfg_attrs, &v.ident);
            quote! { #(#cfg)* #name::#ident { context: c, .. } => *c = Some(context.into()), }
        });

        quote! {
            pub trait #ext<T> {
                fn context(self, context: impl Into<std::borrow::Cow<'static, str>>) -> Result<T, #name>;
            }

            #[automatically_derived]
            impl<T> #ext<T> for Result<T, #name> {
                #[inline]
                fn context(self, context: impl Into<std::borrow::Cow<'static, str>>) -> Self {
                    self.map_err(|mut e| {
                        match &mut e {
                            #( #arms )*
                            _ => {}
                        }
                        e
                    })
                }
            }
        }
    }

    fn code_fn(&self) -> TokenStream {
        let name = &self.input.ident;
        let arms = self.variants.iter().map(|v| {
            let (cfg, ident) = (&v.cfg_attrs, &v.ident);
            let code = LitStr::new(&v.code, ident.span());
            quote! { #(#cfg)* Self::#ident { .. } => #code, }
        });

        quote! {
            #[automatically_derived]
            impl #name {
                /// Stable, snake-cased identifier of the error variant.
                #[must_use]
                pub const fn code(&self) -> &'static str {
                    match self {
                        #( #arms )*
                    }
                }
            }
        }
    }

    /// Only generated when the enum opts in with an argument or a variant attribute.
    fn user_message_fn(&self) -> TokenStream {
        if self.user_fallback.is_none() && self.variants.iter().all(|v| v.user_message.is_none()) {
            return quote!();
        }

        let name = &self.input.ident;
        let fallback = self
            .user_fallback
            .clone()
            .unwrap_or_else(|| LitStr::new(DEFAULT_USER_MESSAGE, Span::call_site()));
        let arms = self.variants.iter().filter_map(|v| {
            let message = v.user_message.as_ref()?;
            let (cfg, ident) = (&v.cfg_attrs, &v.ident);
            Some(quote! { #(#cfg)* Self::#ident { .. } => #message, })
        });

        quote! {
            #[automatically_derived]
            impl #name {
                /// Text safe to show to an end user. Never includes sources or context.
                #[must_use]
                #[allow(unreachable_patterns)]
                pub const fn user_message(&self) -> &'static str {
                    match self {
                        #( #arms )*
                        _ => #fallback,
                    }
                }
            }
        }
    }

    fn internal_conversions(&self) -> TokenStream {
        let Some(internal) = self.variants.iter().find(|v| v.ident == "Internal") else {
            return quote!();
        };
        let name = &self.input.ident;
        let cfg = &internal.cfg_attrs;

        quote! {
            #(#cfg)*
            impl From<&'static str> for #name {
                #[inline]
                fn from(s: &'static str) -> Self { Self::Internal { message: std::borrow::Cow::Borrowed(s), context: None } }
            }
            #(#cfg)*
            impl From<String> for #name {
                #[inline]
                fn from(s: String) -> Self { Self::Internal { message: std::borrow::Cow::Owned(s), context: None } }
            }
        }
    }
}

impl ErrorVariant {
    fn parse(variant: &mut Variant) -> Result<Self> {
        let user_message = take_user_message(&mut variant.attrs)?;

        let Fields::Named(fields) = &variant.fields else {
            return Err(Error::new_spanned(
                &variant.ident,
                "tether_error requires named fields for source/context handling",
            ));
        };

        let has_context = has_context_field(fields)?;
        let source = source_field(fields);
        if source.is_some() && !has_context {
            return Err(Error::new_spanned(
                &variant.ident,
                "tether_error requires `context: Option<Cow<'static, str>>` for variants with a source",
            ));
        }

        Ok(Self {
            code: snake_case(&variant.ident.to_string()),
            ident: variant.ident.clone(),
            source,
            has_context,
            user_message,
            cfg_attrs: variant.attrs.iter().filter(|a| a.path().is_ident("cfg")).cloned().collect(),
        })
    }

    /// `From<Source>` plus the `.context()` shortcut on `Result<T, Source>`.
    fn source_conversion(&self, name: &Ident, ext: &Ident) -> Option<TokenStream> {
        if self.ident == "Internal" {
            return None;
        }
        let (field, ty) = self.source.as_ref()?;
        let (cfg, ident) = (&self.cfg_attrs, &self.ident);

        Some(quote! {
            #(#cfg)*
            #[automatically_derived]
            impl From<#ty> for #name {
                #[inline]
                fn from(#field: #ty) -> Self { Self::#ident { #field, context: None } }
            }

            #(#cfg)*
            impl<T> #ext<T> for std::result::Result<T, #ty> {
                #[inline]
                fn context(self, context: impl Into<std::borrow::Cow<'static, str>>) -> std::result::Result<T, #name> {
                    self.map_err(|#field| #name::#ident { #field, context: Some(context.into()) })
                }
            }
        })
    }
}

/// Removes `#[user_message("..")]` so the re-emitted enum only carries attributes rustc knows.
fn take_user_message(attrs: &mut Vec<Attribute>) -> Result<Option<LitStr>> {
    let Some(pos) = attrs.iter().position(|a| a.path().is_ident(USER_MESSAGE)) else {
        return Ok(None);
    };
    let attr = attrs.remove(pos);
    if let Some(dup) = attrs.iter().find(|a| a.path().is_ident(USER_MESSAGE)) {
        return Err(Error::new_spanned(dup, "duplicate `user_message` attribute"));
    }
    attr.parse_args::<LitStr>().map(Some)
}

fn has_context_field(fields: &FieldsNamed) -> Result<bool> {
    let Some(field) = fields.named.iter().find(|f| f.ident.as_ref().is_some_and(|i| i == "context"))
    else {
        return Ok(false);
    };
    if is_context_type(&field.ty) {
        Ok(true)
    } else {
        Err(Error::new_spanned(&field.ty, "context field must be Option<Cow<'static, str>>"))
    }
}

/// The field named `source`, or one marked `#[source]` / `#[from]`.
fn source_field(fields: &FieldsNamed) -> Option<(Ident, Type)> {
    fields
        .named
        .iter()
        .find(|field| {
            field.ident.as_ref().is_some_and(|i| i == "source")
                || field.attrs.iter().any(|a| a.path().is_ident("source") || a.path().is_ident("from"))
        })
        .and_then(|field| Some((field.ident.clone()?, field.ty.clone())))
}

/// `Debug` and `thiserror::Error`, unless the enum already derives them.
fn missing_derives(input: &DeriveInput) -> TokenStream {
    let mut present = FxHashSet::default();
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("derive")) {
        let _ = attr.parse_nested_meta(|meta| {
            if let Some(seg) = meta.path.segments.last() {
                present.insert(seg.ident.to_string());
            }
            Ok(())
        });
    }

    let mut derives = Vec::new();
    if !present.contains("Debug") {
        derives.push(quote! { Debug });
    }
    if !present.contains("Error") {
        derives.push(quote! { ::thiserror::Error });
    }
    if derives.is_empty() { quote!() } else { quote! { #[derive(#(#derives),*)] } }
}

/// `InvalidPayload` -> `invalid_payload`, `IOFailure` -> `io_failure`.
fn snake_case(ident: &str) -> String {
    let chars: Vec<char> = ident.chars().collect();
    let mut out = String::with_capacity(ident.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if i > 0 && c.is_uppercase() {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_lower) {
                out.push('_');
            }
        }
        out.extend(c.to_lowercase());
    }

    out
}

fn generic_args<'a>(ty: &'a Type, name: &str) -> Option<&'a Punctuated<GenericArgument, Comma>> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last().filter(|seg| seg.ident == name)?;
    match &segment.arguments {
        PathArguments::AngleBracketed(args) => Some(&args.args),
        _ => None,
    }
}

/// Matches `Option<Cow<'static, str>>`, with or without path prefixes.
fn is_context_type(ty: &Type) -> bool {
    let inner = generic_args(ty, "Option").and_then(|args| match args.first() {
        Some(GenericArgument::Type(inner)) if args.len() == 1 => Some(inner),
        _ => None,
    });
    let Some(cow) = inner.and_then(|inner| generic_args(inner, "Cow")) else {
        return false;
    };

    let mut args = cow.iter();
    matches!(
        (args.next(), args.next(), args.next()),
        (Some(GenericArgument::Lifetime(lt)), Some(GenericArgument::Type(Type::Path(s))), None)
            if lt.ident == "static" && s.path.segments.last().is_some_and(|seg| seg.ident == "str")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn snake_cases_variant_names() {
        assert_eq!(snake_case("Format"), "format");
        assert_eq!(snake_case("InvalidPayload"), "invalid_payload");
        assert_eq!(snake_case("IOFailure"), "io_failure");
        assert_eq!(snake_case("LegacyIssuance"), "legacy_issuance");
        assert_eq!(snake_case("Sha256Mismatch"), "sha256_mismatch");
    }

    #[test]
    fn recognizes_context_type() {
        assert!(is_context_type(&parse_quote!(Option<Cow<'static, str>>)));
        assert!(is_context_type(&parse_quote!(Option<std::borrow::Cow<'static, str>>)));
        assert!(!is_context_type(&parse_quote!(Option<String>)));
        assert!(!is_context_type(&parse_quote!(Option<Cow<'a, str>>)));
    }

    #[test]
    fn strips_user_message_attribute() {
        let mut variant: Variant = parse_quote! {
            #[user_message("Invalid activation code")]
            #[error("format")]
            Format { message: String, context: Option<Cow<'static, str>> }
        };
        let parsed = ErrorVariant::parse(&mut variant).unwrap();
        assert_eq!(parsed.user_message.map(|m| m.value()).as_deref(), Some("Invalid activation code"));
        assert_eq!(variant.attrs.len(), 1);
        assert!(parsed.has_context);
    }

    #[test]
    fn source_without_context_is_rejected() {
        let mut variant: Variant = parse_quote! { Io { source: std::io::Error } };
        assert!(ErrorVariant::parse(&mut variant).is_err());
    }
}
