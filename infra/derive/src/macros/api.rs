use fxhash::FxHashSet;
use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::parse::Parser;
use syn::punctuated::Punctuated;
use syn::{Attribute, Expr, ExprLit, ItemFn, ItemStruct, Lit, LitStr, MetaNameValue, Token};

/// Options accepted by `#[api_model(...)]`.
#[derive(Default)]
struct ModelOptions {
    rename_all: Option<LitStr>,
    deny_unknown_fields: Option<bool>,
}

impl ModelOptions {
    fn parse(args: TokenStream) -> syn::Result<Self> {
        let pairs = Punctuated::<MetaNameValue, Token![,]>::parse_terminated.parse2(args)?;
        let mut options = Self::default();

        for pair in pairs {
            if pair.path.is_ident("rename_all") {
                if options.rename_all.is_some() {
                    return Err(syn::Error::new_spanned(pair, "duplicate `rename_all`"));
                }
                options.rename_all = Some(expect_str(&pair.value)?);
            } else if pair.path.is_ident("deny_unknown_fields") {
                if options.deny_unknown_fields.is_some() {
                    return Err(syn::Error::new_spanned(pair, "duplicate `deny_unknown_fields`"));
                }
                options.deny_unknown_fields = Some(expect_bool(&pair.value)?);
            } else {
                return Err(syn::Error::new_spanned(
                    pair.path,
                    "expected `rename_all = \"...\"` or `deny_unknown_fields = <bool>`",
                ));
            }
        }

        Ok(options)
    }
}

/// What the struct already declares through `#[serde(...)]`.
#[derive(Default)]
struct DeclaredSerde {
    rename_all: Option<LitStr>,
    deny_unknown_fields: bool,
}

impl DeclaredSerde {
    fn collect(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut declared = Self::default();

        for attr in attrs.iter().filter(|attr| attr.path().is_ident("serde")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename_all") {
                    declared.rename_all = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("deny_unknown_fields") {
                    declared.deny_unknown_fields = true;
                } else if meta.input.peek(Token![=]) {
                    // Not ours to interpret, but the value still has to be consumed.
                    let _: Expr = meta.value()?.parse()?;
                } else if meta.input.peek(syn::token::Paren) {
                    meta.parse_nested_meta(|nested| {
                        if nested.input.peek(Token![=]) {
                            let _: Expr = nested.value()?.parse()?;
                        }
                        Ok(())
                    })?;
                }
                Ok(())
            })?;
        }

        Ok(declared)
    }
}

pub fn expand_model(args: TokenStream, input: ItemStruct) -> TokenStream {
    match render_model(args, &input) {
        Ok(tokens) => tokens,
        Err(err) => err.to_compile_error(),
    }
}

fn render_model(args: TokenStream, input: &ItemStruct) -> syn::Result<TokenStream> {
    let options = ModelOptions::parse(args)?;
    let declared = DeclaredSerde::collect(&input.attrs)?;
    let derived = derived_idents(&input.attrs);

    let mut derives = Vec::new();
    if !derived.contains("Debug") {
        derives.push(quote! { Debug });
    }
    if !derived.contains("Serialize") {
        derives.push(quote! { ::serde::Serialize });
    }
    if !derived.contains("Deserialize") {
        derives.push(quote! { ::serde::Deserialize });
    }
    let derive_attr = if derives.is_empty() {
        TokenStream::new()
    } else {
        quote! { #[derive(#(#derives),*)] }
    };

    let schema_attr = if derived.contains("ToSchema") {
        TokenStream::new()
    } else {
        quote! { #[cfg_attr(feature = "server", derive(::utoipa::ToSchema))] }
    };

    let wanted_case =
        options.rename_all.unwrap_or_else(|| LitStr::new("camelCase", Span::call_site()));
    let rename_attr = match &declared.rename_all {
        None => quote! { #[serde(rename_all = #wanted_case)] },
        Some(existing) if existing.value() == wanted_case.value() => TokenStream::new(),
        Some(existing) => {
            return Err(syn::Error::new_spanned(
                existing,
                "serde rename_all conflicts with api_model; pass api_model(rename_all = \"...\")",
            ));
        },
    };

    let deny_attr = match (options.deny_unknown_fields.unwrap_or(true), declared.deny_unknown_fields)
    {
        (true, false) => quote! { #[serde(deny_unknown_fields)] },
        (true, true) => TokenStream::new(),
        (false, false) => TokenStream::new(),
        (false, true) => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "serde(deny_unknown_fields) is already set; remove it to disable strict fields",
            ));
        },
    };

    Ok(quote! {
        #derive_attr
        #schema_attr
        #rename_attr
        #deny_attr
        #input
    })
}

pub fn expand_handler(args: TokenStream, input: ItemFn) -> TokenStream {
    let ItemFn { attrs, vis, sig, block } = input;

    quote! {
        #(#attrs)*
        #[allow(clippy::unused_async)]
        #[cfg_attr(feature = "server", ::utoipa::path(#args))]
        #vis #sig #block
    }
}

fn expect_str(value: &Expr) -> syn::Result<LitStr> {
    match value {
        Expr::Lit(ExprLit { lit: Lit::Str(lit), .. }) => Ok(lit.clone()),
        other => Err(syn::Error::new_spanned(other, "expected a string literal")),
    }
}

fn expect_bool(value: &Expr) -> syn::Result<bool> {
    match value {
        Expr::Lit(ExprLit { lit: Lit::Bool(lit), .. }) => Ok(lit.value),
        other => Err(syn::Error::new_spanned(other, "expected `true` or `false`")),
    }
}

fn derived_idents(attrs: &[Attribute]) -> FxHashSet<String> {
    let mut idents = FxHashSet::default();

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("derive")) {
        let _ = attr.parse_nested_meta(|meta| {
            if let Some(segment) = meta.path.segments.last() {
                idents.insert(segment.ident.to_string());
            }
            Ok(())
        });
    }

    idents
}
