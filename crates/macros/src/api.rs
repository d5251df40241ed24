use proc_macro2::{Span, TokenStream};
use quote::{quote, quote_spanned};
use syn::{Attribute, Ident, Lit, Meta, MetaList, NestedMeta, spanned::Spanned};
use synstructure::{BindingInfo, Structure, VariantInfo};

#[derive(Debug)]
struct Error(TokenStream);

impl Error {
    fn new(span: Span, message: &str) -> Error {
        Error(quote_spanned! { span =>
            compile_error!(#message);
        })
    }

    fn into_tokens(self) -> TokenStream {
        self.0
    }
}

/// Values extracted from a single `#[api(...)]` attribute.
#[derive(Default)]
struct ApiMeta {
    internal: bool,
    status: Option<Ident>,
    code: Option<Lit>,
}

pub fn derive_error(s: Structure) -> TokenStream {
    let statuses = s.each_variant(|v| match variant_status(v) {
        Ok(v) => v,
        Err(e) => e.into_tokens(),
    });

    let codes = s.each_variant(|v| match variant_code(v) {
        Ok(v) => v,
        Err(e) => e.into_tokens(),
    });

    s.gen_impl(quote! {
        extern crate http;
        use std::borrow::Cow;

        gen impl ApiError for @Self {
            fn status(&self) -> http::StatusCode {
                match *self { #statuses }
            }

            fn code(&self) -> Option<Cow<str>> {
                match *self { #codes }
            }
        }
    })
}

/// Given a list of attributes find `#[api(...)]`, ensure there is only one of
/// them, and parse its contents.
fn parse_api(attrs: &[Attribute]) -> Result<Option<ApiMeta>, Error> {
    let mut attrs = attrs.iter()
        .filter_map(|attr| attr.parse_meta().ok())
        .filter(|meta| meta.path().is_ident("api"));

    let meta = match attrs.next() {
        Some(meta) => meta,
        None => return Ok(None),
    };

    let meta = match meta {
        Meta::List(meta) => meta,
        _ => return Err(Error::new(
            meta.span(),
            "api attribute must take a list in parentheses",
        )),
    };

    if let Some(meta) = attrs.next() {
        return Err(Error::new(
            meta.span(),
            "api attribute must be used exactly once",
        ));
    }

    parse_api_list(meta).map(Some)
}

fn parse_api_list(meta: MetaList) -> Result<ApiMeta, Error> {
    if meta.nested.is_empty() {
        return Err(Error::new(
            meta.span(),
            "api attribute requires at least one argument",
        ));
    }

    let span = meta.span();
    let mut api = ApiMeta::default();

    for item in meta.nested {
        match item {
            NestedMeta::Meta(Meta::Path(ref path)) if path.is_ident("internal") =>
                api.internal = true,
            NestedMeta::Meta(Meta::NameValue(ref nv)) if nv.path.is_ident("status") =>
                api.status = Some(match nv.lit {
                    Lit::Str(ref s) => Ident::new(&s.value(), s.span()),
                    _ => return Err(Error::new(nv.lit.span(), "expected a string")),
                }),
            NestedMeta::Meta(Meta::NameValue(ref nv)) if nv.path.is_ident("code") =>
                api.code = Some(nv.lit.clone()),
            _ => return Err(Error::new(
                item.span(),
                "expected one of: internal, code, status",
            )),
        }
    }

    if api.internal && (api.status.is_some() || api.code.is_some()) {
        return Err(Error::new(span, "internal errors can't have statuses or codes"));
    }

    Ok(api)
}

/// Find value of `ApiError::status()` for a variant.
fn variant_status(v: &VariantInfo) -> Result<TokenStream, Error> {
    let api = match parse_api(v.ast().attrs)? {
        Some(api) => api,
        None => return delegate_to_cause(v, |cause| quote!(#cause.status())),
    };

    Ok(match api.status {
        Some(status) => quote!(http::StatusCode::#status),
        None => quote!(http::StatusCode::INTERNAL_SERVER_ERROR),
    })
}

/// Find value of `ApiError::code()` for a variant.
fn variant_code(v: &VariantInfo) -> Result<TokenStream, Error> {
    let api = match parse_api(v.ast().attrs)? {
        Some(api) => api,
        None => return delegate_to_cause(v, |cause| quote!(#cause.code())),
    };

    Ok(match api.code {
        Some(code) => quote!(Some(Cow::Borrowed(#code))),
        None => quote!(None),
    })
}

/// For variants with no `#[api]` attribute delegate to the `#[cause]` field.
fn delegate_to_cause<F>(v: &VariantInfo, f: F) -> Result<TokenStream, Error>
where
    F: FnOnce(&BindingInfo) -> TokenStream,
{
    v.bindings()
        .iter()
        .find(is_cause)
        .map(f)
        .ok_or_else(|| Error::new(
            v.ast().ident.span(),
            "each variant must be #[api]-annotated or have a #[cause]",
        ))
}

fn is_cause(bi: &&BindingInfo) -> bool {
    bi.ast()
        .attrs
        .iter()
        .filter_map(|attr| attr.parse_meta().ok())
        .any(|meta| meta.path().is_ident("cause"))
}
