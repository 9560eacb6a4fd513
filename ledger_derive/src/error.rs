//! `#[derive(Error)]` for error enums.
//!
//! Each variant carries an `#[error("...")]` message. Tuple fields are
//! referenced positionally (`{0}`), struct fields by name (`{expected}`).
//!
//! ```ignore
//! #[derive(Debug, ledger_derive::Error)]
//! pub enum StoreError {
//!     #[error("key not found")]
//!     NotFound,
//!     #[error("write failed: {0}")]
//!     WriteError(String),
//!     #[error("height {height} already holds {existing}")]
//!     Conflict { height: u64, existing: String },
//! }
//! ```

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{Attribute, Data, DeriveInput, Fields, LitStr, Variant, parse_macro_input};

pub fn derive_error(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let Data::Enum(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "Error derive only supports enums",
        ));
    };

    let arms = data
        .variants
        .iter()
        .map(display_arm)
        .collect::<syn::Result<Vec<_>>>()?;

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::std::fmt::Display for #name #ty_generics #where_clause {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                match self {
                    #(#arms)*
                }
            }
        }

        impl #impl_generics ::std::error::Error for #name #ty_generics #where_clause {}
    })
}

/// Builds the `match` arm that formats one variant.
fn display_arm(variant: &Variant) -> syn::Result<TokenStream2> {
    let ident = &variant.ident;
    let message = error_message(&variant.attrs, variant)?;

    Ok(match &variant.fields {
        Fields::Unit => quote! {
            Self::#ident => write!(f, #message),
        },
        Fields::Unnamed(fields) => {
            let bindings: Vec<_> = (0..fields.unnamed.len())
                .map(|i| format_ident!("f{}", i))
                .collect();
            let format = positional_to_named(&message, bindings.len());
            let used: Vec<_> = bindings
                .iter()
                .filter(|b| references(&format, &b.to_string()))
                .collect();
            quote! {
                #[allow(unused_variables)]
                Self::#ident(#(#bindings),*) => write!(f, #format, #(#used = #used),*),
            }
        }
        Fields::Named(fields) => {
            let names: Vec<_> = fields.named.iter().filter_map(|f| f.ident.as_ref()).collect();
            let used: Vec<_> = names
                .iter()
                .filter(|n| references(&message, &n.to_string()))
                .collect();
            quote! {
                #[allow(unused_variables)]
                Self::#ident { #(#names),* } => write!(f, #message, #(#used = #used),*),
            }
        }
    })
}

fn error_message(attrs: &[Attribute], variant: &Variant) -> syn::Result<String> {
    let attr = attrs
        .iter()
        .find(|a| a.path().is_ident("error"))
        .ok_or_else(|| {
            syn::Error::new_spanned(
                &variant.ident,
                format!(
                    "variant `{}` is missing #[error(\"...\")]",
                    variant.ident
                ),
            )
        })?;

    let lit: LitStr = attr.parse_args().map_err(|_| {
        syn::Error::new_spanned(attr, "expected a string literal: #[error(\"message\")]")
    })?;
    Ok(lit.value())
}

/// Named format arguments must all be referenced, so only pass the ones used.
fn references(message: &str, name: &str) -> bool {
    message.contains(&format!("{{{name}}}")) || message.contains(&format!("{{{name}:"))
}

/// Rewrites `{0}`, `{1}` into `{f0}`, `{f1}` so they bind to the match bindings.
fn positional_to_named(message: &str, count: usize) -> String {
    (0..count).rev().fold(message.to_string(), |acc, i| {
        acc.replace(&format!("{{{i}}}"), &format!("{{f{i}}}"))
            .replace(&format!("{{{i}:"), &format!("{{f{i}:"))
    })
}
