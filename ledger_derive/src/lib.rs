//! Derive macros for the ledger crate.
//!
//! - `#[derive(BinaryCodec)]` writes `Encode`/`Decode` impls that serialize
//!   struct fields in declaration order.
//! - `#[derive(Error)]` writes `Display` and `std::error::Error` from
//!   `#[error("...")]` attributes.

mod binary_codec;
mod error;

use proc_macro::TokenStream;

/// Implements `Encode` and `Decode` for a struct, field by field.
#[proc_macro_derive(BinaryCodec)]
pub fn derive_binary_codec(input: TokenStream) -> TokenStream {
    binary_codec::derive_binary_codec(input)
}

/// Implements `Display` and `Error` for an error enum.
#[proc_macro_derive(Error, attributes(error))]
pub fn derive_error(input: TokenStream) -> TokenStream {
    error::derive_error(input)
}
