//! `#[derive(Retryable)]` for enums, honoring a `#[retryable]` attribute on
//! the variants that report `true` from
//! [`Retryable::is_retryable`](https://docs.rs/nebula-error).

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields};

/// Derive [`nebula_error::Retryable`] for an enum, marking variants
/// `#[retryable]` to have them report `true`. Variants without the
/// attribute report `false`. Struct variants and fields are matched
/// positionally with `..`, so field names never need to be repeated.
#[proc_macro_derive(Retryable, attributes(retryable))]
pub fn derive_retryable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let Data::Enum(data) = &input.data else {
        return syn::Error::new_spanned(&input, "#[derive(Retryable)] only supports enums")
            .to_compile_error()
            .into();
    };

    let arms = data.variants.iter().map(|variant| {
        let variant_ident = &variant.ident;
        let retryable = variant
            .attrs
            .iter()
            .any(|attr| attr.path().is_ident("retryable"));

        let pattern = match &variant.fields {
            Fields::Named(_) => quote! { #name::#variant_ident { .. } },
            Fields::Unnamed(_) => quote! { #name::#variant_ident(..) },
            Fields::Unit => quote! { #name::#variant_ident },
        };

        quote! { #pattern => #retryable }
    });

    let expanded = quote! {
        impl ::nebula_error::Retryable for #name {
            fn is_retryable(&self) -> bool {
                match self {
                    #(#arms,)*
                }
            }
        }
    };

    expanded.into()
}
