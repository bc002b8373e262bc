//! Derive macro for `bare_core::BareRecord`.

use quote::quote;
use syn::DeriveInput;

mod record_enum;
mod record_struct;

/// Derives `BareRecord` for a struct or enum.
///
/// - structs with named fields become BARE structs, fields in declaration order.
/// - enums whose variants are all unit variants become BARE enums. Member
///   values are the explicit discriminants, or count up from the previous one.
/// - enums with newtype variants become BARE unions tagged the same way.
///   Unit variants in such an enum carry a `void` payload.
///
/// Schema names default to the Rust identifiers and can be overridden with
/// `#[bare(rename = "...")]`.
///
/// ```ignore
/// #[derive(BareRecord)]
/// enum UserRole {
///     Admin,
///     User,
///     Guest,
/// }
///
/// #[derive(BareRecord)]
/// struct User {
///     #[bare(rename = "ID")]
///     id: Uint,
///     role: UserRole,
///     session: Option<Session>,
/// }
/// ```
#[proc_macro_derive(BareRecord, attributes(bare))]
pub fn derive_bare_record(item: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = syn::parse_macro_input!(item as DeriveInput);

    let res = match check_generics(&input) {
        Ok(()) => match &input.data {
            syn::Data::Struct(data) => record_struct::derive(&input.ident, data),
            syn::Data::Enum(data) => record_enum::derive(&input.ident, data),
            syn::Data::Union(u) => Err(syn::Error::new(
                u.union_token.span,
                "BareRecord cannot be derived for untagged unions",
            )),
        },
        Err(e) => Err(e),
    };

    match res {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

/// Schemas are static, so generic records are not supported.
fn check_generics(input: &DeriveInput) -> syn::Result<()> {
    match input.generics.params.is_empty() {
        true => Ok(()),
        false => Err(syn::Error::new_spanned(
            &input.generics,
            "BareRecord cannot be derived for generic types",
        )),
    }
}

/// Returns the schema name of a field or variant, honoring `#[bare(rename = "...")]`.
pub(crate) fn schema_name(attrs: &[syn::Attribute], ident: &syn::Ident) -> syn::Result<String> {
    let mut name = ident.to_string();

    for attr in attrs.iter().filter(|a| a.path().is_ident("bare")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                let lit: syn::LitStr = meta.value()?.parse()?;
                name = lit.value();
                Ok(())
            } else {
                Err(meta.error("unsupported bare attribute"))
            }
        })?;
    }

    Ok(name)
}

/// Catch-all match arm for generated `from_value` impls: returns early for a
/// value of the wrong shape, so it fits both tail and `let` matches.
pub(crate) fn mismatch_arm(type_name: &str) -> proc_macro2::TokenStream {
    quote! {
        other => return ::std::result::Result::Err(::bare::mismatch(#type_name, &other))
    }
}
