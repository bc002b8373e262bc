//! `BareRecord` for enums.
//!
//! Fieldless enums map to BARE enums; enums with newtype variants map to
//! BARE unions.

use quote::quote;

use crate::{mismatch_arm, schema_name};

/// A variant with its resolved tag.
struct TaggedVariant<'a> {
    ident: &'a syn::Ident,
    name: String,
    tag: u64,
    /// Payload type of a newtype variant.
    payload: Option<&'a syn::Type>,
}

pub fn derive(ident: &syn::Ident, data: &syn::DataEnum) -> syn::Result<proc_macro2::TokenStream> {
    if data.variants.is_empty() {
        return Err(syn::Error::new(ident.span(), "BARE enums need at least one variant"));
    }

    let variants = tag_variants(data)?;

    match variants.iter().all(|v| v.payload.is_none()) {
        true => Ok(derive_enumeration(ident, &variants)),
        false => Ok(derive_union(ident, &variants)),
    }
}

/// Resolves tags: the explicit discriminant, or one past the previous tag.
fn tag_variants(data: &syn::DataEnum) -> syn::Result<Vec<TaggedVariant<'_>>> {
    let mut next_tag = 0u64;

    data.variants
        .iter()
        .map(|v| {
            let payload = match &v.fields {
                syn::Fields::Unit => None,
                syn::Fields::Unnamed(f) if f.unnamed.len() == 1 => f.unnamed.first().map(|f| &f.ty),
                fields => {
                    return Err(syn::Error::new_spanned(
                        fields,
                        "BareRecord variants must be unit or newtype variants",
                    ))
                }
            };

            let tag = match &v.discriminant {
                Some((_, expr)) => discriminant_value(expr)?,
                None => next_tag,
            };
            next_tag = tag.wrapping_add(1);

            Ok(TaggedVariant {
                ident: &v.ident,
                name: schema_name(&v.attrs, &v.ident)?,
                tag,
                payload,
            })
        })
        .collect()
}

fn discriminant_value(expr: &syn::Expr) -> syn::Result<u64> {
    match expr {
        syn::Expr::Lit(syn::ExprLit {
            lit: syn::Lit::Int(lit),
            ..
        }) => lit.base10_parse::<u64>(),
        _ => Err(syn::Error::new_spanned(
            expr,
            "BARE tags must be unsigned integer literals",
        )),
    }
}

fn derive_enumeration(ident: &syn::Ident, variants: &[TaggedVariant]) -> proc_macro2::TokenStream {
    let type_name = ident.to_string();
    let mismatch = mismatch_arm(&type_name);

    let names = variants.iter().map(|v| &v.name).collect::<Vec<_>>();
    let idents = variants.iter().map(|v| v.ident).collect::<Vec<_>>();
    let tags = variants.iter().map(|v| v.tag).collect::<Vec<_>>();

    quote! {
        impl ::bare::BareRecord for #ident {
            fn schema() -> ::bare::Schema {
                ::bare::Schema::enumeration([
                    #( (#names, #tags), )*
                ])
            }

            fn to_value(&self) -> ::bare::Value {
                match self {
                    #( Self::#idents => ::bare::Value::Enum(#tags), )*
                }
            }

            fn from_value(
                value: ::bare::Value,
            ) -> ::std::result::Result<Self, ::bare::SchemaMismatch> {
                match value {
                    #( ::bare::Value::Enum(#tags) => ::std::result::Result::Ok(Self::#idents), )*
                    ::bare::Value::Enum(other) => ::std::result::Result::Err(::bare::SchemaMismatch::new(
                        #type_name,
                        ::std::format!("enum value {}", other),
                    )),
                    #mismatch,
                }
            }
        }
    }
}

fn derive_union(ident: &syn::Ident, variants: &[TaggedVariant]) -> proc_macro2::TokenStream {
    let type_name = ident.to_string();
    let mismatch = mismatch_arm(&type_name);

    let schema_entries = variants.iter().map(|v| {
        let (name, tag) = (&v.name, v.tag);

        match v.payload {
            Some(ty) => quote! { (#name, #tag, <#ty as ::bare::BareRecord>::schema()) },
            None => quote! { (#name, #tag, ::bare::Schema::Void) },
        }
    });

    let to_value_arms = variants.iter().map(|v| {
        let (variant, tag) = (v.ident, v.tag);

        match v.payload {
            Some(_) => quote! {
                Self::#variant(inner) => ::bare::Value::union(#tag, ::bare::BareRecord::to_value(inner))
            },
            None => quote! {
                Self::#variant => ::bare::Value::union(#tag, ::bare::Value::Void)
            },
        }
    });

    let from_value_arms = variants.iter().map(|v| {
        let (variant, tag) = (v.ident, v.tag);

        match v.payload {
            Some(ty) => quote! {
                #tag => ::std::result::Result::Ok(Self::#variant(
                    <#ty as ::bare::BareRecord>::from_value(*value)?,
                ))
            },
            None => quote! {
                #tag => {
                    <() as ::bare::BareRecord>::from_value(*value)?;
                    ::std::result::Result::Ok(Self::#variant)
                }
            },
        }
    });

    quote! {
        impl ::bare::BareRecord for #ident {
            fn schema() -> ::bare::Schema {
                ::bare::Schema::union([
                    #( #schema_entries, )*
                ])
            }

            fn to_value(&self) -> ::bare::Value {
                match self {
                    #( #to_value_arms, )*
                }
            }

            fn from_value(
                value: ::bare::Value,
            ) -> ::std::result::Result<Self, ::bare::SchemaMismatch> {
                match value {
                    ::bare::Value::Union { tag, value } => match tag {
                        #( #from_value_arms, )*
                        other => ::std::result::Result::Err(::bare::SchemaMismatch::new(
                            #type_name,
                            ::std::format!("union tag {}", other),
                        )),
                    },
                    #mismatch,
                }
            }
        }
    }
}
