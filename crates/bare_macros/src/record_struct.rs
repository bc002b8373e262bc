//! `BareRecord` for structs with named fields.

use quote::quote;

use crate::{mismatch_arm, schema_name};

pub fn derive(ident: &syn::Ident, data: &syn::DataStruct) -> syn::Result<proc_macro2::TokenStream> {
    let fields = match &data.fields {
        syn::Fields::Named(named) if !named.named.is_empty() => &named.named,
        syn::Fields::Named(_) | syn::Fields::Unit => {
            return Err(syn::Error::new(
                ident.span(),
                "BARE structs need at least one field",
            ))
        }
        syn::Fields::Unnamed(unnamed) => {
            return Err(syn::Error::new_spanned(
                unnamed,
                "BareRecord needs named fields",
            ))
        }
    };

    let type_name = ident.to_string();
    let field_count = fields.len();

    let idents = fields.iter().filter_map(|f| f.ident.as_ref()).collect::<Vec<_>>();
    let types = fields.iter().map(|f| &f.ty).collect::<Vec<_>>();
    let names = fields
        .iter()
        .zip(idents.iter())
        .map(|(f, i)| schema_name(&f.attrs, i))
        .collect::<syn::Result<Vec<_>>>()?;

    let mismatch = mismatch_arm(&type_name);

    Ok(quote! {
        impl ::bare::BareRecord for #ident {
            fn schema() -> ::bare::Schema {
                ::bare::Schema::structure([
                    #( (#names, <#types as ::bare::BareRecord>::schema()), )*
                ])
            }

            fn to_value(&self) -> ::bare::Value {
                ::bare::Value::Struct(::std::vec![
                    #( ::bare::BareRecord::to_value(&self.#idents), )*
                ])
            }

            fn from_value(
                value: ::bare::Value,
            ) -> ::std::result::Result<Self, ::bare::SchemaMismatch> {
                let fields = match value {
                    ::bare::Value::Struct(fields) if fields.len() == #field_count => fields,
                    ::bare::Value::Struct(fields) => {
                        return ::std::result::Result::Err(::bare::SchemaMismatch::new(
                            ::std::format!("{} with {} fields", #type_name, #field_count),
                            ::std::format!("struct with {} fields", fields.len()),
                        ))
                    }
                    #mismatch,
                };

                let mut fields = fields.into_iter();

                ::std::result::Result::Ok(Self {
                    #(
                        #idents: match fields.next() {
                            ::std::option::Option::Some(v) => <#types as ::bare::BareRecord>::from_value(v)?,
                            ::std::option::Option::None => {
                                return ::std::result::Result::Err(::bare::SchemaMismatch::new(#names, "nothing"))
                            }
                        },
                    )*
                })
            }
        }
    })
}
