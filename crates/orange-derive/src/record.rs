//! Record derive macro implementation

use crate::attrs::{field_attr, FieldAttr};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields, Result};

struct MappedField<'a> {
    ident: &'a syn::Ident,
    name: String,
    ty: &'a syn::Type,
    attr: FieldAttr,
}

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Record cannot be derived for generic structs",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Record can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Record can only be derived for structs",
            ));
        }
    };

    let mut mapped = Vec::with_capacity(fields.len());
    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            return Err(syn::Error::new_spanned(field, "expected a named field"));
        };
        mapped.push(MappedField {
            ident,
            name: ident.unraw().to_string(),
            ty: &field.ty,
            attr: field_attr(field)?,
        });
    }

    let type_name = name.unraw().to_string();
    let field_count = mapped.len();

    let descriptors = mapped.iter().map(|f| {
        let field_name = &f.name;
        let ty = f.ty;
        let annotation = f.attr.annotation();
        let kind = if f.attr.is_ignored() {
            quote!(::orange::Kind::Unsupported)
        } else {
            quote!(<#ty as ::orange::ColumnValue>::KIND)
        };
        quote! {
            ::orange::FieldDescriptor::new(#field_name, #kind, ::core::stringify!(#ty), #annotation)
        }
    });

    let active: Vec<_> = mapped.iter().filter(|f| !f.attr.is_ignored()).collect();

    let value_entries = active.iter().map(|f| {
        let ident = f.ident;
        let field_name = &f.name;
        quote! {
            (#field_name, ::orange::ColumnValue::to_value(&self.#ident))
        }
    });

    let staged: Vec<_> = active
        .iter()
        .enumerate()
        .map(|(i, _)| format_ident!("__orange_field_{}", i))
        .collect();
    let takes = active.iter().zip(&staged).map(|(f, var)| {
        let ty = f.ty;
        let field_name = &f.name;
        quote! {
            let #var = values.take::<#ty>(#field_name)?;
        }
    });
    let assigns = active.iter().zip(&staged).map(|(f, var)| {
        let ident = f.ident;
        quote! {
            if let ::std::option::Option::Some(value) = #var {
                self.#ident = value;
            }
        }
    });

    Ok(quote! {
        impl ::orange::Record for #name {
            const TYPE_NAME: &'static str = #type_name;

            fn fields() -> &'static [::orange::FieldDescriptor] {
                static FIELDS: [::orange::FieldDescriptor; #field_count] = [
                    #(#descriptors),*
                ];
                &FIELDS
            }

            fn values(&self) -> ::std::vec::Vec<(&'static str, ::orange::Value)> {
                ::std::vec![#(#value_entries),*]
            }

            fn apply(&mut self, values: &mut ::orange::ValueSet) -> ::orange::OrmResult<()> {
                #(#takes)*
                #(#assigns)*
                ::std::result::Result::Ok(())
            }
        }
    })
}
