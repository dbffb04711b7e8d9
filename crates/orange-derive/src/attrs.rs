//! Field-level `#[orange(...)]` attribute parsing.

use syn::Result;
use syn::parse::{Parse, ParseStream};

/// Annotation that keeps a field out of its table.
pub(crate) const IGNORE_MARKER: &str = "-";

/// Parsed `#[orange(...)]` content of one field.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct FieldAttr {
    /// Raw `sql = "..."` value.
    pub sql: Option<String>,
    pub skip: bool,
}

impl FieldAttr {
    /// Annotation string stored in the field descriptor.
    pub(crate) fn annotation(&self) -> String {
        if self.skip {
            return IGNORE_MARKER.to_string();
        }
        self.sql.clone().unwrap_or_default()
    }

    pub(crate) fn is_ignored(&self) -> bool {
        self.skip || self.sql.as_deref().map(str::trim) == Some(IGNORE_MARKER)
    }

    fn merge(&mut self, other: FieldAttr) {
        if other.sql.is_some() {
            self.sql = other.sql;
        }
        self.skip |= other.skip;
    }
}

impl Parse for FieldAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = FieldAttr::default();

        while !input.is_empty() {
            let ident: syn::Ident = input.parse()?;
            if ident == "skip" {
                attr.skip = true;
            } else if ident == "sql" {
                let _: syn::Token![=] = input.parse()?;
                let value: syn::LitStr = input.parse()?;
                attr.sql = Some(value.value());
            } else {
                return Err(syn::Error::new_spanned(
                    &ident,
                    "unknown orange attribute, expected `sql = \"...\"` or `skip`",
                ));
            }

            if input.peek(syn::Token![,]) {
                let _: syn::Token![,] = input.parse()?;
            } else {
                break;
            }
        }

        if !input.is_empty() {
            return Err(input.error("unexpected tokens in orange attribute"));
        }
        Ok(attr)
    }
}

/// Collect every `#[orange(...)]` attribute on `field`.
pub(crate) fn field_attr(field: &syn::Field) -> Result<FieldAttr> {
    let mut out = FieldAttr::default();
    for attr in &field.attrs {
        if attr.path().is_ident("orange") {
            out.merge(attr.parse_args::<FieldAttr>()?);
        }
    }
    Ok(out)
}
