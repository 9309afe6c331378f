//! Attribute parsing for `#[envira(...)]` annotations.
//!
//! This module extracts and validates configuration attributes from structs,
//! fields, enums and variants during macro expansion.

use syn::{Attribute, Expr, Field, LitStr, Path};

fn envira_attrs(attrs: &[Attribute]) -> impl Iterator<Item = &Attribute> {
    attrs.iter().filter(|attr| attr.path().is_ident("envira"))
}

/// Parsed struct-level `#[envira(...)]` attributes.
#[derive(Debug, Default)]
pub struct StructAttrs {
    /// Prefix prepended to every variable name by `from_env()`.
    pub prefix: String,

    /// Function returning the registry for this type.
    pub registry: Option<Path>,
}

impl StructAttrs {
    pub fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut parsed = Self::default();

        for attr in envira_attrs(attrs) {
            attr.parse_nested_meta(|meta| {
                // prefix = "..."
                if meta.path.is_ident("prefix") {
                    let s: LitStr = meta.value()?.parse()?;
                    parsed.prefix = s.value();
                    return Ok(());
                }

                // registry = "path::to::fn"
                if meta.path.is_ident("registry") {
                    let s: LitStr = meta.value()?.parse()?;
                    parsed.registry = Some(s.parse()?);
                    return Ok(());
                }

                Err(meta.error("unsupported struct-level envira attribute"))
            })?;
        }

        Ok(parsed)
    }
}

/// Parsed `#[envira(...)]` attributes from a struct field.
#[derive(Debug, Default)]
pub struct FieldAttrs {
    /// Custom environment variable name override.
    ///
    /// If `None`, the field name is converted to UPPER_SNAKE_CASE.
    pub name: Option<String>,

    /// Default value strategy:
    /// - `None`: Value is always converted
    /// - `Some(None)`: Keep `Default::default()` when the variable is unset
    /// - `Some(Some(expr))`: Keep the given expression when the variable is unset
    pub default: Option<Option<Expr>>,

    /// Explicit type descriptor expression, replacing `EnvValue::type_desc()`.
    pub ty: Option<Expr>,

    /// Load the field as a nested `EnvConfig` struct.
    pub flatten: bool,
}

impl FieldAttrs {
    /// Extract and validate `#[envira(...)]` attributes from a struct field.
    pub fn from_field(field: &Field) -> syn::Result<Self> {
        let mut attrs = Self::default();

        for attr in envira_attrs(&field.attrs) {
            attr.parse_nested_meta(|meta| {
                // name = "..."
                if meta.path.is_ident("name") {
                    let s: LitStr = meta.value()?.parse()?;
                    attrs.name = Some(s.value());
                    return Ok(());
                }

                // default or default = value
                if meta.path.is_ident("default") {
                    if meta.input.peek(syn::Token![=]) {
                        let expr: Expr = meta.value()?.parse()?;
                        attrs.default = Some(Some(expr));
                    } else {
                        attrs.default = Some(None);
                    }
                    return Ok(());
                }

                // ty = TypeDesc expression
                if meta.path.is_ident("ty") {
                    let expr: Expr = meta.value()?.parse()?;
                    attrs.ty = Some(expr);
                    return Ok(());
                }

                if meta.path.is_ident("flatten") {
                    attrs.flatten = true;
                    return Ok(());
                }

                Err(meta.error("unsupported envira attribute"))
            })?;
        }

        if attrs.flatten && (attrs.name.is_some() || attrs.default.is_some() || attrs.ty.is_some()) {
            return Err(syn::Error::new_spanned(
                field,
                "flatten cannot be combined with name, default or ty",
            ));
        }

        Ok(attrs)
    }
}

/// Parsed enum-level `#[envira(...)]` attributes.
#[derive(Debug, Default)]
pub struct EnumAttrs {
    /// Type name shown in messages; defaults to the enum's identifier.
    pub name: Option<String>,
}

impl EnumAttrs {
    pub fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut parsed = Self::default();

        for attr in envira_attrs(attrs) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let s: LitStr = meta.value()?.parse()?;
                    parsed.name = Some(s.value());
                    return Ok(());
                }

                Err(meta.error("unsupported enum-level envira attribute"))
            })?;
        }

        Ok(parsed)
    }
}

/// Parsed `#[envira(...)]` attributes from an enum variant.
#[derive(Debug, Default)]
pub struct VariantAttrs {
    /// Textual value the variant is constructed from; defaults to its name.
    pub value: Option<String>,
}

impl VariantAttrs {
    pub fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut parsed = Self::default();

        for attr in envira_attrs(attrs) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("value") {
                    let s: LitStr = meta.value()?.parse()?;
                    parsed.value = Some(s.value());
                    return Ok(());
                }

                Err(meta.error("unsupported envira variant attribute"))
            })?;
        }

        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::{parse_quote, DeriveInput, Variant};

    #[test]
    fn test_parse_name_attribute() {
        let field: Field = parse_quote! {
            #[envira(name = "CUSTOM_NAME")]
            pub field_name: String
        };

        let attrs = FieldAttrs::from_field(&field).unwrap();
        assert_eq!(attrs.name, Some("CUSTOM_NAME".to_string()));
    }

    #[test]
    fn test_parse_default_string() {
        let field: Field = parse_quote! {
            #[envira(default = "default_value".to_string())]
            pub field_name: String
        };

        let attrs = FieldAttrs::from_field(&field).unwrap();
        assert!(matches!(attrs.default, Some(Some(_))));
    }

    #[test]
    fn test_parse_default_number() {
        let field: Field = parse_quote! {
            #[envira(default = 42)]
            pub field_name: i32
        };

        let attrs = FieldAttrs::from_field(&field).unwrap();
        assert!(attrs.default.is_some());
    }

    #[test]
    fn test_parse_default_no_value() {
        let field: Field = parse_quote! {
            #[envira(default)]
            pub field_name: String
        };

        let attrs = FieldAttrs::from_field(&field).unwrap();
        assert!(matches!(attrs.default, Some(None)));
    }

    #[test]
    fn test_parse_default_followed_by_name() {
        let field: Field = parse_quote! {
            #[envira(default = 8080, name = "HTTP_PORT")]
            pub port: u16
        };

        let attrs = FieldAttrs::from_field(&field).unwrap();
        assert!(matches!(attrs.default, Some(Some(_))));
        assert_eq!(attrs.name, Some("HTTP_PORT".to_string()));
    }

    #[test]
    fn test_parse_ty() {
        let field: Field = parse_quote! {
            #[envira(ty = TypeDesc::literal([0, 1]))]
            pub field_name: i64
        };

        let attrs = FieldAttrs::from_field(&field).unwrap();
        assert!(attrs.ty.is_some());
    }

    #[test]
    fn test_parse_flatten() {
        let field: Field = parse_quote! {
            #[envira(flatten)]
            pub base: BaseConfig
        };

        let attrs = FieldAttrs::from_field(&field).unwrap();
        assert!(attrs.flatten);
    }

    #[test]
    fn test_flatten_with_default_is_rejected() {
        let field: Field = parse_quote! {
            #[envira(flatten, default)]
            pub base: BaseConfig
        };

        let err = FieldAttrs::from_field(&field).unwrap_err();
        assert!(err.to_string().contains("flatten cannot be combined"));
    }

    #[test]
    fn test_unknown_field_attribute_is_rejected() {
        let field: Field = parse_quote! {
            #[envira(from_file)]
            pub secret: String
        };

        let err = FieldAttrs::from_field(&field).unwrap_err();
        assert!(err.to_string().contains("unsupported envira attribute"));
    }

    #[test]
    fn test_other_attributes_are_ignored() {
        let field: Field = parse_quote! {
            #[serde(rename = "x")]
            pub field_name: String
        };

        let attrs = FieldAttrs::from_field(&field).unwrap();
        assert!(attrs.name.is_none());
    }

    #[test]
    fn test_parse_struct_attributes() {
        let input: DeriveInput = parse_quote! {
            #[envira(prefix = "APP_", registry = "crate::registries::app")]
            struct Config {}
        };

        let attrs = StructAttrs::from_attrs(&input.attrs).unwrap();
        assert_eq!(attrs.prefix, "APP_");
        let registry = attrs.registry.unwrap();
        assert_eq!(registry.segments.len(), 3);
    }

    #[test]
    fn test_parse_variant_value() {
        let variant: Variant = parse_quote! {
            #[envira(value = "0")]
            X
        };

        let attrs = VariantAttrs::from_attrs(&variant.attrs).unwrap();
        assert_eq!(attrs.value, Some("0".to_string()));
    }

    #[test]
    fn test_parse_enum_name() {
        let input: DeriveInput = parse_quote! {
            #[envira(name = "LogLevel")]
            enum Level { Debug }
        };

        let attrs = EnumAttrs::from_attrs(&input.attrs).unwrap();
        assert_eq!(attrs.name, Some("LogLevel".to_string()));
    }
}
