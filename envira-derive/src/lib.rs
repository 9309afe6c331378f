//! Derive macro implementation for envira

use proc_macro::TokenStream;
use proc_macro2::Literal;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields};

mod attrs;

use attrs::{EnumAttrs, FieldAttrs, StructAttrs, VariantAttrs};

/// `EnvConfig` derive macro
///
/// Implements `envira::EnvConfig`, which provides `from_env()`,
/// `from_env_with_prefix()` and `from_snapshot()`.
///
/// # Supported Attributes
///
/// **Struct-level**:
/// - `#[envira(prefix = "PREFIX_")]`: Add prefix to all env var names
/// - `#[envira(registry = "path::to::fn")]`: Use the registry returned by `fn()`
///
/// **Field-level**:
/// - `#[envira(name = "CUSTOM_NAME")]`: Custom environment variable name
/// - `#[envira(default)]`: Use `Default::default()` if env var not set
/// - `#[envira(default = value)]`: Use explicit default value if env var not set
/// - `#[envira(ty = expr)]`: Use an explicit `TypeDesc` for conversion
/// - `#[envira(flatten)]`: Load a nested `EnvConfig` struct
///
/// # Example
///
/// See the `envira` crate documentation for usage examples.
#[proc_macro_derive(EnvConfig, attributes(envira))]
pub fn derive_env_config(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_env_config(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// `EnvEnum` derive macro
///
/// Implements `envira::EnvValue` for enums with unit variants. A variant is
/// selected when the raw value equals its textual value, which is the variant
/// name unless `#[envira(value = "...")]` says otherwise.
#[proc_macro_derive(EnvEnum, attributes(envira))]
pub fn derive_env_enum(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_env_enum(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand_env_config(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    // Struct name
    let struct_name = &input.ident;
    let struct_name_str = struct_name.to_string();

    let struct_attrs = StructAttrs::from_attrs(&input.attrs)?;
    let prefix = &struct_attrs.prefix;

    // Extract fields
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "EnvConfig only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "EnvConfig only supports structs",
            ));
        }
    };

    let mut field_initializers = Vec::new();
    let mut instance_entries = Vec::new();

    for field in fields {
        let Some(field_name) = field.ident.as_ref() else {
            continue;
        };
        let field_type = &field.ty;
        let attrs = FieldAttrs::from_field(field)?;

        if attrs.flatten {
            field_initializers.push(quote! {
                #field_name: <#field_type as ::envira::EnvConfig>::from_snapshot_with(
                    __snapshot,
                    __prefix,
                    __registry,
                )?
            });
            instance_entries.push(quote! {
                __instance.merge(::envira::EnvConfig::to_instance(&self.#field_name));
            });
            continue;
        }

        let label = field_name.to_string().trim_start_matches("r#").to_string();

        // Determine environment variable name
        let env_name = attrs.name.unwrap_or_else(|| label.to_uppercase());

        let type_desc = match attrs.ty {
            Some(expr) => quote! { #expr },
            None => quote! { <#field_type as ::envira::EnvValue>::type_desc() },
        };

        let default = match attrs.default {
            Some(Some(expr)) => quote! { ::core::option::Option::Some(#expr) },
            Some(None) => quote! { ::core::option::Option::Some(::core::default::Default::default()) },
            None => quote! { ::core::option::Option::None },
        };

        field_initializers.push(quote! {
            #field_name: {
                let __ty: ::envira::TypeDesc = #type_desc;
                ::envira::de::load_field::<#field_type>(
                    __snapshot,
                    &::std::format!("{}{}", __prefix, #env_name),
                    &__ty,
                    __registry,
                    #default,
                )?
            }
        });
        instance_entries.push(quote! {
            __instance.push(#label, ::envira::EnvValue::to_value(&self.#field_name));
        });
    }

    let registry_fn = struct_attrs.registry.map(|path| {
        quote! {
            fn registry() -> ::envira::Registry {
                #path()
            }
        }
    });

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::envira::EnvConfig for #struct_name #ty_generics #where_clause {
            const PREFIX: &'static str = #prefix;

            #registry_fn

            fn from_snapshot_with(
                __snapshot: &::envira::Snapshot,
                __prefix: &str,
                __registry: &::envira::Registry,
            ) -> ::core::result::Result<Self, ::envira::EnvError> {
                ::core::result::Result::Ok(Self {
                    #(#field_initializers),*
                })
            }

            fn to_instance(&self) -> ::envira::Instance {
                let mut __instance = ::envira::Instance::new(#struct_name_str, ::std::vec::Vec::new());
                #(#instance_entries)*
                __instance
            }
        }
    })
}

fn expand_env_enum(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let enum_name = &input.ident;
    let enum_attrs = EnumAttrs::from_attrs(&input.attrs)?;
    let type_name = enum_attrs.name.unwrap_or_else(|| enum_name.to_string());

    let Data::Enum(data) = &input.data else {
        return Err(syn::Error::new_spanned(input, "EnvEnum only supports enums"));
    };
    if data.variants.is_empty() {
        return Err(syn::Error::new_spanned(
            input,
            "EnvEnum requires at least one variant",
        ));
    }

    let mut idents = Vec::new();
    let mut pairs = Vec::new();
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "EnvEnum only supports unit variants",
            ));
        }
        let attrs = VariantAttrs::from_attrs(&variant.attrs)?;
        let name = variant.ident.to_string();
        let value = attrs.value.unwrap_or_else(|| name.clone());
        idents.push(&variant.ident);
        pairs.push(quote! { (#name, #value) });
    }
    let indices: Vec<_> = (0..idents.len()).map(Literal::usize_unsuffixed).collect();

    let enum_type = quote! {
        ::envira::EnumType::new(#type_name, [#(#pairs),*])
    };

    Ok(quote! {
        impl ::envira::EnvValue for #enum_name {
            fn type_desc() -> ::envira::TypeDesc {
                ::envira::TypeDesc::from(#enum_type)
            }

            fn from_value(
                value: ::envira::Value,
            ) -> ::core::result::Result<Self, ::envira::ConversionError> {
                match value {
                    ::envira::Value::Enum(ref __value) if __value.enum_type().name() == #type_name => {
                        match __value.index() {
                            #(#indices => ::core::result::Result::Ok(Self::#idents),)*
                            _ => ::core::result::Result::Err(
                                ::envira::ConversionError::unexpected(#type_name, "unknown variant"),
                            ),
                        }
                    }
                    other => ::core::result::Result::Err(
                        ::envira::ConversionError::unexpected(#type_name, other.kind()),
                    ),
                }
            }

            fn to_value(&self) -> ::envira::Value {
                let __index: usize = match self {
                    #(Self::#idents => #indices,)*
                };
                // Indices come from the variant list above and are always in range.
                ::envira::EnumValue::new(::std::sync::Arc::new(#enum_type), __index)
                    .map_or(::envira::Value::Null, ::envira::Value::Enum)
            }
        }
    })
}
