use proc_macro::TokenStream;
use quote::quote;
use std::collections::HashMap;
use syn::{
    Attribute, Data, DeriveInput, Expr, ExprLit, Fields, Lit, Meta, Token, Type, ext::IdentExt,
    parse_macro_input,
};

/// Helper enum for parsed attribute values
enum MetaValue {
    Str(String),
    Expr(syn::Expr),
    Flag,
}

/// Derive binding metadata for a struct with named fields
///
/// - `#[ini(section = "name")]` on the struct binds it to a fixed section
/// - `#[data_member]` / `#[data_member(name = "key", required)]` binds a field,
///   the key defaults to the field name
/// - `#[config_property(name = "key", required, default = expr)]` binds a
///   field under an explicit key
/// - `#[ini_key]` marks the field holding the section name
#[proc_macro_derive(IniBind, attributes(ini, data_member, config_property, ini_key))]
pub fn derive_ini_bind(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match generate_bind(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Derive the member-name codec for a unit-only enum
///
/// `#[ini(rename = "name")]` on a variant changes the name it is matched by.
#[proc_macro_derive(IniEnum, attributes(ini))]
pub fn derive_ini_enum(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match generate_enum(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn generate_bind(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let struct_name = &input.ident;
    let type_name = struct_name.to_string();

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "IniBind cannot be derived for generic types",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "IniBind only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "IniBind only supports structs",
            ));
        }
    };

    let section = parse_section(&input.attrs)?;
    let section_call = section.map(|name| quote! { .section(#name) });

    let mut property_calls = Vec::new();
    let mut key_call = None;
    let mut key_field: Option<&syn::Ident> = None;

    for field in fields {
        let Some(field_name) = field.ident.as_ref() else {
            continue;
        };
        // r#type binds as "type"
        let property = field_name.unraw().to_string();
        let field_type = &field.ty;
        let accessor = field_accessor(struct_name, field_name, field_type);

        if let Some(attr) = find_attr(&field.attrs, "ini_key") {
            if let Some(first) = key_field {
                return Err(syn::Error::new_spanned(
                    attr,
                    format!("only one #[ini_key] field is allowed, `{first}` is already the key"),
                ));
            }
            key_field = Some(field_name);
            key_call = Some(quote! { .key(#property, #accessor) });
        }

        // data_member is checked first; a config_property on the same field is ignored
        if let Some(attr) = find_attr(&field.attrs, "data_member") {
            let config = parse_data_member(attr)?;
            let name_call = config.name.map(|name| quote! { .name(#name) });
            let required_call = config.required.then(|| quote! { .required() });

            property_calls.push(quote! {
                .data_member(
                    ::ini_bindr::DataMember::new(#property, #accessor)
                        #name_call
                        #required_call
                )
            });
        } else if let Some(attr) = find_attr(&field.attrs, "config_property") {
            let config = parse_config_property(attr)?;
            let name = &config.name;
            let required_call = config.required.then(|| quote! { .required() });
            let default_call = config.default.as_ref().map(|expr| match expr {
                // String literals convert into the field type, so `default = "x"`
                // works for String and PathBuf fields
                Expr::Lit(ExprLit {
                    lit: Lit::Str(_), ..
                }) => quote! {
                    .default({
                        let value: #field_type = ::core::convert::Into::into(#expr);
                        value
                    })
                },
                _ => quote! {
                    .default({
                        let value: #field_type = #expr;
                        value
                    })
                },
            });

            property_calls.push(quote! {
                .config_property(
                    ::ini_bindr::ConfigProperty::new(#name, #property, #accessor)
                        #required_call
                        #default_call
                )
            });
        }
    }

    Ok(quote! {
        impl ::ini_bindr::IniBind for #struct_name {
            fn type_binding() -> &'static ::ini_bindr::TypeBinding<Self> {
                static BINDING: ::ini_bindr::macros::OnceLock<::ini_bindr::TypeBinding<#struct_name>> =
                    ::ini_bindr::macros::OnceLock::new();

                BINDING.get_or_init(|| {
                    ::ini_bindr::macros::registered(
                        ::ini_bindr::TypeBindingBuilder::<#struct_name>::new(#type_name)
                            #section_call
                            #(#property_calls)*
                            #key_call
                            .build(),
                        #type_name,
                    )
                })
            }
        }
    })
}

fn field_accessor(
    struct_name: &syn::Ident,
    field_name: &syn::Ident,
    field_type: &Type,
) -> proc_macro2::TokenStream {
    quote! {
        ::ini_bindr::Field::<#struct_name, #field_type>::new(
            |this| &this.#field_name,
            |this| &mut this.#field_name,
        )
    }
}

fn generate_enum(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let enum_name = &input.ident;
    let type_name = enum_name.to_string();

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "IniEnum cannot be derived for generic types",
        ));
    }

    let variants = match &input.data {
        Data::Enum(data) => &data.variants,
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "IniEnum only supports enums",
            ));
        }
    };

    if variants.is_empty() {
        return Err(syn::Error::new_spanned(
            input,
            "IniEnum needs at least one variant",
        ));
    }

    let mut names = Vec::new();
    let mut idents = Vec::new();
    for variant in variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "IniEnum only supports unit variants",
            ));
        }

        let rename = match find_attr(&variant.attrs, "ini") {
            Some(attr) => {
                let mut parsed = parse_list(attr)?;
                reject_unknown(attr, &parsed, &["rename"])?;
                match parsed.remove("rename") {
                    Some(MetaValue::Str(name)) => Some(name),
                    _ => {
                        return Err(syn::Error::new_spanned(
                            attr,
                            "expected #[ini(rename = \"name\")]",
                        ));
                    }
                }
            }
            None => None,
        };

        names.push(rename.unwrap_or_else(|| variant.ident.unraw().to_string()));
        idents.push(&variant.ident);
    }

    let indices: Vec<usize> = (0..idents.len()).collect();

    Ok(quote! {
        impl ::ini_bindr::IniEnum for #enum_name {
            const NAMES: &'static [&'static str] = &[#(#names),*];

            fn from_index(index: usize) -> ::core::option::Option<Self> {
                match index {
                    #(#indices => ::core::option::Option::Some(Self::#idents),)*
                    _ => ::core::option::Option::None,
                }
            }

            fn index(&self) -> usize {
                match self {
                    #(Self::#idents => #indices,)*
                }
            }
        }

        impl ::ini_bindr::IniValue for #enum_name {
            fn kind() -> ::ini_bindr::ValueKind {
                ::ini_bindr::ValueKind::single(<Self as ::ini_bindr::IniScalar>::element_kind())
            }

            fn decode(
                raw: &str,
                _format: &::ini_bindr::ListFormat,
            ) -> ::core::result::Result<Self, ::ini_bindr::ConversionError> {
                ::ini_bindr::codec::decode_enum(raw, #type_name)
            }

            fn encode(&self, _format: &::ini_bindr::ListFormat) -> ::std::string::String {
                ::std::string::ToString::to_string(::ini_bindr::IniEnum::name(self))
            }
        }

        impl ::ini_bindr::IniScalar for #enum_name {
            fn element_kind() -> ::ini_bindr::ElementKind {
                ::ini_bindr::ElementKind::Enum {
                    type_name: #type_name,
                    members: <Self as ::ini_bindr::IniEnum>::NAMES,
                }
            }

            fn members() -> ::core::option::Option<::std::vec::Vec<Self>> {
                ::core::option::Option::Some(::ini_bindr::codec::enum_members::<Self>())
            }
        }
    })
}

#[derive(Debug)]
struct DataMemberConfig {
    name: Option<String>,
    required: bool,
}

#[derive(Debug)]
struct ConfigPropertyConfig {
    name: String,
    required: bool,
    default: Option<syn::Expr>,
}

fn find_attr<'a>(attrs: &'a [Attribute], name: &str) -> Option<&'a Attribute> {
    attrs.iter().find(|attr| attr.path().is_ident(name))
}

/// Parse `name = "x", required, default = expr` style lists
fn parse_list(attr: &Attribute) -> syn::Result<HashMap<String, MetaValue>> {
    let meta_list = match &attr.meta {
        Meta::List(list) => list,
        _ => {
            return Err(syn::Error::new_spanned(
                attr,
                "attribute must be a list: #[attr(key = \"...\", ...)]",
            ));
        }
    };

    let mut values = HashMap::new();

    meta_list.parse_nested_meta(|meta| {
        let key = meta
            .path
            .get_ident()
            .ok_or_else(|| meta.error("expected identifier"))?
            .to_string();

        if meta.input.peek(Token![=]) {
            meta.input.parse::<Token![=]>()?;

            if key == "name" || key == "section" || key == "rename" {
                let value: syn::LitStr = meta.input.parse()?;
                values.insert(key, MetaValue::Str(value.value()));
            } else {
                let expr: syn::Expr = meta.input.parse()?;
                values.insert(key, MetaValue::Expr(expr));
            }
        } else {
            values.insert(key, MetaValue::Flag);
        }

        Ok(())
    })?;

    Ok(values)
}

fn reject_unknown(attr: &Attribute, values: &HashMap<String, MetaValue>, known: &[&str]) -> syn::Result<()> {
    match values.keys().find(|key| !known.contains(&key.as_str())) {
        Some(key) => Err(syn::Error::new_spanned(
            attr,
            format!("unknown option `{key}`, expected one of: {}", known.join(", ")),
        )),
        None => Ok(()),
    }
}

/// A bare `flag` or `flag = true/false`
fn parse_flag(attr: &Attribute, values: &HashMap<String, MetaValue>, key: &str) -> syn::Result<bool> {
    match values.get(key) {
        None => Ok(false),
        Some(MetaValue::Flag) => Ok(true),
        Some(MetaValue::Expr(Expr::Lit(ExprLit {
            lit: Lit::Bool(value),
            ..
        }))) => Ok(value.value),
        Some(MetaValue::Expr(expr)) => Err(syn::Error::new_spanned(
            expr,
            format!("{key} must be a bool literal: {key} = true"),
        )),
        Some(MetaValue::Str(_)) => Err(syn::Error::new_spanned(
            attr,
            format!("{key} must be a bool literal: {key} = true"),
        )),
    }
}

fn parse_section(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    let Some(attr) = find_attr(attrs, "ini") else {
        return Ok(None);
    };

    let parsed = parse_list(attr)?;
    reject_unknown(attr, &parsed, &["section"])?;

    match parsed.get("section") {
        Some(MetaValue::Str(name)) if name.is_empty() => Err(syn::Error::new_spanned(
            attr,
            "section name must not be empty",
        )),
        Some(MetaValue::Str(name)) => Ok(Some(name.clone())),
        _ => Err(syn::Error::new_spanned(
            attr,
            "expected #[ini(section = \"name\")]",
        )),
    }
}

fn parse_data_member(attr: &Attribute) -> syn::Result<DataMemberConfig> {
    // Bare #[data_member]
    if matches!(attr.meta, Meta::Path(_)) {
        return Ok(DataMemberConfig {
            name: None,
            required: false,
        });
    }

    let parsed = parse_list(attr)?;
    reject_unknown(attr, &parsed, &["name", "required"])?;

    let name = match parsed.get("name") {
        Some(MetaValue::Str(s)) if s.is_empty() => {
            return Err(syn::Error::new_spanned(attr, "name must not be empty"));
        }
        Some(MetaValue::Str(s)) => Some(s.clone()),
        None => None,
        _ => {
            return Err(syn::Error::new_spanned(
                attr,
                "name must be a string literal",
            ));
        }
    };

    Ok(DataMemberConfig {
        name,
        required: parse_flag(attr, &parsed, "required")?,
    })
}

fn parse_config_property(attr: &Attribute) -> syn::Result<ConfigPropertyConfig> {
    let parsed = parse_list(attr)?;
    reject_unknown(attr, &parsed, &["name", "required", "default"])?;

    let name = match parsed.get("name") {
        Some(MetaValue::Str(s)) if !s.is_empty() => s.clone(),
        _ => {
            return Err(syn::Error::new_spanned(
                attr,
                "config_property must have name = \"key\"",
            ));
        }
    };

    let default = match parsed.get("default") {
        Some(MetaValue::Expr(e)) => Some(e.clone()),
        Some(_) => {
            return Err(syn::Error::new_spanned(
                attr,
                "default must be an expression: default = value",
            ));
        }
        None => None,
    };

    let required = parse_flag(attr, &parsed, "required")?;
    if required && default.is_some() {
        return Err(syn::Error::new_spanned(
            attr,
            "a required property cannot declare a default value",
        ));
    }

    Ok(ConfigPropertyConfig {
        name,
        required,
        default,
    })
}
