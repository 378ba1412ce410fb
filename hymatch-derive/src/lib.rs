use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Generics, LitStr, parse_macro_input, parse_quote};

/// Options read from `#[hymatch(...)]` on the type.
#[derive(Default)]
struct ContainerOptions {
    decompose: bool,
}

impl ContainerOptions {
    fn parse(input: &DeriveInput) -> syn::Result<Self> {
        let mut options = ContainerOptions::default();
        for attr in input.attrs.iter().filter(|a| a.path().is_ident("hymatch")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("decompose") {
                    options.decompose = true;
                    Ok(())
                } else {
                    Err(meta.error("unsupported hymatch container attribute"))
                }
            })?;
        }
        Ok(options)
    }
}

/// Field name exposed to patterns: the identifier, or `#[hymatch(rename = "...")]`.
fn field_name(field: &syn::Field) -> syn::Result<String> {
    let mut name = field
        .ident
        .as_ref()
        .map(|ident| ident.to_string())
        .unwrap_or_default();
    for attr in field.attrs.iter().filter(|a| a.path().is_ident("hymatch")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                let lit: LitStr = meta.value()?.parse()?;
                name = lit.value();
                Ok(())
            } else {
                Err(meta.error("unsupported hymatch field attribute"))
            }
        })?;
    }
    Ok(name)
}

/// Every type parameter must be storable in a `Value`.
fn add_value_bounds(generics: &Generics) -> Generics {
    let mut generics = generics.clone();
    let params: Vec<_> = generics.type_params().map(|p| p.ident.clone()).collect();
    let where_clause = generics.make_where_clause();
    for param in params {
        where_clause.predicates.push(parse_quote! {
            #param: ::hymatch::value::FieldValue
                + ::std::clone::Clone
                + ::std::cmp::PartialEq
                + ::std::fmt::Debug
                + ::std::marker::Send
                + ::std::marker::Sync
                + 'static
        });
    }
    generics
}

/// `Object`, `FieldValue` and `From<Self> for Value` for `input`.
fn object_impls(input: &DeriveInput, structure: TokenStream2) -> TokenStream2 {
    let name = &input.ident;
    let name_str = name.to_string();
    let generics = add_value_bounds(&input.generics);
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    quote! {
        impl #impl_generics ::hymatch::value::Object for #name #ty_generics #where_clause {
            fn dyn_eq(&self, other: &dyn ::hymatch::value::Object) -> bool {
                other.downcast_ref::<Self>().is_some_and(|other| self == other)
            }

            fn type_name(&self) -> &'static str {
                #name_str
            }

            fn structure(&self) -> ::hymatch::structural::Structure {
                #structure
            }
        }

        impl #impl_generics ::hymatch::value::FieldValue for #name #ty_generics #where_clause {
            fn to_value(&self) -> ::hymatch::value::Value {
                ::hymatch::value::Value::new(::std::clone::Clone::clone(self))
            }

            fn from_value(
                value: &::hymatch::value::Value,
            ) -> ::std::result::Result<Self, ::hymatch::error::HookError> {
                value.extract::<Self>()
            }
        }

        impl #impl_generics ::std::convert::From<#name #ty_generics> for ::hymatch::value::Value #where_clause {
            fn from(value: #name #ty_generics) -> Self {
                ::hymatch::value::Value::new(value)
            }
        }
    }
}

fn expand_composite(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input.ident,
                    "Composite can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "Composite can only be derived for structs",
            ));
        }
    };

    let name = &input.ident;
    let name_str = name.to_string();
    let generics = add_value_bounds(&input.generics);
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let idents: Vec<_> = fields.iter().map(|f| f.ident.clone()).collect();
    let names = fields.iter().map(field_name).collect::<syn::Result<Vec<_>>>()?;
    for (i, a) in names.iter().enumerate() {
        if names[..i].contains(a) {
            return Err(syn::Error::new_spanned(
                &fields[i],
                format!("duplicated field name `{a}`"),
            ));
        }
    }
    let positions: Vec<_> = (0..idents.len()).collect();
    let count = idents.len();

    let objects = object_impls(
        input,
        quote!(::hymatch::structural::Structure::composite::<Self>()),
    );

    Ok(quote! {
        #objects

        impl #impl_generics ::hymatch::structural::Composite for #name #ty_generics #where_clause {
            const NAME: &'static str = #name_str;
            const FIELDS: &'static [&'static str] = &[#(#names),*];

            fn read_field(
                &self,
                position: usize,
            ) -> ::std::result::Result<::hymatch::value::Value, ::hymatch::error::HookError> {
                match position {
                    #(#positions => ::std::result::Result::Ok(
                        ::hymatch::value::FieldValue::to_value(&self.#idents)
                    ),)*
                    _ => ::std::result::Result::Err(::hymatch::error::HookError::declared(
                        ::std::format!("`{}` has no field at position {}", #name_str, position),
                    )),
                }
            }

            fn build(
                values: ::std::vec::Vec<::hymatch::value::Value>,
            ) -> ::std::result::Result<Self, ::hymatch::error::HookError> {
                if values.len() != #count {
                    return ::std::result::Result::Err(::hymatch::error::HookError::declared(
                        ::std::format!(
                            "`{}` takes {} fields, got {}",
                            #name_str,
                            #count,
                            values.len()
                        ),
                    ));
                }
                ::std::result::Result::Ok(Self {
                    #(#idents: ::hymatch::value::FieldValue::from_value(&values[#positions])?,)*
                })
            }
        }
    })
}

fn expand_object(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let options = ContainerOptions::parse(input)?;
    let structure = if options.decompose {
        quote!(::hymatch::structural::Structure::decomposable::<Self>())
    } else {
        quote!(::hymatch::structural::Structure::Opaque)
    };
    Ok(object_impls(input, structure))
}

/// Derive `Composite` (and `Object`) for a struct with named fields.
///
/// Fields are exposed in declaration order. `#[hymatch(rename = "name")]` changes the name a
/// field is exposed under, which allows names that are not Rust identifiers (`"$content"`).
#[proc_macro_derive(Composite, attributes(hymatch))]
pub fn derive_composite(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_composite(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Derive `Object` for a leaf type.
///
/// With `#[hymatch(decompose)]` the type must also implement `Decomposable`, and patterns
/// destructure it through its deconstructor.
#[proc_macro_derive(Object, attributes(hymatch))]
pub fn derive_object(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_object(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
