use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Field, Fields, LitStr};

pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let collection = match extract_collection(&input) {
        Ok(c) => c,
        Err(e) => return e.to_compile_error().into(),
    };

    let key_field = match extract_key_field(&input) {
        Ok(f) => f,
        Err(e) => return e.to_compile_error().into(),
    };
    let key_ident = &key_field.ident;
    let key_ty = &key_field.ty;

    let expanded = quote! {
        impl #impl_generics local_store::Entity for #name #ty_generics #where_clause {
            type Key = #key_ty;

            const COLLECTION: &'static str = #collection;

            fn primary_key(&self) -> &Self::Key {
                &self.#key_ident
            }
        }
    };

    TokenStream::from(expanded)
}

fn extract_collection(input: &DeriveInput) -> syn::Result<String> {
    for attr in &input.attrs {
        if !attr.path().is_ident("entity") {
            continue;
        }

        let mut collection = None;
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("collection") {
                let value: LitStr = meta.value()?.parse()?;
                collection = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("expected `collection = \"...\"`"))
            }
        })?;

        if let Some(c) = collection {
            return Ok(c);
        }
    }

    // Default: snake_case struct name + "s"
    let name = input.ident.to_string();
    Ok(format!("{}s", to_snake_case(&name)))
}

fn extract_key_field(input: &DeriveInput) -> syn::Result<&Field> {
    let fields = match &input.data {
        Data::Struct(data_struct) => match &data_struct.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input.ident,
                    "Entity derive: only structs with named fields are supported",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "Entity derive: only structs are supported",
            ))
        }
    };

    let mut marked = None;
    for field in fields {
        for attr in &field.attrs {
            if !attr.path().is_ident("entity") {
                continue;
            }
            let mut is_key = false;
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("primary_key") {
                    is_key = true;
                    Ok(())
                } else {
                    Err(meta.error("expected `primary_key`"))
                }
            })?;
            if is_key {
                if marked.is_some() {
                    return Err(syn::Error::new_spanned(
                        field,
                        "Entity derive: only one field may be marked #[entity(primary_key)]",
                    ));
                }
                marked = Some(field);
            }
        }
    }

    if let Some(field) = marked {
        return Ok(field);
    }

    // Default: a field named "id"
    fields
        .iter()
        .find(|f| f.ident.as_ref().is_some_and(|i| i == "id"))
        .ok_or_else(|| {
            syn::Error::new_spanned(
                &input.ident,
                "Entity derive: no field marked with #[entity(primary_key)] and no field named `id`",
            )
        })
}

fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, ch) in s.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
        } else {
            result.push(ch);
        }
    }
    result
}
