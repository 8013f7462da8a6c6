//! # Accessor Derive
//!
//! Derive macro generating chained setters for plain configuration structs,
//! so a reference profile can be tweaked field by field without spelling out
//! the whole struct literal again.

use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::punctuated::Punctuated;
use syn::token::Comma;
use syn::{Data, DeriveInput, Field, Fields, LitBool, parse_macro_input, spanned::Spanned};

/// Derive to generate `.set_<field>(&mut self, value: Ty) -> &mut Self` and
/// `const .with_<field>(mut self, value: Ty) -> Self` for each **named** field.
///
/// - Skipping a field: `#[setters(skip)]` or `#[setters(skip = true)]`
///
/// The `with_*` variants are `const`, so they can derive one constant profile
/// from another. Field types therefore must not need dropping.
///
/// # Example
///
/// ```
/// use utils_accessors_derive::Setters;
///
/// #[derive(Setters)]
/// struct Budget {
///     size: u64,
///     #[setters(skip)]
///     checksum: u32,
/// }
///
/// const BASE: Budget = Budget { size: 0x1000, checksum: 0 };
/// const BIGGER: Budget = BASE.with_size(0x2000);
///
/// let mut b = BIGGER;
/// b.set_size(0x3000).set_size(0x4000);
/// assert_eq!(b.size, 0x4000);
/// assert_eq!(b.checksum, 0);
/// ```
#[proc_macro_derive(Setters, attributes(setters))]
pub fn derive_generate_setters(input: TokenStream) -> TokenStream {
    let DeriveInput {
        ident,
        generics,
        data,
        ..
    } = parse_macro_input!(input as DeriveInput);

    let fields = match named_fields(&ident, data) {
        Ok(fields) => fields,
        Err(e) => return e.to_compile_error().into(),
    };

    let methods = fields
        .iter()
        .filter(|field| !should_skip(&field.attrs))
        .filter_map(setter_pair);

    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    let expanded = quote! {
        impl #impl_generics #ident #ty_generics #where_clause {
            #(#methods)*
        }
    };

    TokenStream::from(expanded)
}

fn named_fields(ident: &syn::Ident, data: Data) -> syn::Result<Punctuated<Field, Comma>> {
    match data {
        Data::Struct(s) => match s.fields {
            Fields::Named(n) => Ok(n.named),
            Fields::Unnamed(u) => Err(syn::Error::new(
                u.span(),
                "Setters only supports named fields",
            )),
            Fields::Unit => Err(syn::Error::new(
                ident.span(),
                "Setters does not apply to unit structs",
            )),
        },
        _ => Err(syn::Error::new(
            ident.span(),
            "Setters can only be derived for structs",
        )),
    }
}

fn setter_pair(field: &Field) -> Option<impl quote::ToTokens> {
    let fname = field.ident.as_ref()?;
    let ty = &field.ty;
    let set_name = format_ident!("set_{}", fname);
    let with_name = format_ident!("with_{}", fname);
    let set_doc = format!("Set `{fname}` in place.");
    let with_doc = format!("Return a copy with `{fname}` replaced.");

    Some(quote! {
        #[doc = #set_doc]
        #[inline]
        pub fn #set_name(&mut self, value: #ty) -> &mut Self {
            self.#fname = value;
            self
        }

        #[doc = #with_doc]
        #[inline]
        #[must_use]
        pub const fn #with_name(mut self, value: #ty) -> Self {
            self.#fname = value;
            self
        }
    })
}

fn should_skip(attrs: &[syn::Attribute]) -> bool {
    let mut skip = false;
    for attr in attrs {
        if !attr.path().is_ident("setters") {
            continue;
        }

        let _ = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                if meta.input.is_empty() {
                    skip = true;
                } else if let Ok(v) = meta.value()?.parse::<LitBool>()
                    && v.value
                {
                    skip = true;
                }
            }
            Ok(())
        });
    }
    skip
}
