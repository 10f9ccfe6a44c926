use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, LitStr, parse_macro_input};

/// Derives the `CounterId` trait for enums naming a set of performance counters.
///
/// Each unit variant becomes one counter slot. The display name used by the
/// `pm` console command comes from a `#[pm("...")]` attribute, or is derived
/// from the variant name by splitting on case changes and lowercasing
/// (`TxBufOverrun` becomes `"tx buf overrun"`).
///
/// # Example
///
/// ```ignore
/// use superloop_macros::PmCounters;
///
/// #[derive(Copy, Clone, PmCounters)]
/// pub enum SerialPm {
///     #[pm("uart rx overrun err")]
///     UartOverrun,
///     TxBufOverrun,
/// }
/// ```
///
/// This generates:
///
/// ```ignore
/// impl ::superloop::pm::CounterId for SerialPm {
///     const COUNT: usize = 2;
///     const NAMES: &'static [&'static str] = &["uart rx overrun err", "tx buf overrun"];
///
///     fn index(self) -> usize {
///         match self {
///             Self::UartOverrun => 0,
///             Self::TxBufOverrun => 1,
///         }
///     }
/// }
/// ```
///
/// # Requirements
///
/// - The type must be an enum
/// - All variants must be unit variants (no fields)
#[proc_macro_derive(PmCounters, attributes(pm))]
pub fn derive_pm_counters(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let name = &input.ident;

    let variants = match &input.data {
        Data::Enum(data_enum) => &data_enum.variants,
        _ => {
            return syn::Error::new_spanned(&input, "PmCounters can only be derived for enums")
                .to_compile_error()
                .into();
        }
    };

    let mut labels = Vec::with_capacity(variants.len());
    let mut index_arms = Vec::with_capacity(variants.len());

    for (index, variant) in variants.iter().enumerate() {
        if !matches!(variant.fields, Fields::Unit) {
            return syn::Error::new_spanned(
                variant,
                "PmCounters can only be derived for enums with unit variants (no fields)",
            )
            .to_compile_error()
            .into();
        }

        let mut label = None;
        for attr in variant.attrs.iter().filter(|a| a.path().is_ident("pm")) {
            match attr.parse_args::<LitStr>() {
                Ok(lit) => label = Some(lit.value()),
                Err(err) => return err.to_compile_error().into(),
            }
        }
        labels.push(label.unwrap_or_else(|| words_from_ident(&variant.ident.to_string())));

        let variant_name = &variant.ident;
        index_arms.push(quote! {
            Self::#variant_name => #index
        });
    }

    let count = labels.len();

    let expanded = quote! {
        impl ::superloop::pm::CounterId for #name {
            const COUNT: usize = #count;
            const NAMES: &'static [&'static str] = &[#(#labels),*];

            fn index(self) -> usize {
                match self {
                    #(#index_arms,)*
                }
            }
        }
    };

    TokenStream::from(expanded)
}

/// `RxBufOverrun` -> `rx buf overrun`.
fn words_from_ident(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len() + 4);
    let mut prev_lower = false;
    for c in ident.chars() {
        if c == '_' {
            if !out.is_empty() && !out.ends_with(' ') {
                out.push(' ');
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower {
            out.push(' ');
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        out.extend(c.to_lowercase());
    }
    out
}
