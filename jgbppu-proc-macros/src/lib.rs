mod encode;
mod enums;

use proc_macro::TokenStream;

/// Implement the `std::fmt::Display` trait for the given enum. Only supports enums which have only
/// fieldless variants.
///
/// # Panics
///
/// This macro will panic if applied to a struct, a union, or an enum with any variants that have
/// fields.
#[proc_macro_derive(EnumDisplay)]
pub fn enum_display(input: TokenStream) -> TokenStream {
    enums::enum_display(input)
}

/// Implement the `std::str::FromStr` trait for the given enum, with `FromStr::Err` set to `String`.
/// Only supports enums which have only fieldless variants. The generated implementation will be
/// case-insensitive.
///
/// # Panics
///
/// This macro will panic if applied to a struct, a union, or an enum with any variants that have
/// fields.
#[proc_macro_derive(EnumFromStr)]
pub fn enum_from_str(input: TokenStream) -> TokenStream {
    enums::enum_from_str(input)
}

/// Implement `bincode::Encode` for the given type such that nothing is written to the encoder.
/// Meant for fields that should not be serialized into savestates, such as rendered frame buffers.
///
/// The type must also implement `Default` for the matching `FakeDecode` derive to work.
///
/// # Panics
///
/// This macro will panic if it cannot parse its input or if the type has generic parameters.
#[proc_macro_derive(FakeEncode)]
pub fn fake_encode(input: TokenStream) -> TokenStream {
    encode::fake_encode(input)
}

/// Implement `bincode::Decode` and `bincode::BorrowDecode` for the given type such that decoding
/// reads nothing from the decoder and returns `Self::default()`.
///
/// # Panics
///
/// This macro will panic if it cannot parse its input or if the type has generic parameters.
#[proc_macro_derive(FakeDecode)]
pub fn fake_decode(input: TokenStream) -> TokenStream {
    encode::fake_decode(input)
}
