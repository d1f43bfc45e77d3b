//! The FakeEncode/FakeDecode derives exist for render targets like frame buffers: large buffers
//! that savestates skip on write and recreate empty (via `Default`) on load. Every derive target
//! in this workspace is a concrete struct, so generic types are rejected outright instead of
//! being threaded through the generated impls.

use proc_macro::TokenStream;
use quote::quote;
use syn::{DeriveInput, Ident};

fn concrete_ident(input: TokenStream, derive: &str) -> Ident {
    let ast: DeriveInput = syn::parse(input).unwrap_or_else(|err| panic!("{derive}: {err}"));

    assert!(
        ast.generics.params.is_empty(),
        "{derive} only supports non-generic types; {} has generic parameters",
        ast.ident
    );

    ast.ident
}

pub fn fake_encode(input: TokenStream) -> TokenStream {
    let ident = concrete_ident(input, "FakeEncode");

    let encode_impl = quote! {
        impl ::bincode::Encode for #ident {
            fn encode<E: ::bincode::enc::Encoder>(
                &self,
                _encoder: &mut E,
            ) -> ::std::result::Result<(), ::bincode::error::EncodeError> {
                ::std::result::Result::Ok(())
            }
        }
    };

    encode_impl.into()
}

pub fn fake_decode(input: TokenStream) -> TokenStream {
    let ident = concrete_ident(input, "FakeDecode");

    // bincode 2 threads a caller-chosen context type through decoding; reading nothing works
    // under any of them, so both impls stay generic over it
    let decode_impls = quote! {
        impl<Ctx> ::bincode::Decode<Ctx> for #ident {
            fn decode<D: ::bincode::de::Decoder<Context = Ctx>>(
                _decoder: &mut D,
            ) -> ::std::result::Result<Self, ::bincode::error::DecodeError> {
                ::std::result::Result::Ok(<Self as ::std::default::Default>::default())
            }
        }

        impl<'de, Ctx> ::bincode::BorrowDecode<'de, Ctx> for #ident {
            fn borrow_decode<D: ::bincode::de::BorrowDecoder<'de, Context = Ctx>>(
                _decoder: &mut D,
            ) -> ::std::result::Result<Self, ::bincode::error::DecodeError> {
                ::std::result::Result::Ok(<Self as ::std::default::Default>::default())
            }
        }
    };

    decode_impls.into()
}
