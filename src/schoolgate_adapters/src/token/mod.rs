pub mod jwt_token_codec;

pub use jwt_token_codec::{JwtConfig, JwtTokenCodec, MIN_SIGNER_KEY_BYTES};
