pub mod fields;
pub mod jwt;
pub mod password;

pub use jwt::{decode_token, encode_token};
pub use password::{hash_password, verify_password};
