//! # Echo Security
//! 
//! Security utilities: JWT, password hashing and strength, reset tokens.

pub mod jwt;
pub mod password;
pub mod reset_token;

pub use jwt::{Claims, JwtError, JwtService};
pub use password::{PasswordError, PasswordService};
pub use reset_token::ResetToken;
