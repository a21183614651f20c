//! # Echo Client
//!
//! HTTP client for the Echo API: bearer and tenant injection, base URL
//! fallback and response normalization.

pub mod client;
pub mod error;
pub mod normalize;

pub use client::{Collection, EchoClient, Me, Registration, Session, DEFAULT_BASE_URLS};
pub use error::ClientError;
pub use normalize::Listing;
