//! HTTP handlers that are not generic CRUD

pub mod auth;
pub mod dashboard;
pub mod health;
