//! Application-wide constants

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;
pub const TOKEN_TYPE_ACCESS: &str = "access";
pub const TOKEN_TYPE_REFRESH: &str = "refresh";
pub const DEFAULT_ACCESS_TOKEN_EXPIRY: i64 = 3600;
pub const DEFAULT_REFRESH_TOKEN_EXPIRY: i64 = 604800;
pub const DEFAULT_RESET_TOKEN_TTL: i64 = 3600;
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 128;
pub const MAX_TITLE_LENGTH: u64 = 200;
pub const TENANT_HEADER: &str = "x-tenant-id";
pub const TENANT_COOKIE: &str = "tenant_id";
pub const DEV_JWT_SECRET: &str = "echo-development-secret-change-me";
