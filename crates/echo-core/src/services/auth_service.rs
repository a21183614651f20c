// ============================================================================
// Echo Core - Authentication Service
// File: crates/echo-core/src/services/auth_service.rs
// ============================================================================
//! Registration, login, token refresh and password management

use std::sync::Arc;

use chrono::Utc;
use echo_security::{JwtError, JwtService, PasswordService, ResetToken};
use echo_shared::utils::{mask_email, slugify};
use serde::Serialize;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::domain::{PasswordReset, Tenant, User, UserRole};
use crate::error::DomainError;
use crate::repositories::{PasswordResetRepository, TenantRepository, UserRepository};

const MAX_SLUG_ATTEMPTS: u32 = 50;

/// Authentication service for the account flows behind `/auth/*`
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    tenants: Arc<dyn TenantRepository>,
    resets: Arc<dyn PasswordResetRepository>,
    jwt: Arc<JwtService>,
    reset_token_ttl: i64,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tenants: Arc<dyn TenantRepository>,
        resets: Arc<dyn PasswordResetRepository>,
        jwt: Arc<JwtService>,
        reset_token_ttl: i64,
    ) -> Self {
        Self {
            users,
            tenants,
            resets,
            jwt,
            reset_token_ttl,
        }
    }

    /// Register a new workspace: creates the tenant and its admin user.
    pub async fn register(&self, input: RegisterInput) -> Result<AuthSession, DomainError> {
        let email = User::normalize_email(&input.email);
        info!("Registration attempt for email: {}", mask_email(&email));

        // 1. Check if email already exists
        if self.users.find_by_email(&email).await?.is_some() {
            warn!("Registration failed: email already exists: {}", mask_email(&email));
            return Err(DomainError::EmailAlreadyExists(email));
        }

        // 2. Password policy
        PasswordService::check_strength(&input.password, &[email.as_str(), input.name.as_str()])?;

        // 3. Tenant with a free slug
        let tenant_name = input
            .company
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}'s workspace", input.name.trim()));
        let slug = self.free_slug(&slugify(&tenant_name)).await?;
        let tenant = Tenant::new(tenant_name, slug)?;

        // 4. Owner account
        let password_hash = PasswordService::hash(&input.password)?;
        let user = User::new(tenant.id, input.name, email, password_hash, UserRole::Admin)?;

        let (tenant, user) = self.tenants.create_with_owner(&tenant, &user).await?;
        info!(tenant_id = %tenant.id, user_id = %user.id, "Registration successful");

        self.issue_session(&user, &tenant)
    }

    /// Login with email and password
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, DomainError> {
        let email = User::normalize_email(email);
        info!("Login attempt for email: {}", mask_email(&email));

        // 1. Find user by email
        let user = self.users.find_by_email(&email).await?.ok_or_else(|| {
            warn!("Login failed: email not found: {}", mask_email(&email));
            DomainError::InvalidCredentials
        })?;

        // 2. Verify password
        let password_valid = PasswordService::verify(password, &user.password_hash)
            .map_err(|_| DomainError::InvalidCredentials)?;
        if !password_valid {
            warn!("Login failed: invalid password for: {}", mask_email(&email));
            return Err(DomainError::InvalidCredentials);
        }

        // 3. Check if user and tenant can login
        if !user.can_login() {
            warn!(user_id = %user.id, "Login failed: user not active");
            return Err(DomainError::UserNotActive);
        }
        let tenant = self.active_tenant(&user.tenant_id).await?;

        // 4. Record the login, upgrading legacy hashes on the way
        let mut updated_user = user.clone();
        updated_user.record_login();
        if PasswordService::needs_rehash(&updated_user.password_hash) {
            match PasswordService::hash(password) {
                Ok(hash) => {
                    updated_user.set_password_hash(hash);
                    info!(user_id = %user.id, "Upgraded legacy password hash");
                }
                Err(e) => error!("Failed to rehash legacy password: {}", e),
            }
        }
        let updated_user = match self.users.update(&updated_user).await {
            Ok(saved) => saved,
            Err(e) => {
                // Don't fail login for this
                error!("Failed to update last login: {}", e);
                updated_user
            }
        };

        info!(user_id = %updated_user.id, tenant_id = %tenant.id, "Login successful");
        self.issue_session(&updated_user, &tenant)
    }

    /// Exchange a refresh token for a fresh session.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthSession, DomainError> {
        let claims = self
            .jwt
            .validate_refresh_token(refresh_token)
            .map_err(|e| DomainError::InvalidToken(e.to_string()))?;
        let user_id = claims.user_id().map_err(|e| DomainError::InvalidToken(e.to_string()))?;

        let user = self.users.find_by_id(&user_id).await?.ok_or(DomainError::UserNotFound)?;
        if !user.can_login() {
            return Err(DomainError::UserNotActive);
        }
        let tenant = self.active_tenant(&user.tenant_id).await?;

        debug!(user_id = %user.id, "Session refreshed");
        self.issue_session(&user, &tenant)
    }

    /// Current user and tenant
    pub async fn me(&self, user_id: &Uuid) -> Result<(UserInfo, TenantInfo), DomainError> {
        let user = self.users.find_by_id(user_id).await?.ok_or(DomainError::UserNotFound)?;
        let tenant = self
            .tenants
            .find_by_id(&user.tenant_id)
            .await?
            .ok_or(DomainError::TenantNotFound)?;
        Ok((UserInfo::from(&user), TenantInfo::from(&tenant)))
    }

    /// Checks that a verified token still belongs to an active user of an
    /// active tenant. Deleted users, or users moved to another tenant, get
    /// `UserNotFound`.
    pub async fn check_access(&self, user_id: &Uuid, tenant_id: &Uuid) -> Result<(), DomainError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .filter(|user| user.tenant_id == *tenant_id)
            .ok_or(DomainError::UserNotFound)?;
        if !user.can_login() {
            warn!(user_id = %user_id, "Access denied: user not active");
            return Err(DomainError::UserNotActive);
        }

        let tenant_active = self
            .tenants
            .find_by_id(tenant_id)
            .await?
            .is_some_and(|tenant| tenant.is_active);
        if !tenant_active {
            warn!(tenant_id = %tenant_id, "Access denied: tenant not active");
            return Err(DomainError::TenantNotActive);
        }
        Ok(())
    }

    pub async fn change_password(
        &self,
        user_id: &Uuid,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), DomainError> {
        let user = self.users.find_by_id(user_id).await?.ok_or(DomainError::UserNotFound)?;

        let valid = PasswordService::verify(current_password, &user.password_hash)
            .map_err(|_| DomainError::InvalidCredentials)?;
        if !valid {
            warn!(user_id = %user_id, "Password change rejected: wrong current password");
            return Err(DomainError::InvalidCredentials);
        }

        self.store_new_password(user, new_password).await?;
        info!(user_id = %user_id, "Password changed");
        Ok(())
    }

    /// Creates a reset token for a known email. Unknown emails return
    /// `Ok(None)` so callers can answer identically either way.
    pub async fn forgot_password(&self, email: &str) -> Result<Option<String>, DomainError> {
        let email = User::normalize_email(email);
        let Some(user) = self.users.find_by_email(&email).await? else {
            info!("Password reset requested for unknown email: {}", mask_email(&email));
            return Ok(None);
        };

        let token = ResetToken::generate();
        let reset = PasswordReset::new(user.id, token.hash, self.reset_token_ttl);
        self.resets.create(&reset).await?;

        info!(user_id = %user.id, expires_at = %reset.expires_at, "Password reset token issued");
        debug!(user_id = %user.id, token = %token.plaintext, "Password reset token");
        Ok(Some(token.plaintext))
    }

    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), DomainError> {
        let hash = ResetToken::digest(token);
        let reset = self
            .resets
            .find_by_token_hash(&hash)
            .await?
            .filter(|r| r.is_usable(Utc::now()))
            .ok_or(DomainError::InvalidResetToken)?;

        let user = self
            .users
            .find_by_id(&reset.user_id)
            .await?
            .ok_or(DomainError::InvalidResetToken)?;

        // Check the new password before burning the token
        PasswordService::check_strength(new_password, &[user.email.as_str(), user.name.as_str()])?;

        if !self.resets.mark_used(&reset.id, Utc::now()).await? {
            return Err(DomainError::InvalidResetToken);
        }

        let user_id = user.id;
        self.store_new_password(user, new_password).await?;
        info!(user_id = %user_id, "Password reset completed");
        Ok(())
    }

    /// Claims of a valid access token, for request authentication.
    pub fn verify_access_token(&self, token: &str) -> Result<echo_security::Claims, JwtError> {
        self.jwt.validate_access_token(token)
    }

    async fn store_new_password(&self, mut user: User, new_password: &str) -> Result<(), DomainError> {
        PasswordService::check_strength(new_password, &[user.email.as_str(), user.name.as_str()])?;
        let hash = PasswordService::hash(new_password)?;
        user.set_password_hash(hash);
        self.users.update(&user).await?;
        Ok(())
    }

    async fn active_tenant(&self, tenant_id: &Uuid) -> Result<Tenant, DomainError> {
        let tenant = self
            .tenants
            .find_by_id(tenant_id)
            .await?
            .ok_or(DomainError::TenantNotFound)?;
        if !tenant.is_active {
            warn!(tenant_id = %tenant_id, "Login failed: tenant not active");
            return Err(DomainError::TenantNotActive);
        }
        Ok(tenant)
    }

    async fn free_slug(&self, base: &str) -> Result<String, DomainError> {
        if self.tenants.find_by_slug(base).await?.is_none() {
            return Ok(base.to_string());
        }
        for n in 2..=MAX_SLUG_ATTEMPTS {
            let candidate = format!("{}-{}", base, n);
            if self.tenants.find_by_slug(&candidate).await?.is_none() {
                return Ok(candidate);
            }
        }
        Err(DomainError::UnableToGenerateUniqueName)
    }

    fn issue_session(&self, user: &User, tenant: &Tenant) -> Result<AuthSession, DomainError> {
        let role = user.role.as_str();
        let access_token = self
            .jwt
            .generate_access_token(&user.id, &tenant.id, role)
            .map_err(|e| DomainError::TokenGenerationError(e.to_string()))?;
        let refresh_token = self
            .jwt
            .generate_refresh_token(&user.id, &tenant.id, role)
            .map_err(|e| DomainError::TokenGenerationError(e.to_string()))?;

        Ok(AuthSession {
            user: UserInfo::from(user),
            tenant: TenantInfo::from(tenant),
            access_token,
            refresh_token,
            token_type: "Bearer",
            expires_in: self.jwt.access_token_expiry(),
        })
    }
}

/// Registration payload
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub company: Option<String>,
}

/// Result of a successful login, registration or refresh
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub user: UserInfo,
    pub tenant: TenantInfo,
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

/// User info returned in auth responses
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub last_login: Option<chrono::DateTime<Utc>>,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            tenant_id: user.tenant_id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role.as_str().to_string(),
            last_login: user.last_login,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TenantInfo {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

impl From<&Tenant> for TenantInfo {
    fn from(tenant: &Tenant) -> Self {
        Self {
            id: tenant.id,
            name: tenant.name.clone(),
            slug: tenant.slug.clone(),
        }
    }
}
