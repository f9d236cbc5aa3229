use chrono::{Duration, Utc};
use rand::Rng as _;
use serde_json::json;
use uuid::Uuid;

use gilt_auth_types::token::{issue_access_token, issue_refresh_token, validate_token};

use crate::domain::repository::UserRepository;
use crate::domain::types::{
    MIN_PASSWORD_LEN, OTP_LEN, OTP_TTL_MINS, OtpCheck, OutboxEvent, RESET_TOKEN_LEN, ResetProof,
    User, validate_email,
};
use crate::error::ApiError;

/// Charset for reset tokens (uppercase alphanumeric).
const TOKEN_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

fn generate_otp() -> String {
    let mut rng = rand::rng();
    (0..OTP_LEN)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect()
}

fn generate_reset_token() -> String {
    let mut rng = rand::rng();
    (0..RESET_TOKEN_LEN)
        .map(|_| TOKEN_CHARSET[rng.random_range(0..TOKEN_CHARSET.len())] as char)
        .collect()
}

// ── Register ─────────────────────────────────────────────────────────────────

pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

pub struct RegisterUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> RegisterUseCase<U> {
    /// Create an unverified account with a fresh OTP. The user row and the
    /// OTP email's outbox event commit in one transaction, so a delivery-
    /// side failure can never strand a half-registered account.
    pub async fn execute(&self, input: RegisterInput) -> Result<User, ApiError> {
        if input.name.trim().is_empty() {
            return Err(ApiError::validation("name", "must not be blank"));
        }
        if !validate_email(&input.email) {
            return Err(ApiError::validation("email", "must be a valid email address"));
        }
        if input.password.len() < MIN_PASSWORD_LEN {
            return Err(ApiError::validation(
                "password",
                "must be at least 6 characters",
            ));
        }
        if self.users.find_by_email(&input.email).await?.is_some() {
            return Err(ApiError::EmailTaken);
        }

        let password_hash = bcrypt::hash(&input.password, bcrypt::DEFAULT_COST)
            .map_err(|e| ApiError::Internal(e.into()))?;

        let otp = generate_otp();
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: input.name,
            email: input.email,
            password_hash: Some(password_hash),
            role: 0,
            is_verified: false,
            otp_code: Some(otp.clone()),
            otp_expires_at: Some(now + Duration::minutes(OTP_TTL_MINS)),
            reset_otp: None,
            reset_token: None,
            reset_expires_at: None,
            created_at: now,
            updated_at: now,
        };

        let event = OutboxEvent {
            id: Uuid::new_v4(),
            kind: "otp_issued".to_owned(),
            payload: json!({ "email": user.email, "otp": otp, "purpose": "register" }),
            idempotency_key: format!("otp_issued:{}:{}", user.id, otp),
        };

        self.users.create_with_outbox(&user, &event).await?;
        Ok(user)
    }
}

// ── VerifyOtp ────────────────────────────────────────────────────────────────

pub struct VerifyOtpInput {
    pub email: String,
    pub otp: String,
}

pub struct VerifyOtpUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> VerifyOtpUseCase<U> {
    /// Transition unverified → verified. Succeeds exactly once: the OTP
    /// columns are cleared on success, so a repeat presents against
    /// nothing and fails. Mismatch or expiry leaves state untouched.
    pub async fn execute(&self, input: VerifyOtpInput) -> Result<(), ApiError> {
        let user = self
            .users
            .find_by_email(&input.email)
            .await?
            .ok_or(ApiError::UserNotFound)?;
        if user.is_verified {
            return Err(ApiError::AlreadyVerified);
        }
        match user.otp_matches(&input.otp, Utc::now()) {
            OtpCheck::Valid => {
                self.users.mark_verified(user.id).await?;
                Ok(())
            }
            OtpCheck::Expired => Err(ApiError::OtpExpired),
            OtpCheck::Mismatch => Err(ApiError::InvalidOtp),
        }
    }
}

// ── ResendOtp ────────────────────────────────────────────────────────────────

pub struct ResendOtpUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> ResendOtpUseCase<U> {
    /// Regenerate the OTP and its expiry; the verification state itself
    /// is unchanged.
    pub async fn execute(&self, email: &str) -> Result<(), ApiError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(ApiError::UserNotFound)?;
        if user.is_verified {
            return Err(ApiError::AlreadyVerified);
        }

        let otp = generate_otp();
        let expires_at = Utc::now() + Duration::minutes(OTP_TTL_MINS);
        let event = OutboxEvent {
            id: Uuid::new_v4(),
            kind: "otp_issued".to_owned(),
            payload: json!({ "email": user.email, "otp": otp, "purpose": "register" }),
            idempotency_key: format!("otp_issued:{}:{}", user.id, otp),
        };
        self.users.set_otp(user.id, &otp, expires_at, &event).await
    }
}

// ── Login ────────────────────────────────────────────────────────────────────

pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug)]
pub struct LoginOutput {
    pub user: User,
    pub access_token: String,
    pub access_token_exp: u64,
    pub refresh_token: String,
}

pub struct LoginUseCase<U: UserRepository> {
    pub users: U,
    pub jwt_secret: String,
}

impl<U: UserRepository> LoginUseCase<U> {
    pub async fn execute(&self, input: LoginInput) -> Result<LoginOutput, ApiError> {
        let user = self
            .users
            .find_by_email(&input.email)
            .await?
            .ok_or(ApiError::InvalidCredentials)?;

        // OAuth-linked accounts carry no local credential.
        let hash = user
            .password_hash
            .as_deref()
            .ok_or(ApiError::InvalidCredentials)?;
        let matches =
            bcrypt::verify(&input.password, hash).map_err(|e| ApiError::Internal(e.into()))?;
        if !matches {
            return Err(ApiError::InvalidCredentials);
        }
        if !user.is_verified {
            return Err(ApiError::EmailNotVerified);
        }

        let (access_token, access_token_exp) =
            issue_access_token(user.id, user.role, &self.jwt_secret)
                .map_err(|e| ApiError::Internal(e.into()))?;
        let refresh_token = issue_refresh_token(user.id, user.role, &self.jwt_secret)
            .map_err(|e| ApiError::Internal(e.into()))?;

        Ok(LoginOutput {
            user,
            access_token,
            access_token_exp,
            refresh_token,
        })
    }
}

// ── RefreshToken ─────────────────────────────────────────────────────────────

pub struct RefreshTokenUseCase<U: UserRepository> {
    pub users: U,
    pub jwt_secret: String,
}

impl<U: UserRepository> RefreshTokenUseCase<U> {
    pub async fn execute(&self, refresh_token_value: &str) -> Result<LoginOutput, ApiError> {
        let claims = validate_token(refresh_token_value, &self.jwt_secret)
            .map_err(|_| ApiError::InvalidRefreshToken)?;
        let user_id = claims
            .sub
            .parse::<Uuid>()
            .map_err(|_| ApiError::InvalidRefreshToken)?;
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(ApiError::InvalidRefreshToken)?;

        let (access_token, access_token_exp) =
            issue_access_token(user.id, user.role, &self.jwt_secret)
                .map_err(|e| ApiError::Internal(e.into()))?;
        let refresh_token = issue_refresh_token(user.id, user.role, &self.jwt_secret)
            .map_err(|e| ApiError::Internal(e.into()))?;

        Ok(LoginOutput {
            user,
            access_token,
            access_token_exp,
            refresh_token,
        })
    }
}

// ── ForgotPassword ───────────────────────────────────────────────────────────

pub struct ForgotPasswordUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> ForgotPasswordUseCase<U> {
    /// Issue the reset OTP+token pair. Scoped independently from the
    /// registration OTP — a pending registration OTP is untouched.
    pub async fn execute(&self, email: &str) -> Result<(), ApiError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(ApiError::UserNotFound)?;

        let otp = generate_otp();
        let token = generate_reset_token();
        let expires_at = Utc::now() + Duration::minutes(OTP_TTL_MINS);
        let event = OutboxEvent {
            id: Uuid::new_v4(),
            kind: "password_reset_requested".to_owned(),
            payload: json!({ "email": user.email, "otp": otp, "token": token }),
            idempotency_key: format!("password_reset:{}:{}", user.id, otp),
        };
        self.users
            .set_reset_secrets(user.id, &otp, &token, expires_at, &event)
            .await
    }
}

// ── ResetPassword ────────────────────────────────────────────────────────────

pub struct ResetPasswordInput {
    pub email: String,
    pub proof: ResetProof,
    pub new_password: String,
}

pub struct ResetPasswordUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> ResetPasswordUseCase<U> {
    pub async fn execute(&self, input: ResetPasswordInput) -> Result<(), ApiError> {
        if input.proof.is_empty() {
            return Err(ApiError::validation("otp", "otp or reset token required"));
        }
        if input.new_password.len() < MIN_PASSWORD_LEN {
            return Err(ApiError::validation(
                "password",
                "must be at least 6 characters",
            ));
        }
        let user = self
            .users
            .find_by_email(&input.email)
            .await?
            .ok_or(ApiError::UserNotFound)?;

        match user.reset_proof_matches(&input.proof, Utc::now()) {
            OtpCheck::Valid => {}
            OtpCheck::Expired => return Err(ApiError::OtpExpired),
            OtpCheck::Mismatch => return Err(ApiError::InvalidOtp),
        }

        let password_hash = bcrypt::hash(&input.new_password, bcrypt::DEFAULT_COST)
            .map_err(|e| ApiError::Internal(e.into()))?;
        self.users.update_password(user.id, &password_hash).await
    }
}
