use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gilt_auth_types::cookie::{
    GILT_REFRESH_TOKEN, clear_cookies, set_access_token_cookie, set_refresh_token_cookie,
};
use gilt_auth_types::identity::Identity;
use gilt_core::response::ApiResponse;

use crate::domain::repository::UserRepository as _;
use crate::domain::types::{ResetProof, User};
use crate::error::ApiError;
use crate::state::AppState;
use crate::usecase::auth::{
    ForgotPasswordUseCase, LoginInput, LoginOutput, LoginUseCase, RegisterInput, RegisterUseCase,
    ResendOtpUseCase, ResetPasswordInput, ResetPasswordUseCase, RefreshTokenUseCase,
    VerifyOtpInput, VerifyOtpUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: u8,
    pub is_verified: bool,
    #[serde(serialize_with = "gilt_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            is_verified: user.is_verified,
            created_at: user.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct LoginData {
    pub user: UserResponse,
    pub access_token: String,
    pub access_token_exp: u64,
}

fn login_response(
    jar: CookieJar,
    out: LoginOutput,
    cookie_domain: &str,
    message: &str,
) -> impl IntoResponse + use<> {
    let jar = set_access_token_cookie(jar, out.access_token.clone(), cookie_domain.to_owned());
    let jar = set_refresh_token_cookie(jar, out.refresh_token, cookie_domain.to_owned());
    let data = LoginData {
        user: UserResponse::from(out.user),
        access_token: out.access_token,
        access_token_exp: out.access_token_exp,
    };
    (jar, Json(ApiResponse::with(message, data)))
}

// ── POST /api/auth/register ──────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), ApiError> {
    let uc = RegisterUseCase {
        users: state.user_repo(),
    };
    let user = uc
        .execute(RegisterInput {
            name: body.name,
            email: body.email,
            password: body.password,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with(
            "registered, verification otp sent",
            UserResponse::from(user),
        )),
    ))
}

// ── POST /api/auth/login ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let uc = LoginUseCase {
        users: state.user_repo(),
        jwt_secret: state.jwt_secret.clone(),
    };
    let out = uc
        .execute(LoginInput {
            email: body.email,
            password: body.password,
        })
        .await?;
    Ok(login_response(jar, out, &state.cookie_domain, "logged in"))
}

// ── POST /api/auth/verify-otp ────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
}

pub async fn verify_otp(
    State(state): State<AppState>,
    Json(body): Json<VerifyOtpRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let uc = VerifyOtpUseCase {
        users: state.user_repo(),
    };
    uc.execute(VerifyOtpInput {
        email: body.email,
        otp: body.otp,
    })
    .await?;
    Ok(Json(ApiResponse::message("email verified")))
}

// ── POST /api/auth/resend-otp ────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct EmailRequest {
    pub email: String,
}

pub async fn resend_otp(
    State(state): State<AppState>,
    Json(body): Json<EmailRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let uc = ResendOtpUseCase {
        users: state.user_repo(),
    };
    uc.execute(&body.email).await?;
    Ok(Json(ApiResponse::message("verification otp sent")))
}

// ── POST /api/auth/forgot-password ───────────────────────────────────────────

pub async fn forgot_password(
    State(state): State<AppState>,
    Json(body): Json<EmailRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let uc = ForgotPasswordUseCase {
        users: state.user_repo(),
    };
    uc.execute(&body.email).await?;
    Ok(Json(ApiResponse::message("password reset otp sent")))
}

// ── POST /api/auth/reset-password ────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub otp: Option<String>,
    pub token: Option<String>,
    pub new_password: String,
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let uc = ResetPasswordUseCase {
        users: state.user_repo(),
    };
    uc.execute(ResetPasswordInput {
        email: body.email,
        proof: ResetProof {
            otp: body.otp,
            token: body.token,
        },
        new_password: body.new_password,
    })
    .await?;
    Ok(Json(ApiResponse::message("password reset")))
}

// ── POST /api/auth/refresh ───────────────────────────────────────────────────

pub async fn refresh_token(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    let refresh_value = jar
        .get(GILT_REFRESH_TOKEN)
        .map(|c| c.value().to_owned())
        .ok_or(ApiError::InvalidRefreshToken)?;

    let uc = RefreshTokenUseCase {
        users: state.user_repo(),
        jwt_secret: state.jwt_secret.clone(),
    };
    let out = uc.execute(&refresh_value).await?;
    Ok(login_response(
        jar,
        out,
        &state.cookie_domain,
        "token refreshed",
    ))
}

// ── POST /api/auth/logout ────────────────────────────────────────────────────

pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    let jar = clear_cookies(jar, state.cookie_domain.clone());
    Ok((jar, Json(ApiResponse::message("logged out"))))
}

// ── GET /api/auth/me ─────────────────────────────────────────────────────────

pub async fn get_me(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = state
        .user_repo()
        .find_by_id(identity.user_id)
        .await?
        .ok_or(ApiError::UserNotFound)?;
    Ok(Json(ApiResponse::with(
        "profile fetched",
        UserResponse::from(user),
    )))
}
