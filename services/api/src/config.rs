/// API service configuration loaded from environment variables.
#[derive(Debug)]
pub struct ApiConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// HMAC secret for signing JWT access and refresh tokens.
    pub jwt_secret: String,
    /// Cookie domain attribute (root domain, e.g. "example.com").
    pub cookie_domain: String,
    /// TCP port to listen on (default 3110). Env var: `API_PORT`.
    pub api_port: u16,
    /// Image store bucket name. Env var: `S3_BUCKET`.
    pub s3_bucket: String,
    /// Custom S3-compatible endpoint (MinIO etc.). Env var: `S3_ENDPOINT`.
    pub s3_endpoint: Option<String>,
    /// Public base URL for uploaded objects. Env var: `S3_PUBLIC_BASE_URL`.
    pub s3_public_base_url: String,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let s3_bucket = std::env::var("S3_BUCKET").expect("S3_BUCKET");
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            jwt_secret: std::env::var("JWT_SECRET").expect("JWT_SECRET"),
            cookie_domain: std::env::var("COOKIE_DOMAIN").expect("COOKIE_DOMAIN"),
            api_port: std::env::var("API_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3110),
            s3_endpoint: std::env::var("S3_ENDPOINT").ok(),
            s3_public_base_url: std::env::var("S3_PUBLIC_BASE_URL")
                .unwrap_or_else(|_| format!("https://{s3_bucket}.s3.amazonaws.com")),
            s3_bucket,
        }
    }
}
