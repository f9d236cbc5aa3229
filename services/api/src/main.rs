use aws_config::meta::region::RegionProviderChain;
use sea_orm::Database;
use tracing::info;

use gilt_api::config::ApiConfig;
use gilt_api::infra::images::S3ImageStore;
use gilt_api::router::build_router;
use gilt_api::state::AppState;

#[tokio::main]
async fn main() {
    gilt_core::tracing::init_tracing();

    let config = ApiConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let region_provider = RegionProviderChain::default_provider().or_else("us-east-1");
    let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(region_provider)
        .load()
        .await;
    let mut s3_config_builder = aws_sdk_s3::config::Builder::from(&aws_config);
    // Allow S3-compatible endpoints (MinIO etc.).
    if let Some(endpoint) = &config.s3_endpoint {
        s3_config_builder = s3_config_builder
            .endpoint_url(endpoint)
            .force_path_style(true);
    }
    let s3_client = aws_sdk_s3::Client::from_conf(s3_config_builder.build());

    let state = AppState {
        db,
        images: S3ImageStore {
            client: s3_client,
            bucket: config.s3_bucket,
            public_base_url: config.s3_public_base_url,
        },
        jwt_secret: config.jwt_secret,
        cookie_domain: config.cookie_domain,
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.api_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("api service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
