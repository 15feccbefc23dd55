use crate::api;
use anyhow::Result;
use secrecy::SecretString;

pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub redis_url: String,
    pub secret_key: SecretString,
    pub production: bool,
    pub access_ttl_seconds: i64,
    pub refresh_ttl_seconds: i64,
    pub rate_limit_max_requests: u32,
    pub cors_origins: Vec<String>,
}

impl std::fmt::Debug for Args {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Args")
            .field("port", &self.port)
            .field("dsn", &self.dsn)
            .field("redis_url", &self.redis_url)
            .field("secret_key", &"***")
            .field("production", &self.production)
            .field("access_ttl_seconds", &self.access_ttl_seconds)
            .field("refresh_ttl_seconds", &self.refresh_ttl_seconds)
            .field("rate_limit_max_requests", &self.rate_limit_max_requests)
            .field("cors_origins", &self.cors_origins)
            .finish()
    }
}

/// Execute the server action.
/// # Errors
/// Returns an error if the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let auth_config = api::handlers::auth::AuthConfig::new(args.secret_key)
        .with_production(args.production)
        .with_access_ttl_seconds(args.access_ttl_seconds)
        .with_refresh_ttl_seconds(args.refresh_ttl_seconds)
        .with_rate_limit_max_requests(args.rate_limit_max_requests);

    api::new(
        args.port,
        args.dsn,
        args.redis_url,
        auth_config,
        args.cors_origins,
    )
    .await
}
