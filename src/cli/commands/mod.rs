pub mod logging;

use clap::{
    Arg, ColorChoice, Command,
    builder::styling::{AnsiColor, Effects, Styles},
};

pub const ARG_PORT: &str = "port";
pub const ARG_DSN: &str = "dsn";
pub const ARG_REDIS_URL: &str = "redis-url";
pub const ARG_SECRET_KEY: &str = "secret-key";
pub const ARG_ENVIRONMENT: &str = "environment";
pub const ARG_ACCESS_TTL_MINUTES: &str = "access-ttl-minutes";
pub const ARG_REFRESH_TTL_DAYS: &str = "refresh-ttl-days";
pub const ARG_RATE_LIMIT_MAX: &str = "rate-limit-max";
pub const ARG_CORS_ORIGIN: &str = "cors-origin";

// Tokens are HS256-signed; a short secret makes offline brute force cheap.
const MIN_SECRET_KEY_LENGTH: usize = 32;

/// Validate argument combinations that clap cannot express on its own.
///
/// # Errors
/// Returns an error string if the signing secret is too short.
pub fn validate(matches: &clap::ArgMatches) -> Result<(), String> {
    let Some(secret) = matches.get_one::<String>(ARG_SECRET_KEY) else {
        return Ok(()); // Should be handled by required=true in clap
    };

    if secret.len() < MIN_SECRET_KEY_LENGTH {
        return Err(format!(
            "--{ARG_SECRET_KEY} must be at least {MIN_SECRET_KEY_LENGTH} characters"
        ));
    }
    Ok(())
}

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("goalplanner")
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8080")
                .env("GOALPLANNER_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new(ARG_DSN)
                .short('d')
                .long("dsn")
                .help("Database connection string")
                .env("GOALPLANNER_DSN")
                .required(true),
        )
        .arg(
            Arg::new(ARG_REDIS_URL)
                .long("redis-url")
                .help("Redis connection URL (revocation list and rate-limit counters)")
                .default_value("redis://localhost:6379")
                .env("GOALPLANNER_REDIS_URL"),
        )
        .arg(
            Arg::new(ARG_SECRET_KEY)
                .long("secret-key")
                .help("Secret key used to sign session tokens")
                .env("GOALPLANNER_SECRET_KEY")
                .required(true),
        )
        .arg(
            Arg::new(ARG_ENVIRONMENT)
                .long("environment")
                .help("Deployment environment; production marks cookies Secure")
                .default_value("development")
                .env("GOALPLANNER_ENVIRONMENT")
                .value_parser(["development", "production"]),
        )
        .arg(
            Arg::new(ARG_ACCESS_TTL_MINUTES)
                .long("access-ttl-minutes")
                .help("Access token lifetime in minutes")
                .default_value("30")
                .env("GOALPLANNER_ACCESS_TTL_MINUTES")
                .value_parser(clap::value_parser!(i64).range(1..)),
        )
        .arg(
            Arg::new(ARG_REFRESH_TTL_DAYS)
                .long("refresh-ttl-days")
                .help("Refresh token lifetime in days")
                .default_value("7")
                .env("GOALPLANNER_REFRESH_TTL_DAYS")
                .value_parser(clap::value_parser!(i64).range(1..)),
        )
        .arg(
            Arg::new(ARG_RATE_LIMIT_MAX)
                .long("rate-limit-max")
                .help("Requests allowed per client address per 60s window on auth endpoints")
                .default_value("10")
                .env("GOALPLANNER_RATE_LIMIT_MAX")
                .value_parser(clap::value_parser!(u32).range(1..)),
        )
        .arg(
            Arg::new(ARG_CORS_ORIGIN)
                .long("cors-origin")
                .help("Allowed CORS origins (comma separated)")
                .env("GOALPLANNER_CORS_ORIGIN")
                .num_args(1..)
                .value_delimiter(',')
                .default_values(["http://localhost:5173", "http://localhost:3000"]),
        );

    logging::with_args(command)
}
