//! Command-line argument dispatch and server initialization.
//!
//! This module parses validated CLI arguments and maps them to the appropriate
//! action, such as starting the API server with its full configuration state.

use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::{
    ARG_ACCESS_TTL_MINUTES, ARG_CORS_ORIGIN, ARG_DSN, ARG_ENVIRONMENT, ARG_PORT,
    ARG_RATE_LIMIT_MAX, ARG_REDIS_URL, ARG_REFRESH_TTL_DAYS, ARG_SECRET_KEY,
};
use anyhow::{Context, Result};
use secrecy::SecretString;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>(ARG_DSN)
        .cloned()
        .context("missing required argument: --dsn")?;
    let redis_url = matches
        .get_one::<String>(ARG_REDIS_URL)
        .cloned()
        .context("missing required argument: --redis-url")?;
    let secret_key = matches
        .get_one::<String>(ARG_SECRET_KEY)
        .cloned()
        .context("missing required argument: --secret-key")?;

    // Validate constraints clap cannot express (secret length)
    crate::cli::commands::validate(matches).map_err(|e| anyhow::anyhow!(e))?;

    let production = matches
        .get_one::<String>(ARG_ENVIRONMENT)
        .is_some_and(|env| env == "production");

    let access_ttl_minutes = matches
        .get_one::<i64>(ARG_ACCESS_TTL_MINUTES)
        .copied()
        .unwrap_or(30);
    let refresh_ttl_days = matches
        .get_one::<i64>(ARG_REFRESH_TTL_DAYS)
        .copied()
        .unwrap_or(7);
    let rate_limit_max_requests = matches
        .get_one::<u32>(ARG_RATE_LIMIT_MAX)
        .copied()
        .unwrap_or(10);

    let cors_origins = matches
        .get_many::<String>(ARG_CORS_ORIGIN)
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    Ok(Action::Server(Args {
        port,
        dsn,
        redis_url,
        secret_key: SecretString::from(secret_key),
        production,
        access_ttl_seconds: access_ttl_minutes * 60,
        refresh_ttl_seconds: refresh_ttl_days * 24 * 60 * 60,
        rate_limit_max_requests,
        cors_origins,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_args_from_matches() {
        temp_env::with_vars(
            [
                ("GOALPLANNER_PORT", None::<&str>),
                ("GOALPLANNER_ENVIRONMENT", Some("production")),
                (
                    "GOALPLANNER_DSN",
                    Some("postgres://user@localhost:5432/goalplanner"),
                ),
                (
                    "GOALPLANNER_SECRET_KEY",
                    Some("0123456789abcdef0123456789abcdef"),
                ),
            ],
            || {
                let command = crate::cli::commands::new();
                let matches = command.get_matches_from(vec!["goalplanner"]);
                let action = handler(&matches);
                assert!(action.is_ok());
                if let Ok(Action::Server(args)) = action {
                    assert_eq!(args.port, 8080);
                    assert!(args.production);
                    assert_eq!(args.access_ttl_seconds, 30 * 60);
                    assert_eq!(args.refresh_ttl_seconds, 7 * 24 * 60 * 60);
                    assert_eq!(args.rate_limit_max_requests, 10);
                }
            },
        );
    }

    #[test]
    fn short_secret_rejected() {
        temp_env::with_vars(
            [
                (
                    "GOALPLANNER_DSN",
                    Some("postgres://user@localhost:5432/goalplanner"),
                ),
                ("GOALPLANNER_SECRET_KEY", Some("short")),
            ],
            || {
                let command = crate::cli::commands::new();
                let matches = command.get_matches_from(vec!["goalplanner"]);
                let result = handler(&matches);
                assert!(result.is_err());
            },
        );
    }
}
