//! # Goal Planner API
//!
//! `goalplanner` is a goal-tracking service (financial, career and personal
//! health goals) guarded by cookie-based session authentication.
//!
//! ## Sessions
//!
//! Authentication issues a short-lived access token and a longer-lived
//! refresh token, both HS256-signed JWTs transported in `HttpOnly` cookies.
//! The server keeps no session table: token authority is cryptographic, with
//! a Redis-backed blacklist of revoked token ids (`jti`) layered on top so
//! logout takes effect before natural expiry.
//!
//! - **Cookie names are part of the wire contract.** The CDN in front of the
//!   API forwards only allow-listed cookie names; the access cookie must be
//!   named `__session` to survive it.
//! - **Degrade open:** if Redis is unreachable, revocation checks and rate
//!   limiting are skipped rather than failing requests. Signature, expiry and
//!   credential failures are always enforced.
//!
//! ## Rate Limiting
//!
//! Registration and login are limited per client address with a fixed
//! 60-second window counter kept in Redis (`INCR` + expiry on first hit).

pub mod api;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
