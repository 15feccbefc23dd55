//! Cookie-session authentication core.
//!
//! Tokens are stateless HS256 JWTs; the server keeps no session table.
//! Logout works by blacklisting the token's `jti` in Redis for its remaining
//! lifetime, and registration/login are rate-limited per client address over
//! the same Redis substrate.
//!
//! ## Degrade Open
//!
//! Redis being unreachable never rejects a request: revocation checks treat
//! the token as not revoked and rate limiting allows the request. Signature,
//! expiry and credential failures are always enforced.

pub(crate) mod login;
pub(crate) mod me;
mod password;
pub(crate) mod principal;
mod rate_limit;
pub(crate) mod register;
mod revocation;
pub(crate) mod session;
mod state;
mod storage;
mod token;
pub(crate) mod types;
mod utils;

pub use rate_limit::{FixedWindowLimiter, NoopRateLimiter, RateLimitDecision, RateLimiter};
pub use revocation::RevocationStore;
pub use state::{AuthConfig, AuthState};
