//! API handlers for the Goal Planner service.
//!
//! This module organizes the service's route handlers: session-cookie
//! authentication under `auth`, the per-user goal collection under `goals`,
//! and the shared error taxonomy in `error`.

pub mod auth;
pub mod error;
pub mod goals;
pub mod health;
pub mod root;
