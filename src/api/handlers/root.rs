use crate::GIT_COMMIT_HASH;
use axum::response::{IntoResponse, Json};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
pub struct Root {
    name: String,
    version: String,
    commit: String,
}

// axum handler for the service banner
pub async fn root() -> impl IntoResponse {
    Json(Root {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        commit: GIT_COMMIT_HASH.to_string(),
    })
}
