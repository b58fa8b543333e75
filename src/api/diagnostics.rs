//! Environment diagnostics.
//!
//! Reports whether each consumed variable is set. Values are never returned.

use axum::{extract::State, Json};
use std::collections::BTreeMap;

use crate::http::server::AppState;

pub async fn debug_env(State(state): State<AppState>) -> Json<BTreeMap<&'static str, bool>> {
    Json(state.env.presence().clone())
}
