use axum::{extract::State, response::Html};
use serde_json::json;

use super::render;
use crate::error::PageError;
use crate::notice::Flash;
use crate::services::{AppState, DashboardService};

pub async fn dashboard(State(state): State<AppState>, flash: Flash) -> Result<Html<String>, PageError> {
    let stats = DashboardService::new(&state).stats().await?;
    render(&state, flash, "dashboard", "Dashboard", json!({ "stats": stats })).await
}
