use axum::response::Html;
use chrono::{Datelike, Utc};
use serde::Serialize;
use serde_json::{json, Map, Value};

use suzstar_common::AppError;
use suzstar_database::SiteSetting;

use crate::error::PageError;
use crate::notice::Flash;
use crate::services::{AppState, SettingsService};

pub mod admin;
pub mod dashboard;
pub mod downloads;
pub mod forms;
pub mod pages;

const DEFAULT_SITE_NAME: &str = "Suzstar Counseling";

/// Values every page layout reads.
fn layout_context(state: &AppState, settings: Option<SiteSetting>, flash: Flash, title: &str) -> Map<String, Value> {
    let site_name = settings
        .as_ref()
        .map(|s| s.site_name.clone())
        .unwrap_or_else(|| DEFAULT_SITE_NAME.to_string());

    let mut layout = Map::new();
    layout.insert("site_name".into(), json!(site_name));
    layout.insert("site_settings".into(), json!(settings));
    layout.insert("notice".into(), json!(flash.view()));
    layout.insert("media_url".into(), json!(state.config.storage.media_url));
    layout.insert("year".into(), json!(Utc::now().year()));
    layout.insert("title".into(), json!(title));
    layout
}

/// Renders a page template with the site-wide layout values merged into `context`.
pub async fn render<T: Serialize>(
    state: &AppState,
    flash: Flash,
    template: &str,
    title: &str,
    context: T,
) -> Result<Html<String>, PageError> {
    let settings = SettingsService::new(state).current().await?;

    let mut values = match serde_json::to_value(context) {
        Ok(Value::Object(map)) => map,
        Ok(_) => Map::new(),
        Err(e) => return Err(AppError::Internal(format!("Page context error: {}", e)).into()),
    };
    for (key, value) in layout_context(state, settings, flash, title) {
        values.entry(key).or_insert(value);
    }

    let html = state.templates.render_page(template, &Value::Object(values))?;
    Ok(Html(html))
}

pub async fn health_check() -> axum::Json<suzstar_common::ApiResponse<String>> {
    axum::Json(suzstar_common::ApiResponse::success(
        "Suzstar Counseling website is healthy".to_string(),
    ))
}
