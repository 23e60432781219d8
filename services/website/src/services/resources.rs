use serde::Deserialize;
use sqlx::PgPool;
use suzstar_common::AppError;
use suzstar_database::{non_empty, Condition, ListQuery, Page, Paginator, Resource};
use tokio::fs::File;

use super::{filter_query, AppState};
use crate::storage::FileStore;

pub const RESOURCE_ORDER: &str = "created_at DESC";
pub const RESOURCES_PER_PAGE: i64 = 9;
pub const KEYWORD_COLUMNS: &[&str] = &["title", "description"];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResourceFilters {
    #[serde(rename = "type")]
    pub resource_type: Option<String>,
    pub category: Option<String>,
    pub q: Option<String>,
    pub page: Option<String>,
}

impl ResourceFilters {
    pub fn filter_query(&self) -> String {
        filter_query(&[
            ("type", self.resource_type.as_deref()),
            ("category", self.category.as_deref()),
            ("q", self.q.as_deref()),
        ])
    }
}

/// An opened resource file, ready to stream.
pub struct ResourceDownload {
    pub resource: Resource,
    pub file_name: String,
    pub file: File,
}

pub struct ResourceService {
    db_pool: PgPool,
    file_store: FileStore,
}

impl ResourceService {
    pub fn new(state: &AppState) -> Self {
        Self {
            db_pool: state.db_pool.clone(),
            file_store: state.file_store.clone(),
        }
    }

    pub async fn list(&self, filters: &ResourceFilters) -> Result<Page<Resource>, AppError> {
        ListQuery::new("resources", RESOURCE_ORDER)
            .filter_opt(
                non_empty(filters.resource_type.as_deref())
                    .map(|t| Condition::Text("resource_type", t.to_string())),
            )
            .filter_opt(
                non_empty(filters.category.as_deref())
                    .map(|c| Condition::Text("category", c.to_string())),
            )
            .search(KEYWORD_COLUMNS, filters.q.as_deref())
            .fetch_page(&self.db_pool, Paginator::new(RESOURCES_PER_PAGE), filters.page.as_deref())
            .await
    }

    pub async fn categories(&self) -> Result<Vec<String>, AppError> {
        sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT category FROM resources WHERE category <> '' ORDER BY category",
        )
        .fetch_all(&self.db_pool)
        .await
        .map_err(AppError::Database)
    }

    pub async fn get(&self, id: i64) -> Result<Resource, AppError> {
        sqlx::query_as::<_, Resource>("SELECT * FROM resources WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Resource".to_string()))
    }

    /// Opens the resource's file and counts the download.
    ///
    /// `Ok(None)` when the resource has no file or the file cannot be opened;
    /// the counter is only touched once the file is open.
    pub async fn open_download(&self, id: i64) -> Result<Option<ResourceDownload>, AppError> {
        let resource = self.get(id).await?;
        let Some(path) = resource.file_upload.clone().filter(|p| !p.trim().is_empty()) else {
            return Ok(None);
        };

        let file = match self.file_store.open(&path).await {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!(resource_id = id, path = %path, error = %e, "Resource file unavailable");
                return Ok(None);
            }
        };

        sqlx::query("UPDATE resources SET downloads_count = downloads_count + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.db_pool)
            .await?;

        tracing::info!(resource_id = id, "Resource downloaded");
        Ok(Some(ResourceDownload {
            resource,
            file_name: path,
            file,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_parameter_is_named_type() {
        let filters: ResourceFilters =
            serde_json::from_value(serde_json::json!({"type": "guide", "q": "sleep"})).unwrap();
        assert_eq!(filters.resource_type.as_deref(), Some("guide"));
        assert_eq!(filters.filter_query(), "&type=guide&q=sleep");
    }
}
