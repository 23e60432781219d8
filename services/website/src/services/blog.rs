use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use suzstar_common::{AppError, BlogCategory};
use suzstar_database::{non_empty, BlogPost, Condition, ListQuery, Page, Paginator};

use super::{filter_query, AppState};

pub const BLOG_ORDER: &str = "published_date DESC";
pub const BLOG_PER_PAGE: i64 = 6;
pub const KEYWORD_COLUMNS: &[&str] = &["title", "content", "excerpt"];

/// Query parameters of the blog listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlogFilters {
    pub category: Option<String>,
    pub tag: Option<String>,
    pub q: Option<String>,
    pub page: Option<String>,
}

impl BlogFilters {
    /// Active filters as `&key=value` pairs for pagination links.
    pub fn filter_query(&self) -> String {
        filter_query(&[
            ("category", self.category.as_deref()),
            ("tag", self.tag.as_deref()),
            ("q", self.q.as_deref()),
        ])
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CategoryCount {
    #[sqlx(try_from = "String")]
    pub category: BlogCategory,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TagCount {
    pub tag: String,
    pub count: i64,
}

pub struct BlogService {
    db_pool: PgPool,
}

impl BlogService {
    pub fn new(state: &AppState) -> Self {
        Self {
            db_pool: state.db_pool.clone(),
        }
    }

    fn published() -> ListQuery {
        ListQuery::new("blog_posts", BLOG_ORDER).filter(Condition::Bool("is_published", true))
    }

    pub async fn list(&self, filters: &BlogFilters) -> Result<Page<BlogPost>, AppError> {
        Self::published()
            .filter_opt(
                non_empty(filters.category.as_deref())
                    .map(|c| Condition::Text("category", c.to_string())),
            )
            .filter_opt(
                non_empty(filters.tag.as_deref()).map(|t| Condition::ArrayContains("tags", t.to_string())),
            )
            .search(KEYWORD_COLUMNS, filters.q.as_deref())
            .fetch_page(&self.db_pool, Paginator::new(BLOG_PER_PAGE), filters.page.as_deref())
            .await
    }

    pub async fn by_category(&self, category: &str, page: Option<&str>) -> Result<Page<BlogPost>, AppError> {
        Self::published()
            .filter(Condition::Text("category", category.to_string()))
            .fetch_page(&self.db_pool, Paginator::new(BLOG_PER_PAGE), page)
            .await
    }

    pub async fn featured(&self, limit: i64) -> Result<Vec<BlogPost>, AppError> {
        Self::published()
            .filter(Condition::Bool("is_featured", true))
            .fetch_limited(&self.db_pool, limit)
            .await
    }

    /// Loads a published post and counts the view in the same statement.
    pub async fn view(&self, slug: &str) -> Result<BlogPost, AppError> {
        let post = sqlx::query_as::<_, BlogPost>(
            "UPDATE blog_posts SET views_count = views_count + 1 \
             WHERE slug = $1 AND is_published RETURNING *",
        )
        .bind(slug)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Blog post".to_string()))?;

        tracing::debug!(slug = %slug, views = post.views_count, "Blog post viewed");
        Ok(post)
    }

    pub async fn related(&self, post: &BlogPost) -> Result<Vec<BlogPost>, AppError> {
        Self::published()
            .filter(Condition::Text("category", post.category.as_str().to_string()))
            .filter(Condition::ExcludeId(post.id))
            .fetch_limited(&self.db_pool, 3)
            .await
    }

    pub async fn category_counts(&self) -> Result<Vec<CategoryCount>, AppError> {
        sqlx::query_as::<_, CategoryCount>(
            "SELECT category, COUNT(*) AS count FROM blog_posts WHERE is_published \
             GROUP BY category ORDER BY count DESC, category",
        )
        .fetch_all(&self.db_pool)
        .await
        .map_err(AppError::Database)
    }

    /// Most frequent tags across published posts.
    pub async fn top_tags(&self, limit: i64) -> Result<Vec<TagCount>, AppError> {
        sqlx::query_as::<_, TagCount>(
            "SELECT trim(tag) AS tag, COUNT(*) AS count \
             FROM blog_posts, unnest(tags) AS tag \
             WHERE is_published AND trim(tag) <> '' \
             GROUP BY trim(tag) ORDER BY count DESC, tag LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.db_pool)
        .await
        .map_err(AppError::Database)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_query_keeps_only_present_filters() {
        let filters = BlogFilters {
            category: Some("anxiety".to_string()),
            tag: Some("  ".to_string()),
            q: Some("sleep well".to_string()),
            page: Some("2".to_string()),
        };
        assert_eq!(filters.filter_query(), "&category=anxiety&q=sleep+well");
        assert_eq!(BlogFilters::default().filter_query(), "");
    }
}
