use serde::Serialize;
use sqlx::PgPool;
use suzstar_common::AppError;
use suzstar_database::{BlogPost, Condition, Event, Faq, ListQuery, Resource, Service};

use super::blog::BLOG_ORDER;
use super::content::{FAQ_ORDER, SERVICE_ORDER};
use super::events::{EventView, EVENT_ORDER};
use super::resources::RESOURCE_ORDER;
use super::AppState;

pub const MIN_QUERY_LEN: usize = 3;
pub const BUCKET_LIMIT: i64 = 5;

#[derive(Debug, Default, Serialize)]
pub struct SearchResults {
    pub services: Vec<Service>,
    pub blog: Vec<BlogPost>,
    pub resources: Vec<Resource>,
    pub events: Vec<EventView>,
    pub faqs: Vec<Faq>,
}

impl SearchResults {
    pub fn total(&self) -> usize {
        self.services.len() + self.blog.len() + self.resources.len() + self.events.len() + self.faqs.len()
    }
}

/// Trimmed query, or `None` when it is too short to search for.
pub fn searchable(query: &str) -> Option<&str> {
    let trimmed = query.trim();
    (trimmed.chars().count() >= MIN_QUERY_LEN).then_some(trimmed)
}

pub struct SearchService {
    db_pool: PgPool,
}

impl SearchService {
    pub fn new(state: &AppState) -> Self {
        Self {
            db_pool: state.db_pool.clone(),
        }
    }

    /// Searches the five public collections concurrently, at most five hits each.
    pub async fn search(&self, query: &str) -> Result<SearchResults, AppError> {
        let Some(term) = searchable(query) else {
            return Ok(SearchResults::default());
        };
        let term = Some(term);

        let services = ListQuery::new("services", SERVICE_ORDER)
            .filter(Condition::Bool("is_active", true))
            .search(&["name", "short_description", "description"], term);
        let blog = ListQuery::new("blog_posts", BLOG_ORDER)
            .filter(Condition::Bool("is_published", true))
            .search(&["title", "content", "excerpt"], term);
        let resources = ListQuery::new("resources", RESOURCE_ORDER).search(&["title", "description"], term);
        let events = ListQuery::new("events", EVENT_ORDER)
            .filter(Condition::Bool("is_published", true))
            .filter(Condition::Raw("start_date >= NOW()"))
            .search(&["title", "description"], term);
        let faqs = ListQuery::new("faqs", FAQ_ORDER)
            .filter(Condition::Bool("is_active", true))
            .search(&["question", "answer"], term);

        let (services, blog, resources, events, faqs) = tokio::try_join!(
            services.fetch_limited::<Service>(&self.db_pool, BUCKET_LIMIT),
            blog.fetch_limited::<BlogPost>(&self.db_pool, BUCKET_LIMIT),
            resources.fetch_limited::<Resource>(&self.db_pool, BUCKET_LIMIT),
            events.fetch_limited::<Event>(&self.db_pool, BUCKET_LIMIT),
            faqs.fetch_limited::<Faq>(&self.db_pool, BUCKET_LIMIT),
        )?;

        let now = chrono::Utc::now();
        let results = SearchResults {
            services,
            blog,
            resources,
            events: events.into_iter().map(|e| EventView::new(e, now)).collect(),
            faqs,
        };
        tracing::debug!(query = %term.unwrap_or_default(), hits = results.total(), "Site search");
        Ok(results)
    }
}
