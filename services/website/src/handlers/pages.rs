//! Public GET pages.

use axum::{
    extract::{Path, Query, State},
    response::Html,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use suzstar_common::{AppError, BlogCategory, Choice, EventType, ResourceType};

use super::render;
use crate::error::PageError;
use crate::notice::Flash;
use crate::services::blog::BlogFilters;
use crate::services::content::{APPROACHES, VALUES};
use crate::services::resources::ResourceFilters;
use crate::services::search::searchable;
use crate::services::{
    AppState, BlogService, ContentService, EventService, ResourceService, SearchService,
    TestimonialService,
};

type PageResult = Result<Html<String>, PageError>;

#[derive(Debug, Default, Deserialize)]
pub struct PageParam {
    pub page: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EventFilter {
    #[serde(rename = "type")]
    pub event_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

pub async fn home(State(state): State<AppState>, flash: Flash) -> PageResult {
    let content = ContentService::new(&state).home().await?;
    render(&state, flash, "home", "Home", content).await
}

pub async fn about(State(state): State<AppState>, flash: Flash) -> PageResult {
    let content = ContentService::new(&state);
    let (counselors, testimonials) = tokio::try_join!(content.counselors(), content.recent_testimonials(6))?;
    render(
        &state,
        flash,
        "about",
        "About Us",
        json!({
            "counselors": counselors,
            "testimonials": testimonials,
            "values": VALUES,
        }),
    )
    .await
}

pub async fn services(State(state): State<AppState>, flash: Flash) -> PageResult {
    let groups = ContentService::new(&state).service_groups().await?;
    let mut context = serde_json::to_value(groups).map_err(|e| AppError::Internal(e.to_string()))?;
    context["approaches"] = json!(APPROACHES);
    render(&state, flash, "services", "Our Services", context).await
}

pub async fn service_detail(State(state): State<AppState>, flash: Flash, Path(id): Path<i64>) -> PageResult {
    let (service, related_services) = ContentService::new(&state).service_detail(id).await?;
    let title = service.name.clone();
    render(
        &state,
        flash,
        "service_detail",
        &title,
        json!({ "service": service, "related_services": related_services }),
    )
    .await
}

pub async fn blog_list(
    State(state): State<AppState>,
    flash: Flash,
    Query(filters): Query<BlogFilters>,
) -> PageResult {
    let blog = BlogService::new(&state);
    let (page, categories, tag_frequency) =
        tokio::try_join!(blog.list(&filters), blog.category_counts(), blog.top_tags(10))?;

    render(
        &state,
        flash,
        "blog_list",
        "Blog",
        json!({
            "page": page,
            "categories": categories,
            "tag_frequency": tag_frequency,
            "current_category": filters.category,
            "current_tag": filters.tag,
            "search_query": filters.q.as_deref().unwrap_or_default(),
            "filter_query": filters.filter_query(),
        }),
    )
    .await
}

pub async fn blog_detail(State(state): State<AppState>, flash: Flash, Path(slug): Path<String>) -> PageResult {
    let blog = BlogService::new(&state);
    let post = blog.view(&slug).await?;
    let related_posts = blog.related(&post).await?;
    let title = post.title.clone();
    render(
        &state,
        flash,
        "blog_detail",
        &title,
        json!({ "blog_post": post, "related_posts": related_posts }),
    )
    .await
}

pub async fn blog_category(
    State(state): State<AppState>,
    flash: Flash,
    Path(category): Path<String>,
    Query(params): Query<PageParam>,
) -> PageResult {
    // An unrecognised category shows an empty listing under its raw name.
    let category_label = category
        .parse::<BlogCategory>()
        .map(|c| c.label().to_string())
        .unwrap_or_else(|_| category.clone());
    let page = BlogService::new(&state)
        .by_category(&category, params.page.as_deref())
        .await?;
    render(
        &state,
        flash,
        "blog_category",
        &category_label,
        json!({ "category": category, "category_label": category_label, "page": page }),
    )
    .await
}

pub async fn resources(
    State(state): State<AppState>,
    flash: Flash,
    Query(filters): Query<ResourceFilters>,
) -> PageResult {
    let service = ResourceService::new(&state);
    let (page, categories) = tokio::try_join!(service.list(&filters), service.categories())?;
    render(
        &state,
        flash,
        "resources",
        "Resources",
        json!({
            "page": page,
            "resource_types": ResourceType::options(),
            "categories": categories,
            "current_type": filters.resource_type.as_deref().unwrap_or_default(),
            "current_category": filters.category.as_deref().unwrap_or_default(),
            "search_query": filters.q.as_deref().unwrap_or_default(),
            "filter_query": filters.filter_query(),
        }),
    )
    .await
}

pub async fn resource_detail(State(state): State<AppState>, flash: Flash, Path(id): Path<i64>) -> PageResult {
    let resource = ResourceService::new(&state).get(id).await?;
    let title = resource.title.clone();
    render(&state, flash, "resource_detail", &title, json!({ "resource": resource })).await
}

pub async fn events(
    State(state): State<AppState>,
    flash: Flash,
    Query(filter): Query<EventFilter>,
) -> PageResult {
    let events = EventService::new(&state);
    let event_type = suzstar_database::non_empty(filter.event_type.as_deref());
    let (upcoming_events, past_events) = tokio::try_join!(events.upcoming(event_type, None), events.past())?;
    render(
        &state,
        flash,
        "events",
        "Events",
        json!({
            "event_types": EventType::options(),
            "current_type": event_type.unwrap_or_default(),
            "upcoming_events": upcoming_events,
            "past_events": past_events,
        }),
    )
    .await
}

pub async fn event_detail(State(state): State<AppState>, flash: Flash, Path(id): Path<i64>) -> PageResult {
    let event = EventService::new(&state).published_event(id).await?;
    let title = event.title.clone();
    let event = crate::services::events::EventView::new(event, Utc::now());
    render(&state, flash, "event_detail", &title, json!({ "event": event })).await
}

pub async fn faq(State(state): State<AppState>, flash: Flash) -> PageResult {
    let faq_groups = ContentService::new(&state).faq_groups().await?;
    render(
        &state,
        flash,
        "faq",
        "Frequently Asked Questions",
        json!({ "faq_groups": faq_groups }),
    )
    .await
}

pub async fn counselors(State(state): State<AppState>, flash: Flash) -> PageResult {
    let counselors = ContentService::new(&state).counselors().await?;
    render(&state, flash, "counselors", "Our Counselors", json!({ "counselors": counselors })).await
}

pub async fn counselor_detail(State(state): State<AppState>, flash: Flash, Path(id): Path<i64>) -> PageResult {
    let counselor = ContentService::new(&state).counselor(id).await?;
    let title = counselor.name.clone();
    render(&state, flash, "counselor_detail", &title, json!({ "counselor": counselor })).await
}

pub async fn testimonials(
    State(state): State<AppState>,
    flash: Flash,
    Query(params): Query<PageParam>,
) -> PageResult {
    let page = TestimonialService::new(&state)
        .approved_page(params.page.as_deref())
        .await?;
    render(&state, flash, "testimonials", "Testimonials", json!({ "page": page })).await
}

pub async fn search(
    State(state): State<AppState>,
    flash: Flash,
    Query(params): Query<SearchParams>,
) -> PageResult {
    let query = params.q.trim();
    let context = match searchable(query) {
        Some(term) => {
            let results = SearchService::new(&state).search(term).await?;
            json!({
                "query": query,
                "too_short": false,
                "total": results.total(),
                "results": results,
            })
        }
        None => json!({
            "query": query,
            "too_short": !query.is_empty(),
            "total": 0,
            "results": {
                "services": [], "blog": [], "resources": [], "events": [], "faqs": []
            },
        }),
    };
    render(&state, flash, "search", "Search", context).await
}

