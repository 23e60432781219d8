use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

use suzstar_auth::staff_auth_middleware;

use crate::handlers::{self, admin, dashboard, downloads, forms, pages};
use crate::services::AppState;

pub fn create_routes(state: &AppState) -> Router<AppState> {
    let staff = Router::new()
        .route("/dashboard", get(dashboard::dashboard))
        .nest("/admin", admin::routes())
        .route_layer(from_fn_with_state(state.clone(), admin::require_active_staff))
        .route_layer(from_fn_with_state(state.jwt_service.clone(), staff_auth_middleware));

    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))

        // Pages
        .route("/", get(pages::home))
        .route("/about", get(pages::about))
        .route("/services", get(pages::services))
        .route("/services/:id", get(pages::service_detail))
        .route("/blog", get(pages::blog_list))
        .route("/blog/:slug", get(pages::blog_detail))
        .route("/blog/category/:category", get(pages::blog_category))
        .route("/resources", get(pages::resources))
        .route("/resources/:id", get(pages::resource_detail))
        .route("/resources/download/:id", get(downloads::download_resource))
        .route("/events", get(pages::events))
        .route("/events/:id", get(pages::event_detail))
        .route("/faq", get(pages::faq))
        .route("/counselors", get(pages::counselors))
        .route("/counselors/:id", get(pages::counselor_detail))
        .route("/testimonials", get(pages::testimonials))
        .route("/search", get(pages::search))

        // Forms
        .route("/contact", get(forms::contact).post(forms::contact_submit))
        .route(
            "/book-appointment",
            get(forms::book_appointment).post(forms::book_appointment_submit),
        )
        .route("/appointment-success/:id", get(forms::appointment_success))
        .route(
            "/events/:id/register",
            get(forms::event_register).post(forms::event_register_submit),
        )
        .route("/newsletter/subscribe", post(forms::newsletter_subscribe))
        .route("/newsletter/unsubscribe/:email", get(forms::newsletter_unsubscribe))
        .route(
            "/testimonials/share",
            get(forms::testimonial_share).post(forms::testimonial_share_submit),
        )

        // Staff
        .route("/admin/login", post(admin::login))
        .route("/admin/logout", post(admin::logout))
        .merge(staff)

        // Files
        .nest_service("/static", ServeDir::new(&state.config.storage.static_root))
        .nest_service("/media", ServeDir::new(state.file_store.root()))
}
