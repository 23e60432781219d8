use serde::Serialize;
use sqlx::PgPool;
use suzstar_common::{AppError, FaqCategory, ServiceType};
use suzstar_database::{
    BlogPost, Condition, Counselor, Faq, ListQuery, PublicTestimonial, Service, Testimonial,
};

use super::blog::BlogService;
use super::events::{EventService, EventView};
use super::AppState;

pub const SERVICE_ORDER: &str = "display_order, name";
pub const COUNSELOR_ORDER: &str = "display_order, name";
pub const FAQ_ORDER: &str = "category, display_order";
pub const TESTIMONIAL_ORDER: &str = "created_at DESC";

#[derive(Debug, Clone, Serialize)]
pub struct Highlight {
    pub name: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
}

pub const VALUES: &[Highlight] = &[
    Highlight { name: "Empathy", icon: "heart", description: "We approach every individual with compassion and understanding." },
    Highlight { name: "Confidentiality", icon: "lock", description: "Your privacy and trust are our top priorities." },
    Highlight { name: "Respect", icon: "handshake", description: "We honor your unique experiences and perspective." },
    Highlight { name: "Inclusivity", icon: "users", description: "All are welcome in a safe, judgment-free space." },
    Highlight { name: "Evidence-based practice", icon: "flask", description: "Our methods are backed by clinical research." },
    Highlight { name: "Community empowerment", icon: "globe-africa", description: "Building mentally healthy communities together." },
];

pub const APPROACHES: &[Highlight] = &[
    Highlight { name: "Cognitive-Behavioral Therapy (CBT)", icon: "brain", description: "Identify and change negative thought patterns." },
    Highlight { name: "Mindfulness & Relaxation", icon: "spa", description: "Techniques to reduce stress and increase present-moment awareness." },
    Highlight { name: "Strength-based counseling", icon: "dumbbell", description: "Focus on your inherent strengths and resilience." },
    Highlight { name: "Solution-focused strategies", icon: "bullseye", description: "Practical approaches to achieve your goals." },
    Highlight { name: "Narrative therapy", icon: "book-open", description: "Re-author your life story in empowering ways." },
    Highlight { name: "Emotional regulation coaching", icon: "balance-scale", description: "Tools to understand and manage emotions effectively." },
];

#[derive(Debug, Serialize)]
pub struct HomeContent {
    pub featured_services: Vec<Service>,
    pub featured_blog: Vec<BlogPost>,
    pub testimonials: Vec<PublicTestimonial>,
    pub upcoming_events: Vec<EventView>,
    pub counselors: Vec<Counselor>,
    pub faqs: Vec<Faq>,
}

#[derive(Debug, Serialize)]
pub struct ServiceGroups {
    pub individual_services: Vec<Service>,
    pub group_services: Vec<Service>,
    pub workshop_services: Vec<Service>,
    pub outreach_services: Vec<Service>,
}

impl ServiceGroups {
    fn from_services(services: Vec<Service>) -> Self {
        let mut groups = ServiceGroups {
            individual_services: Vec::new(),
            group_services: Vec::new(),
            workshop_services: Vec::new(),
            outreach_services: Vec::new(),
        };
        for service in services {
            match service.service_type {
                ServiceType::Individual => groups.individual_services.push(service),
                ServiceType::Group => groups.group_services.push(service),
                ServiceType::Workshop => groups.workshop_services.push(service),
                ServiceType::Outreach => groups.outreach_services.push(service),
            }
        }
        groups
    }
}

#[derive(Debug, Serialize)]
pub struct FaqGroup {
    pub category: FaqCategory,
    pub label: &'static str,
    pub faqs: Vec<Faq>,
}

/// Groups FAQs already ordered by category, keeping that order.
pub fn group_faqs(faqs: Vec<Faq>) -> Vec<FaqGroup> {
    let mut groups: Vec<FaqGroup> = Vec::new();
    for faq in faqs {
        match groups.last_mut() {
            Some(group) if group.category == faq.category => group.faqs.push(faq),
            _ => groups.push(FaqGroup {
                category: faq.category,
                label: faq.category.label(),
                faqs: vec![faq],
            }),
        }
    }
    groups
}

pub struct ContentService {
    db_pool: PgPool,
    blog: BlogService,
    events: EventService,
}

impl ContentService {
    pub fn new(state: &AppState) -> Self {
        Self {
            db_pool: state.db_pool.clone(),
            blog: BlogService::new(state),
            events: EventService::new(state),
        }
    }

    fn active_services() -> ListQuery {
        ListQuery::new("services", SERVICE_ORDER).filter(Condition::Bool("is_active", true))
    }

    fn active_counselors() -> ListQuery {
        ListQuery::new("counselors", COUNSELOR_ORDER).filter(Condition::Bool("is_active", true))
    }

    fn approved_testimonials() -> ListQuery {
        ListQuery::new("testimonials", TESTIMONIAL_ORDER).filter(Condition::Bool("is_approved", true))
    }

    pub async fn home(&self) -> Result<HomeContent, AppError> {
        let services = Self::active_services();
        let testimonials = Self::approved_testimonials().filter(Condition::Bool("is_featured", true));
        let counselors = Self::active_counselors();
        let faqs = ListQuery::new("faqs", FAQ_ORDER).filter(Condition::Bool("is_active", true));

        let (featured_services, featured_blog, testimonials, upcoming_events, counselors, faqs) = tokio::try_join!(
            services.fetch_limited::<Service>(&self.db_pool, 3),
            self.blog.featured(3),
            testimonials.fetch_limited::<Testimonial>(&self.db_pool, 5),
            self.events.upcoming(None, Some(3)),
            counselors.fetch_limited::<Counselor>(&self.db_pool, 4),
            faqs.fetch_limited::<Faq>(&self.db_pool, 4),
        )?;

        Ok(HomeContent {
            featured_services,
            featured_blog,
            testimonials: testimonials.into_iter().map(PublicTestimonial::from).collect(),
            upcoming_events,
            counselors,
            faqs,
        })
    }

    pub async fn counselors(&self) -> Result<Vec<Counselor>, AppError> {
        Self::active_counselors().fetch_all(&self.db_pool).await
    }

    pub async fn counselor(&self, id: i64) -> Result<Counselor, AppError> {
        sqlx::query_as::<_, Counselor>("SELECT * FROM counselors WHERE id = $1 AND is_active")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Counselor".to_string()))
    }

    pub async fn recent_testimonials(&self, limit: i64) -> Result<Vec<PublicTestimonial>, AppError> {
        let rows: Vec<Testimonial> = Self::approved_testimonials()
            .fetch_limited(&self.db_pool, limit)
            .await?;
        Ok(rows.into_iter().map(PublicTestimonial::from).collect())
    }

    pub async fn service_groups(&self) -> Result<ServiceGroups, AppError> {
        let services = Self::active_services().fetch_all(&self.db_pool).await?;
        Ok(ServiceGroups::from_services(services))
    }

    pub async fn active_service_list(&self) -> Result<Vec<Service>, AppError> {
        Self::active_services().fetch_all(&self.db_pool).await
    }

    /// An active service with up to three active services of the same type.
    pub async fn service_detail(&self, id: i64) -> Result<(Service, Vec<Service>), AppError> {
        let service = sqlx::query_as::<_, Service>("SELECT * FROM services WHERE id = $1 AND is_active")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Service".to_string()))?;

        let related = Self::active_services()
            .filter(Condition::Text("service_type", service.service_type.as_str().to_string()))
            .filter(Condition::ExcludeId(service.id))
            .fetch_limited(&self.db_pool, 3)
            .await?;

        Ok((service, related))
    }

    pub async fn faq_groups(&self) -> Result<Vec<FaqGroup>, AppError> {
        let faqs = ListQuery::new("faqs", FAQ_ORDER)
            .filter(Condition::Bool("is_active", true))
            .fetch_all(&self.db_pool)
            .await?;
        Ok(group_faqs(faqs))
    }
}
