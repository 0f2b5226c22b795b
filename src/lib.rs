use std::sync::Arc;

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    middleware::{Compress, NormalizePath},
    web, App,
};
use tracing_actix_web::TracingLogger;

mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;
pub mod background_task;
pub mod shared_repos;

pub use domain::{entities, use_cases};
pub use interfaces::{handlers, repositories, middlewares, routes};
pub use infrastructure::{cache, db, limiter, llm, metrics, security, utils};

use cache::ResponseCache;
use handlers::system::HealthCache;
use limiter::rate_limiter::RateLimiter;
use llm::LlmClient;
use metrics::MetricsRegistry;
use middlewares::{
    catch_panic::CatchPanic, cors::Cors, metrics::RecordMetrics, rate_limit::RateLimit,
    security_headers::SecurityHeaders, sql_guard::SqlGuard,
};
use repositories::health::HealthRepository;
use settings::AppConfig;
use shared_repos::SharedRepositories;
use use_cases::{
    analytics::AnalyticsHandler, chat::ChatHandler, content::ContentHandler,
    context::ContextBuilder, experiences::ExperienceHandler, projects::ProjectHandler,
    skills::SkillHandler,
};

pub struct AppState {
    pub config: AppConfig,
    pub project_handler: ProjectHandler,
    pub skill_handler: SkillHandler,
    pub experience_handler: ExperienceHandler,
    pub content_handler: ContentHandler,
    pub chat_handler: ChatHandler,
    pub analytics_handler: AnalyticsHandler,
    pub health_repo: Arc<dyn HealthRepository>,
    pub cache: ResponseCache,
    pub metrics: Arc<MetricsRegistry>,
    pub rate_limiter: Arc<dyn RateLimiter>,
    pub health_cache: HealthCache,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        repos: SharedRepositories,
        cache: ResponseCache,
        llm: Arc<dyn LlmClient>,
        rate_limiter: Arc<dyn RateLimiter>,
    ) -> Self {
        let context_builder = ContextBuilder::new(
            repos.skill_repo.clone(),
            repos.experience_repo.clone(),
            repos.project_repo.clone(),
            repos.content_repo.clone(),
        );

        AppState {
            project_handler: ProjectHandler::new(repos.project_repo, cache.clone()),
            skill_handler: SkillHandler::new(repos.skill_repo, cache.clone()),
            experience_handler: ExperienceHandler::new(repos.experience_repo, cache.clone()),
            content_handler: ContentHandler::new(repos.content_repo, cache.clone()),
            chat_handler: ChatHandler::new(llm, context_builder),
            analytics_handler: AnalyticsHandler::new(repos.analytics_repo),
            health_repo: repos.health_repo,
            cache,
            metrics: Arc::new(MetricsRegistry::new()),
            rate_limiter,
            health_cache: HealthCache::new(),
            config,
        }
    }
}

/// The full application: middleware stack, routes and shared state
pub fn build_app(
    state: web::Data<AppState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let config = &state.config;

    // Last `wrap` runs first: rejections from the guards still get CORS and security headers
    App::new()
        .app_data(state.clone())
        .configure(routes::configure_routes)
        .wrap(Compress::default())
        .wrap(NormalizePath::trim())
        .wrap(RateLimit::new(Arc::clone(&state.rate_limiter), config.trust_x_forwarded_for))
        .wrap(SqlGuard::new(config.sql_guard_enabled))
        .wrap(Cors::new(config.cors_origins(), config.is_development()))
        .wrap(RecordMetrics::new(Arc::clone(&state.metrics)))
        .wrap(SecurityHeaders::new(config.is_production(), config.csp_policy.as_deref()))
        .wrap(TracingLogger::default())
        .wrap(CatchPanic)
}
