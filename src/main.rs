use std::{sync::Arc, time::Duration};

use actix_web::{web, HttpServer};
use anyhow::Context;
use portfolio_api::{
    background_task::{probe_llm, start_limiter_eviction_task},
    build_app,
    cache::{redis_cache::RedisCache, CacheStore, ResponseCache},
    db::postgres::{create_pool, run_migrations, PoolSettings},
    graceful_shutdown::shutdown_signal,
    limiter::rate_limiter::{RateLimiter, RedisRateLimiter, SlidingWindowLimiter},
    llm::{ollama::OllamaClient, LlmClient},
    settings::{AppConfig, RateLimitBackend},
    shared_repos::SharedRepositories,
    utils::redact::redact_url,
    AppState,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::new().context("Configuration error")?;
    init_tracing(config.is_production());
    tracing::info!("Loaded configuration: {:?}", config);

    if config.admin_token.is_none() && !config.is_development() {
        tracing::warn!("ADMIN_TOKEN is not set; write and admin routes are unauthenticated");
    }

    tracing::info!(database = %config.database_target(), "Connecting to database");
    let pool = create_pool(
        config.connect_options()?,
        PoolSettings {
            max_connections: config.database_max_connections,
            min_connections: config.database_min_connections,
        },
    )
    .await
    .context("Failed to create database connection pool")?;
    run_migrations(&pool).await.context("Failed to run database migrations")?;

    let redis = match config.redis_url.as_deref() {
        Some(url) => match RedisCache::connect(url).await {
            Ok(cache) => {
                tracing::info!(url = %redact_url(url), "Redis cache connected");
                Some(cache)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Redis unavailable; continuing without cache");
                None
            }
        },
        None => {
            tracing::info!("REDIS_URL not set; caching disabled");
            None
        }
    };

    let window = Duration::from_secs(config.rate_limit_window_secs);
    let rate_limiter: Arc<dyn RateLimiter> = match (&config.rate_limit_backend, &redis) {
        (RateLimitBackend::Redis, Some(cache)) => Arc::new(RedisRateLimiter::new(
            cache.pool().clone(),
            config.rate_limit_requests,
            window,
        )),
        (RateLimitBackend::Redis, None) => {
            tracing::warn!("Redis rate limiting requested without Redis; using in-memory limiter");
            Arc::new(SlidingWindowLimiter::new(config.rate_limit_requests, window))
        }
        (RateLimitBackend::Memory, _) => Arc::new(SlidingWindowLimiter::new(config.rate_limit_requests, window)),
    };

    let cache = ResponseCache::new(redis.map(|c| Arc::new(c) as Arc<dyn CacheStore>));

    let llm: Arc<dyn LlmClient> = Arc::new(
        OllamaClient::new(
            &config.ollama_url,
            &config.llm_model,
            Duration::from_secs(config.llm_timeout_secs),
        )
        .context("Failed to build LLM client")?,
    );

    let server_addr = format!("{}:{}", config.host, config.port);
    let workers = config.worker_count;

    let app_state = web::Data::new(AppState::new(
        config,
        SharedRepositories::postgres(pool),
        cache,
        llm.clone(),
        rate_limiter.clone(),
    ));

    tracing::info!(
        "🚀 Starting Portfolio API v{} on {}",
        env!("CARGO_PKG_VERSION"),
        server_addr
    );

    let server = HttpServer::new(move || build_app(app_state.clone()))
        .workers(workers)
        .bind(&server_addr)
        .with_context(|| format!("Failed to bind {}", server_addr))?
        .run();

    tokio::spawn(start_limiter_eviction_task(rate_limiter, window));
    tokio::spawn(probe_llm(llm));

    tokio::select! {
        res = server => res.context("Server error")?,
        _ = shutdown_signal() => {},
    }

    Ok(())
}
