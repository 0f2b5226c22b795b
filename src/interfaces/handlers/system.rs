use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use chrono::Utc;
use humantime::format_duration;
use parking_lot::RwLock;
use serde::Serialize;
use std::time::Duration;
use sysinfo::System;

use crate::{constants::START_TIME, AppState};

/// Seconds a computed health report is served from memory
const HEALTH_CACHE_SECS: i64 = 5;

#[derive(Serialize, Clone, Default, Debug)]
pub struct SystemInfo {
    os: String,
    kernel: String,
    hostname: String,
    cpu_count: usize,
    memory_total: String,
}

#[derive(Serialize, Clone, Default, Debug)]
pub struct HealthCheckResponse {
    pub status: String,
    pub uptime: String,
    pub timestamp: String,
    pub start_at: String,
    pub database: String,
    pub redis: String,
    pub version: String,
    pub memory_usage: String,
    pub system: SystemInfo,
}

impl HealthCheckResponse {
    fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Last health report and the unix second it was computed
#[derive(Default)]
pub struct HealthCache {
    entry: RwLock<Option<(i64, HealthCheckResponse)>>,
}

impl HealthCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn fresh(&self, now: i64) -> Option<HealthCheckResponse> {
        self.entry
            .read()
            .as_ref()
            .filter(|(at, _)| now - at < HEALTH_CACHE_SECS)
            .map(|(_, report)| report.clone())
    }

    fn store(&self, now: i64, report: HealthCheckResponse) {
        *self.entry.write() = Some((now, report));
    }
}

async fn build_health_response(state: &AppState) -> HealthCheckResponse {
    let now_utc = Utc::now();
    let uptime = now_utc.signed_duration_since(*START_TIME);
    let human_uptime = format_duration(Duration::from_secs(uptime.num_seconds().max(0) as u64));

    let mut sys = System::new_all();
    sys.refresh_all();

    let system_info = SystemInfo {
        os: System::name().unwrap_or_else(|| "Unknown".to_string()),
        kernel: System::kernel_version().unwrap_or_else(|| "Unknown".to_string()),
        hostname: System::host_name().unwrap_or_else(|| "Unknown".to_string()),
        cpu_count: sys.cpus().len(),
        memory_total: format!("{:.2} GB", sys.total_memory() as f64 / 1024.0 / 1024.0 / 1024.0),
    };

    let database = match state.health_repo.check_connection().await {
        Ok(()) => "OK",
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            "Unavailable"
        }
    };

    let memory_usage = sysinfo::get_current_pid()
        .ok()
        .and_then(|pid| sys.process(pid))
        .map_or("Unknown".to_string(), |p| {
            format!("{:.2} MB", p.memory() as f64 / 1024.0 / 1024.0)
        });

    HealthCheckResponse {
        status: if database == "OK" { "healthy" } else { "unhealthy" }.to_string(),
        uptime: human_uptime.to_string(),
        timestamp: now_utc.to_rfc3339(),
        start_at: START_TIME.to_rfc3339(),
        database: database.to_string(),
        redis: state.cache.status().await.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        memory_usage,
        system: system_info,
    }
}

/// Liveness report; 503 while the database is unreachable
pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let now = Utc::now().timestamp();

    let report = match state.health_cache.fresh(now) {
        Some(report) => report,
        None => {
            let report = build_health_response(&state).await;
            state.health_cache.store(now, report.clone());
            report
        }
    };

    let status = if report.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    HttpResponse::build(status).json(report)
}

pub async fn metrics(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(state.metrics.render())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cached_report_expires() {
        let cache = HealthCache::new();
        assert!(cache.fresh(100).is_none());

        cache.store(100, HealthCheckResponse {
            status: "healthy".into(),
            ..Default::default()
        });

        assert!(cache.fresh(104).is_some());
        assert!(cache.fresh(105).is_none());
    }
}
