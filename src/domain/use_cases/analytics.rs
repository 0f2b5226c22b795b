use std::{net::IpAddr, sync::Arc};

use validator::Validate;

use crate::{
    entities::analytics::{Visit, VisitPayload},
    errors::AppError,
    repositories::analytics::AnalyticsRepository,
    security::sanitize::{sanitize_optional, sanitize_text},
};

pub struct AnalyticsHandler {
    pub analytics_repo: Arc<dyn AnalyticsRepository>,
}

impl AnalyticsHandler {
    pub fn new(analytics_repo: Arc<dyn AnalyticsRepository>) -> Self {
        AnalyticsHandler { analytics_repo }
    }

    /// Records a page visit; the resolved client address is used when the body omits one
    pub async fn track_visit(&self, payload: VisitPayload, client_ip: &str) -> Result<Visit, AppError> {
        payload.validate()?;

        let raw_ip = payload
            .ip
            .as_deref()
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
            .unwrap_or(client_ip);

        let ip = raw_ip
            .parse::<IpAddr>()
            .map_err(|_| AppError::InvalidInput("Invalid IP address".into()))?
            .to_string();

        let visit = Visit {
            ip,
            user_agent: sanitize_optional(payload.user_agent),
            referrer: payload.referrer.map(|r| sanitize_text(r.trim())).filter(|r| !r.is_empty()),
            project_id: payload.project_id,
        };

        self.analytics_repo.record_visit(&visit).await?;
        if let Some(project_id) = visit.project_id {
            self.analytics_repo.record_project_view(project_id, &visit.ip).await?;
        }

        tracing::debug!(ip = %visit.ip, project_id = ?visit.project_id, "visit tracked");
        Ok(visit)
    }
}
