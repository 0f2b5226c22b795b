use std::sync::Arc;

use tokio::time::{interval, Duration};

use crate::{limiter::rate_limiter::RateLimiter, llm::LlmClient};

/// Periodically forgets clients that have been idle for a full window
pub async fn start_limiter_eviction_task(limiter: Arc<dyn RateLimiter>, every: Duration) {
    let mut interval = interval(every);

    loop {
        interval.tick().await;

        let evicted = limiter.evict_idle();
        if evicted > 0 {
            tracing::debug!("Evicted {} idle rate-limit entries", evicted);
        }
    }
}

/// One-shot check that the language model is reachable; only logs
pub async fn probe_llm(llm: Arc<dyn LlmClient>) {
    let health = llm.health().await;
    if health.is_healthy() {
        tracing::info!(model = llm.model(), "Language model is available");
    } else {
        tracing::warn!(
            model = llm.model(),
            status = ?health,
            "Language model is not available; chat requests will fail until it is"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limiter::rate_limiter::SlidingWindowLimiter;

    #[tokio::test]
    async fn eviction_loop_drops_idle_clients() {
        let limiter = Arc::new(SlidingWindowLimiter::new(10, Duration::from_millis(50)));
        limiter.check("203.0.113.7").await;
        assert_eq!(limiter.tracked_clients(), 1);

        let task = tokio::spawn(start_limiter_eviction_task(
            limiter.clone() as Arc<dyn RateLimiter>,
            Duration::from_millis(20),
        ));

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(limiter.tracked_clients(), 0);
        task.abort();
    }
}
