use std::{
    collections::VecDeque,
    sync::Arc,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use dashmap::DashMap;
use deadpool_redis::Pool;
use parking_lot::Mutex;

/// Outcome of a single rate-limit check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Seconds until another request would be admitted; only set when rejected
    pub retry_after: Option<u64>,
}

#[async_trait]
pub trait RateLimiter: Send + Sync {
    async fn check(&self, key: &str) -> RateDecision;

    /// Drops idle per-client state; a no-op for backends that expire keys themselves
    fn evict_idle(&self) -> usize {
        0
    }
}

// ───── In-Memory Sliding Window ─────────────────────────────────────

/// Timestamps of the requests a client made inside the current window
#[derive(Debug)]
struct RequestLog {
    hits: VecDeque<Instant>,
    last_seen: Instant,
}

impl RequestLog {
    fn new(now: Instant) -> Self {
        Self {
            hits: VecDeque::new(),
            last_seen: now,
        }
    }

    fn prune(&mut self, now: Instant, window: Duration) {
        while let Some(oldest) = self.hits.front() {
            if now.duration_since(*oldest) >= window {
                self.hits.pop_front();
            } else {
                break;
            }
        }
    }
}

/// Per-key sliding log: a request is admitted when fewer than `limit`
/// requests were admitted during the trailing `window`.
#[derive(Clone)]
pub struct SlidingWindowLimiter {
    map: Arc<DashMap<String, Arc<Mutex<RequestLog>>>>,
    limit: u32,
    window: Duration,
}

impl SlidingWindowLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            map: Arc::new(DashMap::new()),
            limit,
            window,
        }
    }

    pub fn tracked_clients(&self) -> usize {
        self.map.len()
    }

    fn get_log(&self, key: &str, now: Instant) -> Arc<Mutex<RequestLog>> {
        if let Some(existing) = self.map.get(key) {
            return existing.clone();
        }
        self.map
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(RequestLog::new(now))))
            .clone()
    }

    pub fn check_at(&self, key: &str, now: Instant) -> RateDecision {
        let log = self.get_log(key, now);
        let mut log = log.lock();

        log.last_seen = now;
        log.prune(now, self.window);

        let used = log.hits.len() as u32;
        if used < self.limit {
            log.hits.push_back(now);
            return RateDecision {
                allowed: true,
                limit: self.limit,
                remaining: self.limit - used - 1,
                retry_after: None,
            };
        }

        let retry_after = log
            .hits
            .front()
            .map(|oldest| self.window.saturating_sub(now.duration_since(*oldest)))
            .map(|wait| wait.as_secs_f64().ceil() as u64)
            .unwrap_or(self.window.as_secs())
            .max(1);

        RateDecision {
            allowed: false,
            limit: self.limit,
            remaining: 0,
            retry_after: Some(retry_after),
        }
    }

    pub fn evict_idle_at(&self, now: Instant) -> usize {
        let before = self.map.len();
        let window = self.window;
        self.map.retain(|_, log| now.duration_since(log.lock().last_seen) < window);
        before - self.map.len()
    }
}

#[async_trait]
impl RateLimiter for SlidingWindowLimiter {
    async fn check(&self, key: &str) -> RateDecision {
        self.check_at(key, Instant::now())
    }

    fn evict_idle(&self) -> usize {
        self.evict_idle_at(Instant::now())
    }
}

// ───── Redis Fixed Window ───────────────────────────────────────────

/// Shared counter per client and window (`INCR` + `EXPIRE`), so every replica
/// enforces the same budget. Fails open when Redis is unreachable.
#[derive(Clone)]
pub struct RedisRateLimiter {
    pool: Pool,
    limit: u32,
    window: Duration,
}

impl RedisRateLimiter {
    pub fn new(pool: Pool, limit: u32, window: Duration) -> Self {
        Self { pool, limit, window }
    }

    /// Count for the current fixed bucket and the seconds left until it rolls over
    async fn increment(&self, key: &str) -> Result<(u32, u64), redis::RedisError> {
        let window_secs = self.window.as_secs().max(1);
        let now = chrono::Utc::now().timestamp().max(0) as u64;
        let bucket = now / window_secs;
        let redis_key = format!("ratelimit:{}:{}", key, bucket);

        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| redis::RedisError::from((redis::ErrorKind::IoError, "pool", e.to_string())))?;

        // Keys are per bucket, so the expiry only has to outlive the bucket.
        let (count,): (u32,) = redis::pipe()
            .atomic()
            .incr(&redis_key, 1)
            .expire(&redis_key, window_secs as i64)
            .ignore()
            .query_async(&mut conn)
            .await?;

        Ok((count, seconds_until_bucket_end(now, window_secs)))
    }
}

fn seconds_until_bucket_end(now_secs: u64, window_secs: u64) -> u64 {
    (window_secs - now_secs % window_secs).max(1)
}

#[async_trait]
impl RateLimiter for RedisRateLimiter {
    async fn check(&self, key: &str) -> RateDecision {
        match self.increment(key).await {
            Ok((count, _)) if count <= self.limit => RateDecision {
                allowed: true,
                limit: self.limit,
                remaining: self.limit - count,
                retry_after: None,
            },
            Ok((_, bucket_left)) => RateDecision {
                allowed: false,
                limit: self.limit,
                remaining: 0,
                retry_after: Some(bucket_left),
            },
            Err(e) => {
                tracing::warn!(error = %e, "Redis rate limiter unavailable, allowing request");
                RateDecision {
                    allowed: true,
                    limit: self.limit,
                    remaining: self.limit,
                    retry_after: None,
                }
            }
        }
    }
}
