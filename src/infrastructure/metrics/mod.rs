use std::{
    fmt::Write,
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use dashmap::DashMap;

/// Upper bounds (seconds) of the request-duration histogram
const DURATION_BUCKETS: &[f64] = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct RequestLabels {
    path: String,
    method: String,
    status: u16,
}

#[derive(Debug)]
struct DurationHistogram {
    buckets: Vec<AtomicU64>,
    count: AtomicU64,
    sum_micros: AtomicU64,
}

impl DurationHistogram {
    fn new() -> Self {
        Self {
            buckets: DURATION_BUCKETS.iter().map(|_| AtomicU64::new(0)).collect(),
            count: AtomicU64::new(0),
            sum_micros: AtomicU64::new(0),
        }
    }

    fn observe(&self, elapsed: Duration) {
        let secs = elapsed.as_secs_f64();
        for (bound, bucket) in DURATION_BUCKETS.iter().zip(&self.buckets) {
            if secs <= *bound {
                bucket.fetch_add(1, Ordering::Relaxed);
            }
        }
        self.count.fetch_add(1, Ordering::Relaxed);
        self.sum_micros.fetch_add(elapsed.as_micros() as u64, Ordering::Relaxed);
    }
}

/// In-process Prometheus registry for HTTP traffic
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    requests: DashMap<RequestLabels, AtomicU64>,
    durations: DashMap<RequestLabels, DurationHistogram>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self, path: &str, method: &str, status: u16, elapsed: Duration) {
        let labels = RequestLabels {
            path: path.to_string(),
            method: method.to_string(),
            status,
        };

        self.requests
            .entry(labels.clone())
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(1, Ordering::Relaxed);

        self.durations
            .entry(labels)
            .or_insert_with(DurationHistogram::new)
            .observe(elapsed);
    }

    pub fn request_count(&self, path: &str, method: &str, status: u16) -> u64 {
        let labels = RequestLabels {
            path: path.to_string(),
            method: method.to_string(),
            status,
        };
        self.requests
            .get(&labels)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Prometheus text exposition format, version 0.0.4
    pub fn render(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "# HELP http_requests_total Total number of HTTP requests");
        let _ = writeln!(out, "# TYPE http_requests_total counter");
        let mut counters: Vec<(RequestLabels, u64)> = self
            .requests
            .iter()
            .map(|e| (e.key().clone(), e.value().load(Ordering::Relaxed)))
            .collect();
        counters.sort();
        for (labels, value) in &counters {
            let _ = writeln!(out, "http_requests_total{{{}}} {}", format_labels(labels), value);
        }

        let _ = writeln!(out, "# HELP http_request_duration_seconds HTTP request latency in seconds");
        let _ = writeln!(out, "# TYPE http_request_duration_seconds histogram");
        let mut histograms: Vec<RequestLabels> = self.durations.iter().map(|e| e.key().clone()).collect();
        histograms.sort();
        for labels in &histograms {
            let Some(hist) = self.durations.get(labels) else {
                continue;
            };
            let base = format_labels(labels);
            for (bound, bucket) in DURATION_BUCKETS.iter().zip(&hist.buckets) {
                let _ = writeln!(
                    out,
                    "http_request_duration_seconds_bucket{{{},le=\"{}\"}} {}",
                    base,
                    bound,
                    bucket.load(Ordering::Relaxed)
                );
            }
            let count = hist.count.load(Ordering::Relaxed);
            let _ = writeln!(out, "http_request_duration_seconds_bucket{{{},le=\"+Inf\"}} {}", base, count);
            let _ = writeln!(
                out,
                "http_request_duration_seconds_sum{{{}}} {}",
                base,
                hist.sum_micros.load(Ordering::Relaxed) as f64 / 1_000_000.0
            );
            let _ = writeln!(out, "http_request_duration_seconds_count{{{}}} {}", base, count);
        }

        out
    }
}

fn format_labels(labels: &RequestLabels) -> String {
    format!(
        "path=\"{}\",method=\"{}\",status=\"{}\"",
        escape_label(&labels.path),
        escape_label(&labels.method),
        labels.status
    )
}

fn escape_label(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_requests_per_label_set() {
        let registry = MetricsRegistry::new();
        registry.record_request("/api/v1/projects", "GET", 200, Duration::from_millis(3));
        registry.record_request("/api/v1/projects", "GET", 200, Duration::from_millis(30));
        registry.record_request("/api/v1/projects", "GET", 304, Duration::from_millis(1));

        assert_eq!(registry.request_count("/api/v1/projects", "GET", 200), 2);
        assert_eq!(registry.request_count("/api/v1/projects", "GET", 304), 1);
        assert_eq!(registry.request_count("/api/v1/skills", "GET", 200), 0);
    }

    #[test]
    fn renders_prometheus_text() {
        let registry = MetricsRegistry::new();
        registry.record_request("/api/v1/chat", "POST", 200, Duration::from_millis(20));

        let text = registry.render();
        assert!(text.contains("# TYPE http_requests_total counter"));
        assert!(text.contains(r#"http_requests_total{path="/api/v1/chat",method="POST",status="200"} 1"#));
        assert!(text.contains(r#"http_request_duration_seconds_bucket{path="/api/v1/chat",method="POST",status="200",le="0.01"} 0"#));
        assert!(text.contains(r#"http_request_duration_seconds_bucket{path="/api/v1/chat",method="POST",status="200",le="0.025"} 1"#));
        assert!(text.contains(r#"http_request_duration_seconds_count{path="/api/v1/chat",method="POST",status="200"} 1"#));
    }

    #[test]
    fn escapes_label_values() {
        assert_eq!(escape_label("a\"b"), "a\\\"b");
    }
}
