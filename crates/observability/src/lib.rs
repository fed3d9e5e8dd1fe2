use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

static TRACING_INIT: OnceCell<()> = OnceCell::new();

#[derive(Debug, Default)]
pub struct AppMetrics {
    classify_requests_total: AtomicU64,
    batch_requests_total: AtomicU64,
    texts_classified_total: AtomicU64,
    blank_texts_skipped_total: AtomicU64,
    constraint_overrides_total: AtomicU64,
    failures_total: AtomicU64,
    total_latency_millis: AtomicU64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub classify_requests_total: u64,
    pub batch_requests_total: u64,
    pub texts_classified_total: u64,
    pub blank_texts_skipped_total: u64,
    pub constraint_overrides_total: u64,
    pub failures_total: u64,
    pub avg_latency_millis: f64,
}

impl AppMetrics {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn inc_classify_request(&self) {
        self.classify_requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_batch_request(&self) {
        self.batch_requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_text_classified(&self) {
        self.texts_classified_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_blank_skipped(&self) {
        self.blank_texts_skipped_total
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_constraint_override(&self) {
        self.constraint_overrides_total
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_failure(&self) {
        self.failures_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn observe_latency(&self, duration: Duration) {
        self.total_latency_millis
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let classify = self.classify_requests_total.load(Ordering::Relaxed);
        let batch = self.batch_requests_total.load(Ordering::Relaxed);
        let requests = classify + batch;
        let latency = self.total_latency_millis.load(Ordering::Relaxed);

        MetricsSnapshot {
            classify_requests_total: classify,
            batch_requests_total: batch,
            texts_classified_total: self.texts_classified_total.load(Ordering::Relaxed),
            blank_texts_skipped_total: self.blank_texts_skipped_total.load(Ordering::Relaxed),
            constraint_overrides_total: self.constraint_overrides_total.load(Ordering::Relaxed),
            failures_total: self.failures_total.load(Ordering::Relaxed),
            avg_latency_millis: if requests == 0 {
                0.0
            } else {
                latency as f64 / requests as f64
            },
        }
    }
}

fn default_filter(service_name: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{}=info,speechact_api=info,speechact_classifier=info,speechact_nlp=info",
            service_name
        ))
    })
}

/// JSON logs on stdout, for the HTTP service.
pub fn init_tracing(service_name: &str) {
    TRACING_INIT.get_or_init(|| {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(default_filter(service_name))
            .with_current_span(true)
            .with_span_list(true)
            .init();
    });
}

/// JSON logs on stderr so stdout stays free for command output.
pub fn init_cli_tracing(service_name: &str) {
    TRACING_INIT.get_or_init(|| {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(default_filter(service_name))
            .with_writer(std::io::stderr)
            .init();
    });
}
