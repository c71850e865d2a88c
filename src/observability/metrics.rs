use std::sync::Arc;

use anyhow::Result;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};
use tokio::sync::OnceCell;
use tracing::info;

// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the static `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE
        .get_or_init(|| async {
            info!("Initializing Metrics ...");
            Metrics::new()
        })
        .await
}

/// Same instance as [`get_metrics`], for callers outside an async context.
///
/// `None` only while an async initialization is in progress.
pub fn get_metrics_sync() -> Option<&'static Arc<Metrics>> {
    if METRICS_INSTANCE.get().is_none() {
        let _ = METRICS_INSTANCE.set(Metrics::new());
    }
    METRICS_INSTANCE.get()
}

/// Renders every registered metric in the prometheus text format.
pub async fn encode_text() -> Result<String> {
    let metrics = get_metrics().await;
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&metrics.registry.gather(), &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Session token metrics
    pub token_refresh_requests: IntCounter,
    pub token_refresh_failures: IntCounterVec,
    pub token_refresh_duration: Histogram,
    pub token_expiry_unix: IntGauge,

    // Request metrics
    pub intercepted_requests: IntCounter,
    pub api_requests: IntCounterVec,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("tripletex".into()), None).expect("valid registry prefix");

        let metrics: Arc<Metrics> = Arc::new(Self {
            token_refresh_requests: IntCounter::new("token_refresh_requests_total", "Session token create calls").expect("metric"),
            token_refresh_failures: IntCounterVec::new(Opts::new("token_refresh_failures_total", "Session token failures by reason"), &["reason"]).expect("metric"),
            token_refresh_duration: Histogram::with_opts(HistogramOpts::new("token_refresh_duration_seconds", "Session token create duration seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0])).expect("metric"),
            token_expiry_unix: IntGauge::new("token_expiry_unix_seconds", "Expiry of the current session token").expect("metric"),

            intercepted_requests: IntCounter::new("intercepted_requests_total", "Requests given an Authorization header").expect("metric"),
            api_requests: IntCounterVec::new(Opts::new("api_requests_total", "API calls by method and status"), &["method", "status"]).expect("metric"),

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.token_refresh_requests.clone())).expect("register metric");
        reg.register(Box::new(metrics.token_refresh_failures.clone())).expect("register metric");
        reg.register(Box::new(metrics.token_refresh_duration.clone())).expect("register metric");
        reg.register(Box::new(metrics.token_expiry_unix.clone())).expect("register metric");
        reg.register(Box::new(metrics.intercepted_requests.clone())).expect("register metric");
        reg.register(Box::new(metrics.api_requests.clone())).expect("register metric");

        metrics
    }
}
