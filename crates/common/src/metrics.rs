//! Metrics collection for APIService
//!
//! Prometheus metrics for RPC handling, labelled by method wire name.

use crate::error::{ApiError, Result};
use lazy_static::lazy_static;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry};
use std::sync::Arc;
use std::time::Instant;

/// Metrics registry for APIService
#[derive(Debug, Clone)]
pub struct MetricsRegistry {
    pub registry: Arc<Registry>,
    pub rpc: RpcMetrics,
}

/// RPC-related metrics
#[derive(Debug, Clone)]
pub struct RpcMetrics {
    /// Total number of RPCs received
    pub requests_total: IntCounterVec,

    /// Total number of RPCs that returned an error status
    pub failures_total: IntCounterVec,

    /// RPC handling duration
    pub duration: HistogramVec,

    /// RPCs currently being handled
    pub active_requests: IntGauge,
}

lazy_static! {
    /// Global metrics registry instance
    pub static ref METRICS: MetricsRegistry =
        MetricsRegistry::new().expect("static metric definitions are valid");
}

impl MetricsRegistry {
    /// Create a new metrics registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());

        let requests_total = IntCounterVec::new(
            Opts::new("apiservice_rpc_requests_total", "Total number of RPCs received"),
            &["method"],
        )?;

        let failures_total = IntCounterVec::new(
            Opts::new(
                "apiservice_rpc_failures_total",
                "Total number of RPCs that returned an error status",
            ),
            &["method"],
        )?;

        let duration = HistogramVec::new(
            HistogramOpts::new(
                "apiservice_rpc_duration_seconds",
                "RPC handling duration in seconds",
            )
            .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
            &["method"],
        )?;

        let active_requests = IntGauge::new(
            "apiservice_rpc_active_requests",
            "Current number of RPCs being handled",
        )?;

        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(failures_total.clone()))?;
        registry.register(Box::new(duration.clone()))?;
        registry.register(Box::new(active_requests.clone()))?;

        Ok(MetricsRegistry {
            registry,
            rpc: RpcMetrics {
                requests_total,
                failures_total,
                duration,
                active_requests,
            },
        })
    }

    /// Gather all metrics as text
    pub fn gather(&self) -> Result<String> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| ApiError::internal(e.to_string()))
    }
}

impl RpcMetrics {
    /// Start tracking one RPC; the returned guard records it when finished
    pub fn start(&self, method: &str) -> RpcTimer {
        self.requests_total.with_label_values(&[method]).inc();
        self.active_requests.inc();
        RpcTimer {
            metrics: self.clone(),
            method: method.to_string(),
            start: Instant::now(),
            failed: false,
        }
    }
}

/// In-flight RPC measurement
///
/// Observes the duration and decrements the active gauge on drop.
pub struct RpcTimer {
    metrics: RpcMetrics,
    method: String,
    start: Instant,
    failed: bool,
}

impl RpcTimer {
    /// Count this RPC as failed
    pub fn fail(&mut self) {
        self.failed = true;
    }
}

impl Drop for RpcTimer {
    fn drop(&mut self) {
        let labels = [self.method.as_str()];
        self.metrics
            .duration
            .with_label_values(&labels)
            .observe(self.start.elapsed().as_secs_f64());
        if self.failed {
            self.metrics.failures_total.with_label_values(&labels).inc();
        }
        self.metrics.active_requests.dec();
    }
}
