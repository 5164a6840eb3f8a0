//! # Application State Management
//!
//! State shared by every request handler: the live configuration, the file
//! store, and the counters behind `/health` and `/metrics`.
//!
//! ## Locking:
//! Each mutable piece sits behind its own `Arc<RwLock<T>>`. Handlers take a
//! lock only long enough to copy or bump a value, and never hold one across an
//! `.await` or while an edit is running.

use crate::config::AppConfig;
use crate::storage::FileStore;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Instant;

/// Shared state handed to handlers through `web::Data`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Runtime-updatable configuration
    pub config: Arc<RwLock<AppConfig>>,

    /// Counters updated by middleware and handlers
    pub metrics: Arc<RwLock<AppMetrics>>,

    /// Upload and output directories, fixed at startup
    pub store: FileStore,

    pub start_time: Instant,
}

/// Counters collected since startup.
#[derive(Debug, Default, Clone)]
pub struct AppMetrics {
    pub request_count: u64,
    pub error_count: u64,

    /// Edits currently running on the blocking pool
    pub active_jobs: usize,

    /// Per-route statistics, keyed by e.g. "POST /api/v1/cut"
    pub endpoint_metrics: HashMap<String, EndpointMetric>,

    /// Per-operation statistics, keyed by operation name ("cut", "merge", ...)
    pub operation_metrics: HashMap<String, OperationMetric>,
}

/// Request statistics for one route.
#[derive(Debug, Default, Clone)]
pub struct EndpointMetric {
    pub request_count: u64,
    pub total_duration_ms: u64,
    pub error_count: u64,
}

/// Outcome statistics for one edit operation.
#[derive(Debug, Default, Clone)]
pub struct OperationMetric {
    pub completed: u64,
    pub failed: u64,
    /// Encoded WAV bytes sent back to clients
    pub bytes_out: u64,
    /// Audio produced, in seconds
    pub audio_seconds_out: f64,
}

/// A reserved slot in the job limit. Releases the slot when dropped.
#[derive(Debug)]
pub struct JobGuard {
    metrics: Arc<RwLock<AppMetrics>>,
}

impl Drop for JobGuard {
    fn drop(&mut self) {
        let mut metrics = self.metrics.write().unwrap();
        metrics.active_jobs = metrics.active_jobs.saturating_sub(1);
    }
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let store = FileStore::new(&config.storage);
        Self {
            config: Arc::new(RwLock::new(config)),
            metrics: Arc::new(RwLock::new(AppMetrics::default())),
            store,
            start_time: Instant::now(),
        }
    }

    /// Copy of the current configuration; the lock is released on return.
    pub fn get_config(&self) -> AppConfig {
        self.config.read().unwrap().clone()
    }

    /// Apply a partial JSON update and return the resulting configuration.
    ///
    /// The merge runs under the write lock, so concurrent updates to different
    /// keys are never lost. A rejected update leaves the configuration as it was.
    pub fn update_config_from_json(&self, json_str: &str) -> anyhow::Result<AppConfig> {
        let mut config = self.config.write().unwrap();
        config.update_from_json(json_str)?;
        Ok(config.clone())
    }

    /// Reserve a job slot, or `None` if `max_concurrent_jobs` are running.
    ///
    /// The check and the increment happen under one write lock, so two
    /// requests can never both take the last slot.
    pub fn try_start_job(&self) -> Option<JobGuard> {
        let limit = self.config.read().unwrap().limits.max_concurrent_jobs;
        let mut metrics = self.metrics.write().unwrap();
        if metrics.active_jobs >= limit {
            return None;
        }
        metrics.active_jobs += 1;

        Some(JobGuard {
            metrics: Arc::clone(&self.metrics),
        })
    }

    pub fn increment_request_count(&self) {
        let mut metrics = self.metrics.write().unwrap();
        metrics.request_count += 1;
    }

    pub fn increment_error_count(&self) {
        let mut metrics = self.metrics.write().unwrap();
        metrics.error_count += 1;
    }

    /// Record one request against its route.
    pub fn record_endpoint_request(&self, endpoint: &str, duration_ms: u64, is_error: bool) {
        let mut metrics = self.metrics.write().unwrap();
        let endpoint_metric = metrics.endpoint_metrics.entry(endpoint.to_string()).or_default();

        endpoint_metric.request_count += 1;
        endpoint_metric.total_duration_ms += duration_ms;
        if is_error {
            endpoint_metric.error_count += 1;
        }
    }

    /// Record a finished edit and the size of what it produced.
    pub fn record_operation_success(&self, operation: &str, bytes_out: u64, audio_seconds: f64) {
        let mut metrics = self.metrics.write().unwrap();
        let entry = metrics.operation_metrics.entry(operation.to_string()).or_default();
        entry.completed += 1;
        entry.bytes_out += bytes_out;
        entry.audio_seconds_out += audio_seconds;
    }

    pub fn record_operation_failure(&self, operation: &str) {
        let mut metrics = self.metrics.write().unwrap();
        metrics.operation_metrics.entry(operation.to_string()).or_default().failed += 1;
    }

    /// Consistent copy of all counters, taken under a single read lock.
    pub fn get_metrics_snapshot(&self) -> AppMetrics {
        self.metrics.read().unwrap().clone()
    }

    pub fn get_uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

impl EndpointMetric {
    pub fn average_duration_ms(&self) -> f64 {
        if self.request_count > 0 {
            self.total_duration_ms as f64 / self.request_count as f64
        } else {
            0.0
        }
    }

    /// Fraction of requests that failed, from 0.0 to 1.0.
    pub fn error_rate(&self) -> f64 {
        if self.request_count > 0 {
            self.error_count as f64 / self.request_count as f64
        } else {
            0.0
        }
    }
}
