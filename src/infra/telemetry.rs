//! Log subscriber setup and metric descriptions for the `jdigital` binary.

use std::sync::Once;

use metrics::{Unit, describe_counter, describe_gauge, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

/// Dependencies that log every query or connection at `info`. Skipped when `RUST_LOG` is set.
const QUIET_TARGETS: [&str; 3] = ["sqlx=warn", "hyper=warn", "lettre=warn"];

enum MetricKind {
    Counter,
    Gauge,
    Histogram,
}

const METRICS: [(&str, MetricKind, Unit, &str); 8] = [
    (
        "jdigital_cache_hit_total",
        MetricKind::Counter,
        Unit::Count,
        "Public pages served from the response cache.",
    ),
    (
        "jdigital_cache_miss_total",
        MetricKind::Counter,
        Unit::Count,
        "Public pages rendered because no cached copy existed.",
    ),
    (
        "jdigital_cache_evict_total",
        MetricKind::Counter,
        Unit::Count,
        "Cached pages dropped to stay within capacity.",
    ),
    (
        "jdigital_leads_created_total",
        MetricKind::Counter,
        Unit::Count,
        "Stored leads, labelled by lead type.",
    ),
    (
        "jdigital_submissions_rate_limited_total",
        MetricKind::Counter,
        Unit::Count,
        "Lead submissions refused by the rate limiter.",
    ),
    (
        "jdigital_notifications_failed_total",
        MetricKind::Counter,
        Unit::Count,
        "Lead notifications no provider could deliver.",
    ),
    (
        "jdigital_rate_limit_keys",
        MetricKind::Gauge,
        Unit::Count,
        "Visitor keys tracked by the in-memory rate limiter.",
    ),
    (
        "jdigital_http_request_ms",
        MetricKind::Histogram,
        Unit::Milliseconds,
        "Request latency by method and status class.",
    ),
];

static DESCRIBED: Once = Once::new();

/// Installs the global subscriber. `RUST_LOG` directives override the configured level.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    DESCRIBED.call_once(describe_metrics);

    let mut filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();
    if std::env::var_os(EnvFilter::DEFAULT_ENV).is_none() {
        for directive in QUIET_TARGETS {
            if let Ok(directive) = directive.parse() {
                filter = filter.add_directive(directive);
            }
        }
    }

    let output = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(false)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(ErrorLayer::default())
        .with(output)
        .try_init()
        .map_err(|err| InfraError::telemetry(format!("log subscriber already installed: {err}")))
}

fn describe_metrics() {
    for (name, kind, unit, description) in METRICS {
        match kind {
            MetricKind::Counter => describe_counter!(name, unit, description),
            MetricKind::Gauge => describe_gauge!(name, unit, description),
            MetricKind::Histogram => describe_histogram!(name, unit, description),
        }
    }
}
