//! Bridges [`nebula_telemetry`]'s in-memory registry into the `metrics`
//! crate's global recorder and renders it as Prometheus text exposition
//! format.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use nebula_telemetry::metrics::MetricsRegistry;

use crate::names::{MetricKind, ALL};

/// Installs the process-wide Prometheus recorder.
///
/// Must run once, before the first [`bridge`] call. `metrics` only
/// allows a single global recorder per process, so a second call
/// returns an error.
pub fn install() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Copies every known metric's current value out of `registry` into the
/// installed Prometheus recorder.
///
/// Counters and gauges carry over exactly, via `absolute`/`set` rather
/// than `increment`, since the registry already holds the running total.
/// Histograms are summarized as `<name>_sum` and `<name>_count` gauges —
/// the registry tracks totals, not the individual observations a real
/// bucketed histogram needs.
pub fn bridge(registry: &MetricsRegistry) {
    for def in ALL {
        match def.kind {
            MetricKind::Counter => {
                metrics::counter!(def.name).absolute(registry.counter(def.name).get());
            }
            MetricKind::Gauge => {
                metrics::gauge!(def.name).set(registry.gauge(def.name).get() as f64);
            }
            MetricKind::Histogram => {
                let histogram = registry.histogram(def.name);
                metrics::gauge!(format!("{}_sum", def.name)).set(histogram.sum());
                metrics::gauge!(format!("{}_count", def.name)).set(histogram.count() as f64);
            }
        }
    }
}

/// Renders the recorder's current state as Prometheus text exposition
/// format, ready to serve from a `/metrics` endpoint.
#[must_use]
pub fn render(handle: &PrometheusHandle) -> String {
    handle.render()
}

#[cfg(test)]
mod tests {
    use super::*;

    // `metrics` allows exactly one global recorder per process; keep this
    // the only test in the crate that calls `install`.
    #[test]
    fn bridge_then_render_contains_known_metrics() {
        let handle = install().expect("install the global recorder exactly once");
        let registry = MetricsRegistry::new();
        registry.counter(crate::names::EXECUTIONS_STARTED_TOTAL).inc_by(3);
        registry.histogram(crate::names::ACTION_DURATION_SECONDS).observe(1.5);

        bridge(&registry);
        let rendered = render(&handle);

        assert!(rendered.contains("executions_started_total"));
        assert!(rendered.contains("action_duration_seconds_sum"));
        assert!(rendered.contains("action_duration_seconds_count"));
    }
}
