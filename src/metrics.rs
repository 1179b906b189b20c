// src/metrics.rs
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Process-local Prometheus recorder. Counters from every stage land here;
/// the binary dumps the exposition text at debug level when the run ends.
pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Returns `None` when a recorder is already installed (tests, embedding).
    pub fn install() -> Option<Self> {
        match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => Some(Self { handle }),
            Err(error) => {
                tracing::debug!(%error, "metrics recorder not installed");
                None
            }
        }
    }

    pub fn render(&self) -> String {
        self.handle.render()
    }
}
