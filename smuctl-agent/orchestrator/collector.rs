// Periodic SMU sampling for the metrics endpoint
// Mailbox transactions block, so each tick runs on the blocking pool

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::{Result, SmuctlError};
use crate::prom::SmuMetricExporter;
use crate::smu::DynSmuClient;

/// Collection loop settings
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    pub interval: Duration,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
        }
    }
}

pub struct SmuCollector {
    collector_config: CollectorConfig,
    exporter: Arc<SmuMetricExporter>,
}

impl SmuCollector {
    pub fn new(client: Arc<DynSmuClient>, collector_config: CollectorConfig) -> Result<Self> {
        if collector_config.interval.is_zero() {
            return Err(SmuctlError::ConfigError(
                "collection interval must be non-zero".to_string(),
            ));
        }

        let exporter = Arc::new(SmuMetricExporter::new(client)?);
        tracing::info!("SMU exporter initialized");

        Ok(Self {
            collector_config,
            exporter,
        })
    }

    /// Exporter handle for the metrics handler
    pub fn exporter(&self) -> Arc<SmuMetricExporter> {
        Arc::clone(&self.exporter)
    }

    /// Start the collection loop; it exits once `cancel_token` fires
    pub fn start(self, cancel_token: CancellationToken) -> JoinHandle<()> {
        tracing::warn!(
            "Starting SMU collection every {:?}",
            self.collector_config.interval
        );

        tokio::spawn(async move {
            self.collection_loop(cancel_token).await;
        })
    }

    async fn collection_loop(self, cancel_token: CancellationToken) {
        let mut interval = tokio::time::interval(self.collector_config.interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel_token.cancelled() => {
                    tracing::info!("Collection loop cancelled");
                    break;
                }
                _ = interval.tick() => {
                    let exporter = Arc::clone(&self.exporter);
                    if let Err(e) = tokio::task::spawn_blocking(move || exporter.collect()).await {
                        tracing::error!("Collection task failed: {}", e);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::HardwareAccess;
    use crate::config::TransportConfig;
    use crate::smu::SmuClient;
    use crate::testing::FakePlatform;

    fn client() -> Arc<DynSmuClient> {
        let platform: Arc<dyn HardwareAccess> =
            Arc::new(FakePlatform::new().with_identity(0x0087_0F10, 2));
        Arc::new(SmuClient::new(platform, TransportConfig::default()).unwrap())
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let result = SmuCollector::new(
            client(),
            CollectorConfig {
                interval: Duration::ZERO,
            },
        );
        assert!(matches!(result, Err(SmuctlError::ConfigError(_))));
    }

    #[tokio::test]
    async fn test_loop_stops_on_cancel() {
        let collector = SmuCollector::new(
            client(),
            CollectorConfig {
                interval: Duration::from_millis(5),
            },
        )
        .unwrap();
        let exporter = collector.exporter();

        let token = CancellationToken::new();
        let handle = collector.start(token.clone());
        tokio::time::sleep(Duration::from_millis(30)).await;
        token.cancel();

        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("collection loop did not stop")
            .unwrap();

        let families = exporter.registry().gather();
        assert!(families.iter().any(|f| f.get_name() == "smu_version"));
    }
}
