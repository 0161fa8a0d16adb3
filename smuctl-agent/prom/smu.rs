use prometheus::{Gauge, IntCounter, Registry};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Result;
use crate::metrics::smu::SmuMetric;
use crate::smu::DynSmuClient;

pub struct SmuMetricExporter {
    registry: Arc<Registry>,
    client: Arc<DynSmuClient>,
    gauges: HashMap<SmuMetric, Gauge>,
    poll_errors: IntCounter,
}

impl SmuMetricExporter {
    pub fn new(client: Arc<DynSmuClient>) -> Result<Self> {
        let registry = Arc::new(Registry::new());
        let variant = client.variant().name();

        let mut gauges = HashMap::new();
        for metric in SmuMetric::all() {
            let opts =
                prometheus::Opts::new(metric.name(), metric.help()).const_label("family", variant);
            let gauge = Gauge::with_opts(opts)?;
            registry.register(Box::new(gauge.clone()))?;
            gauges.insert(metric, gauge);
        }

        let poll_errors = IntCounter::with_opts(
            prometheus::Opts::new("smu_poll_errors_total", "Failed SMU reads during collection")
                .const_label("family", variant),
        )?;
        registry.register(Box::new(poll_errors.clone()))?;

        Ok(Self {
            registry,
            client,
            gauges,
            poll_errors,
        })
    }

    pub fn registry(&self) -> Arc<Registry> {
        Arc::clone(&self.registry)
    }

    fn set(&self, metric: SmuMetric, value: f64) {
        if let Some(gauge) = self.gauges.get(&metric) {
            gauge.set(value);
        }
    }

    /// Sample the SMU once; blocks on the mailbox
    pub fn collect(&self) {
        match self.client.get_version() {
            Ok(version) => self.set(SmuMetric::Version, version as f64),
            Err(e) => {
                self.poll_errors.inc();
                tracing::error!("Failed to read SMU version: {}", e);
            }
        }

        match self.client.is_prochot_enabled() {
            Ok(enabled) => self.set(SmuMetric::Prochot, if enabled { 1.0 } else { 0.0 }),
            Err(e) => {
                self.poll_errors.inc();
                tracing::error!("Failed to read PROCHOT status: {}", e);
            }
        }

        self.set(
            SmuMetric::OcMode,
            if self.client.get_oc_mode() { 1.0 } else { 0.0 },
        );
        self.set(SmuMetric::PatchLevel, self.client.get_patch_level() as f64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::HardwareAccess;
    use crate::config::TransportConfig;
    use crate::smu::SmuClient;
    use crate::testing::{FakePlatform, Reply};
    use smuctl_raw::mailbox::SMN_PROCHOT_STATUS;

    fn exporter(platform: FakePlatform) -> (Arc<FakePlatform>, SmuMetricExporter) {
        let platform = Arc::new(platform.with_identity(0x0087_0F10, 2));
        let dyn_platform: Arc<dyn HardwareAccess> = platform.clone();
        let client = SmuClient::new(dyn_platform, TransportConfig::default()).unwrap();
        (platform, SmuMetricExporter::new(Arc::new(client)).unwrap())
    }

    fn sample(exporter: &SmuMetricExporter, name: &str) -> Option<f64> {
        exporter
            .registry()
            .gather()
            .into_iter()
            .find(|family| family.get_name() == name)
            .and_then(|family| family.get_metric().first().map(|m| m.get_gauge().get_value()))
    }

    fn errors(exporter: &SmuMetricExporter) -> u64 {
        exporter.poll_errors.get()
    }

    #[test]
    fn test_collect_sets_gauges() {
        let (platform, exporter) = exporter(
            FakePlatform::new()
                .with_responder(|opcode, _| match opcode {
                    0x2 => Reply::ok(0x002E_3A00),
                    _ => Reply::ok(0),
                })
                .with_msr(0, smuctl_raw::msr::MSR_PATCH_LEVEL, 0x0870_1021),
        );
        platform.set_register(SMN_PROCHOT_STATUS, 1);

        exporter.collect();

        assert_eq!(sample(&exporter, "smu_version"), Some(0x002E_3A00 as f64));
        assert_eq!(sample(&exporter, "smu_prochot"), Some(1.0));
        assert_eq!(sample(&exporter, "smu_oc_mode"), Some(1.0));
        assert_eq!(sample(&exporter, "cpu_patch_level"), Some(0x0870_1021 as f64));
        assert_eq!(errors(&exporter), 0);
    }

    #[test]
    fn test_collect_counts_failures() {
        let (platform, exporter) = exporter(FakePlatform::new());
        platform.fail_reads_of(SMN_PROCHOT_STATUS);

        exporter.collect();
        exporter.collect();
        assert_eq!(errors(&exporter), 2);
    }
}
