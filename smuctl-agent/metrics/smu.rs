metric_enum! {
    /// Gauges sampled from the SMU on every collection tick
    pub enum SmuMetric {
        Version => "smu_version",
        OcMode => "smu_oc_mode",
        Prochot => "smu_prochot",
        PatchLevel => "cpu_patch_level",
    }
}

impl SmuMetric {
    pub fn help(&self) -> &'static str {
        match self {
            SmuMetric::Version => "Raw SMU firmware version word",
            SmuMetric::OcMode => "1 when manual overclocking is engaged",
            SmuMetric::Prochot => "PROCHOT throttling status bit",
            SmuMetric::PatchLevel => "Microcode patch level",
        }
    }
}
