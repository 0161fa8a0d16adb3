use std::time::Duration;

use crate::error::{Result, SmuctlError};

/// Mailbox polling and locking parameters
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Response register reads before a transaction times out
    pub poll_budget: u32,
    /// Pause between polls; zero busy-polls
    pub poll_interval: Duration,
    /// Longest wait for the mailbox lock
    pub lock_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            poll_budget: 1000,
            poll_interval: Duration::ZERO,
            lock_timeout: Duration::from_secs(5),
        }
    }
}

impl TransportConfig {
    pub fn validate(&self) -> Result<()> {
        if self.poll_budget == 0 {
            return Err(SmuctlError::ConfigError(
                "poll budget must be at least 1".to_string(),
            ));
        }
        if self.lock_timeout.is_zero() {
            return Err(SmuctlError::ConfigError(
                "lock timeout must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Where CPU-local capabilities execute
#[derive(Debug, Clone, Default)]
pub struct PlatformConfig {
    /// Pin CPUID execution to this CPU; `None` runs on the current CPU
    pub cpuid_cpu: Option<u32>,
    /// Logical processor used for MSR reads
    pub msr_cpu: u32,
}

impl PlatformConfig {
    /// Number of online CPUs from /sys/devices/system/cpu/online
    pub fn detect_online_cpus() -> Vec<u32> {
        std::fs::read_to_string("/sys/devices/system/cpu/online")
            .ok()
            .and_then(|s| Self::parse_cpu_list(&s))
            .unwrap_or_else(|| {
                tracing::warn!("Failed to detect online CPUs, assuming CPU 0 only");
                vec![0]
            })
    }

    /// Parse CPU list like "0-3,8-11"
    fn parse_cpu_list(s: &str) -> Option<Vec<u32>> {
        let mut cpus = Vec::new();
        for part in s.trim().split(',') {
            if let Some((start, end)) = part.split_once('-') {
                let start: u32 = start.parse().ok()?;
                let end: u32 = end.parse().ok()?;
                cpus.extend(start..=end);
            } else {
                cpus.push(part.parse().ok()?);
            }
        }
        Some(cpus)
    }

    pub fn validate(&self) -> Result<()> {
        let online = Self::detect_online_cpus();
        for cpu in std::iter::once(self.msr_cpu).chain(self.cpuid_cpu) {
            if !online.contains(&cpu) {
                return Err(SmuctlError::ConfigError(format!("CPU {cpu} is not online")));
            }
        }
        Ok(())
    }
}
