use nix::sched::{sched_getaffinity, sched_setaffinity, CpuSet};
use nix::unistd::Pid;

use crate::error::{Result, SmuctlError};

/// Pins the calling thread to one CPU until dropped
///
/// CPUID answers for the CPU it executes on, so per-CPU leaves need the
/// thread held in place for the duration of the read.
pub struct AffinityGuard {
    cpu: u32,
    previous: CpuSet,
}

impl AffinityGuard {
    pub fn new(cpu: u32) -> Result<Self> {
        let current = Pid::from_raw(0);
        let previous = sched_getaffinity(current)
            .map_err(|e| SmuctlError::AffinityError(format!("Failed to get affinity: {e}")))?;

        let mut pinned = CpuSet::new();
        pinned.set(cpu as usize).map_err(|e| {
            SmuctlError::AffinityError(format!("CPU {cpu} is outside the affinity mask: {e}"))
        })?;

        sched_setaffinity(current, &pinned).map_err(|e| {
            SmuctlError::AffinityError(format!("Failed to pin to CPU {cpu}: {e}"))
        })?;

        tracing::trace!("Pinned thread to CPU {}", cpu);
        Ok(Self { cpu, previous })
    }

    pub fn cpu(&self) -> u32 {
        self.cpu
    }
}

impl Drop for AffinityGuard {
    fn drop(&mut self) {
        if let Err(e) = sched_setaffinity(Pid::from_raw(0), &self.previous) {
            tracing::warn!("Failed to restore affinity after CPU {}: {}", self.cpu, e);
        }
    }
}
