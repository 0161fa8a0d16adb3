//! MSR (Model-Specific Register) read primitive and AMD MSR addresses
//!
//! This module provides low-level MSR access through `/dev/cpu/*/msr`.
//! CPU selection and error mapping live in the `MsrAccess` capability of smuctl-agent.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};

/// Microcode patch level (`MSR_AMD64_PATCH_LEVEL`)
pub const MSR_PATCH_LEVEL: u32 = 0x0000_008B;

pub type Result<T> = std::result::Result<T, MsrError>;

/// Errors that can occur during MSR operations
#[derive(Debug, thiserror::Error)]
pub enum MsrError {
    #[error("Failed to open MSR device for CPU {cpu}: {source}")]
    OpenFailed { cpu: u32, source: std::io::Error },

    #[error("Failed to read MSR 0x{msr:X} on CPU {cpu}: {source}")]
    ReadFailed {
        cpu: u32,
        msr: u32,
        source: std::io::Error,
    },

    #[error("Failed to seek to MSR 0x{msr:X} on CPU {cpu}: {source}")]
    SeekFailed {
        cpu: u32,
        msr: u32,
        source: std::io::Error,
    },
}

/// Split a 64-bit MSR value into its (EAX, EDX) halves
pub const fn split(value: u64) -> (u32, u32) {
    (value as u32, (value >> 32) as u32)
}

/// Read a 64-bit value from an MSR on one logical processor
///
/// # Errors
///
/// Returns an error if:
/// - The MSR device cannot be opened (requires root/CAP_SYS_RAWIO)
/// - The MSR address is invalid or not readable
///
/// # Example
///
/// ```ignore
/// use smuctl_raw::msr::{read_msr, MSR_PATCH_LEVEL};
///
/// let value = read_msr(0, MSR_PATCH_LEVEL)?;
/// println!("patch level 0x{:08X}", value as u32);
/// ```
pub fn read_msr(cpu: u32, msr: u32) -> Result<u64> {
    let path = format!("/dev/cpu/{cpu}/msr");
    let mut file = File::open(&path).map_err(|e| MsrError::OpenFailed { cpu, source: e })?;

    file.seek(SeekFrom::Start(msr as u64))
        .map_err(|e| MsrError::SeekFailed {
            cpu,
            msr,
            source: e,
        })?;

    let mut buffer = [0u8; 8];
    file.read_exact(&mut buffer)
        .map_err(|e| MsrError::ReadFailed {
            cpu,
            msr,
            source: e,
        })?;

    Ok(u64::from_le_bytes(buffer))
}
