//! Core voltage encodings
//!
//! Two VID encodings exist and they are not interchangeable: families before
//! 0x19 use the legacy linear table counting down from 1.55V, 0x19 and later
//! use SVI3 counting up from 0.245V. Select one through [`VoltageScheme`].

use crate::error::{Result, SmuctlError};

pub const VID_MIN: u32 = 0x20;
pub const VID_MAX: u32 = 0x98;
pub const LEGACY_VID_BASE: f64 = 1.55;
pub const LEGACY_VID_STEP: f64 = 0.00625;

pub const SVI3_BASE: f64 = 0.245;
pub const SVI3_STEP: f64 = 0.005;
/// Highest selectable voltage limit for SVI3 tables
pub const SVI3_MAX_LIMIT: f64 = 2.8;

/// First family encoding voltages as SVI3
pub const SVI3_FIRST_FAMILY: u32 = 0x19;

pub fn vid_to_voltage(vid: u32) -> Result<f64> {
    if !(VID_MIN..=VID_MAX).contains(&vid) {
        return Err(SmuctlError::VidOutOfRange(vid));
    }
    Ok(LEGACY_VID_BASE - vid as f64 * LEGACY_VID_STEP)
}

/// Nearest legacy VID for `voltage`
pub fn voltage_to_vid(voltage: f64) -> Result<u32> {
    if !voltage.is_finite() {
        return Err(SmuctlError::VoltageOutOfRange(voltage));
    }

    let vid = ((LEGACY_VID_BASE - voltage) / LEGACY_VID_STEP).round();
    if vid < VID_MIN as f64 || vid > VID_MAX as f64 {
        return Err(SmuctlError::VoltageOutOfRange(voltage));
    }
    Ok(vid as u32)
}

pub fn vid_to_voltage_svi3(vid: u32) -> f64 {
    SVI3_BASE + vid as f64 * SVI3_STEP
}

/// Nearest SVI3 VID for `voltage`
pub fn voltage_to_vid_svi3(voltage: f64) -> Result<u32> {
    if !voltage.is_finite() || voltage < SVI3_BASE - SVI3_STEP / 2.0 || voltage > SVI3_MAX_LIMIT {
        return Err(SmuctlError::VoltageOutOfRange(voltage));
    }
    Ok(((voltage - SVI3_BASE) / SVI3_STEP).round().max(0.0) as u32)
}

/// Family-selected VID encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoltageScheme {
    LegacyVid,
    Svi3,
}

impl VoltageScheme {
    pub fn for_family(family: u32) -> Self {
        if family < SVI3_FIRST_FAMILY {
            VoltageScheme::LegacyVid
        } else {
            VoltageScheme::Svi3
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            VoltageScheme::LegacyVid => "VID",
            VoltageScheme::Svi3 => "SVI3",
        }
    }

    /// Voltage difference between adjacent VIDs
    pub fn step(&self) -> f64 {
        match self {
            VoltageScheme::LegacyVid => LEGACY_VID_STEP,
            VoltageScheme::Svi3 => SVI3_STEP,
        }
    }

    pub fn vid_to_voltage(&self, vid: u32) -> Result<f64> {
        match self {
            VoltageScheme::LegacyVid => vid_to_voltage(vid),
            VoltageScheme::Svi3 => Ok(vid_to_voltage_svi3(vid)),
        }
    }

    pub fn voltage_to_vid(&self, voltage: f64) -> Result<u32> {
        match self {
            VoltageScheme::LegacyVid => voltage_to_vid(voltage),
            VoltageScheme::Svi3 => voltage_to_vid_svi3(voltage),
        }
    }

    /// Every selectable (vid, volts) pair up to `limit`, highest voltage first
    /// for the legacy table and lowest first for SVI3
    pub fn entries(&self, limit: f64) -> Result<Vec<(u32, f64)>> {
        if !limit.is_finite() || limit < SVI3_BASE || limit > SVI3_MAX_LIMIT {
            return Err(SmuctlError::VoltageOutOfRange(limit));
        }

        // Tolerate the float error of the last step
        let ceiling = limit + self.step() / 1000.0;

        let entries: Vec<(u32, f64)> = match self {
            VoltageScheme::LegacyVid => (VID_MIN..=VID_MAX)
                .map(|vid| (vid, LEGACY_VID_BASE - vid as f64 * LEGACY_VID_STEP))
                .filter(|(_, volts)| *volts <= ceiling)
                .collect(),
            VoltageScheme::Svi3 => (0..)
                .map(|vid| (vid, vid_to_voltage_svi3(vid)))
                .take_while(|(_, volts)| *volts <= ceiling)
                .collect(),
        };

        Ok(entries)
    }
}
