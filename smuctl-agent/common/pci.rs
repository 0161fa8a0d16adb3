use once_cell::sync::Lazy;
use parking_lot::RwLock;
use smuctl_raw::PciDeviceAddress;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{Result, SmuctlError};

pub fn proc_bus_pci_root() -> &'static str {
    if std::env::var("DOCKER_RUNNING").is_ok() {
        "/pcm/proc/bus/pci"
    } else {
        "/proc/bus/pci"
    }
}

pub struct PciHandle {
    file: parking_lot::Mutex<File>,
    address: PciDeviceAddress,
}

impl PciHandle {
    pub fn new(address: PciDeviceAddress) -> Result<Self> {
        let path = Self::get_pci_path(address);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_SYNC) // Index port writes must land before the data access
            .open(&path)
            .map_err(|e| {
                SmuctlError::PciError(format!(
                    "Failed to open PCI device {} ({}): {}",
                    address,
                    path.display(),
                    e
                ))
            })?;

        tracing::debug!("Opened PCI config space of {}", address);

        Ok(Self {
            file: parking_lot::Mutex::new(file),
            address,
        })
    }

    fn get_pci_path(address: PciDeviceAddress) -> PathBuf {
        PathBuf::from(format!(
            "{}/{:02x}/{:02x}.{}",
            proc_bus_pci_root(),
            address.bus,
            address.device,
            address.function
        ))
    }

    pub fn read32(&self, offset: u32) -> Result<u32> {
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(offset as u64)).map_err(|e| {
            SmuctlError::PciError(format!(
                "Failed to seek to {}+0x{offset:X}: {e}",
                self.address
            ))
        })?;

        let mut buffer = [0u8; 4];
        file.read_exact(&mut buffer).map_err(|e| {
            SmuctlError::PciError(format!(
                "Failed to read at {}+0x{offset:X}: {e}",
                self.address
            ))
        })?;

        Ok(u32::from_le_bytes(buffer))
    }

    pub fn write32(&self, offset: u32, value: u32) -> Result<()> {
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(offset as u64)).map_err(|e| {
            SmuctlError::PciError(format!(
                "Failed to seek to {}+0x{offset:X}: {e}",
                self.address
            ))
        })?;

        file.write_all(&value.to_le_bytes()).map_err(|e| {
            SmuctlError::PciError(format!(
                "Failed to write at {}+0x{offset:X}: {e}",
                self.address
            ))
        })?;

        Ok(())
    }
}

/// Process-wide cache of open config-space handles
pub struct Pci {
    handles: RwLock<HashMap<PciDeviceAddress, Arc<PciHandle>>>,
}

impl Pci {
    fn new() -> Self {
        Self {
            handles: RwLock::new(HashMap::new()),
        }
    }

    pub fn instance() -> &'static Pci {
        static INSTANCE: Lazy<Pci> = Lazy::new(Pci::new);
        &INSTANCE
    }

    fn get_or_create_handle(&self, address: PciDeviceAddress) -> Result<Arc<PciHandle>> {
        {
            let handles = self.handles.read();
            if let Some(handle) = handles.get(&address) {
                return Ok(Arc::clone(handle));
            }
        }

        let mut handles = self.handles.write();
        if let Some(handle) = handles.get(&address) {
            return Ok(Arc::clone(handle));
        }

        let handle = Arc::new(PciHandle::new(address)?);
        handles.insert(address, Arc::clone(&handle));
        Ok(handle)
    }

    pub fn read32(&self, address: PciDeviceAddress, offset: u32) -> Result<u32> {
        let handle = self.get_or_create_handle(address)?;
        handle.read32(offset)
    }

    pub fn write32(&self, address: PciDeviceAddress, offset: u32, value: u32) -> Result<()> {
        let handle = self.get_or_create_handle(address)?;
        handle.write32(offset, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pci_path_format() {
        let path = PciHandle::get_pci_path(PciDeviceAddress::new(0x00, 0x18, 3));
        assert!(path.to_string_lossy().ends_with("/00/18.3"));
    }

    #[test]
    fn test_pci_singleton() {
        let pci1 = Pci::instance();
        let pci2 = Pci::instance();
        assert!(std::ptr::eq(pci1, pci2));
    }
}
