//! Request/response exchange with the SMU mailbox
//!
//! One transaction walks the mailbox through
//! `idle -> response cleared -> message written -> polling -> done | timeout`.
//! The SMU firmware is not reentrant and the index/data port pair is shared
//! state, so every access in this module, single register reads included,
//! runs under one mailbox lock.

use parking_lot::Mutex;
use smuctl_raw::SmuRegisterMap;
use std::sync::Arc;

use crate::capability::PciConfigAccess;
use crate::config::TransportConfig;
use crate::error::{Result, SmuctlError};
use crate::smu::status;

/// One message in flight; lives for a single exchange
#[derive(Debug, Clone, Copy)]
struct Transaction {
    opcode: u32,
    argument: Option<u32>,
}

pub struct SmuTransport<P: ?Sized> {
    pci: Arc<P>,
    map: &'static SmuRegisterMap,
    config: TransportConfig,
    mailbox: Mutex<()>,
}

impl<P: PciConfigAccess + ?Sized> SmuTransport<P> {
    pub fn new(pci: Arc<P>, map: &'static SmuRegisterMap, config: TransportConfig) -> Result<Self> {
        config.validate()?;
        map.validate()
            .map_err(|e| SmuctlError::ConfigError(format!("{} register map: {e}", map.name)))?;

        Ok(Self {
            pci,
            map,
            config,
            mailbox: Mutex::new(()),
        })
    }

    pub fn register_map(&self) -> &'static SmuRegisterMap {
        self.map
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Read one SMU register through the index/data ports
    pub fn read_indexed(&self, addr: u32) -> Result<u32> {
        let _mailbox = self.lock()?;
        self.read_reg(addr)
    }

    /// Write one SMU register through the index/data ports
    pub fn write_indexed(&self, addr: u32, value: u32) -> Result<()> {
        let _mailbox = self.lock()?;
        self.write_reg(addr, value)
    }

    /// Send `opcode` with `argument` and return the argument register afterwards
    pub fn request(&self, opcode: u32, argument: u32) -> Result<u32> {
        self.execute(Transaction {
            opcode,
            argument: Some(argument),
        })
    }

    /// Send `opcode` without touching the argument register
    pub fn query(&self, opcode: u32) -> Result<u32> {
        self.execute(Transaction {
            opcode,
            argument: None,
        })
    }

    fn lock(&self) -> Result<parking_lot::MutexGuard<'_, ()>> {
        self.mailbox
            .try_lock_for(self.config.lock_timeout)
            .ok_or(SmuctlError::LockTimeout(self.config.lock_timeout))
    }

    fn execute(&self, tx: Transaction) -> Result<u32> {
        if tx.opcode == 0 {
            return Err(SmuctlError::ZeroOpcode);
        }

        let _mailbox = self.lock()?;
        let result = self.exchange(tx);

        // Leave the mailbox idle whatever happened
        if let Err(e) = self.write_reg(self.map.rsp_address, 0) {
            tracing::debug!("Failed to clear SMU response register: {}", e);
        }

        match &result {
            Ok(value) => tracing::debug!(
                "SMU message 0x{:X} arg {:?} -> 0x{:08X}",
                tx.opcode,
                tx.argument,
                value
            ),
            Err(e) => tracing::warn!("SMU message 0x{:X} failed: {}", tx.opcode, e),
        }

        result
    }

    /// The exchange itself; the caller holds the mailbox lock
    fn exchange(&self, tx: Transaction) -> Result<u32> {
        self.write_reg(self.map.rsp_address, 0)?;

        if let Some(argument) = tx.argument {
            self.write_reg(self.map.arg_address, argument)?;
            // Upper half of the 64-bit argument slot
            self.write_reg(self.map.arg_address + 4, 0)?;
        }

        self.write_reg(self.map.msg_address, tx.opcode)?;
        self.wait_for_ready(tx.opcode)?;
        self.read_reg(self.map.arg_address)
    }

    /// Poll the response register until the SMU answers or the budget runs out
    fn wait_for_ready(&self, opcode: u32) -> Result<()> {
        let budget = self.config.poll_budget;

        for attempt in 1..=budget {
            let response = self.read_reg(self.map.rsp_address)?;

            match response {
                0 => {
                    if !self.config.poll_interval.is_zero() && attempt < budget {
                        std::thread::sleep(self.config.poll_interval);
                    }
                }
                1 => {
                    tracing::trace!("SMU ready after {} polls", attempt);
                    return Ok(());
                }
                word => {
                    // Only a bare status byte is meaningful; anything wider is a failure
                    let byte = u8::try_from(word).unwrap_or_else(|_| {
                        tracing::debug!("SMU response 0x{:08X} exceeds a status byte", word);
                        status::FAILED
                    });
                    return Err(SmuctlError::CommandRejected { opcode, status: byte });
                }
            }
        }

        Err(SmuctlError::TransactionTimeout {
            opcode,
            attempts: budget,
        })
    }

    fn read_reg(&self, addr: u32) -> Result<u32> {
        self.pci
            .write_config(self.map.pci_address, self.map.index_port, addr)?;
        let value = self
            .pci
            .read_config(self.map.pci_address, self.map.data_port)?;
        tracing::trace!("SMU read 0x{:08X} = 0x{:08X}", addr, value);
        Ok(value)
    }

    fn write_reg(&self, addr: u32, value: u32) -> Result<()> {
        self.pci
            .write_config(self.map.pci_address, self.map.index_port, addr)?;
        self.pci
            .write_config(self.map.pci_address, self.map.data_port, value)?;
        tracing::trace!("SMU write 0x{:08X} = 0x{:08X}", addr, value);
        Ok(())
    }
}
