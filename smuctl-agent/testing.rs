//! Scripted stand-in for the privileged I/O capabilities
//!
//! `FakePlatform` models the SMU behind its index/data ports: writes to the
//! index port select an SMU address, data port accesses hit a sparse register
//! file, and writing the message register hands the opcode and current
//! argument to a responder closure that decides how the SMU answers. Every
//! data port access is journaled with the calling thread.

use parking_lot::Mutex;
use smuctl_raw::cpuid::leaf;
use smuctl_raw::{PciDeviceAddress, SmuRegisterMap};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::thread::ThreadId;

use crate::capability::{CpuidAccess, CpuidResult, MsrAccess, PciConfigAccess};
use crate::error::{Result, SmuctlError};

/// How the fake SMU answers one message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reply {
    /// Final response byte; 0 never answers
    pub status: u8,
    /// Polls that read 0 before the answer appears
    pub delay: u32,
    /// Value placed in the argument register on success
    pub result: u32,
}

impl Reply {
    pub fn ok(result: u32) -> Self {
        Self {
            status: 0x01,
            delay: 0,
            result,
        }
    }

    pub fn status(status: u8) -> Self {
        Self {
            status,
            delay: 0,
            result: 0,
        }
    }

    pub fn never() -> Self {
        Self::status(0)
    }

    pub fn after(self, delay: u32) -> Self {
        Self { delay, ..self }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Write { addr: u32, value: u32 },
    Read { addr: u32, value: u32 },
}

type Responder = Arc<dyn Fn(u32, u32) -> Reply + Send + Sync>;

#[derive(Default)]
struct State {
    index: u32,
    registers: HashMap<u32, u32>,
    pending: Option<Reply>,
    journal: Vec<(ThreadId, Access)>,
    failing_selects: HashSet<u32>,
    failing_writes: HashSet<u32>,
    failing_reads: HashSet<u32>,
}

pub struct FakePlatform {
    map: &'static SmuRegisterMap,
    responder: Responder,
    cpuid: HashMap<u32, CpuidResult>,
    failing_leaves: HashSet<u32>,
    msrs: HashMap<(u32, u32), u64>,
    state: Mutex<State>,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self {
            map: &smuctl_raw::arch::zen2::REGISTER_MAP,
            responder: Arc::new(|_, _| Reply::ok(0)),
            cpuid: HashMap::new(),
            failing_leaves: HashSet::new(),
            msrs: HashMap::new(),
            state: Mutex::new(State::default()),
        }
    }

    pub fn with_map(mut self, map: &'static SmuRegisterMap) -> Self {
        self.map = map;
        self
    }

    pub fn with_responder<F>(mut self, responder: F) -> Self
    where
        F: Fn(u32, u32) -> Reply + Send + Sync + 'static,
    {
        self.responder = Arc::new(responder);
        self
    }

    pub fn with_cpuid(mut self, leaf: u32, result: CpuidResult) -> Self {
        self.cpuid.insert(leaf, result);
        self
    }

    /// Leaf 1 EAX signature and leaf 0x80000001 package type
    pub fn with_identity(self, signature: u32, package_type: u32) -> Self {
        let features = self.cpuid.get(&leaf::FEATURES).copied().unwrap_or_default();
        self.with_cpuid(
            leaf::FEATURES,
            CpuidResult {
                eax: signature,
                ..features
            },
        )
        .with_cpuid(
            leaf::EXTENDED_FEATURES,
            CpuidResult {
                ebx: package_type << 28,
                ..Default::default()
            },
        )
    }

    /// Logical processor count and raw threads-per-core field (count - 1)
    pub fn with_topology(self, logical: u32, threads_field: u32) -> Self {
        let features = self.cpuid.get(&leaf::FEATURES).copied().unwrap_or_default();
        self.with_cpuid(
            leaf::FEATURES,
            CpuidResult {
                ebx: (features.ebx & !0x00FF_0000) | ((logical & 0xFF) << 16),
                ..features
            },
        )
        .with_cpuid(
            leaf::COMPUTE_UNIT,
            CpuidResult {
                ebx: (threads_field & 0xF) << 8,
                ..Default::default()
            },
        )
    }

    /// Spread a brand string over the three brand leaves, NUL padded
    pub fn with_brand(mut self, brand: &str) -> Self {
        let mut bytes = [0u8; 48];
        let len = brand.len().min(48);
        bytes[..len].copy_from_slice(&brand.as_bytes()[..len]);

        for (i, leaf) in leaf::BRAND_STRING.iter().enumerate() {
            let word = |n: usize| {
                let start = i * 16 + n * 4;
                u32::from_le_bytes([
                    bytes[start],
                    bytes[start + 1],
                    bytes[start + 2],
                    bytes[start + 3],
                ])
            };
            self.cpuid.insert(
                *leaf,
                CpuidResult {
                    eax: word(0),
                    ebx: word(1),
                    ecx: word(2),
                    edx: word(3),
                },
            );
        }
        self
    }

    pub fn with_msr(mut self, cpu: u32, register: u32, value: u64) -> Self {
        self.msrs.insert((cpu, register), value);
        self
    }

    pub fn failing_cpuid(mut self, leaf: u32) -> Self {
        self.failing_leaves.insert(leaf);
        self
    }

    /// Preload an SMU register
    pub fn set_register(&self, addr: u32, value: u32) {
        self.state.lock().registers.insert(addr, value);
    }

    /// Fail the index port write selecting `addr`
    pub fn fail_select_of(&self, addr: u32) {
        self.state.lock().failing_selects.insert(addr);
    }

    pub fn fail_writes_to(&self, addr: u32) {
        self.state.lock().failing_writes.insert(addr);
    }

    pub fn fail_reads_of(&self, addr: u32) {
        self.state.lock().failing_reads.insert(addr);
    }

    pub fn journal(&self) -> Vec<Access> {
        self.state.lock().journal.iter().map(|(_, a)| *a).collect()
    }

    pub fn journal_with_threads(&self) -> Vec<(ThreadId, Access)> {
        self.state.lock().journal.clone()
    }

    pub fn clear_journal(&self) {
        self.state.lock().journal.clear();
    }

    pub fn reads_of(&self, addr: u32) -> usize {
        self.journal()
            .iter()
            .filter(|access| matches!(access, Access::Read { addr: read, .. } if *read == addr))
            .count()
    }

    fn check_device(&self, device: PciDeviceAddress) -> Result<()> {
        if device != self.map.pci_address {
            return Err(SmuctlError::PciError(format!("no device at {device}")));
        }
        Ok(())
    }

    fn read_response(&self, state: &mut State) -> u32 {
        let rsp = self.map.rsp_address;
        if let Some(reply) = state.pending.as_mut() {
            if reply.delay > 0 {
                reply.delay -= 1;
                return 0;
            }
        }

        match state.pending.take() {
            Some(reply) => {
                state.registers.insert(rsp, reply.status as u32);
                if reply.status == 0x01 {
                    state.registers.insert(self.map.arg_address, reply.result);
                }
                reply.status as u32
            }
            None => state.registers.get(&rsp).copied().unwrap_or(0),
        }
    }
}

impl PciConfigAccess for FakePlatform {
    fn read_config(&self, device: PciDeviceAddress, offset: u32) -> Result<u32> {
        self.check_device(device)?;
        let mut state = self.state.lock();

        if offset == self.map.index_port {
            return Ok(state.index);
        }
        if offset != self.map.data_port {
            return Ok(0);
        }

        let addr = state.index;
        if state.failing_reads.contains(&addr) {
            return Err(SmuctlError::PciError(format!("injected read fault at 0x{addr:X}")));
        }

        let value = if addr == self.map.rsp_address {
            self.read_response(&mut state)
        } else {
            state.registers.get(&addr).copied().unwrap_or(0)
        };

        state
            .journal
            .push((std::thread::current().id(), Access::Read { addr, value }));
        Ok(value)
    }

    fn write_config(&self, device: PciDeviceAddress, offset: u32, value: u32) -> Result<()> {
        self.check_device(device)?;
        let mut state = self.state.lock();

        if offset == self.map.index_port {
            if state.failing_selects.contains(&value) {
                return Err(SmuctlError::PciError(format!(
                    "injected index fault selecting 0x{value:X}"
                )));
            }
            state.index = value;
            return Ok(());
        }
        if offset != self.map.data_port {
            return Ok(());
        }

        let addr = state.index;
        if state.failing_writes.contains(&addr) {
            return Err(SmuctlError::PciError(format!("injected write fault at 0x{addr:X}")));
        }

        state
            .journal
            .push((std::thread::current().id(), Access::Write { addr, value }));
        state.registers.insert(addr, value);

        if addr == self.map.rsp_address {
            state.pending = None;
        } else if addr == self.map.msg_address {
            let argument = state
                .registers
                .get(&self.map.arg_address)
                .copied()
                .unwrap_or(0);
            let reply = (self.responder)(value, argument);
            state.pending = (reply.status != 0).then_some(reply);
        }

        Ok(())
    }
}

impl CpuidAccess for FakePlatform {
    fn cpuid(&self, leaf: u32) -> Result<CpuidResult> {
        if self.failing_leaves.contains(&leaf) {
            return Err(SmuctlError::CpuidError(format!("injected fault on leaf 0x{leaf:X}")));
        }
        Ok(self.cpuid.get(&leaf).copied().unwrap_or_default())
    }
}

impl MsrAccess for FakePlatform {
    fn read_msr_on(&self, cpu: u32, register: u32) -> Result<(u32, u32)> {
        self.msrs
            .get(&(cpu, register))
            .map(|value| smuctl_raw::msr::split(*value))
            .ok_or_else(|| {
                SmuctlError::MsrError(format!("no MSR 0x{register:X} on CPU {cpu}"))
            })
    }
}
