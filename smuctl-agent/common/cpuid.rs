/// Execute CPUID on the current CPU, returning (EAX, EBX, ECX, EDX)
#[cfg(target_arch = "x86_64")]
pub fn cpuid(leaf: u32, subleaf: u32) -> (u32, u32, u32, u32) {
    let mut ebx: u32;
    let mut edx: u32;
    let mut eax = leaf;
    let mut ecx = subleaf;

    // RBX is reserved by LLVM and has to be saved around the instruction
    unsafe {
        std::arch::asm!(
            "mov {0:r}, rbx",
            "cpuid",
            "xchg {0:r}, rbx",
            out(reg) ebx,
            inout("eax") eax,
            inout("ecx") ecx,
            out("edx") edx,
            options(nostack, preserves_flags)
        );
    }

    (eax, ebx, ecx, edx)
}

#[cfg(not(target_arch = "x86_64"))]
pub fn cpuid(_leaf: u32, _subleaf: u32) -> (u32, u32, u32, u32) {
    (0, 0, 0, 0)
}

pub const fn is_supported() -> bool {
    cfg!(target_arch = "x86_64")
}

/// Whether the vendor string of leaf 0 reads "AuthenticAMD"
pub fn is_amd() -> bool {
    if !is_supported() {
        return false;
    }
    let (_, ebx, ecx, edx) = cpuid(0, 0);
    let mut vendor = [0u8; 12];
    vendor[0..4].copy_from_slice(&ebx.to_le_bytes());
    vendor[4..8].copy_from_slice(&edx.to_le_bytes());
    vendor[8..12].copy_from_slice(&ecx.to_le_bytes());
    &vendor == b"AuthenticAMD"
}
