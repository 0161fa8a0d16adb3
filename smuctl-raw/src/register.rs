//! Generic register abstractions for 32-bit SMU and CPUID words

/// Trait for register layouts that can be converted to/from raw 32-bit values
///
/// SMU mailbox arguments and CPUID output registers are all 32 bits wide.
/// Implementors describe one such word as a typed struct.
///
/// # Example
///
/// ```
/// use smuctl_raw::register::RegisterLayout;
///
/// #[derive(Debug, Default)]
/// struct Ready {
///     done: bool,
///     code: u8,
/// }
///
/// impl RegisterLayout for Ready {
///     fn to_raw(&self) -> u32 {
///         u32::from(self.done) | (u32::from(self.code) << 8)
///     }
///
///     fn from_raw(value: u32) -> Self {
///         Self {
///             done: (value & 1) != 0,
///             code: ((value >> 8) & 0xFF) as u8,
///         }
///     }
/// }
///
/// assert_eq!(Ready::from_raw(0x0301).code, 3);
/// ```
pub trait RegisterLayout: Sized {
    /// Convert this register layout to a raw value
    fn to_raw(&self) -> u32;

    /// Parse a raw value into this register layout
    fn from_raw(value: u32) -> Self;

    /// Validate that the field values fit their bit widths
    ///
    /// Returns `Ok(())` if valid, or an error message if invalid.
    fn validate(&self) -> Result<(), &'static str> {
        Ok(())
    }
}

/// Extract `n` bits of `val` starting at bit `offset`
pub const fn get_bits(val: u32, offset: u32, n: u32) -> u32 {
    if n == 0 {
        return 0;
    }
    if n >= 32 {
        return val >> offset;
    }
    (val >> offset) & !(!0u32 << n)
}

/// Replace `n` bits of `val` starting at bit `offset` with `new_value`
pub const fn set_bits(val: u32, offset: u32, n: u32, new_value: u32) -> u32 {
    let field = if n >= 32 { !0u32 } else { (1u32 << n) - 1 };
    (val & !(field << offset)) | ((new_value & field) << offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_bits() {
        assert_eq!(get_bits(0x00800F11, 8, 4), 0xF);
        assert_eq!(get_bits(0x00800F11, 20, 8), 0x08);
        assert_eq!(get_bits(0xFFFF_FFFF, 0, 32), 0xFFFF_FFFF);
        assert_eq!(get_bits(0x1234, 4, 0), 0);
    }

    #[test]
    fn test_set_bits_only_touches_field() {
        let value = set_bits(0xFFFF_FFFF, 4, 4, 0x0);
        assert_eq!(value, 0xFFFF_FF0F);

        let value = set_bits(0, 20, 12, 0xFFFF);
        assert_eq!(value, 0xFFF0_0000);
    }
}
