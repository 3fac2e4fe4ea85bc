//! Bit arithmetic for bitfield storage units.
//!
//! Every storage unit is handled as a `u128` holding exactly the unit's bit
//! width. Results are narrowed to a public integer type only at the accessor
//! boundary: units of up to 64 bits yield `Int`/`UInt`, wider units
//! `Int128`/`UInt128`.

use cabi_core::Value;

use crate::layout::BitPlacement;

/// Keep the low `width` bits.
pub fn truncate(bits: u128, width: u32) -> u128 {
    if width >= 128 {
        bits
    } else {
        bits & ((1u128 << width) - 1)
    }
}

/// Interpret the low `width` bits as a two's complement number.
pub fn sign_extend(bits: u128, width: u32) -> i128 {
    if width == 0 {
        return 0;
    }
    if width >= 128 {
        return bits as i128;
    }
    let shift = 128 - width;
    ((bits << shift) as i128) >> shift
}

/// The field's bits, right-aligned.
pub fn extract(storage: u128, bits: BitPlacement) -> u128 {
    (storage >> bits.start()) & bits.mask()
}

/// Replace the field's bits in `storage`, leaving sibling bits alone.
pub fn insert(storage: u128, value: u128, bits: BitPlacement) -> u128 {
    let cleared = storage & !(bits.mask() << bits.start());
    cleared | ((value & bits.mask()) << bits.start())
}

/// Raw bit pattern of an integral value, truncated to `width` bits.
pub fn raw_bits(value: &Value, width: u32) -> Option<u128> {
    value.as_i128().map(|v| truncate(v as u128, width))
}

/// Public value of `bits`.
///
/// `width` is the number of significant bits (the sign bit is bit
/// `width - 1`); `unit_width` picks the output type.
pub fn narrow(bits: u128, width: u32, unit_width: u32, signed: bool) -> Value {
    match (signed, unit_width <= 64) {
        (true, true) => Value::Int(sign_extend(bits, width) as i64),
        (true, false) => Value::Int128(sign_extend(bits, width)),
        (false, true) => Value::UInt(truncate(bits, width) as u64),
        (false, false) => Value::UInt128(truncate(bits, width)),
    }
}
