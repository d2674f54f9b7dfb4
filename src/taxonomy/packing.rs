/// Bit offset of the slot inside a packed side+slot field.
pub const SLOT_SHIFT: u32 = 8;

/// Packs a side code and an ordinal slot into one field: `side + (slot << 8)`.
#[must_use]
pub fn pack_side_slot(side_code: i32, slot: u8) -> i32 {
    side_code + (i32::from(slot) << SLOT_SHIFT)
}

/// Splits a packed field into `(side_code, slot)`.
///
/// The side is the low byte. The slot is the remaining high bits, saturated
/// into `0..=255` so that any integer decodes.
#[must_use]
pub fn unpack_side_slot(field: i32) -> (i32, u8) {
    let side_code = field & 0xFF;
    let high = (field >> SLOT_SHIFT).clamp(0, i32::from(u8::MAX));
    let slot = u8::try_from(high).unwrap_or(u8::MAX);
    (side_code, slot)
}
