//! Arithmetic and address helpers shared by the semantic handlers.

#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss
)]

/// Computes `base + imm` without wrapping, so negative results stay negative.
#[must_use]
pub fn effective_address(base: u32, imm: i16) -> i64 {
    i64::from(base) + i64::from(imm)
}

/// Branch target: `pc + 4 * imm`, wrapping.
#[must_use]
pub const fn branch_target(pc: u32, imm: i16) -> u32 {
    pc.wrapping_add_signed(imm as i32 * 4)
}

/// Signed 32x32 -> 64 product split into `(hi, lo)`.
#[must_use]
pub fn signed_product(lhs: u32, rhs: u32) -> (u32, u32) {
    let product = i64::from(lhs as i32) * i64::from(rhs as i32);
    split_u64(product as u64)
}

/// Unsigned 32x32 -> 64 product split into `(hi, lo)`.
#[must_use]
pub fn unsigned_product(lhs: u32, rhs: u32) -> (u32, u32) {
    split_u64(u64::from(lhs) * u64::from(rhs))
}

/// Signed division as `(hi, lo)` = `(remainder, quotient)`.
///
/// A zero divisor yields `(dividend, 0)`; `i32::MIN / -1` wraps.
#[must_use]
pub const fn signed_divide(dividend: u32, divisor: u32) -> (u32, u32) {
    if divisor == 0 {
        return (dividend, 0);
    }
    let (n, d) = (dividend as i32, divisor as i32);
    (n.wrapping_rem(d) as u32, n.wrapping_div(d) as u32)
}

/// Unsigned division as `(hi, lo)` = `(remainder, quotient)`.
///
/// A zero divisor yields `(dividend, 0)`.
#[must_use]
pub const fn unsigned_divide(dividend: u32, divisor: u32) -> (u32, u32) {
    if divisor == 0 {
        return (dividend, 0);
    }
    (dividend % divisor, dividend / divisor)
}

const fn split_u64(value: u64) -> (u32, u32) {
    ((value >> 32) as u32, value as u32)
}
