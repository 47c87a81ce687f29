//! Payment crypto primitives: DES/3DES block helpers, key parity and
//! check values, Visa verification values, and EMV key derivation and
//! application cryptograms.

pub mod emv;

mod kcv;
mod parity;
mod tdes;
mod visa;

pub use kcv::*;
pub use parity::*;
pub use tdes::*;
pub use visa::*;

#[cfg(test)]
mod tests;
