//! PIN-block codec.
//!
//! Encoding and decoding of clear PINs into the eleven supported
//! PIN-block formats, dispatched by [`PinBlockFormat`] with the side
//! data each format needs carried in a [`PinContext`]. Encryption of
//! the blocks is the command layer's concern; this module only shapes
//! and validates plaintext blocks.

mod diebold;
mod docutel;
mod fields;
mod format;
mod iso_0;
mod iso_1;
mod iso_2;
mod iso_3;
mod iso_4;
mod plus;
mod visa_1;
mod visa_new_pin;

pub use diebold::*;
pub use docutel::*;
pub use format::*;
pub use iso_0::*;
pub use iso_1::*;
pub use iso_2::*;
pub use iso_3::*;
pub use iso_4::*;
pub use plus::*;
pub use visa_1::*;
pub use visa_new_pin::*;

#[cfg(test)]
mod tests;
