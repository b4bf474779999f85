// FlexRay Link Analyzer
// Copyright (c) 2026 The FlexRay Link Analyzer Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `frame` module defines the semantic frame value and the bit layout of the frame
//! body.
//!
//! The body is the BSS-stripped bit sequence between FSS and FES. All offsets below index
//! into it, wire order, most-significant bit first:
//!
//! ```text
//! bit  0        reserved, transmitted 0, ignored on receive
//! bits 1..5     payload preamble, null frame, sync frame, startup frame
//! bits 5..16    frame id
//! bits 16..23   payload length in 16-bit words
//! bits 23..34   header CRC
//! bits 34..40   cycle count
//! bits 40..     payload bytes, then the 24-bit frame CRC
//! ```

use flexray_core::checksum::Crc;
use flexray_core::errors::{invalid_frame_error, Result};

/// The number of dominant bit times the transmission start sequence spans.
pub const TSS_LEN: u64 = 5;

/// Frame ids occupy 11 bits; id 0 is reserved.
pub const MAX_FRAME_ID: u16 = 2047;

/// The cycle counter occupies 6 bits.
pub const MAX_CYCLE_COUNT: u8 = 63;

/// The payload length field counts 16-bit words in 7 bits.
pub const MAX_PAYLOAD_WORDS: u8 = 127;

/// Bit offset of the four indicator bits within the body.
pub const FLAGS_POS: usize = 1;
pub const FLAGS_BITS: u32 = 4;

/// Bit offset and width of the frame id.
pub const FRAME_ID_POS: usize = 5;
pub const FRAME_ID_BITS: u32 = 11;

/// Bit offset and width of the payload length.
pub const PAYLOAD_LEN_POS: usize = 16;
pub const PAYLOAD_LEN_BITS: u32 = 7;

/// Bit offset and width of the header CRC. The CRC covers the 23 bits preceding it.
pub const HEADER_CRC_POS: usize = 23;
pub const HEADER_CRC_BITS: u32 = 11;

/// Bit offset and width of the cycle count.
pub const CYCLE_POS: usize = 34;
pub const CYCLE_BITS: u32 = 6;

/// Bit offset of the first payload byte; also the total header length in bits.
pub const PAYLOAD_POS: usize = 40;

/// Width of the frame CRC trailing the payload.
pub const FRAME_CRC_BITS: u32 = 24;

/// The header occupies 5 body bytes, the frame CRC 3.
pub const HEADER_BYTES: usize = 5;
pub const TRAILER_BYTES: usize = 3;

/// The total body length in bytes for a payload of `words` 16-bit words.
pub fn body_bytes(words: u8) -> usize {
    HEADER_BYTES + 2 * usize::from(words) + TRAILER_BYTES
}

/// A `Frame` is the semantic value of one FlexRay frame.
///
/// The CRC fields are not stored; they are a function of the other fields and are computed
/// on demand. A `Frame` is constructed either by a client (to encode) or by the parser (from
/// a decoded body) and is not mutated afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Frame {
    /// 11-bit frame id, 1 to 2047.
    pub frame_id: u16,
    pub payload_preamble: bool,
    pub null_frame: bool,
    pub sync_frame: bool,
    pub startup_frame: bool,
    /// 6-bit communication cycle counter.
    pub cycle_count: u8,
    /// Payload bytes. The length must be even and at most 254.
    pub payload: Vec<u8>,
}

impl Frame {
    /// Checks the value constraints the encoder enforces.
    pub fn validate(&self) -> Result<()> {
        if self.frame_id < 1 || self.frame_id > MAX_FRAME_ID {
            return invalid_frame_error("frame id out of range");
        }

        if self.cycle_count > MAX_CYCLE_COUNT {
            return invalid_frame_error("cycle count out of range");
        }

        if self.payload.len() % 2 != 0 {
            return invalid_frame_error("payload must be a whole number of 16-bit words");
        }

        if self.payload.len() > 2 * usize::from(MAX_PAYLOAD_WORDS) {
            return invalid_frame_error("payload longer than 127 words");
        }

        Ok(())
    }

    /// The payload length in 16-bit words.
    pub fn payload_length(&self) -> u8 {
        (self.payload.len() / 2) as u8
    }

    /// The indicator bits packed `(PP << 3) | (NF << 2) | (SF << 1) | STF`.
    pub fn indicator_bits(&self) -> u32 {
        (u32::from(self.payload_preamble) << 3)
            | (u32::from(self.null_frame) << 2)
            | (u32::from(self.sync_frame) << 1)
            | u32::from(self.startup_frame)
    }

    /// Computes the 11-bit header CRC of this frame.
    pub fn header_crc(&self) -> u32 {
        let mut crc = Crc::header();

        // Reserved bit, indicators, frame id, payload length.
        crc.process_bit(false);
        crc.process_bits((0..FLAGS_BITS).rev().map(|i| self.indicator_bits() >> i & 1 != 0));
        crc.process_bits((0..FRAME_ID_BITS).rev().map(|i| u32::from(self.frame_id) >> i & 1 != 0));
        crc.process_bits(
            (0..PAYLOAD_LEN_BITS).rev().map(|i| u32::from(self.payload_length()) >> i & 1 != 0),
        );

        crc.crc()
    }
}

#[cfg(test)]
mod tests {
    use super::Frame;

    #[test]
    fn verify_validate() {
        let mut frame = Frame { frame_id: 1, ..Default::default() };
        assert!(frame.validate().is_ok());

        frame.frame_id = 0;
        assert!(frame.validate().is_err());

        frame.frame_id = 2047;
        assert!(frame.validate().is_ok());

        frame.frame_id = 2048;
        assert!(frame.validate().is_err());

        frame = Frame { frame_id: 9, cycle_count: 64, ..Default::default() };
        assert!(frame.validate().is_err());

        frame = Frame { frame_id: 9, payload: vec![0x11], ..Default::default() };
        assert!(frame.validate().is_err());

        frame.payload = vec![0; 254];
        assert!(frame.validate().is_ok());

        frame.payload = vec![0; 256];
        assert!(frame.validate().is_err());
    }

    #[test]
    fn verify_indicator_bits() {
        let frame = Frame { frame_id: 5, sync_frame: true, ..Default::default() };

        assert_eq!(frame.indicator_bits(), 0b0010);
        assert_eq!(frame.payload_length(), 0);
    }

    #[test]
    fn verify_header_crc_vector() {
        // Sync frame, id 0x005, empty payload: CRC over 00010 00000000101 0000000.
        let frame = Frame { frame_id: 0x005, sync_frame: true, ..Default::default() };

        assert_eq!(frame.header_crc(), 0x1ad);
    }
}
