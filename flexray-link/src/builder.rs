// FlexRay Link Analyzer
// Copyright (c) 2026 The FlexRay Link Analyzer Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `builder` module encodes a frame value into the wire-order bit sequence.
//!
//! The output is the exact mirror of what the sampler and parser consume: TSS, FSS, the
//! BSS-wrapped body with both CRC fields, and the FES. Re-parsing an encoded frame on a
//! clean channel reconstructs the input value.

use flexray_core::bits::{BitBuf, DOMINANT, RECESSIVE};
use flexray_core::checksum::Crc;
use flexray_core::errors::Result;

use crate::frame::{Frame, FLAGS_BITS, FRAME_ID_BITS, CYCLE_BITS, HEADER_CRC_BITS, PAYLOAD_LEN_BITS, FRAME_CRC_BITS, TSS_LEN};

/// Encodes `Frame` values into replayable bit sequences.
///
/// The instance caches its CRC lookup tables; one builder can encode any number of frames.
pub struct FrameBuilder {
    header_crc: Crc,
    frame_crc: Crc,
}

impl FrameBuilder {
    pub fn new() -> Self {
        FrameBuilder { header_crc: Crc::header(), frame_crc: Crc::frame() }
    }

    /// Encodes a validated frame. Fails with `InvalidFrame` if the value violates a
    /// constraint.
    pub fn build(&mut self, frame: &Frame) -> Result<BitBuf> {
        frame.validate()?;

        Ok(self.build_unchecked(frame))
    }

    /// Encodes a frame without validating it first.
    ///
    /// A test generator uses this to put deliberately malformed traffic on the wire, for
    /// example a reserved frame id. The CRC fields are still computed over the encoded
    /// bits, so the output only trips protocol checks, not CRC checks.
    pub fn build_unchecked(&mut self, frame: &Frame) -> BitBuf {
        let body = self.body_bits(frame);

        let mut wire = BitBuf::with_capacity(
            TSS_LEN as usize + 1 + body.len() + body.len() / 4 + 2,
        );

        for _ in 0..TSS_LEN {
            wire.push(DOMINANT);
        }
        wire.push(RECESSIVE);

        wire.extend(body.extend_with_bss().iter());

        wire.push(DOMINANT);
        wire.push(RECESSIVE);

        wire
    }

    /// Builds the BSS-stripped body: header, cycle count, payload, and both CRC fields.
    fn body_bits(&mut self, frame: &Frame) -> BitBuf {
        let mut body = BitBuf::with_capacity(40 + 8 * frame.payload.len() + 24);

        // Reserved bit, indicators, frame id, payload length.
        body.push(false);
        body.push_value(frame.indicator_bits(), FLAGS_BITS);
        body.push_value(u32::from(frame.frame_id), FRAME_ID_BITS);
        body.push_value(u32::from(frame.payload_length()), PAYLOAD_LEN_BITS);

        self.header_crc.reset();
        self.header_crc.process_bits(body.iter());
        body.push_value(self.header_crc.crc(), HEADER_CRC_BITS);

        body.push_value(u32::from(frame.cycle_count), CYCLE_BITS);

        for &byte in &frame.payload {
            body.push_value(u32::from(byte), 8);
        }

        self.frame_crc.reset();
        self.frame_crc.process_bits(body.iter());
        body.push_value(self.frame_crc.crc(), FRAME_CRC_BITS);

        body
    }
}

impl Default for FrameBuilder {
    fn default() -> Self {
        FrameBuilder::new()
    }
}

/// Maps a body bit offset to its position in the encoded wire sequence.
///
/// Useful for fault injection: locate a field on the wire and flip one of its bits.
pub fn wire_index_of_body_bit(body_bit: usize) -> usize {
    TSS_LEN as usize + 1 + 10 * (body_bit / 8) + 2 + body_bit % 8
}
