// FlexRay Link Analyzer
// Copyright (c) 2026 The FlexRay Link Analyzer Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/// A `CrcSpec` parameterizes a cyclic redundancy check register.
///
/// The register discipline is a plain most-significant-bit-first shift-XOR: for each input
/// bit, if the top bit of the register XORed with the input bit is 1, the register shifts
/// left and XORs with the polynomial, otherwise it only shifts. There is no input or output
/// reflection and no output XOR.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CrcSpec {
    /// Register width in bits. The byte-wise path requires 8 to 32 bits.
    pub width: u32,
    /// The generator polynomial, without the implicit top bit.
    pub poly: u32,
    /// The register value before any input is processed.
    pub init: u32,
}

/// The 11-bit header CRC, covering the five indicator bits, the frame id, and the payload
/// length.
pub const HEADER_CRC: CrcSpec = CrcSpec { width: 11, poly: 0x385, init: 0x01a };

/// The 24-bit frame CRC, covering all header bits, the cycle count, and the payload bytes.
pub const FRAME_CRC: CrcSpec = CrcSpec { width: 24, poly: 0x5d_6dcb, init: 0xfe_dcba };

/// A `Crc` computes the running CRC of a bit or byte sequence for one `CrcSpec`.
///
/// Input may be fed bit-at-a-time for fields that are not byte aligned, or byte-at-a-time
/// through a 256-entry lookup table built at construction. Both routes yield identical
/// output. The table is owned by the instance; there is no process-global state.
pub struct Crc {
    spec: CrcSpec,
    mask: u32,
    table: Box<[u32; 256]>,
    state: u32,
}

impl Crc {
    pub fn new(spec: CrcSpec) -> Self {
        assert!(spec.width >= 8 && spec.width <= 32, "unsupported crc width");

        let mask = if spec.width == 32 { u32::MAX } else { (1 << spec.width) - 1 };

        let mut table = Box::new([0u32; 256]);

        for (value, entry) in table.iter_mut().enumerate() {
            let mut reg = (value as u32) << (spec.width - 8);

            for _ in 0..8 {
                let top = reg >> (spec.width - 1) & 1;

                reg = (reg << 1) & mask;

                if top != 0 {
                    reg ^= spec.poly;
                }
            }

            *entry = reg;
        }

        Crc { spec, mask, table, state: spec.init }
    }

    /// Creates the header CRC register.
    pub fn header() -> Self {
        Crc::new(HEADER_CRC)
    }

    /// Creates the frame CRC register.
    pub fn frame() -> Self {
        Crc::new(FRAME_CRC)
    }

    /// Resets the register to its initial value so the instance can be reused.
    pub fn reset(&mut self) {
        self.state = self.spec.init;
    }

    /// Feeds a single bit into the register.
    #[inline(always)]
    pub fn process_bit(&mut self, bit: bool) {
        let top = self.state >> (self.spec.width - 1) & 1 != 0;

        self.state = (self.state << 1) & self.mask;

        if top != bit {
            self.state ^= self.spec.poly;
        }
    }

    /// Feeds a sequence of bits, wire order, into the register.
    pub fn process_bits<I: IntoIterator<Item = bool>>(&mut self, bits: I) {
        for bit in bits {
            self.process_bit(bit);
        }
    }

    /// Feeds one byte into the register through the lookup table.
    #[inline(always)]
    pub fn process_byte(&mut self, byte: u8) {
        let index = ((self.state >> (self.spec.width - 8)) as u8) ^ byte;

        self.state = ((self.state << 8) & self.mask) ^ self.table[usize::from(index)];
    }

    /// Feeds a buffer of bytes into the register through the lookup table.
    pub fn process_buf_bytes(&mut self, buf: &[u8]) {
        for &byte in buf {
            self.process_byte(byte);
        }
    }

    /// The register value after all input consumed.
    pub fn crc(&self) -> u32 {
        self.state
    }
}
