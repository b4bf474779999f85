// FlexRay Link Analyzer
// Copyright (c) 2026 The FlexRay Link Analyzer Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `parser` module turns frame runs into annotated field records.
//!
//! For every run the parser walks the body fields, validates both CRC fields and the
//! protocol constraints, and commits one record per field to the sink in non-decreasing
//! `start_sample` order, the framing sequences (TSS, FSS, BSS, FES) merged in between.
//! Channel errors never unwind: a corrupted field is flagged on its record and the frame
//! continues; an abandoned run cancels its packet.

use flexray_core::checksum::Crc;
use flexray_core::record::{FieldKind, FieldRecord, PacketId, RecordFlags, ResultSink};
use flexray_core::units::SampleRange;

use log::{debug, trace};

use crate::frame::{
    Frame, CYCLE_BITS, CYCLE_POS, FLAGS_BITS, FLAGS_POS, FRAME_CRC_BITS, FRAME_ID_BITS,
    FRAME_ID_POS, HEADER_CRC_BITS, HEADER_CRC_POS, PAYLOAD_LEN_BITS, PAYLOAD_LEN_POS, PAYLOAD_POS,
};
use crate::sampler::{bits_value, DecoderBit, FrameRun, Termination};

/// The result of parsing one frame run.
#[derive(Clone, Debug)]
pub struct ParseOutcome {
    /// The committed packet, when the frame completed.
    pub packet: Option<PacketId>,
    /// The reassembled frame value, when the frame completed and its fields hold a legal
    /// value. A frame with a CRC error still reassembles; the flags on the committed
    /// records carry the verdict.
    pub frame: Option<Frame>,
    pub termination: Termination,
}

/// The frame parsing state machine.
///
/// The instance caches its CRC lookup tables; one parser serves a whole capture.
pub struct FrameParser {
    header_crc: Crc,
    frame_crc: Crc,
}

impl FrameParser {
    pub fn new() -> Self {
        FrameParser { header_crc: Crc::header(), frame_crc: Crc::frame() }
    }

    /// Parses one run and commits its records. Every record of this run is delivered
    /// before the parser looks at the next run.
    pub fn parse_run<S: ResultSink>(&mut self, run: &FrameRun, sink: &mut S) -> ParseOutcome {
        let values = self.value_records(run);

        sink.open_packet();

        let committed = commit_merged(run, &values, sink);

        trace!("committed {} records", committed);

        let packet = match run.termination {
            Termination::Completed => Some(sink.commit_packet()),
            _ => {
                debug!("cancelling packet: {:?}", run.termination);
                sink.cancel_packet();
                None
            }
        };

        let frame = match run.termination {
            Termination::Completed => reassemble(&run.bits),
            _ => None,
        };

        ParseOutcome { packet, frame, termination: run.termination }
    }

    /// Produces the value-field records of a run, in field order, validation flags set.
    /// A field whose bits were cut off by an abandoned run produces no record.
    fn value_records(&mut self, run: &FrameRun) -> Vec<FieldRecord> {
        let bits = &run.bits;
        let mut records = Vec::new();

        let mut push = |kind, start, width, data2, flags| {
            if let Some((value, range)) = read_field(bits, start, width) {
                records.push(FieldRecord {
                    kind,
                    data1: value,
                    data2,
                    flags,
                    start_sample: range.start,
                    end_sample: range.end,
                });
                Some(value)
            }
            else {
                None
            }
        };

        let indicators = push(FieldKind::Flags, FLAGS_POS, FLAGS_BITS, 0, RecordFlags::empty());

        if let Some(id) = read_value(bits, FRAME_ID_POS, FRAME_ID_BITS) {
            let mut flags = RecordFlags::empty();

            if id == 0 {
                debug!("reserved frame id 0");
                flags |= RecordFlags::PROTOCOL_ERROR;
            }

            push(FieldKind::FrameId, FRAME_ID_POS, FRAME_ID_BITS, 0, flags);
        }

        let words = read_value(bits, PAYLOAD_LEN_POS, PAYLOAD_LEN_BITS);

        if let Some(words) = words {
            let mut flags = RecordFlags::empty();

            // A null frame carries no payload by definition.
            let null_frame = indicators.map_or(false, |ind| ind & 0b0100 != 0);

            if null_frame && words != 0 {
                debug!("null frame with payload length {}", words);
                flags |= RecordFlags::PROTOCOL_ERROR;
            }

            push(FieldKind::PayloadLength, PAYLOAD_LEN_POS, PAYLOAD_LEN_BITS, 0, flags);
        }

        if let Some(received) = read_value(bits, HEADER_CRC_POS, HEADER_CRC_BITS) {
            self.header_crc.reset();
            self.header_crc.process_bits(bits[..HEADER_CRC_POS].iter().map(|bit| bit.value));

            let mut flags = RecordFlags::empty();

            if self.header_crc.crc() != received {
                debug!(
                    "header crc mismatch: computed {:#05x}, received {:#05x}",
                    self.header_crc.crc(),
                    received
                );
                flags |= RecordFlags::CRC_ERROR;
            }

            push(FieldKind::HeaderCrc, HEADER_CRC_POS, HEADER_CRC_BITS, 0, flags);
        }

        push(FieldKind::CycleCount, CYCLE_POS, CYCLE_BITS, 0, RecordFlags::empty());

        if let Some(words) = words {
            let n_payload = 2 * words as usize;

            for k in 0..n_payload {
                push(FieldKind::DataByte, PAYLOAD_POS + 8 * k, 8, k as u32, RecordFlags::empty());
            }

            let crc_pos = PAYLOAD_POS + 8 * n_payload;

            if let Some(received) = read_value(bits, crc_pos, FRAME_CRC_BITS) {
                self.frame_crc.reset();

                for byte in 0..crc_pos / 8 {
                    self.frame_crc.process_byte(bits_value(bits, 8 * byte, 8) as u8);
                }

                let mut flags = RecordFlags::empty();

                if self.frame_crc.crc() != received {
                    debug!(
                        "frame crc mismatch: computed {:#08x}, received {:#08x}",
                        self.frame_crc.crc(),
                        received
                    );
                    flags |= RecordFlags::CRC_ERROR;
                }

                push(FieldKind::FrameCrc, crc_pos, FRAME_CRC_BITS, 0, flags);
            }
        }

        records
    }
}

impl Default for FrameParser {
    fn default() -> Self {
        FrameParser::new()
    }
}

/// Commits the framing-sequence records merged with the value records by `start_sample`.
/// Returns the number of records committed.
fn commit_merged<S: ResultSink>(run: &FrameRun, values: &[FieldRecord], sink: &mut S) -> usize {
    let mut structural = Vec::with_capacity(3 + run.bss.len());

    structural.push(sequence_record(FieldKind::Tss, run.tss, 0));
    structural.push(sequence_record(FieldKind::Fss, run.fss, 0));

    for (i, &range) in run.bss.iter().enumerate() {
        structural.push(sequence_record(FieldKind::Bss, range, i as u32));
    }

    if let Some(range) = run.fes {
        structural.push(sequence_record(FieldKind::Fes, range, 0));
    }

    let mut a = structural.iter().peekable();
    let mut b = values.iter().peekable();
    let mut committed = 0;

    loop {
        let take_structural = match (a.peek(), b.peek()) {
            (Some(s), Some(v)) => s.start_sample <= v.start_sample,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => break,
        };

        let record = if take_structural { a.next() } else { b.next() };

        sink.commit(*record.unwrap());
        committed += 1;
    }

    committed
}

fn sequence_record(kind: FieldKind, range: SampleRange, data2: u32) -> FieldRecord {
    FieldRecord {
        kind,
        data1: 0,
        data2,
        flags: RecordFlags::empty(),
        start_sample: range.start,
        end_sample: range.end,
    }
}

/// Reads a field's value when all of its bits were decoded.
fn read_value(bits: &[DecoderBit], start: usize, width: u32) -> Option<u32> {
    if start + width as usize <= bits.len() {
        Some(bits_value(bits, start, width))
    }
    else {
        None
    }
}

/// Reads a field's value and its sample range when all of its bits were decoded.
fn read_field(bits: &[DecoderBit], start: usize, width: u32) -> Option<(u32, SampleRange)> {
    let value = read_value(bits, start, width)?;

    let range = SampleRange::new(
        bits[start].start_sample,
        bits[start + width as usize - 1].end_sample,
    );

    Some((value, range))
}

/// Reassembles the semantic frame value from a completed body. Returns `None` when the
/// fields do not form a legal value (for example a reserved frame id).
fn reassemble(bits: &[DecoderBit]) -> Option<Frame> {
    let indicators = read_value(bits, FLAGS_POS, FLAGS_BITS)?;
    let frame_id = read_value(bits, FRAME_ID_POS, FRAME_ID_BITS)?;
    let words = read_value(bits, PAYLOAD_LEN_POS, PAYLOAD_LEN_BITS)?;
    let cycle_count = read_value(bits, CYCLE_POS, CYCLE_BITS)?;

    let mut payload = Vec::with_capacity(2 * words as usize);

    for k in 0..2 * words as usize {
        payload.push(read_value(bits, PAYLOAD_POS + 8 * k, 8)? as u8);
    }

    let frame = Frame {
        frame_id: frame_id as u16,
        payload_preamble: indicators & 0b1000 != 0,
        null_frame: indicators & 0b0100 != 0,
        sync_frame: indicators & 0b0010 != 0,
        startup_frame: indicators & 0b0001 != 0,
        cycle_count: cycle_count as u8,
        payload,
    };

    frame.validate().ok()?;

    Some(frame)
}
