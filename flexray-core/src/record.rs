// FlexRay Link Analyzer
// Copyright (c) 2026 The FlexRay Link Analyzer Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `record` module defines the annotated output records of the analyzer and the sink
//! interface they are delivered through.

use std::fmt;

use log::debug;

use crate::units::SampleIndex;

/// The kind of wire entity a `FieldRecord` annotates.
///
/// The set is closed; `data1` and `data2` semantics per kind are the stable interface
/// between the analyzer and its consumers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FieldKind {
    /// Transmission start sequence, the run of dominant bits opening a frame.
    Tss,
    /// Frame start sequence, the single recessive bit the bit clock aligns on.
    Fss,
    /// Byte start sequence. `data2` is the 0-based index of the byte it precedes.
    Bss,
    /// Frame end sequence.
    Fes,
    /// The four indicator bits. `data1 = (PP << 3) | (NF << 2) | (SF << 1) | STF`.
    Flags,
    /// The 11-bit frame id in `data1`.
    FrameId,
    /// The payload length in 16-bit words in `data1`.
    PayloadLength,
    /// The received 11-bit header CRC in `data1`.
    HeaderCrc,
    /// The 6-bit cycle counter in `data1`.
    CycleCount,
    /// One payload byte: value in `data1`, 0-based payload index in `data2`.
    DataByte,
    /// The received 24-bit frame CRC in `data1`.
    FrameCrc,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            FieldKind::Tss => "TSS",
            FieldKind::Fss => "FSS",
            FieldKind::Bss => "BSS",
            FieldKind::Fes => "FES",
            FieldKind::Flags => "Flags",
            FieldKind::FrameId => "FrameId",
            FieldKind::PayloadLength => "PayloadLength",
            FieldKind::HeaderCrc => "HeaderCrc",
            FieldKind::CycleCount => "CycleCount",
            FieldKind::DataByte => "DataByte",
            FieldKind::FrameCrc => "FrameCrc",
        };

        f.write_str(name)
    }
}

bitflags::bitflags! {
    /// Error bits carried on a `FieldRecord`.
    ///
    /// These annotate recoverable channel conditions; a flagged record is still delivered
    /// and the frame continues.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
    pub struct RecordFlags: u32 {
        /// The received CRC does not match the CRC computed over the covered bits.
        const CRC_ERROR = 0x01;
        /// The field holds an illegal value (frame id 0, or a null frame with a non-zero
        /// payload length).
        const PROTOCOL_ERROR = 0x02;
    }
}

/// A `FieldRecord` is one annotated, timed field of a decoded frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FieldRecord {
    pub kind: FieldKind,
    /// The field's numeric value. For `DataByte`, the byte value.
    pub data1: u32,
    /// Kind-specific auxiliary value. For `DataByte` and `Bss`, the 0-based byte index.
    pub data2: u32,
    pub flags: RecordFlags,
    /// First capture sample covered by the field.
    pub start_sample: SampleIndex,
    /// Last capture sample covered by the field.
    pub end_sample: SampleIndex,
}

/// A `PacketId` identifies one committed frame-level group of records.
pub type PacketId = u64;

/// A `ResultSink` receives the analyzer's output.
///
/// Records arrive through [`commit`](ResultSink::commit) in strictly non-decreasing
/// `start_sample` order, every record of a frame before any record of the next frame. The
/// packet calls group records frame-by-frame: a packet is opened before the first record of
/// a frame and either committed (the frame completed) or cancelled (the frame was abandoned
/// mid-parse; the sink must drop the records delivered since the packet opened). The sink
/// owns durability, display, or export; the analyzer retains nothing it has committed.
pub trait ResultSink {
    /// Appends one record to the in-progress packet.
    fn commit(&mut self, record: FieldRecord);

    /// Marks the start of a frame's records.
    fn open_packet(&mut self);

    /// Finalizes the in-progress packet and returns its id.
    fn commit_packet(&mut self) -> PacketId;

    /// Drops all records of the in-progress packet.
    fn cancel_packet(&mut self);
}

/// A `MemorySink` is the reference `ResultSink`: records are buffered per packet and kept
/// in memory once committed. Suitable for tests and for hosts that post-process a whole
/// capture at once.
#[derive(Default)]
pub struct MemorySink {
    committed: Vec<FieldRecord>,
    pending: Vec<FieldRecord>,
    /// Every record ever handed to `commit`, kept across cancellations.
    observed: Vec<FieldRecord>,
    packets: Vec<(PacketId, usize)>,
    next_packet: PacketId,
    open: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Default::default()
    }

    /// All records of committed packets, in delivery order.
    pub fn records(&self) -> &[FieldRecord] {
        &self.committed
    }

    /// Every record delivered through `commit`, including records of packets that were
    /// later cancelled.
    pub fn observed(&self) -> &[FieldRecord] {
        &self.observed
    }

    /// The committed packets as `(id, record count)` pairs.
    pub fn packets(&self) -> &[(PacketId, usize)] {
        &self.packets
    }
}

impl ResultSink for MemorySink {
    fn commit(&mut self, record: FieldRecord) {
        self.observed.push(record);

        if self.open {
            self.pending.push(record);
        }
        else {
            self.committed.push(record);
        }
    }

    fn open_packet(&mut self) {
        debug_assert!(!self.open, "packet already open");

        self.open = true;
        self.pending.clear();
    }

    fn commit_packet(&mut self) -> PacketId {
        debug_assert!(self.open, "no open packet");

        let id = self.next_packet;
        self.next_packet += 1;

        self.packets.push((id, self.pending.len()));
        self.committed.append(&mut self.pending);
        self.open = false;

        id
    }

    fn cancel_packet(&mut self) {
        if !self.pending.is_empty() {
            debug!("dropping {} records of a cancelled packet", self.pending.len());
        }

        self.pending.clear();
        self.open = false;
    }
}
