// FlexRay Link Analyzer
// Copyright (c) 2026 The FlexRay Link Analyzer Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end scenarios: encoded frames replayed through the sampler and parser.

use flexray_core::config::ChannelConfig;
use flexray_core::record::{FieldKind, FieldRecord, MemorySink, RecordFlags};

use flexray_link::builder::{wire_index_of_body_bit, FrameBuilder};
use flexray_link::edge::BufEdges;
use flexray_link::frame::{Frame, HEADER_CRC_POS, TSS_LEN};
use flexray_link::replay::{edges_from_levels, idle_levels, levels_from_bits};
use flexray_link::sampler::Termination;
use flexray_link::{FrameSummary, LinkAnalyzer};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

const SPB: u64 = 10;
const IDLE_BITS: u64 = 12;

fn config(inverted: bool) -> ChannelConfig {
    ChannelConfig::new(0, 2_500_000, 25_000_000, inverted).unwrap()
}

/// Encodes the frames onto one capture, idle gaps before, between, and after.
fn capture(frames: &[Frame]) -> Vec<bool> {
    let mut builder = FrameBuilder::new();
    let mut levels = idle_levels(IDLE_BITS, SPB);

    for frame in frames {
        levels.extend(levels_from_bits(&builder.build(frame).unwrap(), SPB));
        levels.extend(idle_levels(IDLE_BITS, SPB));
    }

    levels
}

/// Runs the analyzer over a logical level sequence.
fn analyze(levels: &[bool], inverted: bool) -> (Vec<FrameSummary>, MemorySink) {
    let edges = BufEdges::new(edges_from_levels(levels, 0, inverted));

    let mut analyzer = LinkAnalyzer::new(&config(inverted), edges, MemorySink::new());

    let summaries = analyzer.run_to_end().unwrap();

    (summaries, analyzer.into_sink())
}

/// Flips one encoded bit cell of the first frame in a capture.
fn flip_cell(levels: &mut [bool], wire_index: usize) {
    let start = ((IDLE_BITS + wire_index as u64) * SPB) as usize;

    for level in &mut levels[start..start + SPB as usize] {
        *level = !*level;
    }
}

fn value_records(sink: &MemorySink) -> Vec<FieldRecord> {
    sink.records()
        .iter()
        .filter(|r| {
            !matches!(r.kind, FieldKind::Tss | FieldKind::Fss | FieldKind::Bss | FieldKind::Fes)
        })
        .copied()
        .collect()
}

fn s1_frame() -> Frame {
    Frame { frame_id: 0x005, sync_frame: true, ..Default::default() }
}

#[test]
fn s1_minimal_sync_frame() {
    let frame = s1_frame();

    // The encoded stream begins with the TSS run and the recessive FSS bit.
    let wire = FrameBuilder::new().build(&frame).unwrap();

    for i in 0..TSS_LEN as usize {
        assert_eq!(wire.get(i), Some(false));
    }
    assert_eq!(wire.get(TSS_LEN as usize), Some(true));

    let (summaries, sink) = analyze(&capture(&[frame.clone()]), false);

    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].termination, Termination::Completed);
    assert_eq!(summaries[0].frame.as_ref(), Some(&frame));

    let values = value_records(&sink);

    let expect = [
        (FieldKind::Flags, 2),
        (FieldKind::FrameId, 0x005),
        (FieldKind::PayloadLength, 0),
        (FieldKind::HeaderCrc, frame.header_crc()),
        (FieldKind::CycleCount, 0),
    ];

    for (record, (kind, data1)) in values.iter().zip(expect) {
        assert_eq!(record.kind, kind);
        assert_eq!(record.data1, data1);
    }

    assert_eq!(values.len(), 6);
    assert_eq!(values[5].kind, FieldKind::FrameCrc);
    assert!(values.iter().all(|r| !r.flags.contains(RecordFlags::CRC_ERROR)));
}

#[test]
fn s2_header_crc_corruption() {
    let mut levels = capture(&[s1_frame()]);

    // Flip one bit inside the header CRC field on the wire.
    flip_cell(&mut levels, wire_index_of_body_bit(HEADER_CRC_POS + 2));

    let (summaries, sink) = analyze(&levels, false);

    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].termination, Termination::Completed);

    let values = value_records(&sink);

    // The record set is the same as the clean run; only flags differ.
    let kinds: Vec<FieldKind> = values.iter().map(|r| r.kind).collect();
    assert_eq!(
        kinds,
        vec![
            FieldKind::Flags,
            FieldKind::FrameId,
            FieldKind::PayloadLength,
            FieldKind::HeaderCrc,
            FieldKind::CycleCount,
            FieldKind::FrameCrc,
        ]
    );

    for record in &values {
        match record.kind {
            // The corrupted field no longer matches the CRC computed over the header.
            FieldKind::HeaderCrc => assert!(record.flags.contains(RecordFlags::CRC_ERROR)),
            // The frame CRC covers the header CRC field, so it trips as well.
            FieldKind::FrameCrc => assert!(record.flags.contains(RecordFlags::CRC_ERROR)),
            _ => assert_eq!(record.flags, RecordFlags::empty()),
        }
    }
}

#[test]
fn s3_bss_violation_mid_frame() {
    let mut levels = capture(&[s1_frame()]);

    // Flip the dominant BSS bit before the fifth body byte to recessive.
    flip_cell(&mut levels, TSS_LEN as usize + 1 + 10 * 4);

    let (summaries, sink) = analyze(&levels, false);

    assert_eq!(summaries.len(), 1);
    assert!(matches!(summaries[0].termination, Termination::Sync(_)));
    assert!(summaries[0].packet.is_none());
    assert!(summaries[0].frame.is_none());

    // The fields decoded before the violation were delivered, nothing after it.
    let observed: Vec<FieldKind> = sink
        .observed()
        .iter()
        .filter(|r| {
            !matches!(r.kind, FieldKind::Tss | FieldKind::Fss | FieldKind::Bss | FieldKind::Fes)
        })
        .map(|r| r.kind)
        .collect();

    assert_eq!(observed, vec![FieldKind::Flags, FieldKind::FrameId, FieldKind::PayloadLength]);

    // The abandoned packet leaves nothing durable in the sink.
    assert!(sink.records().is_empty());
    assert!(sink.packets().is_empty());
}

#[test]
fn s4_back_to_back_frames_with_idle() {
    let first = Frame { frame_id: 0x005, sync_frame: true, ..Default::default() };
    let second = Frame { frame_id: 0x006, cycle_count: 1, payload: vec![0xab, 0xcd], ..Default::default() };

    let (summaries, sink) = analyze(&capture(&[first.clone(), second.clone()]), false);

    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].frame.as_ref(), Some(&first));
    assert_eq!(summaries[1].frame.as_ref(), Some(&second));

    // Packets partition the record stream: every record of the first frame precedes every
    // record of the second.
    let n_first = sink.packets()[0].1;
    let records = sink.records();

    let first_end = records[n_first - 1].end_sample;
    let second_start = records[n_first].start_sample;

    assert!(records[..n_first].iter().all(|r| r.end_sample <= first_end));
    assert!(second_start >= first_end + IDLE_BITS * SPB);

    // Record delivery is globally ordered by start sample.
    for pair in records.windows(2) {
        assert!(pair[0].start_sample <= pair[1].start_sample);
    }
}

#[test]
fn s5_maximum_payload() {
    let frame = Frame {
        frame_id: 0x111,
        cycle_count: 42,
        payload: (0u16..254).map(|b| b as u8).collect(),
        ..Default::default()
    };

    let (summaries, sink) = analyze(&capture(&[frame.clone()]), false);

    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].frame.as_ref(), Some(&frame));

    let data: Vec<FieldRecord> =
        sink.records().iter().filter(|r| r.kind == FieldKind::DataByte).copied().collect();

    assert_eq!(data.len(), 254);

    for (k, record) in data.iter().enumerate() {
        assert_eq!(record.data1, k as u32);
        assert_eq!(record.data2, k as u32);
        assert_eq!(record.flags, RecordFlags::empty());
    }

    let frame_crc = sink.records().iter().find(|r| r.kind == FieldKind::FrameCrc).unwrap();
    assert!(!frame_crc.flags.contains(RecordFlags::CRC_ERROR));
}

#[test]
fn s6_inverted_channel() {
    let levels = capture(&[s1_frame()]);

    let (_, normal) = analyze(&levels, false);
    let (_, inverted) = analyze(&levels, true);

    assert!(!normal.records().is_empty());
    assert_eq!(normal.records(), inverted.records());
}

#[test]
fn frame_id_bounds_round_trip() {
    for id in [1u16, 2047] {
        let frame = Frame { frame_id: id, ..Default::default() };

        let (summaries, _) = analyze(&capture(&[frame.clone()]), false);

        assert_eq!(summaries[0].frame.as_ref(), Some(&frame));
    }
}

#[test]
fn frame_id_zero_flags_protocol_error() {
    let frame = Frame { frame_id: 0, ..Default::default() };

    // Only the unchecked encode path emits a reserved id.
    let wire = FrameBuilder::new().build_unchecked(&frame);

    let mut levels = idle_levels(IDLE_BITS, SPB);
    levels.extend(levels_from_bits(&wire, SPB));
    levels.extend(idle_levels(IDLE_BITS, SPB));

    let (summaries, sink) = analyze(&levels, false);

    assert_eq!(summaries[0].termination, Termination::Completed);
    assert!(summaries[0].frame.is_none());

    let id = sink.records().iter().find(|r| r.kind == FieldKind::FrameId).unwrap();

    assert_eq!(id.data1, 0);
    assert!(id.flags.contains(RecordFlags::PROTOCOL_ERROR));

    // The CRCs were computed over the emitted bits and still hold.
    assert!(sink.records().iter().all(|r| !r.flags.contains(RecordFlags::CRC_ERROR)));
}

#[test]
fn null_frame_has_no_data_bytes() {
    let frame = Frame { frame_id: 30, null_frame: true, ..Default::default() };

    let wire = FrameBuilder::new().build(&frame).unwrap();

    // Header and trailer only: nothing of the payload on the wire.
    assert_eq!(wire.len(), TSS_LEN as usize + 1 + 10 * 8 + 2);

    let (summaries, sink) = analyze(&capture(&[frame.clone()]), false);

    assert_eq!(summaries[0].frame.as_ref(), Some(&frame));
    assert!(sink.records().iter().all(|r| r.kind != FieldKind::DataByte));
    assert!(sink.records().iter().all(|r| r.flags == RecordFlags::empty()));
}

#[test]
fn null_frame_with_payload_flags_protocol_error() {
    let frame = Frame { frame_id: 30, null_frame: true, payload: vec![7, 9], ..Default::default() };

    let (summaries, sink) = analyze(&capture(&[frame.clone()]), false);

    assert_eq!(summaries[0].termination, Termination::Completed);

    let length = sink.records().iter().find(|r| r.kind == FieldKind::PayloadLength).unwrap();

    assert_eq!(length.data1, 1);
    assert!(length.flags.contains(RecordFlags::PROTOCOL_ERROR));
}

#[test]
fn records_stay_within_the_capture() {
    let frame = Frame { frame_id: 61, payload: vec![0x55, 0xaa], ..Default::default() };

    let levels = capture(&[frame]);
    let (_, sink) = analyze(&levels, false);

    let last_sample = levels.len() as u64 - 1;

    for record in sink.records() {
        assert!(record.start_sample <= record.end_sample);
        assert!(record.end_sample <= last_sample);
    }
}

#[test]
fn random_frames_round_trip() {
    let mut rng = SmallRng::seed_from_u64(0xf1e8);

    let mut frames = Vec::new();

    for _ in 0..16 {
        let words = rng.gen_range(0..=8u8);

        frames.push(Frame {
            frame_id: rng.gen_range(1..=2047),
            payload_preamble: rng.gen(),
            null_frame: false,
            sync_frame: rng.gen(),
            startup_frame: rng.gen(),
            cycle_count: rng.gen_range(0..=63),
            payload: (0..2 * words).map(|_| rng.gen()).collect(),
        });
    }

    let (summaries, sink) = analyze(&capture(&frames), false);

    assert_eq!(summaries.len(), frames.len());

    for (summary, frame) in summaries.iter().zip(&frames) {
        assert_eq!(summary.termination, Termination::Completed);
        assert_eq!(summary.frame.as_ref(), Some(frame));
    }

    assert!(sink.records().iter().all(|r| !r.flags.contains(RecordFlags::CRC_ERROR)));

    for pair in sink.records().windows(2) {
        assert!(pair[0].start_sample <= pair[1].start_sample);
    }
}
