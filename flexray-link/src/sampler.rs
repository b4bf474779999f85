// FlexRay Link Analyzer
// Copyright (c) 2026 The FlexRay Link Analyzer Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `sampler` module converts a timestamped edge stream into mid-bit samples grouped
//! into per-frame runs.
//!
//! The sampler hunts for bus idle, locks onto the TSS/FSS start sequence, aligns its bit
//! clock on the FSS, and then walks the frame byte-by-byte: a BSS before every byte (whose
//! dominant-to-recessive transition re-aligns the clock), eight data bits sampled at
//! mid-cell, and finally the FES once the expected byte count has been consumed. The
//! payload length field of the decoded header determines that count.

use flexray_core::bits::{DOMINANT, RECESSIVE};
use flexray_core::config::ChannelConfig;
use flexray_core::errors::Result;
use flexray_core::units::{Monotonic, SampleIndex, SampleRange};

use log::{debug, trace};

use crate::edge::{Edge, EdgeSource};
use crate::frame::{body_bytes, PAYLOAD_LEN_BITS, PAYLOAD_LEN_POS, TSS_LEN};

/// A continuous recessive level of this many bit times is bus idle.
pub const MIN_IDLE_LEN: u64 = 9;

/// A `DecoderBit` is one physical bit sampled at mid-cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DecoderBit {
    /// First capture sample of the bit cell.
    pub start_sample: SampleIndex,
    /// Last capture sample of the bit cell.
    pub end_sample: SampleIndex,
    /// The level read at the sample point; a data bit of value 1 is recessive.
    pub value: bool,
}

/// How a frame run ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Termination {
    /// The expected byte count was consumed and a valid FES observed.
    Completed,
    /// A BSS or FES pattern was violated; the run holds the bits decoded up to the
    /// violation.
    Sync(&'static str),
    /// The bus went idle before the expected byte count was consumed.
    Idle,
}

/// A `FrameRun` is one locked-on frame: the BSS-stripped body bits plus the sample ranges
/// of the framing sequences around them.
#[derive(Clone, Debug)]
pub struct FrameRun {
    pub tss: SampleRange,
    pub fss: SampleRange,
    /// One range per decoded byte, covering the two BSS bit cells.
    pub bss: Vec<SampleRange>,
    /// The body bits in wire order, eight per decoded byte.
    pub bits: Vec<DecoderBit>,
    pub fes: Option<SampleRange>,
    pub termination: Termination,
}

/// Outcome of reading one `{dominant, recessive}` start pair (BSS or FES).
enum Pair {
    Seq {
        range: SampleRange,
        /// Start of the first bit cell after the pair, re-aligned to the observed
        /// dominant-to-recessive transition.
        next_origin: SampleIndex,
    },
    Fault(Fault),
}

enum Fault {
    /// The bus is idle where the pair was expected.
    Idle,
    /// The first bit of the pair sampled recessive.
    ExpectedDominant,
    /// No dominant-to-recessive transition within half a bit of its nominal position.
    MissingRecessive,
    /// The second bit of the pair sampled dominant again.
    CorruptRecessive,
    /// The capture ended while the line was dominant.
    CaptureEnded,
}

/// The edge-driven bit sampler for one channel.
pub struct Sampler<E: EdgeSource> {
    edges: E,
    /// Bit cell length in capture samples.
    spb: u64,
    inverted: bool,
    /// Logical level in effect since `level_since`. The bus is assumed recessive before
    /// the first edge.
    level: bool,
    level_since: SampleIndex,
    ahead: Option<Edge>,
    guard: Monotonic,
    ended: bool,
}

impl<E: EdgeSource> Sampler<E> {
    pub fn new(config: &ChannelConfig, edges: E) -> Self {
        Sampler {
            edges,
            spb: config.samples_per_bit(),
            inverted: config.inverted,
            level: RECESSIVE,
            level_since: 0,
            ahead: None,
            guard: Monotonic::new(),
            ended: false,
        }
    }

    /// Pulls the next edge into the lookahead, mapping polarity and checking edge order.
    fn fetch(&mut self) -> Result<()> {
        if let Some(mut edge) = self.edges.next_edge()? {
            self.guard.observe(edge.sample)?;
            edge.level ^= self.inverted;
            self.ahead = Some(edge);
        }
        else {
            self.ended = true;
        }

        Ok(())
    }

    /// Applies every edge up to and including `sample` and returns the level there.
    fn advance_to(&mut self, sample: SampleIndex) -> Result<bool> {
        loop {
            if self.ahead.is_none() && !self.ended {
                self.fetch()?;
            }

            match self.ahead {
                Some(edge) if edge.sample <= sample => {
                    if edge.level != self.level {
                        self.level = edge.level;
                        self.level_since = edge.sample;
                    }
                    self.ahead = None;
                }
                _ => return Ok(self.level),
            }
        }
    }

    /// Peeks the next level change without applying it. Edges restating the current level
    /// are discarded.
    fn peek_change(&mut self) -> Result<Option<Edge>> {
        loop {
            if self.ahead.is_none() && !self.ended {
                self.fetch()?;
            }

            match self.ahead {
                None => return Ok(None),
                Some(edge) if edge.level == self.level => self.ahead = None,
                Some(edge) => return Ok(Some(edge)),
            }
        }
    }

    /// Produces the next frame run, or `None` once the capture is exhausted.
    pub fn next_run(&mut self) -> Result<Option<FrameRun>> {
        loop {
            let tss_start = match self.hunt_tss_start()? {
                Some(sample) => sample,
                None => return Ok(None),
            };

            // Measure the dominant run. It must span at least TSS_LEN bit times, less
            // half a bit of jitter tolerance.
            let fss_start = match self.peek_change()? {
                Some(edge) => edge.sample,
                None => return Ok(None),
            };

            let run = fss_start - tss_start;
            self.advance_to(fss_start)?;

            if run + self.spb / 2 < TSS_LEN * self.spb {
                trace!("dominant pulse of {} samples too short for tss", run);
                continue;
            }

            // The mid-point of the FSS bit is the first sample point; the bit clock is
            // aligned to the TSS-to-FSS transition.
            if self.advance_to(fss_start + self.spb / 2)? != RECESSIVE {
                debug!("fss corrupted at sample {}, resuming idle hunt", fss_start);
                continue;
            }

            let tss = SampleRange::new(tss_start, fss_start - 1);
            let fss = SampleRange::new(fss_start, fss_start + self.spb - 1);

            trace!("locked on at sample {}, tss of {} samples", fss_start, run);

            return self.read_frame(tss, fss, fss_start + self.spb).map(Some);
        }
    }

    /// Scans for a dominant edge preceded by at least `MIN_IDLE_LEN` bit times of
    /// recessive level. Returns the sample the dominant run starts at.
    fn hunt_tss_start(&mut self) -> Result<Option<SampleIndex>> {
        let idle = MIN_IDLE_LEN * self.spb;

        loop {
            if self.level == DOMINANT {
                match self.peek_change()? {
                    Some(edge) => self.advance_to(edge.sample)?,
                    None => return Ok(None),
                };
                continue;
            }

            let idle_start = self.level_since;

            match self.peek_change()? {
                None => return Ok(None),
                Some(edge) => {
                    let run = edge.sample - idle_start;
                    self.advance_to(edge.sample)?;

                    if run >= idle {
                        return Ok(Some(edge.sample));
                    }

                    trace!("recessive run of {} samples is not idle, hunting on", run);
                }
            }
        }
    }

    /// Decodes bytes until the expected count is consumed, then checks the FES.
    fn read_frame(
        &mut self,
        tss: SampleRange,
        fss: SampleRange,
        mut origin: SampleIndex,
    ) -> Result<FrameRun> {
        let mut run = FrameRun {
            tss,
            fss,
            bss: Vec::new(),
            bits: Vec::new(),
            fes: None,
            termination: Termination::Completed,
        };

        let mut expected: Option<usize> = None;

        loop {
            if expected == Some(run.bss.len()) {
                break;
            }

            match self.read_start_pair(origin)? {
                Pair::Seq { range, next_origin } => {
                    run.bss.push(range);

                    for i in 0..8 {
                        let start = next_origin + i * self.spb;
                        let value = self.advance_to(start + self.spb / 2)?;

                        run.bits.push(DecoderBit {
                            start_sample: start,
                            end_sample: start + self.spb - 1,
                            value,
                        });
                    }

                    origin = next_origin + 8 * self.spb;
                }
                Pair::Fault(fault) => {
                    run.termination = match fault {
                        Fault::Idle => Termination::Idle,
                        Fault::ExpectedDominant => Termination::Sync("bss: expected dominant bit"),
                        Fault::MissingRecessive => {
                            Termination::Sync("bss: recessive bit out of position")
                        }
                        Fault::CorruptRecessive => Termination::Sync("bss: recessive bit corrupted"),
                        Fault::CaptureEnded => Termination::Sync("bss: capture ended mid-frame"),
                    };

                    debug!("frame abandoned after {} bytes", run.bss.len());

                    return Ok(run);
                }
            }

            // The payload length field is complete once three bytes are in; it fixes the
            // total byte count of the frame.
            if run.bss.len() == 3 && expected.is_none() {
                let words = bits_value(&run.bits, PAYLOAD_LEN_POS, PAYLOAD_LEN_BITS);
                expected = Some(body_bytes(words as u8));

                trace!("payload length {} words, expecting {} bytes", words, body_bytes(words as u8));
            }
        }

        match self.read_start_pair(origin)? {
            Pair::Seq { range, .. } => {
                run.fes = Some(range);
                run.termination = Termination::Completed;
            }
            Pair::Fault(fault) => {
                run.termination = match fault {
                    Fault::ExpectedDominant | Fault::Idle => {
                        Termination::Sync("fes: expected dominant bit")
                    }
                    Fault::MissingRecessive => Termination::Sync("fes: recessive bit out of position"),
                    Fault::CorruptRecessive => Termination::Sync("fes: recessive bit corrupted"),
                    Fault::CaptureEnded => Termination::Sync("fes: capture ended mid-frame"),
                };
            }
        }

        Ok(run)
    }

    /// Reads one `{dominant, recessive}` pair starting at `origin`, re-aligning the bit
    /// clock to the observed transition. Tolerates up to half a bit of jitter.
    fn read_start_pair(&mut self, origin: SampleIndex) -> Result<Pair> {
        let spb = self.spb;

        if self.advance_to(origin + spb / 2)? == RECESSIVE {
            // Expected a dominant bit. Distinguish a framing slip from the bus going
            // idle under us.
            let idle_start = self.level_since;

            return match self.peek_change()? {
                None => Ok(Pair::Fault(Fault::Idle)),
                Some(edge) if edge.sample - idle_start >= MIN_IDLE_LEN * spb => {
                    Ok(Pair::Fault(Fault::Idle))
                }
                Some(_) => Ok(Pair::Fault(Fault::ExpectedDominant)),
            };
        }

        // The nominal dominant-to-recessive transition sits one bit after origin.
        let nominal = origin + spb;

        match self.peek_change()? {
            None => Ok(Pair::Fault(Fault::CaptureEnded)),
            Some(edge) if edge.sample > nominal + spb / 2 => Ok(Pair::Fault(Fault::MissingRecessive)),
            Some(edge) => {
                let transition = edge.sample;
                self.advance_to(transition)?;

                if self.advance_to(transition + spb / 2)? != RECESSIVE {
                    return Ok(Pair::Fault(Fault::CorruptRecessive));
                }

                Ok(Pair::Seq {
                    range: SampleRange::new(origin, transition + spb - 1),
                    next_origin: transition + spb,
                })
            }
        }
    }
}

/// Reads `n` decoded bits most-significant first starting at `start`.
pub(crate) fn bits_value(bits: &[DecoderBit], start: usize, n: u32) -> u32 {
    debug_assert!(start + n as usize <= bits.len());

    let mut value = 0;

    for bit in &bits[start..start + n as usize] {
        value = (value << 1) | u32::from(bit.value);
    }

    value
}
