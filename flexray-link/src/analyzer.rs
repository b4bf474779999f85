// FlexRay Link Analyzer
// Copyright (c) 2026 The FlexRay Link Analyzer Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `analyzer` module ties the pipeline together: edges in, annotated records out.
//!
//! The pipeline is single-threaded and pull-based. The sampler pulls edges from the
//! source, the parser consumes the sampler's frame runs, and the sink receives records
//! synchronously. The only point that can wait is the edge source itself; a host may run
//! the whole analyzer on a dedicated thread or feed it from an interrupt-fed queue.

use flexray_core::config::ChannelConfig;
use flexray_core::errors::Result;
use flexray_core::record::{PacketId, ResultSink};

use log::{info, trace};

use crate::edge::EdgeSource;
use crate::frame::Frame;
use crate::parser::FrameParser;
use crate::sampler::{Sampler, Termination};

/// A `FrameSummary` reports one frame-level outcome of the analysis.
#[derive(Clone, Debug)]
pub struct FrameSummary {
    /// The committed packet grouping the frame's records, when the frame completed.
    pub packet: Option<PacketId>,
    /// The reassembled frame value, when the frame completed with legal field values.
    pub frame: Option<Frame>,
    pub termination: Termination,
}

/// The link-layer analyzer for one captured channel.
pub struct LinkAnalyzer<E: EdgeSource, S: ResultSink> {
    sampler: Sampler<E>,
    parser: FrameParser,
    sink: S,
}

impl<E: EdgeSource, S: ResultSink> LinkAnalyzer<E, S> {
    /// Creates an analyzer over a validated channel configuration.
    pub fn new(config: &ChannelConfig, edges: E, sink: S) -> Self {
        info!(
            "analyzing channel {} at {} bit/s, {} Hz capture{}",
            config.channel,
            config.bit_rate,
            config.sample_rate,
            if config.inverted { ", inverted" } else { "" },
        );

        LinkAnalyzer { sampler: Sampler::new(config, edges), parser: FrameParser::new(), sink }
    }

    /// Analyzes the next frame on the wire. Returns `None` once the capture is exhausted.
    ///
    /// Every record of the returned frame has been delivered to the sink before this call
    /// returns; records of distinct frames never interleave.
    pub fn next_frame(&mut self) -> Result<Option<FrameSummary>> {
        let run = match self.sampler.next_run()? {
            Some(run) => run,
            None => return Ok(None),
        };

        let outcome = self.parser.parse_run(&run, &mut self.sink);

        trace!("frame finished: {:?}", outcome.termination);

        Ok(Some(FrameSummary {
            packet: outcome.packet,
            frame: outcome.frame,
            termination: outcome.termination,
        }))
    }

    /// Analyzes the remainder of the capture.
    pub fn run_to_end(&mut self) -> Result<Vec<FrameSummary>> {
        let mut summaries = Vec::new();

        while let Some(summary) = self.next_frame()? {
            summaries.push(summary);
        }

        Ok(summaries)
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

#[cfg(test)]
mod tests {
    use flexray_core::config::ChannelConfig;
    use flexray_core::record::MemorySink;

    use super::LinkAnalyzer;
    use crate::builder::FrameBuilder;
    use crate::edge::BufEdges;
    use crate::frame::Frame;
    use crate::replay::{edges_from_levels, idle_levels, levels_from_bits};
    use crate::sampler::Termination;

    #[test]
    fn verify_two_frames_round_trip() {
        let first = Frame { frame_id: 10, cycle_count: 1, payload: vec![0xca, 0xfe], ..Default::default() };
        let second = Frame { frame_id: 11, cycle_count: 2, ..Default::default() };

        let mut builder = FrameBuilder::new();

        let mut levels = idle_levels(12, 10);
        levels.extend(levels_from_bits(&builder.build(&first).unwrap(), 10));
        levels.extend(idle_levels(12, 10));
        levels.extend(levels_from_bits(&builder.build(&second).unwrap(), 10));
        levels.extend(idle_levels(12, 10));

        let config = ChannelConfig::new(0, 2_500_000, 25_000_000, false).unwrap();

        let mut analyzer = LinkAnalyzer::new(
            &config,
            BufEdges::new(edges_from_levels(&levels, 0, false)),
            MemorySink::new(),
        );

        let summaries = analyzer.run_to_end().unwrap();

        assert_eq!(summaries.len(), 2);
        assert!(summaries.iter().all(|s| s.termination == Termination::Completed));
        assert_eq!(summaries[0].frame.as_ref(), Some(&first));
        assert_eq!(summaries[1].frame.as_ref(), Some(&second));
        assert_eq!(summaries[0].packet, Some(0));
        assert_eq!(summaries[1].packet, Some(1));
    }
}
