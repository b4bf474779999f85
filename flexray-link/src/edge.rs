// FlexRay Link Analyzer
// Copyright (c) 2026 The FlexRay Link Analyzer Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `edge` module defines the abstract edge stream the sampler consumes.
//!
//! The capture layer (hardware trigger unit, logic-analyzer export, or the replay
//! generator) produces `Edge` records in non-decreasing sample order; the sampler pulls
//! them one at a time. This is the only point where the pipeline can wait for input.

use flexray_core::errors::Result;
use flexray_core::units::SampleIndex;

/// An `Edge` records the channel level from one capture sample onward.
///
/// Edges usually mark transitions, but a source may also emit an edge restating the current
/// level, for example to establish the level at the start of a capture.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Edge {
    /// The capture sample the level takes effect at.
    pub sample: SampleIndex,
    /// The new physical level. The recessive/dominant meaning depends on the channel's
    /// polarity configuration.
    pub level: bool,
    /// The pulse width since the previous edge, when the capture layer provides it.
    pub width: Option<u64>,
}

impl Edge {
    pub fn new(sample: SampleIndex, level: bool) -> Self {
        Edge { sample, level, width: None }
    }
}

/// An `EdgeSource` hands out the edges of one channel in capture order.
///
/// `Ok(None)` means the capture ended; a host enforcing an idle timeout reports expiry the
/// same way. A blocking implementation may wait inside `next_edge`; the rest of the
/// pipeline performs no I/O.
pub trait EdgeSource {
    fn next_edge(&mut self) -> Result<Option<Edge>>;
}

/// A `BufEdges` source replays a buffered capture. The reference `EdgeSource` for tests and
/// offline analysis.
pub struct BufEdges {
    edges: Vec<Edge>,
    pos: usize,
}

impl BufEdges {
    pub fn new(edges: Vec<Edge>) -> Self {
        BufEdges { edges, pos: 0 }
    }
}

impl EdgeSource for BufEdges {
    fn next_edge(&mut self) -> Result<Option<Edge>> {
        let edge = self.edges.get(self.pos).copied();

        if edge.is_some() {
            self.pos += 1;
        }

        Ok(edge)
    }
}
