// FlexRay Link Analyzer
// Copyright (c) 2026 The FlexRay Link Analyzer Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `replay` module expands encoded bit sequences into sample-accurate waveforms and
//! synthetic edge streams.
//!
//! This is the output side of the test generator: a host drives the level sequence onto a
//! line driver, while the analyzer's own tests loop the synthetic edges straight back into
//! the sampler.

use flexray_core::bits::{BitBuf, RECESSIVE};
use flexray_core::units::SampleIndex;

use crate::edge::Edge;

/// Expands a bit sequence into one logical level per capture sample.
pub fn levels_from_bits(bits: &BitBuf, samples_per_bit: u64) -> Vec<bool> {
    let mut levels = Vec::with_capacity(bits.len() * samples_per_bit as usize);

    for bit in bits.iter() {
        levels.extend(std::iter::repeat(bit).take(samples_per_bit as usize));
    }

    levels
}

/// A recessive stretch of `n_bits` bit times.
pub fn idle_levels(n_bits: u64, samples_per_bit: u64) -> Vec<bool> {
    vec![RECESSIVE; (n_bits * samples_per_bit) as usize]
}

/// Reduces a per-sample level sequence to an edge stream.
///
/// The first edge restates the opening level so a capture need not begin recessive; each
/// following edge marks a level change and carries the pulse width since the previous edge.
/// `inverted` maps the logical levels onto an inverted physical channel.
pub fn edges_from_levels(levels: &[bool], start: SampleIndex, inverted: bool) -> Vec<Edge> {
    let mut edges = Vec::new();
    let mut last: Option<(SampleIndex, bool)> = None;

    for (i, &level) in levels.iter().enumerate() {
        let sample = start + i as u64;
        let physical = level ^ inverted;

        match last {
            None => {
                edges.push(Edge::new(sample, physical));
                last = Some((sample, level));
            }
            Some((since, prev)) if prev != level => {
                edges.push(Edge { sample, level: physical, width: Some(sample - since) });
                last = Some((sample, level));
            }
            Some(_) => (),
        }
    }

    edges
}
