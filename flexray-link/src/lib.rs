// FlexRay Link Analyzer
// Copyright (c) 2026 The FlexRay Link Analyzer Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! FlexRay (ISO 17458) link-layer frame decoder, encoder, and analyzer.
//!
//! The decode path is a pull-based pipeline: an [`EdgeSource`](edge::EdgeSource) hands
//! timestamped level transitions to the [`Sampler`](sampler::Sampler), which locks onto
//! frames and produces mid-bit samples; the [`FrameParser`](parser::FrameParser) validates
//! the fields and commits annotated records to a
//! [`ResultSink`](flexray_core::record::ResultSink). The
//! [`LinkAnalyzer`](analyzer::LinkAnalyzer) drives the pipeline frame by frame.
//!
//! The encode path runs in reverse: a [`FrameBuilder`](builder::FrameBuilder) turns a
//! [`Frame`](frame::Frame) value into the wire bit sequence, and the [`replay`] module
//! expands it into waveforms and synthetic edge streams for a line driver or for tests.

pub mod analyzer;
pub mod builder;
pub mod edge;
pub mod frame;
pub mod parser;
pub mod replay;
pub mod sampler;

pub use analyzer::{FrameSummary, LinkAnalyzer};
pub use builder::FrameBuilder;
pub use edge::{BufEdges, Edge, EdgeSource};
pub use frame::Frame;
pub use parser::{FrameParser, ParseOutcome};
pub use sampler::{DecoderBit, FrameRun, Sampler, Termination};
