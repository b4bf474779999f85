// FlexRay Link Analyzer
// Copyright (c) 2026 The FlexRay Link Analyzer Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

//! # FlexRay Link Analyzer
//!
//! A pure Rust FlexRay (ISO 17458) link-layer analyzer and test generator.
//!
//! A captured single-wire digital signal goes in as a stream of timestamped edges; decoded,
//! field-annotated frame records with precise sample timestamps come out. The mirror-image
//! encode path turns frame values into bit sequences suitable for replay onto a line
//! driver.
//!
//! # Usage
//!
//! The following steps describe a basic decode run:
//!
//! 1.  Build a validated [`ChannelConfig`][core::config::ChannelConfig] for the captured
//!     channel (bit rate, capture sample rate, polarity).
//! 2.  Implement [`EdgeSource`][link::edge::EdgeSource] for your capture layer, or replay a
//!     buffered capture through [`BufEdges`][link::edge::BufEdges].
//! 3.  Implement [`ResultSink`][core::record::ResultSink] for your display or export path,
//!     or collect everything with [`MemorySink`][core::record::MemorySink].
//! 4.  Instantiate a [`LinkAnalyzer`][link::analyzer::LinkAnalyzer] and call
//!     [`next_frame`][link::analyzer::LinkAnalyzer::next_frame] until it returns `None`.
//!
//! To generate traffic instead, encode a [`Frame`][link::frame::Frame] with a
//! [`FrameBuilder`][link::builder::FrameBuilder] and expand the result through the
//! [`replay`][link::replay] module.

pub use flexray_core as core;
pub use flexray_link as link;
