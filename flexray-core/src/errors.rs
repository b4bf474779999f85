// FlexRay Link Analyzer
// Copyright (c) 2026 The FlexRay Link Analyzer Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `errors` module defines the common error type.

use std::error;
use std::fmt;
use std::result;

/// `Error` provides an enumeration of all possible errors reported by the analyzer.
///
/// Only conditions that terminate an operation are represented here. Recoverable channel
/// conditions (a corrupted CRC, an illegal field value, a framing slip) never unwind; they
/// annotate the emitted records or the per-frame termination instead.
#[derive(Debug)]
pub enum Error {
    /// A frame value handed to the encoder violates a value constraint. Fatal to the one
    /// encode call.
    InvalidFrame(&'static str),
    /// A channel configuration value is out of range.
    InvalidConfig(&'static str),
    /// A framing sequence (TSS, BSS, or FES) was violated while operating on a buffered bit
    /// sequence.
    SyncError(&'static str),
    /// The edge stream regressed, or a bit index was out of bounds. The pipeline ceases to
    /// operate and reports to the host.
    InvariantViolation(&'static str),
    /// The edge source delivered no more edges. A host-imposed idle timeout also surfaces as
    /// this condition.
    EndOfStream,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::InvalidFrame(msg) => {
                write!(f, "invalid frame: {}", msg)
            }
            Error::InvalidConfig(msg) => {
                write!(f, "invalid config: {}", msg)
            }
            Error::SyncError(msg) => {
                write!(f, "sync error: {}", msg)
            }
            Error::InvariantViolation(msg) => {
                write!(f, "invariant violation: {}", msg)
            }
            Error::EndOfStream => {
                write!(f, "end of edge stream")
            }
        }
    }
}

impl error::Error for Error {}

pub type Result<T> = result::Result<T, Error>;

/// Convenience function to create an invalid frame error.
pub fn invalid_frame_error<T>(msg: &'static str) -> Result<T> {
    Err(Error::InvalidFrame(msg))
}

/// Convenience function to create an invalid config error.
pub fn invalid_config_error<T>(msg: &'static str) -> Result<T> {
    Err(Error::InvalidConfig(msg))
}

/// Convenience function to create a sync error.
pub fn sync_error<T>(msg: &'static str) -> Result<T> {
    Err(Error::SyncError(msg))
}

/// Convenience function to create an invariant violation error.
pub fn invariant_error<T>(msg: &'static str) -> Result<T> {
    Err(Error::InvariantViolation(msg))
}

/// Convenience function to create an end-of-stream error.
pub fn end_of_stream_error<T>() -> Result<T> {
    Err(Error::EndOfStream)
}
