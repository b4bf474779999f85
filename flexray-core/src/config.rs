// FlexRay Link Analyzer
// Copyright (c) 2026 The FlexRay Link Analyzer Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `config` module defines the channel configuration the analyzer reads once at
//! construction.
//!
//! Persistence of these values is the host's concern; the analyzer holds only the value.

use crate::errors::{invalid_config_error, Result};
use crate::units::SampleRate;

/// The highest FlexRay bit rate, in bits per second.
pub const MAX_BIT_RATE: u32 = 10_000_000;

/// The minimum capture oversampling factor.
pub const MIN_OVERSAMPLING: u32 = 4;

/// A `ChannelConfig` describes one captured channel.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ChannelConfig {
    /// Host-dependent identifier of the physical capture channel.
    pub channel: u32,
    /// Bits per second on the wire.
    pub bit_rate: u32,
    /// Capture samples per second. Must be at least `MIN_OVERSAMPLING` times the bit rate.
    pub sample_rate: u32,
    /// Swaps the recessive/dominant mapping of the physical levels.
    pub inverted: bool,
}

impl ChannelConfig {
    /// Creates a validated configuration.
    pub fn new(channel: u32, bit_rate: u32, sample_rate: u32, inverted: bool) -> Result<Self> {
        if bit_rate < 1 || bit_rate > MAX_BIT_RATE {
            return invalid_config_error("bit rate out of range");
        }

        if sample_rate / MIN_OVERSAMPLING < bit_rate {
            return invalid_config_error("sample rate below minimum oversampling");
        }

        Ok(ChannelConfig { channel, bit_rate, sample_rate, inverted })
    }

    /// The length of one bit cell in capture samples.
    ///
    /// The capture rate need not be an exact multiple of the bit rate; the fractional part
    /// is dropped, which at the mandated oversampling bounds the cell error below a quarter
    /// bit.
    pub fn samples_per_bit(&self) -> u64 {
        u64::from(self.sample_rate / self.bit_rate)
    }

    pub fn sample_rate(&self) -> SampleRate {
        SampleRate::new(self.sample_rate)
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        ChannelConfig {
            channel: 0,
            bit_rate: MAX_BIT_RATE,
            sample_rate: MIN_OVERSAMPLING * MAX_BIT_RATE,
            inverted: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ChannelConfig;

    #[test]
    fn verify_validation() {
        assert!(ChannelConfig::new(0, 10_000_000, 40_000_000, false).is_ok());
        assert!(ChannelConfig::new(0, 10_000_000, 39_999_999, false).is_err());
        assert!(ChannelConfig::new(0, 0, 40_000_000, false).is_err());
        assert!(ChannelConfig::new(0, 10_000_001, 80_000_000, false).is_err());
    }

    #[test]
    fn verify_samples_per_bit() {
        let config = ChannelConfig::new(2, 2_500_000, 25_000_000, false).unwrap();

        assert_eq!(config.samples_per_bit(), 10);
        assert_eq!(config.sample_rate().hz, 25_000_000);
    }
}
