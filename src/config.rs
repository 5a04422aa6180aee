//! Muxer configuration (spec.md §6's `hls_muxer_conf_t`).

use serde::{Deserialize, Serialize};

/// Configuration for one segment build.
///
/// This crate does not parse a config file itself — that is a host concern
/// per spec.md §1 — but the struct derives `serde` like the rest of this
/// codebase's config types so a host can fold it into its own TOML/JSON
/// configuration tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HlsMuxerConf {
    /// `true`: audio frames are joined by the `FrameJoiner` filter and
    /// interleaved with video in DTS order. `false`: audio is ADTS-framed
    /// and buffered, flushed either by its own size threshold or by the
    /// delay-flush policy.
    pub interleave_frames: bool,

    /// Hint passed down to the packet encoder to align frame starts to TS
    /// packet boundaries.
    pub align_frames: bool,
}

impl Default for HlsMuxerConf {
    fn default() -> Self {
        Self {
            interleave_frames: false,
            align_frames: false,
        }
    }
}

/// Maximum tolerated audio-behind-video skew, in 90kHz ticks (spec.md §4.5,
/// GLOSSARY `HLS_DELAY`). Empirically ~700ms.
pub const HLS_DELAY: u64 = 63_000;

/// The HLS wall clock: every DTS/PTS the muxer hands to a filter chain is in
/// this timescale.
pub const HLS_TIMESCALE: u32 = 90_000;

/// Default PES payload size threshold for the non-interleaved audio
/// `Buffer` filter (spec.md §4.3). Kept as the literal value stated in the
/// spec — see DESIGN.md for why this differs from the
/// `(DEFAULT_PES_HEADER_FREQ - 1) * 184 + 170` formula in the original
/// nginx-vod-module source.
pub const DEFAULT_PES_PAYLOAD_SIZE: u32 = 2926;
