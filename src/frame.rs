//! The frame-level data model (spec.md §3): input frames produced upstream
//! by the MP4 layer and borrowed for the life of a segment build.

/// Which elementary stream kind a `StreamMetadata`/`StreamState` describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaType {
    Video,
    Audio,
}

/// A single access unit, already demuxed from MP4 — immutable, borrowed from
/// the host's frame index for the life of one segment build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputFrame {
    /// Duration in the owning stream's timescale ticks.
    pub duration: u64,
    /// Size of the frame payload in bytes.
    pub size: u32,
    /// Whether this is a video access unit decodable without predecessors.
    pub key_frame: bool,
    /// Signed offset from DTS to PTS, in stream ticks (may be negative for
    /// B-frames with out-of-order presentation).
    pub pts_delay: i64,
}
