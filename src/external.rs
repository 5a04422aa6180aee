//! Contracts for collaborators this crate does not implement: the block
//! read cache, the write-sink callback, the packet-level write queue, the
//! per-stream filter chain (AnnexB/ADTS/FrameJoiner/Buffer), the terminal
//! MPEG-TS packet encoder, and the segment-duration segmenter. spec.md §1
//! lists these as deliberately out of scope; §6 describes their shape. This
//! crate only needs the contracts below to drive its scheduling logic — the
//! concrete implementations live with the host.

use bytes::Bytes;

use crate::error::Result;

/// Borrowed identification/logging context for one segment build, standing
/// in for the C source's `request_context_t*` (there also used for pool
/// allocation; this crate uses ordinary ownership instead, see spec.md §9
/// Design Notes, so only the identity/log half survives).
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub build_id: uuid::Uuid,
}

impl RequestContext {
    pub fn new() -> Self {
        Self {
            build_id: uuid::Uuid::new_v4(),
        }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a single cache lookup (spec.md §6
/// `read_cache_get_from_cache`). A hit may return fewer bytes than
/// requested — the cache returns whatever contiguous run it already holds.
pub enum CacheLookup {
    Hit(Bytes),
    Miss,
}

/// The external block cache. A miss is expected to begin prefetching the
/// requested range; the muxer re-asks on the next `process()` call.
pub trait ReadCache {
    fn get_from_cache(
        &mut self,
        wanted: usize,
        slot_id: u32,
        file_index: usize,
        offset: u64,
    ) -> CacheLookup;
}

/// Sink for assembled MPEG-TS bytes, in file-offset order.
pub trait WriteCallback {
    fn write(&mut self, bytes: &[u8]) -> std::io::Result<()>;
}

/// The packet-level write queue (spec.md §4.2, component B). Buffers
/// 188-byte TS packets from multiple per-stream producers and releases them
/// to the `WriteCallback` only once file-order causality is established.
pub trait WriteQueue {
    /// Append one TS packet, returning its absolute offset in the queue.
    fn append_packet(&mut self, packet: &[u8; 188]) -> u64;

    /// The offset one past the last packet appended so far.
    fn cur_offset(&self) -> u64;

    /// Drain and hand to the write callback every packet whose offset is
    /// strictly less than `min_offset` — the minimum `send_queue_offset`
    /// across all per-stream encoders, so no byte crosses to the host
    /// before every earlier byte already has.
    fn send(&mut self, min_offset: u64) -> Result<()>;

    /// Drain everything remaining; called once a build completes.
    fn flush(&mut self) -> Result<()>;

    /// Advance `cur_offset` by `len` bytes without storing any payload —
    /// the simulation-mode counterpart of `append_packet`.
    fn simulated_append(&mut self, len: u64) -> u64;

    /// Reset `cur_offset` to zero for a fresh segment under simulation.
    fn simulated_start_segment(&mut self);
}

/// Per-frame metadata handed to a filter chain's `start_frame`
/// (spec.md §4.3's `output_frame_t`).
#[derive(Debug, Clone, Copy)]
pub struct OutputFrame {
    pub pts: u64,
    pub dts: u64,
    pub key: bool,
    pub size: u32,
    pub header_size: u32,
}

/// The uniform filter-chain contract (spec.md §4.3): every stage from
/// MP4-to-AnnexB / ADTS / FrameJoiner / Buffer down to the terminal MPEG-TS
/// encoder implements this, so the muxer core can drive the whole chain
/// through its head (`StreamState::top_filter`) without knowing its depth.
pub trait MediaFilter {
    fn start_frame(&mut self, frame: &OutputFrame) -> Result<()>;
    fn write(&mut self, bytes: &[u8]) -> Result<()>;
    fn flush_frame(&mut self, last_in_stream: bool) -> Result<()>;

    /// Update byte counters identically to the real path, without touching
    /// payload. Only called if `simulation_supported()` returned `true` for
    /// every filter in the chain.
    fn simulated_start_frame(&mut self, frame: &OutputFrame);
    fn simulated_write(&mut self, size: u32);
    fn simulated_flush_frame(&mut self, last_in_stream: bool);

    /// Declared once at init: whether this filter's simulated path tracks
    /// the real path exactly. A chain is simulation-capable only if every
    /// stage returns `true`.
    fn simulation_supported(&self) -> bool {
        true
    }
}

/// The terminal stage of every filter chain (spec.md §3's opaque
/// `mpegts_encoder_state`): assigns a PID, and tracks the byte positions the
/// I-frame extractor needs. Always present on a stream regardless of how
/// deep its filter chain is, which is why it is queried directly rather
/// than through `top_filter`.
pub trait TsEncoderHandle: MediaFilter {
    fn pid(&self) -> u16;

    /// The highest offset this stream's packets have been queued up to;
    /// used to compute the write queue's `send(min_offset)` argument.
    fn send_queue_offset(&self) -> u64;

    fn last_frame_start_pos(&self) -> u64;
    fn last_frame_end_pos(&self) -> u64;
    fn cur_frame_start_pos(&self) -> u64;
    fn cur_frame_end_pos(&self) -> u64;
}

/// The non-interleaved audio path's buffer filter (spec.md §4.3, §4.5):
/// holds ADTS frames until forced out by the delay-flush policy or its own
/// size threshold.
pub trait BufferFilter {
    /// The DTS of the oldest frame currently buffered, if any.
    fn current_dts(&self) -> Option<u64>;

    fn force_flush(&mut self) -> Result<()>;
    fn simulated_force_flush(&mut self);
}

/// One segment's worth of duration, and how many consecutive segments
/// repeat it — the `(duration, repeat_count)` shape spec.md §4.8 describes.
#[derive(Debug, Clone, Copy)]
pub struct SegmentDurationItem {
    pub duration: u64,
    pub repeat_count: u32,
}

/// A resolved run of segment durations sharing a common timescale. Produced
/// by the host's `segmenter_get_segment_durations_{accurate,estimate}`
/// (spec.md §6) — this crate does not need to know which path produced it.
#[derive(Debug, Clone)]
pub struct SegmentDurations {
    pub timescale: u32,
    pub items: Vec<SegmentDurationItem>,
}

/// The external segmenter boundary (supplements spec.md §4.8; see
/// SPEC_FULL.md §4.10).
pub trait Segmenter {
    fn get_segment_durations(&self) -> Result<SegmentDurations>;
}
