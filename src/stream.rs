//! Per-stream metadata and runtime state (spec.md §3, component D).

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::HLS_TIMESCALE;
use crate::external::{BufferFilter, MediaFilter, TsEncoderHandle};
use crate::frame::{InputFrame, MediaType};
use crate::rescale::rescale;

/// Immutable per-stream metadata, borrowed from the MP4 layer for the life
/// of one segment build.
pub struct StreamMetadata<'a> {
    pub media_type: MediaType,
    /// Ticks per second for this stream's `frames[].duration`/`pts_delay`.
    pub timescale: u32,
    /// SPS/PPS for video, AudioSpecificConfig for AAC.
    pub extra_data: &'a [u8],
    /// NAL length-prefix size in bytes, video streams only.
    pub nal_length_size: Option<u8>,
    /// Starting DTS in stream ticks; non-zero for clipped content.
    pub first_frame_time_offset: u64,
    /// Trim amount subtracted when computing a segment's per-stream limit.
    pub clip_from_frame_offset: u64,
    /// Identifies which backing file supplies this stream's payload.
    pub frames_file_index: usize,
    /// Total stream length in milliseconds; used only to close I-frame
    /// lists (spec.md §4.8 step 5).
    pub duration_millis: u64,
    pub frames: &'a [InputFrame],
    /// Absolute byte offsets within the source file, parallel to `frames`.
    pub frame_offsets: &'a [u64],
}

/// Mutable per-stream cursor and filter-chain handle, owned by the muxer for
/// the life of one segment build.
pub struct StreamState<'a> {
    pub metadata: &'a StreamMetadata<'a>,

    /// Index of the next unread frame in `metadata.frames`.
    pub cur_frame: usize,
    /// One-past-the-last valid frame index (`metadata.frames.len()`).
    pub last_frame: usize,

    /// DTS of the next frame, in stream ticks.
    pub next_frame_time_offset: u64,
    /// The same quantity rescaled to the 90kHz HLS clock (invariant I1).
    pub next_frame_dts: u64,

    /// Per-stream time boundary in stream ticks, simulation only.
    pub segment_limit: u64,
    /// Used by I-frame extraction to detect segment transitions.
    pub is_first_segment_frame: bool,

    /// Head of this stream's filter chain.
    pub top_filter: Box<dyn MediaFilter>,
    /// The non-interleaved audio path's buffer filter, if this stream has one.
    pub buffer_state: Option<Rc<RefCell<dyn BufferFilter>>>,
    /// The terminal MPEG-TS encoder stage — always present, queried directly
    /// by the I-frame extractor regardless of chain depth.
    pub ts_encoder: Rc<RefCell<dyn TsEncoderHandle>>,
}

impl<'a> StreamState<'a> {
    pub fn new(
        metadata: &'a StreamMetadata<'a>,
        top_filter: Box<dyn MediaFilter>,
        buffer_state: Option<Rc<RefCell<dyn BufferFilter>>>,
        ts_encoder: Rc<RefCell<dyn TsEncoderHandle>>,
    ) -> Self {
        let next_frame_time_offset = metadata.first_frame_time_offset;
        let next_frame_dts = rescale(next_frame_time_offset, metadata.timescale, HLS_TIMESCALE);

        Self {
            metadata,
            cur_frame: 0,
            last_frame: metadata.frames.len(),
            next_frame_time_offset,
            next_frame_dts,
            segment_limit: 0,
            is_first_segment_frame: true,
            top_filter,
            buffer_state,
            ts_encoder,
        }
    }

    /// Whether this stream has any unread frames left (invariant for the
    /// scheduler's exhaustion check).
    pub fn is_exhausted(&self) -> bool {
        self.cur_frame >= self.last_frame
    }

    pub fn media_type(&self) -> MediaType {
        self.metadata.media_type
    }

    /// Rewind this stream's cursor to the first frame and restart its DTS
    /// bookkeeping — `simulation_reset` (spec.md §4.9). Does not touch
    /// filter state; filters are segment-scoped.
    pub fn reset(&mut self) {
        self.cur_frame = 0;
        self.next_frame_time_offset = self.metadata.first_frame_time_offset;
        self.next_frame_dts = rescale(
            self.next_frame_time_offset,
            self.metadata.timescale,
            HLS_TIMESCALE,
        );
    }
}
