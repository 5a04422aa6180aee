//! The muxer's runtime state and constructor (spec.md §4, component D).

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::Result;
use crate::external::ReadCache;
use crate::external::WriteQueue;
use crate::frame::MediaType;
use crate::stream::StreamState;
use tracing::debug;

/// Tracks the frame currently being written across possibly several
/// `process()` calls (a cache miss mid-frame suspends here and resumes on
/// the next call) — spec.md §4.6's `cur_frame`/`cur_frame_pos`/etc. fields.
pub(crate) struct CurrentFrame {
    pub(crate) stream_idx: usize,
    pub(crate) file_index: usize,
    pub(crate) frame_offset: u64,
    pub(crate) frame_size: u32,
    pub(crate) frame_pos: u32,
    pub(crate) cache_slot_id: u32,
    pub(crate) last_stream_frame: bool,
}

/// One segment build. Owns every stream's cursor and filter chain for the
/// life of the build; not `Send`/`Sync` (spec.md §5 — single-threaded,
/// cooperative use only, enforced here by `Rc`/`RefCell` rather than
/// `Arc`/`Mutex`).
pub struct HlsMuxer<'a> {
    pub(crate) streams: Vec<StreamState<'a>>,
    pub(crate) queue: Rc<RefCell<dyn WriteQueue>>,
    pub(crate) read_cache: Box<dyn ReadCache>,
    pub(crate) video_duration: u64,
    pub(crate) current: Option<CurrentFrame>,
    pub(crate) simulation_supported: bool,
}

impl<'a> HlsMuxer<'a> {
    /// Build a muxer from already-constructed per-stream filter chains.
    /// Chain construction (AnnexB/ADTS/FrameJoiner/Buffer, the MPEG-TS
    /// encoder itself) is a host concern (spec.md §1); this crate only
    /// assembles the streams into one scheduling unit and determines
    /// whether the whole asset supports the simulation path.
    ///
    /// Returns the muxer and whether every stream's filter chain declared
    /// simulation support — mirrors `hls_muxer_init`'s `simulation_supported`
    /// out-parameter.
    pub fn init(
        streams: Vec<StreamState<'a>>,
        queue: Rc<RefCell<dyn WriteQueue>>,
        read_cache: Box<dyn ReadCache>,
    ) -> (Self, bool) {
        let mut simulation_supported = true;
        let mut video_duration = 0u64;

        for stream in &streams {
            if !stream.top_filter.simulation_supported() {
                simulation_supported = false;
            }
            if stream.media_type() == MediaType::Video
                && stream.metadata.duration_millis > video_duration
            {
                video_duration = stream.metadata.duration_millis;
            }
        }

        debug!(
            streams = streams.len(),
            video_duration, simulation_supported, "muxer initialized"
        );

        let muxer = Self {
            streams,
            queue,
            read_cache,
            video_duration,
            current: None,
            simulation_supported,
        };

        (muxer, simulation_supported)
    }

    /// Release every queued packet up to the lowest `send_queue_offset`
    /// across all streams — no byte reaches the host write callback before
    /// every earlier byte, across every stream, already has (spec.md §4.2).
    pub(crate) fn send(&mut self) -> Result<()> {
        let mut min_offset = self.queue.borrow().cur_offset();

        for stream in &self.streams {
            let offset = stream.ts_encoder.borrow().send_queue_offset();
            if offset < min_offset {
                min_offset = offset;
            }
        }

        self.queue.borrow_mut().send(min_offset)
    }
}
