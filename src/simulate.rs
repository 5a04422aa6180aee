//! The twin simulation path (spec.md §4.7, §4.8, §4.9, component H):
//! computing segment byte sizes and I-frame byte positions ahead of the
//! real write, without touching payload bytes, so a playlist can be
//! produced before the corresponding segment is actually muxed.

use crate::config::HLS_TIMESCALE;
use crate::delay_flush::flush_delayed_streams;
use crate::error::{MuxError, Result};
use crate::external::{OutputFrame, Segmenter};
use crate::frame::{InputFrame, MediaType};
use crate::muxer::HlsMuxer;
use crate::rescale::rescale;
use crate::scheduler::{choose_stream, choose_stream_within_segment};
use crate::stream::StreamState;
use tracing::{error, trace};

/// One reported I-frame: its position within the segment sequence, its
/// presentation duration, and its byte range within its segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IframeInfo {
    pub segment_index: u32,
    pub duration_millis: u32,
    pub start_pos: u64,
    pub size: u64,
}

fn simulation_write_frame(stream: &mut StreamState, frame: &InputFrame, dts: u64, last_frame: bool) {
    let output = OutputFrame {
        pts: 0,
        dts,
        key: frame.key_frame,
        size: frame.size,
        header_size: 0,
    };

    stream.top_filter.simulated_start_frame(&output);
    stream.top_filter.simulated_write(frame.size);
    stream.top_filter.simulated_flush_frame(last_frame);
}

impl<'a> HlsMuxer<'a> {
    fn require_simulation_supported(&self) -> Result<()> {
        if self.simulation_supported {
            Ok(())
        } else {
            error!("simulation requested but a filter chain declared no simulation support");
            Err(MuxError::SimulationUnsupported)
        }
    }

    /// Per-stream time boundary for the segment currently being simulated,
    /// in each stream's own timescale (spec.md §4.8's
    /// `hls_muxer_simulation_set_segment_limit`). No rounding adjustment —
    /// matches the truncating division the reference muxer uses here, as
    /// opposed to the half-up rounding `rescale` uses for DTS.
    fn set_segment_limit(&mut self, segment_end: u64, timescale: u32) {
        for stream in self.streams.iter_mut() {
            let limit = (segment_end as u128 * stream.metadata.timescale as u128)
                / timescale as u128;
            stream.segment_limit = (limit as u64).saturating_sub(stream.metadata.clip_from_frame_offset);
            stream.is_first_segment_frame = true;
        }
    }

    /// Compute the byte size of the next segment without writing any
    /// payload — every stream's cursor still advances for real, so this is
    /// destructive; callers run it exactly once per segment, immediately
    /// before (or instead of) the real `process()` pass, then either
    /// `simulation_reset()` or let the real pass consume the same frames.
    pub fn simulate_get_segment_size(&mut self) -> Result<u64> {
        self.require_simulation_supported()?;
        trace!("simulating segment size");

        self.queue.borrow_mut().simulated_start_segment();

        loop {
            let Some(idx) = choose_stream(&self.streams) else {
                break;
            };

            let (frame, cur_frame_dts, last_frame) = {
                let stream = &mut self.streams[idx];
                let frame_idx = stream.cur_frame;
                let frame = stream.metadata.frames[frame_idx];
                stream.cur_frame += 1;
                stream.next_frame_time_offset += frame.duration;
                let cur_frame_dts = stream.next_frame_dts;
                stream.next_frame_dts = rescale(
                    stream.next_frame_time_offset,
                    stream.metadata.timescale,
                    HLS_TIMESCALE,
                );
                let last_frame = stream.is_exhausted();
                (frame, cur_frame_dts, last_frame)
            };

            flush_delayed_streams(&mut self.streams, idx, cur_frame_dts, true)?;
            simulation_write_frame(&mut self.streams[idx], &frame, cur_frame_dts, last_frame);
        }

        let size = self.queue.borrow().cur_offset();
        trace!(size, "segment size simulation complete");
        Ok(size)
    }

    /// Extract every video key frame's byte range across the whole asset,
    /// one segment boundary at a time, reporting each through `callback`
    /// (spec.md §4.8's `hls_muxer_simulate_get_iframes`). Used to build a
    /// byte-range playlist ahead of muxing any segment for real.
    pub fn simulate_get_iframes<F>(&mut self, segmenter: &dyn Segmenter, mut callback: F) -> Result<()>
    where
        F: FnMut(IframeInfo),
    {
        self.require_simulation_supported()?;

        let durations = segmenter.get_segment_durations()?;
        if durations.items.is_empty() {
            trace!("segmenter produced no segment durations, nothing to report");
            return Ok(());
        }

        let mut cur_item_idx = 0usize;
        let mut repeat_count = durations.items[cur_item_idx].repeat_count.saturating_sub(1);
        let mut segment_end = durations.items[cur_item_idx].duration;
        self.set_segment_limit(segment_end, durations.timescale);
        self.queue.borrow_mut().simulated_start_segment();

        let mut frame_start = 0u64;
        let mut frame_size = 0u64;
        let mut frame_start_time = 0u64;
        let mut first_frame_time = 0u64;
        let mut frame_segment_index = 0u32;
        let mut segment_index = 0u32;

        'outer: loop {
            let idx = loop {
                if let Some(i) = choose_stream_within_segment(&self.streams) {
                    break i;
                }

                if repeat_count == 0 {
                    cur_item_idx += 1;
                    if cur_item_idx >= durations.items.len() {
                        break 'outer;
                    }
                    repeat_count = durations.items[cur_item_idx].repeat_count;
                }

                repeat_count -= 1;
                segment_end += durations.items[cur_item_idx].duration;
                self.set_segment_limit(segment_end, durations.timescale);
                self.queue.borrow_mut().simulated_start_segment();
                segment_index += 1;
                trace!(segment_index, segment_end, "advancing to next segment boundary");
            };

            let (frame, cur_frame_time_offset, cur_frame_dts, last_frame, media_type) = {
                let stream = &mut self.streams[idx];
                let frame_idx = stream.cur_frame;
                let frame = stream.metadata.frames[frame_idx];
                stream.cur_frame += 1;

                let cur_frame_time_offset = stream.next_frame_time_offset;
                stream.next_frame_time_offset += frame.duration;
                let cur_frame_dts = stream.next_frame_dts;
                stream.next_frame_dts = rescale(
                    stream.next_frame_time_offset,
                    stream.metadata.timescale,
                    HLS_TIMESCALE,
                );

                let last_frame = stream.is_exhausted()
                    || stream.next_frame_time_offset >= stream.segment_limit;

                (frame, cur_frame_time_offset, cur_frame_dts, last_frame, stream.media_type())
            };

            flush_delayed_streams(&mut self.streams, idx, cur_frame_dts, true)?;
            simulation_write_frame(&mut self.streams[idx], &frame, cur_frame_dts, last_frame);

            if media_type != MediaType::Video {
                continue;
            }

            let timescale = self.streams[idx].metadata.timescale;
            let frame_idx_after = self.streams[idx].cur_frame; // one past the frame we just processed

            if !self.streams[idx].is_first_segment_frame && frame_idx_after >= 2 {
                let prev = self.streams[idx].metadata.frames[frame_idx_after - 2];
                if prev.key_frame {
                    let prev_start_ticks =
                        (cur_frame_time_offset as i64 - prev.duration as i64) + prev.pts_delay;
                    let cur_frame_time = rescale(prev_start_ticks.max(0) as u64, timescale, 1000);

                    if frame_size != 0 {
                        callback(IframeInfo {
                            segment_index: frame_segment_index,
                            duration_millis: (cur_frame_time - frame_start_time) as u32,
                            start_pos: frame_start,
                            size: frame_size,
                        });
                    } else {
                        first_frame_time = cur_frame_time;
                    }

                    let encoder = self.streams[idx].ts_encoder.borrow();
                    frame_start = encoder.last_frame_start_pos();
                    frame_size = encoder.last_frame_end_pos() - encoder.last_frame_start_pos();
                    drop(encoder);
                    frame_start_time = cur_frame_time;
                    frame_segment_index = segment_index;
                }
            }

            if last_frame && frame.key_frame {
                let pts_ticks = cur_frame_time_offset as i64 + frame.pts_delay;
                let cur_frame_time = rescale(pts_ticks.max(0) as u64, timescale, 1000);

                if frame_size != 0 {
                    callback(IframeInfo {
                        segment_index: frame_segment_index,
                        duration_millis: (cur_frame_time - frame_start_time) as u32,
                        start_pos: frame_start,
                        size: frame_size,
                    });
                } else {
                    first_frame_time = cur_frame_time;
                }

                let encoder = self.streams[idx].ts_encoder.borrow();
                frame_start = encoder.cur_frame_start_pos();
                frame_size = encoder.cur_frame_end_pos() - encoder.cur_frame_start_pos();
                drop(encoder);
                frame_start_time = cur_frame_time;
                frame_segment_index = segment_index;
            }

            self.streams[idx].is_first_segment_frame = false;
        }

        let end_time = first_frame_time + self.video_duration;
        if frame_size != 0 && end_time > frame_start_time {
            callback(IframeInfo {
                segment_index: frame_segment_index,
                duration_millis: (end_time - frame_start_time) as u32,
                start_pos: frame_start,
                size: frame_size,
            });
        }

        Ok(())
    }

    /// Rewind every stream to the beginning and reset the write queue's
    /// simulated cursor — `hls_muxer_simulation_reset`. Used between a
    /// simulation pass and the real pass over the same frames, or between
    /// successive simulation passes used for different purposes (segment
    /// sizing vs. I-frame extraction).
    pub fn simulation_reset(&mut self) {
        self.queue.borrow_mut().simulated_start_segment();
        for stream in self.streams.iter_mut() {
            stream.reset();
        }
        self.current = None;
    }
}
