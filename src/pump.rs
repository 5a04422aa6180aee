//! The pull-model, restartable write loop (spec.md §4.6, component G):
//! `HlsMuxer::process`. Cooperates with an external block cache — a miss
//! suspends mid-frame and the same call resumes cleanly on the next
//! invocation, with no state lost (spec.md §1, §5).

use crate::config::HLS_TIMESCALE;
use crate::delay_flush::flush_delayed_streams;
use crate::error::{MuxError, MuxStatus, Result};
use crate::external::{CacheLookup, OutputFrame};
use crate::muxer::{CurrentFrame, HlsMuxer};
use crate::rescale::rescale;
use crate::scheduler::choose_stream;
use tracing::{debug, error, trace};

impl<'a> HlsMuxer<'a> {
    /// Pick the next frame to write, across every stream, in DTS order.
    /// Leaves `self.current` at `None` when every stream is exhausted —
    /// the caller takes that as "segment complete".
    fn start_frame(&mut self) -> Result<()> {
        let Some(selected_idx) = choose_stream(&self.streams) else {
            trace!("all streams exhausted, ending segment");
            return Ok(());
        };

        let (cur_frame_time_offset, cur_frame_dts, frame, last_stream_frame, pid, file_index) = {
            let stream = &mut self.streams[selected_idx];
            let frame_idx = stream.cur_frame;
            let frame = stream.metadata.frames[frame_idx];
            let frame_offset = stream.metadata.frame_offsets[frame_idx];
            stream.cur_frame += 1;

            let cur_frame_time_offset = stream.next_frame_time_offset;
            stream.next_frame_time_offset += frame.duration;
            let cur_frame_dts = stream.next_frame_dts;
            stream.next_frame_dts =
                rescale(stream.next_frame_time_offset, stream.metadata.timescale, HLS_TIMESCALE);

            let last_stream_frame = stream.is_exhausted();
            let pid = stream.ts_encoder.borrow().pid();
            let file_index = stream.metadata.frames_file_index;

            (
                cur_frame_time_offset,
                cur_frame_dts,
                (frame, frame_offset),
                last_stream_frame,
                pid,
                file_index,
            )
        };

        flush_delayed_streams(&mut self.streams, selected_idx, cur_frame_dts, false)?;

        let (frame, frame_offset) = frame;
        let timescale = self.streams[selected_idx].metadata.timescale;
        let pts_ticks = cur_frame_time_offset as i64 + frame.pts_delay;
        let pts = rescale(pts_ticks.max(0) as u64, timescale, HLS_TIMESCALE);

        let output_frame = OutputFrame {
            pts,
            dts: cur_frame_dts,
            key: frame.key_frame,
            size: frame.size,
            header_size: 0,
        };

        debug!(
            stream = selected_idx,
            dts = cur_frame_dts,
            pts,
            key = output_frame.key,
            size = output_frame.size,
            "starting frame"
        );

        self.streams[selected_idx]
            .top_filter
            .start_frame(&output_frame)?;

        self.current = Some(CurrentFrame {
            stream_idx: selected_idx,
            file_index,
            frame_offset,
            frame_size: frame.size,
            frame_pos: 0,
            cache_slot_id: pid as u32,
            last_stream_frame,
        });

        Ok(())
    }

    /// Drive the write loop until the segment is fully written (`Ok`) or
    /// the cache cannot yet satisfy the next read (`Again`). Safe to call
    /// again after `Again` — resumes exactly where it left off.
    pub fn process(&mut self) -> Result<MuxStatus> {
        let first_time = self.current.is_none();
        let mut wrote_data = false;

        loop {
            if self.current.is_none() {
                self.start_frame()?;
                if self.current.is_none() {
                    break;
                }
            }

            let (stream_idx, remaining, cache_slot_id, file_index, offset) = {
                let cur = self.current.as_ref().unwrap();
                (
                    cur.stream_idx,
                    cur.frame_size - cur.frame_pos,
                    cur.cache_slot_id,
                    cur.file_index,
                    cur.frame_offset + cur.frame_pos as u64,
                )
            };

            match self
                .read_cache
                .get_from_cache(remaining as usize, cache_slot_id, file_index, offset)
            {
                CacheLookup::Hit(bytes) => {
                    wrote_data = true;

                    let write_size = (bytes.len() as u32).min(remaining);
                    self.streams[stream_idx]
                        .top_filter
                        .write(&bytes[..write_size as usize])?;

                    let cur = self.current.as_mut().unwrap();
                    cur.frame_pos += write_size;

                    if cur.frame_pos >= cur.frame_size {
                        let last_stream_frame = cur.last_stream_frame;
                        self.streams[stream_idx]
                            .top_filter
                            .flush_frame(last_stream_frame)?;
                        self.current = None;
                    }
                }
                CacheLookup::Miss => {
                    if !wrote_data && !first_time {
                        error!(stream = stream_idx, offset, "cache miss with no progress made, source truncated");
                        return Err(MuxError::Truncated);
                    }

                    trace!(stream = stream_idx, offset, "cache miss, suspending");
                    self.send()?;
                    return Ok(MuxStatus::Again);
                }
            }
        }

        self.queue.borrow_mut().flush()?;
        Ok(MuxStatus::Ok)
    }
}
