//! Interleaved DTS-ordered frame scheduling (spec.md §4.4, component E).

use crate::stream::StreamState;

/// Pick the stream with the smallest `next_frame_dts` among those with
/// unread frames. Ties are broken by stream order (stable) — the reference
/// scans in declaration order, which in practice puts video before audio;
/// callers must register streams in that order to match byte-for-byte
/// (spec.md §9 Open Questions).
///
/// Returns `None` when every stream is exhausted: the segment is done.
pub fn choose_stream(streams: &[StreamState]) -> Option<usize> {
    let mut result: Option<usize> = None;

    for (idx, stream) in streams.iter().enumerate() {
        if stream.is_exhausted() {
            continue;
        }

        match result {
            None => result = Some(idx),
            Some(best) if stream.next_frame_dts < streams[best].next_frame_dts => {
                result = Some(idx)
            }
            _ => {}
        }
    }

    result
}

/// The I-frame extraction variant: additionally excludes any stream whose
/// next frame would cross its `segment_limit` (spec.md §4.4).
pub fn choose_stream_within_segment(streams: &[StreamState]) -> Option<usize> {
    let mut result: Option<usize> = None;

    for (idx, stream) in streams.iter().enumerate() {
        if stream.is_exhausted() || stream.next_frame_time_offset >= stream.segment_limit {
            continue;
        }

        match result {
            None => result = Some(idx),
            Some(best) if stream.next_frame_dts < streams[best].next_frame_dts => {
                result = Some(idx)
            }
            _ => {}
        }
    }

    result
}
