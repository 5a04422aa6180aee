//! The delay-flush policy (spec.md §4.5): force non-interleaved audio out
//! once it falls too far behind the stream the scheduler just picked.

use crate::config::HLS_DELAY;
use crate::error::Result;
use crate::stream::StreamState;
use tracing::warn;

/// For every stream other than `selected_idx` that owns a buffer filter,
/// flush it if the oldest buffered frame's DTS is more than `HLS_DELAY/2`
/// behind `frame_dts` — the just-chosen frame's DTS.
///
/// `simulate` selects between `force_flush` (real path, fallible) and
/// `simulated_force_flush` (simulation path, infallible); both call sites in
/// `pump.rs`/`simulate.rs` need this exact same scan.
pub fn flush_delayed_streams(
    streams: &mut [StreamState],
    selected_idx: usize,
    frame_dts: u64,
    simulate: bool,
) -> Result<()> {
    for (idx, stream) in streams.iter_mut().enumerate() {
        if idx == selected_idx {
            continue;
        }

        let Some(buffer) = &stream.buffer_state else {
            continue;
        };

        let mut buffer = buffer.borrow_mut();
        let Some(buffered_dts) = buffer.current_dts() else {
            continue;
        };

        if frame_dts > buffered_dts + HLS_DELAY / 2 {
            warn!(
                stream = idx,
                buffered_dts,
                frame_dts,
                simulate,
                "buffered stream fell behind HLS_DELAY/2, forcing flush"
            );
            if simulate {
                buffer.simulated_force_flush();
            } else {
                buffer.force_flush()?;
            }
        }
    }

    Ok(())
}
