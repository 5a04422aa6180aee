//! # hls-segment-muxer
//!
//! The interleaving core of an HLS MPEG-TS segment muxer: DTS-ordered
//! frame scheduling across elementary streams, a per-stream filter-chain
//! handle, a delay-flush policy for non-interleaved audio, a pull-model
//! write loop that suspends cleanly on a block-cache miss and resumes with
//! no lost state, and a twin simulation path for computing segment sizes
//! and I-frame byte ranges ahead of any real write.
//!
//! MP4 parsing, the block read cache, the low-level MPEG-TS packetizer,
//! and the AnnexB/ADTS/FrameJoiner/Buffer filter internals are host
//! concerns — this crate only defines the trait contracts for them, in
//! [`external`], and drives them through [`muxer::HlsMuxer`].
//!
//! ## Usage
//!
//! ```ignore
//! let (mut muxer, simulation_supported) = HlsMuxer::init(streams, queue, read_cache);
//! loop {
//!     match muxer.process()? {
//!         MuxStatus::Ok => break,
//!         MuxStatus::Again => continue_when_cache_ready(),
//!     }
//! }
//! ```

pub mod config;
pub mod delay_flush;
pub mod error;
pub mod external;
pub mod frame;
pub mod muxer;
pub mod pump;
pub mod rescale;
pub mod scheduler;
pub mod simulate;
pub mod stream;

#[cfg(test)]
pub(crate) mod tests;

pub use config::{HlsMuxerConf, DEFAULT_PES_PAYLOAD_SIZE, HLS_DELAY, HLS_TIMESCALE};
pub use error::{MuxError, MuxStatus, Result};
pub use external::{
    BufferFilter, CacheLookup, MediaFilter, OutputFrame, ReadCache, RequestContext,
    SegmentDurationItem, SegmentDurations, Segmenter, TsEncoderHandle, WriteCallback, WriteQueue,
};
pub use frame::{InputFrame, MediaType};
pub use muxer::HlsMuxer;
pub use simulate::IframeInfo;
pub use stream::{StreamMetadata, StreamState};
