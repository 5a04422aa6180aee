//! Integration tests for the muxer core, built on the in-memory doubles in
//! `testkit` and the synthetic assets in `fixtures` — there is no real MP4
//! demuxer or MPEG-TS encoder in this crate to test against (spec.md §1).
