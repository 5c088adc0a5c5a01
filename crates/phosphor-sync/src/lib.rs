//! Frame-timing control for the presentation loop.
//!
//! A fixed-rate emulated core has to be paced against a real display whose
//! refresh rate varies by several percent across units even at the same
//! nominal Hz. This crate decides, once per presented frame, which clock is
//! the timing authority:
//!
//! - [`SyncManager`] measures the true display refresh interval from vsync
//!   timestamps and switches between audio-clock pacing (safe, blocking audio
//!   writes) and vsync pacing (low latency, requires a close Hz/fps match).
//! - [`FramePacer`] schedules step-vs-repeat with a Q16.16 Bresenham
//!   accumulator when the rates mismatch beyond tolerance.
//!
//! Both are plain owned state machines driven by the caller; neither reads a
//! clock or performs I/O.

pub mod manager;
pub mod pacer;

pub use manager::{SyncManager, SyncMode};
pub use pacer::FramePacer;
