//! phosphor: the presentation engine of a handheld libretro-style
//! front-end.
//!
//! Two per-frame decisions live here, behind one facade:
//!
//! - *when* to drive audio/video output: [`SyncManager`] picks the timing
//!   authority (audio clock vs. display vsync) from measured refresh
//!   intervals, and [`FramePacer`] schedules step-vs-repeat when the rates
//!   mismatch;
//! - *how* to map the core framebuffer onto the panel: [`scaler::calculate`]
//!   solves rotation, aspect, integer-only hardware scalers, and buffer
//!   caps into exact blit geometry, with [`rotate`] providing the software
//!   rotation path.
//!
//! The render loop, audio output, and all actual blitting are external
//! collaborators; everything in this workspace is pure computation over
//! caller-supplied timestamps and geometry.

pub use phosphor_rotate as rotate;
pub use phosphor_scaler as scaler;
pub use phosphor_sync as sync;

pub use phosphor_rotate::{RotateApplier, RotateBuffer};
pub use phosphor_scaler::{
    calculate, DeviceFlags, DeviceProfile, Rotation, ScalerInput, ScalerResult, ScalingMode,
};
pub use phosphor_sync::{FramePacer, SyncManager, SyncMode};
