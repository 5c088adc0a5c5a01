//! Software framebuffer rotation for RGB565 frames.
//!
//! Cores that render portrait games report a rotation through the libretro
//! environment; on panels without a rotating blitter the frame has to be
//! turned in software before scaling. The kernel is picked once at startup
//! from detected CPU features via [`detect`] and dispatched through the
//! [`RotateApplier`] trait, so the render loop stays portable.
//!
//! Rotation follows the libretro convention: 90 and 270 are
//! counterclockwise and swap the output dimensions. Pixels are RGB565
//! (`u16`); pitches are in pixels, not bytes.

use phosphor_scaler::Rotation;

pub mod scalar;

#[cfg(target_arch = "aarch64")]
pub mod neon;

pub use scalar::ScalarRotate;

#[cfg(target_arch = "aarch64")]
pub use neon::NeonRotate;

/// A rotation kernel.
///
/// `src` holds `src_h` rows of `src_w` pixels at `src_pitch_px`; `dst` must
/// hold the rotated frame at `dst_pitch_px` (dimensions swapped for 90/270).
pub trait RotateApplier: Send + Sync {
    fn name(&self) -> &'static str;

    fn rotate(
        &self,
        rotation: Rotation,
        src: &[u16],
        src_w: usize,
        src_h: usize,
        src_pitch_px: usize,
        dst: &mut [u16],
        dst_pitch_px: usize,
    );
}

/// Pick the best kernel for the running CPU. Call once at startup, not per
/// frame.
pub fn detect() -> Box<dyn RotateApplier> {
    #[cfg(target_arch = "aarch64")]
    {
        if std::arch::is_aarch64_feature_detected!("neon") {
            tracing::debug!("rotation: using NEON kernels");
            return Box::new(NeonRotate);
        }
    }
    tracing::debug!("rotation: using scalar kernels");
    Box::new(ScalarRotate)
}

/// Reusable rotation output buffer. Grows to the largest frame seen and
/// never shrinks; one instance lives for the emulation session.
#[derive(Debug, Default)]
pub struct RotateBuffer {
    buf: Vec<u16>,
    width: usize,
    height: usize,
    pitch_px: usize,
}

impl RotateBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rotate `src` into the internal buffer and return the result. The
    /// zero-rotation fast path returns `src` itself without copying.
    pub fn apply<'a>(
        &'a mut self,
        applier: &dyn RotateApplier,
        rotation: Rotation,
        src: &'a [u16],
        src_w: usize,
        src_h: usize,
        src_pitch_px: usize,
    ) -> &'a [u16] {
        if rotation == Rotation::Deg0 {
            return src;
        }

        let (dst_w, dst_h) = if rotation.swaps_dimensions() {
            (src_h, src_w)
        } else {
            (src_w, src_h)
        };
        let dst_pitch_px = dst_w;

        let required = dst_pitch_px * dst_h;
        if required > self.buf.len() {
            tracing::debug!(
                from = self.buf.len(),
                to = required,
                "rotation: growing buffer"
            );
            self.buf.resize(required, 0);
        }
        self.width = dst_w;
        self.height = dst_h;
        self.pitch_px = dst_pitch_px;

        applier.rotate(
            rotation,
            src,
            src_w,
            src_h,
            src_pitch_px,
            &mut self.buf[..required],
            dst_pitch_px,
        );
        &self.buf[..required]
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pitch_px(&self) -> usize {
        self.pitch_px
    }

    /// Current allocation in pixels.
    pub fn capacity_px(&self) -> usize {
        self.buf.len()
    }
}
