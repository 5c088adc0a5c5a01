//! Portable rotation kernels.

use phosphor_scaler::Rotation;

use crate::RotateApplier;

/// Plain scalar kernels, available on every target.
pub struct ScalarRotate;

impl RotateApplier for ScalarRotate {
    fn name(&self) -> &'static str {
        "scalar"
    }

    fn rotate(
        &self,
        rotation: Rotation,
        src: &[u16],
        src_w: usize,
        src_h: usize,
        src_pitch_px: usize,
        dst: &mut [u16],
        dst_pitch_px: usize,
    ) {
        match rotation {
            Rotation::Deg0 => {
                for y in 0..src_h {
                    let srow = &src[y * src_pitch_px..][..src_w];
                    dst[y * dst_pitch_px..][..src_w].copy_from_slice(srow);
                }
            }
            Rotation::Deg90 => rotate_90(src, src_w, src_h, src_pitch_px, dst, dst_pitch_px),
            Rotation::Deg180 => rotate_180(src, src_w, src_h, src_pitch_px, dst, dst_pitch_px),
            Rotation::Deg270 => rotate_270(src, src_w, src_h, src_pitch_px, dst, dst_pitch_px),
        }
    }
}

/// 90 CCW: the right column of the source becomes the top row.
pub(crate) fn rotate_90(
    src: &[u16],
    src_w: usize,
    src_h: usize,
    src_pitch_px: usize,
    dst: &mut [u16],
    dst_pitch_px: usize,
) {
    // Output is src_h wide and src_w tall.
    for dy in 0..src_w {
        let src_col = src_w - 1 - dy;
        let drow = &mut dst[dy * dst_pitch_px..][..src_h];
        for (dx, out) in drow.iter_mut().enumerate() {
            *out = src[dx * src_pitch_px + src_col];
        }
    }
}

pub(crate) fn rotate_180(
    src: &[u16],
    src_w: usize,
    src_h: usize,
    src_pitch_px: usize,
    dst: &mut [u16],
    dst_pitch_px: usize,
) {
    for dy in 0..src_h {
        let srow = &src[(src_h - 1 - dy) * src_pitch_px..][..src_w];
        let drow = &mut dst[dy * dst_pitch_px..][..src_w];
        for (dx, out) in drow.iter_mut().enumerate() {
            *out = srow[src_w - 1 - dx];
        }
    }
}

/// 270 CCW: the left column of the source becomes the top row.
pub(crate) fn rotate_270(
    src: &[u16],
    src_w: usize,
    src_h: usize,
    src_pitch_px: usize,
    dst: &mut [u16],
    dst_pitch_px: usize,
) {
    for dy in 0..src_w {
        let drow = &mut dst[dy * dst_pitch_px..][..src_h];
        for (dx, out) in drow.iter_mut().enumerate() {
            *out = src[(src_h - 1 - dx) * src_pitch_px + dy];
        }
    }
}
