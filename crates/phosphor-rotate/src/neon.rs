//! aarch64 NEON rotation kernels.
//!
//! 180 uses 8-lane row reversal; 90/270 go through 8x8 tile transposes so
//! both the loads and the stores stay sequential within a tile. Edge rows
//! and columns that do not fill a tile take the scalar path.

use core::arch::aarch64::*;

use phosphor_scaler::Rotation;

use crate::RotateApplier;

/// Runtime-selected NEON kernels. Only constructed by [`crate::detect`]
/// after `is_aarch64_feature_detected!("neon")` succeeds.
pub struct NeonRotate;

impl RotateApplier for NeonRotate {
    fn name(&self) -> &'static str {
        "neon"
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
        // Safety: construction is gated on NEON being detected.
        unsafe {
            match rotation {
                Rotation::Deg0 => {
                    for y in 0..src_h {
                        let srow = &src[y * src_pitch_px..][..src_w];
                        dst[y * dst_pitch_px..][..src_w].copy_from_slice(srow);
                    }
                }
                Rotation::Deg90 => {
                    rotate_90_neon(src, src_w, src_h, src_pitch_px, dst, dst_pitch_px)
                }
                Rotation::Deg180 => {
                    rotate_180_neon(src, src_w, src_h, src_pitch_px, dst, dst_pitch_px)
                }
                Rotation::Deg270 => {
                    rotate_270_neon(src, src_w, src_h, src_pitch_px, dst, dst_pitch_px)
                }
            }
        }
    }
}

/// Reverse all 8 lanes: vrev64 flips within each half, vext swaps halves.
#[inline]
unsafe fn reverse_lanes(v: uint16x8_t) -> uint16x8_t {
    let halves = vrev64q_u16(v);
    vextq_u16::<4>(halves, halves)
}

/// 8x8 u16 transpose: trn at 16, 32, then 64-bit granularity.
#[inline]
unsafe fn transpose_8x8(r: [uint16x8_t; 8]) -> [uint16x8_t; 8] {
    let a0 = vtrn1q_u16(r[0], r[1]);
    let a1 = vtrn2q_u16(r[0], r[1]);
    let a2 = vtrn1q_u16(r[2], r[3]);
    let a3 = vtrn2q_u16(r[2], r[3]);
    let a4 = vtrn1q_u16(r[4], r[5]);
    let a5 = vtrn2q_u16(r[4], r[5]);
    let a6 = vtrn1q_u16(r[6], r[7]);
    let a7 = vtrn2q_u16(r[6], r[7]);

    let a0 = vreinterpretq_u32_u16(a0);
    let a1 = vreinterpretq_u32_u16(a1);
    let a2 = vreinterpretq_u32_u16(a2);
    let a3 = vreinterpretq_u32_u16(a3);
    let a4 = vreinterpretq_u32_u16(a4);
    let a5 = vreinterpretq_u32_u16(a5);
    let a6 = vreinterpretq_u32_u16(a6);
    let a7 = vreinterpretq_u32_u16(a7);

    let b0 = vreinterpretq_u64_u32(vtrn1q_u32(a0, a2));
    let b1 = vreinterpretq_u64_u32(vtrn1q_u32(a1, a3));
    let b2 = vreinterpretq_u64_u32(vtrn2q_u32(a0, a2));
    let b3 = vreinterpretq_u64_u32(vtrn2q_u32(a1, a3));
    let b4 = vreinterpretq_u64_u32(vtrn1q_u32(a4, a6));
    let b5 = vreinterpretq_u64_u32(vtrn1q_u32(a5, a7));
    let b6 = vreinterpretq_u64_u32(vtrn2q_u32(a4, a6));
    let b7 = vreinterpretq_u64_u32(vtrn2q_u32(a5, a7));

    [
        vreinterpretq_u16_u64(vtrn1q_u64(b0, b4)),
        vreinterpretq_u16_u64(vtrn1q_u64(b1, b5)),
        vreinterpretq_u16_u64(vtrn1q_u64(b2, b6)),
        vreinterpretq_u16_u64(vtrn1q_u64(b3, b7)),
        vreinterpretq_u16_u64(vtrn2q_u64(b0, b4)),
        vreinterpretq_u16_u64(vtrn2q_u64(b1, b5)),
        vreinterpretq_u16_u64(vtrn2q_u64(b2, b6)),
        vreinterpretq_u16_u64(vtrn2q_u64(b3, b7)),
    ]
}

#[inline]
unsafe fn load_tile(base: *const u16, pitch_px: usize) -> [uint16x8_t; 8] {
    [
        vld1q_u16(base),
        vld1q_u16(base.add(pitch_px)),
        vld1q_u16(base.add(2 * pitch_px)),
        vld1q_u16(base.add(3 * pitch_px)),
        vld1q_u16(base.add(4 * pitch_px)),
        vld1q_u16(base.add(5 * pitch_px)),
        vld1q_u16(base.add(6 * pitch_px)),
        vld1q_u16(base.add(7 * pitch_px)),
    ]
}

#[target_feature(enable = "neon")]
unsafe fn rotate_180_neon(
    src: &[u16],
    src_w: usize,
    src_h: usize,
    src_pitch_px: usize,
    dst: &mut [u16],
    dst_pitch_px: usize,
) {
    for dy in 0..src_h {
        let srow = src.as_ptr().add((src_h - 1 - dy) * src_pitch_px);
        let drow = dst.as_mut_ptr().add(dy * dst_pitch_px);
        let mut x = 0;
        while x + 8 <= src_w {
            let v = vld1q_u16(srow.add(src_w - x - 8));
            vst1q_u16(drow.add(x), reverse_lanes(v));
            x += 8;
        }
        for i in x..src_w {
            *drow.add(i) = *srow.add(src_w - 1 - i);
        }
    }
}

#[target_feature(enable = "neon")]
unsafe fn rotate_90_neon(
    src: &[u16],
    src_w: usize,
    src_h: usize,
    src_pitch_px: usize,
    dst: &mut [u16],
    dst_pitch_px: usize,
) {
    let tile_w = src_w & !7;
    let tile_h = src_h & !7;

    for ry in (0..tile_h).step_by(8) {
        for cx in (0..tile_w).step_by(8) {
            let rows = load_tile(src.as_ptr().add(ry * src_pitch_px + cx), src_pitch_px);
            let cols = transpose_8x8(rows);
            // Source column cx+j becomes dst row src_w-1-(cx+j); the tile's
            // rows land at dst columns ry..ry+8 in ascending order.
            for (j, col) in cols.iter().enumerate() {
                let dy = src_w - 1 - (cx + j);
                vst1q_u16(dst.as_mut_ptr().add(dy * dst_pitch_px + ry), *col);
            }
        }
    }

    // Leftover source columns: full dst rows.
    for src_col in tile_w..src_w {
        let dy = src_w - 1 - src_col;
        for dx in 0..src_h {
            *dst.get_unchecked_mut(dy * dst_pitch_px + dx) =
                *src.get_unchecked(dx * src_pitch_px + src_col);
        }
    }
    // Leftover source rows: tail of the covered dst rows.
    for src_col in 0..tile_w {
        let dy = src_w - 1 - src_col;
        for dx in tile_h..src_h {
            *dst.get_unchecked_mut(dy * dst_pitch_px + dx) =
                *src.get_unchecked(dx * src_pitch_px + src_col);
        }
    }
}

#[target_feature(enable = "neon")]
unsafe fn rotate_270_neon(
    src: &[u16],
    src_w: usize,
    src_h: usize,
    src_pitch_px: usize,
    dst: &mut [u16],
    dst_pitch_px: usize,
) {
    let tile_w = src_w & !7;
    let tile_h = src_h & !7;

    for ry in (0..tile_h).step_by(8) {
        for cx in (0..tile_w).step_by(8) {
            let rows = load_tile(src.as_ptr().add(ry * src_pitch_px + cx), src_pitch_px);
            let cols = transpose_8x8(rows);
            // Source column cx+j becomes dst row cx+j; source rows ry..ry+8
            // land at dst columns src_h-1-ry downwards, so lanes reverse.
            for (j, col) in cols.iter().enumerate() {
                let dy = cx + j;
                let dx = src_h - 1 - ry - 7;
                vst1q_u16(
                    dst.as_mut_ptr().add(dy * dst_pitch_px + dx),
                    reverse_lanes(*col),
                );
            }
        }
    }

    for src_col in tile_w..src_w {
        for dx in 0..src_h {
            *dst.get_unchecked_mut(src_col * dst_pitch_px + dx) =
                *src.get_unchecked((src_h - 1 - dx) * src_pitch_px + src_col);
        }
    }
    for src_col in 0..tile_w {
        for dx in 0..(src_h - tile_h) {
            *dst.get_unchecked_mut(src_col * dst_pitch_px + dx) =
                *src.get_unchecked((src_h - 1 - dx) * src_pitch_px + src_col);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalar::ScalarRotate;

    // Deterministic pixel pattern with no repeats within a frame.
    fn frame(h: usize, pitch: usize) -> Vec<u16> {
        let mut state = 0x1234u32;
        (0..pitch * h)
            .map(|_| {
                state = state.wrapping_mul(25173).wrapping_add(13849);
                (state >> 8) as u16
            })
            .collect()
    }

    #[test]
    fn neon_matches_scalar_on_unaligned_sizes() {
        if !std::arch::is_aarch64_feature_detected!("neon") {
            return;
        }

        // 19x13 exercises both tile paths and all edge remainders.
        for (w, h) in [(19usize, 13usize), (16, 16), (8, 8), (7, 5), (24, 9)] {
            let pitch = w + 3;
            let src = frame(h, pitch);
            for rotation in [
                Rotation::Deg0,
                Rotation::Deg90,
                Rotation::Deg180,
                Rotation::Deg270,
            ] {
                let (dw, dh) = if rotation.swaps_dimensions() {
                    (h, w)
                } else {
                    (w, h)
                };
                let mut expected = vec![0u16; dw * dh];
                ScalarRotate.rotate(rotation, &src, w, h, pitch, &mut expected, dw);
                let mut actual = vec![0u16; dw * dh];
                NeonRotate.rotate(rotation, &src, w, h, pitch, &mut actual, dw);
                assert_eq!(actual, expected, "rotation {rotation:?} on {w}x{h}");
            }
        }
    }
}
