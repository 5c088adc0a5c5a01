//! Blit geometry solver.
//!
//! One deterministic pure function, [`calculate`], maps a core framebuffer
//! of arbitrary size onto a fixed physical display: rotation, aspect
//! correction, integer-only hardware scalers, oversized HDMI modes, and
//! destination buffer caps all fold into a single source/destination
//! rectangle pair the renderer consumes as-is.
//!
//! Six strategies exist, selected by scaling mode and device capabilities:
//! forced center-crop, cropped integer, native integer, fullscreen fit,
//! aspect fit, and the oversized letterbox/pillarbox/match family. Identical
//! inputs always produce identical results; golden cases per device class
//! live in `tests/`.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

pub mod device;

pub use device::{DeviceFlags, DeviceProfile};

/// Framebuffer rotation reported by the core. 90 and 270 are
/// counterclockwise, matching the libretro environment values 0–3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// True for rotations that swap output width and height.
    pub fn swaps_dimensions(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }
}

/// Raised for rotation values outside the libretro 0–3 range.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid rotation value {0} (expected 0-3)")]
pub struct InvalidRotation(pub u32);

impl TryFrom<u32> for Rotation {
    type Error = InvalidRotation;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Rotation::Deg0),
            1 => Ok(Rotation::Deg90),
            2 => Ok(Rotation::Deg180),
            3 => Ok(Rotation::Deg270),
            other => Err(InvalidRotation(other)),
        }
    }
}

/// User-facing scaling policy. Discriminant order matches the front-end's
/// persisted option table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalingMode {
    /// Pure integer upscale centered with borders; no interpolation.
    Native,
    /// Uniform fit preserving aspect ratio.
    Aspect,
    /// Fill the panel exactly, ignoring aspect ratio.
    Fullscreen,
    /// Integer upscale that covers the panel, cropping the overflow.
    Cropped,
}

impl ScalingMode {
    pub fn label(self) -> &'static str {
        match self {
            ScalingMode::Native => "Native",
            ScalingMode::Aspect => "Aspect",
            ScalingMode::Fullscreen => "Fullscreen",
            ScalingMode::Cropped => "Cropped",
        }
    }
}

impl fmt::Display for ScalingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Raised when a persisted scaling option string is not one of the known
/// labels.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown scaling mode {0:?}")]
pub struct ParseScalingModeError(pub String);

impl FromStr for ScalingMode {
    type Err = ParseScalingModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("native") {
            Ok(ScalingMode::Native)
        } else if s.eq_ignore_ascii_case("aspect") {
            Ok(ScalingMode::Aspect)
        } else if s.eq_ignore_ascii_case("fullscreen") {
            Ok(ScalingMode::Fullscreen)
        } else if s.eq_ignore_ascii_case("cropped") {
            Ok(ScalingMode::Cropped)
        } else {
            Err(ParseScalingModeError(s.to_owned()))
        }
    }
}

/// Per-frame geometry request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalerInput {
    pub src_w: i32,
    pub src_h: i32,
    /// Source row pitch in bytes.
    pub src_pitch: i32,
    pub rotation: Rotation,
    /// Core-reported display aspect ratio; ≤ 0 derives it from the rotated
    /// source dimensions.
    pub aspect_ratio: f64,
    pub mode: ScalingMode,
    pub device: DeviceProfile,
    /// Destination buffer cap (width, height) in pixels, if the render
    /// target is smaller than the computed rectangle may be.
    pub max_dst: Option<(i32, i32)>,
}

/// Blit parameters for the upcoming frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalerResult {
    /// Source crop rectangle (pixels) and pitch (bytes).
    pub src_x: i32,
    pub src_y: i32,
    pub src_w: i32,
    pub src_h: i32,
    pub src_pitch: i32,
    /// Destination rectangle (pixels) and pitch (bytes).
    pub dst_x: i32,
    pub dst_y: i32,
    pub dst_w: i32,
    pub dst_h: i32,
    pub dst_pitch: i32,
    /// Positive: pixel-exact integer scale. -1: non-integer, interpolated.
    pub scale: i32,
    /// How the renderer should finish the blit: 0 = exact integer mapping,
    /// -1 = fullscreen (ignore aspect), else the aspect ratio to feed an
    /// accelerated non-integer scaler.
    pub aspect: f64,
    /// Strategy chosen, for logging/on-screen display.
    pub label: String,
    /// Rotation-adjusted source dimensions.
    pub true_w: i32,
    pub true_h: i32,
}

impl ScalerResult {
    /// Uniformly rescale the destination rectangle to fit `buffer_w` ×
    /// `buffer_h`, shrinking width, height, and both offsets by the limiting
    /// ratio and recomputing the pitch. Returns true if anything changed.
    pub fn clamp_to_buffer(&mut self, buffer_w: i32, buffer_h: i32, bpp: i32) -> bool {
        if self.dst_w <= buffer_w && self.dst_h <= buffer_h {
            return false;
        }

        let cap_w = buffer_w as f64 / self.dst_w as f64;
        let cap_h = buffer_h as f64 / self.dst_h as f64;
        let cap = cap_w.min(cap_h);

        self.dst_w = (self.dst_w as f64 * cap) as i32;
        self.dst_h = (self.dst_h as f64 * cap) as i32;
        self.dst_pitch = self.dst_w * bpp;
        self.dst_x = (self.dst_x as f64 * cap) as i32;
        self.dst_y = (self.dst_y as f64 * cap) as i32;

        true
    }
}

fn ceil_div(a: i32, b: i32) -> i32 {
    (a + b - 1) / b
}

/// Swap width and height for 90/270 rotations.
pub fn rotated_dimensions(rotation: Rotation, w: i32, h: i32) -> (i32, i32) {
    if rotation.swaps_dimensions() {
        (h, w)
    } else {
        (w, h)
    }
}

/// Aspect-corrected dimensions for a source frame.
///
/// Width-based first: height = ceil(src_w / aspect). If that comes out
/// shorter than the source, recompute from the height instead, forcing the
/// width even. 256×224 at 4:3 gives 298×224; 640×200 at 4:3 gives 640×480.
pub fn aspect_dimensions(src_w: i32, src_h: i32, aspect_ratio: f64) -> (i32, i32) {
    let mut out_w = src_w;
    let mut out_h = ((src_w as f64 + aspect_ratio - 1.0) / aspect_ratio) as i32;

    if out_h < src_h {
        out_h = src_h;
        out_w = (src_h as f64 * aspect_ratio) as i32;
        out_w += out_w % 2;
    }

    (out_w, out_h)
}

/// Compute blit geometry for one frame. Pure and deterministic: identical
/// inputs always yield identical results.
pub fn calculate(input: &ScalerInput) -> ScalerResult {
    let (src_w, src_h) = rotated_dimensions(input.rotation, input.src_w, input.src_h);

    let aspect_ratio = if input.aspect_ratio > 0.0 {
        input.aspect_ratio
    } else {
        src_w as f64 / src_h as f64
    };
    let (aspect_w, aspect_h) = aspect_dimensions(src_w, src_h, aspect_ratio);

    // HDMI output must map the full framebuffer; cropping is not available
    // there.
    let mut mode = input.mode;
    if mode == ScalingMode::Cropped && input.device.width == input.device.hdmi_width {
        mode = ScalingMode::Native;
    }

    let mut result = ScalerResult {
        src_x: 0,
        src_y: 0,
        src_w,
        src_h,
        src_pitch: input.src_pitch,
        dst_x: 0,
        dst_y: 0,
        dst_w: 0,
        dst_h: 0,
        dst_pitch: 0,
        scale: 0,
        aspect: 0.0,
        label: String::new(),
        true_w: src_w,
        true_h: src_h,
    };

    match mode {
        ScalingMode::Native | ScalingMode::Cropped => {
            native_cropped(input, &mut result, src_w, src_h, mode);
        }
        _ if input.device.flags.contains(DeviceFlags::FIT) => {
            fit_device(input, &mut result, src_w, src_h, aspect_w, aspect_h, mode);
        }
        _ => {
            oversized_device(input, &mut result, src_w, src_h, aspect_ratio, mode);
        }
    }

    if let Some((buffer_w, buffer_h)) = input.max_dst {
        if buffer_w > 0 && buffer_h > 0 {
            result.clamp_to_buffer(buffer_w, buffer_h, input.device.bpp);
        }
    }

    result.aspect = match mode {
        ScalingMode::Native | ScalingMode::Cropped => 0.0,
        ScalingMode::Fullscreen => -1.0,
        ScalingMode::Aspect => aspect_ratio,
    };

    result
}

/// Integer-scaling strategies: forced crop, cropped integer, native integer.
fn native_cropped(
    input: &ScalerInput,
    result: &mut ScalerResult,
    src_w: i32,
    src_h: i32,
    mode: ScalingMode,
) {
    let device = &input.device;
    let mut scale = (device.width / src_w).min(device.height / src_h);

    if scale == 0 {
        // Source larger than the device: center-crop at 1:1.
        result.label = "forced crop".to_owned();
        result.dst_w = device.width;
        result.dst_h = device.height;
        result.dst_pitch = device.pitch;

        let ox = (device.width - src_w) / 2;
        let oy = (device.height - src_h) / 2;
        if ox < 0 {
            result.src_x = -ox;
        } else {
            result.dst_x = ox;
        }
        if oy < 0 {
            result.src_y = -oy;
        } else {
            result.dst_y = oy;
        }

        result.scale = 1;
    } else if mode == ScalingMode::Cropped {
        // Smallest integer scale that covers the panel; crop the overflow
        // symmetrically from the source on the over-covered axis.
        scale = ceil_div(device.width, src_w).min(ceil_div(device.height, src_h));

        result.label = "cropped".to_owned();
        result.dst_w = device.width;
        result.dst_h = device.height;
        result.dst_pitch = device.pitch;

        let scaled_w = src_w * scale;
        let scaled_h = src_h * scale;

        let ox = (device.width - scaled_w) / 2;
        let oy = (device.height - scaled_h) / 2;
        if ox < 0 {
            result.src_x = -ox / scale;
            result.src_w = src_w - result.src_x * 2;
        } else {
            result.dst_x = ox;
        }
        if oy < 0 {
            result.src_y = -oy / scale;
            result.src_h = src_h - result.src_y * 2;
        } else {
            result.dst_y = oy;
        }

        result.scale = scale;
    } else {
        // Native: pure integer upscale, centered with borders.
        result.label = "integer".to_owned();
        let scaled_w = src_w * scale;
        let scaled_h = src_h * scale;
        result.dst_w = device.width;
        result.dst_h = device.height;
        result.dst_pitch = device.pitch;
        result.dst_x = (device.width - scaled_w) / 2;
        result.dst_y = (device.height - scaled_h) / 2;
        result.scale = scale;
    }
}

/// Non-integer strategies for devices with a software/bilinear scaler.
fn fit_device(
    input: &ScalerInput,
    result: &mut ScalerResult,
    src_w: i32,
    src_h: i32,
    aspect_w: i32,
    aspect_h: i32,
    mode: ScalingMode,
) {
    let device = &input.device;

    if mode == ScalingMode::Fullscreen {
        result.label = "full fit".to_owned();
        result.dst_w = device.width;
        result.dst_h = device.height;
        result.dst_pitch = device.pitch;
        result.scale = -1;
        return;
    }

    let scale_f = (device.width as f64 / aspect_w as f64)
        .min(device.height as f64 / aspect_h as f64);

    result.label = "aspect fit".to_owned();
    result.dst_w = (aspect_w as f64 * scale_f) as i32;
    result.dst_h = (aspect_h as f64 * scale_f) as i32;
    result.dst_pitch = device.pitch;
    result.dst_x = (device.width - result.dst_w) / 2;
    result.dst_y = (device.height - result.dst_h) / 2;

    // Only a perfect 1:1 mapping counts as integer-exact here.
    if scale_f == 1.0 && result.dst_w == src_w && result.dst_h == src_h {
        result.scale = 1;
    } else {
        result.scale = -1;
    }
}

/// Integer strategies for oversized panels behind a hardware scaler.
fn oversized_device(
    input: &ScalerInput,
    result: &mut ScalerResult,
    src_w: i32,
    src_h: i32,
    aspect_ratio: f64,
    mode: ScalingMode,
) {
    let device = &input.device;

    let scale_x = ceil_div(device.width, src_w);
    let mut scale_y = ceil_div(device.height, src_h);

    // The hardware scaler works in 8-pixel steps; odd vertical remainders
    // need the smaller candidate.
    if (device.height - src_h) % 8 != 0 {
        scale_y -= 1;
    }

    let scale = scale_x.max(scale_y);
    let scaled_w = src_w * scale;
    let scaled_h = src_h * scale;

    if mode == ScalingMode::Fullscreen {
        result.label = format!("full{scale}");
        result.dst_w = scaled_w;
        result.dst_h = scaled_h;
        result.dst_pitch = result.dst_w * device.bpp;
        result.scale = scale;
        return;
    }

    // Compare core and panel aspect at 3-decimal precision.
    let fixed_aspect_ratio = device.width as f64 / device.height as f64;
    let core_aspect = (aspect_ratio * 1000.0) as i32;
    let fixed_aspect = (fixed_aspect_ratio * 1000.0) as i32;

    if core_aspect > fixed_aspect {
        // Core is wider than the panel: letterbox.
        result.label = format!("aspect{scale}L");
        let letterbox_h = (device.width as f64 / aspect_ratio) as i32;
        let aspect_hr = letterbox_h as f64 / device.height as f64;
        result.dst_w = scaled_w;
        result.dst_h = (scaled_h as f64 / aspect_hr) as i32;
        result.dst_y = (result.dst_h - scaled_h) / 2;
    } else if core_aspect < fixed_aspect {
        // Core is taller than the panel: pillarbox, snapped to 8 pixels.
        result.label = format!("aspect{scale}P");
        let pillar_w = (device.height as f64 * aspect_ratio) as i32;
        let aspect_wr = pillar_w as f64 / device.width as f64;
        result.dst_w = (scaled_w as f64 / aspect_wr) as i32;
        result.dst_h = scaled_h;
        result.dst_w = (result.dst_w / 8) * 8;
        result.dst_x = (result.dst_w - scaled_w) / 2;
    } else {
        result.label = format!("aspect{scale}M");
        result.dst_w = scaled_w;
        result.dst_h = scaled_h;
    }

    result.dst_pitch = result.dst_w * device.bpp;
    result.scale = scale;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_swaps_dimensions() {
        assert_eq!(rotated_dimensions(Rotation::Deg0, 320, 240), (320, 240));
        assert_eq!(rotated_dimensions(Rotation::Deg90, 320, 240), (240, 320));
        assert_eq!(rotated_dimensions(Rotation::Deg180, 320, 240), (320, 240));
        assert_eq!(rotated_dimensions(Rotation::Deg270, 320, 240), (240, 320));
        assert_eq!(rotated_dimensions(Rotation::Deg90, 256, 256), (256, 256));
    }

    #[test]
    fn rotation_from_libretro_values() {
        assert_eq!(Rotation::try_from(0), Ok(Rotation::Deg0));
        assert_eq!(Rotation::try_from(1), Ok(Rotation::Deg90));
        assert_eq!(Rotation::try_from(2), Ok(Rotation::Deg180));
        assert_eq!(Rotation::try_from(3), Ok(Rotation::Deg270));
        assert_eq!(Rotation::try_from(4), Err(InvalidRotation(4)));
    }

    #[test]
    fn aspect_dimensions_goldens() {
        // 256/(4:3) is shorter than 224, so recompute from the height:
        // 224 * 4/3 = 298.67, truncated to 298 (already even).
        assert_eq!(aspect_dimensions(256, 224, 4.0 / 3.0), (298, 224));
        assert_eq!(aspect_dimensions(256, 256, 1.0), (256, 256));
        // 240 * 16/9 = 426.67 -> 426.
        assert_eq!(aspect_dimensions(320, 240, 16.0 / 9.0), (426, 240));
        // Wide source: width-based height 480 wins.
        assert_eq!(aspect_dimensions(640, 200, 4.0 / 3.0), (640, 480));
    }

    #[test]
    fn scaling_mode_round_trips_through_labels() {
        for mode in [
            ScalingMode::Native,
            ScalingMode::Aspect,
            ScalingMode::Fullscreen,
            ScalingMode::Cropped,
        ] {
            assert_eq!(mode.label().parse::<ScalingMode>(), Ok(mode));
        }
        assert_eq!("FULLSCREEN".parse::<ScalingMode>(), Ok(ScalingMode::Fullscreen));
        assert_eq!(
            "stretch".parse::<ScalingMode>(),
            Err(ParseScalingModeError("stretch".to_owned()))
        );
    }

    #[test]
    fn clamp_within_bounds_is_a_no_op() {
        let mut result = sample_result(640, 480, 1280, 0, 0);
        assert!(!result.clamp_to_buffer(960, 720, 2));
        assert_eq!((result.dst_w, result.dst_h), (640, 480));
    }

    #[test]
    fn clamp_shrinks_by_the_limiting_ratio() {
        let mut result = sample_result(1200, 480, 2400, 100, 50);
        assert!(result.clamp_to_buffer(960, 720, 2));
        assert_eq!(result.dst_w, 960);
        assert_eq!(result.dst_h, 384);
        assert_eq!(result.dst_pitch, 1920);

        let mut result = sample_result(640, 900, 1280, 0, 0);
        assert!(result.clamp_to_buffer(960, 720, 2));
        assert_eq!(result.dst_w, 512);
        assert_eq!(result.dst_h, 720);
    }

    #[test]
    fn clamp_scales_offsets() {
        let mut result = sample_result(1920, 1080, 3840, 100, 80);
        assert!(result.clamp_to_buffer(960, 540, 2));
        assert_eq!((result.dst_w, result.dst_h), (960, 540));
        assert_eq!((result.dst_x, result.dst_y), (50, 40));
    }

    fn sample_result(dst_w: i32, dst_h: i32, dst_pitch: i32, dst_x: i32, dst_y: i32) -> ScalerResult {
        ScalerResult {
            src_x: 0,
            src_y: 0,
            src_w: 0,
            src_h: 0,
            src_pitch: 0,
            dst_x,
            dst_y,
            dst_w,
            dst_h,
            dst_pitch,
            scale: 0,
            aspect: 0.0,
            label: String::new(),
            true_w: 0,
            true_h: 0,
        }
    }
}
