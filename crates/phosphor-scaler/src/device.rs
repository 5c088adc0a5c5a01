//! Physical display descriptors.

use bitflags::bitflags;

bitflags! {
    /// Display capabilities that change which scaling strategies are legal.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DeviceFlags: u32 {
        /// Software/bilinear scaler available: arbitrary non-integer fits
        /// are allowed. Without this the panel sits behind an integer-only
        /// hardware scaler with 8-pixel granularity.
        const FIT = 1 << 0;
        /// An HDMI output path exists on this device.
        const HDMI = 1 << 1;
    }
}

/// Fixed geometry of the panel (or HDMI mode) a frame is blitted onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceProfile {
    pub width: i32,
    pub height: i32,
    /// Row pitch of the device framebuffer in bytes.
    pub pitch: i32,
    /// Bytes per pixel.
    pub bpp: i32,
    /// Width of the HDMI output mode, or 0 if none. When the active device
    /// width equals this, full-framebuffer mapping is required.
    pub hdmi_width: i32,
    pub flags: DeviceFlags,
}

impl DeviceProfile {
    pub fn new(width: i32, height: i32, bpp: i32, flags: DeviceFlags) -> Self {
        Self {
            width,
            height,
            pitch: width * bpp,
            bpp,
            hdmi_width: 0,
            flags,
        }
    }

    pub fn with_hdmi_width(mut self, hdmi_width: i32) -> Self {
        self.hdmi_width = hdmi_width;
        self
    }

    /// 640×480 4:3 panel with a software scaler (Trimui-class).
    pub fn vga_fit() -> Self {
        Self::new(640, 480, 2, DeviceFlags::FIT).with_hdmi_width(1280)
    }

    /// 320×240 panel, integer-only scaler, no HDMI.
    pub fn qvga_integer() -> Self {
        Self::new(320, 240, 2, DeviceFlags::empty())
    }

    /// 720×720 square panel with a software scaler.
    pub fn square_fit() -> Self {
        Self::new(720, 720, 2, DeviceFlags::FIT)
    }

    /// 1280×720 oversized HDMI output, integer-only hardware scaler.
    pub fn hdmi_oversized() -> Self {
        Self::new(1280, 720, 2, DeviceFlags::HDMI).with_hdmi_width(1280)
    }
}
