//! Bresenham frame pacer.
//!
//! Decouples core stepping from the display refresh rate: each vsync, the
//! accumulator decides whether to step emulation or repeat the previous
//! frame. Q16.16 fixed point keeps the long-run step ratio exact with no
//! floating-point drift.
//!
//! Example, 60fps game on a 72Hz panel:
//! step, repeat, step, step, step, step — 5 steps per 6 vsyncs = 60fps.

/// Relative rate mismatch below which pacing is bypassed entirely. Audio
/// rate control absorbs differences this small (59.94fps @ 60Hz and the
/// like), so the accumulator would only add repeat jitter.
const DIRECT_TOLERANCE: f64 = 0.01;

const Q16_ONE: f64 = 65536.0;

/// Step-vs-repeat scheduler for mismatched game/display rates.
#[derive(Debug)]
pub struct FramePacer {
    game_fps: f64,
    display_hz: f64,
    game_fps_q16: i32,
    display_hz_q16: i32,
    accumulator: i32,
    direct: bool,
}

impl FramePacer {
    /// Create a pacer for the given rates. `display_hz` values ≤ 0 fall back
    /// to 60. The accumulator starts full so the first vsync always steps
    /// (no stale frame on startup).
    pub fn new(game_fps: f64, display_hz: f64) -> Self {
        let display_hz = if display_hz > 0.0 { display_hz } else { 60.0 };

        let game_fps_q16 = (game_fps * Q16_ONE) as i32;
        let display_hz_q16 = (display_hz * Q16_ONE) as i32;
        let direct = (game_fps - display_hz).abs() / display_hz < DIRECT_TOLERANCE;

        tracing::info!(
            game_fps,
            display_hz,
            direct,
            "pacer: {} mode",
            if direct { "direct" } else { "paced" }
        );

        Self {
            game_fps,
            display_hz,
            game_fps_q16,
            display_hz_q16,
            accumulator: display_hz_q16,
            direct,
        }
    }

    /// Call once per vsync. Returns true if the core should step, false if
    /// the previous frame should be presented again.
    pub fn step(&mut self) -> bool {
        if self.direct {
            return true;
        }

        if self.accumulator >= self.display_hz_q16 {
            self.accumulator -= self.display_hz_q16;
            self.accumulator += self.game_fps_q16;
            return true;
        }

        self.accumulator += self.game_fps_q16;
        false
    }

    /// Refill the accumulator so the next vsync steps. Call on any timing
    /// discontinuity (game load, state load).
    pub fn reset(&mut self) {
        self.accumulator = self.display_hz_q16;
    }

    pub fn is_direct(&self) -> bool {
        self.direct
    }

    pub fn game_fps(&self) -> f64 {
        self.game_fps
    }

    pub fn display_hz(&self) -> f64 {
        self.display_hz
    }

    pub fn game_fps_q16(&self) -> i32 {
        self.game_fps_q16
    }

    pub fn display_hz_q16(&self) -> i32 {
        self.display_hz_q16
    }
}
