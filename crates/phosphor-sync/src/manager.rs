//! Timing-mode controller.
//!
//! Strategy:
//! - Start in [`SyncMode::AudioClock`] (safe, works on any panel).
//! - Measure the actual refresh rate from vsync intervals until the sample
//!   statistics converge.
//! - Switch to [`SyncMode::Vsync`] once, iff the measured Hz is within 1% of
//!   the game fps.
//! - Keep watching for drift in vsync mode; fall back to audio-clock if the
//!   panel wanders. The fallback is permanent for the session.

/// Capacity of the interval ring buffer.
const RING_CAPACITY: usize = 512;

/// Outlier rejection bounds. Intervals implying a refresh rate outside this
/// range are frame drops or duplicate presents, not real vsyncs.
const MIN_HZ: f64 = 50.0;
const MAX_HZ: f64 = 120.0;

/// Minimum accepted samples before the convergence test runs.
const CONVERGENCE_MIN_SAMPLES: u64 = 60;

/// If the statistics have not converged by this many samples (~30s at 60Hz),
/// freeze the measurement anyway and keep the current mode.
const CONVERGENCE_TIMEOUT_SAMPLES: u64 = 1800;

/// Relative stddev below which the measurement counts as stable.
const STABILITY_THRESHOLD: f64 = 0.01;

/// Relative fps mismatch tolerance for mode selection. Audio pitch shifts
/// under ~0.5% are inaudible; 1% is a conservative switching threshold.
const MODE_TOLERANCE: f64 = 0.01;

/// Drift re-check interval in recorded samples (~5s at 60Hz).
const DRIFT_CHECK_INTERVAL: u32 = 300;

/// Which clock is the timing authority for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Audio hardware drives timing. The core runs every frame and audio
    /// writes block when the output buffer is full; the backpressure paces
    /// the loop. Works with any display refresh rate.
    AudioClock,
    /// Display vsync drives timing. Presentation blocks until vsync; audio
    /// uses non-blocking writes. One frame less latency, but only correct
    /// when the panel's true Hz matches the game fps.
    Vsync,
}

impl SyncMode {
    pub fn name(self) -> &'static str {
        match self {
            SyncMode::AudioClock => "Audio Clock",
            SyncMode::Vsync => "Vsync",
        }
    }
}

impl std::fmt::Display for SyncMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-session timing-mode controller.
///
/// Feed [`SyncManager::record_vsync`] a monotonic microsecond timestamp once
/// per presented frame, strictly sequentially. Everything else is accessors.
#[derive(Debug)]
pub struct SyncManager {
    mode: SyncMode,
    game_fps: f64,
    display_hz: f64,
    frame_intervals: [u64; RING_CAPACITY],
    sample_count: u64,
    write_index: usize,
    measurement_stable: bool,
    measured_hz: f64,
    measurement_confidence: f64,
    last_drift_check: u32,
    last_vsync_time: u64,
}

impl SyncManager {
    /// Create a manager for one emulation session.
    ///
    /// `display_hz` is the reported (nominal) refresh rate; values ≤ 0 fall
    /// back to 60. Starts in audio-clock mode.
    pub fn new(game_fps: f64, display_hz: f64) -> Self {
        let display_hz = if display_hz > 0.0 { display_hz } else { 60.0 };
        let manager = Self {
            mode: SyncMode::AudioClock,
            game_fps,
            display_hz,
            frame_intervals: [0; RING_CAPACITY],
            sample_count: 0,
            write_index: 0,
            measurement_stable: false,
            measured_hz: 0.0,
            measurement_confidence: 0.0,
            last_drift_check: 0,
            last_vsync_time: 0,
        };
        tracing::info!(
            game_fps,
            display_hz,
            "sync: starting in {} mode",
            manager.mode
        );
        manager
    }

    /// Record one presented frame.
    ///
    /// `now_us` is a monotonic microsecond timestamp taken right after the
    /// present call returned. The first call only seeds the clock. Zero
    /// intervals and intervals outside the 50–120Hz band are discarded.
    pub fn record_vsync(&mut self, now_us: u64) {
        if self.last_vsync_time == 0 {
            self.last_vsync_time = now_us;
            return;
        }

        let interval = now_us.wrapping_sub(self.last_vsync_time);
        self.last_vsync_time = now_us;
        if interval == 0 {
            return;
        }
        let hz = 1_000_000.0 / interval as f64;
        if !(MIN_HZ..=MAX_HZ).contains(&hz) {
            return;
        }

        self.frame_intervals[self.write_index] = interval;
        self.write_index = (self.write_index + 1) % RING_CAPACITY;
        self.sample_count += 1;

        if self.measurement_stable {
            self.check_drift();
        } else {
            self.check_convergence();
        }
    }

    /// Number of interval samples in the current statistics window.
    fn window_len(&self) -> usize {
        self.sample_count.min(RING_CAPACITY as u64) as usize
    }

    fn window_mean_us(&self) -> f64 {
        let n = self.window_len();
        let sum: u64 = self.frame_intervals[..n].iter().sum();
        sum as f64 / n as f64
    }

    /// Sample standard deviation (n − 1 denominator) over the window.
    fn window_stddev_us(&self, mean: f64) -> f64 {
        let n = self.window_len();
        let sum_sq: f64 = self.frame_intervals[..n]
            .iter()
            .map(|&v| {
                let d = v as f64 - mean;
                d * d
            })
            .sum();
        (sum_sq / (n as f64 - 1.0)).sqrt()
    }

    fn check_convergence(&mut self) {
        if self.sample_count < CONVERGENCE_MIN_SAMPLES {
            return;
        }

        let mean = self.window_mean_us();
        let confidence = self.window_stddev_us(mean) / mean;
        self.measured_hz = 1_000_000.0 / mean;
        self.measurement_confidence = confidence;

        if confidence < STABILITY_THRESHOLD {
            self.measurement_stable = true;
            tracing::info!(
                samples = self.sample_count,
                measured_hz = self.measured_hz,
                confidence,
                reported_hz = self.display_hz,
                "sync: measurement stable"
            );

            let mismatch = (self.measured_hz - self.game_fps).abs() / self.game_fps;
            if mismatch < MODE_TOLERANCE {
                self.mode = SyncMode::Vsync;
                tracing::info!(
                    measured_hz = self.measured_hz,
                    game_fps = self.game_fps,
                    "sync: switching to {} mode",
                    self.mode
                );
            } else {
                tracing::info!(
                    measured_hz = self.measured_hz,
                    game_fps = self.game_fps,
                    mismatch_pct = mismatch * 100.0,
                    "sync: staying in {} mode",
                    self.mode
                );
            }
        } else if self.sample_count >= CONVERGENCE_TIMEOUT_SAMPLES {
            // Panel never settled; give up measuring and stay put.
            self.measurement_stable = true;
            tracing::info!(
                samples = self.sample_count,
                measured_hz = self.measured_hz,
                confidence,
                "sync: measurement did not converge, freezing in {} mode",
                self.mode
            );
        }
    }

    fn check_drift(&mut self) {
        if self.mode != SyncMode::Vsync {
            return;
        }

        self.last_drift_check += 1;
        if self.last_drift_check < DRIFT_CHECK_INTERVAL {
            return;
        }
        self.last_drift_check = 0;

        let hz = 1_000_000.0 / self.window_mean_us();
        let mismatch = (hz - self.game_fps).abs() / self.game_fps;
        if mismatch >= MODE_TOLERANCE {
            tracing::info!(
                current_hz = hz,
                game_fps = self.game_fps,
                mismatch_pct = mismatch * 100.0,
                "sync: drift detected, falling back to {} mode",
                SyncMode::AudioClock
            );
            self.mode = SyncMode::AudioClock;
        }
    }

    pub fn mode(&self) -> SyncMode {
        self.mode
    }

    pub fn game_fps(&self) -> f64 {
        self.game_fps
    }

    pub fn display_hz(&self) -> f64 {
        self.display_hz
    }

    /// Number of accepted interval samples so far.
    pub fn sample_count(&self) -> u64 {
        self.sample_count
    }

    /// Measured display Hz, or 0.0 until the measurement is stable.
    pub fn measured_hz(&self) -> f64 {
        if self.measurement_stable {
            self.measured_hz
        } else {
            0.0
        }
    }

    /// Relative stddev of the interval window at the time the measurement
    /// froze, or 0.0 until stable.
    pub fn measurement_confidence(&self) -> f64 {
        if self.measurement_stable {
            self.measurement_confidence
        } else {
            0.0
        }
    }

    pub fn is_measurement_stable(&self) -> bool {
        self.measurement_stable
    }

    /// Whether the core should advance this loop iteration. Always true in
    /// both modes: mismatch is absorbed by frame duplication, never by
    /// skipping core frames.
    pub fn should_run_core(&self) -> bool {
        true
    }

    /// Whether audio writes should block when the output buffer is full.
    /// Blocking writes are the pacing source in audio-clock mode.
    pub fn should_block_audio(&self) -> bool {
        self.mode == SyncMode::AudioClock
    }

    /// Whether light (±0.8%) audio rate correction should run. Always true:
    /// keeping the audio ring near 50% fill is buffer health, independent of
    /// which clock is the timing authority.
    pub fn should_use_rate_control(&self) -> bool {
        true
    }
}
