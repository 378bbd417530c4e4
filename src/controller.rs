use std::time::{Duration, Instant};

use crate::config::{Config, Mode};

/// Duty that keeps the fan spinning in variable mode while we wait out the
/// minimum on-time, instead of stalling and restarting it when the
/// temperature oscillates around the cutoff
pub const MIN_SPIN_DUTY: u8 = 1;

pub struct Controller {
    config: Config,
    /// Last applied duty cycle
    duty: u8,
    /// Temperature at the last duty transition, the hysteresis reference.
    /// Only updated when the applied duty actually changes.
    reference_temp: f32,
    /// Last sampled temperature, for status reporting only
    last_temp: f32,
    /// When the reading first dropped to the cutoff; None while above it
    below_cutoff_since: Option<Instant>,
}

impl Controller {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            duty: 0,
            reference_temp: 0.0,
            last_temp: 0.0,
            below_cutoff_since: None,
        }
    }

    /// One control step. Returns the new duty if it changed and should be
    /// written to the hardware, None if the output is to be left alone.
    pub fn tick(&mut self, temp: f32, now: Instant) -> Option<u8> {
        self.last_temp = temp;

        // The cutoff timer runs every tick, even when the hysteresis gate
        // suppresses the duty decision below. "How long has it been cold"
        // must stay accurate independent of gating.
        let below_for = self.track_cutoff(temp, now);

        if self.duty != 0 && (temp - self.reference_temp).abs() < self.config.hysteresis {
            log::debug!(
                "temp delta {:.2}C below hysteresis {:.2}C, keeping duty {}%",
                temp - self.reference_temp,
                self.config.hysteresis,
                self.duty
            );
            return None;
        }

        let next = compute_duty(&self.config, temp, below_for);
        if next == self.duty {
            // No transition, so the hysteresis reference stays put as well
            return None;
        }

        self.duty = next;
        self.reference_temp = temp;
        Some(next)
    }

    /// Last applied duty cycle, for status reporting
    pub fn duty(&self) -> u8 {
        self.duty
    }

    /// Last sampled temperature, for status reporting
    pub fn last_temp(&self) -> f32 {
        self.last_temp
    }

    fn track_cutoff(&mut self, temp: f32, now: Instant) -> Duration {
        if temp > self.config.fan_off_temp {
            self.below_cutoff_since = None;
            return Duration::ZERO;
        }

        match self.below_cutoff_since {
            Some(since) => now.duration_since(since),
            None => {
                self.below_cutoff_since = Some(now);
                Duration::ZERO
            }
        }
    }
}

/// Pure temperature -> duty decision. `below_cutoff_for` is how long the
/// reading has continuously been at or below the cutoff.
pub fn compute_duty(config: &Config, temp: f32, below_cutoff_for: Duration) -> u8 {
    if temp <= config.fan_off_temp {
        if below_cutoff_for >= config.min_fan_on_time {
            return 0;
        }
        // Still inside the minimum on-time, keep it spinning
        return match config.mode {
            Mode::Variable { .. } => MIN_SPIN_DUTY,
            Mode::TwoSpeed { low_duty, .. } => low_duty,
        };
    }

    match config.mode {
        Mode::TwoSpeed {
            low_duty,
            high_duty,
        } => {
            if temp >= config.max_temp {
                high_duty
            } else {
                low_duty
            }
        }
        Mode::Variable { max_pwm_duty } => {
            let pct = if temp >= config.max_temp {
                100.0
            } else {
                (temp - config.fan_off_temp) / (config.max_temp - config.fan_off_temp) * 100.0
            };
            // Nearest integer, halves away from zero, then the configured cap
            (pct.round() as u8).min(max_pwm_duty).min(100)
        }
    }
}
