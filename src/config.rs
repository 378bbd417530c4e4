use std::time::Duration;

/// Sysfs pwm chip driving the fan (GPIO 18 = PWM0 on pwmchip0)
pub const PWM_CHIP: &str = "/sys/class/pwm/pwmchip0";

/// Channel number under the chip
pub const PWM_CHANNEL: u32 = 0;

/// PWM frequency: 100Hz gives the full 0-100% control range
pub const PWM_FREQUENCY_HZ: u64 = 100;

/// Period in nanoseconds, derived from the frequency
pub const PWM_PERIOD_NS: u64 = 1_000_000_000 / PWM_FREQUENCY_HZ;

/// Thermal zone file with the device temperature in millidegrees C
pub const THERMAL_ZONE: &str = "/sys/class/thermal/thermal_zone0/temp";

/// Polling rate
/// How often we update the temperature reading and potentially the duty cycle
pub const UPDATE_DELAY_S: u64 = 2;

/// At or below this temperature the fan may be commanded off
pub const FAN_OFF_TEMP_C: f32 = 37.0;

/// At or above this temperature the fan runs at its maximum configured duty
pub const MAX_TEMP_C: f32 = 45.0;

/// Minimum temperature delta since the last applied change before we
/// recompute the duty at all, so sensor noise doesn't chatter the output
pub const HYSTERESIS_C: f32 = 2.0;

/// How long the fan keeps spinning at a minimum duty after the temperature
/// drops to the cutoff, before it is allowed to fully stop
pub const MIN_FAN_ON_TIME_S: u64 = 30;

/// Ceiling on the computed duty in variable mode, independent of MAX_TEMP_C
/// (e.g. 50 caps a nominally full-range computation at half the pwm range)
pub const MAX_PWM_DUTY: u8 = 100;

/// The two output levels used in two-speed mode
pub const TWO_SPEED_LOW_DUTY: u8 = 11;
pub const TWO_SPEED_HIGH_DUTY: u8 = 100;

/// Default control policy, overridable via PWMFANCTL_MODE at startup
pub const MODE: Mode = Mode::Variable {
    max_pwm_duty: MAX_PWM_DUTY,
};

/// Env var selecting the policy for this run ("variable" or "two-speed")
pub const MODE_ENV: &str = "PWMFANCTL_MODE";

/// Control policy, fixed at startup
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Linear interpolation between the cutoff and max temperatures,
    /// capped at `max_pwm_duty`
    Variable { max_pwm_duty: u8 },
    /// Binary step between exactly two output levels
    TwoSpeed { low_duty: u8, high_duty: u8 },
}

/// Immutable controller configuration, built once at startup and passed
/// into the controller. Never read from globals during ticks.
#[derive(Clone, Debug)]
pub struct Config {
    pub fan_off_temp: f32,
    pub max_temp: f32,
    pub hysteresis: f32,
    pub min_fan_on_time: Duration,
    pub poll_interval: Duration,
    pub mode: Mode,
}

impl Config {
    /// Built once at startup; only the policy is selectable per run, the
    /// thresholds are compile-time
    pub fn from_env() -> Self {
        let mode = match std::env::var(MODE_ENV).as_deref() {
            Ok("two-speed") => Mode::TwoSpeed {
                low_duty: TWO_SPEED_LOW_DUTY,
                high_duty: TWO_SPEED_HIGH_DUTY,
            },
            Ok("variable") => Mode::Variable {
                max_pwm_duty: MAX_PWM_DUTY,
            },
            Ok(other) => {
                log::warn!("unknown {} value \"{}\", using default", MODE_ENV, other);
                MODE
            }
            Err(_) => MODE,
        };

        Self {
            fan_off_temp: FAN_OFF_TEMP_C,
            max_temp: MAX_TEMP_C,
            hysteresis: HYSTERESIS_C,
            min_fan_on_time: Duration::from_secs(MIN_FAN_ON_TIME_S),
            poll_interval: Duration::from_secs(UPDATE_DELAY_S),
            mode,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_temp <= self.fan_off_temp {
            return Err(format!(
                "max_temp ({}) must be above fan_off_temp ({})",
                self.max_temp, self.fan_off_temp
            ));
        }
        if self.hysteresis < 0.0 {
            return Err(format!(
                "hysteresis must not be negative ({})",
                self.hysteresis
            ));
        }
        match self.mode {
            Mode::Variable { max_pwm_duty } => {
                if max_pwm_duty == 0 || max_pwm_duty > 100 {
                    return Err(format!("max_pwm_duty ({}) must be in 1..=100", max_pwm_duty));
                }
            }
            Mode::TwoSpeed { low_duty, high_duty } => {
                if low_duty == 0 {
                    return Err("two-speed low_duty must be non-zero".to_string());
                }
                if high_duty > 100 {
                    return Err(format!("high_duty ({}) must be at most 100", high_duty));
                }
                if low_duty >= high_duty {
                    return Err(format!(
                        "low_duty ({}) must be below high_duty ({})",
                        low_duty, high_duty
                    ));
                }
            }
        }
        Ok(())
    }
}
