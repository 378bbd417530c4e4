use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use crate::util;

/// Settle time after exporting the channel and after zeroing the duty,
/// before touching the next control file
const SETTLE: Duration = Duration::from_millis(100);

/// Sysfs hardware-PWM channel. Releasing it (explicitly or on drop) stops
/// the fan and unexports the channel, whichever way the program exits.
pub struct Pwm {
    chip: PathBuf,
    channel: u32,
    period_ns: u64,
    released: bool,
}

impl Pwm {
    /// Export the channel if needed, program the period and enable output
    pub fn init(chip: &str, channel: u32, period_ns: u64) -> Result<Self, String> {
        let pwm = Self {
            chip: PathBuf::from(chip),
            channel,
            period_ns,
            released: false,
        };

        if !pwm.channel_dir().exists() {
            util::write_sysfs("pwm export", &pwm.chip.join("export"), channel)?;
            // give the kernel a moment to create the channel files
            thread::sleep(SETTLE);
        }
        util::write_sysfs("pwm period", &pwm.channel_file("period"), period_ns)?;
        util::write_sysfs("pwm enable", &pwm.channel_file("enable"), 1)?;

        log::info!(
            "pwm initialized: {}/pwm{} at {}ns period",
            pwm.chip.display(),
            channel,
            period_ns
        );
        Ok(pwm)
    }

    pub fn set_duty(&self, duty_pct: u8) -> Result<(), String> {
        let duty_ns = duty_to_ns(duty_pct, self.period_ns);
        util::write_sysfs("pwm duty_cycle", &self.channel_file("duty_cycle"), duty_ns)
    }

    /// Stop the fan, disable and unexport the channel. Every failure is
    /// logged and the remaining steps still run; calling twice is a no-op.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        if let Err(err) = self.set_duty(0) {
            log::warn!("failed to zero duty during release: {}", err);
        }
        thread::sleep(SETTLE);
        if let Err(err) = util::write_sysfs("pwm disable", &self.channel_file("enable"), 0) {
            log::warn!("failed to disable pwm: {}", err);
        }
        if let Err(err) = util::write_sysfs("pwm unexport", &self.chip.join("unexport"), self.channel)
        {
            log::warn!("failed to unexport pwm: {}", err);
        }
        log::info!("pwm released");
    }

    fn channel_dir(&self) -> PathBuf {
        self.chip.join(format!("pwm{}", self.channel))
    }

    fn channel_file(&self, name: &str) -> PathBuf {
        self.channel_dir().join(name)
    }
}

impl Drop for Pwm {
    fn drop(&mut self) {
        self.release();
    }
}

/// Duty percent to on-time in nanoseconds, truncating like the kernel
/// expects an integer. Percent is clamped to 100 first.
pub fn duty_to_ns(duty_pct: u8, period_ns: u64) -> u64 {
    period_ns * duty_pct.min(100) as u64 / 100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duty_to_ns_spans_the_period() {
        assert_eq!(0, duty_to_ns(0, 10_000_000));
        assert_eq!(100_000, duty_to_ns(1, 10_000_000));
        assert_eq!(3_800_000, duty_to_ns(38, 10_000_000));
        assert_eq!(10_000_000, duty_to_ns(100, 10_000_000));
    }

    #[test]
    fn duty_to_ns_clamps_overrange_percent() {
        assert_eq!(10_000_000, duty_to_ns(150, 10_000_000));
        assert_eq!(10_000_000, duty_to_ns(u8::MAX, 10_000_000));
    }
}
