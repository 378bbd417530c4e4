use std::path::PathBuf;

use crate::util;

/// Thermal zone sensor, reports the device temperature in millidegrees C
pub struct TempSensor {
    path: PathBuf,
}

impl TempSensor {
    pub fn new(path: &str) -> Self {
        Self {
            path: PathBuf::from(path),
        }
    }

    pub fn read_temperature(&self) -> Result<f32, String> {
        let raw = util::read_sysfs("temperature", &self.path)?;
        let millideg: i32 = raw.trim().parse().map_err(|err| {
            format!(
                "temperature value \"{}\" from {} not parsable: {}",
                raw.trim(),
                self.path.display(),
                err
            )
        })?;
        Ok(millideg as f32 / 1000.0)
    }
}
