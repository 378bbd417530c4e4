use std::fmt::Display;
use std::fs;
use std::path::Path;

pub fn write_sysfs(name: &str, path: &Path, value: impl Display) -> Result<(), String> {
    let value = value.to_string();
    log::trace!("{}: writing \"{}\" to {}", name, value, path.display());
    fs::write(path, value)
        .map_err(|err| format!("writing {} ({}) failed: {}", name, path.display(), err))
}

pub fn read_sysfs(name: &str, path: &Path) -> Result<String, String> {
    fs::read_to_string(path)
        .map_err(|err| format!("reading {} ({}) failed: {}", name, path.display(), err))
}
