//! JSON file helpers, the output format matches the files QMK and Vial tooling write.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::ser::PrettyFormatter;

use crate::error::{ConfigError, ConfigResult};

pub fn read_json<T: DeserializeOwned>(path: &Path) -> ConfigResult<T> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::JsonParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Serialize with 4-space indentation
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> ConfigResult<String> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut ser)?;
    // serde_json only emits valid UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// `<path>.tmp`, next to the final file so the rename stays on one file system
pub fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Write the JSON to `<path>.tmp` and rename it over `path`. The tmp file is removed on failure.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> ConfigResult<()> {
    let content = to_pretty_json(value)? + "\n";
    let tmp = tmp_path(path);
    let result = fs::write(&tmp, content).and_then(|_| fs::rename(&tmp, path));
    if let Err(source) = result {
        let _ = fs::remove_file(&tmp);
        return Err(ConfigError::FileWrite {
            path: path.to_path_buf(),
            source,
        });
    }
    Ok(())
}
