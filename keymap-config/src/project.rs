use std::io;
use std::path::{Path, PathBuf};

use config::{Config, File, FileFormat};
use keymap_core::config::LayerReportConfig;
use keymap_types::protocol::layer_status::MAX_KEYBOARD_ID;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// File name of the per keyboard config, `keyboards/<id>/keyboard.toml`
pub const KEYBOARD_CONFIG_FILE: &str = "keyboard.toml";

const DEFAULT_KEYBOARD_CONFIG: &str = include_str!("default_config/keyboard.toml");

/// Configurations of one keyboard in the project
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct KeyboardConfig {
    pub keyboard: KeyboardInfo,
    pub raw_hid: RawHidConfig,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct KeyboardInfo {
    /// QMK keyboard path passed to `qmk compile -kb`
    pub qmk_keyboard: String,
    /// QMK keymap directory name, `-km`
    pub keymap: String,
    /// Layout macro the keymap is written against
    pub layout: String,
}

/// The raw HID layer status report
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct RawHidConfig {
    /// Sent in the lower 7 bits of the status byte
    pub keyboard_id: u8,
    pub report_id: u8,
}

impl KeyboardConfig {
    pub fn layer_report(&self) -> LayerReportConfig {
        LayerReportConfig::new(self.raw_hid.report_id, self.raw_hid.keyboard_id)
    }

    /// The merged config, defaults included
    pub fn to_toml(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.keyboard.qmk_keyboard.trim().is_empty() {
            return Err(ConfigError::MissingField("keyboard.qmk_keyboard".to_string()));
        }
        if self.raw_hid.keyboard_id > MAX_KEYBOARD_ID {
            return Err(ConfigError::InvalidValue {
                field: "raw_hid.keyboard_id".to_string(),
                value: self.raw_hid.keyboard_id.to_string(),
                expected: format!("0..={}", MAX_KEYBOARD_ID),
            });
        }
        Ok(())
    }
}

/// Paths of the project checkout
pub struct ProjectContext {
    root_dir: PathBuf,
    keyboards_dir: PathBuf,
}

impl ProjectContext {
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(root: P, keyboards_dir: Q) -> Self {
        Self {
            root_dir: root.as_ref().to_path_buf(),
            keyboards_dir: keyboards_dir.as_ref().to_path_buf(),
        }
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn keyboards_dir(&self) -> &Path {
        &self.keyboards_dir
    }

    /// Keyboard ids are used as directory names, so separators and dots are rejected
    pub fn validate_keyboard_id(id: &str) -> ConfigResult<()> {
        if id.trim().is_empty() {
            return Err(ConfigError::validation("keyboard_id", "Keyboard ID cannot be empty"));
        }
        if !id.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
            return Err(ConfigError::validation(
                "keyboard_id",
                format!(
                    "Invalid Keyboard ID '{}': Only alphanumeric characters, underscores, and hyphens are allowed",
                    id
                ),
            ));
        }
        Ok(())
    }

    pub fn keyboard_dir(&self, keyboard_id: &str) -> ConfigResult<PathBuf> {
        Self::validate_keyboard_id(keyboard_id)?;
        Ok(self.keyboards_dir.join(keyboard_id))
    }

    /// Load `keyboard.toml` of the keyboard, merged over the defaults
    pub fn get_keyboard_config(&self, keyboard_id: &str) -> ConfigResult<KeyboardConfig> {
        let config_path = self.keyboard_dir(keyboard_id)?.join(KEYBOARD_CONFIG_FILE);
        debug!("Reading keyboard config from {:?}", config_path);
        if !config_path.is_file() {
            return Err(ConfigError::FileRead {
                path: config_path,
                source: io::Error::new(io::ErrorKind::NotFound, "keyboard config not found"),
            });
        }

        let config: KeyboardConfig = Config::builder()
            .add_source(File::from_str(DEFAULT_KEYBOARD_CONFIG, FileFormat::Toml))
            .add_source(File::from(config_path.as_path()).format(FileFormat::Toml))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|source| ConfigError::TomlParse {
                path: config_path.clone(),
                source,
            })?;
        config.validate()?;

        debug!("Successfully parsed config for keyboard: {}", keyboard_id);
        Ok(config)
    }

    pub fn get_build_dir(&self, keyboard_id: &str) -> ConfigResult<PathBuf> {
        Self::validate_keyboard_id(keyboard_id)?;
        let build_dir = self.root_dir.join("build").join(keyboard_id);
        debug!("Resolved build directory for {}: {:?}", keyboard_id, build_dir);
        Ok(build_dir)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn write_keyboard(root: &Path, id: &str, content: &str) {
        let dir = root.join("keyboards").join(id);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(KEYBOARD_CONFIG_FILE), content).unwrap();
    }

    #[test]
    fn test_validate_keyboard_id() {
        assert!(ProjectContext::validate_keyboard_id("keyboard1").is_ok());
        assert!(ProjectContext::validate_keyboard_id("123").is_ok());
        assert!(ProjectContext::validate_keyboard_id("abc").is_ok());
        assert!(ProjectContext::validate_keyboard_id("key-board").is_ok());
        assert!(ProjectContext::validate_keyboard_id("key_board").is_ok());

        assert!(ProjectContext::validate_keyboard_id("").is_err());
        assert!(ProjectContext::validate_keyboard_id(" ").is_err());
        assert!(ProjectContext::validate_keyboard_id("key.board").is_err());
        assert!(ProjectContext::validate_keyboard_id("key/board").is_err());
        assert!(ProjectContext::validate_keyboard_id("key\\board").is_err());
        assert!(ProjectContext::validate_keyboard_id("..").is_err());
    }

    #[test]
    fn test_keyboard_config_defaults() {
        let root = tempfile::tempdir().unwrap();
        write_keyboard(
            root.path(),
            "1",
            r#"
[keyboard]
qmk_keyboard = "salicylic_acid3/7skb"

[raw_hid]
keyboard_id = 1
"#,
        );
        let ctx = ProjectContext::new(root.path(), root.path().join("keyboards"));
        let config = ctx.get_keyboard_config("1").unwrap();
        assert_eq!(config.keyboard.qmk_keyboard, "salicylic_acid3/7skb");
        assert_eq!(config.keyboard.keymap, "keymap");
        assert_eq!(config.keyboard.layout, "LAYOUT");
        assert_eq!(config.raw_hid.report_id, 1);
        assert_eq!(config.layer_report(), LayerReportConfig::new(1, 1));
        assert_eq!(ctx.get_build_dir("1").unwrap(), root.path().join("build").join("1"));

        let resolved = config.to_toml().unwrap();
        assert!(resolved.contains("keymap = \"keymap\""));
        assert!(resolved.contains("report_id = 1"));
    }

    #[test]
    fn test_keyboard_config_errors() {
        let root = tempfile::tempdir().unwrap();
        let ctx = ProjectContext::new(root.path(), root.path().join("keyboards"));
        assert!(matches!(ctx.get_keyboard_config("missing"), Err(ConfigError::FileRead { .. })));
        assert!(ctx.get_keyboard_config("../1").is_err());

        write_keyboard(root.path(), "empty", "[raw_hid]\nkeyboard_id = 3\n");
        assert!(matches!(ctx.get_keyboard_config("empty"), Err(ConfigError::MissingField(_))));

        write_keyboard(
            root.path(),
            "wide",
            "[keyboard]\nqmk_keyboard = \"doio/kb16/rev2\"\n[raw_hid]\nkeyboard_id = 200\n",
        );
        assert!(matches!(ctx.get_keyboard_config("wide"), Err(ConfigError::InvalidValue { .. })));
    }
}
