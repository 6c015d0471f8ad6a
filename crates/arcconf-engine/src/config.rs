//! Engine configuration
//!
//! Read from YAML; every key is optional and falls back to the default
//! below. Command-line flags override file values after loading.
//!
//! ```yaml
//! device_base: "cn=Devices,cn=DICOM Configuration,dc=example,dc=org"
//! verbosity: verbose
//! log_profile: production
//! database: /var/lib/arcconf/arcconf.db
//! ```

#![allow(clippy::result_large_err)]

use arcconf_core::changelog::Verbosity;
use arcconf_core::errors::{ExError, ExErrorKind};
use arcconf_core::logging_facility::Profile;
use arcconf_core::path::{Path, Rdn};
use arcconf_store::errors::{io_error, Result};
use serde::Deserialize;
use std::path::PathBuf;

pub const DEFAULT_DEVICE_BASE: &str = "cn=Devices,cn=DICOM Configuration,dc=dcm4che,dc=org";
pub const DEVICE_NAME_ATTRIBUTE: &str = "dicomDeviceName";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Entry under which device entries live
    pub device_base: String,
    /// Change-log detail for sync runs
    pub verbosity: Verbosity,
    pub log_profile: Profile,
    /// SQLite database file
    pub database: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            device_base: DEFAULT_DEVICE_BASE.to_string(),
            verbosity: Verbosity::default(),
            log_profile: Profile::default(),
            database: PathBuf::from("arcconf.db"),
        }
    }
}

impl EngineConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        // An empty file is a valid, all-default config
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(text).map_err(|e| {
            ExError::new(ExErrorKind::InvalidInput)
                .with_op("load_config")
                .with_message(format!("Invalid engine config: {}", e))
        })?;
        config.device_base_path()?;
        Ok(config)
    }

    pub fn load(path: &std::path::Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| io_error("load_config", e))?;
        Self::from_yaml_str(&text)
    }

    pub fn device_base_path(&self) -> Result<Path> {
        Ok(Path::parse(&self.device_base)?)
    }

    /// Path of the device entry named `device_name`
    pub fn device_path(&self, device_name: &str) -> Result<Path> {
        Ok(self
            .device_base_path()?
            .child(Rdn::single(DEVICE_NAME_ATTRIBUTE, device_name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(EngineConfig::from_yaml_str("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = EngineConfig::from_yaml_str("verbosity: verbose\nlog_profile: production\n")
            .unwrap();
        assert_eq!(config.verbosity, Verbosity::Verbose);
        assert_eq!(config.log_profile, Profile::Production);
        assert_eq!(config.device_base, DEFAULT_DEVICE_BASE);
    }

    #[test]
    fn test_device_path() {
        let config = EngineConfig::from_yaml_str("device_base: dc=example,dc=org").unwrap();
        assert_eq!(
            config.device_path("arc").unwrap().to_string(),
            "dicomDeviceName=arc,dc=example,dc=org"
        );
    }

    #[test]
    fn test_rejects_unknown_keys_and_bad_base() {
        let err = EngineConfig::from_yaml_str("colour: blue").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidInput);
        let err = EngineConfig::from_yaml_str("device_base: 'not a path'").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidPath);
    }
}
