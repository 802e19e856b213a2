//! Device credentials and the calibrated panel order, persisted as INI.
//!
//! The file holds one `[device]` section:
//!
//! ```ini
//! [device]
//! address = 192.168.1.40
//! token = 3Ab9...
//! panel_order = 12,7,31
//! ```
//!
//! `panel_order` is written left to right, exactly as calibrated. Keys are
//! case-insensitive; other sections and keys are ignored.

use crate::order::{OrderError, PanelOrder};
use configparser::ini::Ini;
use serde::Deserialize;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

const SECTION: &str = "device";

/// Where the device lives and how to authenticate with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceCredentials {
    /// Host name or IP address of the controller.
    pub address: String,
    /// Token issued during pairing.
    pub auth_token: String,
}

/// Everything the tool persists between runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    pub credentials: DeviceCredentials,
    pub panel_order: PanelOrder,
}

/// The `[device]` section as stored on disk.
#[derive(Debug, Deserialize)]
struct DeviceSection {
    address: String,
    token: String,
    panel_order: String,
}

impl DeviceSection {
    fn into_config(self) -> Result<DeviceConfig, StoreError> {
        let panel_order = PanelOrder::parse(&self.panel_order).map_err(StoreError::InvalidOrder)?;
        Ok(DeviceConfig {
            credentials: DeviceCredentials {
                address: self.address,
                auth_token: self.token,
            },
            panel_order,
        })
    }
}

impl From<&DeviceConfig> for DeviceSection {
    fn from(config: &DeviceConfig) -> Self {
        Self {
            address: config.credentials.address.clone(),
            token: config.credentials.auth_token.clone(),
            panel_order: config.panel_order.to_list(),
        }
    }
}

/// Errors raised while loading or saving configuration.
#[derive(Debug)]
pub enum StoreError {
    /// Reading or writing the file failed.
    Io { path: PathBuf, source: io::Error },

    /// The file is not valid INI.
    Syntax(String),

    /// The device section lacks an entry or has one without a value.
    Section(serde_json::Error),

    /// `panel_order` does not parse.
    InvalidOrder(OrderError),
}

impl core::fmt::Display for StoreError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            StoreError::Io { path, source } => {
                write!(f, "{}: {}", path.display(), source)
            }
            StoreError::Syntax(message) => write!(f, "invalid INI: {}", message),
            StoreError::Section(err) => write!(f, "[{}] section: {}", SECTION, err),
            StoreError::InvalidOrder(err) => write!(f, "invalid panel_order: {}", err),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io { source, .. } => Some(source),
            StoreError::Section(err) => Some(err),
            StoreError::InvalidOrder(err) => Some(err),
            StoreError::Syntax(_) => None,
        }
    }
}

/// Durable home of the [`DeviceConfig`].
pub trait CredentialStore {
    /// Returns `None` when no device has been provisioned yet.
    fn load(&self) -> Result<Option<DeviceConfig>, StoreError>;

    /// Replaces the stored configuration.
    fn save(&mut self, config: &DeviceConfig) -> Result<(), StoreError>;
}

impl<C: CredentialStore + ?Sized> CredentialStore for &mut C {
    fn load(&self) -> Result<Option<DeviceConfig>, StoreError> {
        (**self).load()
    }

    fn save(&mut self, config: &DeviceConfig) -> Result<(), StoreError> {
        (**self).save(config)
    }
}

/// INI file store.
#[derive(Debug, Clone)]
pub struct IniFileStore {
    path: PathBuf,
}

impl IniFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl CredentialStore for IniFileStore {
    fn load(&self) -> Result<Option<DeviceConfig>, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(self.io_error(err)),
        };
        parse_config(&text)
    }

    /// Writes a sibling temporary file and renames it over the target, so a
    /// crash mid-write leaves the previous file intact.
    fn save(&mut self, config: &DeviceConfig) -> Result<(), StoreError> {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let write = || -> io::Result<()> {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(render_config(config).as_bytes())?;
            file.sync_all()?;
            fs::rename(&tmp, &self.path)
        };
        if let Err(err) = write() {
            if tmp.exists() {
                if let Err(cleanup) = fs::remove_file(&tmp) {
                    log::warn!("could not remove {}: {}", tmp.display(), cleanup);
                }
            }
            return Err(self.io_error(err));
        }
        log::debug!("saved configuration to {}", self.path.display());
        Ok(())
    }
}

/// Keeps the configuration in memory. Useful for dry runs and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    config: Option<DeviceConfig>,
    saves: usize,
}

impl MemoryStore {
    pub fn new(config: Option<DeviceConfig>) -> Self {
        Self { config, saves: 0 }
    }

    /// Number of successful `save` calls.
    pub fn saves(&self) -> usize {
        self.saves
    }

    pub fn config(&self) -> Option<&DeviceConfig> {
        self.config.as_ref()
    }
}

impl CredentialStore for MemoryStore {
    fn load(&self) -> Result<Option<DeviceConfig>, StoreError> {
        Ok(self.config.clone())
    }

    fn save(&mut self, config: &DeviceConfig) -> Result<(), StoreError> {
        self.config = Some(config.clone());
        self.saves += 1;
        Ok(())
    }
}

/// Parses INI text. Only the `[device]` section is read.
pub fn parse_config(text: &str) -> Result<Option<DeviceConfig>, StoreError> {
    let mut ini = Ini::new();
    let sections = ini.read(text.to_string()).map_err(StoreError::Syntax)?;
    let Some(entries) = sections.get(SECTION) else {
        return Ok(None);
    };

    // Valueless keys come through as `None` and fail deserialization as null.
    let fields: serde_json::Map<String, serde_json::Value> = entries
        .iter()
        .map(|(key, value)| {
            let value = value
                .clone()
                .map_or(serde_json::Value::Null, serde_json::Value::String);
            (key.clone(), value)
        })
        .collect();
    let section: DeviceSection = serde_json::from_value(serde_json::Value::Object(fields))
        .map_err(StoreError::Section)?;
    section.into_config().map(Some)
}

/// Renders the INI text written by [`IniFileStore::save`].
pub fn render_config(config: &DeviceConfig) -> String {
    let section = DeviceSection::from(config);
    let mut ini = Ini::new();
    ini.set(SECTION, "address", Some(section.address));
    ini.set(SECTION, "token", Some(section.token));
    ini.set(SECTION, "panel_order", Some(section.panel_order));
    ini.writes()
}
