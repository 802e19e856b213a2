//! First-run provisioning.
//!
//! When the store is empty the tool finds a controller on the network, waits
//! for the operator to put it into pairing mode, requests a token and records
//! the panels in the order the device reports them.

use crate::nanoleaf::DeviceError;
use crate::order::{OrderError, PanelOrder};
use crate::store::{CredentialStore, DeviceConfig, DeviceCredentials, StoreError};
use crate::time::{Interrupted, Pacer};
use crate::types::PanelPosition;
use core::time::Duration;
use log::info;

/// Trait for the device-side half of provisioning.
pub trait DeviceProvisioner {
    /// Addresses of controllers that answered within `timeout`.
    fn discover(&mut self, timeout: Duration) -> Result<Vec<String>, DeviceError>;

    /// Requests an auth token from a controller in pairing mode.
    fn provision(&mut self, address: &str) -> Result<String, DeviceError>;

    /// Panel layout in device order.
    fn panel_positions(
        &mut self,
        credentials: &DeviceCredentials,
    ) -> Result<Vec<PanelPosition>, DeviceError>;
}

/// Timing knobs for [`load_or_provision`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootstrapOptions {
    pub discovery_timeout: Duration,
    /// Time given to the operator to hold the power button.
    pub pairing_wait: Duration,
}

impl Default for BootstrapOptions {
    fn default() -> Self {
        Self {
            discovery_timeout: Duration::from_secs(10),
            pairing_wait: Duration::from_secs(10),
        }
    }
}

/// Errors raised while loading or creating the configuration.
#[derive(Debug)]
pub enum BootstrapError {
    Store(StoreError),
    /// Nothing on disk and nothing answered discovery.
    NoDeviceFound,
    Device(DeviceError),
    /// The device reported a layout that cannot form a panel order.
    InvalidLayout(OrderError),
    Interrupted,
}

impl core::fmt::Display for BootstrapError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BootstrapError::Store(err) => write!(f, "configuration error: {}", err),
            BootstrapError::NoDeviceFound => write!(
                f,
                "not provisioned and no Nanoleaf devices were discovered"
            ),
            BootstrapError::Device(err) => write!(f, "provisioning failed: {}", err),
            BootstrapError::InvalidLayout(err) => write!(f, "unusable panel layout: {}", err),
            BootstrapError::Interrupted => write!(f, "provisioning interrupted"),
        }
    }
}

impl std::error::Error for BootstrapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BootstrapError::Store(err) => Some(err),
            BootstrapError::Device(err) => Some(err),
            BootstrapError::InvalidLayout(err) => Some(err),
            BootstrapError::NoDeviceFound | BootstrapError::Interrupted => None,
        }
    }
}

impl From<StoreError> for BootstrapError {
    fn from(err: StoreError) -> Self {
        BootstrapError::Store(err)
    }
}

impl From<DeviceError> for BootstrapError {
    fn from(err: DeviceError) -> Self {
        match err {
            DeviceError::Interrupted => BootstrapError::Interrupted,
            err => BootstrapError::Device(err),
        }
    }
}

impl From<Interrupted> for BootstrapError {
    fn from(_: Interrupted) -> Self {
        BootstrapError::Interrupted
    }
}

/// Loads the stored configuration, provisioning a device first if there is none.
pub fn load_or_provision<C, D, P>(
    store: &mut C,
    provisioner: &mut D,
    pacer: &mut P,
    options: BootstrapOptions,
) -> Result<DeviceConfig, BootstrapError>
where
    C: CredentialStore,
    D: DeviceProvisioner,
    P: Pacer,
{
    if let Some(config) = store.load()? {
        return Ok(config);
    }

    let addresses = provisioner.discover(options.discovery_timeout)?;
    let Some(address) = addresses.into_iter().next() else {
        return Err(BootstrapError::NoDeviceFound);
    };
    info!("auto-selected device {}", address);

    info!(
        "hold the device's power button until the LEDs flash; requesting a token in {:?}",
        options.pairing_wait
    );
    pacer.pause(options.pairing_wait)?;

    let auth_token = provisioner.provision(&address)?;
    let credentials = DeviceCredentials {
        address,
        auth_token,
    };

    let positions = provisioner.panel_positions(&credentials)?;
    let panel_order = PanelOrder::from_ids(positions.iter().map(|p| p.panel))
        .map_err(BootstrapError::InvalidLayout)?;
    info!("device reports {} panels: {}", panel_order.len(), panel_order);

    let config = DeviceConfig {
        credentials,
        panel_order,
    };
    store.save(&config)?;
    Ok(config)
}
