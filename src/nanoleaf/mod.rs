//! Nanoleaf device access: SSDP discovery, the HTTP API and the UDP
//! external-control stream.

pub mod api;
pub mod discovery;
pub mod stream;

use crate::bootstrap::DeviceProvisioner;
use crate::store::DeviceCredentials;
use crate::time::CancelToken;
use crate::types::PanelPosition;
use core::time::Duration;

pub use api::ApiClient;
pub use stream::UdpPanelStream;

/// Errors talking to the device.
#[derive(Debug)]
pub enum DeviceError {
    /// The HTTP request failed or the body did not decode.
    Http(reqwest::Error),

    /// Pairing was refused: the device is not in pairing mode.
    NotPairing,

    /// The response body did not match the expected shape.
    Decode(serde_json::Error),

    /// The stored token was rejected.
    Unauthorized,

    /// Any other unexpected HTTP status.
    Status(reqwest::StatusCode),

    /// Socket-level failure (discovery or stream setup).
    Io(std::io::Error),

    /// The operator cancelled the operation.
    Interrupted,
}

impl core::fmt::Display for DeviceError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DeviceError::Http(err) => write!(f, "http request failed: {}", err),
            DeviceError::NotPairing => write!(
                f,
                "device refused pairing; hold the power button until the LEDs flash, then retry"
            ),
            DeviceError::Decode(err) => write!(f, "unexpected response body: {}", err),
            DeviceError::Unauthorized => write!(f, "device rejected the auth token"),
            DeviceError::Status(status) => write!(f, "unexpected response: {}", status),
            DeviceError::Io(err) => write!(f, "network error: {}", err),
            DeviceError::Interrupted => write!(f, "interrupted"),
        }
    }
}

impl std::error::Error for DeviceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DeviceError::Http(err) => Some(err),
            DeviceError::Decode(err) => Some(err),
            DeviceError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for DeviceError {
    fn from(err: reqwest::Error) -> Self {
        DeviceError::Http(err)
    }
}

impl From<serde_json::Error> for DeviceError {
    fn from(err: serde_json::Error) -> Self {
        DeviceError::Decode(err)
    }
}

impl From<std::io::Error> for DeviceError {
    fn from(err: std::io::Error) -> Self {
        DeviceError::Io(err)
    }
}

/// Formats `address` for use as a URL host, bracketing bare IPv6 literals.
pub(crate) fn url_host(address: &str) -> String {
    if address.contains(':') && !address.starts_with('[') {
        format!("[{}]", address)
    } else {
        address.to_string()
    }
}

/// [`DeviceProvisioner`] for real devices on the local network.
#[derive(Debug, Default)]
pub struct NanoleafProvisioner {
    cancel: CancelToken,
}

impl NanoleafProvisioner {
    /// Discovery gives up as soon as `cancel` fires.
    pub fn new(cancel: CancelToken) -> Self {
        Self { cancel }
    }
}

impl DeviceProvisioner for NanoleafProvisioner {
    fn discover(&mut self, timeout: Duration) -> Result<Vec<String>, DeviceError> {
        discovery::discover(timeout, &self.cancel)
    }

    fn provision(&mut self, address: &str) -> Result<String, DeviceError> {
        ApiClient::new(address)?.add_user()
    }

    fn panel_positions(
        &mut self,
        credentials: &DeviceCredentials,
    ) -> Result<Vec<PanelPosition>, DeviceError> {
        ApiClient::new(&credentials.address)?.panel_layout(&credentials.auth_token)
    }
}
