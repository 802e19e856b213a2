//! Blocking client for the device's HTTP API (OpenAPI v1, port 16021).

use super::{DeviceError, url_host};
use crate::types::{PanelId, PanelPosition};
use core::time::Duration;
use log::debug;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::json;

pub const API_PORT: u16 = 16021;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct NewUser {
    auth_token: String,
}

#[derive(Debug, Deserialize)]
struct Layout {
    #[serde(rename = "positionData", default)]
    position_data: Vec<RawPosition>,
}

#[derive(Debug, Deserialize)]
struct RawPosition {
    #[serde(rename = "panelId")]
    panel_id: u16,
    x: i32,
    y: i32,
    #[serde(default)]
    o: i32,
}

impl From<RawPosition> for PanelPosition {
    fn from(raw: RawPosition) -> Self {
        PanelPosition {
            panel: PanelId(raw.panel_id),
            x: raw.x,
            y: raw.y,
            orientation: raw.o,
        }
    }
}

/// Parses the body of `GET /panelLayout/layout`.
pub fn parse_layout(body: &str) -> Result<Vec<PanelPosition>, serde_json::Error> {
    let layout: Layout = serde_json::from_str(body)?;
    Ok(layout.position_data.into_iter().map(PanelPosition::from).collect())
}

/// Client bound to one device address.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base: String,
}

impl ApiClient {
    pub fn new(address: &str) -> Result<Self, DeviceError> {
        Self::with_port(address, API_PORT)
    }

    fn with_port(address: &str, port: u16) -> Result<Self, DeviceError> {
        // Controllers live on the local network; never route them through a proxy.
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .no_proxy()
            .build()?;
        Ok(Self {
            http,
            base: format!("http://{}:{}/api/v1", url_host(address), port),
        })
    }

    fn check(status: StatusCode) -> Result<(), DeviceError> {
        match status {
            s if s.is_success() => Ok(()),
            StatusCode::UNAUTHORIZED => Err(DeviceError::Unauthorized),
            s => Err(DeviceError::Status(s)),
        }
    }

    /// Requests a new auth token. The device must be in pairing mode.
    pub fn add_user(&self) -> Result<String, DeviceError> {
        let url = format!("{}/new", self.base);
        debug!("POST {}", url);
        let response = self.http.post(&url).send()?;
        if response.status() == StatusCode::FORBIDDEN {
            return Err(DeviceError::NotPairing);
        }
        Self::check(response.status())?;
        Ok(response.json::<NewUser>()?.auth_token)
    }

    /// Panels as the device lays them out, in device order.
    pub fn panel_layout(&self, token: &str) -> Result<Vec<PanelPosition>, DeviceError> {
        let url = format!("{}/{}/panelLayout/layout", self.base, token);
        debug!("GET {}", url);
        let response = self.http.get(&url).send()?;
        Self::check(response.status())?;
        Ok(parse_layout(&response.text()?)?)
    }

    /// Switches the device into external-control (v2) streaming mode.
    pub fn start_external_control(&self, token: &str) -> Result<(), DeviceError> {
        let url = format!("{}/{}/effects", self.base, token);
        debug!("PUT {}", url);
        let body = json!({
            "write": {
                "command": "display",
                "animType": "extControl",
                "extControlVersion": "v2",
            }
        });
        let response = self.http.put(&url).json(&body).send()?;
        Self::check(response.status())
    }
}
