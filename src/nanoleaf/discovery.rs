//! SSDP discovery of Nanoleaf controllers on the local network.

use super::DeviceError;
use crate::time::CancelToken;
use core::time::Duration;
use log::{debug, info};
use std::io;
use std::net::UdpSocket;
use std::time::Instant;

const SSDP_ADDR: &str = "239.255.255.250:1900";
const SEARCH_TARGET: &str = "nanoleaf_aurora:light";

/// Longest wait between cancellation checks.
const POLL_SLICE: Duration = Duration::from_millis(100);

fn search_request() -> String {
    format!(
        "M-SEARCH * HTTP/1.1\r\nHOST: {}\r\nMAN: \"ssdp:discover\"\r\nMX: 1\r\nST: {}\r\n\r\n",
        SSDP_ADDR, SEARCH_TARGET
    )
}

fn header<'a>(response: &'a str, name: &str) -> Option<&'a str> {
    response.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        key.trim().eq_ignore_ascii_case(name).then(|| value.trim())
    })
}

/// Extracts the controller's host from an SSDP response.
///
/// Returns `None` for responses from anything that is not a Nanoleaf.
pub fn parse_response(response: &str) -> Option<String> {
    let target = header(response, "ST").or_else(|| header(response, "NT"))?;
    if !target.to_ascii_lowercase().contains("nanoleaf") {
        return None;
    }
    let location = header(response, "Location")?;
    let authority = location
        .split_once("://")
        .map_or(location, |(_, rest)| rest)
        .split('/')
        .next()?;
    let host = match authority.strip_prefix('[') {
        Some(v6) => v6.split(']').next()?,
        None => authority.rsplit_once(':').map_or(authority, |(host, _)| host),
    };
    (!host.is_empty()).then(|| host.to_string())
}

/// Multicasts an M-SEARCH and collects responding controllers until `timeout`.
///
/// Hosts are returned in the order they answered, without duplicates. The
/// search stops early with [`DeviceError::Interrupted`] once `cancel` fires.
pub fn discover(timeout: Duration, cancel: &CancelToken) -> Result<Vec<String>, DeviceError> {
    if cancel.is_cancelled() {
        return Err(DeviceError::Interrupted);
    }
    let socket = UdpSocket::bind("0.0.0.0:0")?;
    socket.send_to(search_request().as_bytes(), SSDP_ADDR)?;
    info!("searching for Nanoleaf devices for {:?}", timeout);

    let deadline = Instant::now() + timeout;
    let mut found = Vec::new();
    let mut buf = [0u8; 2048];

    loop {
        if cancel.is_cancelled() {
            return Err(DeviceError::Interrupted);
        }
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        socket.set_read_timeout(Some(remaining.min(POLL_SLICE)))?;
        let (len, from) = match socket.recv_from(&mut buf) {
            Ok(received) => received,
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
                ) =>
            {
                continue;
            }
            Err(err) => return Err(err.into()),
        };
        let response = String::from_utf8_lossy(&buf[..len]);
        match parse_response(&response) {
            Some(host) if !found.contains(&host) => {
                info!("found device at {}", host);
                found.push(host);
            }
            Some(_) => {}
            None => debug!("ignoring SSDP response from {}", from),
        }
    }
    Ok(found)
}
