//! External-control v2 stream over UDP.
//!
//! Each datagram carries one panel update:
//!
//! ```text
//! nPanels:u16be | panelId:u16be | R:u8 G:u8 B:u8 W:u8 | transition:u16be
//! ```
//!
//! Transition time is counted in 100 ms units.

use super::{ApiClient, DeviceError};
use crate::command::{PanelCommand, PanelCommandSink, SinkError};
use crate::store::DeviceCredentials;
use log::{debug, info};
use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

pub const STREAM_PORT: u16 = 60222;

/// Bytes in a single-panel frame.
pub const FRAME_LEN: usize = 10;

/// Encodes one command as a v2 frame.
pub fn encode_frame(command: &PanelCommand) -> [u8; FRAME_LEN] {
    let panel = command.panel.0.to_be_bytes();
    let tenths = u16::try_from(command.transition.as_millis() / 100).unwrap_or(u16::MAX);
    let transition = tenths.to_be_bytes();
    let rgb = command.levels.rgb;
    [
        0,
        1,
        panel[0],
        panel[1],
        rgb.red,
        rgb.green,
        rgb.blue,
        command.levels.white,
        transition[0],
        transition[1],
    ]
}

/// Connected UDP stream to one device.
#[derive(Debug)]
pub struct UdpPanelStream {
    socket: UdpSocket,
}

impl UdpPanelStream {
    /// Puts the device into external-control mode and connects the stream.
    pub fn open(credentials: &DeviceCredentials) -> Result<Self, DeviceError> {
        ApiClient::new(&credentials.address)?.start_external_control(&credentials.auth_token)?;
        let stream = Self::connect(&credentials.address)?;
        info!("streaming to {}:{}", credentials.address, STREAM_PORT);
        Ok(stream)
    }

    /// Connects to an address already in external-control mode.
    pub fn connect(address: &str) -> io::Result<Self> {
        let host = address.trim_start_matches('[').trim_end_matches(']');
        let target = (host, STREAM_PORT)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "address did not resolve"))?;
        let local = if target.is_ipv4() {
            SocketAddr::from(([0u8; 4], 0))
        } else {
            SocketAddr::from(([0u16; 8], 0))
        };
        let socket = UdpSocket::bind(local)?;
        socket.connect(target)?;
        Ok(Self { socket })
    }
}

impl PanelCommandSink for UdpPanelStream {
    fn send(&mut self, command: &PanelCommand) -> Result<(), SinkError> {
        let frame = encode_frame(command);
        let sent = self.socket.send(&frame)?;
        if sent != frame.len() {
            return Err(SinkError::Io(io::Error::new(
                io::ErrorKind::WriteZero,
                "short datagram write",
            )));
        }
        debug!("sent {:?}", frame);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors;
    use crate::types::PanelId;
    use core::time::Duration;

    #[test]
    fn frame_layout_is_big_endian() {
        let command = PanelCommand::new(
            PanelId(0x1234),
            colors::marker(200),
            Duration::from_millis(1_500),
        );
        assert_eq!(
            encode_frame(&command),
            [0, 1, 0x12, 0x34, 200, 0, 0, colors::marker(0).white, 0, 15]
        );
    }

    #[test]
    fn reset_frame_is_dark_and_instant() {
        let frame = encode_frame(&PanelCommand::reset(PanelId(7)));
        assert_eq!(frame, [0, 1, 0, 7, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn long_transitions_saturate() {
        let command = PanelCommand::new(PanelId(1), colors::OFF, Duration::from_secs(100_000));
        let frame = encode_frame(&command);
        assert_eq!(&frame[8..], &[0xff, 0xff]);
    }

    #[test]
    fn stream_delivers_frames_over_loopback() {
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        let sender = UdpSocket::bind("127.0.0.1:0").unwrap();
        sender.connect(receiver.local_addr().unwrap()).unwrap();
        let mut stream = UdpPanelStream { socket: sender };

        stream
            .send(&PanelCommand::instant(PanelId(3), colors::marker(40)))
            .unwrap();

        let mut buf = [0u8; 32];
        let len = receiver.recv(&mut buf).unwrap();
        assert_eq!(len, FRAME_LEN);
        assert_eq!(&buf[2..5], &[0, 3, 40]);
    }
}
