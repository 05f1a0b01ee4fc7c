use std::{
    net::{SocketAddr, UdpSocket},
    str::FromStr,
};

use rosc::{encoder, OscMessage, OscPacket, OscType};

use crate::color::Color;
use crate::lightstrip::LightStrip;

/// Drives the strip through an OLA daemon: one DMX universe, sent as an
/// OSC blob over UDP, three channels per pixel.
pub struct OlaOutput {
    sock: UdpSocket,
    target_addr: SocketAddr,
    universe_addr: String,
    buffer: Vec<u8>,
}

impl OlaOutput {
    pub fn new(target_addr: SocketAddr, universe: u8, pixel_count: usize) -> Result<Self, String> {
        let our_addr = SocketAddr::from_str("0.0.0.0:0").unwrap();
        let sock = match UdpSocket::bind(our_addr) {
            Ok(sock) => sock,
            Err(error) => return Err(error.to_string()),
        };

        Ok(OlaOutput {
            sock,
            target_addr,
            universe_addr: format!("/dmx/universe/{}", universe),
            buffer: vec![0; pixel_count * 3],
        })
    }
}

impl LightStrip for OlaOutput {
    fn fill(&mut self, color: Color) {
        let channels = color.channels();
        for pixel in self.buffer.chunks_exact_mut(3) {
            pixel.copy_from_slice(&channels);
        }
    }

    fn update(&mut self) -> Result<(), String> {
        let msg_buf = encoder::encode(&OscPacket::Message(OscMessage {
            addr: self.universe_addr.clone(),
            args: vec![OscType::Blob(self.buffer.clone())],
        }))
        .map_err(|error| format!("{:?}", error))?;

        match self.sock.send_to(&msg_buf, self.target_addr) {
            Ok(_) => Ok(()),
            Err(error) => Err(error.to_string()),
        }
    }
}
