use std::{
    net::{SocketAddr, UdpSocket},
    sync::Arc,
    time::Duration,
};

use chrono::NaiveTime;
use rosc::{decoder, OscMessage, OscPacket, OscType};

use crate::animations::{sunrise, AnimationSpec};
use crate::color::Color;
use crate::scheduler::Scheduler;
use crate::settings::Settings;
use crate::suncalc;

/// Listens for OSC command messages and turns them into scheduler
/// transitions. One datagram, one command; malformed commands are logged
/// and leave the running animation untouched.
pub struct OscCommandReceiver {
    sock: UdpSocket,
    scheduler: Arc<Scheduler>,
    settings: Settings,
}

impl OscCommandReceiver {
    pub fn new(
        listen_addr: SocketAddr,
        scheduler: Arc<Scheduler>,
        settings: Settings,
    ) -> Result<Self, String> {
        let sock = match UdpSocket::bind(listen_addr) {
            Ok(sock) => sock,
            Err(error) => return Err(error.to_string()),
        };

        Ok(OscCommandReceiver {
            sock,
            scheduler,
            settings,
        })
    }

    pub fn run(&self) {
        let mut buf = [0u8; rosc::decoder::MTU];

        loop {
            match self.sock.recv_from(&mut buf) {
                Ok((size, addr)) => {
                    log::debug!("Received packet with size {} from: {}", size, addr);
                    match decoder::decode(&buf[..size]) {
                        Ok(packet) => self.handle_packet(packet),
                        Err(error) => log::warn!("Undecodable OSC packet: {:?}", error),
                    }
                }
                Err(e) => {
                    log::error!("Error receiving from socket: {}", e);
                    break;
                }
            }
        }
    }

    fn handle_packet(&self, packet: OscPacket) {
        match packet {
            OscPacket::Message(msg) => {
                if !self.handle_message(&msg) {
                    log::info!("Unhandled OSC address: {} {:?}", msg.addr, msg.args);
                }
            }
            OscPacket::Bundle(bundle) => {
                log::info!("Ignoring OSC bundle: {:?}", bundle);
            }
        }
    }

    fn handle_message(&self, msg: &OscMessage) -> bool {
        let result = match msg.addr.as_str() {
            "/light/fade" => self.start_random_fade(),
            "/light/fill" => self.fill(msg),
            "/light/breathing" => self.start_breathing(msg),
            "/light/sexy" => self.start_sexylight(),
            "/light/clock" => self.scheduler.start(AnimationSpec::TimeColor),
            "/light/sunrise" => self.start_sunrise(),
            "/light/alarm" => self.start_alarm(msg),
            "/light/off" => self.scheduler.stop(),
            "/light/kill" => {
                self.scheduler.kill();
                Ok(())
            }
            _ => {
                return false;
            }
        };

        if let Err(err) = result {
            log::warn!("{} failed: {}", msg.addr, err);
        }
        return true;
    }

    fn start_random_fade(&self) -> Result<(), String> {
        let leg_duration = Duration::try_from_secs_f32(self.settings.light.fade_seconds)
            .map_err(|error| error.to_string())?;
        self.scheduler.start(AnimationSpec::RandomFade {
            from: Color::new(255, 0, 0),
            leg_duration,
        })
    }

    fn fill(&self, msg: &OscMessage) -> Result<(), String> {
        let color = self.color_arguments(msg)?;
        self.scheduler.fill(color)
    }

    fn start_breathing(&self, msg: &OscMessage) -> Result<(), String> {
        let color = self.color_arguments(msg)?;
        self.scheduler.start(AnimationSpec::Breathing {
            color,
            min_brightness: self.float_argument(msg, 3)?,
            max_brightness: self.float_argument(msg, 4)?,
        })
    }

    fn start_sexylight(&self) -> Result<(), String> {
        self.scheduler.start(AnimationSpec::SexyLight {
            min_brightness: self.settings.light.min_brightness,
            max_brightness: self.settings.light.max_brightness,
        })
    }

    fn start_sunrise(&self) -> Result<(), String> {
        let spec = sunrise::from_settings(&self.settings)?;
        self.scheduler.start(spec)
    }

    fn start_alarm(&self, msg: &OscMessage) -> Result<(), String> {
        let hour = self.int_argument(msg, 0)?;
        let minute = self.int_argument(msg, 1)?;
        let time = u32::try_from(hour)
            .ok()
            .zip(u32::try_from(minute).ok())
            .and_then(|(hour, minute)| NaiveTime::from_hms_opt(hour, minute, 0))
            .ok_or_else(|| format!("Not a time of day: {}:{}", hour, minute))?;

        let alarm = suncalc::upcoming(time)
            .ok_or_else(|| "Cannot resolve the alarm to a local instant".to_string())?;
        log::info!("Alarm set for {}", alarm);
        self.scheduler.start(sunrise::spec_for(alarm, &self.settings))
    }

    fn color_arguments(&self, msg: &OscMessage) -> Result<Color, String> {
        Ok(Color::new(
            self.channel_argument(msg, 0)?,
            self.channel_argument(msg, 1)?,
            self.channel_argument(msg, 2)?,
        ))
    }

    fn channel_argument(&self, msg: &OscMessage, index: usize) -> Result<u8, String> {
        let value = self.int_argument(msg, index)?;
        u8::try_from(value).map_err(|_| format!("{} Channel out of range: {}", msg.addr, value))
    }

    fn int_argument(&self, msg: &OscMessage, index: usize) -> Result<i32, String> {
        match msg.args.get(index) {
            Some(OscType::Int(value)) => Ok(*value),
            Some(arg) => Err(format!(
                "{} Unexpected OSC parameter type: {:?}",
                msg.addr, arg
            )),
            None => Err(format!("{} Missing OSC parameter: int", msg.addr)),
        }
    }

    fn float_argument(&self, msg: &OscMessage, index: usize) -> Result<f32, String> {
        match msg.args.get(index) {
            Some(OscType::Float(value)) => Ok(*value),
            Some(arg) => Err(format!(
                "{} Unexpected OSC parameter type: {:?}",
                msg.addr, arg
            )),
            None => Err(format!("{} Missing OSC parameter: float", msg.addr)),
        }
    }
}
