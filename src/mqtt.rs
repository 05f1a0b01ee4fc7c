use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use mqtt::{Message, Receiver};
use paho_mqtt as mqtt;

use crate::animations::{sunrise, AnimationSpec};
use crate::color::Color;
use crate::scheduler::Scheduler;
use crate::settings::{MqttSettings, Settings};

const EFFECT_NONE: &str = "None";
const EFFECT_RANDOM_FADE: &str = "Random Fade";
const EFFECT_BREATHING: &str = "Breathing";
const EFFECT_SEXY: &str = "Sexy";
const EFFECT_CLOCK: &str = "Clock";
const EFFECT_SUNRISE: &str = "Sunrise";

/// Home Assistant facing light entity. Commands arriving on the set topic
/// are translated into scheduler transitions; the last commanded state is
/// retained and republished so the dashboard stays in sync.
pub struct MqttClient {
    client: mqtt::Client,
    receiver: Receiver<Option<Message>>,
    unique_id: String,
    topics: Topics,
    scheduler: Arc<Scheduler>,
    settings: Settings,
    state: Mutex<LightState>,
}

struct Topics {
    state: String,
    state_set: String,
    discovery: String,
}

#[derive(Clone, Copy)]
struct LightState {
    on: bool,
    color: Color,
    effect: &'static str,
}

impl MqttClient {
    fn make_lwt_message(topic: &str) -> mqtt::Message {
        let payload = json::object! {
            available: "offline"
        };

        return mqtt::Message::new_retained(topic, json::stringify(payload), 0);
    }

    pub fn new(
        mqtt_settings: &MqttSettings,
        scheduler: Arc<Scheduler>,
        settings: Settings,
    ) -> Result<MqttClient, String> {
        let topics = Topics {
            state: format!("wachlicht/{}/state", mqtt_settings.unique_id),
            state_set: format!("wachlicht/{}/state/set", mqtt_settings.unique_id),
            discovery: format!(
                "{}/light/{}/config",
                mqtt_settings.discovery_prefix, mqtt_settings.unique_id
            ),
        };

        let client = match mqtt::Client::new(mqtt_settings.url.as_str()) {
            Ok(client) => client,
            Err(err) => {
                return Err(format!("{:?}", err));
            }
        };

        let conn_opts = mqtt::ConnectOptionsBuilder::new()
            .keep_alive_interval(Duration::from_secs(20))
            .clean_session(true)
            .will_message(MqttClient::make_lwt_message(&topics.state))
            .finalize();

        if let Err(err) = client.connect(conn_opts) {
            return Err(format!("Cannot connect to {}: {:?}", mqtt_settings.url, err));
        }

        log::info!("Connected to broker at {}", mqtt_settings.url);

        let receiver = client.start_consuming();
        if let Err(err) = client.subscribe(&topics.state_set, 0) {
            return Err(format!(
                "Failed to subscribe to topic {}: {:?}",
                &topics.state_set, err
            ));
        };

        let mqtt_client = MqttClient {
            client,
            receiver,
            unique_id: mqtt_settings.unique_id.clone(),
            topics,
            scheduler,
            settings,
            state: Mutex::new(LightState {
                on: false,
                color: Color::new(255, 210, 80),
                effect: EFFECT_NONE,
            }),
        };

        mqtt_client.publish_discovery();
        mqtt_client.publish_state();
        Ok(mqtt_client)
    }

    fn publish_discovery(&self) {
        if !self.client.is_connected() {
            if let Err(err) = self.client.reconnect() {
                log::warn!("Reconnection failed: {err}");
            }
        }

        let payload = json::object! {
            schema: "json",
            device_class: "light",
            device: {
                identifiers: self.unique_id.to_string(),
                model: "wachlicht",
                name: "wachlicht",
            },
            unique_id: self.unique_id.to_string(),
            name: "wachlicht",
            brightness: true,
            color_mode: true,
            supported_color_modes: json::array! { "rgb" },

            effect: true,
            effect_list: json::array! {
                EFFECT_NONE,
                EFFECT_RANDOM_FADE,
                EFFECT_BREATHING,
                EFFECT_SEXY,
                EFFECT_CLOCK,
                EFFECT_SUNRISE
            },

            availability_topic: self.topics.state.to_string(),
            availability_template: "{{ value_json.available }}",

            state_topic: self.topics.state.to_string(),
            command_topic: self.topics.state_set.to_string(),
        };

        let payload_str = json::stringify(payload);
        let msg = mqtt::Message::new_retained(&self.topics.discovery, payload_str.clone(), 0);
        log::info!("Publishing {}: {}", self.topics.discovery, &payload_str);
        if let Err(err) = self.client.publish(msg) {
            log::warn!("Failed to publish HomeAssistant discovery: {err}");
        }
    }

    fn publish_state(&self) {
        if !self.client.is_connected() {
            if let Err(err) = self.client.reconnect() {
                log::warn!("Reconnection failed: {err}");
                return;
            }
        }

        let state = *self.state.lock().unwrap();
        let payload = json::object! {
            available: "online",
            state: if state.on { "ON" } else { "OFF" },
            brightness: (state.color.brightness * 255.0) as u8,
            color: json::object! {
                r: state.color.r,
                g: state.color.g,
                b: state.color.b,
            },
            effect: state.effect,
        };

        let payload_str = json::stringify(payload);
        let msg = mqtt::Message::new_retained(&self.topics.state, payload_str.clone(), 0);
        log::info!("Publishing {}: {}", self.topics.state, &payload_str);
        if let Err(err) = self.client.publish(msg) {
            log::warn!("Publishing failed: {err}");
            return;
        }
    }

    pub fn run(&self) {
        loop {
            match self.receiver.recv() {
                Ok(msg) => {
                    if let Some(msg) = msg {
                        self.handle_message(msg);
                        self.publish_state();
                    }
                }
                Err(err) => log::warn!("Error receiving messages: {err}"),
            };
        }
    }

    fn handle_message(&self, msg: Message) {
        let payload = match json::parse(&msg.payload_str()) {
            Ok(payload) => payload,
            Err(err) => {
                log::warn!(
                    "Failed to parse message payload from {}: {}",
                    msg.topic(),
                    err
                );
                return;
            }
        };

        log::info!(
            "Received {}: {}",
            msg.topic(),
            json::stringify(payload.clone())
        );

        let mut state = self.state.lock().unwrap();
        if payload.has_key("state") {
            if payload["state"] == "ON" {
                state.on = true;
            } else if payload["state"] == "OFF" {
                state.on = false;
            } else {
                log::warn!("Unexpected state value: {}", payload["state"]);
            }
        }

        if payload.has_key("brightness") {
            match payload["brightness"].as_f32() {
                Some(brightness) => state.color.brightness = (brightness / 255.0).clamp(0.0, 1.0),
                None => log::warn!("Unexpected brightness value: {}", payload["brightness"]),
            }
        }

        if payload.has_key("color") {
            let json_color = &payload["color"];
            match (
                json_color["r"].as_u8(),
                json_color["g"].as_u8(),
                json_color["b"].as_u8(),
            ) {
                (Some(r), Some(g), Some(b)) => {
                    state.color.r = r;
                    state.color.g = g;
                    state.color.b = b;
                }
                _ => log::warn!("Unexpected color format: {json_color}"),
            }
        }

        if payload.has_key("effect") {
            match payload["effect"].as_str() {
                Some(effect) => match self.effect_name(effect) {
                    Some(name) => state.effect = name,
                    None => log::warn!("Unexpected effect: {effect}"),
                },
                None => log::warn!("Unexpected effect value: {}", payload["effect"]),
            }
        }

        self.apply(&state);
    }

    fn effect_name(&self, effect: &str) -> Option<&'static str> {
        [
            EFFECT_NONE,
            EFFECT_RANDOM_FADE,
            EFFECT_BREATHING,
            EFFECT_SEXY,
            EFFECT_CLOCK,
            EFFECT_SUNRISE,
        ]
        .into_iter()
        .find(|name| *name == effect)
    }

    fn apply(&self, state: &LightState) {
        let result = if !state.on {
            self.scheduler.stop()
        } else {
            match self.spec_for(state) {
                Ok(Some(spec)) => self.scheduler.start(spec),
                Ok(None) => self.scheduler.fill(state.color),
                Err(err) => Err(err),
            }
        };

        if let Err(err) = result {
            log::warn!("Light command failed: {}", err);
        }
    }

    fn spec_for(&self, state: &LightState) -> Result<Option<AnimationSpec>, String> {
        let light = &self.settings.light;
        let spec = match state.effect {
            EFFECT_NONE => return Ok(None),
            EFFECT_RANDOM_FADE => AnimationSpec::RandomFade {
                from: state.color,
                leg_duration: Duration::try_from_secs_f32(light.fade_seconds)
                    .map_err(|error| error.to_string())?,
            },
            EFFECT_BREATHING => AnimationSpec::Breathing {
                color: state.color,
                min_brightness: light.min_brightness,
                max_brightness: state.color.brightness.max(light.min_brightness),
            },
            EFFECT_SEXY => AnimationSpec::SexyLight {
                min_brightness: light.min_brightness,
                max_brightness: light.max_brightness,
            },
            EFFECT_CLOCK => AnimationSpec::TimeColor,
            EFFECT_SUNRISE => sunrise::from_settings(&self.settings)?,
            other => return Err(format!("Unknown effect: {}", other)),
        };

        Ok(Some(spec))
    }
}

impl Drop for MqttClient {
    fn drop(&mut self) {
        if let Err(err) = self.client.disconnect(None) {
            // We don't really care about errors here, but let's make rustc happy.
            log::error!("{:?}", err);
        }
    }
}
