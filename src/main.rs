pub(crate) mod animations;
pub(crate) mod color;
pub(crate) mod fade;
pub(crate) mod intervaltimer;
pub(crate) mod lightstrip;
pub(crate) mod mqtt;
pub(crate) mod olaoutput;
pub(crate) mod osc;
pub(crate) mod scheduler;
pub(crate) mod settings;
pub(crate) mod suncalc;

use std::sync::Arc;
use std::thread;

use clap::Parser;

use crate::lightstrip::SharedStrip;
use crate::mqtt::MqttClient;
use crate::olaoutput::OlaOutput;
use crate::osc::OscCommandReceiver;
use crate::scheduler::Scheduler;
use crate::settings::Settings;

#[derive(Parser)]
struct Cli {
    /// The TOML configuration file to load
    #[arg(short, long, value_name = "FILE")]
    config: Option<std::path::PathBuf>,
}

fn main() {
    env_logger::init();
    let args = Cli::parse();

    let settings = match args.config.as_deref() {
        Some(path) => match Settings::load(path) {
            Ok(settings) => settings,
            Err(msg) => panic!("Cannot read configuration: {}", msg),
        },
        None => Settings::default(),
    };

    let ola = match OlaOutput::new(
        settings.ola.target_addr,
        settings.ola.universe,
        settings.ola.pixel_count,
    ) {
        Ok(ola) => ola,
        Err(msg) => panic!("Cannot set up OLA output: {}", msg),
    };
    let strip = SharedStrip::new(Box::new(ola));

    let scheduler = match Scheduler::new(strip) {
        Ok(scheduler) => Arc::new(scheduler),
        Err(msg) => panic!("Cannot set up the animation scheduler: {}", msg),
    };

    let osc_receiver = match OscCommandReceiver::new(
        settings.osc.listen_addr,
        Arc::clone(&scheduler),
        settings.clone(),
    ) {
        Ok(osc_receiver) => osc_receiver,
        Err(msg) => panic!("Cannot set up OSC: {}", msg),
    };

    let res = thread::Builder::new()
        .name("OSC".to_string())
        .spawn(move || {
            osc_receiver.run();
        });
    if let Err(error) = res {
        panic!("Failed to create thread: {}", error);
    }

    let ctrlc_scheduler = Arc::clone(&scheduler);
    let res = ctrlc::set_handler(move || {
        log::info!("Shutting down");
        if let Err(msg) = ctrlc_scheduler.stop() {
            log::warn!("Blanking the strip failed: {}", msg);
        }
        std::process::exit(0);
    });
    if let Err(error) = res {
        panic!("Failed to set the termination handler: {}", error);
    }

    match &settings.mqtt {
        Some(mqtt_settings) => {
            let client = match MqttClient::new(mqtt_settings, Arc::clone(&scheduler), settings.clone())
            {
                Ok(client) => client,
                Err(msg) => panic!("Cannot set up MQTT: {}", msg),
            };
            client.run();
        }
        None => loop {
            thread::park();
        },
    }
}
