mod config;
mod controller;
mod pwm;
mod sensor;
mod util;

use std::sync::mpsc;
use std::time::Instant;

use config::Config;
use controller::Controller;
use pwm::Pwm;
use sensor::TempSensor;

const VERSION: &str = "0.1.0";

fn main() -> Result<(), String> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting ({})...", VERSION);

    let cfg = Config::from_env();
    cfg.validate()?;
    log::debug!("config: {:?}", cfg);

    // The handler only signals; the loop below owns shutdown, so cleanup
    // runs on the interrupt path exactly like on the normal one
    let (stop_tx, stop_rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        log::info!("stopping...");
        let _ = stop_tx.send(());
    })
    .map_err(|err| format!("error setting Ctrl-C handler: {}", err))?;

    let sensor = TempSensor::new(config::THERMAL_ZONE);
    // A dead sensor path at startup is fatal, before we touch the hardware
    let temp = sensor.read_temperature()?;
    log::debug!("initial temp: {:.1}C", temp);

    let mut pwm = Pwm::init(config::PWM_CHIP, config::PWM_CHANNEL, config::PWM_PERIOD_NS)?;

    let result = run(&cfg, &sensor, &pwm, &stop_rx);

    // Reached on interrupt and on error alike; drop would also release,
    // this just makes the shutdown order explicit
    pwm.release();
    log::info!("stopped");
    result
}

// main loop
fn run(
    cfg: &Config,
    sensor: &TempSensor,
    pwm: &Pwm,
    stop_rx: &mpsc::Receiver<()>,
) -> Result<(), String> {
    let mut ctl = Controller::new(cfg.clone());

    loop {
        // Doubles as the inter-tick sleep; an interrupt breaks it promptly
        match stop_rx.recv_timeout(cfg.poll_interval) {
            Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => return Ok(()),
            Err(mpsc::RecvTimeoutError::Timeout) => {}
        }

        let temp = match sensor.read_temperature() {
            Ok(temp) => temp,
            Err(err) => {
                // No new data this tick, keep the previous duty
                log::warn!("{}", err);
                continue;
            }
        };
        log::debug!("current temp: {:.1}C", temp);

        match ctl.tick(temp, Instant::now()) {
            Some(duty) => {
                log::info!("temp: {:.1}C | duty: {}%", temp, duty);
                if let Err(err) = pwm.set_duty(duty) {
                    // Tolerated, the next tick is the implicit retry
                    log::warn!("{}", err);
                }
            }
            None => {
                log::debug!(
                    "temp: {:.1}C | duty unchanged at {}%",
                    ctl.last_temp(),
                    ctl.duty()
                );
            }
        }
    }
}
