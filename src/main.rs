use anyhow::Error;
use gps_clock::hardware;
use gps_clock::prelude::*;
use log::{error, info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Error> {
    env_logger::init();

    // Load the config file
    info!("Starting config...");
    let config = Config::load()?;

    info!("Starting settings storage...");
    let eeprom = FileEeprom::open(&config.storage.path, config.storage.size)?;
    let store = SettingsStore::new(eeprom, config.storage.base_offset);

    info!("Starting display...");
    let display = hardware::open_display(&config)?;

    info!("Starting GPS...");
    let mut gps = hardware::open_gps(&config)?;

    let scheduler = Scheduler::new(config.timing.refresh(), config.timing.blink());
    let mut controller = Controller::start(store, display, std::io::stdout(), scheduler)?;

    // Console commands arrive one line at a time
    let (command_tx, mut command_rx) = mpsc::channel::<String>(8);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if command_tx.send(line).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    error!("Console read failed: {}", e);
                    break;
                }
            }
        }
    });

    let clock = SystemClock::new();
    let poll = config.timing.poll();
    let mut console_open = true;

    info!("Running...");
    loop {
        let line = match command_rx.try_recv() {
            Ok(line) => Some(line),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                if console_open {
                    warn!("Console input closed");
                    console_open = false;
                }
                None
            }
        };

        if let Err(e) = controller.step(&mut gps, line.as_deref(), clock.now_ms()) {
            error!("Loop pass failed: {}", e);
        }

        tokio::time::sleep(poll).await;
    }
}
