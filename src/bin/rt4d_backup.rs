//! Full SPI flash backup utility
//! Dumps the radio's entire 4 MiB flash to a file for analysis

use std::env;
use std::fs::File;
use std::io::Write;

use rt4d_rs::protocol::{probe_any, Session};
use rt4d_rs::serial::{SerialConfig, SerialPort};
use tracing_subscriber::{fmt::format::FmtSpan, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();

    let format_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(format_layer)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("Usage: {} <output.bin> [port]", args[0]);
        eprintln!("Example: {} rt4d_flash.bin /dev/ttyACM0", args[0]);
        eprintln!("\nWithout a port, every serial port is probed for a radio.");
        std::process::exit(1);
    }

    let output_file = &args[1];
    let config = SerialConfig::default();

    let mut session = match args.get(2) {
        Some(port_name) => {
            tracing::info!("Opening {}", port_name);
            let port = SerialPort::open(port_name, config)?;
            Session::probe(port).await?
        }
        None => {
            tracing::info!("Probing serial ports for a radio...");
            probe_any(&config).await?
        }
    };

    tracing::info!("Firmware layout: {:?}", session.firmware_variant());
    session.set_status_fn(Box::new(|current, total, message| {
        if current % 256 == 0 || current == total {
            tracing::info!("[{}/{}] {}", current, total, message);
        }
    }));

    tracing::info!("Reading SPI flash, this takes a few minutes...");
    let data = session.backup().await?;
    session.close().await?;

    let mut file = File::create(output_file)?;
    file.write_all(&data)?;
    tracing::info!("Saved {} bytes to {}", data.len(), output_file);

    Ok(())
}
