//! Codeplug download utility
//! Reads every file-backed region from the radio into a .4rdmf file

use std::env;

use rt4d_rs::formats::save_rdmf;
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
        eprintln!("Usage: {} <output.4rdmf> [port]", args[0]);
        eprintln!("Example: {} radio.4rdmf /dev/ttyACM0", args[0]);
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
        if current % 16 == 0 || current == total {
            tracing::info!("[{}/{}] {}", current, total, message);
        }
    }));

    let image = session.read_codeplug().await?;
    session.close().await?;

    save_rdmf(output_file, &image)?;
    tracing::info!("Codeplug saved to {}", output_file);

    Ok(())
}
