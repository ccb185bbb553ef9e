//! Parse .4rdmf file utility
//! Loads a codeplug file and prints a summary, with optional JSON export

use std::env;
use std::fs::File;

use rt4d_rs::formats::load_rdmf;
use rt4d_rs::models::{ChannelConfig, ContactKind};

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <file.4rdmf> [--json <out.json>]", args[0]);
        eprintln!("\nExamples:");
        eprintln!("  {} radio.4rdmf                  # Print a summary", args[0]);
        eprintln!(
            "  {} radio.4rdmf --json plug.json # Also export decoded data",
            args[0]
        );
        std::process::exit(1);
    }

    let filename = &args[1];
    println!("Loading codeplug: {}", filename);
    let image = load_rdmf(filename)?;

    let settings = image.settings()?;
    let channels = image.channels()?;
    let contacts = image.contacts()?;
    let zones = image.zones()?;
    let group_lists = image.group_lists()?;
    let keys = image.encryption_keys()?;
    let fm = image.fm_settings()?;

    println!("\n=== Radio ===");
    println!("Name:             {}", settings.radio_name);
    println!("DMR ID:           {}", settings.radio_id);
    println!("Startup message:  {}", settings.startup_message);
    if !settings.startup_password.is_empty() {
        println!(
            "Startup password: {} (protected)",
            "*".repeat(settings.startup_password.len())
        );
    }

    println!("\n=== Contents ===");
    println!("Channels:         {}", channels.len());
    println!("Contacts:         {}", contacts.len());
    println!("Zones:            {}", zones.len());
    println!("Group lists:      {}", group_lists.len());
    println!("Encryption keys:  {}", keys.len());
    println!(
        "FM presets:       {}",
        fm.presets
            .iter()
            .filter(|p| p.frequencies.iter().any(|&f| f != 0xFFFF))
            .count()
    );

    if !channels.is_empty() {
        println!("\n=== Channels ===");
        for ch in &channels {
            let mode = match &ch.config {
                ChannelConfig::Digital(_) => "Digital",
                ChannelConfig::Analog(_) => "Analog",
            };
            println!(
                "  #{:<4} {:16} {:>11} / {:<11} {}",
                ch.index + 1,
                ch.name,
                ch.rx_freq.to_string(),
                ch.tx_freq.to_string(),
                mode
            );
        }
    }

    if !contacts.is_empty() {
        println!("\n=== Contacts ===");
        for contact in &contacts {
            let kind = match contact.kind {
                ContactKind::Private => "Private",
                ContactKind::Group => "Group",
                ContactKind::AllCall => "All Call",
            };
            println!(
                "  #{:<4} {:16} {:8} {}",
                contact.index + 1,
                contact.name,
                kind,
                contact.dmr_id
            );
        }
    }

    if let Some(pos) = args.iter().position(|a| a == "--json") {
        let out = args
            .get(pos + 1)
            .ok_or_else(|| anyhow::anyhow!("--json needs an output path"))?;
        let export = serde_json::json!({
            "settings": settings,
            "channels": channels,
            "contacts": contacts,
            "zones": zones,
            "group_lists": group_lists,
            "encryption_keys": keys,
            "fm": fm,
        });
        serde_json::to_writer_pretty(File::create(out)?, &export)?;
        println!("\nDecoded codeplug written to {}", out);
    }

    Ok(())
}
