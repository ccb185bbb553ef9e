//! CSV import/export for the address book and channel list

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use thiserror::Error;

use crate::addressbook::{AddressBook, GlobalContact};
use crate::models::{Channel, ChannelConfig, PowerLevel, ScanMode};

#[derive(Error, Debug)]
pub enum CsvError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid CSV format: {0}")]
    InvalidFormat(String),
}

pub type Result<T> = std::result::Result<T, CsvError>;

/// Column positions detected from a DMR user database header.
///
/// Three common layouts are recognised: RadioDMRID exports
/// (`No,Radio ID,CallSign,Name,City,State,Country,Remarks`), the same
/// without the leading counter, and minimal `Radio ID,CallSign,Name`
/// files. Databases that split the name into first/last columns are
/// merged back together.
#[derive(Debug, Default)]
struct ColumnMap {
    dmr_id: usize,
    callsign: Option<usize>,
    name: Option<usize>,
    first_name: Option<usize>,
    last_name: Option<usize>,
    city: Option<usize>,
    state: Option<usize>,
    country: Option<usize>,
    remarks: Option<usize>,
}

fn detect_columns(header: &[String]) -> ColumnMap {
    let mut map = ColumnMap::default();
    let mut found_id = false;

    for (idx, col) in header.iter().enumerate() {
        let col = col.as_str();
        if !found_id
            && ((col.contains("radio") && col.contains("id"))
                || matches!(col, "dmr_id" | "id" | "radioid" | "radio id" | "radio_id"))
        {
            map.dmr_id = idx;
            found_id = true;
        } else if col.contains("call") {
            map.callsign.get_or_insert(idx);
        } else if matches!(col, "name" | "firstname" | "first name" | "fname" | "first_name") {
            if col == "name" {
                map.name.get_or_insert(idx);
            } else {
                map.first_name.get_or_insert(idx);
            }
        } else if matches!(col, "lastname" | "last name" | "lname" | "last_name" | "surname") {
            map.last_name.get_or_insert(idx);
        } else if matches!(col, "city" | "town") {
            map.city.get_or_insert(idx);
        } else if matches!(col, "state" | "province" | "region") {
            map.state.get_or_insert(idx);
        } else if matches!(col, "country" | "nation") {
            map.country.get_or_insert(idx);
        } else if matches!(col, "remarks" | "comment" | "comments" | "note" | "notes") {
            map.remarks.get_or_insert(idx);
        }
    }

    // no recognisable ID header: assume the first column
    map
}

fn parse_contact_row(fields: &[&str], map: &ColumnMap) -> Option<GlobalContact> {
    let get = |idx: Option<usize>| idx.and_then(|i| fields.get(i)).map_or("", |s| *s);

    let dmr_id: u32 = fields.get(map.dmr_id)?.trim().parse().ok()?;

    let mut name = get(map.name).to_string();
    if name.is_empty() && (map.first_name.is_some() || map.last_name.is_some()) {
        let parts: Vec<&str> = [get(map.first_name), get(map.last_name)]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect();
        name = parts.join(" ");
    }

    GlobalContact::new(dmr_id, get(map.callsign), &name)
        .ok()
        .map(|c| {
            c.with_location(get(map.city), get(map.state), get(map.country))
                .with_remarks(get(map.remarks))
        })
}

/// Import a DMR user database CSV into an address book.
///
/// Bad rows are skipped with a warning; the result is sorted by DMR ID,
/// the order the radio requires for upload.
pub fn import_contacts_csv(filename: impl AsRef<Path>) -> Result<AddressBook> {
    let file = File::open(filename)?;
    let reader = BufReader::new(file);
    let mut lines = reader.lines();

    let header_line = lines
        .next()
        .ok_or_else(|| CsvError::InvalidFormat("Empty CSV file".to_string()))??;
    let header: Vec<String> = header_line
        .trim_start_matches('\u{feff}')
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .collect();
    let map = detect_columns(&header);

    let mut book = AddressBook::new();
    for (line_num, line_result) in lines.enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(|s| s.trim()).collect();
        if fields.len() < 2 {
            continue;
        }
        match parse_contact_row(&fields, &map) {
            Some(contact) => book.push(contact),
            None => {
                tracing::warn!("Skipping line {}: unparseable row", line_num + 2);
            }
        }
    }

    book.sort_by_id();
    Ok(book)
}

/// Export an address book with the canonical 7-column header.
pub fn export_contacts_csv(filename: impl AsRef<Path>, book: &AddressBook) -> Result<()> {
    let mut file = File::create(filename)?;
    writeln!(file, "Radio ID,CallSign,Name,City,State,Country,Remarks")?;
    for contact in book.iter() {
        writeln!(
            file,
            "{},{},{},{},{},{},{}",
            contact.dmr_id(),
            contact.callsign(),
            contact.name(),
            contact.city(),
            contact.state(),
            contact.country(),
            contact.remarks()
        )?;
    }
    Ok(())
}

/// Export active channels to CSV, one-based indexes for display.
pub fn export_channels_csv(filename: impl AsRef<Path>, channels: &[Channel]) -> Result<()> {
    let mut file = File::create(filename)?;
    writeln!(
        file,
        "Index,Name,RX Freq,TX Freq,Mode,Power,Scan,Color Code,Time Slot,Contact,Group List"
    )?;

    let mut sorted: Vec<&Channel> = channels.iter().collect();
    sorted.sort_by_key(|c| c.index);

    for ch in sorted {
        let power = match ch.power {
            PowerLevel::High => "High",
            PowerLevel::Low => "Low",
        };
        let (mode, scan, color_code, time_slot, contact, group_list) = match &ch.config {
            ChannelConfig::Digital(d) => (
                "Digital",
                match d.scan {
                    ScanMode::Add => "Add",
                    ScanMode::Remove => "Remove",
                },
                d.color_code.to_string(),
                (d.time_slot + 1).to_string(),
                d.contact.to_string(),
                d.group_list.to_string(),
            ),
            ChannelConfig::Analog(_) => (
                "Analog",
                "",
                String::new(),
                String::new(),
                String::new(),
                String::new(),
            ),
        };
        writeln!(
            file,
            "{},{},{},{},{},{},{},{},{},{},{}",
            ch.index + 1,
            ch.name,
            ch.rx_freq,
            ch.tx_freq,
            mode,
            power,
            scan,
            color_code,
            time_slot,
            contact,
            group_list
        )?;
    }
    Ok(())
}
