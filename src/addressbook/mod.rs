// Global contact address book
//
// A DMR user database kept separate from the codeplug, uploaded to the
// radio over UART for caller ID lookup. Databases of 100k+ entries are
// normal, so ID and callsign lookups go through hash indexes and every
// contact carries a precomputed lowercase search key.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

use crate::bitwise::encode_gbk;
use crate::protocol::uart::ADDRESS_BOOK_MAX;

/// Largest DMR ID the radio accepts (24-bit).
pub const DMR_ID_MAX: u32 = 0xFF_FFFF;

const CALLSIGN_WIDTH: usize = 16;
const NAME_WIDTH: usize = 16;
const CITY_WIDTH: usize = 15;
const STATE_WIDTH: usize = 16;
const COUNTRY_WIDTH: usize = 16;
const REMARKS_WIDTH: usize = 16;

#[derive(Debug, Error)]
pub enum AddressBookError {
    #[error("DMR ID {0} exceeds the 24-bit maximum")]
    InvalidDmrId(u32),

    #[error("address book payload is {size} bytes, over the {max} byte upload limit")]
    PayloadTooLarge { size: usize, max: usize },
}

fn clamp(text: &str, width: usize) -> String {
    text.trim().chars().take(width).collect()
}

/// One DMR user database entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalContact {
    dmr_id: u32,
    callsign: String,
    name: String,
    city: String,
    state: String,
    country: String,
    remarks: String,
    search_key: String,
}

impl GlobalContact {
    pub fn new(dmr_id: u32, callsign: &str, name: &str) -> Result<Self, AddressBookError> {
        if dmr_id > DMR_ID_MAX {
            return Err(AddressBookError::InvalidDmrId(dmr_id));
        }
        let mut contact = Self {
            dmr_id,
            callsign: clamp(callsign, CALLSIGN_WIDTH),
            name: clamp(name, NAME_WIDTH),
            city: String::new(),
            state: String::new(),
            country: String::new(),
            remarks: String::new(),
            search_key: String::new(),
        };
        contact.rebuild_search_key();
        Ok(contact)
    }

    pub fn with_location(mut self, city: &str, state: &str, country: &str) -> Self {
        self.city = clamp(city, CITY_WIDTH);
        self.state = clamp(state, STATE_WIDTH);
        self.country = clamp(country, COUNTRY_WIDTH);
        self
    }

    pub fn with_remarks(mut self, remarks: &str) -> Self {
        self.remarks = clamp(remarks, REMARKS_WIDTH);
        self
    }

    fn rebuild_search_key(&mut self) {
        self.search_key = format!(
            "{}|{}|{}",
            self.dmr_id,
            self.callsign.to_lowercase(),
            self.name.to_lowercase()
        );
    }

    pub fn dmr_id(&self) -> u32 {
        self.dmr_id
    }

    pub fn callsign(&self) -> &str {
        &self.callsign
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn remarks(&self) -> &str {
        &self.remarks
    }

    /// Substring match against the precomputed key. `term` must already be
    /// lowercase.
    pub fn matches(&self, term: &str) -> bool {
        self.search_key.contains(term)
    }

    /// The upload row: first six columns, comma separated, no remarks.
    fn radio_line(&self) -> String {
        format!(
            "{},{},{},{},{},{}",
            self.dmr_id, self.callsign, self.name, self.city, self.state, self.country
        )
    }
}

impl fmt::Display for GlobalContact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dmr_id)?;
        if !self.callsign.is_empty() {
            write!(f, " - {}", self.callsign)?;
        }
        if !self.name.is_empty() {
            write!(f, " - {}", self.name)?;
        }
        if !self.city.is_empty() || !self.state.is_empty() {
            let location: Vec<&str> = [self.city.as_str(), self.state.as_str()]
                .into_iter()
                .filter(|s| !s.is_empty())
                .collect();
            write!(f, " ({})", location.join(", "))?;
        }
        Ok(())
    }
}

/// Address book database with ID and callsign indexes.
#[derive(Debug, Default)]
pub struct AddressBook {
    contacts: Vec<GlobalContact>,
    id_index: HashMap<u32, usize>,
    callsign_index: HashMap<String, usize>,
}

impl AddressBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a contact. The first entry with a given ID or callsign wins
    /// lookups; later duplicates are kept for upload.
    pub fn push(&mut self, contact: GlobalContact) {
        let index = self.contacts.len();
        self.id_index.entry(contact.dmr_id).or_insert(index);
        if !contact.callsign.is_empty() {
            self.callsign_index
                .entry(contact.callsign.to_lowercase())
                .or_insert(index);
        }
        self.contacts.push(contact);
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GlobalContact> {
        self.contacts.iter()
    }

    pub fn get(&self, index: usize) -> Option<&GlobalContact> {
        self.contacts.get(index)
    }

    pub fn clear(&mut self) {
        self.contacts.clear();
        self.id_index.clear();
        self.callsign_index.clear();
    }

    pub fn by_id(&self, dmr_id: u32) -> Option<&GlobalContact> {
        self.id_index.get(&dmr_id).map(|&i| &self.contacts[i])
    }

    pub fn by_callsign(&self, callsign: &str) -> Option<&GlobalContact> {
        self.callsign_index
            .get(&callsign.to_lowercase())
            .map(|&i| &self.contacts[i])
    }

    /// All contacts whose ID, callsign or name contains `term`.
    pub fn search(&self, term: &str) -> Vec<&GlobalContact> {
        let term = term.to_lowercase();
        self.contacts.iter().filter(|c| c.matches(&term)).collect()
    }

    /// Sort by DMR ID, the order the radio requires for upload.
    pub fn sort_by_id(&mut self) {
        self.contacts.sort_by_key(|c| c.dmr_id);
        self.rebuild_indexes();
    }

    fn rebuild_indexes(&mut self) {
        self.id_index.clear();
        self.callsign_index.clear();
        for (index, contact) in self.contacts.iter().enumerate() {
            self.id_index.entry(contact.dmr_id).or_insert(index);
            if !contact.callsign.is_empty() {
                self.callsign_index
                    .entry(contact.callsign.to_lowercase())
                    .or_insert(index);
            }
        }
    }

    /// GBK CSV body for the UART upload: one row per contact, first six
    /// columns, no header.
    pub fn radio_payload(&self) -> Result<Vec<u8>, AddressBookError> {
        let text = self
            .contacts
            .iter()
            .map(GlobalContact::radio_line)
            .collect::<Vec<_>>()
            .join("\n");
        let payload = encode_gbk(&text);
        if payload.len() > ADDRESS_BOOK_MAX {
            return Err(AddressBookError::PayloadTooLarge {
                size: payload.len(),
                max: ADDRESS_BOOK_MAX,
            });
        }
        Ok(payload)
    }
}

impl<'a> IntoIterator for &'a AddressBook {
    type Item = &'a GlobalContact;
    type IntoIter = std::slice::Iter<'a, GlobalContact>;

    fn into_iter(self) -> Self::IntoIter {
        self.contacts.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_book() -> AddressBook {
        let mut book = AddressBook::new();
        book.push(
            GlobalContact::new(3114321, "N0CALL", "Alice Example")
                .unwrap()
                .with_location("Denver", "Colorado", "United States"),
        );
        book.push(GlobalContact::new(2040001, "DL1ABC", "Bob Beispiel").unwrap());
        book.push(
            GlobalContact::new(4600012, "BG2XYZ", "王伟")
                .unwrap()
                .with_location("哈尔滨", "", "China"),
        );
        book
    }

    #[test]
    fn test_dmr_id_limit() {
        assert!(GlobalContact::new(DMR_ID_MAX, "A", "B").is_ok());
        assert!(matches!(
            GlobalContact::new(DMR_ID_MAX + 1, "A", "B"),
            Err(AddressBookError::InvalidDmrId(_))
        ));
    }

    #[test]
    fn test_field_clamping() {
        let contact = GlobalContact::new(1, "VERYLONGCALLSIGN1234", "  padded  ")
            .unwrap()
            .with_location("a-city-name-that-runs-long", "", "");
        assert_eq!(contact.callsign(), "VERYLONGCALLSIGN");
        assert_eq!(contact.name(), "padded");
        assert_eq!(contact.city().chars().count(), 15);
    }

    #[test]
    fn test_lookup_by_id_and_callsign() {
        let book = sample_book();
        assert_eq!(book.by_id(2040001).unwrap().callsign(), "DL1ABC");
        assert!(book.by_id(999).is_none());
        // callsign lookup is case-insensitive
        assert_eq!(book.by_callsign("dl1abc").unwrap().dmr_id(), 2040001);
    }

    #[test]
    fn test_search_matches_id_callsign_and_name() {
        let book = sample_book();
        assert_eq!(book.search("alice").len(), 1);
        assert_eq!(book.search("311").len(), 1);
        assert_eq!(book.search("bg2").len(), 1);
        assert!(book.search("zz9").is_empty());
    }

    #[test]
    fn test_sort_by_id_keeps_lookups_working() {
        let mut book = sample_book();
        book.sort_by_id();
        let ids: Vec<u32> = book.iter().map(|c| c.dmr_id()).collect();
        assert_eq!(ids, vec![2040001, 3114321, 4600012]);
        assert_eq!(book.by_callsign("N0CALL").unwrap().dmr_id(), 3114321);
    }

    #[test]
    fn test_radio_payload_layout() {
        let mut book = AddressBook::new();
        book.push(
            GlobalContact::new(2040001, "DL1ABC", "Bob")
                .unwrap()
                .with_remarks("never uploaded"),
        );
        book.push(GlobalContact::new(3114321, "N0CALL", "Alice").unwrap());

        let payload = book.radio_payload().unwrap();
        let text = String::from_utf8(payload).unwrap();
        // six columns per row, remarks omitted, no trailing newline
        assert_eq!(text, "2040001,DL1ABC,Bob,,,\n3114321,N0CALL,Alice,,,");
    }

    #[test]
    fn test_radio_payload_is_gbk() {
        let mut book = AddressBook::new();
        book.push(GlobalContact::new(4600012, "BG2XYZ", "王伟").unwrap());
        let payload = book.radio_payload().unwrap();
        // GBK encodes each CJK character in two bytes; the row still
        // carries the three empty location columns
        assert_eq!(payload.len(), "4600012,BG2XYZ,,,,".len() + 4);
        assert!(payload.starts_with(b"4600012,BG2XYZ,"));
        assert!(payload.ends_with(b",,,"));
    }

    #[test]
    fn test_duplicate_ids_keep_first_for_lookup() {
        let mut book = AddressBook::new();
        book.push(GlobalContact::new(100, "FIRST", "").unwrap());
        book.push(GlobalContact::new(100, "SECOND", "").unwrap());
        assert_eq!(book.len(), 2);
        assert_eq!(book.by_id(100).unwrap().callsign(), "FIRST");
    }

    #[test]
    fn test_display_line() {
        let contact = GlobalContact::new(3114321, "N0CALL", "Alice")
            .unwrap()
            .with_location("Denver", "Colorado", "United States");
        assert_eq!(
            contact.to_string(),
            "3114321 - N0CALL - Alice (Denver, Colorado)"
        );
    }
}
