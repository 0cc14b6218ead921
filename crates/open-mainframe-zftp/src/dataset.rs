//! MVS dataset listings.
//!
//! ```text
//! Volume Unit    Referred Ext Used Recfm Lrecl BlkSz Dsorg Dsname
//! XRFS95 3390   2017/08/04  313875  FB    1024 27648  PS  'USERHLQI.T2.HISPAXZ'
//! Migrated                                                CPPOBJS.OBJ
//! 250 List completed successfully.
//! ```
//!
//! `Ext` and `Used` abut in the second row; the boundary-correcting decoder
//! separates them into `3` and `13875`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dsn::strip_quotes;
use crate::entry::{EntryMeta, ParseOptions};
use crate::span::SpanTable;

/// Footer the server appends to a successful dataset listing.
pub const LIST_COMPLETED_FOOTER: &str = "list completed successfully";

/// First token of a migrated dataset row.
const MIGRATED: &str = "Migrated";

/// Last-referenced date of a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Referred {
    /// A `yyyy/mm/dd` date.
    Date(NaiveDate),
    /// Anything else the server prints in the column, e.g. `**NONE**`.
    Sentinel(String),
}

impl Referred {
    /// Interpret a `Referred` cell.
    pub fn parse(text: &str) -> Self {
        parse_slash_date(text)
            .map(Referred::Date)
            .unwrap_or_else(|| Referred::Sentinel(text.to_string()))
    }

    /// The date, if the cell held one.
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Referred::Date(date) => Some(*date),
            Referred::Sentinel(_) => None,
        }
    }
}

/// One row of a dataset listing.
///
/// A migrated dataset carries only its name; every attribute is `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetEntry {
    /// Dataset name without quotes.
    pub name: String,
    /// Dataset has been migrated to lower-tier storage.
    pub is_migrated: bool,
    /// Volume serial.
    pub volume: Option<String>,
    /// Device unit.
    pub unit: Option<String>,
    /// Last referenced.
    pub referred: Option<Referred>,
    /// Number of extents.
    pub extents: Option<u32>,
    /// Used tracks.
    pub used_tracks: Option<u32>,
    /// Record format (FB, VB, U, ...).
    pub record_format: Option<String>,
    /// Logical record length.
    pub record_length: Option<u32>,
    /// Block size.
    pub block_size: Option<u32>,
    /// Dataset organization (PS, PO, VSAM, ...).
    pub ds_org: Option<String>,
    /// Line provenance.
    #[serde(flatten)]
    pub meta: EntryMeta,
}

/// Decode a dataset listing, header line first.
///
/// The completed-successfully footer, if present, is dropped.
pub fn parse_datasets<S: AsRef<str>>(lines: &[S], options: &ParseOptions) -> Vec<DatasetEntry> {
    let Some((header, mut rows)) = lines.split_first() else {
        return Vec::new();
    };
    if let Some((footer, rest)) = rows.split_last() {
        if footer
            .as_ref()
            .to_ascii_lowercase()
            .contains(LIST_COMPLETED_FOOTER)
        {
            tracing::debug!(footer = footer.as_ref(), "Dropping dataset listing footer");
            rows = rest;
        }
    }

    let table = SpanTable::from_header(header.as_ref());
    rows.iter()
        .map(|line| build_entry(line.as_ref(), &table, options))
        .collect()
}

fn build_entry(line: &str, table: &SpanTable, options: &ParseOptions) -> DatasetEntry {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() > 1 && tokens[0] == MIGRATED {
        return migrated_entry(line, &tokens, table, options);
    }

    let mut entry = DatasetEntry {
        meta: EntryMeta::raw(line),
        ..DatasetEntry::default()
    };

    // One cell per header column, blank past the end of a short row.
    let fields = table.decode(line);
    for (name, value) in table.names().iter().zip(&fields) {
        let label = name.to_ascii_uppercase();
        let value = if label == "DSNAME" {
            strip_quotes(value)
        } else {
            value.as_str()
        };
        entry.meta.record(options, name, value);

        match label.as_str() {
            "DSNAME" => entry.name = value.to_string(),
            "DSORG" => entry.ds_org = non_empty(value),
            "BLKSZ" => entry.block_size = value.parse().ok(),
            "LRECL" => entry.record_length = value.parse().ok(),
            "RECFM" => entry.record_format = non_empty(value),
            "USED" => entry.used_tracks = value.parse().ok(),
            "EXT" => entry.extents = value.parse().ok(),
            "REFERRED" => entry.referred = non_empty(value).map(|v| Referred::parse(&v)),
            "UNIT" => entry.unit = non_empty(value),
            "VOLUME" => entry.volume = non_empty(value),
            _ => {}
        }
    }
    entry
}

fn migrated_entry(
    line: &str,
    tokens: &[&str],
    table: &SpanTable,
    options: &ParseOptions,
) -> DatasetEntry {
    let name = strip_quotes(tokens[tokens.len() - 1]).to_string();
    let mut meta = EntryMeta::raw(line);
    if options.raw_fields {
        let mut fields = std::collections::BTreeMap::new();
        if let Some(first) = table.names().first() {
            fields.insert(first.clone(), tokens[0].to_string());
        }
        fields.insert("Dsname".to_string(), name.clone());
        meta.raw_fields = Some(fields);
    }
    DatasetEntry {
        name,
        is_migrated: true,
        meta,
        ..DatasetEntry::default()
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Parse a `yyyy/mm/dd` date.
pub(crate) fn parse_slash_date(text: &str) -> Option<NaiveDate> {
    let bytes = text.as_bytes();
    let shaped = bytes.len() == 10
        && bytes[4] == b'/'
        && bytes[7] == b'/'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !shaped {
        return None;
    }
    let year = text[0..4].parse().ok()?;
    let month = text[5..7].parse().ok()?;
    let day = text[8..10].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}
