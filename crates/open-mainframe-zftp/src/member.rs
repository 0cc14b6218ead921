//! Partitioned dataset member listings (ISPF statistics).
//!
//! ```text
//!  Name     VV.MM   Created       Changed      Size  Init   Mod   Id
//! JVBR30    01.01 2018/09/07 2018/09/07 03:52    13    13     0 USER
//! ```
//!
//! Columns are whitespace separated, except that the `Changed` column holds
//! a date and a time: whitespace before an `HH:` token does not start a new
//! column.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::dataset::parse_slash_date;
use crate::entry::{EntryMeta, ParseOptions};

/// One member of a partitioned dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetMemberEntry {
    /// Member name.
    pub name: String,
    /// Version and modification level (`vv.mm`).
    pub version: Option<String>,
    /// Creation date (`yyyy/mm/dd`).
    pub created: Option<String>,
    /// Last change (`yyyy/mm/dd HH:MM`).
    pub changed: Option<String>,
    /// Current size in lines.
    pub size: Option<u32>,
    /// Size in lines when created.
    pub init: Option<u32>,
    /// Lines modified.
    pub modified: Option<u32>,
    /// User who last changed the member.
    pub user_id: Option<String>,
    /// Line provenance.
    #[serde(flatten)]
    pub meta: EntryMeta,
}

impl DatasetMemberEntry {
    /// Creation date, when present and well formed.
    pub fn created_date(&self) -> Option<NaiveDate> {
        self.created.as_deref().and_then(parse_slash_date)
    }

    /// Last change timestamp, when present and well formed.
    pub fn changed_at(&self) -> Option<NaiveDateTime> {
        let changed = self.changed.as_deref()?;
        let (date, time) = changed.split_once(' ')?;
        let date = parse_slash_date(date)?;
        let time = NaiveTime::parse_from_str(time.trim(), "%H:%M").ok()?;
        Some(date.and_time(time))
    }
}

/// Decode a member listing, header line first.
///
/// A row whose column count differs from the header's keeps only its name
/// and raw text.
pub fn parse_members<S: AsRef<str>>(
    lines: &[S],
    options: &ParseOptions,
) -> Vec<DatasetMemberEntry> {
    let Some((header, rows)) = lines.split_first() else {
        return Vec::new();
    };
    let headers: Vec<&str> = header.as_ref().split_whitespace().collect();

    rows.iter()
        .map(|line| build_entry(line.as_ref(), &headers, options))
        .collect()
}

fn build_entry(line: &str, headers: &[&str], options: &ParseOptions) -> DatasetMemberEntry {
    let fields = member_fields(line);
    let mut entry = DatasetMemberEntry {
        name: fields.first().cloned().unwrap_or_default(),
        meta: EntryMeta::raw(line),
        ..DatasetMemberEntry::default()
    };
    if fields.len() != headers.len() {
        tracing::debug!(
            line,
            columns = headers.len(),
            fields = fields.len(),
            "Member row does not match header, keeping raw text"
        );
        return entry;
    }

    for (name, value) in headers.iter().zip(&fields) {
        entry.meta.record(options, name, value);
        match name.to_ascii_uppercase().as_str() {
            "NAME" => entry.name = value.clone(),
            "VV.MM" => entry.version = Some(value.clone()),
            "CREATED" => entry.created = Some(value.clone()),
            "CHANGED" => entry.changed = Some(value.clone()),
            "SIZE" => entry.size = value.parse().ok(),
            "INIT" => entry.init = value.parse().ok(),
            "MOD" => entry.modified = value.parse().ok(),
            "ID" => entry.user_id = Some(value.clone()),
            _ => {}
        }
    }
    entry
}

/// Split a member row into column values.
///
/// A token made of digits followed by `:` belongs to the previous column, so
/// `2018/09/07 03:52` stays one value.
pub fn member_fields(line: &str) -> Vec<String> {
    let mut ranges: Vec<(usize, usize)> = Vec::new();
    for (start, end) in token_ranges(line) {
        let token = &line[start..end];
        match ranges.last_mut() {
            Some(previous) if is_time_token(token) => previous.1 = end,
            _ => ranges.push((start, end)),
        }
    }
    ranges
        .into_iter()
        .map(|(start, end)| line[start..end].to_string())
        .collect()
}

fn is_time_token(token: &str) -> bool {
    let digits = token.chars().take_while(char::is_ascii_digit).count();
    digits > 0 && token[digits..].starts_with(':')
}

/// Byte ranges of the whitespace-separated tokens of a line.
fn token_ranges(line: &str) -> Vec<(usize, usize)> {
    let mut ranges = Vec::new();
    let mut start = None;
    for (index, c) in line.char_indices() {
        if c.is_whitespace() {
            if let Some(s) = start.take() {
                ranges.push((s, index));
            }
        } else if start.is_none() {
            start = Some(index);
        }
    }
    if let Some(s) = start {
        ranges.push((s, line.len()));
    }
    ranges
}
