//! Provenance shared by every listing entry, and decoding options.

use std::collections::BTreeMap;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

/// Line provenance carried by every decoded entry.
///
/// `raw_text` is the listing line the entry was built from and
/// `field_names` the header labels it was decoded against (empty when the
/// row could not be matched to the header). `raw_fields` is the untyped
/// label → value map, present only when [`ParseOptions::raw_fields`] is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryMeta {
    /// Original listing line.
    pub raw_text: String,
    /// Header labels, in column order.
    pub field_names: Vec<String>,
    /// Label → raw value, for callers that still look fields up by name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_fields: Option<BTreeMap<String, String>>,
}

impl EntryMeta {
    /// Provenance for a line that was not decoded into columns.
    pub fn raw(line: &str) -> Self {
        Self {
            raw_text: line.to_string(),
            ..Self::default()
        }
    }

    /// Returns `true` if the row was decoded against a header column with
    /// this label.
    pub fn has_field(&self, name: &str) -> bool {
        self.field_names.iter().any(|n| n == name)
    }

    /// Raw value of a column by header label, when raw fields were kept.
    pub fn raw_field(&self, name: &str) -> Option<&str> {
        self.raw_fields
            .as_ref()
            .and_then(|fields| fields.get(name))
            .map(String::as_str)
    }

    pub(crate) fn record(&mut self, options: &ParseOptions, name: &str, value: &str) {
        self.field_names.push(name.to_string());
        if options.raw_fields {
            self.raw_fields
                .get_or_insert_with(BTreeMap::new)
                .insert(name.to_string(), value.to_string());
        }
    }
}

/// Options that shape how listings are decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Keep every decoded column as an untyped label → value map.
    pub raw_fields: bool,
    /// Year assumed for USS timestamps that omit it (`Oct  2 09:48`).
    /// Defaults to the current local year.
    pub reference_year: Option<i32>,
}

impl ParseOptions {
    /// Options that keep the raw field map.
    pub fn with_raw_fields() -> Self {
        Self {
            raw_fields: true,
            ..Self::default()
        }
    }

    /// The year used for timestamps without one.
    pub fn year(&self) -> i32 {
        self.reference_year
            .unwrap_or_else(|| chrono::Local::now().year())
    }
}
