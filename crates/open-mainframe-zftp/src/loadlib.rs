//! Load library member listings.
//!
//! ```text
//!  Name      Size     TTR   Alias-of AC --------- Attributes --------- Amode Rmode
//! DD        03DBD8   031506 IRRENV00 01 FO             RN RU            31    24
//! ```
//!
//! The attribute flags sit under a fixed-width dashed banner and may contain
//! spaces, so the banner is treated as one column and every value is found by
//! scanning outwards from its label.

use serde::{Deserialize, Serialize};

use crate::entry::{EntryMeta, ParseOptions};
use crate::span::{anchored_spans, scan_field, ColumnSpan};

/// Banner that spans the attribute flags in the header.
pub const ATTRIBUTES_BANNER: &str = "--------- Attributes ---------";

/// Column name given to the banner region.
pub const ATTRIBUTES_COLUMN: &str = "ATTRIBUTES";

/// One member of a load library.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadLibMemberEntry {
    /// Member name.
    pub name: String,
    /// Module size in bytes (printed in hex).
    pub size: Option<u32>,
    /// Track/record address, hex.
    pub ttr: Option<String>,
    /// Name of the member this one is an alias of; empty when not an alias.
    pub alias_of: Option<String>,
    /// Authorization code (0 or 1).
    pub ac: Option<u8>,
    /// Free-form attribute flags (`FO RN RU`, ...).
    pub attributes: Option<String>,
    /// Addressing mode.
    pub amode: Option<String>,
    /// Residency mode.
    pub rmode: Option<String>,
    /// Line provenance.
    #[serde(flatten)]
    pub meta: EntryMeta,
}

impl LoadLibMemberEntry {
    /// Returns `true` if the member is an alias of another member.
    pub fn is_alias(&self) -> bool {
        self.alias_of.as_deref().is_some_and(|a| !a.is_empty())
    }

    /// Returns `true` if the module is APF authorized (`AC=1`).
    pub fn is_authorized(&self) -> bool {
        self.ac == Some(1)
    }
}

/// Column spans of a load library header.
pub fn loadlib_spans(header: &str) -> Vec<ColumnSpan> {
    anchored_spans(header, ATTRIBUTES_BANNER, ATTRIBUTES_COLUMN)
}

/// Decode a load library member listing, header line first.
pub fn parse_loadlib_members<S: AsRef<str>>(
    lines: &[S],
    options: &ParseOptions,
) -> Vec<LoadLibMemberEntry> {
    let Some((header, rows)) = lines.split_first() else {
        return Vec::new();
    };
    let spans = loadlib_spans(header.as_ref());

    rows.iter()
        .map(|line| build_entry(line.as_ref(), &spans, options))
        .collect()
}

fn build_entry(line: &str, spans: &[ColumnSpan], options: &ParseOptions) -> LoadLibMemberEntry {
    let mut entry = LoadLibMemberEntry {
        meta: EntryMeta::raw(line),
        ..LoadLibMemberEntry::default()
    };

    for span in spans {
        let value = scan_field(line, span);
        entry.meta.record(options, &span.name, &value);
        match span.name.to_ascii_uppercase().as_str() {
            "NAME" => entry.name = value,
            "SIZE" => entry.size = u32::from_str_radix(&value, 16).ok(),
            "TTR" => entry.ttr = Some(value),
            "ALIAS-OF" => entry.alias_of = Some(value),
            "AC" => entry.ac = value.parse().ok(),
            ATTRIBUTES_COLUMN => entry.attributes = Some(value),
            "AMODE" => entry.amode = Some(value),
            "RMODE" => entry.rmode = Some(value),
            _ => {}
        }
    }
    entry
}
