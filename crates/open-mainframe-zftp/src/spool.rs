//! JES spool file table and spool file addressing.
//!
//! ```text
//!          ID  STEPNAME PROCSTEP C DDNAME   BYTE-COUNT
//!          001 JES2              K JESMSGLG      1206
//!          004 JAVA     JAVAJVM  K SYSOUT         801
//! 5 spool files
//! ```
//!
//! Values in this table can abut, so column boundaries come from the header
//! alone: a column starts where a label starts and runs up to the next label.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entry::ParseOptions;
use crate::span::char_slice;

/// Separator JES puts between spool files when all of them are retrieved
/// at once.
pub const SPOOL_FILE_SEPARATOR: &str = "!! END OF JES SPOOL FILE !!";

/// DD name of the job message log.
pub const JESMSGLG: &str = "JESMSGLG";

/// One spool file of a job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpoolFile {
    /// Spool file number within the job.
    pub id: u32,
    /// Job step that produced the file.
    pub step_name: Option<String>,
    /// Procedure step that produced the file.
    pub proc_step: Option<String>,
    /// SYSOUT class.
    pub class: Option<String>,
    /// DD name.
    pub dd_name: Option<String>,
    /// Size in bytes.
    pub byte_count: Option<u64>,
    /// Lower-cased label → raw value, when raw fields are kept.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_fields: Option<BTreeMap<String, String>>,
}

/// Returns `true` for the `N spool files` line that ends the table.
pub fn is_spool_footer(line: &str) -> bool {
    line.match_indices(" spool files").any(|(index, _)| {
        line[..index]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_ascii_digit())
    })
}

/// A column of the spool table: label and character range. `end` is `None`
/// for the last column, which runs to the end of the line.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SpoolColumn {
    label: String,
    start: usize,
    end: Option<usize>,
}

fn spool_columns(header: &str) -> Vec<SpoolColumn> {
    let chars: Vec<char> = header.chars().collect();
    let mut columns = Vec::new();
    let mut range_start = 0;
    let mut last = ' ';

    for (index, &c) in chars.iter().enumerate() {
        if last.is_whitespace() && !c.is_whitespace() {
            let label = char_slice(&chars, range_start, index);
            if !label.trim().is_empty() {
                columns.push(SpoolColumn {
                    label: label.trim().to_ascii_uppercase(),
                    start: range_start,
                    end: Some(index),
                });
                range_start = index;
            }
        }
        last = c;
    }

    let label = char_slice(&chars, range_start, chars.len());
    if !label.trim().is_empty() {
        columns.push(SpoolColumn {
            label: label.trim().to_ascii_uppercase(),
            start: range_start,
            end: None,
        });
    }
    columns
}

/// Decode the spool file table, header line first.
///
/// Decoding stops at the `N spool files` footer. Rows without a numeric ID
/// are skipped.
pub fn parse_spool_table<S: AsRef<str>>(lines: &[S], options: &ParseOptions) -> Vec<SpoolFile> {
    let Some((header, rows)) = lines.split_first() else {
        return Vec::new();
    };
    let columns = spool_columns(header.as_ref());
    let mut spool_files = Vec::new();

    for line in rows.iter().map(AsRef::<str>::as_ref) {
        if is_spool_footer(line) {
            break;
        }
        let chars: Vec<char> = line.chars().collect();
        let mut spool_file = SpoolFile::default();
        let mut id = None;

        for column in &columns {
            let end = column.end.unwrap_or(chars.len());
            let value = char_slice(&chars, column.start, end).trim().to_string();
            if options.raw_fields {
                spool_file
                    .raw_fields
                    .get_or_insert_with(BTreeMap::new)
                    .insert(column.label.to_ascii_lowercase(), value.clone());
            }
            let value = (!value.is_empty()).then_some(value);
            match column.label.as_str() {
                "ID" => id = value.and_then(|v| v.parse().ok()),
                "STEPNAME" => spool_file.step_name = value,
                "PROCSTEP" => spool_file.proc_step = value,
                "C" => spool_file.class = value,
                "DDNAME" => spool_file.dd_name = value,
                "BYTE-COUNT" => spool_file.byte_count = value.and_then(|v| v.parse().ok()),
                _ => {}
            }
        }

        match id {
            Some(id) => spool_files.push(SpoolFile { id, ..spool_file }),
            None => tracing::debug!(line, "Skipping spool table row without ID"),
        }
    }
    spool_files
}

// ---------------------------------------------------------------------------
// Spool file addressing
// ---------------------------------------------------------------------------

/// Which spool files of a job to retrieve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpoolSelector {
    /// A single spool file by its number.
    File(u32),
    /// Every spool file, joined by [`SPOOL_FILE_SEPARATOR`].
    All,
}

/// Remote name of one or all spool files of a job: `JOB00042.2` or
/// `JOB00042.x`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpoolFileRef {
    pub job_id: String,
    pub selector: SpoolSelector,
}

impl SpoolFileRef {
    /// Reference a single spool file.
    pub fn file(job_id: impl Into<String>, id: u32) -> Self {
        Self {
            job_id: job_id.into(),
            selector: SpoolSelector::File(id),
        }
    }

    /// Reference all spool files of the job.
    pub fn all(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            selector: SpoolSelector::All,
        }
    }
}

impl fmt::Display for SpoolFileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.selector {
            SpoolSelector::File(id) => write!(f, "{}.{}", self.job_id, id),
            SpoolSelector::All => write!(f, "{}.x", self.job_id),
        }
    }
}

/// Split the text of all spool files into the individual files.
pub fn split_spool_files(text: &str) -> Vec<&str> {
    let mut files: Vec<&str> = text
        .split(SPOOL_FILE_SEPARATOR)
        .map(|file| file.trim_matches(|c| c == '\r' || c == '\n'))
        .collect();
    if files.last().is_some_and(|f| f.trim().is_empty()) {
        files.pop();
    }
    files
}
