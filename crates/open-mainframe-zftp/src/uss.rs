//! z/OS UNIX directory listings (`ls -l` format).
//!
//! ```text
//! total 554
//! lrwxrwxrwx     1 CLASGEN  GRP2611        9 Jul 13 19:13 $SYSNAME -> $SYSNAME/
//! drwxr-xr-x    10 CLASGEN  DEFLT1      8192 Jul 13 18:52 CEC3
//! -rwx------     1 CLASGEN  GRP2611     1749 Aug 25  2004 DetailMerge
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::entry::{EntryMeta, ParseOptions};

/// Logical names of the fixed leading columns.
pub const USS_COLUMNS: [&str; 5] = ["permissions", "links", "owner", "group", "size"];

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Separator between a symbolic link and its target.
const LINK_ARROW: &str = " -> ";

/// Kind of file system object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileType {
    File,
    Directory,
    Link,
}

impl FileType {
    /// File type from the first character of a permission string.
    pub fn from_permissions(permissions: &str) -> Self {
        match permissions.chars().next() {
            Some('d') => FileType::Directory,
            Some('l') => FileType::Link,
            _ => FileType::File,
        }
    }
}

/// One file, directory or link of a USS listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UssEntry {
    /// File name (without the link target).
    pub name: String,
    /// File type from the permission string.
    pub file_type: FileType,
    /// Permission string, e.g. `drwxr-xr-x`.
    pub permissions: String,
    /// Hard link count.
    pub links: Option<u32>,
    /// Owning user.
    pub owner: String,
    /// Owning group.
    pub group: String,
    /// Size in bytes.
    pub size: Option<u64>,
    /// Last modification date. `None` when the listed date names no real
    /// day, e.g. an unknown month.
    pub last_modified: Option<NaiveDate>,
    /// Target of a symbolic link.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_to: Option<String>,
    /// Line provenance.
    #[serde(flatten)]
    pub meta: EntryMeta,
}

/// Returns `true` if the token looks like a file mode string
/// (only `d`, `l`, `r`, `w`, `x` and `-`).
pub fn is_file_mode(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| matches!(c, 'd' | 'l' | 'r' | 'w' | 'x' | '-'))
}

/// Decode a USS listing.
///
/// A leading `total N` line is discarded. Lines with fewer than nine fields
/// are not `ls -l` rows and are skipped; every other row yields an entry.
pub fn parse_uss_listing<S: AsRef<str>>(lines: &[S], options: &ParseOptions) -> Vec<UssEntry> {
    let rows = match lines.split_first() {
        Some((first, rest)) if first.as_ref().starts_with("total") => rest,
        _ => lines,
    };
    let year = options.year();
    rows.iter()
        .filter_map(|line| parse_uss_line(line.as_ref(), year, options))
        .collect()
}

fn parse_uss_line(line: &str, year: i32, options: &ParseOptions) -> Option<UssEntry> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 9 {
        tracing::debug!(line, "Skipping USS line with too few fields");
        return None;
    }

    let mut meta = EntryMeta::raw(line);
    for (name, value) in USS_COLUMNS.iter().zip(&fields) {
        meta.record(options, name, value);
    }

    let last_modified = modification_date(fields[5], fields[6], fields[7], year);
    if last_modified.is_none() {
        tracing::warn!(line, "Unreadable modification date in USS listing");
    }
    let size = fields[4].parse().ok();
    if size.is_none() {
        tracing::warn!(line, "Unreadable size in USS listing");
    }

    let permissions = fields[0].to_string();
    let file_type = FileType::from_permissions(&permissions);
    let mut name = fields[8..].join(" ");
    let mut link_to = None;
    if file_type == FileType::Link {
        if let Some((link, target)) = name.split_once(LINK_ARROW) {
            link_to = Some(target.to_string());
            name = link.to_string();
        }
    }

    Some(UssEntry {
        name,
        file_type,
        permissions,
        links: fields[1].parse().ok(),
        owner: fields[2].to_string(),
        group: fields[3].to_string(),
        size,
        last_modified,
        link_to,
        meta,
    })
}

/// `Mon D YYYY` carries its year. `Mon D HH:MM` is a recent change: it is in
/// `current_year`, or in the year before when that year has no such day
/// (`Feb 29` listed in a common year).
fn modification_date(month: &str, day: &str, year_or_time: &str, current_year: i32) -> Option<NaiveDate> {
    let month = MONTHS.iter().position(|m| *m == month)? as u32 + 1;
    let day = day.parse().ok()?;
    if year_or_time.contains(':') {
        NaiveDate::from_ymd_opt(current_year, month, day)
            .or_else(|| NaiveDate::from_ymd_opt(current_year - 1, month, day))
    } else {
        NaiveDate::from_ymd_opt(year_or_time.parse().ok()?, month, day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> ParseOptions {
        ParseOptions {
            reference_year: Some(2019),
            ..ParseOptions::default()
        }
    }

    fn root_list() -> Vec<&'static str> {
        vec![
            "total 554",
            "lrwxrwxrwx     1 CLASGEN  GRP2611        9 Jul 13 19:13 $SYSNAME -> $SYSNAME/",
            "lrwxrwxrwx     1 CLASGEN  GRP2611        9 Jul 13 19:13 $VERSION -> $VERSION/",
            "drwxr-xr-x    10 CLASGEN  DEFLT1      8192 Jul 13 18:52 CEC3",
            "-rwx------     1 CLASGEN  GRP2611     1749 Aug 25  2004 DetailMerge",
        ]
    }

    #[test]
    fn test_root_listing() {
        let entries = parse_uss_listing(&root_list(), &options());
        assert_eq!(entries.len(), 4);

        let link = &entries[0];
        assert_eq!(link.file_type, FileType::Link);
        assert_eq!(link.name, "$SYSNAME");
        assert_eq!(link.link_to.as_deref(), Some("$SYSNAME/"));
        assert_eq!(link.size, Some(9));
        assert_eq!(link.last_modified, NaiveDate::from_ymd_opt(2019, 7, 13));

        let dir = &entries[2];
        assert_eq!(dir.file_type, FileType::Directory);
        assert_eq!(dir.name, "CEC3");
        assert_eq!(dir.links, Some(10));
        assert_eq!(dir.owner, "CLASGEN");
        assert_eq!(dir.group, "DEFLT1");
        assert_eq!(dir.size, Some(8192));
        assert_eq!(dir.link_to, None);

        let file = &entries[3];
        assert_eq!(file.file_type, FileType::File);
        assert_eq!(file.permissions, "-rwx------");
        assert_eq!(file.last_modified, NaiveDate::from_ymd_opt(2004, 8, 25));
        assert_eq!(file.meta.field_names, USS_COLUMNS.to_vec());
    }

    #[test]
    fn test_simple_link() {
        let lines = ["lrwxrwxrwx   1 USER  GROUP        9 Jul 13 19:13 a -> b"];
        let entries = parse_uss_listing(&lines, &options());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].file_type, FileType::Link);
        assert_eq!(entries[0].name, "a");
        assert_eq!(entries[0].link_to.as_deref(), Some("b"));
    }

    #[test]
    fn test_link_to_root() {
        let lines = [
            "total 8",
            "lrwxrwxrwx   1 USER     GROUP          1 Feb  1  2018 zzz2 -> /",
        ];
        let entries = parse_uss_listing(&lines, &options());
        assert_eq!(entries[0].name, "zzz2");
        assert_eq!(entries[0].link_to.as_deref(), Some("/"));
    }

    #[test]
    fn test_names_with_spaces_are_rejoined() {
        let lines = ["-rw-r--r--   1 USER     GROUP        120 Oct  2 09:48 my  notes.txt"];
        let entries = parse_uss_listing(&lines, &options());
        assert_eq!(entries[0].name, "my notes.txt");
        assert_eq!(entries[0].last_modified, NaiveDate::from_ymd_opt(2019, 10, 2));
    }

    #[test]
    fn test_short_lines_are_skipped() {
        let lines = ["total 0", "garbage", "-rw-r--r--   1 USER GROUP   12"];
        assert!(parse_uss_listing(&lines, &options()).is_empty());
    }

    #[test]
    fn test_leap_day_in_common_year_is_kept() {
        let lines = [
            "total 8",
            "-rw-r--r-- 1 USER GROUP 120 Feb 29 09:48 leap.txt",
            "-rw-r--r-- 1 USER GROUP 120 Mar  1 09:48 next.txt",
        ];
        let options = ParseOptions {
            reference_year: Some(2025),
            ..ParseOptions::default()
        };
        let entries = parse_uss_listing(&lines, &options);
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["leap.txt", "next.txt"]);
        assert_eq!(entries[0].last_modified, NaiveDate::from_ymd_opt(2024, 2, 29));
        assert_eq!(entries[1].last_modified, NaiveDate::from_ymd_opt(2025, 3, 1));
    }

    #[test]
    fn test_unreadable_date_and_size_keep_the_entry() {
        let lines = [
            "drwxr-xr-x   2 USER GROUP 8192 Foo 13 18:52 dir",
            "-rw-r--r--   1 USER GROUP    ? Apr 31  2018 odd",
        ];
        let entries = parse_uss_listing(&lines, &options());
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "dir");
        assert_eq!(entries[0].last_modified, None);
        assert_eq!(entries[0].size, Some(8192));
        assert_eq!(entries[1].name, "odd");
        assert_eq!(entries[1].size, None);
        assert_eq!(entries[1].last_modified, None);
    }

    #[test]
    fn test_raw_fields_keep_fixed_columns() {
        let entries = parse_uss_listing(&root_list(), &ParseOptions::with_raw_fields());
        assert_eq!(entries[2].meta.raw_field("links"), Some("10"));
        assert_eq!(entries[2].meta.raw_field("permissions"), Some("drwxr-xr-x"));
    }

    #[test]
    fn test_file_mode_tokens() {
        assert!(is_file_mode("-rw-------"));
        assert!(is_file_mode("lrwxrwxrwx"));
        assert!(!is_file_mode("Volume"));
        assert!(!is_file_mode(""));
    }
}
