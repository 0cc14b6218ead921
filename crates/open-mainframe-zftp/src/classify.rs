//! Listing classification and dispatch.
//!
//! The FTP `LIST` reply does not say what kind of table it contains; the
//! shape is recognised from the first line:
//!
//! | First line                                  | Table                  |
//! |---------------------------------------------|------------------------|
//! | starts with `total`                         | USS directory          |
//! | contains `Volume` and `Dsname`              | MVS datasets           |
//! | contains `Name` and `Id`                    | PDS members            |
//! | contains `Name` and `Amode`                 | load library members   |
//! | first token is a file mode (`-rw-r--r--`)   | single USS file / link |

use serde::{Deserialize, Serialize};

use crate::dataset::{parse_datasets, DatasetEntry};
use crate::entry::{EntryMeta, ParseOptions};
use crate::error::ZftpError;
use crate::loadlib::{parse_loadlib_members, LoadLibMemberEntry};
use crate::member::{parse_members, DatasetMemberEntry};
use crate::uss::{is_file_mode, parse_uss_listing, UssEntry};
use crate::Result;

/// Kind of table a listing holds, decided once from its first line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TableKind {
    DatasetListing,
    MemberListing,
    LoadLibListing,
    UssListing,
    Unrecognized,
}

/// Classify a listing by its first line.
///
/// Signatures are case-sensitive substring tests evaluated in order. An
/// empty listing is `Unrecognized`.
pub fn classify<S: AsRef<str>>(lines: &[S]) -> TableKind {
    let Some(first) = lines.first() else {
        return TableKind::Unrecognized;
    };
    let first: &str = first.as_ref();

    if first.starts_with("total") {
        TableKind::UssListing
    } else if first.contains("Volume") && first.contains("Dsname") {
        TableKind::DatasetListing
    } else if first.contains("Name") && first.contains("Id") {
        TableKind::MemberListing
    } else if first.contains("Name") && first.contains("Amode") {
        TableKind::LoadLibListing
    } else if first.contains(' ')
        && first.split_whitespace().next().is_some_and(is_file_mode)
    {
        TableKind::UssListing
    } else {
        TableKind::Unrecognized
    }
}

/// A decoded listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Listing {
    Datasets(Vec<DatasetEntry>),
    Members(Vec<DatasetMemberEntry>),
    LoadLibMembers(Vec<LoadLibMemberEntry>),
    Files(Vec<UssEntry>),
}

impl Listing {
    /// An empty listing of the given kind.
    pub fn empty(kind: TableKind) -> Self {
        match kind {
            TableKind::MemberListing => Listing::Members(Vec::new()),
            TableKind::LoadLibListing => Listing::LoadLibMembers(Vec::new()),
            TableKind::UssListing => Listing::Files(Vec::new()),
            TableKind::DatasetListing | TableKind::Unrecognized => Listing::Datasets(Vec::new()),
        }
    }

    /// Kind of table the entries came from.
    pub fn kind(&self) -> TableKind {
        match self {
            Listing::Datasets(_) => TableKind::DatasetListing,
            Listing::Members(_) => TableKind::MemberListing,
            Listing::LoadLibMembers(_) => TableKind::LoadLibListing,
            Listing::Files(_) => TableKind::UssListing,
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        match self {
            Listing::Datasets(v) => v.len(),
            Listing::Members(v) => v.len(),
            Listing::LoadLibMembers(v) => v.len(),
            Listing::Files(v) => v.len(),
        }
    }

    /// Returns `true` if no entries were decoded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Provenance of every entry, in listing order.
    pub fn metas(&self) -> Vec<&EntryMeta> {
        match self {
            Listing::Datasets(v) => v.iter().map(|e| &e.meta).collect(),
            Listing::Members(v) => v.iter().map(|e| &e.meta).collect(),
            Listing::LoadLibMembers(v) => v.iter().map(|e| &e.meta).collect(),
            Listing::Files(v) => v.iter().map(|e| &e.meta).collect(),
        }
    }

    /// Entry names, in listing order.
    pub fn names(&self) -> Vec<&str> {
        match self {
            Listing::Datasets(v) => v.iter().map(|e| e.name.as_str()).collect(),
            Listing::Members(v) => v.iter().map(|e| e.name.as_str()).collect(),
            Listing::LoadLibMembers(v) => v.iter().map(|e| e.name.as_str()).collect(),
            Listing::Files(v) => v.iter().map(|e| e.name.as_str()).collect(),
        }
    }
}

/// Classify and decode a listing.
///
/// An empty reply decodes to an empty dataset listing. A first line that
/// matches no known table is a [`ZftpError::Classification`].
pub fn parse_listing<S: AsRef<str>>(lines: &[S], options: &ParseOptions) -> Result<Listing> {
    if lines.is_empty() {
        return Ok(Listing::empty(TableKind::DatasetListing));
    }

    let kind = classify(lines);
    tracing::debug!(?kind, lines = lines.len(), "Classified listing");
    match kind {
        TableKind::UssListing => Ok(Listing::Files(parse_uss_listing(lines, options))),
        TableKind::DatasetListing => Ok(Listing::Datasets(parse_datasets(lines, options))),
        TableKind::MemberListing => Ok(Listing::Members(parse_members(lines, options))),
        TableKind::LoadLibListing => Ok(Listing::LoadLibMembers(parse_loadlib_members(
            lines, options,
        ))),
        TableKind::Unrecognized => {
            let header = lines[0].as_ref().to_string();
            tracing::warn!(header = %header, "Unrecognized file list header");
            Err(ZftpError::Classification { header })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_signatures() {
        assert_eq!(classify(&["total 554"]), TableKind::UssListing);
        assert_eq!(
            classify(&["Volume Unit    Referred Ext Used Recfm Lrecl BlkSz Dsorg Dsname"]),
            TableKind::DatasetListing
        );
        assert_eq!(
            classify(&[" Name     VV.MM   Created       Changed      Size  Init   Mod   Id"]),
            TableKind::MemberListing
        );
        assert_eq!(
            classify(&[
                " Name      Size     TTR   Alias-of AC --------- Attributes --------- Amode Rmode "
            ]),
            TableKind::LoadLibListing
        );
        assert_eq!(
            classify(&["-rw-------   1 USER  GROUP    2152185 Nov  7 20:40 /tmp/abc.txt"]),
            TableKind::UssListing
        );
        assert_eq!(classify(&["Something else"]), TableKind::Unrecognized);
        assert_eq!(classify(&["nospace"]), TableKind::Unrecognized);
        let none: [&str; 0] = [];
        assert_eq!(classify(&none), TableKind::Unrecognized);
    }

    #[test]
    fn test_classification_is_case_sensitive() {
        assert_eq!(classify(&["volume dsname"]), TableKind::Unrecognized);
        assert_eq!(classify(&["TOTAL 5"]), TableKind::Unrecognized);
    }

    #[test]
    fn test_dispatch_to_dataset_decoder() {
        let lines = [
            "Volume Unit    Referred Ext Used Recfm Lrecl BlkSz Dsorg Dsname",
            "F1DBAR 3390   2016/12/19  3   19  FB      80  3120  PO  CB12V51.CNTL",
            "250 List completed successfully.",
        ];
        let listing = parse_listing(&lines, &ParseOptions::default()).unwrap();
        assert_eq!(listing.kind(), TableKind::DatasetListing);
        assert_eq!(listing.names(), vec!["CB12V51.CNTL"]);
    }

    #[test]
    fn test_dispatch_single_uss_file() {
        let lines = ["-rw-------   1 USER  GROUP    2152185 Nov  7 20:40 /tmp/abc.txt"];
        let listing = parse_listing(&lines, &ParseOptions::default()).unwrap();
        match listing {
            Listing::Files(files) => {
                assert_eq!(files.len(), 1);
                assert_eq!(files[0].name, "/tmp/abc.txt");
                assert_eq!(files[0].size, Some(2152185));
            }
            other => panic!("expected files, got {other:?}"),
        }
    }

    #[test]
    fn test_dispatch_uss_directory_drops_total() {
        let lines = [
            "total 16",
            "drwxr-xr-x    10 CLASGEN  DEFLT1      8192 Jul 13 18:52 CEC3",
        ];
        let listing = parse_listing(&lines, &ParseOptions::default()).unwrap();
        assert_eq!(listing.len(), 1);
        assert_eq!(listing.metas()[0].raw_text, lines[1]);
    }

    #[test]
    fn test_unrecognized_header_is_an_error() {
        let err = parse_listing(&["Hello world"], &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, ZftpError::Classification { ref header } if header == "Hello world"));
    }

    #[test]
    fn test_empty_reply_is_empty_listing() {
        let none: [&str; 0] = [];
        let listing = parse_listing(&none, &ParseOptions::default()).unwrap();
        assert!(listing.is_empty());
    }
}
