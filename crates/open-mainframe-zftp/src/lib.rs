//! # z/OS FTP listing and JES job status interpretation
//!
//! Decodes the text tables the z/OS FTP server returns and resolves the state
//! of batch jobs for the OpenMainframe project.
//!
//! ## Features
//!
//! - **Listing classification** — dataset, PDS member, load library and USS
//!   listings recognised from their header line
//! - **Column decoding** — header-driven spans with boundary correction for
//!   values that overflow their column
//! - **JES job status** — job lines, spool file tables and a job state
//!   machine with return code recovery from the message log
//! - **Accessor** — dataset allocation, file and job operations over any
//!   [`FtpTransport`]
//!
//! ## Example
//!
//! ```rust
//! use open_mainframe_zftp::{parse_listing, ParseOptions, TableKind};
//!
//! let lines = [
//!     "Volume Unit    Referred Ext Used Recfm Lrecl BlkSz Dsorg Dsname",
//!     "F1DBAR 3390   2016/12/19  3   19  FB      80  3120  PO  CB12V51.CNTL",
//!     "250 List completed successfully.",
//! ];
//! let listing = parse_listing(&lines, &ParseOptions::default()).unwrap();
//! assert_eq!(listing.kind(), TableKind::DatasetListing);
//! assert_eq!(listing.names(), vec!["CB12V51.CNTL"]);
//! ```

#![forbid(unsafe_code)]

pub mod accessor;
pub mod allocate;
pub mod classify;
pub mod config;
pub mod dataset;
pub mod dsn;
pub mod entry;
pub mod error;
pub mod job;
pub mod loadlib;
pub mod member;
pub mod rc;
pub mod span;
pub mod spool;
pub mod transport;
pub mod uss;

pub use accessor::{FileScope, JobIdOption, JobListOption, JobLogOption, ZosAccessor};
pub use allocate::{AllocateParam, AllocateParams};
pub use classify::{classify, parse_listing, Listing, TableKind};
pub use config::{ConnectionConfig, JobsConfig, ZftpConfig};
pub use dataset::{parse_datasets, DatasetEntry, Referred};
pub use entry::{EntryMeta, ParseOptions};
pub use error::ZftpError;
pub use job::{
    parse_job_line, parse_job_list, parse_job_status, resolve_job, resolve_listed_job,
    return_code_from_extra, Job, JobPhase, JobResolution, JobStatus, JobStatusResult, ReturnCode,
};
pub use loadlib::{parse_loadlib_members, LoadLibMemberEntry};
pub use member::{parse_members, DatasetMemberEntry};
pub use rc::extract_rc;
pub use span::{ColumnSpan, SpanTable};
pub use spool::{
    parse_spool_table, split_spool_files, SpoolFile, SpoolFileRef, SpoolSelector,
    SPOOL_FILE_SEPARATOR,
};
pub use transport::{FtpReply, FtpTransport, SiteCommand, TransferMode};
pub use uss::{parse_uss_listing, FileType, UssEntry};

/// Convenience result type for z/OS FTP operations.
pub type Result<T> = std::result::Result<T, ZftpError>;
