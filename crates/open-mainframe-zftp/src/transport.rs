//! Boundary to the FTP client that talks to the z/OS FTP server.
//!
//! The decoders never issue commands; [`crate::ZosAccessor`] drives an
//! [`FtpTransport`] and hands the reply lines to them.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::allocate::AllocateParams;
use crate::Result;

// ---------------------------------------------------------------------------
// FTP Reply Codes
// ---------------------------------------------------------------------------

/// A reply from the FTP server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FtpReply {
    pub code: u16,
    pub message: String,
}

impl FtpReply {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.code)
    }

    /// Returns `true` for the 550 replies z/OS sends when a listing matched
    /// nothing: `No data sets found`, `No members found`, ...
    pub fn is_no_data_found(&self) -> bool {
        self.code == 550 && mentions_nothing_found(&self.message)
    }
}

impl fmt::Display for FtpReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// `No <words> found` anywhere in the message.
fn mentions_nothing_found(message: &str) -> bool {
    message.match_indices("No ").any(|(index, prefix)| {
        let rest = &message[index + prefix.len()..];
        rest.match_indices(" found").any(|(end, _)| {
            let words = &rest[..end];
            !words.trim().is_empty()
                && words
                    .chars()
                    .all(|c| c.is_whitespace() || c.is_alphanumeric() || c == '_')
        })
    })
}

// ---------------------------------------------------------------------------
// SITE directives
// ---------------------------------------------------------------------------

/// Transfer mode for FTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransferMode {
    Ascii,
    Binary,
}

/// `SITE` directives that select how the server interprets later commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SiteCommand {
    /// Dataset mode.
    Seq,
    /// Dataset mode with ISPF statistics in member listings.
    SeqIspfStats,
    /// Dataset mode with the attributes for a dataset created by `STOR`.
    SeqAllocate(AllocateParams),
    /// Attributes for a partitioned dataset created by `MKD`.
    Allocate(AllocateParams),
    /// Directives passed through as given.
    Raw(String),
    /// JES mode, no filters. Used to submit JCL.
    Jes,
    /// JES mode, any job name. Used to purge jobs.
    JesAnyJob,
    /// JES mode with job list filters.
    JesFilter {
        job_name: String,
        owner: String,
        status: String,
    },
    /// JES mode with CRLF line ends, any job name, filtered by owner. Used for
    /// job status and spool file retrieval.
    JesSpool { owner: String },
}

impl fmt::Display for SiteCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SiteCommand::Seq => write!(f, "FILETYPE=SEQ"),
            SiteCommand::SeqIspfStats => write!(f, "FILETYPE=SEQ ISPFSTATS"),
            SiteCommand::SeqAllocate(params) if params.is_empty() => write!(f, "FILETYPE=SEQ"),
            SiteCommand::SeqAllocate(params) => write!(f, "FILETYPE=SEQ {params}"),
            SiteCommand::Allocate(params) => write!(f, "{params}"),
            SiteCommand::Raw(text) => f.write_str(text),
            SiteCommand::Jes => write!(f, "FILETYPE=JES"),
            SiteCommand::JesAnyJob => write!(f, "FILETYPE=JES JESJOBNAME=*"),
            SiteCommand::JesFilter {
                job_name,
                owner,
                status,
            } => write!(
                f,
                "FILETYPE=JES JESJOBNAME={job_name} JESOWNER={owner} JESSTATUS={status}"
            ),
            SiteCommand::JesSpool { owner } => {
                write!(f, "FILETYPE=JES SBSENDEOL=CRLF JESJOBNAME=* JESOWNER={owner}")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Transport trait
// ---------------------------------------------------------------------------

/// A connected FTP session.
///
/// The server handles one command at a time, so every method takes
/// `&mut self`. Failures are reported as [`crate::ZftpError::Transport`]
/// carrying the server reply.
#[async_trait]
pub trait FtpTransport: Send {
    /// Switch the data transfer mode (`TYPE A` / `TYPE I`).
    async fn set_mode(&mut self, mode: TransferMode) -> Result<()>;

    /// Send a `SITE` directive.
    async fn site(&mut self, command: &SiteCommand) -> Result<FtpReply>;

    /// `LIST` a path, one reply line per element.
    async fn list(&mut self, path: &str) -> Result<Vec<String>>;

    /// `RETR` a remote file as text.
    async fn retrieve_text(&mut self, path: &str) -> Result<String>;

    /// `STOR` text under a remote name; returns the completion reply.
    async fn store_text(&mut self, text: &str, path: &str) -> Result<FtpReply>;

    /// `DELE` a remote name.
    async fn delete(&mut self, path: &str) -> Result<()>;

    /// `RNFR` / `RNTO`.
    async fn rename(&mut self, from: &str, to: &str) -> Result<()>;

    /// `MKD` a directory, or a partitioned dataset after `SITE` attributes.
    async fn mkdir(&mut self, path: &str) -> Result<()>;

    /// Send any other command on the control connection, e.g. `STAT`.
    async fn send(&mut self, command: &str) -> Result<FtpReply>;
}
