//! Error types for listing classification, job status and transport calls.

use miette::Diagnostic;
use thiserror::Error;

use crate::classify::TableKind;
use crate::transport::FtpReply;

/// Errors produced while interpreting z/OS FTP responses.
///
/// Rows that cannot be split into the header's columns are not errors; they
/// come back as raw-only entries. An unknown return code is `None`, not an
/// error either.
#[derive(Debug, Error, Diagnostic)]
pub enum ZftpError {
    /// The first line of a listing matched none of the known table headers.
    #[error("unrecognized file list header: {header}")]
    #[diagnostic(
        code(zftp::classification),
        help("the server replied with a table shape this decoder does not know")
    )]
    Classification { header: String },

    /// A listing decoded to a different kind of table than the call expects.
    #[error("expected a {expected:?} but the server returned a {found:?}")]
    #[diagnostic(code(zftp::unexpected_listing))]
    UnexpectedListing { expected: TableKind, found: TableKind },

    /// A job status response carried no `JOBNAME` header line.
    #[error("cannot find job header line")]
    #[diagnostic(code(zftp::missing_job_header))]
    MissingJobHeader,

    /// The line after the job header is not a job summary line.
    #[error("malformed job line: {line:?}")]
    #[diagnostic(code(zftp::malformed_job_line))]
    MalformedJobLine { line: String },

    /// A job operation was requested without a job ID.
    #[error("the job ID is required")]
    #[diagnostic(code(zftp::job_id_required))]
    JobIdRequired,

    /// JES accepted a submission but the reply did not name the job.
    #[error("failed to submit JCL, job id not found in reply: {0}")]
    #[diagnostic(code(zftp::submit))]
    SubmitFailed(String),

    /// The transport collaborator rejected a command.
    #[error("FTP {0}")]
    #[diagnostic(code(zftp::transport))]
    Transport(FtpReply),

    /// Configuration could not be read or parsed.
    #[error("configuration error: {0}")]
    #[diagnostic(code(zftp::config))]
    Config(String),
}

impl ZftpError {
    /// Returns `true` when the server reported that nothing matched the
    /// query (reply 550 "No data sets found", "No members found", ...).
    pub fn is_no_data_found(&self) -> bool {
        matches!(self, ZftpError::Transport(reply) if reply.is_no_data_found())
    }

    /// Returns `true` for any 550 reply from the server.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, ZftpError::Transport(reply) if reply.code == 550)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_data_found_detection() {
        let err = ZftpError::Transport(FtpReply::new(550, "No data sets found."));
        assert!(err.is_no_data_found());
        assert!(err.is_unavailable());

        let err = ZftpError::Transport(FtpReply::new(550, "Permission denied"));
        assert!(!err.is_no_data_found());
        assert!(err.is_unavailable());

        assert!(!ZftpError::MissingJobHeader.is_no_data_found());
    }

    #[test]
    fn test_display_messages() {
        let err = ZftpError::Classification {
            header: "garbage".to_string(),
        };
        assert_eq!(err.to_string(), "unrecognized file list header: garbage");

        let err = ZftpError::Transport(FtpReply::new(530, "Not logged in"));
        assert_eq!(err.to_string(), "FTP 530: Not logged in");
    }
}
