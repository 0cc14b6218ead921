//! Dataset, file and job operations over an FTP session.
//!
//! [`ZosAccessor`] selects the server mode with `SITE`, issues the command
//! and hands the reply to the matching decoder. Job state resolution takes at
//! most two round trips: the job list, then the message log when the job line
//! does not say how the job ended.

use serde::{Deserialize, Serialize};

use crate::allocate::AllocateParams;
use crate::classify::{parse_listing, Listing, TableKind};
use crate::config::ZftpConfig;
use crate::dataset::DatasetEntry;
use crate::dsn::{ensure_fully_qualified, remove_quotes};
use crate::error::ZftpError;
use crate::job::{
    parse_job_list, parse_job_status, resolve_listed_job, Job, JobResolution, JobStatus,
    JobStatusResult, ReturnCode,
};
use crate::loadlib::LoadLibMemberEntry;
use crate::member::DatasetMemberEntry;
use crate::rc::extract_rc;
use crate::spool::{SpoolFileRef, SpoolSelector};
use crate::transport::{FtpTransport, SiteCommand, TransferMode};
use crate::uss::{FileType, UssEntry};
use crate::Result;

/// Remote name used when storing JCL for submission.
const SUBMIT_PLACEHOLDER: &str = "PLACEHOL";

/// Content stored to create a sequential dataset; the server resets the
/// connection on an empty upload.
const ALLOCATE_PLACEHOLDER: &str = " ";

// ---------------------------------------------------------------------------
// Query options
// ---------------------------------------------------------------------------

/// Filters for a job listing. Unset filters fall back to the configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobListOption {
    /// Job name, may contain `*`.
    pub job_name: Option<String>,
    pub job_id: Option<String>,
    /// Job owner, may contain `*`.
    pub owner: Option<String>,
    /// JES status filter such as `ALL` or `OUTPUT`.
    pub status: Option<String>,
}

/// Identifies one job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobIdOption {
    pub job_id: String,
    pub owner: Option<String>,
}

impl JobIdOption {
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            owner: None,
        }
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }
}

/// Identifies one or all spool files of a job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobLogOption {
    pub job_id: String,
    pub owner: Option<String>,
    /// Spool file number; all spool files when unset.
    pub file_id: Option<u32>,
}

impl JobLogOption {
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            ..Self::default()
        }
    }

    pub fn with_file(mut self, file_id: u32) -> Self {
        self.file_id = Some(file_id);
        self
    }

    fn spool_ref(&self) -> SpoolFileRef {
        SpoolFileRef {
            job_id: self.job_id.clone(),
            selector: self.file_id.map_or(SpoolSelector::All, SpoolSelector::File),
        }
    }
}

/// What [`ZosAccessor::delete_file`] removes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileScope {
    /// The named file, or the named directory when it is empty.
    #[default]
    FileOrDirectory,
    /// The directory and everything below it.
    WholeDirectory,
}

// ---------------------------------------------------------------------------
// Accessor
// ---------------------------------------------------------------------------

/// z/OS dataset, USS and JES operations over one FTP session.
#[derive(Debug)]
pub struct ZosAccessor<T> {
    transport: T,
    config: ZftpConfig,
}

impl<T: FtpTransport> ZosAccessor<T> {
    pub fn new(transport: T, config: ZftpConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &ZftpConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    // -- listings --

    /// List datasets, members or USS files matching `name` and decode the
    /// reply by its shape. A "nothing found" reply is an empty listing.
    pub async fn list(&mut self, name: &str) -> Result<Listing> {
        self.transport.site(&SiteCommand::SeqIspfStats).await?;
        let path = ensure_fully_qualified(name);
        let lines = match self.transport.list(&path).await {
            Ok(lines) => lines,
            Err(e) if e.is_no_data_found() => {
                tracing::debug!(path = %path, "No entries found");
                return Ok(Listing::empty(TableKind::Unrecognized));
            }
            Err(e) => return Err(e),
        };
        let listing = parse_listing(&lines, &self.config.parse)?;
        tracing::debug!(path = %path, kind = ?listing.kind(), entries = listing.len(), "Listed");
        Ok(listing)
    }

    /// Datasets whose names match `dsn` (wildcards allowed).
    pub async fn list_datasets(&mut self, dsn: &str) -> Result<Vec<DatasetEntry>> {
        match self.list(dsn).await? {
            Listing::Datasets(entries) => Ok(entries),
            other => unexpected(other, TableKind::DatasetListing),
        }
    }

    /// Members of a partitioned dataset with ISPF statistics.
    pub async fn list_members(&mut self, dsn: &str) -> Result<Vec<DatasetMemberEntry>> {
        let pattern = format!("{}(*)", remove_quotes(dsn));
        match self.list(&pattern).await? {
            Listing::Members(entries) => Ok(entries),
            other => unexpected(other, TableKind::MemberListing),
        }
    }

    /// Members of a load library.
    pub async fn list_loadlib_members(&mut self, dsn: &str) -> Result<Vec<LoadLibMemberEntry>> {
        let pattern = format!("{}(*)", remove_quotes(dsn));
        match self.list(&pattern).await? {
            Listing::LoadLibMembers(entries) => Ok(entries),
            other => unexpected(other, TableKind::LoadLibListing),
        }
    }

    /// USS files in a directory, or the single file or link named by `path`.
    pub async fn list_files(&mut self, path: &str) -> Result<Vec<UssEntry>> {
        match self.list(path).await? {
            Listing::Files(entries) => Ok(entries),
            other => unexpected(other, TableKind::UssListing),
        }
    }

    // -- datasets and files --

    /// Allocate a dataset. Partitioned attributes (`DSORG=PO`,
    /// `PDSTYPE=PDS`, `PDSTYPE=PDSE`) create it with `MKD`; any other
    /// dataset is created by storing a single blank.
    pub async fn allocate_dataset(&mut self, dsn: &str, params: &AllocateParams) -> Result<()> {
        let dataset = ensure_fully_qualified(dsn);
        if params.is_partitioned() {
            self.transport
                .site(&SiteCommand::Allocate(params.without_dsorg_po()))
                .await?;
            self.transport.mkdir(&dataset).await?;
        } else {
            self.transport.set_mode(TransferMode::Ascii).await?;
            self.transport
                .site(&SiteCommand::SeqAllocate(params.clone()))
                .await?;
            self.transport
                .store_text(ALLOCATE_PLACEHOLDER, &dataset)
                .await?;
        }
        tracing::info!(dataset = %dataset, params = %params, "Allocated dataset");
        Ok(())
    }

    /// Delete a dataset or a member. Wildcards are not supported.
    pub async fn delete_dataset(&mut self, dsn: &str) -> Result<()> {
        let dataset = ensure_fully_qualified(dsn);
        self.transport.site(&SiteCommand::Seq).await?;
        self.transport.delete(&dataset).await?;
        tracing::info!(dataset = %dataset, "Deleted dataset");
        Ok(())
    }

    /// Delete a USS file or directory. With [`FileScope::WholeDirectory`]
    /// the contents go first, depth first.
    pub async fn delete_file(&mut self, path: &str, scope: FileScope) -> Result<()> {
        self.transport.site(&SiteCommand::Seq).await?;
        if scope == FileScope::FileOrDirectory {
            self.transport.delete(path).await?;
            tracing::info!(path, "Deleted file");
            return Ok(());
        }

        // (directory, contents already removed)
        let mut pending = vec![(path.to_string(), false)];
        while let Some((dir, emptied)) = pending.pop() {
            if emptied {
                self.transport.delete(&dir).await?;
                tracing::debug!(path = %dir, "Deleted directory");
                continue;
            }
            let entries = self.list_files(&dir).await?;
            pending.push((dir.clone(), true));
            for entry in entries {
                let child = format!("{}/{}", dir.trim_end_matches('/'), entry.name);
                if entry.file_type == FileType::Directory {
                    pending.push((child, false));
                } else {
                    self.transport.delete(&child).await?;
                    tracing::debug!(path = %child, "Deleted file");
                }
            }
        }
        tracing::info!(path, "Deleted directory tree");
        Ok(())
    }

    /// Rename a dataset or a member of a partitioned dataset.
    pub async fn rename_dataset(&mut self, dsn: &str, new_dsn: &str) -> Result<()> {
        self.rename(dsn, new_dsn).await
    }

    /// Rename a USS file or directory.
    pub async fn rename_file(&mut self, path: &str, new_path: &str) -> Result<()> {
        self.rename(path, new_path).await
    }

    async fn rename(&mut self, name: &str, new_name: &str) -> Result<()> {
        let from = ensure_fully_qualified(name);
        let to = ensure_fully_qualified(new_name);
        self.transport.site(&SiteCommand::Seq).await?;
        self.transport.rename(&from, &to).await?;
        tracing::info!(from = %from, to = %to, "Renamed");
        Ok(())
    }

    /// Create a USS directory.
    pub async fn make_directory(&mut self, path: &str) -> Result<()> {
        self.transport.mkdir(path).await?;
        tracing::info!(path, "Created directory");
        Ok(())
    }

    // -- server --

    /// Send space separated `SITE` directives; returns the server's reply
    /// text.
    pub async fn site(&mut self, directives: &str) -> Result<String> {
        let reply = self
            .transport
            .site(&SiteCommand::Raw(directives.to_string()))
            .await?;
        Ok(reply.message)
    }

    /// Query server status with `STAT`, or one status item with
    /// `STAT (option`.
    pub async fn stat(&mut self, option: Option<&str>) -> Result<String> {
        let command = match option {
            Some(option) => format!("STAT ({option}"),
            None => "STAT".to_string(),
        };
        let reply = self.transport.send(&command).await?;
        Ok(reply.message)
    }

    // -- jobs --

    /// Jobs matching the filters. Any 550 reply means no job matched.
    pub async fn list_jobs(&mut self, option: &JobListOption) -> Result<Vec<Job>> {
        let site = SiteCommand::JesFilter {
            job_name: option.job_name.clone().unwrap_or_else(|| "*".to_string()),
            owner: self.owner_or_default(option.owner.as_deref()),
            status: option
                .status
                .clone()
                .unwrap_or_else(|| self.config.jobs.default_status.clone()),
        };
        self.transport.set_mode(TransferMode::Ascii).await?;
        self.transport.site(&site).await?;

        let path = option.job_id.as_deref().unwrap_or("*");
        match self.transport.list(path).await {
            Ok(lines) => Ok(parse_job_list(&lines)),
            Err(e) if e.is_unavailable() => {
                tracing::debug!(site = %site, "No jobs found");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Detailed status of one job, including its spool files.
    ///
    /// When a finished job's line carries no return code, the code is read
    /// from the job message log.
    pub async fn get_job_status(&mut self, option: &JobIdOption) -> Result<JobStatus> {
        require_job_id(&option.job_id)?;
        let owner = self.owner_or_default(option.owner.as_deref());

        self.transport.set_mode(TransferMode::Ascii).await?;
        self.transport
            .site(&SiteCommand::JesSpool {
                owner: owner.clone(),
            })
            .await?;
        let lines = self.transport.list(&option.job_id).await?;
        let mut status = parse_job_status(&lines, &self.config.parse)?;

        let message_log = self.config.jobs.message_log_dd.clone();
        if let Some(file_id) = status.message_log_id(&message_log) {
            let log_option = JobLogOption {
                job_id: option.job_id.clone(),
                owner: Some(owner),
                file_id: Some(file_id),
            };
            match self.rc_from_message_log(&log_option).await? {
                Some(rc) => status.set_rc(rc),
                None => tracing::warn!(
                    job_id = %option.job_id,
                    dd_name = %message_log,
                    "No return code in job message log"
                ),
            }
        }

        tracing::debug!(job_id = %status.job.job_id, status = %status.job.status, retcode = ?status.retcode, "Job status");
        Ok(status)
    }

    /// Summary state of one job.
    pub async fn query_job(&mut self, option: &JobIdOption) -> Result<JobStatusResult> {
        require_job_id(&option.job_id)?;
        let list_option = JobListOption {
            job_id: Some(option.job_id.clone()),
            owner: option.owner.clone(),
            ..JobListOption::default()
        };
        let jobs = self.list_jobs(&list_option).await?;

        let result = match resolve_listed_job(&jobs, &option.job_id) {
            JobResolution::Settled(result) => result,
            JobResolution::NeedsReturnCode => {
                let status = self.get_job_status(option).await?;
                if status.rc.is_none() {
                    tracing::warn!(job_id = %option.job_id, "Job return code unknown, treating as failed");
                }
                JobStatusResult::from_return_code(status.rc.as_ref())
            }
        };
        tracing::debug!(job_id = %option.job_id, ?result, "Queried job");
        Ok(result)
    }

    /// Text of one spool file, or of all of them joined by
    /// [`crate::spool::SPOOL_FILE_SEPARATOR`].
    pub async fn get_job_log(&mut self, option: &JobLogOption) -> Result<String> {
        require_job_id(&option.job_id)?;
        let owner = self.owner_or_default(option.owner.as_deref());
        self.transport.set_mode(TransferMode::Ascii).await?;
        self.transport.site(&SiteCommand::JesSpool { owner }).await?;
        let spool_ref = option.spool_ref();
        self.transport.retrieve_text(&spool_ref.to_string()).await
    }

    /// Return code found in a spool file holding the job message log.
    pub async fn rc_from_message_log(&mut self, option: &JobLogOption) -> Result<Option<ReturnCode>> {
        let log = self.get_job_log(option).await?;
        Ok(extract_rc(&log))
    }

    /// Submit JCL and return the ID JES assigned to the job.
    pub async fn submit_jcl(&mut self, jcl: &str) -> Result<String> {
        let text = crlf_line_ends(jcl);
        self.transport.set_mode(TransferMode::Ascii).await?;
        self.transport.site(&SiteCommand::Jes).await?;
        let reply = self.transport.store_text(&text, SUBMIT_PLACEHOLDER).await?;
        let job_id = submitted_job_id(&reply.message)
            .ok_or_else(|| ZftpError::SubmitFailed(reply.message.clone()))?;
        tracing::info!(job_id = %job_id, "Submitted JCL");
        Ok(job_id)
    }

    /// Purge a job and its output.
    pub async fn delete_job(&mut self, option: &JobIdOption) -> Result<()> {
        require_job_id(&option.job_id)?;
        self.transport.site(&SiteCommand::JesAnyJob).await?;
        self.transport.delete(&option.job_id).await?;
        tracing::info!(job_id = %option.job_id, "Deleted job");
        Ok(())
    }

    fn owner_or_default(&self, owner: Option<&str>) -> String {
        match owner {
            Some(owner) if !owner.is_empty() => owner.to_string(),
            _ => self.config.default_owner(),
        }
    }
}

fn unexpected<E>(listing: Listing, expected: TableKind) -> Result<Vec<E>> {
    if listing.is_empty() {
        Ok(Vec::new())
    } else {
        Err(ZftpError::UnexpectedListing {
            expected,
            found: listing.kind(),
        })
    }
}

fn require_job_id(job_id: &str) -> Result<()> {
    if job_id.trim().is_empty() {
        Err(ZftpError::JobIdRequired)
    } else {
        Ok(())
    }
}

/// Normalize line ends to CRLF, which the server expects for ASCII uploads.
fn crlf_line_ends(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\n', "\r\n")
}

/// Job ID from the submission reply `... It is known to JES as JOB12345`.
fn submitted_job_id(reply: &str) -> Option<String> {
    const MARKER: &str = "jes as ";
    let index = reply.to_ascii_lowercase().find(MARKER)?;
    let rest = &reply[index + MARKER.len()..];
    let end = rest
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(rest.len());
    let job_id = &rest[..end];
    let followed_by_space = rest[end..].chars().next().map_or(true, char::is_whitespace);
    (!job_id.is_empty() && followed_by_space).then(|| job_id.to_string())
}
