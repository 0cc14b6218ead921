//! JES job lines, job status and job state resolution.
//!
//! ```text
//! JOBNAME  JOBID    OWNER    STATUS CLASS
//! HRECALLW JOB02094 VPADEV   OUTPUT A        RC=0000
//! --------
//!          ID  STEPNAME PROCSTEP C DDNAME   BYTE-COUNT
//!          001 JES2        N/A   H JESMSGLG      1582
//! 1 spool files
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entry::ParseOptions;
use crate::error::ZftpError;
use crate::spool::{parse_spool_table, SpoolFile};
use crate::Result;

/// Line that ends the job list part of a JES reply.
pub const JOB_LIST_SEPARATOR: &str = "--------";

// ---------------------------------------------------------------------------
// Jobs
// ---------------------------------------------------------------------------

/// One job summary line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub job_name: String,
    pub job_id: String,
    pub owner: String,
    /// JES status: `INPUT`, `HELD`, `ACTIVE` or `OUTPUT`.
    pub status: String,
    pub class: Option<String>,
    /// Everything after the class, e.g. `RC=0000 6 spool files`.
    pub extra: Option<String>,
}

impl Job {
    /// JES phase of the job.
    pub fn phase(&self) -> JobPhase {
        JobPhase::from_status(&self.status)
    }
}

/// Phase of a job in JES.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobPhase {
    Input,
    Held,
    Active,
    Output,
    Other,
}

impl JobPhase {
    pub fn from_status(status: &str) -> Self {
        match status {
            "INPUT" => JobPhase::Input,
            "HELD" => JobPhase::Held,
            "ACTIVE" => JobPhase::Active,
            "OUTPUT" => JobPhase::Output,
            _ => JobPhase::Other,
        }
    }
}

/// Decode a job summary line. Lines with fewer than four tokens are not
/// job lines.
pub fn parse_job_line(line: &str) -> Option<Job> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 4 {
        return None;
    }
    Some(Job {
        job_name: fields[0].to_string(),
        job_id: fields[1].to_string(),
        owner: fields[2].to_string(),
        status: fields[3].to_string(),
        class: fields.get(4).map(|c| c.to_string()),
        extra: (fields.len() > 5).then(|| fields[5..].join(" ")),
    })
}

/// Decode a job list reply, header line first. Decoding stops at the
/// `--------` line that introduces step or spool details.
pub fn parse_job_list<S: AsRef<str>>(lines: &[S]) -> Vec<Job> {
    let mut jobs = Vec::new();
    for line in lines.iter().skip(1).map(AsRef::<str>::as_ref) {
        if line.starts_with(JOB_LIST_SEPARATOR) {
            break;
        }
        match parse_job_line(line) {
            Some(job) => jobs.push(job),
            None => tracing::debug!(line, "Skipping short job list line"),
        }
    }
    jobs
}

// ---------------------------------------------------------------------------
// Return codes
// ---------------------------------------------------------------------------

/// A job return code: a number, or a symbolic failure such as
/// `ABEND S0C4`, `JCL ERROR` or `SEC ERROR`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReturnCode {
    Numeric(i32),
    Symbolic(String),
}

impl ReturnCode {
    /// Returns `true` only for a numeric zero.
    pub fn is_zero(&self) -> bool {
        matches!(self, ReturnCode::Numeric(0))
    }

    /// Display form used in job status: `RC 0008`, or the symbolic text.
    pub fn retcode(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ReturnCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReturnCode::Numeric(rc) => write!(f, "RC {rc:04}"),
            ReturnCode::Symbolic(text) => f.write_str(text),
        }
    }
}

/// The last `RC=value` pair in a job line's extra text.
pub fn rc_from_extra(extra: &str) -> Option<ReturnCode> {
    extra
        .split_whitespace()
        .filter_map(|entry| {
            let (key, value) = entry.split_once('=')?;
            if value.contains('=') || !key.eq_ignore_ascii_case("RC") {
                return None;
            }
            Some(match value.parse() {
                Ok(rc) => ReturnCode::Numeric(rc),
                Err(_) => ReturnCode::Symbolic(value.to_string()),
            })
        })
        .last()
}

fn abend_from_extra(extra: &str) -> Option<ReturnCode> {
    extra.split_whitespace().find_map(|entry| {
        let code = entry.strip_prefix("ABEND=")?;
        Some(ReturnCode::Symbolic(format!("ABEND {code}")))
    })
}

/// How a finished job ended, as far as its line's extra text tells.
///
/// A JCL error beats an abend, and an abend beats an `RC=` pair.
pub fn return_code_from_extra(extra: &str) -> Option<ReturnCode> {
    if extra.contains("error") {
        Some(ReturnCode::Symbolic("JCL ERROR".to_string()))
    } else {
        abend_from_extra(extra).or_else(|| rc_from_extra(extra))
    }
}

// ---------------------------------------------------------------------------
// Job status
// ---------------------------------------------------------------------------

/// Detailed status of one job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatus {
    #[serde(flatten)]
    pub job: Job,
    /// Return code, when known.
    pub rc: Option<ReturnCode>,
    /// Display form of `rc`.
    pub retcode: Option<String>,
    /// Spool files, present once the job has produced output.
    pub spool_files: Vec<SpoolFile>,
}

impl JobStatus {
    pub fn set_rc(&mut self, rc: ReturnCode) {
        self.retcode = Some(rc.retcode());
        self.rc = Some(rc);
    }

    /// The spool file to read the return code from: only for a finished job
    /// whose summary line carried no return code.
    pub fn message_log_id(&self, dd_name: &str) -> Option<u32> {
        if self.rc.is_some() || self.job.phase() != JobPhase::Output {
            return None;
        }
        self.spool_files
            .iter()
            .find(|file| file.dd_name.as_deref() == Some(dd_name))
            .map(|file| file.id)
    }
}

fn is_job_header(line: &str) -> bool {
    let line = line.trim_start();
    line.get(..7)
        .is_some_and(|label| label.eq_ignore_ascii_case("JOBNAME"))
        && line[7..].starts_with(char::is_whitespace)
}

fn is_spool_header(line: &str) -> bool {
    if !line.starts_with(char::is_whitespace) {
        return false;
    }
    let line = line.trim_start();
    line.get(..2).is_some_and(|label| label.eq_ignore_ascii_case("ID"))
        && line[2..].starts_with(char::is_whitespace)
}

/// Decode the reply to a job status `LIST`.
///
/// The job line follows the `JOBNAME` header; the spool table, when present,
/// starts at the indented `ID` header. A JCL error or an abend in the job
/// line takes precedence over an `RC=` pair.
pub fn parse_job_status<S: AsRef<str>>(lines: &[S], options: &ParseOptions) -> Result<JobStatus> {
    let header = lines
        .iter()
        .position(|line| is_job_header(line.as_ref()))
        .ok_or(ZftpError::MissingJobHeader)?;
    let line = lines
        .get(header + 1)
        .map(|line| line.as_ref().trim())
        .unwrap_or_default();
    let job = parse_job_line(line).ok_or_else(|| ZftpError::MalformedJobLine {
        line: line.to_string(),
    })?;

    let mut status = JobStatus {
        job,
        ..JobStatus::default()
    };

    if let Some(spool) = lines.iter().position(|line| is_spool_header(line.as_ref())) {
        status.spool_files = parse_spool_table(&lines[spool..], options);
    }

    if let Some(rc) = status.job.extra.as_deref().and_then(return_code_from_extra) {
        status.set_rc(rc);
    }

    Ok(status)
}

// ---------------------------------------------------------------------------
// Job state resolution
// ---------------------------------------------------------------------------

/// Summary state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobStatusResult {
    Success,
    Active,
    Fail,
    Waiting,
    NotFound,
}

impl JobStatusResult {
    /// `Active` and `Waiting` change over time; the others do not.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobStatusResult::Success | JobStatusResult::Fail | JobStatusResult::NotFound
        )
    }

    /// Final state from a recovered return code. An unknown code is a failure.
    pub fn from_return_code(rc: Option<&ReturnCode>) -> Self {
        match rc {
            Some(rc) if rc.is_zero() => JobStatusResult::Success,
            _ => JobStatusResult::Fail,
        }
    }
}

/// Outcome of resolving a listed job without further queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobResolution {
    Settled(JobStatusResult),
    /// The job has output but its line does not say how it ended; the
    /// message log has to be read.
    NeedsReturnCode,
}

/// Find a job by ID, ignoring case.
pub fn find_job<'a>(jobs: &'a [Job], job_id: &str) -> Option<&'a Job> {
    jobs.iter()
        .find(|job| !job.job_id.is_empty() && job.job_id.eq_ignore_ascii_case(job_id))
}

/// Resolve the state of a listed job from its summary line.
pub fn resolve_job(job: &Job) -> JobResolution {
    let extra = job.extra.as_deref().unwrap_or_default();
    let result = match job.phase() {
        JobPhase::Input => JobStatusResult::Waiting,
        JobPhase::Active => JobStatusResult::Active,
        JobPhase::Held | JobPhase::Other => JobStatusResult::Fail,
        JobPhase::Output => match return_code_from_extra(extra) {
            Some(rc) => JobStatusResult::from_return_code(Some(&rc)),
            None => return JobResolution::NeedsReturnCode,
        },
    };
    JobResolution::Settled(result)
}

/// Resolve a job ID against a job list.
pub fn resolve_listed_job(jobs: &[Job], job_id: &str) -> JobResolution {
    match find_job(jobs, job_id) {
        Some(job) => resolve_job(job),
        None => JobResolution::Settled(JobStatusResult::NotFound),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_job_list() -> Vec<&'static str> {
        vec![
            "JOBNAME  JOBID    OWNER    STATUS CLASS",
            "HISCONVT JOB17459 MIAOCX   OUTPUT A        RC=0000 6 spool files",
            "HISCONVT JOB17462 MIAOCX   ACTIVE A",
            "EZA2284I JOB00083 USER1    OUTPUT A ABEND=806 3 spool files",
            "EZA2284I JOB00082 USER1    OUTPUT A (JCL error) 3 spool files",
            "EZA2284I JOB00093 USER1    INPUT  A -HELD-",
            "HISCONVT JOB17463 MIAOCX   held",
        ]
    }

    #[test]
    fn test_job_line_fields() {
        let job = parse_job_line("HISCONVT JOB17459 MIAOCX   OUTPUT A        RC=0000 6 spool files")
            .unwrap();
        assert_eq!(job.job_name, "HISCONVT");
        assert_eq!(job.job_id, "JOB17459");
        assert_eq!(job.owner, "MIAOCX");
        assert_eq!(job.status, "OUTPUT");
        assert_eq!(job.class.as_deref(), Some("A"));
        assert_eq!(job.extra.as_deref(), Some("RC=0000 6 spool files"));

        let job = parse_job_line("HISCONVT JOB17463 MIAOCX   held").unwrap();
        assert_eq!(job.class, None);
        assert_eq!(job.extra, None);

        assert_eq!(parse_job_line("JOB17463 MIAOCX"), None);
    }

    #[test]
    fn test_job_list_stops_at_separator() {
        let lines = [
            "JOBNAME  JOBID    OWNER    STATUS CLASS",
            "HRECALLW JOB31062 LIANGQI  ACTIVE U",
            "--------",
            "         STEPNAME HRECALL  PROCNAME        N/A",
            "         CPUTIME     0.010 ELAPSED TIME     40.934",
        ];
        let jobs = parse_job_list(&lines);
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].job_id, "JOB31062");
    }

    #[test]
    fn test_resolve_job_states() {
        let jobs = parse_job_list(&raw_job_list());
        assert_eq!(jobs.len(), 6);
        let settled = |id: &str| resolve_listed_job(&jobs, id);

        assert_eq!(settled("JOB17459"), JobResolution::Settled(JobStatusResult::Success));
        assert_eq!(settled("JOB17462"), JobResolution::Settled(JobStatusResult::Active));
        assert_eq!(settled("JOB00083"), JobResolution::Settled(JobStatusResult::Fail));
        assert_eq!(settled("JOB00082"), JobResolution::Settled(JobStatusResult::Fail));
        assert_eq!(settled("JOB00093"), JobResolution::Settled(JobStatusResult::Waiting));
        assert_eq!(settled("JOB17463"), JobResolution::Settled(JobStatusResult::Fail));
        assert_eq!(settled("job17459"), JobResolution::Settled(JobStatusResult::Success));
        assert_eq!(settled("JOB99999"), JobResolution::Settled(JobStatusResult::NotFound));
    }

    #[test]
    fn test_abend_line_fails() {
        let job = parse_job_line("EZA2284I JOB00083 USER1 OUTPUT A ABEND=806 3 spool files").unwrap();
        assert_eq!(resolve_job(&job), JobResolution::Settled(JobStatusResult::Fail));
    }

    #[test]
    fn test_nonzero_rc_fails_and_bare_output_needs_log() {
        let job = parse_job_line("JOB1 JOB00001 USER1 OUTPUT A RC=0008 3 spool files").unwrap();
        assert_eq!(resolve_job(&job), JobResolution::Settled(JobStatusResult::Fail));

        let job = parse_job_line("JOB1 JOB00001 USER1 OUTPUT A 3 spool files").unwrap();
        assert_eq!(resolve_job(&job), JobResolution::NeedsReturnCode);
    }

    #[test]
    fn test_status_and_resolution_agree_on_precedence() {
        let line = "HELLO    JOB00257 USER     OUTPUT A        RC=0000 (JCL error) ";
        let job = parse_job_line(line).unwrap();
        assert_eq!(resolve_job(&job), JobResolution::Settled(JobStatusResult::Fail));

        let lines = ["JOBNAME  JOBID    OWNER    STATUS CLASS", line];
        let status = parse_job_status(&lines, &ParseOptions::default()).unwrap();
        assert_eq!(status.rc, Some(ReturnCode::Symbolic("JCL ERROR".to_string())));

        let job = parse_job_line("HELLO JOB00258 USER OUTPUT A RC=0000 ABEND=S0C4").unwrap();
        assert_eq!(resolve_job(&job), JobResolution::Settled(JobStatusResult::Fail));
        assert_eq!(
            return_code_from_extra(job.extra.as_deref().unwrap()),
            Some(ReturnCode::Symbolic("ABEND S0C4".to_string()))
        );
    }

    #[test]
    fn test_terminal_states() {
        assert!(JobStatusResult::Success.is_terminal());
        assert!(JobStatusResult::Fail.is_terminal());
        assert!(JobStatusResult::NotFound.is_terminal());
        assert!(!JobStatusResult::Active.is_terminal());
        assert!(!JobStatusResult::Waiting.is_terminal());
        assert_eq!(JobStatusResult::from_return_code(None), JobStatusResult::Fail);
        assert_eq!(
            JobStatusResult::from_return_code(Some(&ReturnCode::Symbolic("0".to_string()))),
            JobStatusResult::Fail
        );
    }

    #[test]
    fn test_retcode_rendering() {
        assert_eq!(ReturnCode::Numeric(0).retcode(), "RC 0000");
        assert_eq!(ReturnCode::Numeric(8).retcode(), "RC 0008");
        assert_eq!(ReturnCode::Symbolic("ABEND 622".to_string()).retcode(), "ABEND 622");
    }

    #[test]
    fn test_return_code_serializes_untagged() {
        assert_eq!(serde_json::to_string(&ReturnCode::Numeric(4)).unwrap(), "4");
        assert_eq!(
            serde_json::to_string(&ReturnCode::Symbolic("JCL ERROR".to_string())).unwrap(),
            "\"JCL ERROR\""
        );
        let rc: ReturnCode = serde_json::from_str("12").unwrap();
        assert_eq!(rc, ReturnCode::Numeric(12));
    }

    #[test]
    fn test_status_with_rc() {
        let lines = [
            "JOBNAME  JOBID    OWNER    STATUS CLASS",
            "HRECALLW JOB02094 VPADEV   OUTPUT A        RC=0000",
            "--------",
            "         ID  STEPNAME PROCSTEP C DDNAME   BYTE-COUNT",
            "         001 JES2        N/A   H JESMSGLG      1582",
            "         002 JES2        N/A   H JESJCL         324",
            "         003 JES2        N/A   H JESYSMSG       978",
            "3 spool files",
        ];
        let status = parse_job_status(&lines, &ParseOptions::default()).unwrap();
        assert_eq!(status.job.job_id, "JOB02094");
        assert_eq!(status.rc, Some(ReturnCode::Numeric(0)));
        assert_eq!(status.retcode.as_deref(), Some("RC 0000"));
        assert_eq!(status.spool_files.len(), 3);
        assert_eq!(status.spool_files[2].dd_name.as_deref(), Some("JESYSMSG"));
        assert_eq!(status.message_log_id("JESMSGLG"), None);
    }

    #[test]
    fn test_status_of_abend_and_jcl_error() {
        let lines = [
            "JOBNAME  JOBID    OWNER    STATUS CLASS",
            "HELLO    TSU18242 USER     OUTPUT TSU      ABEND=622 ",
            "--------",
            "         ID  STEPNAME PROCSTEP C DDNAME   BYTE-COUNT  ",
            "         001 PROC01   PROC01   B SYS00010       192 ",
            "1 spool files ",
        ];
        let status = parse_job_status(&lines, &ParseOptions::default()).unwrap();
        assert_eq!(status.rc, Some(ReturnCode::Symbolic("ABEND 622".to_string())));
        assert_eq!(status.retcode.as_deref(), Some("ABEND 622"));
        assert_eq!(status.spool_files.len(), 1);

        let lines = [
            "JOBNAME  JOBID    OWNER    STATUS CLASS",
            "HELLO    JOB00256 USER     OUTPUT A        (JCL error) ",
        ];
        let status = parse_job_status(&lines, &ParseOptions::default()).unwrap();
        assert_eq!(status.rc, Some(ReturnCode::Symbolic("JCL ERROR".to_string())));
        assert_eq!(status.retcode.as_deref(), Some("JCL ERROR"));
        assert!(status.spool_files.is_empty());
    }

    #[test]
    fn test_status_without_rc_points_at_message_log() {
        let lines = [
            "JOBNAME  JOBID    OWNER    STATUS CLASS",
            "TESTJOB1 JOB07186 USER001  OUTPUT A",
            "--------",
            "         ID  STEPNAME PROCSTEP C DDNAME   BYTE-COUNT",
            "         001 JES2              K JESMSGLG      1206",
            "1 spool files",
        ];
        let status = parse_job_status(&lines, &ParseOptions::default()).unwrap();
        assert_eq!(status.rc, None);
        assert_eq!(status.message_log_id("JESMSGLG"), Some(1));
    }

    #[test]
    fn test_status_errors() {
        let err = parse_job_status(&["no header here"], &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, ZftpError::MissingJobHeader));

        let lines = ["JOBNAME  JOBID    OWNER    STATUS CLASS", "--------"];
        let err = parse_job_status(&lines, &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, ZftpError::MalformedJobLine { ref line } if line == "--------"));

        let lines = ["JOBNAME  JOBID    OWNER    STATUS CLASS"];
        let err = parse_job_status(&lines, &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, ZftpError::MalformedJobLine { .. }));
    }

    #[test]
    fn test_header_detection() {
        assert!(is_job_header("  jobname  JOBID"));
        assert!(!is_job_header("JOBNAMES JOBID"));
        assert!(is_spool_header("         ID  STEPNAME"));
        assert!(!is_spool_header("ID  STEPNAME"));
    }
}
