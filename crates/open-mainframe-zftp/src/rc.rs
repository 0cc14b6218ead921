//! Return code recovery from the job message log (JESMSGLG).

use crate::job::ReturnCode;

const ENDED_RC: &str = "ENDED - RC=";
const ENDED_ABEND: &str = "ENDED - ABEND=";
const NOT_AUTHORIZED: &str = "NOT AUTHORIZED";

/// Find the job's return code in its message log.
///
/// Every line is checked for `ENDED - RC=`, `ENDED - ABEND=` and
/// `NOT AUTHORIZED`, in that order; the last matching line decides. `None`
/// means the log does not say, which is not the same as success.
pub fn extract_rc(log: &str) -> Option<ReturnCode> {
    log.lines().filter_map(line_rc).last()
}

fn line_rc(line: &str) -> Option<ReturnCode> {
    if let Some(index) = line.find(ENDED_RC) {
        let tail = line[index + ENDED_RC.len()..].trim();
        Some(numeric_rc(tail))
    } else if let Some(index) = line.find(ENDED_ABEND) {
        let tail = line[index + ENDED_ABEND.len()..].trim();
        Some(ReturnCode::Symbolic(format!("ABEND {tail}")))
    } else if line.contains(NOT_AUTHORIZED) {
        Some(ReturnCode::Symbolic("SEC ERROR".to_string()))
    } else {
        None
    }
}

/// Leading decimal digits of `text`; anything without them stays symbolic.
fn numeric_rc(text: &str) -> ReturnCode {
    let digits: String = text.chars().take_while(char::is_ascii_digit).collect();
    match digits.parse() {
        Ok(rc) => ReturnCode::Numeric(rc),
        Err(_) => ReturnCode::Symbolic(text.to_string()),
    }
}
