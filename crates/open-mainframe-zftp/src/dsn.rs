//! Dataset name quoting.
//!
//! The FTP server treats a quoted name (`'USER.DATA'`) as fully qualified and
//! prefixes an unquoted one with the login's high-level qualifier.

/// Returns `true` if the name is wrapped in single quotes.
pub fn is_fully_qualified(dsn: &str) -> bool {
    dsn.len() >= 2 && dsn.starts_with('\'') && dsn.ends_with('\'')
}

/// Remove the surrounding quotes of a fully qualified name.
pub fn strip_quotes(dsn: &str) -> &str {
    if is_fully_qualified(dsn) {
        &dsn[1..dsn.len() - 1]
    } else {
        dsn
    }
}

/// Quote a dataset name unless it is already quoted or is a USS path.
pub fn ensure_fully_qualified(dsn: &str) -> String {
    if dsn.starts_with('/') || is_fully_qualified(dsn) {
        dsn.to_string()
    } else {
        format!("'{dsn}'")
    }
}

/// Drop a leading and a trailing quote independently of each other.
pub fn remove_quotes(dsn: &str) -> &str {
    let dsn = dsn.strip_prefix('\'').unwrap_or(dsn);
    dsn.strip_suffix('\'').unwrap_or(dsn)
}
