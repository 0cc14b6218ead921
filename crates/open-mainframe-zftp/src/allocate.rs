//! Dataset allocation attributes for `SITE`.
//!
//! ```text
//! LRECL=80 RECFM=FB BLKSIZE=3120 DSORG=PO DIRECTORY=20 TRACKS
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// One allocation attribute: `KEY=VALUE`, or a bare `KEY` flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocateParam {
    /// Upper-case attribute name.
    pub key: String,
    /// Value; `None` for a flag such as `TRACKS`.
    pub value: Option<String>,
}

/// Ordered allocation attributes, rendered space-separated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocateParams {
    pub params: Vec<AllocateParam>,
}

impl AllocateParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `KEY=VALUE`.
    pub fn param(mut self, key: &str, value: impl fmt::Display) -> Self {
        self.params.push(AllocateParam {
            key: key.to_ascii_uppercase(),
            value: Some(value.to_string()),
        });
        self
    }

    /// Add a bare `KEY`.
    pub fn flag(mut self, key: &str) -> Self {
        self.params.push(AllocateParam {
            key: key.to_ascii_uppercase(),
            value: None,
        });
        self
    }

    /// Read attributes from their `SITE` text form.
    pub fn parse(text: &str) -> Self {
        text.split_whitespace()
            .fold(Self::new(), |params, token| match token.split_once('=') {
                Some((key, value)) => params.param(key, value),
                None => params.flag(token),
            })
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Value of an attribute, by case-insensitive name.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|p| p.key.eq_ignore_ascii_case(key))
            .and_then(|p| p.value.as_deref())
    }

    /// Returns `true` for `DSORG=PO`, `PDSTYPE=PDS` or `PDSTYPE=PDSE`.
    pub fn is_partitioned(&self) -> bool {
        self.get("DSORG").is_some_and(|v| v.eq_ignore_ascii_case("PO"))
            || self
                .get("PDSTYPE")
                .is_some_and(|v| v.eq_ignore_ascii_case("PDS") || v.eq_ignore_ascii_case("PDSE"))
    }

    /// The attributes without `DSORG=PO`. `MKD` implies the organization.
    pub fn without_dsorg_po(&self) -> Self {
        Self {
            params: self
                .params
                .iter()
                .filter(|p| {
                    !(p.key == "DSORG"
                        && p.value.as_deref().is_some_and(|v| v.eq_ignore_ascii_case("PO")))
                })
                .cloned()
                .collect(),
        }
    }
}

impl fmt::Display for AllocateParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}={}", self.key, value),
            None => f.write_str(&self.key),
        }
    }
}

impl fmt::Display for AllocateParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, param) in self.params.iter().enumerate() {
            if index > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{param}")?;
        }
        Ok(())
    }
}
