//! Column spans and row decoding for fixed-width report tables.
//!
//! z/OS FTP listings are tables whose header line names each column. The
//! header gives the character range of every column, but data values do not
//! always sit inside that range: numbers are right-aligned and may spill one
//! character past the label, and adjacent values may abut. Two decoding
//! strategies cover the shapes the server produces:
//!
//! - **Boundary correction** ([`SpanTable`]): each column owns the gap to its
//!   left; a value that overruns its label by one character pushes the next
//!   column's start to the right. Used for dataset listings.
//! - **Anchor scan** ([`scan_field`]): starting from the label's range, scan
//!   outwards to the surrounding spaces. Used for load-library listings where
//!   labels are centred over narrower values.
//!
//! All positions are character offsets, not byte offsets.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Column span
// ---------------------------------------------------------------------------

/// The character range `[start, end)` a named column occupies in a line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnSpan {
    /// Column label as it appears in the header.
    pub name: String,
    /// First character of the column.
    pub start: usize,
    /// One past the last character of the column.
    pub end: usize,
}

impl ColumnSpan {
    /// Create a span.
    pub fn new(name: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            name: name.into(),
            start,
            end,
        }
    }
}

// ---------------------------------------------------------------------------
// Header span resolution
// ---------------------------------------------------------------------------

/// Resolve one span per whitespace-separated header token.
///
/// A token's span is `[first index of token, first index + token length)`,
/// shifted by `base`. Header tokens must not be substrings of one another;
/// if they are, the span of the later token points at the earlier one.
pub fn whitespace_spans(header: &str, base: usize) -> Vec<ColumnSpan> {
    header
        .split_whitespace()
        .map(|token| {
            let start = char_index_of(header, token).unwrap_or(0);
            let width = token.chars().count();
            ColumnSpan::new(token, base + start, base + start + width)
        })
        .collect()
}

/// Resolve spans for a header that embeds a literal fixed-width banner.
///
/// The text left of `banner` and the text right of it are resolved
/// independently with [`whitespace_spans`]; the banner itself becomes one
/// span named `banner_name`. A header without the banner resolves as plain
/// whitespace spans.
pub fn anchored_spans(header: &str, banner: &str, banner_name: &str) -> Vec<ColumnSpan> {
    let Some(banner_start) = char_index_of(header, banner) else {
        return whitespace_spans(header, 0);
    };
    let banner_end = banner_start + banner.chars().count();

    let left: String = header.chars().take(banner_start).collect();
    let right: String = header.chars().skip(banner_end).collect();

    let mut spans = whitespace_spans(&left, 0);
    spans.push(ColumnSpan::new(banner_name, banner_start, banner_end));
    spans.extend(whitespace_spans(&right, banner_end));
    spans
}

// ---------------------------------------------------------------------------
// Boundary-correcting decoder
// ---------------------------------------------------------------------------

/// Column layout of a table whose columns own the gap to their left.
///
/// Built from the header with [`SpanTable::from_header`]; every column starts
/// where the previous column's label ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanTable {
    spans: Vec<ColumnSpan>,
}

impl SpanTable {
    /// Build the layout from a header line.
    pub fn from_header(header: &str) -> Self {
        let mut spans = whitespace_spans(header, 0);
        let mut previous_end = 0;
        for span in &mut spans {
            span.start = previous_end;
            previous_end = span.end;
        }
        Self { spans }
    }

    /// Number of columns named by the header.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Returns `true` if the header named no columns.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Column labels in header order.
    pub fn names(&self) -> Vec<String> {
        self.spans.iter().map(|span| span.name.clone()).collect()
    }

    /// The header spans, before any per-row correction.
    pub fn spans(&self) -> &[ColumnSpan] {
        &self.spans
    }

    /// Compute the spans for one data line in a single forward pass.
    ///
    /// When the character at a column's end is not a space but the one after
    /// it is, the value overran its label by one character: the column grows
    /// by one and the next column starts one later. The last column always
    /// runs to the end of the line.
    pub fn corrected(&self, line: &str) -> Vec<ColumnSpan> {
        let chars: Vec<char> = line.chars().collect();
        let last = self.spans.len().saturating_sub(1);
        let mut corrected = Vec::with_capacity(self.spans.len());
        let mut start = 0;

        for (index, span) in self.spans.iter().enumerate() {
            let mut end = span.end;
            if chars.len() > end + 1 && chars[end] != ' ' && chars[end + 1] == ' ' {
                end += 1;
            }
            if index == last {
                end = chars.len();
            }
            corrected.push(ColumnSpan::new(span.name.clone(), start, end));
            start = end;
        }
        corrected
    }

    /// Decode one data line into trimmed field values, one per column.
    pub fn decode(&self, line: &str) -> Vec<String> {
        let chars: Vec<char> = line.chars().collect();
        self.corrected(line)
            .iter()
            .map(|span| char_slice(&chars, span.start, span.end).trim().to_string())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Anchor scan decoder
// ---------------------------------------------------------------------------

/// Decode the value sitting under `span` by scanning outwards to spaces.
///
/// From `span.start` the scan moves left while the character is not a space;
/// from `span.end` it moves right while the character is not a space. The
/// trimmed text between the two bounds is the value, so a label such as
/// `Size` centred over `03DBD8` still yields the whole value.
pub fn scan_field(line: &str, span: &ColumnSpan) -> String {
    let chars: Vec<char> = line.chars().collect();

    let mut start = span.start.min(chars.len());
    while start > 0 && chars.get(start) != Some(&' ') {
        start -= 1;
    }

    let mut end = span.end.min(chars.len());
    while end < chars.len() && chars[end] != ' ' {
        end += 1;
    }

    char_slice(&chars, start, end).trim().to_string()
}

// ---------------------------------------------------------------------------
// Character helpers
// ---------------------------------------------------------------------------

/// Character offset of the first occurrence of `needle` in `haystack`.
pub(crate) fn char_index_of(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .find(needle)
        .map(|byte| haystack[..byte].chars().count())
}

/// The characters in `[start, end)`, clamped to the slice.
pub(crate) fn char_slice(chars: &[char], start: usize, end: usize) -> String {
    let end = end.min(chars.len());
    let start = start.min(end);
    chars[start..end].iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATASET_HEADER: &str = "Volume Unit    Referred Ext Used Recfm Lrecl BlkSz Dsorg Dsname";
    const LOADLIB_HEADER: &str =
        " Name      Size     TTR   Alias-of AC --------- Attributes --------- Amode Rmode ";
    const BANNER: &str = "--------- Attributes ---------";

    #[test]
    fn test_whitespace_spans_use_first_index() {
        let spans = whitespace_spans(" Name      Size", 0);
        assert_eq!(
            spans,
            vec![ColumnSpan::new("Name", 1, 5), ColumnSpan::new("Size", 11, 15)]
        );
    }

    #[test]
    fn test_whitespace_spans_with_base() {
        let spans = whitespace_spans(" Amode Rmode ", 68);
        assert_eq!(spans[0], ColumnSpan::new("Amode", 69, 74));
        assert_eq!(spans[1], ColumnSpan::new("Rmode", 75, 80));
    }

    #[test]
    fn test_anchored_spans_insert_banner() {
        let spans = anchored_spans(LOADLIB_HEADER, BANNER, "ATTRIBUTES");
        let names: Vec<&str> = spans.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Name", "Size", "TTR", "Alias-of", "AC", "ATTRIBUTES", "Amode", "Rmode"]
        );
        assert_eq!(spans[5], ColumnSpan::new("ATTRIBUTES", 38, 68));
        assert_eq!(spans[6], ColumnSpan::new("Amode", 69, 74));
    }

    #[test]
    fn test_anchored_spans_without_banner() {
        let spans = anchored_spans(" Name  Size", BANNER, "ATTRIBUTES");
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[1], ColumnSpan::new("Size", 7, 11));
    }

    #[test]
    fn test_span_table_chains_starts() {
        let table = SpanTable::from_header(DATASET_HEADER);
        assert_eq!(table.len(), 10);
        assert_eq!(table.spans()[0], ColumnSpan::new("Volume", 0, 6));
        assert_eq!(table.spans()[1], ColumnSpan::new("Unit", 6, 11));
        assert_eq!(table.spans()[9].name, "Dsname");
    }

    #[test]
    fn test_correction_splits_abutting_values() {
        let table = SpanTable::from_header(DATASET_HEADER);
        let line = "XRFS95 3390   2017/08/04  313875  FB    1024 27648  PS  'USERHLQI.T2.HISPAXZ'";
        let fields = table.decode(line);
        assert_eq!(
            fields,
            vec![
                "XRFS95",
                "3390",
                "2017/08/04",
                "3",
                "13875",
                "FB",
                "1024",
                "27648",
                "PS",
                "'USERHLQI.T2.HISPAXZ'"
            ]
        );
    }

    #[test]
    fn test_corrected_spans_are_contiguous() {
        let table = SpanTable::from_header(DATASET_HEADER);
        let line = "F1SYS1 3390   2017/02/19  1    1  FBA     80  3120  PS  SYSCMD";
        let spans = table.corrected(line);
        for pair in spans.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        assert_eq!(spans.last().map(|s| s.end), Some(line.chars().count()));
    }

    #[test]
    fn test_decode_short_line_yields_empty_cells() {
        let table = SpanTable::from_header(DATASET_HEADER);
        let fields = table.decode("F1SYS1");
        assert_eq!(fields.len(), 10);
        assert_eq!(fields[0], "F1SYS1");
        assert!(fields[1..].iter().all(|f| f.is_empty()));
    }

    #[test]
    fn test_scan_field_widens_to_whole_value() {
        let line = "DD        03DBD8   031506 IRRENV00 01 FO             RN RU            31    24   ";
        assert_eq!(scan_field(line, &ColumnSpan::new("Name", 1, 5)), "DD");
        assert_eq!(scan_field(line, &ColumnSpan::new("Size", 11, 15)), "03DBD8");
        assert_eq!(
            scan_field(line, &ColumnSpan::new("ATTRIBUTES", 38, 68)),
            "FO             RN RU"
        );
    }

    #[test]
    fn test_scan_field_blank_cell() {
        let line = "DMOCI001  000710   03370C          00 FO                              31    ANY  ";
        assert_eq!(scan_field(line, &ColumnSpan::new("Alias-of", 26, 34)), "");
        assert_eq!(scan_field(line, &ColumnSpan::new("Rmode", 75, 80)), "ANY");
    }

    #[test]
    fn test_scan_field_past_end_of_line() {
        assert_eq!(scan_field("AB", &ColumnSpan::new("X", 10, 12)), "AB");
    }

    #[test]
    fn test_char_helpers() {
        assert_eq!(char_index_of("é Name", "Name"), Some(2));
        let chars: Vec<char> = "abc".chars().collect();
        assert_eq!(char_slice(&chars, 1, 10), "bc");
        assert_eq!(char_slice(&chars, 5, 2), "");
    }
}
