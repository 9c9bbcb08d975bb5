//! Record parsing for `id,address` input lines and rendering of output rows.

use crate::types::Coordinates;

/// Header line written at the top of every output file.
pub const OUTPUT_HEADER: &str = "id,address,lat,lng";

/// One `id,address` record read from the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputRecord {
    /// Row identifier, everything before the first comma
    pub row_id: String,
    /// Address text with outer quotes and doubled-quote escapes removed
    pub address: String,
}

impl InputRecord {
    /// Whether the record carries no address to geocode.
    pub fn has_address(&self) -> bool {
        !self.address.is_empty()
    }
}

/// Parse one raw input line.
///
/// Returns `None` for blank lines and for a header line (one whose
/// lowercase form starts with `id,`). Never fails: a line without a comma
/// becomes a record with an empty address.
///
/// # Example
///
/// ```rust
/// use geotrim::parser::parse_line;
///
/// let record = parse_line(r#"7,"Moscow, ""Red"" Square""#).unwrap();
/// assert_eq!(record.row_id, "7");
/// assert_eq!(record.address, r#"Moscow, "Red" Square"#);
///
/// assert!(parse_line("id,address").is_none());
/// ```
pub fn parse_line(line: &str) -> Option<InputRecord> {
    let line = line.trim();
    if line.is_empty() || line.to_lowercase().starts_with("id,") {
        return None;
    }

    let Some((row_id, rest)) = line.split_once(',') else {
        return Some(InputRecord {
            row_id: line.to_string(),
            address: String::new(),
        });
    };

    let mut address = rest.trim();
    if address.len() >= 2 && address.starts_with('"') && address.ends_with('"') {
        address = &address[1..address.len() - 1];
    }

    Some(InputRecord {
        row_id: row_id.trim().to_string(),
        address: address.replace("\"\"", "\""),
    })
}

/// One row of the output file.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRecord {
    /// Row identifier copied from the input
    pub row_id: String,
    /// Original, untrimmed address text
    pub address: String,
    /// Resolved location, absent when unresolved
    pub coordinates: Option<Coordinates>,
}

impl OutputRecord {
    /// Build the output row for an input record.
    pub fn new(record: &InputRecord, coordinates: Option<Coordinates>) -> Self {
        Self {
            row_id: record.row_id.clone(),
            address: record.address.clone(),
            coordinates,
        }
    }

    /// Render as `id,"address",lat,lng` without a line terminator.
    pub fn to_line(&self) -> String {
        let address = self.address.replace('"', "\"\"");
        match self.coordinates {
            Some(Coordinates { lat, lng }) => {
                format!("{},\"{}\",{},{}", self.row_id, address, lat, lng)
            }
            None => format!("{},\"{}\",,", self.row_id, address),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(row_id: &str, address: &str) -> InputRecord {
        InputRecord {
            row_id: row_id.to_string(),
            address: address.to_string(),
        }
    }

    #[test]
    fn test_skips_blank_and_header_lines() {
        assert_eq!(parse_line(""), None);
        assert_eq!(parse_line("   \r\n"), None);
        assert_eq!(parse_line("id,address"), None);
        assert_eq!(parse_line("ID,Address,extra"), None);
    }

    #[test]
    fn test_splits_on_first_comma_only() {
        assert_eq!(
            parse_line(r#"1,"Moscow, Central District, Main St 1""#),
            Some(record("1", "Moscow, Central District, Main St 1"))
        );
        assert_eq!(
            parse_line("2,Moscow, Tverskaya 1\n"),
            Some(record("2", "Moscow, Tverskaya 1"))
        );
    }

    #[test]
    fn test_line_without_comma() {
        assert_eq!(parse_line("42"), Some(record("42", "")));
    }

    #[test]
    fn test_empty_and_quoted_empty_address() {
        assert_eq!(parse_line("3,"), Some(record("3", "")));
        assert_eq!(parse_line(r#"3,"""#), Some(record("3", "")));
    }

    #[test]
    fn test_doubled_quotes_collapse() {
        assert_eq!(
            parse_line(r#"8,"Office ""North"", Floor 2""#),
            Some(record("8", r#"Office "North", Floor 2"#))
        );
    }

    #[test]
    fn test_lone_quote_is_kept() {
        assert_eq!(parse_line(r#"9,""#), Some(record("9", "\"")));
    }

    #[test]
    fn test_output_line_resolved() {
        let out = OutputRecord::new(
            &record("1", "Moscow, Central District, Main St 1"),
            Some(Coordinates::new(55.75, 37.61)),
        );
        assert_eq!(
            out.to_line(),
            r#"1,"Moscow, Central District, Main St 1",55.75,37.61"#
        );
    }

    #[test]
    fn test_output_line_unresolved_escapes_quotes() {
        let out = OutputRecord::new(&record("4", r#"Block "B""#), None);
        assert_eq!(out.to_line(), r#"4,"Block ""B""",,"#);

        let empty = OutputRecord::new(&record("3", ""), None);
        assert_eq!(empty.to_line(), r#"3,"",,"#);
    }

    #[test]
    fn test_output_reparses_to_same_record() {
        let original = record("5", r#"Street "A", 10"#);
        let line = OutputRecord::new(&original, None).to_line();
        // Only the first two columns matter when feeding output back in.
        let without_coords = line.trim_end_matches(",,");
        assert_eq!(parse_line(without_coords), Some(original));
    }
}
