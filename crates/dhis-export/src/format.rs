//! Export formats and file naming.

use std::fmt;
use std::str::FromStr;

/// Longest file stem produced by [`clean_filename`].
pub const MAX_FILENAME_CHARS: usize = 50;

const RESERVED_FILENAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Csv,
    Json,
    Xlsx,
}

impl ExportFormat {
    pub const ALL: [Self; 3] = [Self::Csv, Self::Json, Self::Xlsx];

    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Xlsx => "xlsx",
        }
    }

    pub const fn mime(&self) -> &'static str {
        match self {
            Self::Csv => "text/csv",
            Self::Json => "application/json",
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        }
    }

    /// Format of already exported bytes. A spreadsheet export that fell
    /// back to CSV is reported as CSV.
    pub fn sniff(bytes: &[u8]) -> Self {
        if bytes.starts_with(ZIP_MAGIC) {
            Self::Xlsx
        } else if bytes.first() == Some(&b'[')
            && serde_json::from_slice::<serde_json::Value>(bytes).is_ok_and(|v| v.is_array())
        {
            Self::Json
        } else {
            Self::Csv
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "xlsx" | "excel" => Ok(Self::Xlsx),
            other => Err(format!("format d'export inconnu: {other}")),
        }
    }
}

/// Replace characters that are not allowed in file names with `_` and cap
/// the length at [`MAX_FILENAME_CHARS`] characters.
pub fn clean_filename(name: &str) -> String {
    name.chars()
        .map(|c| if RESERVED_FILENAME_CHARS.contains(&c) { '_' } else { c })
        .take(MAX_FILENAME_CHARS)
        .collect()
}

/// `{clean name}.{extension}`.
pub fn file_name(name: &str, format: ExportFormat) -> String {
    format!("{}.{}", clean_filename(name), format.extension())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_characters_are_replaced() {
        assert_eq!(clean_filename(r#"a<b>c:d"e/f\g|h?i*j"#), "a_b_c_d_e_f_g_h_i_j");
        assert_eq!(clean_filename("Couverture vaccinale"), "Couverture vaccinale");
    }

    #[test]
    fn names_are_capped_in_characters() {
        let long = "é".repeat(80);
        assert_eq!(clean_filename(&long).chars().count(), MAX_FILENAME_CHARS);
        assert_eq!(file_name("ANC / 2024", ExportFormat::Json), "ANC _ 2024.json");
    }

    #[test]
    fn sniffing() {
        assert_eq!(ExportFormat::sniff(b"PK\x03\x04rest"), ExportFormat::Xlsx);
        assert_eq!(ExportFormat::sniff(b"[{\"a\":1}]"), ExportFormat::Json);
        assert_eq!(ExportFormat::sniff(b"a,b\n1,2\n"), ExportFormat::Csv);
        assert_eq!(ExportFormat::sniff(b""), ExportFormat::Csv);
    }

    #[test]
    fn bracketed_csv_header_is_still_csv() {
        assert_eq!(ExportFormat::sniff(b"[Cas],Total
3,4
"), ExportFormat::Csv);
        assert_eq!(ExportFormat::sniff(b"[1]
2
"), ExportFormat::Csv);
        assert_eq!(ExportFormat::sniff(b"[]"), ExportFormat::Json);
    }

    #[test]
    fn parse_names() {
        assert_eq!("XLSX".parse::<ExportFormat>(), Ok(ExportFormat::Xlsx));
        assert!("pdf".parse::<ExportFormat>().is_err());
    }
}
