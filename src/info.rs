// src/info.rs
// Basic file metadata derived from the decoded header

use std::fmt;

use crate::error::{CfsError, Result};
use crate::header::FileHeader;
use crate::variable::Value;

/// Creation date and time, as recorded in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CreationTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl CreationTime {
    /// Parse a `dd/mm/yy` date and a `HH:MM:SS` time.
    ///
    /// Two-digit years 69-99 are 19xx, 00-68 are 20xx.
    pub fn parse(date: &str, time: &str) -> Result<Self> {
        let invalid = || CfsError::InvalidTimestamp(format!("{}_{}", date, time));

        let [day, month, year] = split_three(date, '/').ok_or_else(invalid)?;
        let [hour, minute, second] = split_three(time, ':').ok_or_else(invalid)?;

        let year = if year < 69 { 2000 + year } else { 1900 + year };
        let parsed = CreationTime {
            year: year as u16,
            month: month as u8,
            day: day as u8,
            hour: hour as u8,
            minute: minute as u8,
            second: second as u8,
        };

        let valid = (1..=12).contains(&parsed.month)
            && (1..=days_in_month(parsed.year, parsed.month)).contains(&parsed.day)
            && parsed.hour < 24
            && parsed.minute < 60
            && parsed.second < 62;
        if valid {
            Ok(parsed)
        } else {
            Err(invalid())
        }
    }
}

impl fmt::Display for CreationTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// Split `text` into exactly three unsigned numbers of at most two digits.
fn split_three(text: &str, sep: char) -> Option<[u32; 3]> {
    let mut parts = text.split(sep).map(|p| {
        if p.is_empty() || p.len() > 2 || !p.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        p.parse::<u32>().ok()
    });
    let out = [parts.next()??, parts.next()??, parts.next()??];
    match parts.next() {
        None => Some(out),
        Some(_) => None,
    }
}

fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        2 if (year % 4 == 0 && year % 100 != 0) || year % 400 == 0 => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// Name and version of the recording software, e.g. `"Signal 6.03"`.
///
/// The first file variable is named after the program (`"Signal Program"`)
/// and holds its version number; the first digit is the release.
pub(crate) fn format_creator(name: &str, version: &Value) -> String {
    let name = name.replace(" Program", "");
    let version = version.to_string();
    let mut chars = version.chars();
    let release: String = chars.next().into_iter().collect();
    format!("{} {}.{}", name.trim(), release, chars.as_str())
}

/// Basic metadata for a CFS file.
#[derive(Debug, Clone)]
pub struct CfsInfo {
    header: FileHeader,
    creator: Option<String>,
}

impl CfsInfo {
    pub(crate) fn new(header: FileHeader, creator: Option<String>) -> Self {
        CfsInfo { header, creator }
    }

    /// Internal filename. Limited to 12 characters, may not match the
    /// name of the file on disk.
    pub fn filename(&self) -> &str {
        &self.header.filename
    }

    pub fn created(&self) -> Result<CreationTime> {
        CreationTime::parse(&self.header.start_date, &self.header.start_time)
    }

    /// Name and version of the software that created the file, if the file
    /// has any file variables.
    pub fn creator(&self) -> Option<&str> {
        self.creator.as_deref()
    }

    /// File size in bytes, as recorded in the header.
    pub fn size(&self) -> i32 {
        self.header.file_size
    }

    /// CFS format version (1 or 2).
    pub fn version(&self) -> u32 {
        self.header.version().unwrap_or_default()
    }

    pub fn comment(&self) -> &str {
        &self.header.comment
    }

    pub fn header(&self) -> &FileHeader {
        &self.header
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_creation_time() {
        let t = CreationTime::parse("05/11/19", "14:03:59").unwrap();
        assert_eq!(
            t,
            CreationTime {
                year: 2019,
                month: 11,
                day: 5,
                hour: 14,
                minute: 3,
                second: 59
            }
        );
        assert_eq!(t.to_string(), "2019-11-05 14:03:59");

        let t = CreationTime::parse("31/12/98", "00:00:00").unwrap();
        assert_eq!(t.year, 1998);
        let t = CreationTime::parse("29/02/68", "1:2:3").unwrap();
        assert_eq!(t.year, 2068);
    }

    #[test]
    fn test_invalid_creation_time() {
        for (date, time) in [
            ("", ""),
            ("32/01/20", "10:00:00"),
            ("29/02/21", "10:00:00"),
            ("01/13/20", "10:00:00"),
            ("01/01/20", "24:00:00"),
            ("01/01/2020", "10:00:00"),
            ("01-01-20", "10:00:00"),
            ("01/01/20", "10:00"),
            ("01/01/20/1", "10:00:00"),
        ] {
            assert!(
                matches!(CreationTime::parse(date, time), Err(CfsError::InvalidTimestamp(_))),
                "{} {} should be rejected",
                date,
                time
            );
        }
    }

    #[test]
    fn test_format_creator() {
        assert_eq!(format_creator("Signal Program", &Value::I16(603)), "Signal 6.03");
        assert_eq!(format_creator(" Spike2 ", &Value::I32(7)), "Spike2 7.");
        assert_eq!(format_creator("Signal Program", &Value::Text("5.1".into())), "Signal 5..1");
    }

    #[test]
    fn test_info_accessors() {
        let header = FileHeader {
            marker: "CEDFILE\"".to_string(),
            filename: "EXP01.CFS".to_string(),
            file_size: 2048,
            start_time: "09:15:00".to_string(),
            start_date: "17/03/22".to_string(),
            comment: "pilot".to_string(),
            ..Default::default()
        };
        let info = CfsInfo::new(header, Some("Signal 6.03".to_string()));

        assert_eq!(info.filename(), "EXP01.CFS");
        assert_eq!(info.size(), 2048);
        assert_eq!(info.version(), 2);
        assert_eq!(info.comment(), "pilot");
        assert_eq!(info.creator(), Some("Signal 6.03"));
        assert_eq!(info.created().unwrap().to_string(), "2022-03-17 09:15:00");
    }
}
