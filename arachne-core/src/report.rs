// Rendering of the visited-page listing ("site tree")

use crate::protocol::{PageEntry, encode_entry_line};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

impl ReportFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(ReportFormat::Text),
            "json" | "ndjson" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

/// `"<title>:\n\t <url>\n"`
pub fn format_entry(entry: &PageEntry) -> String {
    format!("{}:\n\t {}\n", entry.page_title, entry.page_url)
}

pub fn format_total(total: usize) -> String {
    format!("Total unique links: {}\n", total)
}

/// Writes listing entries as they arrive and tracks the running total.
pub struct ListingWriter<W> {
    out: W,
    format: ReportFormat,
    total: usize,
}

impl<W: Write> ListingWriter<W> {
    pub fn new(out: W, format: ReportFormat) -> Self {
        Self {
            out,
            format,
            total: 0,
        }
    }

    pub fn write_entry(&mut self, entry: &PageEntry) -> io::Result<()> {
        let text = match self.format {
            ReportFormat::Text => format_entry(entry),
            ReportFormat::Json => encode_entry_line(entry)?,
        };
        self.out.write_all(text.as_bytes())?;
        self.total += 1;
        Ok(())
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Writes the total line (text format only) and returns the writer.
    pub fn finish(mut self) -> io::Result<W> {
        if self.format == ReportFormat::Text {
            self.out.write_all(format_total(self.total).as_bytes())?;
        }
        self.out.flush()?;
        Ok(self.out)
    }
}

/// Renders a complete listing into a string.
pub fn render_listing(entries: &[PageEntry], format: ReportFormat) -> io::Result<String> {
    let mut writer = ListingWriter::new(Vec::new(), format);
    for entry in entries {
        writer.write_entry(entry)?;
    }
    let bytes = writer.finish()?;
    String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
