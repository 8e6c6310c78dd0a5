use std::fs::File;
use std::path::Path;

use csv::Writer;
use tracing::{debug, info};

use crate::contact::Contact;

pub const CSV_HEADERS: [&str; 9] = [
    "FirstName",
    "LastName",
    "Position",
    "Email",
    "Phone",
    "PhoneSource",
    "Organization",
    "LinkedIn",
    "Location",
];

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Cells of one contact in `CSV_HEADERS` order.
pub fn record(contact: &Contact) -> [String; 9] {
    [
        contact.first_name.clone(),
        contact.last_name.clone(),
        contact.position.clone(),
        contact.email.clone(),
        contact.phone_display(),
        contact.phone_source.to_string(),
        contact.organization.clone(),
        contact.linkedin.clone(),
        contact.location.clone(),
    ]
}

fn write_records<W: std::io::Write>(
    wtr: &mut Writer<W>,
    contacts: &[Contact],
) -> Result<(), ExportError> {
    wtr.write_record(CSV_HEADERS)?;
    for contact in contacts {
        wtr.write_record(record(contact))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Render contacts as UTF-8 CSV with a header row.
pub fn to_csv(contacts: &[Contact]) -> Result<Vec<u8>, ExportError> {
    let mut wtr = Writer::from_writer(Vec::new());
    write_records(&mut wtr, contacts)?;
    wtr.into_inner().map_err(|e| ExportError::Io(e.into_error()))
}

pub fn write_csv(contacts: &[Contact], path: &Path) -> Result<(), ExportError> {
    debug!(count = contacts.len(), path = %path.display(), "exporting contacts to CSV");
    let mut wtr = Writer::from_writer(File::create(path)?);
    write_records(&mut wtr, contacts)?;
    info!(count = contacts.len(), path = %path.display(), "CSV written");
    Ok(())
}

/// Fixed-width text table for terminal output.
pub fn render_table(contacts: &[Contact]) -> String {
    let rows: Vec<[String; 9]> = contacts.iter().map(record).collect();

    let mut widths = CSV_HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, CSV_HEADERS.iter().copied(), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_row(&mut out, rule.iter().map(String::as_str), &widths);
    for row in &rows {
        push_row(&mut out, row.iter().map(String::as_str), &widths);
    }
    out
}

fn push_row<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let mut line = String::new();
    for (cell, width) in cells.zip(widths) {
        let pad = width - cell.chars().count();
        line.push_str(cell);
        line.push_str(&" ".repeat(pad + 2));
    }
    out.push_str(line.trim_end());
    out.push('\n');
}
