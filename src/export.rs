use std::fs::File;
use std::io::BufWriter;

use camino::{Utf8Path, Utf8PathBuf};
use printpdf::{BuiltinFont, Mm, PdfDocument};
use rust_xlsxwriter::Workbook;
use thiserror::Error;
use tracing::info;

/// Export files land at fixed names inside the artifacts directory and are
/// overwritten on every export request.
pub const SPREADSHEET_FILENAME: &str = "extracted_data.xlsx";
pub const PDF_FILENAME: &str = "extracted_data.pdf";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no extracted text available to export")]
    InputMissing,
    #[error("failed to write spreadsheet: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),
    #[error("failed to write PDF: {0}")]
    Pdf(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Serialize the extracted text into a one-column, one-row spreadsheet.
pub fn write_spreadsheet(text: &str, directory: &Utf8Path) -> Result<Utf8PathBuf, ExportError> {
    let text = require_input(text)?;
    let path = directory.join(SPREADSHEET_FILENAME);

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.write_string(0, 0, "Extracted Text")?;
    worksheet.write_string(1, 0, text)?;
    workbook.save(path.as_std_path())?;

    info!("wrote spreadsheet export to {path}");
    Ok(path)
}

/// Serialize the extracted text into a PDF: a left-margin text block in
/// Helvetica 12pt on a US-letter page.
pub fn write_pdf(text: &str, directory: &Utf8Path) -> Result<Utf8PathBuf, ExportError> {
    let text = require_input(text)?;
    let path = directory.join(PDF_FILENAME);

    let (document, page, layer) =
        PdfDocument::new("Extracted Text", Mm(215.9), Mm(279.4), "text");
    let font = document
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;

    let layer = document.get_page(page).get_layer(layer);
    layer.begin_text_section();
    layer.set_font(&font, 12.0);
    layer.set_line_height(14.0);
    layer.set_text_cursor(Mm(14.0), Mm(265.0));
    for line in text.lines() {
        layer.write_text(line, &font);
        layer.add_line_break();
    }
    layer.end_text_section();

    let file = File::create(path.as_std_path())?;
    document
        .save(&mut BufWriter::new(file))
        .map_err(|e| ExportError::Pdf(e.to_string()))?;

    info!("wrote PDF export to {path}");
    Ok(path)
}

/// Exports never serialize empty content; an export with nothing upstream
/// is a user-facing error.
fn require_input(text: &str) -> Result<&str, ExportError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(ExportError::InputMissing)
    } else {
        Ok(trimmed)
    }
}
