use crate::spreadsheets::{Cell, DealRow, ExportError};
use rust_xlsxwriter::Workbook;

/// Builds a one-sheet workbook of ranked deals and returns its bytes.
pub fn export_deals_xlsx<T: DealRow>(
    deals: &[T],
    sheet_name: &str,
) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    worksheet
        .set_name(sheet_name)
        .map_err(|e| ExportError::Xlsx(format!("Failed to name sheet '{}': {}", sheet_name, e)))?;

    // Headers
    for (col, header) in T::headers().iter().enumerate() {
        worksheet
            .write_string(0, col as u16, *header)
            .map_err(|e| {
                ExportError::Xlsx(format!("Failed to write header '{}': {}", header, e))
            })?;
    }

    // Rows
    for (i, deal) in deals.iter().enumerate() {
        let r = (i + 1) as u32;

        for (col, cell) in deal.cells().into_iter().enumerate() {
            let col = col as u16;
            let written = match cell {
                Cell::Text(s) => worksheet.write_string(r, col, s).map(|_| ()),
                Cell::Number(n) => worksheet.write_number(r, col, n).map(|_| ()),
                Cell::Empty => Ok(()),
            };
            written.map_err(|e| {
                ExportError::Xlsx(format!("Failed to write row {} column {}: {}", r, col, e))
            })?;
        }
    }

    workbook
        .save_to_buffer()
        .map_err(|e| ExportError::Xlsx(format!("Failed to save workbook: {}", e)))
}
