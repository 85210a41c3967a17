//! CSV export of the rendered table

use std::io::Write;
use std::path::Path;

use bo_core::model::CHECKBOX_COLUMN;

use crate::tables::TableModel;
use crate::ViewError;

/// Export options
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Write the header row
    pub include_header: bool,
    /// Include the checkbox column as a `selected` flag
    pub include_selection: bool,
    pub delimiter: u8,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            include_header: true,
            include_selection: false,
            delimiter: b',',
        }
    }
}

/// Write the table's visible columns, frozen first, as CSV.
/// Returns the number of data rows written.
pub fn export_csv<W: Write>(
    table: &TableModel,
    writer: W,
    options: &ExportOptions,
) -> Result<usize, ViewError> {
    let mut csv = csv::WriterBuilder::new()
        .delimiter(options.delimiter)
        .from_writer(writer);

    // (cell index, header, is the checkbox column)
    let columns: Vec<(usize, &str, bool)> = table
        .columns()
        .enumerate()
        .filter(|(_, c)| options.include_selection || c.id != CHECKBOX_COLUMN)
        .map(|(index, c)| {
            let checkbox = c.id == CHECKBOX_COLUMN;
            let header = if checkbox {
                "selected"
            } else if c.label.is_empty() {
                c.id.as_str()
            } else {
                c.label.as_str()
            };
            (index, header, checkbox)
        })
        .collect();

    if options.include_header {
        csv.write_record(columns.iter().map(|(_, header, _)| *header))?;
    }

    for row in &table.rows {
        let record = columns.iter().map(|&(index, _, checkbox)| {
            if checkbox {
                if row.selected {
                    "true"
                } else {
                    "false"
                }
            } else {
                row.cells.get(index).map_or("", String::as_str)
            }
        });
        csv.write_record(record)?;
    }

    csv.flush()?;
    tracing::debug!(rows = table.rows.len(), columns = columns.len(), "exported table");
    Ok(table.rows.len())
}

/// Export to a file on disk
pub fn export_csv_file(
    table: &TableModel,
    path: &Path,
    options: &ExportOptions,
) -> Result<usize, ViewError> {
    let file = std::fs::File::create(path)?;
    export_csv(table, std::io::BufWriter::new(file), options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::{ColumnLayout, TableView};
    use bo_core::staging::StagingManager;
    use bo_core::CampaignRow;

    fn table(staging: &StagingManager) -> TableModel {
        let mut first = CampaignRow::new("1", "Brand, Exact");
        first.spend = 12.5;
        let second = CampaignRow::new("2", "Generic");
        TableView::default().build(&[first, second], &ColumnLayout::default(), staging)
    }

    #[test]
    fn test_export_frozen_columns_first() {
        let staging = StagingManager::new();
        let mut out = Vec::new();
        let written = export_csv(&table(&staging), &mut out, &ExportOptions::default()).unwrap();
        assert_eq!(written, 2);

        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("Campaign,Ad Type,State"));
        assert!(!header.contains("selected"));

        let first = lines.next().unwrap();
        assert!(first.starts_with("\"Brand, Exact\","));
        assert!(first.contains("$12.50"));
    }

    #[test]
    fn test_export_selection_flag() {
        let staging = StagingManager::new();
        staging.toggle("2");
        let options = ExportOptions {
            include_selection: true,
            include_header: false,
            ..ExportOptions::default()
        };

        let mut out = Vec::new();
        export_csv(&table(&staging), &mut out, &options).unwrap();
        let text = String::from_utf8(out).unwrap();
        let rows: Vec<&str> = text.lines().collect();
        assert!(rows[0].starts_with("false,"));
        assert!(rows[1].starts_with("true,"));
    }

    #[test]
    fn test_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("campaigns.csv");
        let table = table(&StagingManager::new());
        let written = export_csv_file(&table, &path, &ExportOptions::default()).unwrap();
        assert_eq!(written, 2);
        assert!(std::fs::read_to_string(&path).unwrap().lines().count() == 3);
    }
}
