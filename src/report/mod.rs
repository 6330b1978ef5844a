// (c) 2024 Ross Younger
//! # Spreadsheet and console reports
//!
//! A report holds one [`SheetTable`] per [`Metric`]. Each table has a row for every file size
//! and a pair of columns (mean, standard deviation) for every protocol, in protocol name order.
//!
//! The spreadsheet layout of each sheet is:
//!
//! ```text
//! +-----------+-----------------+-----------------+
//! |           |    BitTorrent   |     HTTP/1.1    |
//! | File Size +--------+--------+--------+--------+
//! |           |  Mean  | Std Dev|  Mean  | Std Dev|
//! +-----------+--------+--------+--------+--------+
//! | 10kB      |        |        |        |        |
//! | ...       |        |        |        |        |
//! ```
//!
//! Cells with no data are left blank.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, XlsxError};
use strum::IntoEnumIterator as _;
use tracing::{debug, warn};

use crate::analysis::{MergedResults, Metric};

mod table;
pub use table::{SheetTable, TableRow};
use table::{CORNER, MEAN, STDDEV};

/// Background of the header rows and the size column
const HEADER_FILL: Color = Color::RGB(0x00D9_D9D9);

/// Default spreadsheet column width, in characters
pub const DEFAULT_COLUMN_WIDTH: u16 = 15;

/// Lays out merged results and writes them out
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    tables: Vec<SheetTable>,
    column_width: u16,
}

impl ReportBuilder {
    /// Lays out every metric. With no results there is nothing to lay out.
    #[must_use]
    pub fn new(results: &MergedResults) -> Self {
        let tables = if results.is_empty() {
            Vec::new()
        } else {
            Metric::iter().map(|m| SheetTable::new(m, results)).collect()
        };
        Self {
            tables,
            column_width: DEFAULT_COLUMN_WIDTH,
        }
    }

    /// Sets the width of every column
    #[must_use]
    pub fn with_column_width(mut self, width: u16) -> Self {
        self.column_width = width;
        self
    }

    /// The laid-out tables, in sheet order
    #[must_use]
    pub fn tables(&self) -> &[SheetTable] {
        &self.tables
    }

    /// All tables as text, for the console
    #[must_use]
    pub fn render(&self) -> String {
        self.tables
            .iter()
            .map(SheetTable::render)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Builds the workbook in memory
    pub fn build_workbook(&self) -> Result<Workbook, XlsxError> {
        let mut workbook = Workbook::new();
        if self.tables.is_empty() {
            warn!("no results to report; the workbook has no data sheets");
        }
        for table in &self.tables {
            self.write_sheet(&mut workbook, table)?;
        }
        Ok(workbook)
    }

    fn write_sheet(&self, workbook: &mut Workbook, table: &SheetTable) -> Result<(), XlsxError> {
        let centred = Format::new()
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_border(FormatBorder::Thin);
        let header = centred
            .clone()
            .set_bold()
            .set_background_color(HEADER_FILL);
        let value = centred.set_num_format(table.metric.number_format());

        let sheet = workbook.add_worksheet();
        let _ = sheet.set_name(table.title())?;

        let _ = sheet.merge_range(0, 0, 1, 0, CORNER, &header)?;
        let mut last_col = 0;
        for (protocol, col) in table.protocols.iter().zip((1u16..).step_by(2)) {
            let _ = sheet.merge_range(0, col, 0, col + 1, protocol, &header)?;
            let _ = sheet.write_string_with_format(1, col, MEAN, &header)?;
            let _ = sheet.write_string_with_format(1, col + 1, STDDEV, &header)?;
            last_col = col + 1;
        }

        for (row, r) in table.rows.iter().zip(2u32..) {
            let _ = sheet.write_string_with_format(r, 0, row.size.to_string(), &header)?;
            for (cell, col) in row.cells.iter().zip((1u16..).step_by(2)) {
                if let Some(e) = cell {
                    let _ = sheet.write_number_with_format(r, col, e.mean, &value)?;
                    let _ = sheet.write_number_with_format(r, col + 1, e.stddev, &value)?;
                } else {
                    let _ = sheet.write_blank(r, col, &value)?;
                    let _ = sheet.write_blank(r, col + 1, &value)?;
                }
            }
        }

        for col in 0..=last_col {
            let _ = sheet.set_column_width(col, self.column_width)?;
        }
        debug!("laid out sheet {:?}", table.title());
        Ok(())
    }

    /// Writes the workbook to `path`.
    ///
    /// The file is written alongside its destination then renamed into place,
    /// so a failed write never leaves a partial spreadsheet at `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut workbook = self.build_workbook().context("laying out workbook")?;
        let temp = temp_path_for(path)?;
        if let Err(e) = workbook.save(&temp) {
            let _ = std::fs::remove_file(&temp);
            return Err(e).with_context(|| format!("writing {}", path.display()));
        }
        if let Err(e) = std::fs::rename(&temp, path) {
            let _ = std::fs::remove_file(&temp);
            return Err(e).with_context(|| format!("moving workbook into {}", path.display()));
        }
        Ok(())
    }
}

/// `dir/.name.tmp` for `dir/name`
fn temp_path_for(path: &Path) -> Result<PathBuf> {
    let name = path
        .file_name()
        .with_context(|| format!("{} is not a file name", path.display()))?;
    Ok(path.with_file_name(format!(".{}.tmp", name.to_string_lossy())))
}
