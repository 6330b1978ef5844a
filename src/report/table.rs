// Tabular view of merged results, one table per metric
// (c) 2024 Ross Younger

use strum::IntoEnumIterator as _;
use tabled::{
    builder::Builder,
    settings::{object::Columns, Alignment, Style},
};

use crate::{
    analysis::{Estimate, MergedResults, Metric},
    sizes::SizeLabel,
    util::format::fixed,
};

/// Corner label above the size column
pub(crate) const CORNER: &str = "File Size";
pub(crate) const MEAN: &str = "Mean";
pub(crate) const STDDEV: &str = "Std Dev";

/// One row of a [`SheetTable`]
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    /// Row label
    pub size: SizeLabel,
    /// One cell per protocol, in column order. `None` renders blank.
    pub cells: Vec<Option<Estimate>>,
}

/// The values of one metric for every protocol and every file size
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    /// What the values measure
    pub metric: Metric,
    /// Column groups, each spanning a mean and a standard deviation column
    pub protocols: Vec<String>,
    /// One row per file size, smallest first; all sizes are always present
    pub rows: Vec<TableRow>,
}

impl SheetTable {
    /// Lays out one metric from a set of merged results
    #[must_use]
    pub fn new(metric: Metric, results: &MergedResults) -> Self {
        let protocols: Vec<String> = results.keys().cloned().collect();
        let rows = SizeLabel::iter()
            .map(|size| TableRow {
                size,
                cells: results
                    .values()
                    .map(|by_size| {
                        by_size
                            .get(&size)
                            .map(|summary| summary.get(metric))
                            .filter(|e| !e.is_absent())
                    })
                    .collect(),
            })
            .collect();
        Self {
            metric,
            protocols,
            rows,
        }
    }

    /// Title of this table; also its sheet name
    #[must_use]
    pub fn title(&self) -> String {
        self.metric.to_string()
    }

    fn format_value(&self, value: f64) -> String {
        fixed(
            value,
            self.metric.decimals(),
            self.metric.thousands_separated(),
        )
    }

    /// Renders the table as text, with the same number formats as the spreadsheet
    #[must_use]
    pub fn render(&self) -> String {
        let mut builder = Builder::default();

        let mut header = vec![CORNER.to_string()];
        let mut subheader = vec![String::new()];
        for p in &self.protocols {
            header.push(p.clone());
            header.push(String::new());
            subheader.push(MEAN.into());
            subheader.push(STDDEV.into());
        }
        builder.push_record(header);
        builder.push_record(subheader);

        for row in &self.rows {
            let mut record = vec![row.size.to_string()];
            for cell in &row.cells {
                match cell {
                    Some(e) => {
                        record.push(self.format_value(e.mean));
                        record.push(self.format_value(e.stddev));
                    }
                    None => record.extend([String::new(), String::new()]),
                }
            }
            builder.push_record(record);
        }

        let mut table = builder.build();
        let _ = table
            .with(Style::sharp())
            .modify(Columns::new(1..), Alignment::right());
        format!("{}\n{table}", self.title())
    }
}
