//! Rendering of rows as markdown tables, CSV or JSON.

use crate::commands::OutputFormat;
use crate::model::{Amount, Precision};
use crate::Result;
use anyhow::{anyhow, Context};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt::{Debug, Display, Formatter};

/// Rows in the requested output format.
#[derive(Clone, Serialize)]
#[serde(untagged)]
pub enum Rows {
    /// The structured data as JSON.
    Json(serde_json::Value),
    /// Markdown table as a single formatted string.
    Table(String),
    /// CSV data as a properly escaped string.
    Csv(String),
}

impl Debug for Rows {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Rows::Json(v) => write!(f, "Rows::Json({:?})", v),
            Rows::Table(s) => write!(f, "Rows::Table({} chars)", s.len()),
            Rows::Csv(s) => write!(f, "Rows::Csv({} chars)", s.len()),
        }
    }
}

impl Display for Rows {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Rows::Json(v) => {
                if let Ok(s) = serde_json::to_string_pretty(v) {
                    write!(f, "{}", s)
                } else {
                    write!(f, "{:?}", v)
                }
            }
            Rows::Table(s) => write!(f, "{}", s),
            Rows::Csv(s) => write!(f, "{}", s),
        }
    }
}

/// A header row and data rows, all as display strings.
#[derive(Debug, Clone, Default)]
pub(crate) struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub(crate) fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Renders in `format`. JSON output is made from `structure` rather than from the strings.
    pub(crate) fn render<T: Serialize>(&self, format: OutputFormat, structure: &T) -> Result<Rows> {
        Ok(match format {
            OutputFormat::Json => Rows::Json(
                serde_json::to_value(structure).context("Failed to serialize the report")?,
            ),
            OutputFormat::Table => Rows::Table(self.markdown()),
            OutputFormat::Csv => Rows::Csv(self.csv()?),
        })
    }

    /// Renders a markdown table with padded columns.
    pub(crate) fn markdown(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| width(h).max(3)).collect();
        for row in &self.rows {
            for (ix, cell) in row.iter().enumerate() {
                if let Some(w) = widths.get_mut(ix) {
                    *w = (*w).max(width(cell));
                }
            }
        }

        let mut lines = Vec::with_capacity(self.rows.len() + 2);
        lines.push(line(&self.headers, &widths));
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        lines.push(line(&rule, &widths));
        for row in &self.rows {
            lines.push(line(row, &widths));
        }
        lines.join("\n")
    }

    /// Renders CSV with a header row.
    pub(crate) fn csv(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(&self.headers)
            .context("Failed to write the CSV header")?;
        for row in &self.rows {
            writer
                .write_record(row)
                .context("Failed to write a CSV row")?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| anyhow!("Failed to flush the CSV output: {}", e.error()))?;
        String::from_utf8(bytes).context("The CSV output is not valid UTF-8")
    }
}

/// Formats `value` with `symbol`, showing up to eight fractional digits when two are not enough,
/// e.g. for BTC balances.
pub(crate) fn money(value: Decimal, symbol: &str) -> String {
    let precision = if value.normalize().scale() > 2 {
        Precision::Rate
    } else {
        Precision::Money
    };
    Amount::new_with_precision(value, precision).labeled(symbol)
}

fn width(s: &str) -> usize {
    s.chars().count()
}

fn line(cells: &[String], widths: &[usize]) -> String {
    let padded: Vec<String> = widths
        .iter()
        .enumerate()
        .map(|(ix, w)| {
            let cell = cells.get(ix).map(String::as_str).unwrap_or_default();
            format!("{cell}{}", " ".repeat(w.saturating_sub(width(cell))))
        })
        .collect();
    format!("| {} |", padded.join(" | "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let mut table = Table::new(&["Code", "Name"]);
        table.push(vec!["USD".to_string(), "US Dollar".to_string()]);
        table.push(vec!["EUR".to_string(), "Euro, common".to_string()]);
        table
    }

    #[test]
    fn test_markdown() {
        let expected = "\
| Code | Name         |
| ---- | ------------ |
| USD  | US Dollar    |
| EUR  | Euro, common |";
        assert_eq!(sample().markdown(), expected);
    }

    #[test]
    fn test_markdown_counts_chars_not_bytes() {
        let mut table = Table::new(&["Sym"]);
        table.push(vec!["€".to_string()]);
        assert_eq!(table.markdown(), "| Sym |\n| --- |\n| €   |");
    }

    #[test]
    fn test_csv_escapes() {
        let csv = sample().csv().unwrap();
        assert_eq!(csv, "Code,Name\nUSD,US Dollar\nEUR,\"Euro, common\"\n");
    }

    #[test]
    fn test_money() {
        use rust_decimal_macros::dec;
        assert_eq!(money(dec!(1234.50), "$"), "$1,234.5");
        assert_eq!(money(dec!(0.00123), "₿"), "₿0.00123");
        assert_eq!(money(dec!(-70), "€"), "-€70");
    }

    #[test]
    fn test_render_json_uses_structure() {
        let rows = sample()
            .render(OutputFormat::Json, &vec!["a", "b"])
            .unwrap();
        assert_eq!(rows.to_string(), "[\n  \"a\",\n  \"b\"\n]");
    }
}
