//! Renders an [`AggregationResult`] as a table, JSON or CSV.

use crate::core::tally::{sorted_view, SortKey};
use crate::domain::model::AggregationResult;
use crate::utils::error::{Result, TallyError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Table => "txt",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }

    pub fn file_name(&self) -> String {
        format!("country_tally.{}", self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = TallyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(TallyError::InvalidConfigValueError {
                field: "format".to_string(),
                value: other.to_string(),
                reason: "Supported formats: table, json, csv".to_string(),
            }),
        }
    }
}

impl FromStr for SortKey {
    type Err = TallyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "count" => Ok(SortKey::Count),
            "country" => Ok(SortKey::Country),
            other => Err(TallyError::InvalidConfigValueError {
                field: "sort".to_string(),
                value: other.to_string(),
                reason: "Supported sort keys: count, country".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    pub format: OutputFormat,
    pub sort: SortKey,
    pub ascending: bool,
}

pub fn render(result: &AggregationResult, options: &RenderOptions) -> Result<String> {
    match options.format {
        OutputFormat::Table => Ok(render_table(result, options)),
        OutputFormat::Json => render_json(result, options),
        OutputFormat::Csv => render_csv(result, options),
    }
}

fn render_table(result: &AggregationResult, options: &RenderOptions) -> String {
    let rows = sorted_view(&result.tallies, options.sort, options.ascending);
    let width = rows
        .iter()
        .map(|t| t.country.chars().count())
        .max()
        .unwrap_or(0)
        .max("Country".chars().count());

    let mut lines = vec![format!("{:<width$}  {:>8}  {:>7}", "Country", "Count", "Share")];
    for tally in &rows {
        lines.push(format!(
            "{:<width$}  {:>8}  {:>6.1}%",
            tally.country, tally.count, tally.percentage
        ));
    }

    if rows.is_empty() {
        lines.push("(no customers found)".to_string());
    }

    lines.push(String::new());
    lines.push(format!(
        "Total: {} customers in {} countries (limit {}, {} page(s))",
        result.total,
        rows.len(),
        result.requested_limit,
        result.pages_fetched
    ));
    lines.join("\n")
}

fn render_json(result: &AggregationResult, options: &RenderOptions) -> Result<String> {
    let mut view = result.clone();
    view.tallies = sorted_view(&result.tallies, options.sort, options.ascending);
    Ok(serde_json::to_string_pretty(&view)?)
}

fn render_csv(result: &AggregationResult, options: &RenderOptions) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["country", "count", "percentage"])?;
    for tally in sorted_view(&result.tallies, options.sort, options.ascending) {
        writer.write_record([
            tally.country,
            tally.count.to_string(),
            format!("{:.2}", tally.percentage),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| TallyError::IoError(e.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|e| TallyError::IoError(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tally::rank;
    use chrono::Utc;
    use std::collections::HashMap;

    fn sample() -> AggregationResult {
        let counts: HashMap<String, u64> =
            [("US".to_string(), 15), ("DE".to_string(), 10)].into();
        AggregationResult {
            total: 25,
            requested_limit: 25,
            pages_fetched: 1,
            generated_at: Utc::now(),
            tallies: rank(counts, 25),
        }
    }

    #[test]
    fn test_table_lists_countries_and_total() {
        let output = render(&sample(), &RenderOptions::default()).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert!(lines[0].starts_with("Country"));
        assert!(lines[1].starts_with("US"));
        assert!(lines[1].ends_with("60.0%"));
        assert!(lines[2].starts_with("DE"));
        assert!(output.contains("Total: 25 customers in 2 countries"));
    }

    #[test]
    fn test_csv_respects_sort_order() {
        let options = RenderOptions {
            format: OutputFormat::Csv,
            sort: SortKey::Country,
            ascending: true,
        };
        let output = render(&sample(), &options).unwrap();

        assert_eq!(
            output,
            "country,count,percentage\nDE,10,40.00\nUS,15,60.00\n"
        );
    }

    #[test]
    fn test_json_round_trips_totals() {
        let options = RenderOptions {
            format: OutputFormat::Json,
            ..Default::default()
        };
        let output = render(&sample(), &options).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["total"], 25);
        assert_eq!(value["tallies"][0]["country"], "US");
        assert_eq!(value["tallies"][0]["percentage"], 60.0);
    }

    #[test]
    fn test_parse_format_and_sort() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("xml".parse::<OutputFormat>().is_err());
        assert_eq!("country".parse::<SortKey>().unwrap(), SortKey::Country);
        assert!("share".parse::<SortKey>().is_err());
        assert_eq!(OutputFormat::Csv.file_name(), "country_tally.csv");
    }

    #[test]
    fn test_table_width_counts_characters_not_bytes() {
        // 10 個字元、11 個位元組
        let counts: HashMap<String, u64> =
            [("Österreich".to_string(), 20), ("US".to_string(), 5)].into();
        let result = AggregationResult {
            total: 25,
            requested_limit: 25,
            pages_fetched: 1,
            generated_at: Utc::now(),
            tallies: rank(counts, 25),
        };
        let output = render(&result, &RenderOptions::default()).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(
            lines[0],
            format!("{:<10}  {:>8}  {:>7}", "Country", "Count", "Share")
        );
        assert!(lines[1].starts_with("Österreich  "));
        assert_eq!(lines[1].chars().count(), lines[0].chars().count());
        assert_eq!(lines[2].chars().count(), lines[0].chars().count());
    }

    #[test]
    fn test_empty_result_table() {
        let empty = AggregationResult {
            total: 0,
            requested_limit: 10,
            pages_fetched: 1,
            generated_at: Utc::now(),
            tallies: vec![],
        };
        let output = render(&empty, &RenderOptions::default()).unwrap();
        assert!(output.contains("(no customers found)"));
    }
}
