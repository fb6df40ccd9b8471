//! CSV export of the year-by-year cash-flow schedule.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::engine::financial::FinancialEstimates;

/// Schema v1 column header for cash-flow CSV export.
const HEADER: &str = "year,production_kwh,revenue,om_cost,net_cash_flow,cumulative_cash_flow";

/// Exports the cash-flow schedule to a CSV file at the given path.
///
/// Writes a header row followed by one row per schedule year (year 0 is
/// the installed-cost outlay). Produces deterministic output for
/// identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_cashflow_csv(financial: &FinancialEstimates, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_cashflow_csv(financial, buf)
}

/// Writes the cash-flow schedule as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_cashflow_csv(financial: &FinancialEstimates, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    // Header
    wtr.write_record(HEADER.split(','))?;

    // Data rows
    for row in financial.cash_flow_schedule() {
        wtr.write_record(&[
            row.year.to_string(),
            format!("{:.1}", row.production_kwh),
            format!("{:.2}", row.revenue),
            format!("{:.2}", row.om_cost),
            format!("{:.2}", row.net_cash_flow),
            format!("{:.2}", row.cumulative_cash_flow),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::financial::FinancialEstimator;

    fn estimates() -> FinancialEstimates {
        FinancialEstimator::cash_flow_metrics(10_000.0, 7000.0, 0.005)
    }

    #[test]
    fn header_matches_schema_v1() {
        let mut buf = Vec::new();
        write_cashflow_csv(&estimates(), &mut buf).ok();
        let output = String::from_utf8(buf).ok();
        let first_line = output.as_deref().unwrap_or("").lines().next().unwrap_or("");
        assert_eq!(
            first_line,
            "year,production_kwh,revenue,om_cost,net_cash_flow,cumulative_cash_flow"
        );
    }

    #[test]
    fn row_count_is_horizon_plus_outlay_and_header() {
        let mut buf = Vec::new();
        write_cashflow_csv(&estimates(), &mut buf).ok();
        let output = String::from_utf8(buf).ok();
        let lines: Vec<&str> = output.as_deref().unwrap_or("").lines().collect();
        // 1 header + year 0 + 25 production years
        assert_eq!(lines.len(), 27);
    }

    #[test]
    fn deterministic_output() {
        let e = estimates();
        let mut buf1 = Vec::new();
        let mut buf2 = Vec::new();
        write_cashflow_csv(&e, &mut buf1).ok();
        write_cashflow_csv(&e, &mut buf2).ok();
        assert_eq!(buf1, buf2);
    }

    #[test]
    fn round_trip_parseable() {
        let mut buf = Vec::new();
        write_cashflow_csv(&estimates(), &mut buf).ok();

        let mut rdr = csv::ReaderBuilder::new().from_reader(buf.as_slice());
        let headers = rdr.headers().cloned().ok();
        assert_eq!(headers.as_ref().map(csv::StringRecord::len), Some(6));

        let mut row_count = 0;
        for record in rdr.records() {
            let rec = record.ok();
            assert!(rec.is_some(), "every row should parse");
            let rec = rec.as_ref();
            for i in 1..6 {
                let val: Result<f64, _> = rec.map(|r| r[i].parse()).unwrap_or(Ok(0.0));
                assert!(val.is_ok(), "column {i} should parse as f64");
            }
            row_count += 1;
        }
        assert_eq!(row_count, 26);
    }
}
