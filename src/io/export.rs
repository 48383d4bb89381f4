//! CSV export for monthly and yearly simulation records.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::sim::types::YearlyRecord;

/// Column header for the monthly CSV export.
const MONTHLY_HEADER: &str = "year,month,consumption_kwh,generation_kwh,self_consumed_kwh,\
                              injected_kwh,purchased_kwh,credits_used_kwh,credits_expired_kwh,\
                              credit_balance_kwh,cost_without_system,cost_with_system,\
                              fio_b_cost,saving,net_metering_fraction";

/// Column header for the yearly CSV export.
const YEARLY_HEADER: &str = "year,calendar_year,consumption_kwh,generation_kwh,\
                             self_consumed_kwh,injected_kwh,saving,operating_cost,\
                             cumulative_cash_flow";

/// Writes one row per simulated month to a CSV file at `path`.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_monthly_csv(years: &[YearlyRecord], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_monthly_csv(years, io::BufWriter::new(file))
}

/// Writes one row per simulated month as CSV to any writer.
///
/// Values are rounded to two decimals and the compensation fraction to four. Output is
/// deterministic for identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_monthly_csv(years: &[YearlyRecord], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(MONTHLY_HEADER.split(',').map(str::trim))?;

    for m in years.iter().flat_map(|y| &y.months) {
        wtr.write_record(&[
            m.year_index.to_string(),
            m.month.to_string(),
            format!("{:.2}", m.consumption_kwh),
            format!("{:.2}", m.generation_kwh),
            format!("{:.2}", m.self_consumed_kwh),
            format!("{:.2}", m.injected_kwh),
            format!("{:.2}", m.purchased_kwh),
            format!("{:.2}", m.credits_used_kwh),
            format!("{:.2}", m.credits_expired_kwh),
            format!("{:.2}", m.credit_balance_kwh),
            format!("{:.2}", m.cost_without_system),
            format!("{:.2}", m.cost_with_system),
            format!("{:.2}", m.fio_b_cost),
            format!("{:.2}", m.saving),
            format!("{:.4}", m.net_metering_fraction),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes one row per simulated year to a CSV file at `path`.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_yearly_csv(years: &[YearlyRecord], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_yearly_csv(years, io::BufWriter::new(file))
}

/// Writes one row per simulated year as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_yearly_csv(years: &[YearlyRecord], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(YEARLY_HEADER.split(',').map(str::trim))?;

    for y in years {
        wtr.write_record(&[
            y.year_index.to_string(),
            y.calendar_year.to_string(),
            format!("{:.2}", y.consumption_kwh),
            format!("{:.2}", y.generation_kwh),
            format!("{:.2}", y.self_consumed_kwh),
            format!("{:.2}", y.injected_kwh),
            format!("{:.2}", y.saving),
            format!("{:.2}", y.operating_cost),
            format!("{:.2}", y.cumulative_cash_flow),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::engine::simulate;
    use crate::sim::types::SimulationConfig;
    use crate::tariff::registry::light_2025;

    fn three_years() -> Vec<YearlyRecord> {
        let config = SimulationConfig::new(25_000.0, 2024);
        simulate(800.0, 680.0, &light_2025(), &config, 3)
    }

    fn render(write: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        write(&mut buf).expect("writing to a buffer should succeed");
        String::from_utf8(buf).expect("CSV output should be UTF-8")
    }

    #[test]
    fn monthly_header_and_row_count() {
        let years = three_years();
        let output = render(|buf| write_monthly_csv(&years, buf));
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines.first().copied(),
            Some(
                "year,month,consumption_kwh,generation_kwh,self_consumed_kwh,\
                 injected_kwh,purchased_kwh,credits_used_kwh,credits_expired_kwh,\
                 credit_balance_kwh,cost_without_system,cost_with_system,\
                 fio_b_cost,saving,net_metering_fraction"
            )
        );
        // 1 header + 36 months
        assert_eq!(lines.len(), 37);
    }

    #[test]
    fn yearly_rows_follow_records() {
        let years = three_years();
        let output = render(|buf| write_yearly_csv(&years, buf));

        let mut rdr = csv::ReaderBuilder::new().from_reader(output.as_bytes());
        let headers = rdr.headers().cloned().ok();
        assert_eq!(headers.as_ref().map(csv::StringRecord::len), Some(9));

        let rows: Vec<csv::StringRecord> = rdr.records().filter_map(Result::ok).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(&rows[0][1], "2024");
        assert_eq!(&rows[2][0], "3");
        let cumulative: Result<f64, _> = rows[2][8].parse();
        assert!(cumulative.is_ok_and(|c| (c - years[2].cumulative_cash_flow).abs() < 0.01));
    }

    #[test]
    fn empty_run_writes_only_header() {
        let output = render(|buf| write_yearly_csv(&[], buf));
        assert_eq!(output.lines().count(), 1);
    }

    #[test]
    fn deterministic_output() {
        let years = three_years();
        let a = render(|buf| write_monthly_csv(&years, buf));
        let b = render(|buf| write_monthly_csv(&years, buf));
        assert_eq!(a, b);
    }

    #[test]
    fn export_writes_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("monthly.csv");
        export_monthly_csv(&three_years(), &path).expect("export should succeed");
        let content = std::fs::read_to_string(&path).expect("exported file should be readable");
        assert_eq!(content.lines().count(), 37);
    }
}
