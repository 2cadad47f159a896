//! Sessions CSV loading
//!
//! Reads a sessions log into a [`SessionTable`]. Rows are not validated: cells that
//! cannot be parsed into the expected type are kept as raw text and become `None`
//! in the typed [`SessionRecord`].

use crate::models::{columns, SessionRecord, SessionRow, SessionTable};
use crate::timestamp_parser::TimestampParser;
use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Positions of the known columns within a header row
#[derive(Debug, Default)]
struct ColumnIndex {
    launch_unix: Option<usize>,
    end_unix: Option<usize>,
    launch_date: Option<usize>,
    duration_sec: Option<usize>,
    state: Option<usize>,
    username: Option<usize>,
    version: Option<usize>,
    cpu_count: Option<usize>,
    gpu_count: Option<usize>,
}

impl ColumnIndex {
    fn from_headers(headers: &[String]) -> Self {
        let find = |name: &str| headers.iter().position(|h| h == name);
        Self {
            launch_unix: find(columns::LAUNCH_UNIX),
            end_unix: find(columns::END_UNIX),
            launch_date: find(columns::LAUNCH_DATE),
            duration_sec: find(columns::DURATION_SEC),
            state: find(columns::STATE),
            username: find(columns::USERNAME),
            version: find(columns::VERSION),
            cpu_count: find(columns::CPU_COUNT),
            gpu_count: find(columns::GPU_COUNT),
        }
    }
}

/// Load a sessions CSV from disk
pub fn load_sessions(path: &Path) -> Result<SessionTable> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open sessions file: {}", path.display()))?;

    let source = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    parse_sessions(file, &source)
        .with_context(|| format!("Failed to read sessions file: {}", path.display()))
}

/// Parse sessions CSV content from any reader
pub fn parse_sessions<R: Read>(reader: R, source: &str) -> Result<SessionTable> {
    let mut csv_reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()
        .context("Failed to read CSV header row")?
        .iter()
        .map(str::to_string)
        .collect();

    let index = ColumnIndex::from_headers(&headers);
    if index.launch_unix.is_none() || index.end_unix.is_none() {
        warn!(
            source,
            "Session log has no launch/end timestamp columns, peak usage will be empty"
        );
    }

    let mut table = SessionTable::new(source, headers);
    for (i, result) in csv_reader.records().enumerate() {
        // Header is line 1
        let line_number = i + 2;
        let record =
            result.with_context(|| format!("Malformed CSV record at line {}", line_number))?;
        let session = parse_record(&record, &index, line_number);
        table.rows.push(SessionRow {
            raw: record.iter().map(str::to_string).collect(),
            session,
        });
    }

    info!(source, rows = table.len(), columns = table.headers.len(), "Loaded session log");
    Ok(table)
}

fn parse_record(record: &StringRecord, index: &ColumnIndex, line_number: usize) -> SessionRecord {
    let launch_unix = number_cell::<i64>(record, index.launch_unix, line_number);
    let launch_date = text_cell(record, index.launch_date)
        .and_then(|value| match TimestampParser::parse_date(&value) {
            Ok(date) => Some(date),
            Err(e) => {
                debug!(line_number, error = %e, "Unparsable launch date");
                None
            }
        })
        .or_else(|| launch_unix.and_then(TimestampParser::unix_date));

    SessionRecord {
        launch_unix,
        end_unix: number_cell::<i64>(record, index.end_unix, line_number),
        launch_date,
        duration_sec: float_cell(record, index.duration_sec, line_number),
        state: text_cell(record, index.state),
        username: text_cell(record, index.username),
        version: text_cell(record, index.version),
        cpu_count: count_cell(record, index.cpu_count, line_number),
        gpu_count: count_cell(record, index.gpu_count, line_number),
    }
}

fn text_cell(record: &StringRecord, column: Option<usize>) -> Option<String> {
    column
        .and_then(|i| record.get(i))
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn number_cell<T: FromStr>(
    record: &StringRecord,
    column: Option<usize>,
    line_number: usize,
) -> Option<T> {
    let value = text_cell(record, column)?;
    match value.parse::<T>() {
        Ok(n) => Some(n),
        Err(_) => {
            // Integer columns exported through a float dtype come out as "12.0"
            let parsed = value
                .parse::<f64>()
                .ok()
                .filter(|f| f.fract() == 0.0)
                .and_then(|f| format!("{}", f as i64).parse::<T>().ok());
            if parsed.is_none() {
                debug!(line_number, value = %value, "Unparsable numeric cell");
            }
            parsed
        }
    }
}

/// Finite floats only; "NaN" and "inf" count as missing
fn float_cell(record: &StringRecord, column: Option<usize>, line_number: usize) -> Option<f64> {
    let value = number_cell::<f64>(record, column, line_number)?;
    if !value.is_finite() {
        debug!(line_number, value, "Non-finite numeric cell");
        return None;
    }
    Some(value)
}

fn count_cell(record: &StringRecord, column: Option<usize>, line_number: usize) -> Option<u32> {
    number_cell::<u32>(record, column, line_number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const SAMPLE: &str = "\
session_launch_unix,session_end_unix,session_launch_date,session_duration_sec,session_state,username,version,cpu_count,gpu_count
1633046400,1633050000,2021-10-01,3600,finished,alice,1.9.0,4,1
1633132800,1633219200,,86400,finished,bob,1.9.1,8.0,
1633219200,,2021-10-03,oops,running,,1.9.1,2,0
";

    #[test]
    fn test_parse_typed_fields() {
        let table = parse_sessions(SAMPLE.as_bytes(), "sessions.csv").unwrap();
        assert_eq!(table.source, "sessions.csv");
        assert_eq!(table.len(), 3);
        assert!(table.has_column("username"));

        let first = &table.rows[0].session;
        assert_eq!(first.launch_unix, Some(1_633_046_400));
        assert_eq!(first.launch_date, NaiveDate::from_ymd_opt(2021, 10, 1));
        assert_eq!(first.duration_sec, Some(3600.0));
        assert!(first.is_in_state("finished"));
        assert_eq!(first.username.as_deref(), Some("alice"));
        assert_eq!(first.cpu_count, Some(4));
        assert_eq!(first.gpu_count, Some(1));
    }

    #[test]
    fn test_launch_date_falls_back_to_unix() {
        let table = parse_sessions(SAMPLE.as_bytes(), "sessions.csv").unwrap();
        let second = &table.rows[1].session;
        // 1633132800 is 2021-10-02T00:00:00Z
        assert_eq!(second.launch_date, NaiveDate::from_ymd_opt(2021, 10, 2));
        assert_eq!(second.cpu_count, Some(8));
        assert_eq!(second.gpu_count, None);
    }

    #[test]
    fn test_unparsable_launch_date_falls_back_to_unix() {
        let csv = "\
session_launch_unix,session_launch_date,session_state
1633132800,10/01/2021,finished
,10/01/2021,finished
";
        let table = parse_sessions(csv.as_bytes(), "dates.csv").unwrap();
        assert_eq!(table.rows[0].session.launch_date, NaiveDate::from_ymd_opt(2021, 10, 2));
        assert_eq!(table.rows[0].raw[1], "10/01/2021");
        // Nothing to fall back to
        assert_eq!(table.rows[1].session.launch_date, None);
    }

    #[test]
    fn test_non_finite_durations_are_missing() {
        let csv = "\
session_duration_sec,session_state,username
3600,finished,alice
NaN,finished,alice
nan,finished,alice
inf,finished,bob
-inf,finished,bob
";
        let table = parse_sessions(csv.as_bytes(), "durations.csv").unwrap();
        let durations: Vec<Option<f64>> = table.sessions().map(|s| s.duration_sec).collect();
        assert_eq!(durations, vec![Some(3600.0), None, None, None, None]);

        let total: f64 = table.sessions().map(|s| s.hours()).sum();
        assert_eq!(total, 1.0);
    }

    #[test]
    fn test_bad_cells_become_none() {
        let table = parse_sessions(SAMPLE.as_bytes(), "sessions.csv").unwrap();
        let third = &table.rows[2];
        assert_eq!(third.session.end_unix, None);
        assert_eq!(third.session.duration_sec, None);
        assert_eq!(third.session.username, None);
        assert_eq!(third.raw[3], "oops");
    }

    #[test]
    fn test_missing_columns() {
        let csv = "session_state,version\nfinished,1.0\n";
        let table = parse_sessions(csv.as_bytes(), "minimal.csv").unwrap();
        assert!(!table.has_column("username"));
        assert_eq!(table.rows[0].session.launch_unix, None);
        assert_eq!(table.rows[0].session.version.as_deref(), Some("1.0"));
    }

    #[test]
    fn test_short_rows_are_tolerated() {
        let csv = "username,version,cpu_count\nalice,1.0\n";
        let table = parse_sessions(csv.as_bytes(), "short.csv").unwrap();
        assert_eq!(table.rows[0].session.cpu_count, None);
        assert_eq!(table.rows[0].raw.len(), 2);
    }

    #[test]
    fn test_missing_file_is_error() {
        let err = load_sessions(Path::new("/nonexistent/sessions.csv")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/sessions.csv"));
    }
}
