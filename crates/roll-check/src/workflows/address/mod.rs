mod normalizer;
mod tables;

pub use normalizer::{normalize, normalize_state, NormalizationError, NormalizedAddress};

use csv::StringRecord;
use std::io::{self, Read, Write};
use tracing::{info, warn};

pub const STATE_COLUMN: &str = "state";
pub const STREET_COLUMN: &str = "streetName";
pub const ORIGINAL_ADDRESS_COLUMN: &str = "origAddress";

const ANOMALY_BANNER: &str =
    "The following entries are anomalous and will need to be manually considered:";

#[derive(Debug, thiserror::Error)]
pub enum CleanError {
    #[error("failed to read or write address data: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid address CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("address CSV is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanSummary {
    pub cleaned: usize,
    pub anomalies: usize,
}

/// Rewrites the `state` and `streetName` columns of an address CSV into the
/// form the lookup form accepts, keeping the original street alongside.
pub struct AddressCleaner;

impl AddressCleaner {
    /// Streams `input` to `output`. Rows that fail to normalize are left out
    /// of `output` and listed on `report` instead.
    pub fn clean<R: Read, W: Write, E: Write>(
        input: R,
        output: W,
        mut report: E,
    ) -> Result<CleanSummary, CleanError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(input);
        let headers = reader.headers()?.clone();

        let column = |name: &str| headers.iter().position(|header| header == name);
        let (state_idx, street_idx) = match (column(STATE_COLUMN), column(STREET_COLUMN)) {
            (Some(state), Some(street)) => (state, street),
            (state, street) => {
                let missing = [(STATE_COLUMN, state), (STREET_COLUMN, street)]
                    .into_iter()
                    .filter(|(_, idx)| idx.is_none())
                    .map(|(name, _)| name.to_string())
                    .collect();
                return Err(CleanError::MissingColumns(missing));
            }
        };

        let mut writer = csv::Writer::from_writer(output);
        let mut out_headers: Vec<&str> = headers.iter().collect();
        out_headers.push(ORIGINAL_ADDRESS_COLUMN);
        writer.write_record(&out_headers)?;

        let mut summary = CleanSummary::default();

        for (line, record) in reader.byte_records().enumerate() {
            let record = match StringRecord::from_byte_record(record?) {
                Ok(record) => record,
                Err(err) => {
                    warn!(row = line + 1, error = %err.utf8_error(), "row is not valid UTF-8");
                    let fields: Vec<String> = err
                        .into_byte_record()
                        .iter()
                        .map(|field| String::from_utf8_lossy(field).into_owned())
                        .collect();
                    report_anomaly(&mut report, &headers, summary.anomalies == 0, &fields)?;
                    summary.anomalies += 1;
                    continue;
                }
            };
            let state = record.get(state_idx).unwrap_or_default();
            let street = record.get(street_idx).unwrap_or_default();

            match normalize(state, street) {
                Ok(normalized) => {
                    let mut row: Vec<&str> = record.iter().collect();
                    row.resize(headers.len(), "");
                    row[state_idx] = &normalized.state;
                    row[street_idx] = &normalized.street;
                    row.push(street);
                    writer.write_record(&row)?;
                    summary.cleaned += 1;
                }
                Err(err) => {
                    warn!(row = line + 1, %err, "address needs manual review");
                    let fields: Vec<&str> = record.iter().collect();
                    report_anomaly(&mut report, &headers, summary.anomalies == 0, &fields)?;
                    summary.anomalies += 1;
                }
            }
        }

        writer.flush()?;
        info!(
            cleaned = summary.cleaned,
            anomalies = summary.anomalies,
            "address cleaning finished"
        );
        Ok(summary)
    }
}

/// The banner and field names go out once, before the first anomalous row.
fn report_anomaly<E: Write, S: AsRef<str>>(
    report: &mut E,
    headers: &StringRecord,
    first: bool,
    fields: &[S],
) -> io::Result<()> {
    if first {
        writeln!(report, "\n{ANOMALY_BANNER}\n")?;
        writeln!(report, "{}", headers.iter().collect::<Vec<_>>().join("\t"))?;
    }
    let line: Vec<&str> = fields.iter().map(AsRef::as_ref).collect();
    writeln!(report, "{}", line.join("\t"))
}
