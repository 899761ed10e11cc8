use super::domain::{AddressRecord, CheckResult};
use csv::{ByteRecord, StringRecord};
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::Path;
use tracing::warn;

pub const GIVEN_NAMES_FIELD: &str = "givenNames";
pub const SURNAME_FIELD: &str = "surname";
pub const POSTCODE_FIELD: &str = "postcode";
pub const SUBURB_FIELD: &str = "suburb";
pub const STATE_FIELD: &str = "state";
pub const STREET_FIELD: &str = "streetName";
pub const ID_FIELD: &str = "id";

/// Input columns in the order lenient mode reads them positionally.
pub const REQUIRED_FIELDS: [&str; 6] = [
    GIVEN_NAMES_FIELD,
    SURNAME_FIELD,
    POSTCODE_FIELD,
    SUBURB_FIELD,
    STATE_FIELD,
    STREET_FIELD,
];

/// Columns appended to every output row.
pub const RESULT_COLUMNS: [&str; 6] = [
    "reference",
    "result",
    "federalDivision",
    "stateDistrict",
    "localGovernment",
    "localWard",
];

const TEMPLATE_ID_PLACEHOLDER: &str = "{id}";

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("failed to read or write records: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid record CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("input is missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),
}

/// How input columns are located.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HeaderMode {
    /// First six columns in [`REQUIRED_FIELDS`] order, whatever the header says.
    #[default]
    Lenient,
    /// Every name in [`REQUIRED_FIELDS`] must appear in the header.
    Strict,
}

#[derive(Debug, Clone, Copy)]
struct ColumnLayout {
    fields: [usize; 6],
    id: Option<usize>,
}

impl ColumnLayout {
    fn resolve(headers: &StringRecord, mode: HeaderMode) -> Result<Self, RecordError> {
        let position = |name: &str| headers.iter().position(|header| header == name);
        let id = position(ID_FIELD);

        match mode {
            HeaderMode::Lenient => Ok(Self {
                fields: [0, 1, 2, 3, 4, 5],
                id,
            }),
            HeaderMode::Strict => {
                let missing: Vec<String> = REQUIRED_FIELDS
                    .into_iter()
                    .filter(|name| position(*name).is_none())
                    .map(|name| name.to_string())
                    .collect();
                if !missing.is_empty() {
                    return Err(RecordError::MissingFields(missing));
                }

                let mut fields = [0; 6];
                for (slot, name) in fields.iter_mut().zip(REQUIRED_FIELDS) {
                    *slot = position(name).unwrap_or_default();
                }
                Ok(Self { fields, id })
            }
        }
    }
}

/// One input row: the raw fields for echoing to the output, and the parsed
/// record when every required value other than the postcode is present.
#[derive(Debug, Clone)]
pub struct InputRow {
    pub raw: StringRecord,
    pub record: Option<AddressRecord>,
}

pub struct RecordReader<R: Read> {
    reader: csv::Reader<R>,
    headers: StringRecord,
    layout: ColumnLayout,
}

impl RecordReader<File> {
    pub fn from_path<P: AsRef<Path>>(path: P, mode: HeaderMode) -> Result<Self, RecordError> {
        let file = File::open(path)?;
        Self::from_reader(file, mode)
    }
}

impl<R: Read> RecordReader<R> {
    pub fn from_reader(input: R, mode: HeaderMode) -> Result<Self, RecordError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(input);
        let headers = reader.headers()?.clone();
        let layout = ColumnLayout::resolve(&headers, mode)?;

        Ok(Self {
            reader,
            headers,
            layout,
        })
    }

    pub fn headers(&self) -> &StringRecord {
        &self.headers
    }

    /// Rows that are not valid UTF-8 are kept, lossily decoded, without a record.
    fn decode(&self, raw: ByteRecord) -> InputRow {
        let line = raw.position().map(|position| position.line());
        match StringRecord::from_byte_record(raw) {
            Ok(raw) => {
                let record = self.parse(&raw);
                InputRow { raw, record }
            }
            Err(err) => {
                warn!(?line, error = %err.utf8_error(), "row is not valid UTF-8");
                let fields: Vec<String> = err
                    .into_byte_record()
                    .iter()
                    .map(|field| String::from_utf8_lossy(field).into_owned())
                    .collect();
                InputRow {
                    raw: StringRecord::from(fields),
                    record: None,
                }
            }
        }
    }

    fn parse(&self, raw: &StringRecord) -> Option<AddressRecord> {
        let [given, surname, postcode, suburb, state, street] =
            self.layout.fields.map(|idx| raw.get(idx).unwrap_or_default());

        let required = [given, surname, suburb, state, street];
        if required.iter().any(|value| value.trim().is_empty()) {
            return None;
        }

        let external_id = self
            .layout
            .id
            .and_then(|idx| raw.get(idx))
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string);

        Some(AddressRecord {
            given_names: given.to_string(),
            surname: surname.to_string(),
            postcode: postcode.to_string(),
            suburb: suburb.to_string(),
            state: state.to_string(),
            street: street.to_string(),
            external_id,
        })
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = Result<InputRow, RecordError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut raw = ByteRecord::new();
        match self.reader.read_byte_record(&mut raw) {
            Ok(true) => Some(Ok(self.decode(raw))),
            Ok(false) => None,
            Err(err) => Some(Err(err.into())),
        }
    }
}

/// Fills `{id}` in the configured template; empty when either is missing.
pub fn reference_link(template: Option<&str>, id: Option<&str>) -> String {
    match (template, id) {
        (Some(template), Some(id)) => template.replace(TEMPLATE_ID_PLACEHOLDER, id),
        _ => String::new(),
    }
}

/// Append-only sink for checked rows. Each row is flushed as soon as it is written
/// so a later `--skip` can pick up where an interrupted run stopped.
pub struct ResultWriter<W: Write> {
    writer: csv::Writer<W>,
    reference_template: Option<String>,
}

impl ResultWriter<File> {
    /// Opens `path` for appending. The header goes in only if the file is new or empty.
    pub fn append_to<P: AsRef<Path>>(
        path: P,
        input_headers: &StringRecord,
        reference_template: Option<String>,
    ) -> Result<Self, RecordError> {
        let path = path.as_ref();
        let fresh = match std::fs::metadata(path) {
            Ok(meta) => meta.len() == 0,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => true,
            Err(err) => return Err(err.into()),
        };

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let headers = fresh.then_some(input_headers);
        Self::new(file, headers, reference_template)
    }
}

impl<W: Write> ResultWriter<W> {
    pub fn new(
        output: W,
        input_headers: Option<&StringRecord>,
        reference_template: Option<String>,
    ) -> Result<Self, RecordError> {
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .has_headers(false)
            .from_writer(output);

        if let Some(headers) = input_headers {
            let mut row: Vec<&str> = headers.iter().collect();
            row.extend(RESULT_COLUMNS);
            writer.write_record(&row)?;
            writer.flush()?;
        }

        Ok(Self {
            writer,
            reference_template,
        })
    }

    pub fn write(
        &mut self,
        raw: &StringRecord,
        external_id: Option<&str>,
        result: &CheckResult,
    ) -> Result<(), RecordError> {
        let reference = reference_link(self.reference_template.as_deref(), external_id);
        let mut row: Vec<&str> = raw.iter().collect();
        row.extend([
            reference.as_str(),
            result.outcome.label(),
            result.federal_division.as_str(),
            result.state_district.as_str(),
            result.local_government.as_str(),
            result.local_ward.as_str(),
        ]);
        self.writer.write_record(&row)?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> Result<W, RecordError> {
        self.writer
            .into_inner()
            .map_err(|err| RecordError::Io(err.into_error()))
    }
}
