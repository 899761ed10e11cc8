//! Per-record enrolment lookups against the AEC form, plus the CSV plumbing
//! around them.

pub mod batch;
pub mod chrome;
pub mod domain;
pub mod form;
pub mod machine;
pub mod records;

pub use batch::{BatchError, BatchSummary, EnrolmentBatch};
pub use chrome::ChromeForm;
pub use domain::{AddressRecord, CheckOutcome, CheckResult, RecordDisposition, ResultDetails};
pub use form::{ElementPresence, EnrolmentForm, FormElement, FormError, Observation};
pub use machine::{CheckError, CheckState, EnrolmentCheck, Verdict};
pub use records::{HeaderMode, InputRow, RecordError, RecordReader, ResultWriter};
