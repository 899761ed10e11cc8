use super::domain::{CheckOutcome, RecordDisposition};
use super::form::EnrolmentForm;
use super::machine::{pause, CheckError, EnrolmentCheck};
use super::records::{InputRow, RecordError, ResultWriter};
use std::collections::HashMap;
use std::io::Write;
use tracing::{info, info_span, warn};

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error(transparent)]
    Records(#[from] RecordError),
    #[error("record {row} could not be checked: {source}")]
    Check {
        row: usize,
        #[source]
        source: CheckError,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    pub skipped: usize,
    pub invalid: usize,
    /// Set when the session was lost part way and later records were not attempted.
    pub halted: bool,
    outcomes: HashMap<CheckOutcome, usize>,
}

impl BatchSummary {
    pub fn count(&self, outcome: CheckOutcome) -> usize {
        self.outcomes.get(&outcome).copied().unwrap_or_default()
    }

    fn record(&mut self, outcome: CheckOutcome) {
        self.processed += 1;
        *self.outcomes.entry(outcome).or_default() += 1;
    }
}

/// Feeds input rows through one shared form session, strictly one at a time.
pub struct EnrolmentBatch {
    check: EnrolmentCheck,
    skip: usize,
}

impl EnrolmentBatch {
    /// `skip` counts data rows already present in the output from an earlier run.
    pub fn new(check: EnrolmentCheck, skip: usize) -> Self {
        Self { check, skip }
    }

    pub fn run<I, F, W>(
        &self,
        rows: I,
        form: &mut F,
        sink: &mut ResultWriter<W>,
    ) -> Result<BatchSummary, BatchError>
    where
        I: IntoIterator<Item = Result<InputRow, RecordError>>,
        F: EnrolmentForm + ?Sized,
        W: Write,
    {
        let mut summary = BatchSummary::default();

        for (index, row) in rows.into_iter().enumerate() {
            let row = row?;
            let line = index + 1;

            if index < self.skip {
                summary.skipped += 1;
                continue;
            }

            let Some(record) = row.record.as_ref() else {
                warn!(row = line, "row is incomplete or unreadable, skipped");
                summary.invalid += 1;
                continue;
            };

            if summary.processed > 0 {
                pause(self.check.config().record_delay);
            }

            let _span = info_span!("record", row = line).entered();
            match self.check.run(form, record) {
                Ok(RecordDisposition::Classified(result)) => {
                    sink.write(&row.raw, record.external_id.as_deref(), &result)?;
                    info!(outcome = %result.outcome, "record checked");
                    summary.record(result.outcome);
                }
                Ok(RecordDisposition::Abandoned) => {
                    warn!("form session lost, stopping before the remaining records");
                    summary.halted = true;
                    break;
                }
                Err(source) => return Err(BatchError::Check { row: line, source }),
            }
        }

        info!(
            processed = summary.processed,
            skipped = summary.skipped,
            invalid = summary.invalid,
            passed = summary.count(CheckOutcome::Pass),
            halted = summary.halted,
            "enrolment batch finished"
        );
        Ok(summary)
    }
}
