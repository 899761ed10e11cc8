use super::domain::{AddressRecord, CheckOutcome, CheckResult, RecordDisposition, ResultDetails};
use super::form::{ElementPresence, EnrolmentForm, FormElement, FormError, Observation};
use crate::config::CheckConfig;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const CAPTCHA_LENGTH: usize = 4;

/// Consecutive driver errors tolerated while polling before the session is given up.
const MAX_TRANSIENT_FAILURES: u32 = 10;

#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error(transparent)]
    Form(#[from] FormError),
    #[error("no CAPTCHA was accepted within {0:?}")]
    CaptchaTimedOut(Duration),
}

/// Where one record's check currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckState {
    Idle,
    FormFilled,
    CaptchaPending,
    Verifying { polls: u32 },
    CaptchaReset,
    ResultShown(Verdict),
}

/// Which result panel the page rendered after an accepted CAPTCHA.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Success(ResultDetails),
    Failure { reason: Option<String> },
}

impl Verdict {
    /// A success panel without a federal division does not count as enrolled.
    pub fn classify(&self) -> CheckResult {
        match self {
            Verdict::Success(details) if details.federal_division.is_some() => {
                CheckResult::pass(details.clone())
            }
            Verdict::Success(_) => CheckResult::without_details(CheckOutcome::Fail),
            Verdict::Failure { reason } => {
                let reason = reason.as_deref().unwrap_or_default().to_lowercase();
                let outcome = if reason.contains("partial") {
                    CheckOutcome::Partial
                } else if reason.contains("street") {
                    CheckOutcome::FailStreet
                } else {
                    CheckOutcome::Fail
                };
                CheckResult::without_details(outcome)
            }
        }
    }

    /// Button that brings the page back to an empty form.
    pub const fn release_action(&self) -> FormElement {
        match self {
            Verdict::Success(_) => FormElement::BackButton,
            Verdict::Failure { .. } => FormElement::TryAgainButton,
        }
    }
}

/// Drives one record at a time through the lookup form.
#[derive(Debug, Clone)]
pub struct EnrolmentCheck {
    config: CheckConfig,
}

impl EnrolmentCheck {
    pub fn new(config: CheckConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    pub fn run<F: EnrolmentForm + ?Sized>(
        &self,
        form: &mut F,
        record: &AddressRecord,
    ) -> Result<RecordDisposition, CheckError> {
        let mut state = CheckState::Idle;
        let mut deadline = None;
        let mut failures = 0;

        loop {
            debug!(?state, "enrolment check state");
            state = match state {
                CheckState::Idle => {
                    if !record.has_valid_postcode() {
                        warn!(postcode = %record.postcode, "postcode is not numeric, lookup skipped");
                        return Ok(RecordDisposition::Classified(CheckResult::without_details(
                            CheckOutcome::Fail,
                        )));
                    }

                    form.set_field(FormElement::GivenNames, record.given_names.trim())?;
                    form.set_field(FormElement::Surname, record.surname.trim())?;
                    form.set_field(FormElement::Postcode, record.postcode.trim())?;
                    pause(self.config.settle_delay);

                    let locality = record.locality_key();
                    if !form.select_option(FormElement::Locality, &locality)? {
                        warn!(%locality, "locality is not offered by the form");
                        return Ok(RecordDisposition::Classified(CheckResult::without_details(
                            CheckOutcome::FailSuburb,
                        )));
                    }

                    form.set_field(FormElement::Street, record.street.trim())?;
                    CheckState::FormFilled
                }
                CheckState::FormFilled => {
                    deadline = self
                        .config
                        .captcha_timeout
                        .map(|timeout| (Instant::now() + timeout, timeout));
                    ready_captcha(form);
                    info!("waiting for the CAPTCHA to be entered");
                    CheckState::CaptchaPending
                }
                CheckState::CaptchaPending => {
                    check_deadline(deadline)?;
                    pause(self.config.poll_interval);

                    match form.query(FormElement::CaptchaInput) {
                        ElementPresence::Present(code) if code.chars().count() == CAPTCHA_LENGTH => {
                            failures = 0;
                            form.click(FormElement::VerifyButton)?;
                            CheckState::Verifying { polls: 0 }
                        }
                        ElementPresence::Present(_) => {
                            failures = 0;
                            CheckState::CaptchaPending
                        }
                        ElementPresence::Absent => {
                            warn!("CAPTCHA field disappeared, abandoning the session");
                            return Ok(RecordDisposition::Abandoned);
                        }
                        ElementPresence::CapabilityError(err) => {
                            tolerate(&mut failures, err)?;
                            CheckState::CaptchaPending
                        }
                    }
                }
                CheckState::Verifying { polls } => {
                    check_deadline(deadline)?;
                    pause(self.config.poll_interval);

                    let next = CheckState::Verifying { polls: polls + 1 };
                    let observation = match form.observe() {
                        Ok(observation) => {
                            failures = 0;
                            Some(observation)
                        }
                        Err(err) => {
                            tolerate(&mut failures, err)?;
                            None
                        }
                    };

                    match observation {
                        None => next,
                        Some(Observation::Success(details)) => {
                            CheckState::ResultShown(Verdict::Success(details))
                        }
                        Some(Observation::Failure { reason }) => {
                            CheckState::ResultShown(Verdict::Failure { reason })
                        }
                        Some(Observation::InputReady) => CheckState::CaptchaReset,
                        // Still showing the code (or mid-reload): give the page a few
                        // polls, then fall back to waiting, which re-submits or notices
                        // a vanished field.
                        Some(Observation::CaptchaPending { .. } | Observation::Unrecognised)
                            if polls + 1 >= self.config.verdict_polls =>
                        {
                            CheckState::CaptchaPending
                        }
                        Some(Observation::CaptchaPending { .. } | Observation::Unrecognised) => {
                            next
                        }
                    }
                }
                CheckState::CaptchaReset => {
                    info!("CAPTCHA rejected, waiting for a new code");
                    ready_captcha(form);
                    CheckState::CaptchaPending
                }
                CheckState::ResultShown(verdict) => {
                    let result = verdict.classify();
                    release(form, &verdict);
                    return Ok(RecordDisposition::Classified(result));
                }
            };
        }
    }
}

pub(crate) fn pause(duration: Duration) {
    if !duration.is_zero() {
        thread::sleep(duration);
    }
}

/// Best effort: the operator can still click into the field themselves.
fn ready_captcha<F: EnrolmentForm + ?Sized>(form: &mut F) {
    if let Err(err) = form.focus(FormElement::CaptchaInput) {
        warn!(%err, "could not focus the CAPTCHA field");
    }
}

fn release<F: EnrolmentForm + ?Sized>(form: &mut F, verdict: &Verdict) {
    let action = verdict.release_action();
    if let Err(err) = form.click(action) {
        warn!(%err, ?action, "could not return the form to its input state");
    }
}

fn check_deadline(deadline: Option<(Instant, Duration)>) -> Result<(), CheckError> {
    match deadline {
        Some((at, timeout)) if Instant::now() >= at => Err(CheckError::CaptchaTimedOut(timeout)),
        _ => Ok(()),
    }
}

fn tolerate(failures: &mut u32, err: FormError) -> Result<(), CheckError> {
    *failures += 1;
    if *failures > MAX_TRANSIENT_FAILURES {
        return Err(err.into());
    }
    debug!(%err, failures = *failures, "transient browser error while polling");
    Ok(())
}
