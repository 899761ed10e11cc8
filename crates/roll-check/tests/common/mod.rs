#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Duration;

use roll_check::config::CheckConfig;
use roll_check::workflows::enrolment::{
    AddressRecord, ElementPresence, EnrolmentForm, FormElement, FormError, ResultDetails,
};

/// Every call the machine made, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Set(FormElement, String),
    Select(String),
    Focus(FormElement),
    Click(FormElement),
    Query(FormElement),
}

/// What the page does when verify is clicked.
#[derive(Debug, Clone)]
pub enum VerifyResponse {
    Success(ResultDetails),
    Failure(Option<String>),
    /// CAPTCHA wrong: the box is emptied.
    Reject,
    /// Nothing visible happens.
    Stall,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Page {
    Form,
    Success(ResultDetails),
    Failure(Option<String>),
}

/// In-memory stand-in for the lookup page.
///
/// `typed` is what the operator has typed into the CAPTCHA box, one entry per
/// poll; `None` makes the box vanish. Once the queue runs dry the box keeps
/// its last value.
pub struct ScriptedForm {
    pub calls: Vec<Call>,
    fields: HashMap<FormElement, String>,
    localities: HashSet<String>,
    typed: VecDeque<Option<String>>,
    responses: VecDeque<VerifyResponse>,
    captcha: Option<String>,
    hold_captcha: bool,
    failing_reads: u32,
    page: Page,
}

impl ScriptedForm {
    pub fn new(localities: &[&str]) -> Self {
        Self {
            calls: Vec::new(),
            fields: HashMap::new(),
            localities: localities.iter().map(|l| l.to_string()).collect(),
            typed: VecDeque::new(),
            responses: VecDeque::new(),
            captcha: Some(String::new()),
            hold_captcha: false,
            failing_reads: 0,
            page: Page::Form,
        }
    }

    pub fn typing(mut self, entries: &[&str]) -> Self {
        self.typed
            .extend(entries.iter().map(|entry| Some(entry.to_string())));
        self
    }

    pub fn captcha_vanishes(mut self) -> Self {
        self.typed.push_back(None);
        self
    }

    /// The next `count` reads of the CAPTCHA box fail at the driver level.
    pub fn failing_captcha_reads(mut self, count: u32) -> Self {
        self.failing_reads = count;
        self
    }

    pub fn responding(mut self, response: VerifyResponse) -> Self {
        self.responses.push_back(response);
        self
    }

    pub fn clicks(&self, element: FormElement) -> usize {
        self.calls
            .iter()
            .filter(|call| **call == Call::Click(element))
            .count()
    }

    pub fn clicked_sequence(&self) -> Vec<FormElement> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::Click(element) => Some(*element),
                _ => None,
            })
            .collect()
    }

    pub fn touched_captcha(&self) -> bool {
        self.calls.iter().any(|call| {
            matches!(
                call,
                Call::Focus(FormElement::CaptchaInput)
                    | Call::Query(FormElement::CaptchaInput)
                    | Call::Click(FormElement::VerifyButton)
            )
        })
    }

    pub fn field(&self, element: FormElement) -> Option<&str> {
        self.fields.get(&element).map(String::as_str)
    }

    fn on_form(&self) -> bool {
        self.page == Page::Form
    }

    fn require(&self, element: FormElement) -> Result<(), FormError> {
        let visible = match (&self.page, element) {
            (Page::Form, FormElement::BackButton | FormElement::TryAgainButton) => false,
            (Page::Form, FormElement::CaptchaInput) => self.captcha.is_some(),
            (Page::Form, _) => true,
            (Page::Success(_), FormElement::BackButton) => true,
            (Page::Failure(_), FormElement::TryAgainButton) => true,
            _ => false,
        };
        if visible {
            Ok(())
        } else {
            Err(FormError::MissingElement { element })
        }
    }

    fn poll_captcha(&mut self) -> Option<String> {
        if self.hold_captcha {
            self.hold_captcha = false;
        } else if let Some(next) = self.typed.pop_front() {
            self.captcha = next;
        }
        self.captcha.clone()
    }

    fn verify(&mut self) {
        match self.responses.pop_front().unwrap_or(VerifyResponse::Stall) {
            VerifyResponse::Success(details) => self.page = Page::Success(details),
            VerifyResponse::Failure(reason) => self.page = Page::Failure(reason),
            VerifyResponse::Reject => {
                self.captcha = Some(String::new());
                self.hold_captcha = true;
            }
            VerifyResponse::Stall => {}
        }
    }

    fn back_to_form(&mut self) {
        self.page = Page::Form;
        self.captcha = Some(String::new());
        self.hold_captcha = true;
    }
}

impl EnrolmentForm for ScriptedForm {
    fn set_field(&mut self, element: FormElement, value: &str) -> Result<(), FormError> {
        self.calls.push(Call::Set(element, value.to_string()));
        self.require(element)?;
        self.fields.insert(element, value.to_string());
        Ok(())
    }

    fn select_option(&mut self, element: FormElement, value: &str) -> Result<bool, FormError> {
        self.calls.push(Call::Select(value.to_string()));
        self.require(element)?;
        if !self.localities.contains(value) {
            return Ok(false);
        }
        self.fields.insert(element, value.to_string());
        Ok(true)
    }

    fn focus(&mut self, element: FormElement) -> Result<(), FormError> {
        self.calls.push(Call::Focus(element));
        self.require(element)
    }

    fn click(&mut self, element: FormElement) -> Result<(), FormError> {
        self.calls.push(Call::Click(element));
        self.require(element)?;
        match element {
            FormElement::VerifyButton => self.verify(),
            FormElement::BackButton | FormElement::TryAgainButton => self.back_to_form(),
            _ => {}
        }
        Ok(())
    }

    fn query(&mut self, element: FormElement) -> ElementPresence<String> {
        self.calls.push(Call::Query(element));
        if element == FormElement::CaptchaInput && self.failing_reads > 0 {
            self.failing_reads -= 1;
            return ElementPresence::CapabilityError(FormError::Driver {
                element,
                reason: "devtools call timed out".to_string(),
            });
        }
        let value = if self.on_form() && element == FormElement::CaptchaInput {
            self.poll_captcha()
        } else {
            self.read(element)
        };

        match value {
            Some(value) => ElementPresence::Present(value),
            None => ElementPresence::Absent,
        }
    }
}

impl ScriptedForm {
    fn read(&self, element: FormElement) -> Option<String> {
        match (&self.page, element) {
            (Page::Form, FormElement::SuccessPanel)
            | (Page::Form, FormElement::FailedReason)
            | (Page::Form, FormElement::TryAgainButton)
            | (Page::Form, FormElement::BackButton) => None,
            (Page::Form, other) => Some(self.fields.get(&other).cloned().unwrap_or_default()),
            (Page::Success(_), FormElement::SuccessPanel) => Some(String::new()),
            (Page::Success(_), FormElement::BackButton) => Some("Back".to_string()),
            (Page::Success(details), FormElement::FederalDivision) => {
                details.federal_division.clone()
            }
            (Page::Success(details), FormElement::StateDistrict) => details.state_district.clone(),
            (Page::Success(details), FormElement::LocalGovernment) => {
                details.local_government.clone()
            }
            (Page::Success(details), FormElement::LocalWard) => details.local_ward.clone(),
            (Page::Failure(reason), FormElement::FailedReason) => reason.clone(),
            (Page::Failure(_), FormElement::TryAgainButton) => Some("Try again".to_string()),
            _ => None,
        }
    }
}

pub fn quick_config() -> CheckConfig {
    CheckConfig {
        poll_interval: Duration::ZERO,
        settle_delay: Duration::ZERO,
        record_delay: Duration::ZERO,
        verdict_polls: 3,
        captcha_timeout: None,
        reference_template: None,
    }
}

pub fn record(suburb: &str, state: &str, postcode: &str) -> AddressRecord {
    AddressRecord {
        given_names: "Jo".to_string(),
        surname: "Citizen".to_string(),
        postcode: postcode.to_string(),
        suburb: suburb.to_string(),
        state: state.to_string(),
        street: "KING EDWARD TCE".to_string(),
        external_id: None,
    }
}

pub fn canberra() -> ResultDetails {
    ResultDetails {
        federal_division: Some("Canberra".to_string()),
        state_district: Some("Kurrajong".to_string()),
        local_government: None,
        local_ward: None,
    }
}
