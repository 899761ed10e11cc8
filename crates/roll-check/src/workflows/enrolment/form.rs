use super::domain::ResultDetails;

/// Every element of the lookup page the check touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormElement {
    GivenNames,
    Surname,
    Postcode,
    Locality,
    Street,
    CaptchaInput,
    VerifyButton,
    SuccessPanel,
    FederalDivision,
    StateDistrict,
    LocalGovernment,
    LocalWard,
    FailedReason,
    BackButton,
    TryAgainButton,
}

impl FormElement {
    pub const fn dom_id(self) -> &'static str {
        match self {
            Self::GivenNames => "ctl00_ContentPlaceHolderBody_textGivenName",
            Self::Surname => "ctl00_ContentPlaceHolderBody_textSurname",
            Self::Postcode => "ctl00_ContentPlaceHolderBody_textPostcode",
            Self::Locality => "ctl00_ContentPlaceHolderBody_DropdownSuburb",
            Self::Street => "ctl00_ContentPlaceHolderBody_textStreetName",
            Self::CaptchaInput => "ctl00_ContentPlaceHolderBody_textVerificationCode",
            Self::VerifyButton => "ctl00_ContentPlaceHolderBody_buttonVerify",
            Self::SuccessPanel => "ctl00_ContentPlaceHolderBody_panelSuccess",
            Self::FederalDivision => "ctl00_ContentPlaceHolderBody_linkProfile",
            Self::StateDistrict => "ctl00_ContentPlaceHolderBody_labelStateDistrict2",
            Self::LocalGovernment => "ctl00_ContentPlaceHolderBody_labelLGA2",
            Self::LocalWard => "ctl00_ContentPlaceHolderBody_labelLGAWard2",
            Self::FailedReason => "ctl00_ContentPlaceHolderBody_labelFailedReason",
            Self::BackButton => "ctl00_ContentPlaceHolderBody_buttonBack",
            Self::TryAgainButton => "ctl00_ContentPlaceHolderBody_buttonTryAgain",
        }
    }

    /// Inputs are read through their current value, everything else through its text.
    pub const fn reads_value(self) -> bool {
        matches!(
            self,
            Self::GivenNames
                | Self::Surname
                | Self::Postcode
                | Self::Locality
                | Self::Street
                | Self::CaptchaInput
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("browser could not be started: {0}")]
    Launch(String),
    #[error("could not open {url}: {reason}")]
    Navigation { url: String, reason: String },
    #[error("element {element:?} is not on the page")]
    MissingElement { element: FormElement },
    #[error("browser call on {element:?} failed: {reason}")]
    Driver { element: FormElement, reason: String },
}

/// Result of asking the page about one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementPresence<T> {
    Present(T),
    Absent,
    CapabilityError(FormError),
}

impl<T> ElementPresence<T> {
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    /// Collapses to `Ok(Some(_))`, `Ok(None)` or the capability error.
    pub fn into_result(self) -> Result<Option<T>, FormError> {
        match self {
            Self::Present(value) => Ok(Some(value)),
            Self::Absent => Ok(None),
            Self::CapabilityError(err) => Err(err),
        }
    }
}

/// Named snapshot of which mode the remote page is in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// Form showing with an empty CAPTCHA box.
    InputReady,
    CaptchaPending { entered: usize },
    Success(ResultDetails),
    Failure { reason: Option<String> },
    /// None of the elements we know about are on the page.
    Unrecognised,
}

/// Browser-side capability the check drives. Implementations stay dumb; the
/// state machine decides what the observations mean.
pub trait EnrolmentForm {
    /// Clears whatever the field holds, then types `value`.
    fn set_field(&mut self, element: FormElement, value: &str) -> Result<(), FormError>;

    /// Returns `Ok(false)` when `value` is not one of the dropdown's options.
    fn select_option(&mut self, element: FormElement, value: &str) -> Result<bool, FormError>;

    fn focus(&mut self, element: FormElement) -> Result<(), FormError>;

    fn click(&mut self, element: FormElement) -> Result<(), FormError>;

    fn query(&mut self, element: FormElement) -> ElementPresence<String>;

    fn observe(&mut self) -> Result<Observation, FormError> {
        if self.query(FormElement::SuccessPanel).into_result()?.is_some() {
            let mut detail = |element| {
                self.query(element)
                    .into_result()
                    .map(|text| text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()))
            };
            return Ok(Observation::Success(ResultDetails {
                federal_division: detail(FormElement::FederalDivision)?,
                state_district: detail(FormElement::StateDistrict)?,
                local_government: detail(FormElement::LocalGovernment)?,
                local_ward: detail(FormElement::LocalWard)?,
            }));
        }

        let reason = self.query(FormElement::FailedReason).into_result()?;
        if reason.is_some() || self.query(FormElement::TryAgainButton).into_result()?.is_some() {
            return Ok(Observation::Failure {
                reason: reason.map(|r| r.trim().to_string()).filter(|r| !r.is_empty()),
            });
        }

        match self.query(FormElement::CaptchaInput).into_result()? {
            Some(entered) if entered.is_empty() => Ok(Observation::InputReady),
            Some(entered) => Ok(Observation::CaptchaPending {
                entered: entered.chars().count(),
            }),
            None => Ok(Observation::Unrecognised),
        }
    }
}
