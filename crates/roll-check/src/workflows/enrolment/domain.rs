use serde::{Deserialize, Serialize};
use std::fmt;

/// One person to look up, as read from the input CSV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRecord {
    pub given_names: String,
    pub surname: String,
    pub postcode: String,
    pub suburb: String,
    pub state: String,
    pub street: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
}

impl AddressRecord {
    /// The postcode must be present and made of ASCII digits only.
    pub fn has_valid_postcode(&self) -> bool {
        let postcode = self.postcode.trim();
        !postcode.is_empty() && postcode.chars().all(|c| c.is_ascii_digit())
    }

    /// Option value of the locality dropdown, e.g. `PARKES (ACT)`.
    pub fn locality_key(&self) -> String {
        format!("{} ({})", self.suburb.trim().to_uppercase(), self.state.trim())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CheckOutcome {
    Pass,
    Partial,
    Fail,
    #[serde(rename = "Fail_Street")]
    FailStreet,
    #[serde(rename = "Fail_Suburb")]
    FailSuburb,
}

impl CheckOutcome {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Pass,
            Self::Partial,
            Self::Fail,
            Self::FailStreet,
            Self::FailSuburb,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pass => "Pass",
            Self::Partial => "Partial",
            Self::Fail => "Fail",
            Self::FailStreet => "Fail_Street",
            Self::FailSuburb => "Fail_Suburb",
        }
    }
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Electorate details shown on the success panel. Any of them may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultDetails {
    pub federal_division: Option<String>,
    pub state_district: Option<String>,
    pub local_government: Option<String>,
    pub local_ward: Option<String>,
}

/// Classified result for one record. Details are only kept for `Pass`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub outcome: CheckOutcome,
    pub federal_division: String,
    pub state_district: String,
    pub local_government: String,
    pub local_ward: String,
}

impl CheckResult {
    pub fn without_details(outcome: CheckOutcome) -> Self {
        Self {
            outcome,
            federal_division: String::new(),
            state_district: String::new(),
            local_government: String::new(),
            local_ward: String::new(),
        }
    }

    pub fn pass(details: ResultDetails) -> Self {
        Self {
            outcome: CheckOutcome::Pass,
            federal_division: details.federal_division.unwrap_or_default(),
            state_district: details.state_district.unwrap_or_default(),
            local_government: details.local_government.unwrap_or_default(),
            local_ward: details.local_ward.unwrap_or_default(),
        }
    }
}

/// What the machine hands back for a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordDisposition {
    Classified(CheckResult),
    /// The CAPTCHA field vanished while waiting; the session is no longer ours.
    Abandoned,
}
