use super::tables;
use regex::Regex;
use std::sync::OnceLock;

/// Matches a reversed, uppercased address: leading cruft (the house number
/// read backwards), the alphabetic run that forms "<type> <name>" backwards,
/// then whatever precedes the street in the original string.
static REVERSED_STREET: OnceLock<Regex> = OnceLock::new();

fn reversed_street() -> &'static Regex {
    REVERSED_STREET.get_or_init(|| {
        Regex::new(r"^[^A-Z]*([A-Z \-]+)( .+)?$").expect("street pattern is valid")
    })
}

/// Canonical state code and `"<STREET NAME> <TYPE>"` street string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedAddress {
    pub state: String,
    pub street: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizationError {
    #[error("unrecognised state or territory '{state}'")]
    UnknownState { state: String },
    #[error("no street name found in '{address}'")]
    NoStreetFound { address: String },
    #[error("unrecognised street type '{street_type}'")]
    UnknownStreetType { street_type: String },
}

pub fn normalize(state: &str, raw_address: &str) -> Result<NormalizedAddress, NormalizationError> {
    let state = normalize_state(state)?;
    let (name, candidate) = split_street(raw_address)?;
    let street_type = canonical_street_type(&candidate)?;

    let street = if name.is_empty() {
        street_type.to_string()
    } else {
        format!("{name} {street_type}")
    };

    Ok(NormalizedAddress {
        state: state.to_string(),
        street,
    })
}

pub fn normalize_state(state: &str) -> Result<&'static str, NormalizationError> {
    let upper = state.trim().to_uppercase();

    tables::state_code(&upper)
        .or_else(|| tables::state_code_for_name(&upper))
        .ok_or_else(|| NormalizationError::UnknownState {
            state: state.to_string(),
        })
}

/// Returns the street name and the candidate street-type token, both uppercased.
fn split_street(raw_address: &str) -> Result<(String, String), NormalizationError> {
    let reversed: String = raw_address
        .chars()
        .rev()
        .flat_map(char::to_uppercase)
        .filter(|c| !matches!(c, ',' | '\''))
        .collect();

    let not_found = || NormalizationError::NoStreetFound {
        address: raw_address.to_string(),
    };

    let captured = reversed_street()
        .captures(&reversed)
        .and_then(|caps| caps.get(1))
        .ok_or_else(not_found)?;

    let forward: String = captured.as_str().chars().rev().collect();
    let mut tokens: Vec<&str> = forward.split_whitespace().collect();
    let candidate = tokens.pop().ok_or_else(not_found)?;

    Ok((tokens.join(" "), candidate.to_string()))
}

fn canonical_street_type(candidate: &str) -> Result<&'static str, NormalizationError> {
    tables::street_abbreviation(candidate)
        .or_else(|| tables::street_type_for_name(candidate))
        .or_else(|| tables::street_type_by_prefix(candidate))
        .ok_or_else(|| NormalizationError::UnknownStreetType {
            street_type: candidate.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn street(state: &str, address: &str) -> (String, String) {
        let normalized = normalize(state, address).expect("address normalizes");
        (normalized.state, normalized.street)
    }

    #[test]
    fn full_state_name_and_street_word_are_abbreviated() {
        assert_eq!(
            street("VICTORIA", "12 Example Street"),
            ("VIC".to_string(), "EXAMPLE ST".to_string())
        );
    }

    #[test]
    fn unit_numbers_and_apostrophes_are_discarded() {
        assert_eq!(
            street("VIC", "4/56 O'Connor Crescent"),
            ("VIC".to_string(), "OCONNOR CRES".to_string())
        );
    }

    #[test]
    fn leading_unit_words_are_dropped_with_the_number() {
        assert_eq!(
            street("nsw", "Unit 3, 12 Smith St"),
            ("NSW".to_string(), "SMITH ST".to_string())
        );
    }

    #[test]
    fn multi_word_and_hyphenated_names_survive() {
        assert_eq!(
            street("Queensland", "7 Mount-Cotton Old Cleveland Road"),
            ("QLD".to_string(), "MOUNT-COTTON OLD CLEVELAND RD".to_string())
        );
    }

    #[test]
    fn trailing_punctuation_is_ignored() {
        assert_eq!(
            street(" western australia ", "101 Hay St."),
            ("WA".to_string(), "HAY ST".to_string())
        );
    }

    #[test]
    fn abbreviation_typo_uses_first_table_match() {
        assert_eq!(
            street("ACT", "9 Hindmarsh Cr"),
            ("ACT".to_string(), "HINDMARSH CRCT".to_string())
        );
        assert_eq!(
            street("ACT", "9 Hindmarsh Boulevarde"),
            ("ACT".to_string(), "HINDMARSH BLVD".to_string())
        );
    }

    #[test]
    fn near_miss_street_types_are_anomalies() {
        let cases = [
            ("1 The Strand", "STRAND"),
            ("2 Market Plaza", "PLAZA"),
            ("3 Old Grange", "GRANGE"),
            ("4 King Boul", "BOUL"),
            ("9 Hindmarsh Cresc", "CRESC"),
        ];
        for (address, street_type) in cases {
            assert_eq!(
                normalize("NSW", address),
                Err(NormalizationError::UnknownStreetType {
                    street_type: street_type.to_string()
                }),
                "{address}"
            );
        }
    }

    #[test]
    fn single_word_street_is_type_only() {
        assert_eq!(
            street("SA", "1 Esplanade"),
            ("SA".to_string(), "ESP".to_string())
        );
    }

    #[test]
    fn address_without_letters_has_no_street() {
        for address in ["", "123", "4/56", " "] {
            let error = normalize("NSW", address).expect_err("expected no street");
            assert!(
                matches!(error, NormalizationError::NoStreetFound { .. }),
                "{address:?} gave {error:?}"
            );
        }
    }

    #[test]
    fn unknown_state_is_rejected_before_street_parsing() {
        let error = normalize("Mars", "1 Main Rd").expect_err("expected unknown state");
        assert_eq!(
            error,
            NormalizationError::UnknownState {
                state: "Mars".to_string()
            }
        );
    }

    #[test]
    fn unknown_street_type_is_reported() {
        let error = normalize("TAS", "3 The Broadway").expect_err("expected unknown type");
        assert_eq!(
            error,
            NormalizationError::UnknownStreetType {
                street_type: "BROADWAY".to_string()
            }
        );
    }

    #[test]
    fn normalization_is_deterministic() {
        let first = normalize("VIC", "4/56 O'Connor Crescent");
        for _ in 0..10 {
            assert_eq!(normalize("VIC", "4/56 O'Connor Crescent"), first);
        }
    }
}
