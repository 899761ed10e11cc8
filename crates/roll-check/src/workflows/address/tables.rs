/// Full state and territory names mapped to the codes the lookup form expects.
pub(crate) const STATE_NAMES: &[(&str, &str)] = &[
    ("AUSTRALIAN CAPITAL TERRITORY", "ACT"),
    ("NEW SOUTH WALES", "NSW"),
    ("NORTHERN TERRITORY", "NT"),
    ("QUEENSLAND", "QLD"),
    ("SOUTH AUSTRALIA", "SA"),
    ("TASMANIA", "TAS"),
    ("VICTORIA", "VIC"),
    ("WESTERN AUSTRALIA", "WA"),
];

/// Street-type words and their abbreviations.
///
/// Declaration order is load-bearing: the fuzzy fallback in
/// [`street_type_by_prefix`] returns the first related entry, so reordering
/// rows changes how ambiguous tokens such as `CR` resolve.
pub(crate) const STREET_TYPES: &[(&str, &str)] = &[
    ("ROAD", "RD"),
    ("STREET", "ST"),
    ("AVENUE", "AVE"),
    ("COURT", "CT"),
    ("CIRCUIT", "CRCT"),
    ("CCT", "CRCT"),
    ("PLACE", "PL"),
    ("DRIVE", "DR"),
    ("PARADE", "PDE"),
    ("CLOSE", "CL"),
    ("ESPLANADE", "ESP"),
    ("BOULEVARD", "BLVD"),
    ("SQUARE", "SQ"),
    ("TERRACE", "TCE"),
    ("CRESCENT", "CRES"),
    ("GROVE", "GR"),
    ("HIGHWAY", "HWY"),
    ("LANE", "LANE"),
    ("GARDENS", "GDNS"),
    ("WAY", "WAY"),
    ("LOOP", "LOOP"),
    ("MEWS", "MEWS"),
];

pub(crate) fn state_code(value: &str) -> Option<&'static str> {
    STATE_NAMES
        .iter()
        .map(|(_, code)| *code)
        .find(|code| *code == value)
}

pub(crate) fn state_code_for_name(name: &str) -> Option<&'static str> {
    STATE_NAMES
        .iter()
        .find(|(full, _)| *full == name)
        .map(|(_, code)| *code)
}

pub(crate) fn street_abbreviation(value: &str) -> Option<&'static str> {
    STREET_TYPES
        .iter()
        .map(|(_, abbr)| *abbr)
        .find(|abbr| *abbr == value)
}

pub(crate) fn street_type_for_name(name: &str) -> Option<&'static str> {
    STREET_TYPES
        .iter()
        .find(|(full, _)| *full == name)
        .map(|(_, abbr)| *abbr)
}

/// First table entry where `token` is a prefix of the abbreviation, or the
/// full word is a prefix of `token`.
pub(crate) fn street_type_by_prefix(token: &str) -> Option<&'static str> {
    if token.is_empty() {
        return None;
    }

    STREET_TYPES
        .iter()
        .find(|(full, abbr)| abbr.starts_with(token) || token.starts_with(full))
        .map(|(_, abbr)| *abbr)
}
