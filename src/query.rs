//! Filter predicates over product records.
//!
//! Two substring predicates (product name, description) match case-sensitively.
//! Every categorical predicate is an exact string comparison against one
//! column. A categorical value equal to the match-all sentinel, or an empty
//! value, imposes no constraint. Predicates combine with logical AND.

use serde::Serialize;

use crate::types::{ProductRecord, DESCRIPTION, PRODUCT_NAME};

/// Values that switch a categorical predicate off.
pub const MATCH_ALL: [&str; 3] = ["모든 조건", "모든조건", "*"];

/// Maximum number of name suggestions returned.
pub const SUGGEST_LIMIT: usize = 10;

const NAME_PARAMS: [&str; 2] = ["제품명", PRODUCT_NAME];
const DESCRIPTION_PARAMS: [&str; 1] = [DESCRIPTION];

pub fn is_match_all(value: &str) -> bool {
    MATCH_ALL.contains(&value)
}

/// Categorical columns addressable by the filter endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FilterField {
    AcDc,
    ProductFamily,
    ProtectionType,
    Communication,
    CommunicationType,
    GroundFault,
    ShortCircuit,
    OverUnderCurrent,
    PhaseLoss,
    PhaseReversal,
    OverUnderVoltage,
    PowerMonitoring,
    BuiltInZct,
}

impl FilterField {
    pub const ALL: [FilterField; 13] = [
        FilterField::AcDc,
        FilterField::ProductFamily,
        FilterField::ProtectionType,
        FilterField::Communication,
        FilterField::CommunicationType,
        FilterField::GroundFault,
        FilterField::ShortCircuit,
        FilterField::OverUnderCurrent,
        FilterField::PhaseLoss,
        FilterField::PhaseReversal,
        FilterField::OverUnderVoltage,
        FilterField::PowerMonitoring,
        FilterField::BuiltInZct,
    ];

    /// Column name as it appears in the trimmed CSV header.
    pub fn column(&self) -> &'static str {
        match self {
            FilterField::AcDc => "AC or DC",
            FilterField::ProductFamily => "제품군",
            FilterField::ProtectionType => "보호종류",
            FilterField::Communication => "통신여부",
            FilterField::CommunicationType => "통신종류",
            FilterField::GroundFault => "누설(지락)",
            FilterField::ShortCircuit => "단락",
            FilterField::OverUnderCurrent => "과전류/저전류",
            FilterField::PhaseLoss => "결상",
            FilterField::PhaseReversal => "역상",
            FilterField::OverUnderVoltage => "과전압/저전압",
            FilterField::PowerMonitoring => "전력",
            FilterField::BuiltInZct => "내장 ZCT",
        }
    }

    /// Query parameter names accepted for this field. The column name always
    /// works; some columns also have a punctuation-free spelling.
    pub fn param_names(&self) -> &'static [&'static str] {
        match self {
            FilterField::AcDc => &["AC_DC", "AC or DC", "AC/DC"],
            FilterField::ProductFamily => &["제품군"],
            FilterField::ProtectionType => &["보호종류"],
            FilterField::Communication => &["통신여부"],
            FilterField::CommunicationType => &["통신종류"],
            FilterField::GroundFault => &["누설지락", "누설(지락)"],
            FilterField::ShortCircuit => &["단락"],
            FilterField::OverUnderCurrent => &["과전류저전류", "과전류/저전류"],
            FilterField::PhaseLoss => &["결상"],
            FilterField::PhaseReversal => &["역상"],
            FilterField::OverUnderVoltage => &["과전압저전압", "과전압/저전압"],
            FilterField::PowerMonitoring => &["전력"],
            FilterField::BuiltInZct => &["내장ZCT", "내장 ZCT"],
        }
    }

    pub fn from_param(name: &str) -> Option<FilterField> {
        FilterField::ALL
            .into_iter()
            .find(|field| field.param_names().contains(&name))
    }
}

/// A conjunction of optional predicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    name_contains: Option<String>,
    description_contains: Option<String>,
    equals: Vec<(FilterField, String)>,
}

impl ProductFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a filter from raw query parameters. Unknown names are ignored;
    /// a repeated parameter keeps its last value.
    pub fn from_params<I, K, V>(params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut filter = Self::new();
        for (key, value) in params {
            let (key, value) = (key.as_ref(), value.as_ref());
            if NAME_PARAMS.contains(&key) {
                filter = filter.name_contains(value);
            } else if DESCRIPTION_PARAMS.contains(&key) {
                filter = filter.description_contains(value);
            } else if let Some(field) = FilterField::from_param(key) {
                filter = filter.with_equals(field, value);
            }
        }
        filter
    }

    pub fn name_contains(mut self, needle: impl Into<String>) -> Self {
        self.name_contains = non_empty(needle.into());
        self
    }

    pub fn description_contains(mut self, needle: impl Into<String>) -> Self {
        self.description_contains = non_empty(needle.into());
        self
    }

    /// Require `field` to equal `value`. Sentinel or empty values clear the predicate.
    pub fn with_equals(mut self, field: FilterField, value: impl Into<String>) -> Self {
        self.equals.retain(|(f, _)| *f != field);
        let value = value.into();
        if !value.is_empty() && !is_match_all(&value) {
            self.equals.push((field, value));
        }
        self
    }

    /// True when no predicate is active.
    pub fn is_unconstrained(&self) -> bool {
        self.name_contains.is_none() && self.description_contains.is_none() && self.equals.is_empty()
    }

    pub fn active_predicates(&self) -> usize {
        self.name_contains.iter().count() + self.description_contains.iter().count() + self.equals.len()
    }

    pub fn matches(&self, record: &ProductRecord) -> bool {
        if let Some(needle) = &self.name_contains {
            if !contains(record.get(PRODUCT_NAME), needle) {
                return false;
            }
        }

        if let Some(needle) = &self.description_contains {
            if !contains(record.get(DESCRIPTION), needle) {
                return false;
            }
        }

        self.equals
            .iter()
            .all(|(field, value)| record.get(field.column()) == Some(value.as_str()))
    }
}

/// Lowercased needle for name suggestions, or `None` when the query is
/// absent or blank. Surrounding whitespace is kept for matching.
pub fn suggest_needle(q: Option<&str>) -> Option<String> {
    match q {
        Some(q) if !q.trim().is_empty() => Some(q.to_lowercase()),
        _ => None,
    }
}

fn contains(haystack: Option<&str>, needle: &str) -> bool {
    haystack.map_or(false, |h| h.contains(needle))
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}
