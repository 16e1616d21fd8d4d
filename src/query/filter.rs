use serde::Deserialize;
use std::fmt;
use utoipa::{IntoParams, ToSchema};

use crate::models::{Record, RecordField};

/// Member card status that marks a member (and their family) as covered
pub const APPROVED_STATUS: &str = "APPROVED";

/// Case normalization applied to both filter values and record fields.
///
/// Unicode uppercase mapping, independent of the process locale.
pub fn fold_case(value: &str) -> String {
    value.to_uppercase()
}

/// Optional match criteria shared by paging, projection and summary reads
#[derive(Clone, Default, PartialEq, Eq, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FilterSet {
    /// Block name (exact, case-insensitive)
    pub block: Option<String>,
    /// Village/ward code (substring, case-insensitive)
    pub village: Option<String>,
    /// Rural/urban flag (exact, case-insensitive)
    pub rural_urban: Option<String>,
    /// Source type (exact, case-insensitive)
    pub source_type: Option<String>,
    /// Member card status (exact, case-insensitive)
    pub member_status: Option<String>,
    /// Family card status (exact, case-insensitive)
    pub family_status: Option<String>,
    /// Free text matched against member name or family identifier
    pub search: Option<String>,
}

/// Free-text search may carry names or identifiers, so its value is never printed
impl fmt::Debug for FilterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterSet")
            .field("block", &self.block)
            .field("village", &self.village)
            .field("rural_urban", &self.rural_urban)
            .field("source_type", &self.source_type)
            .field("member_status", &self.member_status)
            .field("family_status", &self.family_status)
            .field("search", &self.search.as_ref().map(|_| "***"))
            .finish()
    }
}

impl FilterSet {
    /// Names of the supplied criteria, without their values
    pub fn supplied_names(&self) -> Vec<&'static str> {
        self.supplied().map(|(name, _)| name).collect()
    }

    /// Iterate over `(criterion name, raw value)` for every criterion that was supplied
    pub fn supplied(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("block", &self.block),
            ("village", &self.village),
            ("rural_urban", &self.rural_urban),
            ("source_type", &self.source_type),
            ("member_status", &self.member_status),
            ("family_status", &self.family_status),
            ("search", &self.search),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_deref().map(|v| (name, v)))
    }

    /// Build the conjunction of all present criteria
    pub fn predicate(&self) -> Predicate {
        let mut predicate = Predicate::all();

        let exact = [
            (RecordField::Block, &self.block),
            (RecordField::RuralUrban, &self.rural_urban),
            (RecordField::SourceType, &self.source_type),
            (RecordField::MemberCardStatus, &self.member_status),
            (RecordField::FamilyCardStatus, &self.family_status),
        ];
        for (field, value) in exact {
            if let Some(value) = criterion(value) {
                predicate = predicate.and(Condition::Equals { field, value });
            }
        }

        if let Some(value) = criterion(&self.village) {
            predicate = predicate.and(Condition::Contains {
                field: RecordField::VillageCode,
                value,
            });
        }

        if let Some(value) = criterion(&self.search) {
            predicate = predicate.and(Condition::ContainsAny {
                fields: vec![RecordField::Name, RecordField::FamilyId],
                value,
            });
        }

        predicate
    }
}

/// Trimmed, case-folded criterion value; blank input means "no constraint"
fn criterion(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(fold_case)
}

/// A single conjunct. Values are stored already case-folded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// Field is present and equal to `value` after folding
    Equals { field: RecordField, value: String },
    /// Field is present and contains `value` after folding
    Contains { field: RecordField, value: String },
    /// At least one of `fields` is present and contains `value` after folding
    ContainsAny {
        fields: Vec<RecordField>,
        value: String,
    },
}

impl Condition {
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Self::Equals { field, value } => {
                folded(record, *field).is_some_and(|v| v == *value)
            }
            Self::Contains { field, value } => {
                folded(record, *field).is_some_and(|v| v.contains(value.as_str()))
            }
            Self::ContainsAny { fields, value } => fields.iter().any(|field| {
                folded(record, *field).is_some_and(|v| v.contains(value.as_str()))
            }),
        }
    }
}

fn folded(record: &Record, field: RecordField) -> Option<String> {
    record
        .get(field)
        .filter(|v| !v.is_empty())
        .map(fold_case)
}

/// Conjunction of conditions over records. An empty predicate matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Predicate {
    conditions: Vec<Condition>,
}

impl Predicate {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn and(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.conditions.iter().all(|c| c.matches(record))
    }

    /// Narrow to members whose card status is approved
    pub fn approved(self) -> Self {
        self.and(Condition::Equals {
            field: RecordField::MemberCardStatus,
            value: APPROVED_STATUS.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(block: &str, village: &str, name: &str, family: &str) -> Record {
        Record {
            family_id: Some(family.to_string()),
            name: Some(name.to_string()),
            block: Some(block.to_string()),
            village_code: Some(village.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_filter_set_matches_everything() {
        let predicate = FilterSet::default().predicate();
        assert!(predicate.is_empty());
        assert!(predicate.matches(&Record::default()));
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let filters = FilterSet {
            block: Some("   ".to_string()),
            village: Some(String::new()),
            search: Some("\t".to_string()),
            ..Default::default()
        };
        assert!(filters.predicate().is_empty());
    }

    #[test]
    fn test_block_match_is_case_insensitive_and_exact() {
        let r = record("Agra", "100", "Ram", "F1");

        let lower = FilterSet {
            block: Some("agra".to_string()),
            ..Default::default()
        };
        let upper = FilterSet {
            block: Some("AGRA".to_string()),
            ..Default::default()
        };
        let partial = FilterSet {
            block: Some("agr".to_string()),
            ..Default::default()
        };

        assert!(lower.predicate().matches(&r));
        assert!(upper.predicate().matches(&r));
        assert!(!partial.predicate().matches(&r));
    }

    #[test]
    fn test_village_is_substring_match() {
        let filters = FilterSet {
            village: Some("123".to_string()),
            ..Default::default()
        };
        let predicate = filters.predicate();

        assert!(predicate.matches(&record("A", "123999", "x", "F")));
        assert!(predicate.matches(&record("A", "999123", "x", "F")));
        assert!(predicate.matches(&record("A", "91239", "x", "F")));
        assert!(!predicate.matches(&record("A", "12-3", "x", "F")));
    }

    #[test]
    fn test_search_matches_name_or_family_id() {
        let filters = FilterSet {
            search: Some("  devi ".to_string()),
            ..Default::default()
        };
        let predicate = filters.predicate();

        assert!(predicate.matches(&record("A", "1", "Sita Devi", "F9")));
        assert!(predicate.matches(&record("A", "1", "Ram", "DEVI-77")));
        assert!(!predicate.matches(&record("A", "1", "Ram", "F9")));
        assert!(!predicate.matches(&Record::default()));
    }

    #[test]
    fn test_null_field_never_matches_exact_criterion() {
        let filters = FilterSet {
            member_status: Some("approved".to_string()),
            ..Default::default()
        };
        assert!(!filters.predicate().matches(&Record::default()));
    }

    #[test]
    fn test_criteria_combine_with_and() {
        let filters = FilterSet {
            block: Some("Agra".to_string()),
            village: Some("12".to_string()),
            ..Default::default()
        };
        let predicate = filters.predicate();

        assert_eq!(predicate.conditions().len(), 2);
        assert!(predicate.matches(&record("agra", "512", "x", "F")));
        assert!(!predicate.matches(&record("agra", "999", "x", "F")));
        assert!(!predicate.matches(&record("etmadpur", "512", "x", "F")));
    }

    #[test]
    fn test_approved_narrows_predicate() {
        let approved = Record {
            member_card_status: Some("Approved".to_string()),
            ..Default::default()
        };
        let pending = Record {
            member_card_status: Some("Pending".to_string()),
            ..Default::default()
        };

        let predicate = Predicate::all().approved();
        assert!(predicate.matches(&approved));
        assert!(!predicate.matches(&pending));
    }

    #[test]
    fn test_debug_output_masks_search_term() {
        let filters = FilterSet {
            block: Some("Agra".to_string()),
            search: Some("SitaDeviAadhaar".to_string()),
            ..Default::default()
        };
        let printed = format!("{:?}", filters);

        assert!(printed.contains("Agra"));
        assert!(printed.contains("search: Some(\"***\")"));
        assert!(!printed.contains("SitaDeviAadhaar"));
        assert_eq!(filters.supplied_names(), vec!["block", "search"]);
    }

    #[test]
    fn test_surrounding_whitespace_is_trimmed_from_every_criterion() {
        let r = record("AGRA", "120034", "Sita Devi", "F1");
        let filters = FilterSet {
            block: Some(" agra ".to_string()),
            village: Some("\t0034 ".to_string()),
            search: Some(" sita ".to_string()),
            ..Default::default()
        };
        let predicate = filters.predicate();

        assert_eq!(
            predicate.conditions()[0],
            Condition::Equals {
                field: RecordField::Block,
                value: "AGRA".to_string(),
            }
        );
        assert!(predicate.matches(&r));
    }

    #[test]
    fn test_supplied_lists_raw_values() {
        let filters = FilterSet {
            block: Some("Agra".to_string()),
            search: Some("x".to_string()),
            ..Default::default()
        };
        let supplied: Vec<_> = filters.supplied().collect();
        assert_eq!(supplied, vec![("block", "Agra"), ("search", "x")]);
    }
}
