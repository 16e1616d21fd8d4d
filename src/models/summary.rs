use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Aggregate counts over one filtered record set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Summary {
    /// Matching records
    pub total_members: u64,
    /// Distinct non-empty family identifiers among matching records
    pub total_families: u64,
    /// Matching records whose member card status is "Approved"
    pub covered_members: u64,
    /// Distinct families with at least one approved matching member
    pub covered_families: u64,
}
