use serde::{Deserialize, Serialize};
use serde_json::Value;
#[cfg(feature = "postgres")]
use sqlx::FromRow;
use utoipa::ToSchema;

/// Column-name keyed projection of a record, in storage column order
pub type FieldMap = serde_json::Map<String, Value>;

/// One family member's beneficiary entry
///
/// Every attribute is nullable text. Members of the same family share `family_id`;
/// `member_id` is unique per record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "postgres", derive(FromRow))]
pub struct Record {
    #[cfg_attr(feature = "postgres", sqlx(rename = "src_family_id"))]
    pub family_id: Option<String>,
    #[cfg_attr(feature = "postgres", sqlx(rename = "src_member_id"))]
    pub member_id: Option<String>,
    pub name: Option<String>,
    pub relation: Option<String>,
    #[cfg_attr(feature = "postgres", sqlx(rename = "father_guardian_name"))]
    pub guardian_name: Option<String>,
    #[cfg_attr(feature = "postgres", sqlx(rename = "rural_urban_flag"))]
    pub rural_urban: Option<String>,
    #[cfg_attr(feature = "postgres", sqlx(rename = "district_name"))]
    pub district: Option<String>,
    #[cfg_attr(feature = "postgres", sqlx(rename = "blockname"))]
    pub block: Option<String>,
    pub source_address: Option<String>,
    #[cfg_attr(feature = "postgres", sqlx(rename = "addressasperadhaarofapproved"))]
    pub approved_address: Option<String>,
    #[cfg_attr(feature = "postgres", sqlx(rename = "village_ward_lgd_code"))]
    pub village_code: Option<String>,
    pub source_type: Option<String>,
    #[cfg_attr(feature = "postgres", sqlx(rename = "card_status_member"))]
    pub member_card_status: Option<String>,
    #[cfg_attr(feature = "postgres", sqlx(rename = "card_status_family"))]
    pub family_card_status: Option<String>,
    #[cfg_attr(feature = "postgres", sqlx(rename = "memberbelongtozeropovery"))]
    pub zero_poverty_member: Option<String>,
}

/// Addressable record attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordField {
    FamilyId,
    MemberId,
    Name,
    Relation,
    GuardianName,
    RuralUrban,
    District,
    Block,
    SourceAddress,
    ApprovedAddress,
    VillageCode,
    SourceType,
    MemberCardStatus,
    FamilyCardStatus,
    ZeroPovertyMember,
}

impl RecordField {
    /// All fields in storage column order
    pub const ALL: [RecordField; 15] = [
        RecordField::FamilyId,
        RecordField::MemberId,
        RecordField::Name,
        RecordField::Relation,
        RecordField::GuardianName,
        RecordField::RuralUrban,
        RecordField::District,
        RecordField::Block,
        RecordField::SourceAddress,
        RecordField::ApprovedAddress,
        RecordField::VillageCode,
        RecordField::SourceType,
        RecordField::MemberCardStatus,
        RecordField::FamilyCardStatus,
        RecordField::ZeroPovertyMember,
    ];

    /// Column name in the backing table, also used as the field-map key
    pub fn column(self) -> &'static str {
        match self {
            Self::FamilyId => "src_family_id",
            Self::MemberId => "src_member_id",
            Self::Name => "name",
            Self::Relation => "relation",
            Self::GuardianName => "father_guardian_name",
            Self::RuralUrban => "rural_urban_flag",
            Self::District => "district_name",
            Self::Block => "blockname",
            Self::SourceAddress => "source_address",
            Self::ApprovedAddress => "addressasperadhaarofapproved",
            Self::VillageCode => "village_ward_lgd_code",
            Self::SourceType => "source_type",
            Self::MemberCardStatus => "card_status_member",
            Self::FamilyCardStatus => "card_status_family",
            Self::ZeroPovertyMember => "memberbelongtozeropovery",
        }
    }
}

impl Record {
    /// Borrow the value of a single attribute
    pub fn get(&self, field: RecordField) -> Option<&str> {
        let value = match field {
            RecordField::FamilyId => &self.family_id,
            RecordField::MemberId => &self.member_id,
            RecordField::Name => &self.name,
            RecordField::Relation => &self.relation,
            RecordField::GuardianName => &self.guardian_name,
            RecordField::RuralUrban => &self.rural_urban,
            RecordField::District => &self.district,
            RecordField::Block => &self.block,
            RecordField::SourceAddress => &self.source_address,
            RecordField::ApprovedAddress => &self.approved_address,
            RecordField::VillageCode => &self.village_code,
            RecordField::SourceType => &self.source_type,
            RecordField::MemberCardStatus => &self.member_card_status,
            RecordField::FamilyCardStatus => &self.family_card_status,
            RecordField::ZeroPovertyMember => &self.zero_poverty_member,
        };
        value.as_deref()
    }

    /// Display projection keyed by column name; absent values map to `null`
    pub fn into_field_map(self) -> FieldMap {
        RecordField::ALL
            .iter()
            .map(|&field| {
                let value = self
                    .get(field)
                    .map(|v| Value::String(v.to_string()))
                    .unwrap_or(Value::Null);
                (field.column().to_string(), value)
            })
            .collect()
    }
}
