// ********* Input data structures ***********

use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The semantic fields a spreadsheet column can be mapped to.
///
/// The declaration order is the catalog order: when a header could match
/// several fields, the earliest field wins.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldId {
    VoterId,
    BoothNo,
    FirstName,
    FatherName,
    Surname,
    FullName,
    MobileNo,
    YadibhagNo,
    YadibhagName,
    VoterSrno,
    Age,
    Gender,
    VotingCardNo,
    Karyakarta,
}

impl FieldId {
    pub const ALL: [FieldId; 14] = [
        FieldId::VoterId,
        FieldId::BoothNo,
        FieldId::FirstName,
        FieldId::FatherName,
        FieldId::Surname,
        FieldId::FullName,
        FieldId::MobileNo,
        FieldId::YadibhagNo,
        FieldId::YadibhagName,
        FieldId::VoterSrno,
        FieldId::Age,
        FieldId::Gender,
        FieldId::VotingCardNo,
        FieldId::Karyakarta,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FieldId::VoterId => "voter_id",
            FieldId::BoothNo => "booth_no",
            FieldId::FirstName => "first_name",
            FieldId::FatherName => "father_name",
            FieldId::Surname => "surname",
            FieldId::FullName => "full_name",
            FieldId::MobileNo => "mobile_no",
            FieldId::YadibhagNo => "yadibhag_no",
            FieldId::YadibhagName => "yadibhag_name",
            FieldId::VoterSrno => "voter_srno",
            FieldId::Age => "age",
            FieldId::Gender => "gender",
            FieldId::VotingCardNo => "voting_card_no",
            FieldId::Karyakarta => "karyakarta",
        }
    }

    /// Fields stored as integers. Values that do not parse are dropped.
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldId::BoothNo | FieldId::Age)
    }

    /// Fields checked against the non-person indicators.
    pub fn is_name_like(&self) -> bool {
        matches!(
            self,
            FieldId::FirstName
                | FieldId::FatherName
                | FieldId::Surname
                | FieldId::FullName
                | FieldId::YadibhagName
        )
    }
}

impl Display for FieldId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A single value read from a spreadsheet.
///
/// The readers convert their own cell representation into this one so that
/// the normalizer does not depend on any file format.
#[derive(PartialEq, Debug, Clone)]
pub enum Cell {
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl From<&str> for Cell {
    fn from(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Cell {
        Cell::Text(s)
    }
}

impl From<i64> for Cell {
    fn from(i: i64) -> Cell {
        Cell::Int(i)
    }
}

impl From<f64> for Cell {
    fn from(f: f64) -> Cell {
        Cell::Float(f)
    }
}

// ******** Voter records *********

/// A star rating between 0 (not rated) and 5.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct StarRating(u8);

impl StarRating {
    pub const NONE: StarRating = StarRating(0);
    pub const MAX: StarRating = StarRating(5);

    pub fn new(value: u8) -> Option<StarRating> {
        if value <= StarRating::MAX.0 {
            Some(StarRating(value))
        } else {
            None
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn is_rated(&self) -> bool {
        self.0 > 0
    }

    /// The rating as a row of stars, empty when not rated.
    pub fn stars(&self) -> String {
        "★".repeat(self.0 as usize)
    }
}

impl TryFrom<u8> for StarRating {
    type Error = String;
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        StarRating::new(value).ok_or_else(|| format!("star rating {} is above 5", value))
    }
}

impl From<StarRating> for u8 {
    fn from(r: StarRating) -> u8 {
        r.0
    }
}

impl Display for StarRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One voter, as stored.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct VoterRecord {
    pub voter_id: String,
    pub booth_no: Option<u32>,
    pub first_name: Option<String>,
    pub father_name: Option<String>,
    pub surname: Option<String>,
    pub full_name: Option<String>,
    pub mobile_no: Option<String>,
    pub yadibhag_no: Option<String>,
    pub yadibhag_name: Option<String>,
    pub voter_srno: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub voting_card_no: Option<String>,
    pub karyakarta: Option<String>,
    #[serde(default)]
    pub star_rating: StarRating,
}

impl VoterRecord {
    pub fn new(voter_id: &str) -> VoterRecord {
        VoterRecord {
            voter_id: voter_id.to_string(),
            ..Default::default()
        }
    }

    /// The textual value of a field, numbers included.
    pub fn text(&self, field: FieldId) -> Option<String> {
        match field {
            FieldId::VoterId => Some(self.voter_id.clone()),
            FieldId::BoothNo => self.booth_no.map(|x| x.to_string()),
            FieldId::Age => self.age.map(|x| x.to_string()),
            _ => self.text_slot(field).and_then(|s| s.clone()),
        }
    }

    pub(crate) fn text_slot(&self, field: FieldId) -> Option<&Option<String>> {
        match field {
            FieldId::FirstName => Some(&self.first_name),
            FieldId::FatherName => Some(&self.father_name),
            FieldId::Surname => Some(&self.surname),
            FieldId::FullName => Some(&self.full_name),
            FieldId::MobileNo => Some(&self.mobile_no),
            FieldId::YadibhagNo => Some(&self.yadibhag_no),
            FieldId::YadibhagName => Some(&self.yadibhag_name),
            FieldId::VoterSrno => Some(&self.voter_srno),
            FieldId::Gender => Some(&self.gender),
            FieldId::VotingCardNo => Some(&self.voting_card_no),
            FieldId::Karyakarta => Some(&self.karyakarta),
            FieldId::VoterId | FieldId::BoothNo | FieldId::Age => None,
        }
    }

    pub(crate) fn text_slot_mut(&mut self, field: FieldId) -> Option<&mut Option<String>> {
        match field {
            FieldId::FirstName => Some(&mut self.first_name),
            FieldId::FatherName => Some(&mut self.father_name),
            FieldId::Surname => Some(&mut self.surname),
            FieldId::FullName => Some(&mut self.full_name),
            FieldId::MobileNo => Some(&mut self.mobile_no),
            FieldId::YadibhagNo => Some(&mut self.yadibhag_no),
            FieldId::YadibhagName => Some(&mut self.yadibhag_name),
            FieldId::VoterSrno => Some(&mut self.voter_srno),
            FieldId::Gender => Some(&mut self.gender),
            FieldId::VotingCardNo => Some(&mut self.voting_card_no),
            FieldId::Karyakarta => Some(&mut self.karyakarta),
            FieldId::VoterId | FieldId::BoothNo | FieldId::Age => None,
        }
    }
}

// ******** Audit log *********

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RatingAction {
    Add,
    Edit,
    Delete,
}

impl Display for RatingAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RatingAction::Add => "ADD",
            RatingAction::Edit => "EDIT",
            RatingAction::Delete => "DELETE",
        };
        write!(f, "{}", s)
    }
}

/// One entry of the rating audit log. Entries are only ever appended.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RatingChange {
    pub voter_id: String,
    pub actor: String,
    pub action: RatingAction,
    pub old_rating: StarRating,
    pub new_rating: StarRating,
    pub timestamp: DateTime<Utc>,
}

// ******** Users *********

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Main,
    Sub,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Main => write!(f, "main"),
            Role::Sub => write!(f, "sub"),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: &str, role: Role) -> User {
        User {
            username: username.to_string(),
            role,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}

// ********* Import configuration **********

/// What to do with a row that cannot produce a record (missing voter id).
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum RowFailurePolicy {
    /// Reject the row, report it in the summary and keep going.
    Skip,
    /// Fail the whole batch. Nothing gets persisted.
    Abort,
}

/// Text fragments that mark a value as a booth, area or other
/// administrative label rather than the name of a person.
pub const DEFAULT_NON_PERSON_INDICATORS: &[&str] = &[
    "booth",
    "बूथ",
    "जाहीर",
    "nahi",
    "no",
    "not",
    "yadibhag",
    "yadi",
    "bhag",
    ":",
    "टेल्को",
    "कपूर",
    "से.क्र",
    "सेन्ट",
    "उर्सल",
    "स्कुल",
    "लोकम",
    "टेतको",
];

/// Cell contents that mean "no value", compared case-insensitively.
pub const DEFAULT_PLACEHOLDERS: &[&str] = &["nan", "none", "null", "n/a"];

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ImportRules {
    pub row_failure_policy: RowFailurePolicy,
    pub non_person_indicators: Vec<String>,
    pub placeholders: Vec<String>,
}

impl Default for ImportRules {
    fn default() -> Self {
        ImportRules {
            row_failure_policy: RowFailurePolicy::Skip,
            non_person_indicators: DEFAULT_NON_PERSON_INDICATORS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            placeholders: DEFAULT_PLACEHOLDERS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

// ******** Output data structures *********

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RowRejection {
    /// 1-based position of the row among the data rows.
    pub row: usize,
    pub reason: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct ImportSummary {
    pub total_rows: usize,
    pub added: usize,
    pub skipped_duplicates: Vec<String>,
    pub rejected: Vec<RowRejection>,
    /// (header, field) pairs, in header order.
    pub mapping: Vec<(String, FieldId)>,
}
