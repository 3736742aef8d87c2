use crate::config::{FieldId, VoterRecord};

/// The maximum number of records returned by a search.
pub const RESULT_LIMIT: usize = 100;

/// Fields covered by the general search term.
const GENERAL_FIELDS: [FieldId; 7] = [
    FieldId::VoterId,
    FieldId::FullName,
    FieldId::MobileNo,
    FieldId::YadibhagNo,
    FieldId::YadibhagName,
    FieldId::VoterSrno,
    FieldId::Karyakarta,
];

/// A voter search. A record matches when any of the given terms matches
/// (the terms are OR-ed). An empty query matches every record.
///
/// `voter_id` and `voting_card_no` match exactly, `booth_no` and `age`
/// numerically, the other terms as case-insensitive substrings.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct SearchQuery {
    pub query: Option<String>,
    pub voter_id: Option<String>,
    pub full_name: Option<String>,
    pub booth_no: Option<u32>,
    pub mobile_no: Option<String>,
    pub yadibhag_no: Option<String>,
    pub yadibhag_name: Option<String>,
    pub voter_srno: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub voting_card_no: Option<String>,
    pub karyakarta: Option<String>,
}

fn term(o: &Option<String>) -> Option<&str> {
    o.as_deref().map(|s| s.trim()).filter(|s| !s.is_empty())
}

fn contains_ci(value: &Option<String>, needle: &str) -> bool {
    value
        .as_deref()
        .map_or(false, |v| v.to_lowercase().contains(&needle.to_lowercase()))
}

impl SearchQuery {
    pub fn general(q: &str) -> SearchQuery {
        SearchQuery {
            query: Some(q.to_string()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        term(&self.query).is_none()
            && term(&self.voter_id).is_none()
            && term(&self.full_name).is_none()
            && self.booth_no.is_none()
            && term(&self.mobile_no).is_none()
            && term(&self.yadibhag_no).is_none()
            && term(&self.yadibhag_name).is_none()
            && term(&self.voter_srno).is_none()
            && self.age.is_none()
            && term(&self.gender).is_none()
            && term(&self.voting_card_no).is_none()
            && term(&self.karyakarta).is_none()
    }

    pub fn matches(&self, v: &VoterRecord) -> bool {
        if self.is_empty() {
            return true;
        }
        let substring_terms = [
            (&self.full_name, &v.full_name),
            (&self.mobile_no, &v.mobile_no),
            (&self.yadibhag_no, &v.yadibhag_no),
            (&self.yadibhag_name, &v.yadibhag_name),
            (&self.voter_srno, &v.voter_srno),
            (&self.gender, &v.gender),
            (&self.karyakarta, &v.karyakarta),
        ];

        term(&self.voter_id).map_or(false, |t| v.voter_id == t)
            || term(&self.voting_card_no).map_or(false, |t| v.voting_card_no.as_deref() == Some(t))
            || self.booth_no.map_or(false, |b| v.booth_no == Some(b))
            || self.age.map_or(false, |a| v.age == Some(a))
            || substring_terms
                .iter()
                .any(|(q, value)| term(q).map_or(false, |t| contains_ci(value, t)))
            || term(&self.query).map_or(false, |t| {
                GENERAL_FIELDS
                    .iter()
                    .any(|f| contains_ci(&v.text(*f), t))
            })
    }

    /// Orders the hits by full name, unnamed records last, and applies the
    /// result limit.
    pub fn finish(&self, mut hits: Vec<VoterRecord>) -> Vec<VoterRecord> {
        hits.sort_by(|a, b| {
            let key = |v: &VoterRecord| (v.full_name.is_none(), v.full_name.clone());
            key(a).cmp(&key(b)).then_with(|| a.voter_id.cmp(&b.voter_id))
        });
        hits.truncate(RESULT_LIMIT);
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voter(id: &str, name: Option<&str>) -> VoterRecord {
        let mut v = VoterRecord::new(id);
        v.full_name = name.map(|s| s.to_string());
        v
    }

    fn roster() -> Vec<VoterRecord> {
        let mut a = voter("MH001", Some("Asha Patil"));
        a.booth_no = Some(4);
        a.mobile_no = Some("9876500001".to_string());
        a.voting_card_no = Some("XYZ123".to_string());
        let mut b = voter("MH002", Some("Ravi Kulkarni"));
        b.booth_no = Some(7);
        b.age = Some(41);
        b.karyakarta = Some("Sunil".to_string());
        let mut c = voter("MH010", None);
        c.yadibhag_name = Some("Shivaji Nagar".to_string());
        vec![a, b, c]
    }

    fn run(q: &SearchQuery) -> Vec<String> {
        let hits: Vec<VoterRecord> = roster().into_iter().filter(|v| q.matches(v)).collect();
        q.finish(hits).into_iter().map(|v| v.voter_id).collect()
    }

    #[test]
    fn empty_query_returns_all_sorted() {
        let q = SearchQuery::default();
        assert!(q.is_empty());
        assert_eq!(run(&q), vec!["MH001", "MH002", "MH010"]);
        let blank = SearchQuery::general("   ");
        assert!(blank.is_empty());
    }

    #[test]
    fn exact_and_numeric_terms() {
        let q = SearchQuery {
            voter_id: Some("MH00".to_string()),
            ..Default::default()
        };
        assert!(run(&q).is_empty());
        let q = SearchQuery {
            voter_id: Some("MH002".to_string()),
            ..Default::default()
        };
        assert_eq!(run(&q), vec!["MH002"]);
        let q = SearchQuery {
            booth_no: Some(4),
            ..Default::default()
        };
        assert_eq!(run(&q), vec!["MH001"]);
        let q = SearchQuery {
            voting_card_no: Some("xyz123".to_string()),
            ..Default::default()
        };
        assert!(run(&q).is_empty());
    }

    #[test]
    fn terms_are_ored() {
        let q = SearchQuery {
            age: Some(41),
            yadibhag_name: Some("shivaji".to_string()),
            ..Default::default()
        };
        assert_eq!(run(&q), vec!["MH002", "MH010"]);
    }

    #[test]
    fn general_term_spans_fields() {
        assert_eq!(run(&SearchQuery::general("patil")), vec!["MH001"]);
        assert_eq!(run(&SearchQuery::general("MH0")), vec!["MH001", "MH002", "MH010"]);
        assert_eq!(run(&SearchQuery::general("sunil")), vec!["MH002"]);
        assert_eq!(run(&SearchQuery::general("nagar")), vec!["MH010"]);
        // Gender is not part of the general search.
        let mut v = voter("MH099", None);
        v.gender = Some("F".to_string());
        assert!(!SearchQuery::general("f").matches(&v));
    }

    #[test]
    fn results_are_limited() {
        let q = SearchQuery::default();
        let many: Vec<VoterRecord> = (0..250).map(|i| voter(&format!("V{:04}", i), None)).collect();
        let res = q.finish(many);
        assert_eq!(res.len(), RESULT_LIMIT);
        assert_eq!(res[0].voter_id, "V0000");
    }
}
