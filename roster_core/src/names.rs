use log::debug;

use crate::config::{ImportRules, VoterRecord};

/// Rejects name-like values that look like booth, area or other
/// administrative text rather than the name of a person.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct NameFilter {
    indicators: Vec<String>,
}

impl NameFilter {
    pub fn new(indicators: &[String]) -> NameFilter {
        let mut lowered: Vec<String> = Vec::new();
        for ind in indicators.iter().map(|s| s.to_lowercase()) {
            if !ind.trim().is_empty() && !lowered.contains(&ind) {
                lowered.push(ind);
            }
        }
        NameFilter { indicators: lowered }
    }

    pub fn from_rules(rules: &ImportRules) -> NameFilter {
        NameFilter::new(&rules.non_person_indicators)
    }

    pub fn indicators(&self) -> &[String] {
        &self.indicators
    }

    /// The first indicator found in the text, if any.
    pub fn indicator_in(&self, text: &str) -> Option<&str> {
        let lowered = text.trim().to_lowercase();
        self.indicators
            .iter()
            .find(|ind| lowered.contains(ind.as_str()))
            .map(|s| s.as_str())
    }

    pub fn looks_like_person(&self, text: &str) -> bool {
        self.indicator_in(text).is_none()
    }

    /// Keeps the value only if it passes the filter.
    pub fn accept(&self, value: Option<String>) -> Option<String> {
        match value {
            Some(s) => match self.indicator_in(&s) {
                Some(ind) => {
                    debug!("accept: dropping {:?}: contains {:?}", s, ind);
                    None
                }
                None => Some(s),
            },
            None => None,
        }
    }

    /// Joins the name parts that pass the filter, in order.
    pub fn derive_full_name(&self, parts: &[Option<&str>]) -> Option<String> {
        let kept: Vec<&str> = parts
            .iter()
            .flatten()
            .filter(|s| !s.is_empty() && self.looks_like_person(s))
            .cloned()
            .collect();
        if kept.is_empty() {
            None
        } else {
            Some(kept.join(" "))
        }
    }

    /// The most complete name available for a voter.
    pub fn display_name(&self, voter: &VoterRecord) -> String {
        let usable = |o: &Option<String>| -> Option<String> {
            o.as_ref()
                .filter(|s| !s.is_empty() && self.looks_like_person(s))
                .cloned()
        };
        match (
            usable(&voter.full_name),
            usable(&voter.first_name),
            usable(&voter.surname),
        ) {
            (Some(full), _, _) => full,
            (None, Some(first), Some(last)) => format!("{} {}", first, last),
            (None, Some(first), None) => first,
            (None, None, Some(last)) => last,
            (None, None, None) => format!("Voter {}", voter.voter_id),
        }
    }
}

impl Default for NameFilter {
    fn default() -> Self {
        NameFilter::from_rules(&ImportRules::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_administrative_text() {
        let f = NameFilter::default();
        assert!(f.looks_like_person("RAM SHARMA"));
        assert!(!f.looks_like_person("Booth 12"));
        assert!(!f.looks_like_person("YADIBHAG 3"));
        assert!(!f.looks_like_person("बूथ क्र. 5"));
        assert!(!f.looks_like_person("Ward: 4"));
        assert_eq!(f.indicator_in("  NOT KNOWN "), Some("no"));
    }

    #[test]
    fn accepted_values_never_carry_indicators() {
        let f = NameFilter::default();
        let inputs = ["Sunita", "booth no 4", "टेल्को कॉलनी", "Ganesh", "Yadi 7", ""];
        for s in inputs.iter() {
            if let Some(kept) = f.accept(Some(s.to_string())) {
                assert!(f.indicators().iter().all(|ind| !kept.to_lowercase().contains(ind)));
            }
        }
        assert_eq!(f.accept(None), None);
    }

    #[test]
    fn indicators_are_deduplicated_and_lowercased() {
        let f = NameFilter::new(&["Booth".to_string(), "booth".to_string(), " ".to_string()]);
        assert_eq!(f.indicators(), &["booth".to_string()]);
    }

    #[test]
    fn derived_full_name_skips_rejected_parts() {
        let f = NameFilter::default();
        assert_eq!(
            f.derive_full_name(&[Some("RAM SHARMA"), Some("KUMAR"), Some("SHARMA")]),
            Some("RAM SHARMA KUMAR SHARMA".to_string())
        );
        assert_eq!(
            f.derive_full_name(&[Some("Booth 1"), None, Some("PATIL")]),
            Some("PATIL".to_string())
        );
        assert_eq!(f.derive_full_name(&[None, Some("booth"), None]), None);
    }

    #[test]
    fn display_name_prefers_full_name() {
        let f = NameFilter::default();
        let mut v = VoterRecord::new("V1");
        assert_eq!(f.display_name(&v), "Voter V1");
        v.surname = Some("PATIL".to_string());
        assert_eq!(f.display_name(&v), "PATIL");
        v.first_name = Some("ASHA".to_string());
        assert_eq!(f.display_name(&v), "ASHA PATIL");
        v.full_name = Some("Booth 3".to_string());
        assert_eq!(f.display_name(&v), "ASHA PATIL");
        v.full_name = Some("ASHA RAVI PATIL".to_string());
        assert_eq!(f.display_name(&v), "ASHA RAVI PATIL");
    }
}
