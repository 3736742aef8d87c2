use crate::config::FieldId;

/// Header keywords recognized for each field, in catalog order.
///
/// Keywords are lowercase. A header matches a field when its trimmed,
/// lowercased text equals one of the keywords or contains one of them.
pub const FIELD_CATALOG: [(FieldId, &[&str]); 14] = [
    (
        FieldId::VoterId,
        &[
            "voter",
            "id",
            "voterid",
            "voter_id",
            "voter id",
            "srno",
            "voter srno",
            "voter_srno",
            "votersrno",
            "voting card no",
            "voting card no.",
            "voting_card_no",
            "votingcardno",
        ],
    ),
    (
        FieldId::BoothNo,
        &["booth no.", "booth_no", "booth no", "boothno", "booth_no.", "booth"],
    ),
    (
        FieldId::FirstName,
        &["englishname", "english_name", "first", "first_name", "first name"],
    ),
    (
        FieldId::FatherName,
        &[
            "middle",
            "middle_name",
            "middle name",
            "father",
            "father_name",
            "father name",
        ],
    ),
    (
        FieldId::Surname,
        &["last name", "surname", "last", "last_name"],
    ),
    // A bare "name" column is deliberately absent: in voter lists it often
    // carries booth names.
    (
        FieldId::FullName,
        &["full name", "full_name", "fullname", "complete name"],
    ),
    (
        FieldId::MobileNo,
        &[
            "mobile no.",
            "mobile number",
            "phone",
            "mobile",
            "phone number",
            "mobile_no.",
            "mobile no",
            "mobile_no",
        ],
    ),
    (
        FieldId::YadibhagNo,
        &[
            "yadibhag no",
            "yadibhag_no",
            "yadibhag no.",
            "yadibhag",
            "yadi no",
            "yadi_no",
        ],
    ),
    (
        FieldId::YadibhagName,
        &[
            "yadibhag name",
            "yadibhag_name",
            "yadibhagname",
            "yadi name",
            "yadi_name",
        ],
    ),
    (
        FieldId::VoterSrno,
        &[
            "voter srno",
            "voter_srno",
            "voter serial",
            "voter_serial",
            "votersrno",
            "serial no",
            "serial_no",
        ],
    ),
    (FieldId::Age, &["age"]),
    (FieldId::Gender, &["gender"]),
    (
        FieldId::VotingCardNo,
        &[
            "voting card no.",
            "voting card no",
            "voting_card_no",
            "votingcardno",
            "voting card",
            "card no",
        ],
    ),
    (FieldId::Karyakarta, &["karyakarta"]),
];

/// The keywords of a single field.
pub fn keywords(field: FieldId) -> &'static [&'static str] {
    FIELD_CATALOG
        .iter()
        .find(|(f, _)| *f == field)
        .map(|(_, kws)| *kws)
        .unwrap_or(&[])
}

/// Trims and lowercases a header so that it can be compared to the keywords.
pub fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase()
}

/// True if the normalized header is one of the keywords or contains one.
pub fn header_matches(normalized: &str, keywords: &[&str]) -> bool {
    keywords
        .iter()
        .any(|kw| normalized == *kw || normalized.contains(kw))
}

/// True if the normalized header is exactly one of the keywords.
pub fn header_is_keyword(normalized: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| normalized == *kw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_follows_field_order() {
        let fields: Vec<FieldId> = FIELD_CATALOG.iter().map(|(f, _)| *f).collect();
        assert_eq!(fields, FieldId::ALL.to_vec());
    }

    #[test]
    fn keywords_are_lowercase() {
        for (field, kws) in FIELD_CATALOG.iter() {
            assert!(!kws.is_empty(), "no keywords for {}", field);
            for kw in kws.iter() {
                assert_eq!(kw.to_lowercase(), *kw);
            }
        }
    }

    #[test]
    fn substring_and_exact_matches() {
        let h = normalize_header("  Booth No. ");
        assert_eq!(h, "booth no.");
        assert!(header_matches(&h, keywords(FieldId::BoothNo)));
        assert!(header_is_keyword(&h, keywords(FieldId::BoothNo)));

        let h = normalize_header("Booth Number (Ward)");
        assert!(header_matches(&h, keywords(FieldId::BoothNo)));
        assert!(!header_is_keyword(&h, keywords(FieldId::BoothNo)));

        assert!(!header_matches("name", keywords(FieldId::FullName)));
    }
}
