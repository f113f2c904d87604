use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for person name fields (first/last name).
    /// Letters from any script, with internal spaces, hyphens and apostrophes.
    /// - Valid: "Maria", "De Santis", "O'Brien", "Jean-Luc"
    /// - Invalid: "", " Maria", "x2", "name!"
    pub static ref PERSON_NAME_REGEX: Regex =
        Regex::new(r"^\p{L}[\p{L}' \-]*$").unwrap();

    /// Regex for external company names.
    /// Starts with a letter or digit; allows spaces and common punctuation.
    /// - Valid: "Enel X", "A2A S.p.A.", "Iren - Ambiente"
    /// - Invalid: "", " Enel", "&Co"
    pub static ref COMPANY_NAME_REGEX: Regex =
        Regex::new(r"^[\p{L}0-9][\p{L}0-9'&., \-]*$").unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_person_name_regex_valid() {
        assert!(PERSON_NAME_REGEX.is_match("Maria"));
        assert!(PERSON_NAME_REGEX.is_match("De Santis"));
        assert!(PERSON_NAME_REGEX.is_match("O'Brien"));
        assert!(PERSON_NAME_REGEX.is_match("Jean-Luc"));
        assert!(PERSON_NAME_REGEX.is_match("Ángela"));
    }

    #[test]
    fn test_person_name_regex_invalid() {
        assert!(!PERSON_NAME_REGEX.is_match("")); // empty
        assert!(!PERSON_NAME_REGEX.is_match(" Maria")); // leading space
        assert!(!PERSON_NAME_REGEX.is_match("x2")); // digit
        assert!(!PERSON_NAME_REGEX.is_match("name!")); // punctuation
        assert!(!PERSON_NAME_REGEX.is_match("-Luc")); // starts with hyphen
    }

    #[test]
    fn test_company_name_regex() {
        assert!(COMPANY_NAME_REGEX.is_match("Enel X"));
        assert!(COMPANY_NAME_REGEX.is_match("A2A S.p.A."));
        assert!(COMPANY_NAME_REGEX.is_match("Iren - Ambiente"));
        assert!(COMPANY_NAME_REGEX.is_match("3M Italia"));
        assert!(!COMPANY_NAME_REGEX.is_match(""));
        assert!(!COMPANY_NAME_REGEX.is_match(" Enel"));
        assert!(!COMPANY_NAME_REGEX.is_match("&Co"));
    }
}
