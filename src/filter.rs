const DEFAULT_ALLOWED: [&str; 9] = [
    "data",
    "etl",
    "big data",
    "bi engineer",
    "bi developer",
    "business intelligence",
    "analytics engineer",
    "warehouse",
    "pipeline",
];

const DEFAULT_BLOCKED: [&str; 12] = [
    "senior",
    "sr.",
    "lead",
    "manager",
    "head of",
    "principal",
    "staff",
    "director",
    "architect",
    "sales",
    "marketing",
    "teacher",
];

/// Allow/block gate on posting titles. A title passes when it contains at
/// least one allowed term and no blocked term, case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelevanceFilter {
    allowed: Vec<String>,
    blocked: Vec<String>,
}

impl RelevanceFilter {
    pub fn new<A, B>(allowed: A, blocked: B) -> Self
    where
        A: IntoIterator,
        A::Item: AsRef<str>,
        B: IntoIterator,
        B::Item: AsRef<str>,
    {
        Self {
            allowed: normalize_terms(allowed),
            blocked: normalize_terms(blocked),
        }
    }

    pub fn is_relevant(&self, title: &str) -> bool {
        let title = title.to_lowercase();
        self.allowed.iter().any(|term| title.contains(term.as_str()))
            && !self.blocked.iter().any(|term| title.contains(term.as_str()))
    }

    pub fn allowed(&self) -> &[String] {
        &self.allowed
    }

    pub fn blocked(&self) -> &[String] {
        &self.blocked
    }
}

impl Default for RelevanceFilter {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWED, DEFAULT_BLOCKED)
    }
}

fn normalize_terms<I>(terms: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    terms
        .into_iter()
        .map(|term| term.as_ref().trim().to_lowercase())
        .filter(|term| !term.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn keeps_relevant_titles() {
        let filter = RelevanceFilter::default();
        assert!(filter.is_relevant("Data Engineer Intern"));
        assert!(filter.is_relevant("ETL Developer (Magang)"));
        assert!(filter.is_relevant("BI Engineer Internship"));
    }

    #[test]
    fn drops_blocked_or_unrelated_titles() {
        let filter = RelevanceFilter::default();
        assert!(!filter.is_relevant("Senior Data Engineer"));
        assert!(!filter.is_relevant("Data Engineering Lead"));
        assert!(!filter.is_relevant("Frontend Developer Intern"));
        assert!(!filter.is_relevant(""));
    }

    #[test]
    fn terms_are_normalized() {
        let filter = RelevanceFilter::new(["  DATA ", ""], ["Senior"]);
        assert_eq!(filter.allowed(), ["data"]);
        assert_eq!(filter.blocked(), ["senior"]);
        assert!(!filter.is_relevant("SENIOR data analyst"));
    }

    proptest! {
        #[test]
        fn filtering_is_idempotent_and_order_independent(
            titles in proptest::collection::vec(
                prop_oneof![
                    Just("Data Engineer Intern".to_string()),
                    Just("Senior Data Engineer".to_string()),
                    Just("ETL Developer".to_string()),
                    Just("Graphic Designer".to_string()),
                    "[a-zA-Z ]{0,24}",
                ],
                0..24,
            )
        ) {
            let filter = RelevanceFilter::default();
            let survivors: Vec<_> = titles.iter().filter(|t| filter.is_relevant(t)).cloned().collect();

            let again: Vec<_> = survivors.iter().filter(|t| filter.is_relevant(t)).cloned().collect();
            prop_assert_eq!(&again, &survivors);

            let mut reversed: Vec<_> = titles.iter().rev().filter(|t| filter.is_relevant(t)).cloned().collect();
            reversed.reverse();
            prop_assert_eq!(reversed, survivors);
        }
    }
}
