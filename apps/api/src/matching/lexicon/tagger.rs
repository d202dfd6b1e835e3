//! Suffix-driven part-of-speech tagger.
//!
//! Context-free: a token always receives the same tag, whichever document it
//! appears in. Emits Penn Treebank tags so callers can map them the usual way.

/// Nouns ending in `-ing` that would otherwise be tagged as gerunds.
const ING_NOUNS: &[&str] = &[
    "accounting",
    "advertising",
    "anything",
    "banking",
    "bookkeeping",
    "branding",
    "budgeting",
    "clothing",
    "computing",
    "consulting",
    "engineering",
    "evening",
    "everything",
    "funding",
    "housing",
    "learning",
    "manufacturing",
    "marketing",
    "meeting",
    "modeling",
    "modelling",
    "morning",
    "networking",
    "nothing",
    "nursing",
    "offering",
    "onboarding",
    "outsourcing",
    "programming",
    "recruiting",
    "scheduling",
    "setting",
    "shipping",
    "something",
    "spring",
    "staffing",
    "string",
    "thing",
    "training",
    "understanding",
    "warehousing",
    "wedding",
];

/// Words ending in `-ed` that are not past-tense verbs.
const ED_NON_VERBS: &[&str] = &["embed", "hundred", "shed"];

const ADJECTIVE_SUFFIXES: &[&str] = &["ous", "ful", "ive", "able", "ible", "ical", "less", "ish"];

/// Tags a single lower-cased token.
pub fn tag_token(token: &str) -> &'static str {
    if token.chars().all(|c| !c.is_alphabetic()) {
        return "CD";
    }
    if !token.chars().all(|c| c.is_ascii_alphabetic()) {
        // node.js, c++, ci-cd: technical identifiers stay as-is
        return "NN";
    }

    let len = token.len();

    if token.ends_with("ing") && len >= 5 {
        return if ING_NOUNS.contains(&token) { "NN" } else { "VBG" };
    }
    if token.ends_with("ed")
        && len >= 4
        && !token.ends_with("eed")
        && !ED_NON_VERBS.contains(&token)
    {
        return "VBD";
    }
    if token.ends_with("ly") && len >= 5 {
        return "RB";
    }
    if ADJECTIVE_SUFFIXES
        .iter()
        .any(|suffix| token.ends_with(suffix) && len >= suffix.len() + 3)
    {
        return "JJ";
    }

    if is_plural_shaped(token) {
        return "NNS";
    }

    "NN"
}

/// Tags every token of a sequence.
pub fn tag_tokens(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(|t| tag_token(t).to_string()).collect()
}

/// Ends in `s` the way regular plurals do (not `-ss`, `-us`, `-is`, `-os`).
pub(crate) fn is_plural_shaped(token: &str) -> bool {
    token.len() >= 4
        && token.ends_with('s')
        && !["ss", "us", "is", "os"].iter().any(|s| token.ends_with(s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gerund_tagged_as_verb() {
        assert_eq!(tag_token("building"), "VBG");
        assert_eq!(tag_token("looking"), "VBG");
    }

    #[test]
    fn test_ing_noun_stays_noun() {
        assert_eq!(tag_token("engineering"), "NN");
        assert_eq!(tag_token("marketing"), "NN");
    }

    #[test]
    fn test_past_tense_and_adverb() {
        assert_eq!(tag_token("managed"), "VBD");
        assert_eq!(tag_token("quickly"), "RB");
    }

    #[test]
    fn test_need_is_not_past_tense() {
        assert_eq!(tag_token("need"), "NN");
        assert_eq!(tag_token("speed"), "NN");
    }

    #[test]
    fn test_adjective_suffixes() {
        assert_eq!(tag_token("scalable"), "JJ");
        assert_eq!(tag_token("technical"), "JJ");
    }

    #[test]
    fn test_noun_with_adjective_like_ending() {
        assert_eq!(tag_token("development"), "NN");
        assert_eq!(tag_token("requirements"), "NNS");
    }

    #[test]
    fn test_plural_and_default_noun() {
        assert_eq!(tag_token("years"), "NNS");
        assert_eq!(tag_token("process"), "NN");
        assert_eq!(tag_token("python"), "NN");
    }

    #[test]
    fn test_numbers_and_identifiers() {
        assert_eq!(tag_token("2024"), "CD");
        assert_eq!(tag_token("node.js"), "NN");
        assert_eq!(tag_token("c++"), "NN");
    }
}
