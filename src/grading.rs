//! Free-text answer matching.
//!
//! Grading is a fuzzy heuristic, not exact marking: answers are compared after
//! normalisation, and a long enough response that is contained in (or contains)
//! the expected answer is accepted. Short guesses must match exactly.

/// Minimum normalised response length for a containment match
pub const MIN_FUZZY_MATCH_LEN: usize = 8;

/// Lowercase, drop everything outside `[a-z0-9 ]`, collapse whitespace and trim.
pub fn normalize_answer(text: &str) -> String {
    let mut cleaned = String::with_capacity(text.len());
    for ch in text.chars().flat_map(char::to_lowercase) {
        if ch.is_whitespace() {
            cleaned.push(' ');
        } else if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            cleaned.push(ch);
        }
    }
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Decide whether `received` is an acceptable answer for `expected`.
pub fn is_correct(expected: &str, received: &str) -> bool {
    let expected = normalize_answer(expected);
    let received = normalize_answer(received);

    if received.is_empty() {
        return false;
    }
    if expected == received {
        return true;
    }

    received.len() >= MIN_FUZZY_MATCH_LEN
        && (expected.contains(&received) || received.contains(&expected))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_answer() {
        assert_eq!(normalize_answer("  Hello,   World!! "), "hello world");
        assert_eq!(normalize_answer("use`Effect`()"), "useeffect");
        assert_eq!(normalize_answer("line\none\ttab"), "line one tab");
        assert_eq!(normalize_answer("Ünïcode 42"), "ncode 42");
        assert_eq!(normalize_answer("?!"), "");
    }

    #[test]
    fn test_exact_match_ignores_case_and_punctuation() {
        assert!(is_correct(
            "It handles side effects after render",
            "it handles side effects after render!!"
        ));
    }

    #[test]
    fn test_short_answers_must_match_exactly() {
        assert!(!is_correct("Yes", "y"));
        assert!(is_correct("Yes", "YES."));
        assert!(!is_correct("useEffect hook", "effect"));
    }

    #[test]
    fn test_long_containment_matches_either_way() {
        assert!(is_correct(
            "A closure keeps access to outer scope variables",
            "closure keeps access to outer scope"
        ));
        // Permissive: a long response wrapping a short expected answer passes
        assert!(is_correct(
            "Closures",
            "closures are functions bundled with their lexical environment"
        ));
        assert!(is_correct(
            "lexical scope",
            "it relies on lexical scope lookups"
        ));
    }

    #[test]
    fn test_empty_response_is_never_correct() {
        assert!(!is_correct("anything", ""));
        assert!(!is_correct("", ""));
        assert!(!is_correct("anything", "   ...   "));
    }
}
