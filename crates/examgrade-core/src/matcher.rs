//! Fuzzy matching of spoken answers.
//!
//! A speech-to-text transcript is compared against the expected answer
//! after normalization, tolerating a bounded Levenshtein distance: 20% of
//! the longer normalized string, never less than two edits.

use serde::{Deserialize, Serialize};

/// Characters stripped from both strings before comparison.
const PUNCTUATION: &[char] = &[
    '.', ',', '/', '#', '!', '$', '%', '^', '&', '*', ';', ':', '{', '}', '=', '-', '_', '`',
    '~', '(', ')',
];

/// Numerals a recognizer may emit in place of the spoken word.
const NUMBER_WORDS: &[(&str, &str)] = &[
    ("0", "zero"),
    ("1", "one"),
    ("2", "two"),
    ("3", "three"),
    ("4", "four"),
    ("5", "five"),
    ("6", "six"),
    ("7", "seven"),
    ("8", "eight"),
    ("9", "nine"),
    ("10", "ten"),
    ("11", "eleven"),
    ("12", "twelve"),
    ("13", "thirteen"),
    ("14", "fourteen"),
    ("15", "fifteen"),
    ("16", "sixteen"),
    ("17", "seventeen"),
    ("18", "eighteen"),
    ("19", "nineteen"),
    ("20", "twenty"),
    ("30", "thirty"),
    ("40", "forty"),
    ("50", "fifty"),
    ("60", "sixty"),
    ("70", "seventy"),
    ("80", "eighty"),
    ("90", "ninety"),
    ("100", "one hundred"),
];

/// Minimum number of edits tolerated regardless of length.
const MIN_TOLERANCE: usize = 2;

/// Full breakdown of one spoken-answer comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechMatch {
    pub spoken: String,
    pub target: String,
    /// Edit distance between the normalized strings.
    pub distance: usize,
    /// Largest distance still accepted.
    pub tolerance: usize,
    pub matched: bool,
}

/// Lowercase, trim, strip punctuation and spell out numerals.
///
/// Tokens are rejoined with single spaces. Applying this twice gives the
/// same result as applying it once.
pub fn normalize_transcript(input: &str) -> String {
    let lowered = input.to_lowercase();
    let stripped: String = lowered
        .trim()
        .chars()
        .filter(|c| !PUNCTUATION.contains(c))
        .collect();

    stripped
        .split_whitespace()
        .map(number_word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn number_word(token: &str) -> &str {
    NUMBER_WORDS
        .iter()
        .find(|(numeral, _)| *numeral == token)
        .map(|(_, word)| *word)
        .unwrap_or(token)
}

/// Levenshtein edit distance over Unicode scalar values.
///
/// Single rolling row, no recursion.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut row: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.iter().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = diagonal + usize::from(ca != cb);
            diagonal = row[j + 1];
            row[j + 1] = substitution.min(row[j] + 1).min(diagonal + 1);
        }
    }

    row[b.len()]
}

/// Edits tolerated when comparing strings of the given character lengths.
pub fn speech_tolerance(spoken_len: usize, target_len: usize) -> usize {
    // floor(0.2 * n) in integer arithmetic
    (spoken_len.max(target_len) / 5).max(MIN_TOLERANCE)
}

/// Compare a transcript against the expected answer and explain the verdict.
///
/// Only empty raw input is rejected outright. Input that normalizes to
/// nothing (punctuation only) is compared like any other string.
pub fn explain_speech_match(spoken: &str, target: &str) -> SpeechMatch {
    let unanswered = spoken.is_empty() || target.is_empty();

    let spoken = normalize_transcript(spoken);
    let target = normalize_transcript(target);

    let spoken_len = spoken.chars().count();
    let target_len = target.chars().count();
    let tolerance = speech_tolerance(spoken_len, target_len);

    if unanswered {
        let distance = spoken_len.max(target_len);
        return SpeechMatch {
            spoken,
            target,
            distance,
            tolerance,
            matched: false,
        };
    }

    let distance = if spoken == target {
        0
    } else {
        levenshtein(&target, &spoken)
    };

    SpeechMatch {
        matched: distance <= tolerance,
        spoken,
        target,
        distance,
        tolerance,
    }
}

/// Whether a transcript is close enough to the expected answer.
pub fn is_speech_correct(spoken: &str, target: &str) -> bool {
    explain_speech_match(spoken, target).matched
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match() {
        assert!(is_speech_correct("three", "three"));
    }

    #[test]
    fn numerals_match_spelled_numbers() {
        assert!(is_speech_correct("3", "three"));
        assert!(is_speech_correct("twenty", "20"));
        assert!(is_speech_correct("100", "one hundred"));
        assert!(is_speech_correct("I have 2 cats", "i have two cats"));
    }

    #[test]
    fn tolerance_boundary() {
        assert!(is_speech_correct("sevn", "seven"));
        assert!(!is_speech_correct("xyzzy", "seven"));

        let m = explain_speech_match("sevn", "seven");
        assert_eq!(m.distance, 1);
        assert_eq!(m.tolerance, 2);
    }

    #[test]
    fn tolerance_grows_with_length() {
        assert_eq!(speech_tolerance(5, 4), 2);
        assert_eq!(speech_tolerance(14, 15), 3);
        assert_eq!(speech_tolerance(0, 0), 2);

        // 19 chars, 3 edits allowed
        assert!(is_speech_correct("the quick brwn fx", "the quick brown fox"));
        assert!(!is_speech_correct("a slow red hen", "the quick brown fox"));
    }

    #[test]
    fn empty_inputs_never_match() {
        assert!(!is_speech_correct("", "seven"));
        assert!(!is_speech_correct("seven", ""));
        assert!(!is_speech_correct("", ""));
        // blank but not empty: normalized to "" and measured, 5 > 2
        assert!(!is_speech_correct("   ", "seven"));
    }

    #[test]
    fn punctuation_only_input_is_measured() {
        let m = explain_speech_match("!!", "a");
        assert_eq!(m.spoken, "");
        assert_eq!(m.distance, 1);
        assert_eq!(m.tolerance, 2);
        assert!(m.matched);

        assert!(is_speech_correct("!!", "(("));
        assert!(!is_speech_correct("?!", "seven"));
    }

    #[test]
    fn punctuation_and_case_ignored() {
        assert!(is_speech_correct("Hello, World!", "hello world"));
        assert_eq!(normalize_transcript("  Well-Done!  "), "welldone");
        assert_eq!(normalize_transcript("a   b\tc"), "a b c");
    }

    #[test]
    fn numbers_outside_table_pass_through() {
        assert_eq!(normalize_transcript("21 25 03"), "21 25 03");
        assert_eq!(normalize_transcript("0 17 90"), "zero seventeen ninety");
    }

    #[test]
    fn normalization_is_idempotent() {
        for input in ["  The 3 Little-Pigs!! ", "100", "(20) & 30", "ÉCOLE  7", ""] {
            let once = normalize_transcript(input);
            assert_eq!(normalize_transcript(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn levenshtein_classic_cases() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(levenshtein("flaw", "lawn"), 2);
        assert_eq!(levenshtein("same", "same"), 0);
        assert_eq!(levenshtein("niño", "nino"), 1);
    }

    #[test]
    fn levenshtein_is_symmetric() {
        for (a, b) in [("seven", "sevn"), ("gumbo", "gambol"), ("a", "xyz")] {
            assert_eq!(levenshtein(a, b), levenshtein(b, a));
        }
    }
}
