use readscore_common::{ReadScoreError, Result};

use crate::distance::levenshtein;

/// Accuracy percentage in [0, 100]
pub type Accuracy = f64;

/// Score a recognized sentence against the expected one.
///
/// Both strings are lowercased, then `((L - d) / L) * 100` is returned,
/// where `d` is the Levenshtein distance and `L` the longer character
/// count. No other normalization (punctuation, whitespace) is applied.
///
/// Fails with `InvalidInput` when both strings are empty. Request
/// validation rejects an empty expected sentence, so in practice `L > 0`.
pub fn score(expected: &str, recognized: &str) -> Result<Accuracy> {
    let expected = expected.to_lowercase();
    let recognized = recognized.to_lowercase();

    // Lengths of the folded strings: lowercasing can expand a char (e.g. 'İ')
    let max_len = expected.chars().count().max(recognized.chars().count());
    if max_len == 0 {
        return Err(ReadScoreError::invalid_input(
            "cannot score two empty strings",
        ));
    }

    let distance = levenshtein(&expected, &recognized);

    Ok((max_len - distance) as f64 / max_len as f64 * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAIRS: &[(&str, &str)] = &[
        ("hello world", "hello world"),
        ("hello", "hallo"),
        ("The quick brown fox", "the quick brown box"),
        ("a", "completely different sentence"),
        ("completely different sentence", "z"),
        ("İstanbul", "istanbul"),
        ("Straße", "STRASSE"),
        ("   ", "x"),
        ("abc", ""),
    ];

    #[test]
    fn test_identical_sentence() {
        assert_eq!(score("hello world", "hello world").unwrap(), 100.0);
    }

    #[test]
    fn test_one_substitution() {
        assert_eq!(score("hello", "hallo").unwrap(), 80.0);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(score("Hello World", "hello world").unwrap(), 100.0);
        assert_eq!(score("HELLO", "hello").unwrap(), 100.0);
    }

    #[test]
    fn test_punctuation_counts() {
        // "hello world." has 12 chars, one insertion away
        let accuracy = score("hello world.", "hello world").unwrap();
        assert!((accuracy - 100.0 * 11.0 / 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_recognized_scores_zero() {
        assert_eq!(score("hello", "").unwrap(), 0.0);
    }

    #[test]
    fn test_both_empty_is_invalid() {
        let err = score("", "").unwrap_err();
        assert!(matches!(err, ReadScoreError::InvalidInput(_)));
    }

    #[test]
    fn test_bounds() {
        for (a, b) in PAIRS {
            let accuracy = score(a, b).unwrap();
            assert!((0.0..=100.0).contains(&accuracy), "{a:?} vs {b:?} -> {accuracy}");
        }
    }

    #[test]
    fn test_invariant_under_lowercasing() {
        for (a, b) in PAIRS {
            let original = score(a, b).unwrap();
            let folded = score(&a.to_lowercase(), &b.to_lowercase()).unwrap();
            assert_eq!(original, folded, "{a:?} vs {b:?}");
        }
    }

    /// Deterministic xorshift64 so failures reproduce
    struct Rng(u64);

    impl Rng {
        fn next(&mut self) -> u64 {
            self.0 ^= self.0 << 13;
            self.0 ^= self.0 >> 7;
            self.0 ^= self.0 << 17;
            self.0
        }

        fn below(&mut self, n: usize) -> usize {
            (self.next() % n as u64) as usize
        }
    }

    // Mixed scripts, case pairs, and chars whose lowercase is longer
    const ALPHABET: &[char] = &[
        'a', 'b', 'e', 'A', 'B', 'E', ' ', '.', '\'', 'é', 'É', 'ß', 'İ', 'ı', 'I', 'Σ', 'σ',
        'ς', 'Ж', 'ж', '한', '국', '語', '😀', '\u{0301}',
    ];

    fn random_string(rng: &mut Rng, max_len: usize) -> String {
        let len = rng.below(max_len + 1);
        (0..len).map(|_| ALPHABET[rng.below(ALPHABET.len())]).collect()
    }

    #[test]
    fn test_generated_properties() {
        let mut rng = Rng(0x5eed_1234_abcd_ef01);

        for _ in 0..2000 {
            let a = random_string(&mut rng, 24);
            let b = random_string(&mut rng, 24);
            if a.is_empty() && b.is_empty() {
                continue;
            }

            let accuracy = score(&a, &b).unwrap();
            assert!((0.0..=100.0).contains(&accuracy), "{a:?} vs {b:?} -> {accuracy}");

            let folded = score(&a.to_lowercase(), &b.to_lowercase()).unwrap();
            assert_eq!(accuracy, folded, "{a:?} vs {b:?}");

            if !a.is_empty() {
                assert_eq!(score(&a, &a).unwrap(), 100.0, "{a:?}");
                assert_eq!(score(&a, &a.to_lowercase()).unwrap(), 100.0, "{a:?}");
            }
        }
    }

    #[test]
    fn test_expanding_lowercase_stays_in_range() {
        // 'İ' lowercases to two chars; the score must not go negative
        let accuracy = score("İİİ", "x").unwrap();
        assert!(accuracy >= 0.0);
    }
}
