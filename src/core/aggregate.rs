//! 词表汇总 - merge per-frame text into a sorted, deduplicated word list.

use std::collections::BTreeSet;

/// Unicode whitespace plus the ASCII file/group/record/unit separators.
fn is_separator(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

/// Splits every text on whitespace and returns the distinct tokens in
/// code-point order. Case and punctuation are kept as recognized.
pub fn aggregate<I, S>(frame_texts: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut words = BTreeSet::new();
    for text in frame_texts {
        for word in text.as_ref().split(is_separator).filter(|w| !w.is_empty()) {
            if !words.contains(word) {
                words.insert(word.to_string());
            }
        }
    }
    words.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_and_deduplicated() {
        let words = aggregate(["cat dog", "dog bird", ""]);
        assert_eq!(words, vec!["bird", "cat", "dog"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate(Vec::<String>::new()).is_empty());
        assert!(aggregate(["", "  \n\t "]).is_empty());
    }

    #[test]
    fn test_case_and_punctuation_preserved() {
        let words = aggregate(["Hello, hello world.", "World"]);
        assert_eq!(words, vec!["Hello,", "World", "hello", "world."]);
    }

    #[test]
    fn test_any_whitespace_run_separates() {
        let words = aggregate(["a\tb\n\nc   d\r\ne\u{3000}f"]);
        assert_eq!(words, vec!["a", "b", "c", "d", "e", "f"]);
    }

    #[test]
    fn test_control_separators_split() {
        let words = aggregate(["one\u{1c}two\u{1d}three\u{1e}four\u{1f}five\u{85}six"]);
        assert_eq!(words, vec!["five", "four", "one", "six", "three", "two"]);
    }

    #[test]
    fn test_order_independent() {
        let texts = ["zeta alpha", "beta\nalpha", "gamma", "Ω ω", "beta"];
        let expected = aggregate(texts);
        let mut permuted = texts.to_vec();
        for _ in 0..texts.len() {
            permuted.rotate_left(1);
            assert_eq!(aggregate(permuted.iter()), expected);
            permuted.reverse();
            assert_eq!(aggregate(permuted.iter()), expected);
        }
    }

    #[test]
    fn test_output_strictly_increasing() {
        let words = aggregate(["b a c a b", "c c d", "é e E"]);
        assert!(words.windows(2).all(|w| w[0] < w[1]));
    }
}
