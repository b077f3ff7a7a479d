//! Plain, case-folded, whole-word, and regex matching over scalar offsets.
//!
//! All match coordinates are Unicode scalar offsets into the haystack, so
//! they can be handed straight to the store's clamped addressing. Byte
//! offsets from the regex engine never escape this module.

use regex::RegexBuilder;

use crate::error::{Error, Result};

/// Flags controlling how a needle is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchOptions {
    /// Compare scalars exactly; when false both sides go through a simple
    /// lowercase fold.
    pub case_sensitive: bool,
    /// Accept a match only when it is not flanked by word characters
    /// (Unicode letters, Unicode numbers, or `_`).
    pub whole_word: bool,
    /// Treat the needle as a regular expression.
    pub regex: bool,
}

/// A compiled needle.
pub(crate) enum Matcher {
    Plain {
        needle: Vec<char>,
        fold: bool,
        whole_word: bool,
    },
    Pattern {
        regex: regex::Regex,
    },
}

/// Compiles `needle` under `options`.
///
/// An empty needle can never match and is rejected as `NotFound`; a
/// malformed regex is `InvalidPattern`.
pub(crate) fn build(needle: &str, options: &SearchOptions) -> Result<Matcher> {
    if needle.is_empty() {
        return Err(Error::NotFound);
    }
    if options.regex {
        let pattern = if options.whole_word {
            format!(r"\b{needle}\b")
        } else {
            needle.to_string()
        };
        let regex = RegexBuilder::new(&pattern)
            .case_insensitive(!options.case_sensitive)
            .build()
            .map_err(|e| Error::InvalidPattern(e.to_string()))?;
        Ok(Matcher::Pattern { regex })
    } else {
        let fold = !options.case_sensitive;
        let needle = if fold {
            needle.chars().map(fold_scalar).collect()
        } else {
            needle.chars().collect()
        };
        Ok(Matcher::Plain {
            needle,
            fold,
            whole_word: options.whole_word,
        })
    }
}

/// A locale-independent 1:1 case fold: the first scalar of the Unicode
/// lowercase mapping. Used identically by search and replace-all so the
/// two always agree on what matches.
fn fold_scalar(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// Word characters are Unicode letters, Unicode numbers, and `_`.
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn boundary_ok(before: Option<char>, after: Option<char>) -> bool {
    !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
}

fn plain_match_at(chars: &[char], needle: &[char], fold: bool, at: usize) -> bool {
    chars[at..at + needle.len()]
        .iter()
        .zip(needle)
        .all(|(&c, &n)| if fold { fold_scalar(c) == n } else { c == n })
}

fn plain_boundary_ok(chars: &[char], start: usize, end: usize, whole_word: bool) -> bool {
    if !whole_word {
        return true;
    }
    let before = start.checked_sub(1).map(|i| chars[i]);
    let after = chars.get(end).copied();
    boundary_ok(before, after)
}

/// Returns the byte offset of scalar `scalar` in `text`.
fn byte_of_scalar(text: &str, scalar: usize) -> usize {
    text.char_indices()
        .nth(scalar)
        .map(|(b, _)| b)
        .unwrap_or(text.len())
}

/// Finds the first match whose start is at or after `from`.
pub(crate) fn find_from(text: &str, matcher: &Matcher, from: usize) -> Option<(usize, usize)> {
    match matcher {
        Matcher::Plain {
            needle,
            fold,
            whole_word,
        } => {
            let chars: Vec<char> = text.chars().collect();
            let m = needle.len();
            if m > chars.len() {
                return None;
            }
            for start in from..=(chars.len() - m) {
                if plain_match_at(&chars, needle, *fold, start)
                    && plain_boundary_ok(&chars, start, start + m, *whole_word)
                {
                    return Some((start, start + m));
                }
            }
            None
        }
        Matcher::Pattern { regex } => {
            let byte_from = byte_of_scalar(text, from);
            let found = regex.find(&text[byte_from..])?;
            let start = from + text[byte_from..byte_from + found.start()].chars().count();
            let end = start + found.as_str().chars().count();
            Some((start, end))
        }
    }
}

/// Finds the last match that ends at or before `before`.
pub(crate) fn find_last_before(
    text: &str,
    matcher: &Matcher,
    before: usize,
) -> Option<(usize, usize)> {
    match matcher {
        Matcher::Plain {
            needle,
            fold,
            whole_word,
        } => {
            let chars: Vec<char> = text.chars().collect();
            let m = needle.len();
            if m > before || m > chars.len() {
                return None;
            }
            let last_start = before.min(chars.len()) - m;
            for start in (0..=last_start).rev() {
                if plain_match_at(&chars, needle, *fold, start)
                    && plain_boundary_ok(&chars, start, start + m, *whole_word)
                {
                    return Some((start, start + m));
                }
            }
            None
        }
        Matcher::Pattern { regex } => {
            let byte_cut = byte_of_scalar(text, before);
            let prefix = &text[..byte_cut];
            let found = regex.find_iter(prefix).last()?;
            let start = prefix[..found.start()].chars().count();
            let end = start + found.as_str().chars().count();
            Some((start, end))
        }
    }
}

/// Finds every non-overlapping match, scanning left to right.
///
/// Plain whole-word scanning advances one scalar past a rejected
/// candidate, so an overlapping later candidate still gets its chance.
pub(crate) fn find_all(text: &str, matcher: &Matcher) -> Vec<(usize, usize)> {
    match matcher {
        Matcher::Plain {
            needle,
            fold,
            whole_word,
        } => {
            let chars: Vec<char> = text.chars().collect();
            find_all_chars(&chars, needle, *fold, *whole_word)
        }
        Matcher::Pattern { regex } => {
            let mut matches = Vec::new();
            let mut scalar = 0;
            let mut byte = 0;
            for found in regex.find_iter(text) {
                scalar += text[byte..found.start()].chars().count();
                let len = found.as_str().chars().count();
                matches.push((scalar, scalar + len));
                scalar += len;
                byte = found.end();
            }
            matches
        }
    }
}

fn find_all_chars(chars: &[char], needle: &[char], fold: bool, whole_word: bool) -> Vec<(usize, usize)> {
    let m = needle.len();
    let mut matches = Vec::new();
    let mut start = 0;
    while start + m <= chars.len() {
        if plain_match_at(chars, needle, fold, start)
            && plain_boundary_ok(chars, start, start + m, whole_word)
        {
            matches.push((start, start + m));
            start += m;
        } else {
            start += 1;
        }
    }
    matches
}

/// Streaming variant of [`find_all`] for plain needles: scans an iterator
/// of scalars with a rolling window instead of materializing the text.
///
/// Used by the chunked replace-all path on large buffers. The window keeps
/// one scalar of lookahead so whole-word boundaries are exact.
pub(crate) fn find_all_scalars<I>(
    scalars: I,
    needle: &[char],
    fold: bool,
    whole_word: bool,
) -> Vec<(usize, usize)>
where
    I: Iterator<Item = char>,
{
    let m = needle.len();
    let mut matches = Vec::new();
    let mut window: std::collections::VecDeque<char> = std::collections::VecDeque::new();
    let mut pos = 0; // offset of window[0]
    let mut prev: Option<char> = None;

    let window_matches = |window: &std::collections::VecDeque<char>| {
        window
            .iter()
            .take(m)
            .zip(needle)
            .all(|(&c, &n)| if fold { fold_scalar(c) == n } else { c == n })
    };

    // Evaluate the candidate at `pos` once one scalar of lookahead exists;
    // leftovers drain after the stream ends with `after = None`.
    let step = |window: &mut std::collections::VecDeque<char>,
                    pos: &mut usize,
                    prev: &mut Option<char>,
                    matches: &mut Vec<(usize, usize)>| {
        let after = window.get(m).copied();
        let hit = window_matches(window)
            && (!whole_word || boundary_ok(*prev, after));
        if hit {
            matches.push((*pos, *pos + m));
            for _ in 0..m {
                *prev = window.pop_front();
            }
            *pos += m;
        } else {
            *prev = window.pop_front();
            *pos += 1;
        }
    };

    for ch in scalars {
        window.push_back(ch);
        if window.len() == m + 1 {
            step(&mut window, &mut pos, &mut prev, &mut matches);
        }
    }
    while window.len() >= m {
        step(&mut window, &mut pos, &mut prev, &mut matches);
    }
    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(needle: &str) -> Matcher {
        build(
            needle,
            &SearchOptions {
                case_sensitive: true,
                ..Default::default()
            },
        )
        .unwrap()
    }

    fn folded(needle: &str) -> Matcher {
        build(needle, &SearchOptions::default()).unwrap()
    }

    fn whole_word(needle: &str) -> Matcher {
        build(
            needle,
            &SearchOptions {
                case_sensitive: true,
                whole_word: true,
                ..Default::default()
            },
        )
        .unwrap()
    }

    // ==================== build ====================

    #[test]
    fn test_empty_needle_is_not_found() {
        assert!(matches!(
            build("", &SearchOptions::default()),
            Err(Error::NotFound)
        ));
    }

    #[test]
    fn test_bad_regex_is_invalid_pattern() {
        let options = SearchOptions {
            regex: true,
            ..Default::default()
        };
        assert!(matches!(
            build("[unclosed", &options),
            Err(Error::InvalidPattern(_))
        ));
    }

    // ==================== find_from ====================

    #[test]
    fn test_find_from_start() {
        assert_eq!(find_from("hello hello", &plain("hello"), 0), Some((0, 5)));
        assert_eq!(find_from("hello hello", &plain("hello"), 1), Some((6, 11)));
        assert_eq!(find_from("hello hello", &plain("hello"), 7), None);
    }

    #[test]
    fn test_find_from_case_fold() {
        assert_eq!(find_from("say HELLO", &folded("hello"), 0), Some((4, 9)));
        assert_eq!(find_from("say HELLO", &plain("hello"), 0), None);
    }

    #[test]
    fn test_find_from_whole_word() {
        let text = "testing test tests";
        assert_eq!(find_from(text, &whole_word("test"), 0), Some((8, 12)));
        assert_eq!(find_from(text, &plain("test"), 0), Some((0, 4)));
    }

    #[test]
    fn test_whole_word_boundaries_at_ends() {
        assert_eq!(find_from("test", &whole_word("test"), 0), Some((0, 4)));
        assert_eq!(find_from("test!", &whole_word("test"), 0), Some((0, 4)));
        assert_eq!(find_from("_test_", &whole_word("test"), 0), None);
    }

    #[test]
    fn test_whole_word_unicode_boundaries() {
        // Letters on either side are word characters even outside ASCII.
        assert_eq!(find_from("日test日", &whole_word("test"), 0), None);
        assert_eq!(find_from("。test。", &whole_word("test"), 0), Some((1, 5)));
    }

    #[test]
    fn test_find_from_regex() {
        let matcher = build(
            r"b\w+",
            &SearchOptions {
                case_sensitive: true,
                regex: true,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(find_from("a bee bay", &matcher, 0), Some((2, 5)));
        assert_eq!(find_from("a bee bay", &matcher, 3), Some((6, 9)));
    }

    #[test]
    fn test_find_from_regex_scalar_offsets() {
        let matcher = build(
            "ab",
            &SearchOptions {
                case_sensitive: true,
                regex: true,
                ..Default::default()
            },
        )
        .unwrap();
        // The multi-byte scalars before the match count as one column each.
        assert_eq!(find_from("日本語ab", &matcher, 0), Some((3, 5)));
    }

    // ==================== find_last_before ====================

    #[test]
    fn test_find_last_before() {
        let text = "one two one two";
        assert_eq!(find_last_before(text, &plain("one"), text.len()), Some((8, 11)));
        assert_eq!(find_last_before(text, &plain("one"), 8), Some((0, 3)));
        assert_eq!(find_last_before(text, &plain("one"), 2), None);
    }

    #[test]
    fn test_find_last_before_regex() {
        let matcher = build(
            r"\d+",
            &SearchOptions {
                case_sensitive: true,
                regex: true,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(find_last_before("a1 b22 c333", &matcher, 11), Some((8, 11)));
        assert_eq!(find_last_before("a1 b22 c333", &matcher, 7), Some((4, 6)));
    }

    // ==================== find_all ====================

    #[test]
    fn test_find_all_non_overlapping() {
        assert_eq!(find_all("aaaa", &plain("aa")), vec![(0, 2), (2, 4)]);
    }

    #[test]
    fn test_find_all_whole_word_advances_past_rejects() {
        let text = "atest test";
        assert_eq!(find_all(text, &whole_word("test")), vec![(6, 10)]);
    }

    #[test]
    fn test_find_all_case_fold() {
        assert_eq!(
            find_all("Test TEST test", &folded("test")),
            vec![(0, 4), (5, 9), (10, 14)]
        );
    }

    #[test]
    fn test_find_all_regex() {
        let matcher = build(
            r"\d+",
            &SearchOptions {
                case_sensitive: true,
                regex: true,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(find_all("a1 b22 c333", &matcher), vec![(1, 2), (4, 6), (8, 11)]);
    }

    // ==================== streaming scan ====================

    #[test]
    fn test_streaming_matches_find_all() {
        let cases = [
            ("aaaa", "aa", false),
            ("the cat sat on the mat", "at", false),
            ("atest test atest test", "test", true),
            ("xyxyxyx", "xyx", false),
            ("", "a", false),
            ("short", "longer needle", false),
        ];
        for (text, needle, whole_word) in cases {
            let needle_chars: Vec<char> = needle.chars().collect();
            let streamed = find_all_scalars(text.chars(), &needle_chars, false, whole_word);
            let chars: Vec<char> = text.chars().collect();
            let direct = find_all_chars(&chars, &needle_chars, false, whole_word);
            assert_eq!(streamed, direct, "case {text:?} / {needle:?}");
        }
    }

    #[test]
    fn test_streaming_whole_word_lookahead() {
        let needle: Vec<char> = "end".chars().collect();
        // Match flush against the end of the stream.
        assert_eq!(
            find_all_scalars("the end".chars(), &needle, false, true),
            vec![(4, 7)]
        );
        // Rejected because the lookahead scalar is a word character.
        assert_eq!(
            find_all_scalars("the ends".chars(), &needle, false, true),
            vec![]
        );
    }

    #[test]
    fn test_fold_scalar_is_simple_lowercase() {
        assert_eq!(fold_scalar('A'), 'a');
        assert_eq!(fold_scalar('Ω'), 'ω');
        assert_eq!(fold_scalar('a'), 'a');
        assert_eq!(fold_scalar('1'), '1');
    }

    #[test]
    fn test_is_word_char() {
        assert!(is_word_char('a'));
        assert!(is_word_char('Z'));
        assert!(is_word_char('0'));
        assert!(is_word_char('_'));
        assert!(is_word_char('日'));
        assert!(is_word_char('é'));
        assert!(!is_word_char(' '));
        assert!(!is_word_char('。'));
        assert!(!is_word_char('-'));
    }
}
