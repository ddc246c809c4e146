use std::collections::HashSet;
use std::io;
use std::path::Path;

/// Word list compiled into the binary. One lowercase word per line.
const EMBEDDED_WORDS: &str = include_str!("../../assets/words.txt");

/// Shortest word fragment the split check will consider. Splitting below
/// this rejects almost everything ("a" + anything), so both halves of a
/// candidate split must be at least this long.
const MIN_FRAGMENT: usize = 3;

/// Membership test over known words. The filter depends only on this,
/// so the concrete word list is swappable.
pub trait WordSet: Send + Sync {
    fn contains_word(&self, word: &str) -> bool;
}

/// Immutable set of lowercase alphabetic words, loaded once at startup.
pub struct Lexicon {
    words: HashSet<String>,
}

impl Lexicon {
    /// The word list shipped inside the binary.
    pub fn embedded() -> Self {
        Self::from_lines(EMBEDDED_WORDS)
    }

    /// Load an operator-supplied word list, one word per line.
    pub fn from_file(path: &Path) -> Result<Self, io::Error> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::from_lines(&text))
    }

    /// Parse a word list. Blank lines and `#` comments are skipped; entries
    /// are lowercased, and anything that is not purely alphabetic is dropped
    /// (hyphenated entries, abbreviations with dots).
    fn from_lines(text: &str) -> Self {
        let words = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter(|line| line.chars().all(|c| c.is_ascii_alphabetic()))
            .map(str::to_ascii_lowercase)
            .collect();
        Self { words }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }
}

impl WordSet for Lexicon {
    fn contains_word(&self, word: &str) -> bool {
        self.words.contains(word)
    }
}

/// Reverse leet substitutions: each digit becomes the letter it resembles.
/// The digit 1 is ambiguous (l or i) and is handled separately in
/// [`is_hexspeak`].
fn unleet(code: &str) -> String {
    code.chars()
        .map(|c| match c {
            '0' => 'o',
            '2' => 'z',
            '3' => 'e',
            '4' => 'a',
            '5' => 's',
            '6' => 'g',
            '7' => 't',
            '8' => 'b',
            '9' => 'g',
            other => other,
        })
        .collect()
}

/// Does this 8-char lowercase hex string read as a word or hexspeak?
///
/// The candidate is leet-normalized, then checked against the word set: a
/// hit on the whole string, or on both halves of any split where each half
/// is at least [`MIN_FRAGMENT`] letters, flags it. A lone `1` can stand for
/// either `l` or `i`, so both readings are checked.
///
/// The check is heuristic: it can pass mildly word-like strings whose
/// fragments are not in the word set, and it can reject an innocuous string
/// that happens to split into two short words.
pub fn is_hexspeak(code: &str, words: &dyn WordSet) -> bool {
    let normalized = unleet(code);
    if normalized.contains('1') {
        spells_words(&normalized.replace('1', "l"), words)
            || spells_words(&normalized.replace('1', "i"), words)
    } else {
        spells_words(&normalized, words)
    }
}

/// Whole-string word match, or a split into two words of at least
/// MIN_FRAGMENT letters each.
fn spells_words(s: &str, words: &dyn WordSet) -> bool {
    if words.contains_word(s) {
        return true;
    }
    if s.len() < 2 * MIN_FRAGMENT {
        return false;
    }
    (MIN_FRAGMENT..=s.len() - MIN_FRAGMENT)
        .any(|x| words.contains_word(&s[..x]) && words.contains_word(&s[x..]))
}
