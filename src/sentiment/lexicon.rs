/// Polarity entries for common sentiment-bearing English words, in
/// [-1.0, 1.0]. Comment slang skews the list on purpose.
const POLARITY: &[(&str, f32)] = &[
    ("adorable", 0.7),
    ("adore", 0.7),
    ("amazing", 0.8),
    ("angry", -0.6),
    ("annoying", -0.5),
    ("awesome", 0.8),
    ("awful", -0.8),
    ("bad", -0.5),
    ("beautiful", 0.7),
    ("best", 0.8),
    ("boring", -0.4),
    ("brilliant", 0.8),
    ("cool", 0.4),
    ("cringe", -0.6),
    ("cute", 0.6),
    ("disappointed", -0.6),
    ("disappointing", -0.6),
    ("disgusting", -0.9),
    ("dope", 0.6),
    ("enjoy", 0.5),
    ("enjoyed", 0.5),
    ("excellent", 0.8),
    ("excited", 0.6),
    ("fail", -0.5),
    ("fake", -0.5),
    ("fantastic", 0.8),
    ("favorite", 0.6),
    ("fire", 0.7),
    ("fun", 0.5),
    ("garbage", -0.7),
    ("goat", 0.7),
    ("good", 0.5),
    ("gorgeous", 0.8),
    ("great", 0.6),
    ("happy", 0.6),
    ("hate", -0.8),
    ("hated", -0.8),
    ("hilarious", 0.6),
    ("horrible", -0.8),
    ("incredible", 0.8),
    ("inspiring", 0.7),
    ("lame", -0.5),
    ("legend", 0.6),
    ("like", 0.3),
    ("liked", 0.3),
    ("lit", 0.6),
    ("love", 0.7),
    ("loved", 0.7),
    ("lovely", 0.7),
    ("loves", 0.7),
    ("mid", -0.3),
    ("nice", 0.5),
    ("overrated", -0.4),
    ("perfect", 0.8),
    ("pretty", 0.4),
    ("proud", 0.5),
    ("sad", -0.5),
    ("scam", -0.8),
    ("stunning", 0.8),
    ("terrible", -0.8),
    ("trash", -0.7),
    ("ugly", -0.6),
    ("vibes", 0.4),
    ("wonderful", 0.8),
    ("worst", -0.8),
    ("wow", 0.5),
];

/// Tokens that flip the polarity of the words right after them.
const NEGATIONS: &[&str] = &[
    "aint", "cannot", "cant", "didnt", "doesnt", "dont", "isnt", "never", "no", "not", "wasnt",
    "wont",
];

pub fn polarity_of(token: &str) -> Option<f32> {
    POLARITY
        .binary_search_by(|(word, _)| word.cmp(&token))
        .ok()
        .map(|index| POLARITY[index].1)
}

pub fn is_negation(token: &str) -> bool {
    NEGATIONS.contains(&token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexicon_is_sorted_for_binary_search() {
        for pair in POLARITY.windows(2) {
            assert!(pair[0].0 < pair[1].0, "{} >= {}", pair[0].0, pair[1].0);
        }
    }

    #[test]
    fn scores_stay_in_range() {
        for (word, score) in POLARITY {
            assert!((-1.0..=1.0).contains(score), "{word} out of range");
        }
    }

    #[test]
    fn lookups() {
        assert_eq!(polarity_of("love"), Some(0.7));
        assert_eq!(polarity_of("zebra"), None);
        assert!(is_negation("not"));
        assert!(!is_negation("very"));
    }
}
