use super::lexicon;

/// How many tokens a negation keeps flipping polarity for.
const NEGATION_WINDOW: u8 = 2;

/// Score the polarity of a block of text.
///
/// Returns a value in [-1.0, 1.0]: the average polarity of the recognized
/// sentiment words, with negations flipping the words that follow them.
/// Unknown words are neutral; text with no lexicon hits scores exactly 0.0.
/// Deterministic for identical input.
pub fn polarity(text: &str) -> f32 {
    let mut total = 0.0f32;
    let mut hits = 0u32;
    let mut negated_for = 0u8;

    for token in tokenize(text) {
        if lexicon::is_negation(&token) {
            negated_for = NEGATION_WINDOW;
            continue;
        }
        if let Some(score) = lexicon::polarity_of(&token) {
            total += if negated_for > 0 { -score } else { score };
            hits += 1;
        }
        negated_for = negated_for.saturating_sub(1);
    }

    if hits == 0 {
        0.0
    } else {
        (total / hits as f32).clamp(-1.0, 1.0)
    }
}

/// Lowercase alphanumeric tokens, apostrophes folded away so "don't"
/// matches "dont".
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .filter(|token| !token.is_empty())
        .map(|token| token.to_lowercase().replace('\'', ""))
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn praise_scores_positive() {
        assert!(polarity("I love this!") > 0.0);
    }

    #[test]
    fn complaint_scores_negative() {
        assert!(polarity("I hate this.") < 0.0);
    }

    #[test]
    fn unknown_words_are_neutral() {
        assert_eq!(polarity("the quick brown fox jumps over the lazy dog"), 0.0);
    }

    #[test]
    fn negation_flips_polarity() {
        assert!(polarity("not good at all") < 0.0);
        assert!(polarity("don't hate it") > 0.0);
    }

    #[test]
    fn negation_window_expires() {
        // "never" is too far from "good" to flip it.
        assert!(polarity("never have I seen such a good one") > 0.0);
    }

    #[test]
    fn mixed_text_averages() {
        let score = polarity("great photo but terrible caption");
        assert!(score.abs() < 0.5);
    }

    #[test]
    fn score_stays_in_range() {
        let gushing = "amazing incredible perfect stunning wonderful best love";
        let score = polarity(gushing);
        assert!((0.0..=1.0).contains(&score));
        let scathing = "worst awful horrible disgusting trash hate scam";
        let score = polarity(scathing);
        assert!((-1.0..=0.0).contains(&score));
    }

    #[test]
    fn deterministic_for_identical_input() {
        let text = "such a lovely shot, the colors are amazing";
        assert_eq!(polarity(text), polarity(text));
    }

    #[test]
    fn punctuation_and_case_are_ignored() {
        assert_eq!(polarity("LOVE love LoVe"), polarity("love, love... love!"));
    }
}
