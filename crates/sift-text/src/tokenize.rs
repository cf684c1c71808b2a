//! Whitespace + lowercase tokenizer with stop word removal, plus n-gram
//! expansion for the training vectorizer.

/// Tokenize into lowercase alphanumeric terms, dropping stop words and terms
/// shorter than three characters.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|w| {
            w.chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
                .to_lowercase()
        })
        .filter(|w| w.len() > 2 && !is_stop_word(w))
        .collect()
}

/// Expand tokens into unigrams plus joined n-grams up to `max_n`.
/// `max_n = 1` returns the tokens unchanged.
pub fn ngrams(tokens: &[String], max_n: usize) -> Vec<String> {
    if max_n <= 1 || tokens.len() < 2 {
        return tokens.to_vec();
    }
    let mut terms = tokens.to_vec();
    for n in 2..=max_n.min(tokens.len()) {
        for window in tokens.windows(n) {
            terms.push(window.join(" "));
        }
    }
    terms
}

fn is_stop_word(word: &str) -> bool {
    matches!(
        word,
        "the"
            | "and"
            | "for"
            | "are"
            | "but"
            | "not"
            | "you"
            | "your"
            | "all"
            | "any"
            | "can"
            | "had"
            | "her"
            | "was"
            | "one"
            | "our"
            | "out"
            | "has"
            | "have"
            | "been"
            | "from"
            | "this"
            | "that"
            | "with"
            | "they"
            | "will"
            | "each"
            | "were"
            | "when"
            | "where"
            | "which"
            | "their"
            | "there"
            | "here"
            | "said"
            | "what"
            | "its"
            | "into"
            | "more"
            | "most"
            | "some"
            | "such"
            | "only"
            | "other"
            | "than"
            | "then"
            | "them"
            | "these"
            | "would"
            | "could"
            | "should"
            | "about"
            | "after"
            | "before"
            | "please"
            | "also"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_punctuation_and_lowercases() {
        let tokens = tokenize("Hello, World! Order #12345 shipped.");
        assert_eq!(tokens, vec!["hello", "world", "order", "12345", "shipped"]);
    }

    #[test]
    fn removes_stop_words_and_short_terms() {
        let tokens = tokenize("the offer is for you and it will be ok");
        assert_eq!(tokens, vec!["offer"]);
    }

    #[test]
    fn bigrams_include_unigrams() {
        let tokens = vec!["order".to_string(), "shipped".to_string(), "today".to_string()];
        let terms = ngrams(&tokens, 2);
        assert_eq!(
            terms,
            vec!["order", "shipped", "today", "order shipped", "shipped today"]
        );
    }

    #[test]
    fn unigram_mode_is_identity() {
        let tokens = vec!["order".to_string(), "shipped".to_string()];
        assert_eq!(ngrams(&tokens, 1), tokens);
    }
}
