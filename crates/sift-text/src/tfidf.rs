//! Bounded-vocabulary TF-IDF vectorizer: fit on a corpus, transform documents
//! into L2-normalized sparse vectors.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::sparse::SparseVector;
use crate::tokenize::{ngrams, tokenize};

/// Vectorizer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfConfig {
    /// Keep only the `max_features` most frequent terms across the corpus.
    pub max_features: usize,
    /// 1 = unigrams, 2 = unigrams + bigrams.
    pub ngram_max: usize,
    /// Dampen term frequency with `1 + ln(tf)`.
    pub sublinear_tf: bool,
}

impl TfidfConfig {
    pub fn unigram(max_features: usize) -> Self {
        Self {
            max_features,
            ngram_max: 1,
            sublinear_tf: false,
        }
    }
}

/// A fitted TF-IDF vocabulary with per-term inverse document frequencies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    config: TfidfConfig,
    vocabulary: Vec<String>,
    index: HashMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Fit a vocabulary on the corpus: terms ranked by corpus frequency,
    /// capped at `max_features`, with smoothed IDF
    /// `ln((1 + n) / (1 + df)) + 1`.
    pub fn fit(config: TfidfConfig, documents: &[String]) -> Self {
        let tokenized: Vec<Vec<String>> = documents
            .iter()
            .map(|d| ngrams(&tokenize(d), config.ngram_max))
            .collect();

        // Corpus frequency and document frequency per term.
        let mut corpus_freq: HashMap<&str, usize> = HashMap::new();
        let mut doc_freq: HashMap<&str, usize> = HashMap::new();
        for terms in &tokenized {
            let mut seen: HashSet<&str> = HashSet::new();
            for term in terms {
                *corpus_freq.entry(term.as_str()).or_insert(0) += 1;
                seen.insert(term.as_str());
            }
            for term in seen {
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        // Rank by corpus frequency (ties broken alphabetically for
        // determinism), cap, then sort the surviving vocabulary.
        let mut ranked: Vec<(&str, usize)> = corpus_freq.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(config.max_features);

        let mut vocabulary: Vec<String> = ranked.iter().map(|(t, _)| t.to_string()).collect();
        vocabulary.sort();

        let index: HashMap<String, usize> = vocabulary
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();

        let n_docs = documents.len() as f64;
        let idf = vocabulary
            .iter()
            .map(|term| {
                let df = doc_freq.get(term.as_str()).copied().unwrap_or(0) as f64;
                ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        Self {
            config,
            vocabulary,
            index,
            idf,
        }
    }

    /// Transform a document into an L2-normalized sparse TF-IDF vector.
    /// Terms outside the vocabulary are ignored.
    pub fn transform(&self, document: &str) -> SparseVector {
        let terms = ngrams(&tokenize(document), self.config.ngram_max);
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for term in &terms {
            if let Some(&index) = self.index.get(term.as_str()) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let entries = counts
            .into_iter()
            .map(|(index, tf)| {
                let tf = if self.config.sublinear_tf {
                    1.0 + tf.ln()
                } else {
                    tf
                };
                (index, tf * self.idf[index])
            })
            .collect();

        let mut vector = SparseVector::new(entries);
        vector.l2_normalize();
        vector
    }

    pub fn transform_all(&self, documents: &[String]) -> Vec<SparseVector> {
        documents.iter().map(|d| self.transform(d)).collect()
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vocabulary.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<String> {
        vec![
            "flight booking confirmation airline ticket".to_string(),
            "airline flight delayed gate change".to_string(),
            "payment receipt subscription renewal invoice".to_string(),
            "invoice payment overdue reminder".to_string(),
        ]
    }

    #[test]
    fn fit_builds_bounded_vocabulary() {
        let vectorizer = TfidfVectorizer::fit(TfidfConfig::unigram(5), &corpus());
        assert_eq!(vectorizer.len(), 5);
    }

    #[test]
    fn transform_is_unit_length() {
        let vectorizer = TfidfVectorizer::fit(TfidfConfig::unigram(100), &corpus());
        let vector = vectorizer.transform("airline flight payment");
        assert!((vector.norm() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_terms_produce_empty_vector() {
        let vectorizer = TfidfVectorizer::fit(TfidfConfig::unigram(100), &corpus());
        let vector = vectorizer.transform("zzz qqq www");
        assert!(vector.is_empty());
    }

    #[test]
    fn similar_documents_are_closer_than_dissimilar() {
        let vectorizer = TfidfVectorizer::fit(TfidfConfig::unigram(100), &corpus());
        let a = vectorizer.transform("flight airline gate");
        let b = vectorizer.transform("airline flight delayed");
        let c = vectorizer.transform("payment invoice receipt");
        let close = crate::sparse::cosine_distance(&a, &b);
        let far = crate::sparse::cosine_distance(&a, &c);
        assert!(close < far);
    }

    #[test]
    fn rare_terms_weigh_more_than_common_ones() {
        let documents = vec![
            "shared rare1".to_string(),
            "shared rare2".to_string(),
            "shared rare3".to_string(),
            "shared rare4".to_string(),
        ];
        let vectorizer = TfidfVectorizer::fit(TfidfConfig::unigram(100), &documents);
        let vector = vectorizer.transform("shared rare1");
        let shared_idx = vectorizer
            .vocabulary()
            .iter()
            .position(|t| t == "shared")
            .unwrap();
        let rare_idx = vectorizer
            .vocabulary()
            .iter()
            .position(|t| t == "rare1")
            .unwrap();
        assert!(vector.value_at(rare_idx) > vector.value_at(shared_idx));
    }

    #[test]
    fn bigram_config_captures_phrases() {
        let documents = vec![
            "order shipped yesterday".to_string(),
            "order shipped today".to_string(),
        ];
        let config = TfidfConfig {
            max_features: 100,
            ngram_max: 2,
            sublinear_tf: true,
        };
        let vectorizer = TfidfVectorizer::fit(config, &documents);
        assert!(vectorizer.vocabulary().iter().any(|t| t == "order shipped"));
    }
}
