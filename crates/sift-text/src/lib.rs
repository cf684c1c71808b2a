//! # sift-text
//!
//! Text representation shared by training, classification, and discovery:
//! tokenization with stop-word removal, bounded-vocabulary TF-IDF, and the
//! sparse-vector math the clustering algorithms run on.

pub mod sparse;
pub mod tfidf;
pub mod tokenize;

pub use sparse::SparseVector;
pub use tfidf::{TfidfConfig, TfidfVectorizer};
