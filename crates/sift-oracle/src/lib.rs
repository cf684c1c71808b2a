//! # sift-oracle
//!
//! Blocking HTTP client for the Anthropic messages API, implementing the
//! naming-oracle and bootstrap-labeler traits from `sift-core`. All parsing
//! is strict: anything the model returns that is not the expected JSON shape
//! surfaces as an [`sift_core::errors::OracleError`], which callers treat as
//! "no result", never as a crash.

pub mod client;
pub mod labeling;
pub mod naming;

pub use client::AnthropicClient;
