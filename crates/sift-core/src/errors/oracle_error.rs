/// Errors from the external naming / labeling oracle.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("oracle API key not configured")]
    MissingApiKey,

    #[error("oracle request failed: {message}")]
    Http { message: String },

    #[error("oracle returned no content")]
    EmptyResponse,

    #[error("oracle response was not valid structured output: {detail}")]
    MalformedResponse { detail: String },
}
