/// Errors from model training and artifact handling.
#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error("no labeled messages available for training")]
    NoTrainingData,

    #[error("failed to encode model artifact: {message}")]
    ArtifactEncode { message: String },

    #[error("failed to decode model artifact at {path}: {message}")]
    ArtifactDecode { path: String, message: String },
}
