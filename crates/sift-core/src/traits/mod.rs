//! Collaborator traits the engines are written against.

pub mod mail;
pub mod oracle;
pub mod storage;

pub use mail::{IMailSource, MailAccount};
pub use oracle::{
    ILabelOracle, INamingOracle, LabelRequestItem, LabelVote, NamingRequest, NamingVerdict,
    SampleMessage,
};
pub use storage::IMessageStore;
