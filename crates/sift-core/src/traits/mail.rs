use crate::errors::SiftResult;
use crate::models::NewMessage;

/// An already-authenticated mail account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailAccount {
    pub address: String,
}

/// Capability interface over the external ingestion collaborator.
///
/// Implementations own authentication and provider paging; the orchestrator
/// only ever asks for accounts that are already authenticated and never
/// triggers an interactive enrollment flow.
pub trait IMailSource: Send + Sync {
    fn authenticated_accounts(&self) -> SiftResult<Vec<MailAccount>>;

    /// Fetch messages newer than `since_internal_date` (epoch ms), already
    /// normalized into [`NewMessage`] records.
    fn fetch_new(
        &self,
        account: &MailAccount,
        since_internal_date: Option<i64>,
    ) -> SiftResult<Vec<NewMessage>>;
}
