//! Sign-in, sign-up and sign-out on top of the dispatcher.

use tracing::info;

use crate::client::ApiClient;
use crate::envelope::ApiResponse;
use crate::error::AccountError;
use crate::session::Session;
use crate::types::{Login, Register};

#[derive(Clone)]
pub struct AccountService {
    client: ApiClient,
}

impl AccountService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// The session left by a previous login, if it is still cached.
    pub fn current_user(&self) -> Result<Option<Session>, AccountError> {
        Ok(self.client.sessions().current()?)
    }

    /// Authenticate and cache the returned session.
    pub fn login(&self, credentials: &Login) -> Result<Session, AccountError> {
        let response: ApiResponse<Session> = self.client.post("account/authenticate", credentials);
        if !response.success() {
            return Err(AccountError::Rejected(response.string_errors()));
        }
        let session = response.into_data().ok_or(AccountError::MissingSession)?;
        self.client.sessions().save(&session)?;
        info!(email = %session.email, "signed in");
        Ok(session)
    }

    pub fn register(&self, model: &Register) -> Result<(), AccountError> {
        let response: ApiResponse = self.client.post("account/register", model);
        if !response.success() {
            return Err(AccountError::Rejected(response.string_errors()));
        }
        Ok(())
    }

    /// Forget the cached session. The server is not contacted.
    pub fn logout(&self) -> Result<(), AccountError> {
        self.client.sessions().clear()?;
        Ok(())
    }
}
