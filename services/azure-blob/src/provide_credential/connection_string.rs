use async_trait::async_trait;
use blobsign_core::{Context, ProvideCredential, Result};
use log::debug;

use crate::constants::AZURE_STORAGE_CONNECTION_STRING;
use crate::credential::Credential;
use crate::Config;

/// Loads credentials from a connection string.
///
/// Uses the string given to [`ConnectionStringCredentialProvider::with_connection_string`],
/// falling back to `AZURE_STORAGE_CONNECTION_STRING`. A malformed string
/// fails with `ConfigInvalid` rather than being skipped.
#[derive(Clone, Default)]
pub struct ConnectionStringCredentialProvider {
    connection_string: Option<String>,
}

impl std::fmt::Debug for ConnectionStringCredentialProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionStringCredentialProvider")
            .field("connection_string", &self.connection_string.as_ref().map(|_| "***"))
            .finish()
    }
}

impl ConnectionStringCredentialProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use this connection string instead of the env value.
    pub fn with_connection_string(mut self, conn_str: &str) -> Self {
        self.connection_string = Some(conn_str.to_string());
        self
    }
}

#[async_trait]
impl ProvideCredential for ConnectionStringCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let conn_str = match &self.connection_string {
            Some(v) => v.clone(),
            None => match ctx.env_var_any(&[AZURE_STORAGE_CONNECTION_STRING]) {
                Some(v) => v,
                None => {
                    debug!("{AZURE_STORAGE_CONNECTION_STRING} is not set");
                    return Ok(None);
                }
            },
        };

        Ok(Config::try_from_connection_string(&conn_str)?.to_credential())
    }
}
