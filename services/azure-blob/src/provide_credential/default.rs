use crate::provide_credential::{ConnectionStringCredentialProvider, EnvCredentialProvider};
use crate::Credential;
use async_trait::async_trait;
use blobsign_core::{Context, ProvideCredential, ProvideCredentialChain, Result};

/// Default loader that tries multiple credential sources in order.
///
/// 1. Env values (account key, SAS token)
/// 2. `AZURE_STORAGE_CONNECTION_STRING`
#[derive(Debug)]
pub struct DefaultCredentialProvider {
    chain: ProvideCredentialChain<Credential>,
}

impl Default for DefaultCredentialProvider {
    fn default() -> Self {
        let chain = ProvideCredentialChain::new()
            .push(EnvCredentialProvider::new())
            .push(ConnectionStringCredentialProvider::new());

        Self { chain }
    }
}

impl DefaultCredentialProvider {
    /// Create a new default loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Try `provider` before the default sources.
    pub fn push_front(self, provider: impl ProvideCredential<Credential = Credential>) -> Self {
        let chain = ProvideCredentialChain::new()
            .push(provider)
            .push(EnvCredentialProvider::new())
            .push(ConnectionStringCredentialProvider::new());

        Self { chain }
    }
}

#[async_trait]
impl ProvideCredential for DefaultCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        self.chain.provide_credential(ctx).await
    }
}
