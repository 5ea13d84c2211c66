use async_trait::async_trait;
use blobsign_core::{Context, ProvideCredential, Result};
use log::debug;

use crate::credential::Credential;
use crate::Config;

/// Loads credentials from `AZBLOB_*` and `AZURE_STORAGE_*` env values.
///
/// `AZURE_STORAGE_SAS_TOKEN` wins over an account key.
#[derive(Clone, Debug, Default)]
pub struct EnvCredentialProvider {}

impl EnvCredentialProvider {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait]
impl ProvideCredential for EnvCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let cred = Config::default().from_env(ctx).to_credential();
        if cred.is_none() {
            debug!("no blob storage credential found in env");
        }
        Ok(cred)
    }
}
