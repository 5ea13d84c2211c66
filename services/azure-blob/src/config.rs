use std::fmt::{Debug, Formatter};

use blobsign_core::utils::Redact;
use blobsign_core::{Context, Result};

use crate::constants::*;
use crate::{connection_string, Credential};

/// Config carries all the configuration for Azure Blob Storage.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// `account_name` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZBLOB_ACCOUNT_NAME`], then `AZURE_STORAGE_ACCOUNT_NAME`
    pub account_name: Option<String>,
    /// `account_key` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZBLOB_ACCOUNT_KEY`], then `AZURE_STORAGE_ACCOUNT_KEY`
    pub account_key: Option<String>,
    /// `sas_token` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: `AZURE_STORAGE_SAS_TOKEN`
    pub sas_token: Option<String>,
    /// Blob service endpoint, e.g. `https://account.blob.core.windows.net`.
    ///
    /// - env value: [`AZBLOB_ENDPOINT`]
    pub endpoint: Option<String>,
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("account_name", &self.account_name)
            .field("account_key", &Redact::from(&self.account_key))
            .field("sas_token", &Redact::from(&self.sas_token))
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl Config {
    /// Load config from env.
    ///
    /// Fields that are already set are kept.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        if self.account_name.is_none() {
            self.account_name = ctx.env_var_any(&[AZBLOB_ACCOUNT_NAME, AZURE_STORAGE_ACCOUNT_NAME]);
        }
        if self.account_key.is_none() {
            self.account_key = ctx.env_var_any(&[AZBLOB_ACCOUNT_KEY, AZURE_STORAGE_ACCOUNT_KEY]);
        }
        if self.sas_token.is_none() {
            self.sas_token = ctx.env_var_any(&[AZURE_STORAGE_SAS_TOKEN]);
        }
        if self.endpoint.is_none() {
            self.endpoint = ctx.env_var_any(&[AZBLOB_ENDPOINT]);
        }

        self
    }

    /// Parses an [Azure connection string][1] into a configuration object.
    ///
    /// The connection string doesn't have to specify all required parameters
    /// because the user is still allowed to set them later directly on the object.
    ///
    /// An example of a connection string looks like:
    ///
    /// ```txt
    /// AccountName=mystorageaccount;
    /// AccountKey=Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==;
    /// BlobEndpoint=https://mystorageaccount.blob.core.windows.net
    /// ```
    ///
    /// [1]: https://learn.microsoft.com/en-us/azure/storage/common/storage-configure-connection-string
    pub fn try_from_connection_string(conn_str: &str) -> Result<Self> {
        connection_string::parse(conn_str)
    }

    /// Build the credential this config describes.
    ///
    /// A SAS token wins over a shared key.
    pub fn to_credential(&self) -> Option<Credential> {
        if let Some(token) = self.sas_token.as_deref().filter(|v| !v.is_empty()) {
            return Some(Credential::with_sas_token(token));
        }

        match (self.account_name.as_deref(), self.account_key.as_deref()) {
            (Some(name), Some(key)) if !name.is_empty() && !key.is_empty() => {
                Some(Credential::with_shared_key(name, key))
            }
            _ => None,
        }
    }
}
