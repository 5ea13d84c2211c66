// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use blobsign_core::utils::Redact;
use blobsign_core::{Error, Result, SigningCredential};
use std::fmt::{Debug, Formatter};

/// Credential enum for the blob storage authorization methods.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// Shared Key authorization with account name and base64 encoded key.
    ///
    /// This is the only credential that can mint SAS tokens.
    SharedKey {
        /// Storage account name.
        account_name: String,
        /// Storage account key, base64 encoded.
        account_key: String,
    },
    /// A SAS token issued elsewhere, appended verbatim to request queries.
    SasToken {
        /// SAS token without the leading `?`.
        token: String,
    },
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Credential::SharedKey {
                account_name,
                account_key,
            } => f
                .debug_struct("Credential::SharedKey")
                .field("account_name", &account_name)
                .field("account_key", &Redact::from(account_key))
                .finish(),
            Credential::SasToken { token } => f
                .debug_struct("Credential::SasToken")
                .field("token", &Redact::from(token))
                .finish(),
        }
    }
}

impl SigningCredential for Credential {
    fn is_valid(&self) -> bool {
        match self {
            Credential::SharedKey {
                account_name,
                account_key,
            } => !account_name.is_empty() && !account_key.is_empty(),
            Credential::SasToken { token } => !token.is_empty(),
        }
    }
}

impl Credential {
    /// Create a new credential with shared key authentication.
    pub fn with_shared_key(account_name: &str, account_key: &str) -> Self {
        Self::SharedKey {
            account_name: account_name.to_string(),
            account_key: account_key.to_string(),
        }
    }

    /// Create a new credential with SAS token authentication.
    ///
    /// A leading `?` is stripped.
    pub fn with_sas_token(sas_token: &str) -> Self {
        Self::SasToken {
            token: sas_token.trim_start_matches('?').to_string(),
        }
    }

    /// Borrow account name and key, failing for credentials that can't sign.
    pub(crate) fn shared_key(&self) -> Result<(&str, &str)> {
        match self {
            Credential::SharedKey {
                account_name,
                account_key,
            } => {
                if account_name.is_empty() || account_key.is_empty() {
                    return Err(Error::credential_invalid(
                        "shared key credential requires both account name and account key",
                    ));
                }
                Ok((account_name, account_key))
            }
            Credential::SasToken { .. } => Err(Error::credential_invalid(
                "a SAS token credential can't be used to sign new SAS tokens",
            )),
        }
    }
}
