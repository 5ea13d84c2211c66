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

//! Server-side encryption request headers.
//!
//! - [Encryption scopes](https://learn.microsoft.com/en-us/azure/storage/blobs/encryption-scope-overview)
//! - [Customer-provided keys](https://learn.microsoft.com/en-us/rest/api/storageservices/encryption-customer-provided-keys)

use std::fmt::{Debug, Formatter};

use blobsign_core::hash::{base64_encode, base64_sha256};
use blobsign_core::utils::Redact;
use blobsign_core::{Error, Result};
use http::{HeaderMap, HeaderValue};

use crate::constants::*;

/// Encryption scope used for a single blob write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncryptionScope {
    scope: String,
}

impl EncryptionScope {
    /// Create a new encryption scope.
    pub fn new(scope: &str) -> Result<Self> {
        if scope.is_empty() {
            return Err(Error::invalid_argument("encryption scope must not be empty"));
        }
        Ok(Self {
            scope: scope.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.scope
    }

    /// Insert `x-ms-encryption-scope`.
    pub fn apply(&self, headers: &mut HeaderMap) -> Result<()> {
        headers.insert(X_MS_ENCRYPTION_SCOPE, HeaderValue::from_str(&self.scope)?);
        Ok(())
    }
}

/// Default encryption scope set when a container is created.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContainerEncryptionScope {
    default_scope: String,
    deny_override: bool,
}

impl ContainerEncryptionScope {
    /// Use `default_scope` for every blob in the container.
    ///
    /// With `deny_override`, writes can't pick another scope.
    pub fn new(default_scope: &str, deny_override: bool) -> Result<Self> {
        if default_scope.is_empty() {
            return Err(Error::invalid_argument(
                "default encryption scope must not be empty",
            ));
        }
        Ok(Self {
            default_scope: default_scope.to_string(),
            deny_override,
        })
    }

    /// Insert `x-ms-default-encryption-scope` and
    /// `x-ms-deny-encryption-scope-override`.
    pub fn apply(&self, headers: &mut HeaderMap) -> Result<()> {
        headers.insert(
            X_MS_DEFAULT_ENCRYPTION_SCOPE,
            HeaderValue::from_str(&self.default_scope)?,
        );
        headers.insert(
            X_MS_DENY_ENCRYPTION_SCOPE_OVERRIDE,
            HeaderValue::from_static(if self.deny_override { "true" } else { "false" }),
        );
        Ok(())
    }
}

/// A customer-provided AES-256 key sent with each request.
#[derive(Clone, PartialEq, Eq)]
pub struct CustomerProvidedKey {
    key: String,
    key_sha256: String,
}

impl Debug for CustomerProvidedKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomerProvidedKey")
            .field("key", &Redact::from(&self.key))
            .field("key_sha256", &self.key_sha256)
            .finish()
    }
}

impl CustomerProvidedKey {
    /// The only algorithm the service supports.
    pub const ALGORITHM: &'static str = "AES256";

    /// Build from the raw 256-bit key.
    pub fn from_key_bytes(key: &[u8]) -> Result<Self> {
        if key.len() != 32 {
            return Err(Error::invalid_argument(format!(
                "customer-provided key must be 32 bytes, got {}",
                key.len()
            )));
        }

        Ok(Self {
            key: base64_encode(key),
            key_sha256: base64_sha256(key),
        })
    }

    /// Base64 encoded SHA-256 of the key.
    pub fn key_sha256(&self) -> &str {
        &self.key_sha256
    }

    /// Insert the key, its hash and the algorithm.
    ///
    /// The key header is marked sensitive.
    pub fn apply(&self, headers: &mut HeaderMap) -> Result<()> {
        let mut key = HeaderValue::from_str(&self.key)?;
        key.set_sensitive(true);

        headers.insert(X_MS_ENCRYPTION_KEY, key);
        headers.insert(
            X_MS_ENCRYPTION_KEY_SHA256,
            HeaderValue::from_str(&self.key_sha256)?,
        );
        headers.insert(
            X_MS_ENCRYPTION_ALGORITHM,
            HeaderValue::from_static(Self::ALGORITHM),
        );
        Ok(())
    }
}
