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

use blobsign_core::hash::{base64_decode, base64_hmac_sha256};
use blobsign_core::time::{format_iso8601, DateTime, MAX_FRACTION_DIGITS};
use blobsign_core::{Error, Result};
use log::debug;

use super::query::*;
use super::{SasIpRange, SasPermissions, SasProtocol, SasResource};
use crate::constants::SAS_VERSION;
use crate::Credential;

/// Builder for a service SAS on a container, blob, blob snapshot or blob
/// version.
///
/// ```
/// use blobsign_azure_blob::{BlobSasBuilder, Credential, SasPermissions, SasResource};
///
/// # fn main() -> blobsign_core::Result<()> {
/// let cred = Credential::with_shared_key(
///     "devstoreaccount1",
///     "Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==",
/// );
/// let token = BlobSasBuilder::new(SasResource::Container)
///     .with_container_name("logs")
///     .with_permissions(SasPermissions::READ | SasPermissions::LIST)?
///     .with_expires_on(blobsign_core::time::now() + chrono::TimeDelta::hours(1))
///     .to_sas_query_parameters(&cred)?;
/// assert!(token.signature().is_some());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlobSasBuilder {
    resource: SasResource,
    container_name: String,
    blob_name: String,
    snapshot: Option<String>,
    version_id: Option<String>,
    permissions: SasPermissions,
    starts_on: Option<DateTime>,
    expires_on: Option<DateTime>,
    precision: usize,
    identifier: Option<String>,
    ip_range: Option<SasIpRange>,
    protocol: Option<SasProtocol>,
    encryption_scope: Option<String>,
    cache_control: Option<String>,
    content_disposition: Option<String>,
    content_encoding: Option<String>,
    content_language: Option<String>,
    content_type: Option<String>,
}

impl BlobSasBuilder {
    /// Create a builder for the given resource kind.
    pub fn new(resource: SasResource) -> Self {
        Self {
            resource,
            container_name: String::new(),
            blob_name: String::new(),
            snapshot: None,
            version_id: None,
            permissions: SasPermissions::empty(),
            starts_on: None,
            expires_on: None,
            precision: 0,
            identifier: None,
            ip_range: None,
            protocol: None,
            encryption_scope: None,
            cache_control: None,
            content_disposition: None,
            content_encoding: None,
            content_language: None,
            content_type: None,
        }
    }

    /// Resource kind this builder signs for.
    pub fn resource(&self) -> SasResource {
        self.resource
    }

    /// Permissions currently set.
    pub fn permissions(&self) -> SasPermissions {
        self.permissions
    }

    /// Set the container name.
    pub fn with_container_name(mut self, name: &str) -> Self {
        self.container_name = name.to_string();
        self
    }

    /// Set the blob name, unencoded.
    pub fn with_blob_name(mut self, name: &str) -> Self {
        self.blob_name = name.to_string();
        self
    }

    /// Set the snapshot timestamp, required for [`SasResource::BlobSnapshot`].
    pub fn with_snapshot(mut self, snapshot: &str) -> Self {
        self.snapshot = Some(snapshot.to_string());
        self
    }

    /// Set the version id, required for [`SasResource::BlobVersion`].
    pub fn with_version_id(mut self, version_id: &str) -> Self {
        self.version_id = Some(version_id.to_string());
        self
    }

    /// Replace the permission set.
    ///
    /// Flags the resource kind doesn't accept are rejected here and the
    /// builder keeps its previous permissions.
    pub fn set_permissions(&mut self, permissions: SasPermissions) -> Result<()> {
        permissions.validate_for(self.resource)?;
        self.permissions = permissions;
        Ok(())
    }

    /// Builder-style [`BlobSasBuilder::set_permissions`].
    pub fn with_permissions(mut self, permissions: SasPermissions) -> Result<Self> {
        self.set_permissions(permissions)?;
        Ok(self)
    }

    /// Set the time the SAS becomes valid.
    pub fn with_starts_on(mut self, starts_on: DateTime) -> Self {
        self.starts_on = Some(starts_on);
        self
    }

    /// Set the time the SAS expires.
    pub fn with_expires_on(mut self, expires_on: DateTime) -> Self {
        self.expires_on = Some(expires_on);
        self
    }

    /// Set the number of fractional second digits in `st` and `se`.
    pub fn with_time_precision(mut self, precision: usize) -> Result<Self> {
        if precision > MAX_FRACTION_DIGITS {
            return Err(Error::invalid_argument(format!(
                "fractional second precision must be between 0 and {MAX_FRACTION_DIGITS}, got {precision}"
            )));
        }
        self.precision = precision;
        Ok(self)
    }

    /// Reference a stored access policy on the container.
    pub fn with_identifier(mut self, identifier: &str) -> Self {
        self.identifier = Some(identifier.to_string());
        self
    }

    /// Restrict the SAS to an address or an address range.
    pub fn with_ip_range(mut self, ip_range: SasIpRange) -> Self {
        self.ip_range = Some(ip_range);
        self
    }

    /// Restrict the protocols the SAS may be used with.
    pub fn with_protocol(mut self, protocol: SasProtocol) -> Self {
        self.protocol = Some(protocol);
        self
    }

    /// Require the given encryption scope for writes made with the SAS.
    pub fn with_encryption_scope(mut self, scope: &str) -> Self {
        self.encryption_scope = Some(scope.to_string());
        self
    }

    /// Override the `Cache-Control` response header.
    pub fn with_cache_control(mut self, v: &str) -> Self {
        self.cache_control = Some(v.to_string());
        self
    }

    /// Override the `Content-Disposition` response header.
    pub fn with_content_disposition(mut self, v: &str) -> Self {
        self.content_disposition = Some(v.to_string());
        self
    }

    /// Override the `Content-Encoding` response header.
    pub fn with_content_encoding(mut self, v: &str) -> Self {
        self.content_encoding = Some(v.to_string());
        self
    }

    /// Override the `Content-Language` response header.
    pub fn with_content_language(mut self, v: &str) -> Self {
        self.content_language = Some(v.to_string());
        self
    }

    /// Override the `Content-Type` response header.
    pub fn with_content_type(mut self, v: &str) -> Self {
        self.content_type = Some(v.to_string());
        self
    }

    fn check(&self) -> Result<()> {
        if self.container_name.is_empty() {
            return Err(Error::invalid_state("container name is required"));
        }
        if self.resource.is_blob() && self.blob_name.is_empty() {
            return Err(Error::invalid_state(format!(
                "blob name is required for {} resources",
                self.resource
            )));
        }
        match self.resource {
            SasResource::BlobSnapshot if is_empty(&self.snapshot) => {
                return Err(Error::invalid_state(
                    "snapshot is required for blob snapshot resources",
                ));
            }
            SasResource::BlobVersion if is_empty(&self.version_id) => {
                return Err(Error::invalid_state(
                    "version id is required for blob version resources",
                ));
            }
            _ => {}
        }

        // A stored access policy may carry the expiry and permissions.
        if self.identifier.is_none() {
            if self.expires_on.is_none() {
                return Err(Error::invalid_state(
                    "expiry is required when no stored access policy is referenced",
                ));
            }
            if self.permissions.is_empty() {
                return Err(Error::invalid_state(
                    "permissions are required when no stored access policy is referenced",
                ));
            }
        }

        Ok(())
    }

    fn canonicalized_resource(&self, account_name: &str) -> String {
        let mut s = format!("/blob/{account_name}/{}", self.container_name);
        if self.resource.is_blob() {
            s.push('/');
            s.push_str(&self.blob_name);
        }
        s
    }

    fn snapshot_time(&self) -> &str {
        match self.resource {
            SasResource::BlobSnapshot => self.snapshot.as_deref().unwrap_or_default(),
            SasResource::BlobVersion => self.version_id.as_deref().unwrap_or_default(),
            _ => "",
        }
    }

    fn format_time(&self, t: Option<DateTime>) -> Result<String> {
        t.map(|t| format_iso8601(t, self.precision))
            .transpose()
            .map(Option::unwrap_or_default)
    }

    /// Build the string that gets signed for `account_name`.
    ///
    /// Every field has a fixed slot; absent fields are empty lines.
    pub fn string_to_sign(&self, account_name: &str) -> Result<String> {
        self.check()?;

        let ip_range = self.ip_range.map(|v| v.to_string()).unwrap_or_default();
        let fields = [
            self.permissions.to_permission_string(),
            self.format_time(self.starts_on)?,
            self.format_time(self.expires_on)?,
            self.canonicalized_resource(account_name),
            self.identifier.clone().unwrap_or_default(),
            ip_range,
            self.protocol.map(|v| v.to_string()).unwrap_or_default(),
            SAS_VERSION.to_string(),
            self.resource.as_str().to_string(),
            self.snapshot_time().to_string(),
            self.encryption_scope.clone().unwrap_or_default(),
            self.cache_control.clone().unwrap_or_default(),
            self.content_disposition.clone().unwrap_or_default(),
            self.content_encoding.clone().unwrap_or_default(),
            self.content_language.clone().unwrap_or_default(),
            self.content_type.clone().unwrap_or_default(),
        ];

        Ok(fields.join("\n"))
    }

    /// Sign with a shared key credential and return the query parameters.
    ///
    /// The builder is left untouched, so calling this again with the same
    /// credential yields the same token.
    pub fn to_sas_query_parameters(&self, cred: &Credential) -> Result<SasQueryParameters> {
        let (account_name, account_key) = cred.shared_key()?;

        let string_to_sign = self.string_to_sign(account_name)?;
        debug!(
            "signing SAS for resource {} ({})",
            self.canonicalized_resource(account_name),
            self.resource.as_str()
        );

        let key = base64_decode(account_key)?;
        let signature = base64_hmac_sha256(&key, string_to_sign.as_bytes())?;

        let mut params = SasQueryParameters::default();
        params.push(SIGNED_VERSION, SAS_VERSION);
        params.push(SIGNED_RESOURCE, self.resource.as_str());
        // Empty only when a stored access policy carries the permissions.
        params.push_opt(
            SIGNED_PERMISSIONS,
            Some(self.permissions.to_permission_string().as_str()),
        );
        params.push_opt(SIGNED_START, Some(self.format_time(self.starts_on)?.as_str()));
        params.push_opt(SIGNED_EXPIRY, Some(self.format_time(self.expires_on)?.as_str()));
        params.push_opt(SIGNED_IDENTIFIER, self.identifier.as_deref());
        params.push_opt(
            SIGNED_IP,
            self.ip_range.map(|v| v.to_string()).as_deref(),
        );
        params.push_opt(SIGNED_PROTOCOL, self.protocol.map(|v| v.as_str()));
        params.push_opt(SIGNED_ENCRYPTION_SCOPE, self.encryption_scope.as_deref());
        params.push_opt(CACHE_CONTROL, self.cache_control.as_deref());
        params.push_opt(CONTENT_DISPOSITION, self.content_disposition.as_deref());
        params.push_opt(CONTENT_ENCODING, self.content_encoding.as_deref());
        params.push_opt(CONTENT_LANGUAGE, self.content_language.as_deref());
        params.push_opt(CONTENT_TYPE, self.content_type.as_deref());
        params.push(SIGNATURE, signature);

        Ok(params)
    }
}

fn is_empty(v: &Option<String>) -> bool {
    v.as_deref().map_or(true, str::is_empty)
}
