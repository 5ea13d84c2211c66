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

use std::fmt;
use std::str::FromStr;

use blobsign_core::utils::Redact;
use blobsign_core::{Error, Result};
use percent_encoding::{percent_decode_str, utf8_percent_encode};

use super::{SasPermissions, SasResource};
use crate::constants::AZURE_QUERY_ENCODE_SET;

pub(crate) const SIGNED_VERSION: &str = "sv";
pub(crate) const SIGNED_RESOURCE: &str = "sr";
pub(crate) const SIGNED_PERMISSIONS: &str = "sp";
pub(crate) const SIGNED_START: &str = "st";
pub(crate) const SIGNED_EXPIRY: &str = "se";
pub(crate) const SIGNED_IDENTIFIER: &str = "si";
pub(crate) const SIGNED_IP: &str = "sip";
pub(crate) const SIGNED_PROTOCOL: &str = "spr";
pub(crate) const SIGNED_ENCRYPTION_SCOPE: &str = "ses";
pub(crate) const CACHE_CONTROL: &str = "rscc";
pub(crate) const CONTENT_DISPOSITION: &str = "rscd";
pub(crate) const CONTENT_ENCODING: &str = "rsce";
pub(crate) const CONTENT_LANGUAGE: &str = "rscl";
pub(crate) const CONTENT_TYPE: &str = "rsct";
pub(crate) const SIGNATURE: &str = "sig";

/// The signed query parameters of a SAS token.
///
/// Values are stored decoded; [`SasQueryParameters::to_query_string`]
/// percent-encodes them.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SasQueryParameters {
    params: Vec<(String, String)>,
}

impl SasQueryParameters {
    pub(crate) fn push(&mut self, key: &str, value: impl Into<String>) {
        self.params.push((key.to_string(), value.into()));
    }

    /// Push `value` only if it's present and not empty.
    pub(crate) fn push_opt(&mut self, key: &str, value: Option<&str>) {
        if let Some(v) = value.filter(|v| !v.is_empty()) {
            self.push(key, v);
        }
    }

    /// Look up a parameter by name.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Whether there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Signed service version, `sv`.
    pub fn version(&self) -> Option<&str> {
        self.get(SIGNED_VERSION)
    }

    /// Signed resource, `sr`.
    pub fn resource(&self) -> Result<Option<SasResource>> {
        self.get(SIGNED_RESOURCE).map(str::parse).transpose()
    }

    /// Signed permissions, `sp`. Missing permissions parse as empty.
    pub fn permissions(&self) -> Result<SasPermissions> {
        self.get(SIGNED_PERMISSIONS)
            .map(str::parse)
            .unwrap_or(Ok(SasPermissions::empty()))
    }

    /// Signed start, `st`, as it was formatted.
    pub fn starts_on(&self) -> Option<&str> {
        self.get(SIGNED_START)
    }

    /// Signed expiry, `se`, as it was formatted.
    pub fn expires_on(&self) -> Option<&str> {
        self.get(SIGNED_EXPIRY)
    }

    /// Stored access policy id, `si`.
    pub fn identifier(&self) -> Option<&str> {
        self.get(SIGNED_IDENTIFIER)
    }

    /// Signature, `sig`.
    pub fn signature(&self) -> Option<&str> {
        self.get(SIGNATURE)
    }

    /// Percent-encoded query string without the leading `?`.
    pub fn to_query_string(&self) -> String {
        self.params
            .iter()
            .map(|(k, v)| format!("{k}={}", utf8_percent_encode(v, &AZURE_QUERY_ENCODE_SET)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Append the token to a resource URL, respecting an existing query.
    pub fn append_to_url(&self, url: &str) -> String {
        let sep = if url.contains('?') { '&' } else { '?' };
        format!("{url}{sep}{}", self.to_query_string())
    }
}

fn decode(v: &str) -> Result<String> {
    percent_decode_str(v)
        .decode_utf8()
        .map(|v| v.into_owned())
        .map_err(|e| {
            Error::invalid_argument(format!("'{v}' is not valid percent-encoded UTF-8"))
                .with_source(e)
        })
}

/// Parse a SAS token, with or without the leading `?`.
///
/// Parameters that are not part of a SAS are kept, so a full resource
/// query can be parsed too. A literal `+` stays a `+`, so a signature
/// pasted without encoding still parses to the right value.
impl FromStr for SasQueryParameters {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim_start_matches('?');
        let params = s
            .split('&')
            .filter(|v| !v.is_empty())
            .map(|pair| {
                let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
                Ok((decode(k)?, decode(v)?))
            })
            .collect::<Result<Vec<_>>>()?;

        if !params.iter().any(|(k, _)| k == SIGNATURE) {
            return Err(Error::invalid_argument(
                "SAS token must contain a signature",
            ));
        }

        Ok(Self { params })
    }
}

impl fmt::Display for SasQueryParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

impl fmt::Debug for SasQueryParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut m = f.debug_map();
        for (k, v) in &self.params {
            if k == SIGNATURE {
                m.entry(k, &Redact::from(v));
            } else {
                m.entry(k, v);
            }
        }
        m.finish()
    }
}
