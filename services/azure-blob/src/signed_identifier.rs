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

//! Stored access policies, the body of the container ACL calls.
//!
//! - [Set Container ACL](https://learn.microsoft.com/en-us/rest/api/storageservices/set-container-acl)

use blobsign_core::time::{format_iso8601, parse_rfc3339, DateTime, MAX_FRACTION_DIGITS};
use blobsign_core::{Error, Result};
use quick_xml::{de, se};
use serde::{Deserialize, Serialize};

use crate::SasPermissions;

/// Longest identifier the service accepts.
pub const MAX_IDENTIFIER_LEN: usize = 64;

/// Most identifiers a single container can carry.
pub const MAX_SIGNED_IDENTIFIERS: usize = 5;

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;

/// A stored access policy that a SAS can reference by id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedIdentifier {
    id: String,
    starts_on: Option<DateTime>,
    expires_on: Option<DateTime>,
    permissions: SasPermissions,
}

impl SignedIdentifier {
    /// Create an identifier; ids longer than 64 characters are rejected.
    pub fn new(id: &str, permissions: SasPermissions) -> Result<Self> {
        if id.is_empty() || id.chars().count() > MAX_IDENTIFIER_LEN {
            return Err(Error::invalid_argument(format!(
                "signed identifier must be 1 to {MAX_IDENTIFIER_LEN} characters, got {}",
                id.chars().count()
            )));
        }

        Ok(Self {
            id: id.to_string(),
            starts_on: None,
            expires_on: None,
            permissions,
        })
    }

    /// Set when the policy becomes valid.
    pub fn with_starts_on(mut self, starts_on: DateTime) -> Self {
        self.starts_on = Some(starts_on);
        self
    }

    /// Set when the policy expires.
    pub fn with_expires_on(mut self, expires_on: DateTime) -> Self {
        self.expires_on = Some(expires_on);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn starts_on(&self) -> Option<DateTime> {
        self.starts_on
    }

    pub fn expires_on(&self) -> Option<DateTime> {
        self.expires_on
    }

    pub fn permissions(&self) -> SasPermissions {
        self.permissions
    }
}

#[derive(Default, Debug, Serialize, Deserialize)]
#[serde(rename = "SignedIdentifiers")]
struct SignedIdentifiersXml {
    #[serde(rename = "SignedIdentifier", default)]
    items: Vec<SignedIdentifierXml>,
}

#[derive(Default, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct SignedIdentifierXml {
    id: String,
    access_policy: AccessPolicyXml,
}

#[derive(Default, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct AccessPolicyXml {
    #[serde(skip_serializing_if = "Option::is_none")]
    start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expiry: Option<String>,
    permission: String,
}

fn format_time(t: Option<DateTime>) -> Result<Option<String>> {
    t.map(|t| format_iso8601(t, MAX_FRACTION_DIGITS)).transpose()
}

fn parse_time(s: Option<String>) -> Result<Option<DateTime>> {
    s.filter(|v| !v.trim().is_empty())
        .map(|v| parse_rfc3339(v.trim()))
        .transpose()
}

/// Serialize identifiers into a "set container ACL" request body.
pub fn signed_identifiers_to_xml(identifiers: &[SignedIdentifier]) -> Result<String> {
    if identifiers.len() > MAX_SIGNED_IDENTIFIERS {
        return Err(Error::invalid_argument(format!(
            "at most {MAX_SIGNED_IDENTIFIERS} signed identifiers are allowed, got {}",
            identifiers.len()
        )));
    }

    let items = identifiers
        .iter()
        .map(|v| {
            Ok(SignedIdentifierXml {
                id: v.id.clone(),
                access_policy: AccessPolicyXml {
                    start: format_time(v.starts_on)?,
                    expiry: format_time(v.expires_on)?,
                    permission: v.permissions.to_permission_string(),
                },
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let body = se::to_string(&SignedIdentifiersXml { items }).map_err(|e| {
        Error::unexpected("failed to serialize signed identifiers").with_source(e)
    })?;

    Ok(format!("{XML_DECLARATION}{body}"))
}

/// Parse the body of a "get container ACL" response.
pub fn signed_identifiers_from_xml(content: &str) -> Result<Vec<SignedIdentifier>> {
    let xml: SignedIdentifiersXml = de::from_str(content).map_err(|e| {
        Error::unexpected("failed to deserialize signed identifiers").with_source(e)
    })?;

    xml.items
        .into_iter()
        .map(|v| {
            let permissions = v.access_policy.permission.parse()?;
            let mut identifier = SignedIdentifier::new(&v.id, permissions)?;
            identifier.starts_on = parse_time(v.access_policy.start)?;
            identifier.expires_on = parse_time(v.access_policy.expiry)?;
            Ok(identifier)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use blobsign_core::ErrorKind;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_to_xml() {
        let start = Utc.with_ymd_and_hms(2022, 3, 1, 8, 0, 0).unwrap();
        let ids = vec![
            SignedIdentifier::new("read-only", SasPermissions::LIST | SasPermissions::READ)
                .unwrap()
                .with_starts_on(start)
                .with_expires_on(Utc.with_ymd_and_hms(2022, 3, 2, 8, 0, 0).unwrap()),
            SignedIdentifier::new("writer", SasPermissions::WRITE).unwrap(),
        ];

        let xml = signed_identifiers_to_xml(&ids).unwrap();
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="utf-8"?><SignedIdentifiers>"#));
        assert!(xml.contains("<Id>read-only</Id>"));
        assert!(xml.contains("<Start>2022-03-01T08:00:00.0000000Z</Start>"));
        assert!(xml.contains("<Expiry>2022-03-02T08:00:00.0000000Z</Expiry>"));
        assert!(xml.contains("<Permission>rl</Permission>"));
        assert!(xml.contains("<Permission>w</Permission>"));
        assert!(xml.ends_with("</SignedIdentifiers>"));

        let back = signed_identifiers_from_xml(&xml).unwrap();
        assert_eq!(back, ids);
    }

    #[test]
    fn test_from_service_response() {
        let content = r#"<?xml version="1.0" encoding="utf-8"?>
<SignedIdentifiers>
  <SignedIdentifier>
    <Id>MTIzNDU2Nzg5MDEyMzQ1Njc4OTAxMjM0NTY3ODkwMTI=</Id>
    <AccessPolicy>
      <Start>2009-09-28T08:49:37.0000000Z</Start>
      <Expiry>2009-09-29T08:49:37.0000000Z</Expiry>
      <Permission>rwd</Permission>
    </AccessPolicy>
  </SignedIdentifier>
  <SignedIdentifier>
    <Id>no-window</Id>
    <AccessPolicy>
      <Start />
      <Permission>l</Permission>
    </AccessPolicy>
  </SignedIdentifier>
</SignedIdentifiers>"#;

        let ids = signed_identifiers_from_xml(content).unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[0].id(), "MTIzNDU2Nzg5MDEyMzQ1Njc4OTAxMjM0NTY3ODkwMTI=");
        assert_eq!(
            ids[0].permissions(),
            SasPermissions::READ | SasPermissions::WRITE | SasPermissions::DELETE
        );
        assert_eq!(
            ids[0].expires_on(),
            Some(Utc.with_ymd_and_hms(2009, 9, 29, 8, 49, 37).unwrap())
        );
        assert_eq!(ids[1].starts_on(), None);
        assert_eq!(ids[1].expires_on(), None);
        assert_eq!(ids[1].permissions(), SasPermissions::LIST);
    }

    #[test]
    fn test_empty_response() {
        let content = r#"<?xml version="1.0" encoding="utf-8"?><SignedIdentifiers />"#;
        assert!(signed_identifiers_from_xml(content).unwrap().is_empty());
    }

    #[test]
    fn test_identifier_too_long() {
        assert!(SignedIdentifier::new(&"a".repeat(64), SasPermissions::READ).is_ok());
        let err = SignedIdentifier::new(&"a".repeat(65), SasPermissions::READ).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_too_many_identifiers() {
        let ids: Vec<_> = (0..6)
            .map(|i| SignedIdentifier::new(&format!("id-{i}"), SasPermissions::READ).unwrap())
            .collect();
        let err = signed_identifiers_to_xml(&ids).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_malformed() {
        let err = signed_identifiers_from_xml("<SignedIdentifiers><SignedIdentifier>")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unexpected);

        let content = "<SignedIdentifiers><SignedIdentifier><Id>a</Id><AccessPolicy><Expiry>yesterday</Expiry><Permission>r</Permission></AccessPolicy></SignedIdentifier></SignedIdentifiers>";
        let err = signed_identifiers_from_xml(content).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }
}
