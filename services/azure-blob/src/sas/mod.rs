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

//! Service SAS (Shared Access Signature) for containers and blobs.
//!
//! - [Create a service SAS](https://learn.microsoft.com/en-us/rest/api/storageservices/create-service-sas)

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use blobsign_core::{Error, Result};

mod builder;
pub use builder::BlobSasBuilder;

mod permissions;
pub use permissions::SasPermissions;

mod query;
pub use query::SasQueryParameters;

/// The kind of resource a service SAS grants access to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SasResource {
    /// A container and every blob in it.
    Container,
    /// A single blob.
    Blob,
    /// A single blob snapshot.
    BlobSnapshot,
    /// A single blob version.
    BlobVersion,
}

impl SasResource {
    /// Value of the `sr` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            SasResource::Container => "c",
            SasResource::Blob => "b",
            SasResource::BlobSnapshot => "bs",
            SasResource::BlobVersion => "bv",
        }
    }

    /// Whether the resource addresses a single blob.
    pub fn is_blob(&self) -> bool {
        !matches!(self, SasResource::Container)
    }
}

impl fmt::Display for SasResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SasResource::Container => "container",
            SasResource::Blob => "blob",
            SasResource::BlobSnapshot => "blob snapshot",
            SasResource::BlobVersion => "blob version",
        };
        f.write_str(name)
    }
}

impl FromStr for SasResource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "c" => Ok(SasResource::Container),
            "b" => Ok(SasResource::Blob),
            "bs" => Ok(SasResource::BlobSnapshot),
            "bv" => Ok(SasResource::BlobVersion),
            v => Err(Error::invalid_argument(format!(
                "unknown signed resource '{v}'"
            ))),
        }
    }
}

/// Specifies the protocol permitted for a request made with the SAS.
///
/// - [Specify the HTTP protocol](https://learn.microsoft.com/en-us/rest/api/storageservices/create-service-sas#specify-the-http-protocol)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SasProtocol {
    /// Only HTTPS requests are accepted.
    HttpsOnly,
    /// Both HTTPS and HTTP requests are accepted.
    HttpsAndHttp,
}

impl SasProtocol {
    /// Value of the `spr` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            SasProtocol::HttpsOnly => "https",
            SasProtocol::HttpsAndHttp => "https,http",
        }
    }
}

impl fmt::Display for SasProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SasProtocol {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "https" => Ok(SasProtocol::HttpsOnly),
            "https,http" | "http,https" => Ok(SasProtocol::HttpsAndHttp),
            v => Err(Error::invalid_argument(format!("unknown SAS protocol '{v}'"))),
        }
    }
}

/// An IP address or an inclusive range of addresses allowed to use the SAS.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SasIpRange {
    start: IpAddr,
    end: Option<IpAddr>,
}

impl SasIpRange {
    /// Allow a single address.
    pub fn single(ip: IpAddr) -> Self {
        Self {
            start: ip,
            end: None,
        }
    }

    /// Allow every address between `start` and `end`.
    pub fn range(start: IpAddr, end: IpAddr) -> Result<Self> {
        if start.is_ipv4() != end.is_ipv4() {
            return Err(Error::invalid_argument(
                "IP range must not mix IPv4 and IPv6 addresses",
            ));
        }
        if start > end {
            return Err(Error::invalid_argument(format!(
                "IP range start {start} is after end {end}"
            )));
        }

        Ok(Self {
            start,
            end: Some(end),
        })
    }

    /// First address of the range.
    pub fn start(&self) -> IpAddr {
        self.start
    }

    /// Last address of the range, `None` for a single address.
    pub fn end(&self) -> Option<IpAddr> {
        self.end
    }
}

impl fmt::Display for SasIpRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end {
            Some(end) => write!(f, "{}-{}", self.start, end),
            None => write!(f, "{}", self.start),
        }
    }
}

impl FromStr for SasIpRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parse = |v: &str| {
            v.trim().parse::<IpAddr>().map_err(|e| {
                Error::invalid_argument(format!("'{v}' is not a valid IP address")).with_source(e)
            })
        };

        match s.split_once('-') {
            Some((start, end)) => SasIpRange::range(parse(start)?, parse(end)?),
            None => Ok(SasIpRange::single(parse(s)?)),
        }
    }
}
