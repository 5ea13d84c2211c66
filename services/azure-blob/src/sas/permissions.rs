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

use bitflags::bitflags;
use blobsign_core::{Error, Result};

use super::SasResource;

bitflags! {
    /// Capabilities granted by a service SAS or a stored access policy.
    ///
    /// The set is unordered; [`SasPermissions::to_permission_string`] emits
    /// the characters in the order the service requires.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct SasPermissions: u16 {
        /// `r`: read content, properties, metadata, block list.
        const READ = 1 << 0;
        /// `a`: add a block to an append blob.
        const ADD = 1 << 1;
        /// `c`: create a new blob.
        const CREATE = 1 << 2;
        /// `w`: write content, properties, metadata, block list.
        const WRITE = 1 << 3;
        /// `d`: delete a blob.
        const DELETE = 1 << 4;
        /// `x`: delete a blob version.
        const DELETE_VERSION = 1 << 5;
        /// `y`: permanently delete a soft-deleted blob or version.
        const PERMANENT_DELETE = 1 << 6;
        /// `l`: list blobs. Container only.
        const LIST = 1 << 7;
        /// `t`: read and write blob index tags.
        const TAGS = 1 << 8;
        /// `f`: find blobs by index tags. Container only.
        const FILTER = 1 << 9;
        /// `m`: move a blob or directory. Blob only.
        const MOVE = 1 << 10;
        /// `e`: get system properties and POSIX ACLs. Blob only.
        const EXECUTE = 1 << 11;
        /// `i`: set or delete an immutability policy or legal hold. Blob only.
        const SET_IMMUTABILITY_POLICY = 1 << 12;

        /// Every permission a container SAS accepts.
        const CONTAINER_ALL = Self::READ.bits()
            | Self::ADD.bits()
            | Self::CREATE.bits()
            | Self::WRITE.bits()
            | Self::DELETE.bits()
            | Self::DELETE_VERSION.bits()
            | Self::PERMANENT_DELETE.bits()
            | Self::LIST.bits()
            | Self::TAGS.bits()
            | Self::FILTER.bits();

        /// Every permission a blob, snapshot or version SAS accepts.
        const BLOB_ALL = Self::READ.bits()
            | Self::ADD.bits()
            | Self::CREATE.bits()
            | Self::WRITE.bits()
            | Self::DELETE.bits()
            | Self::DELETE_VERSION.bits()
            | Self::PERMANENT_DELETE.bits()
            | Self::TAGS.bits()
            | Self::MOVE.bits()
            | Self::EXECUTE.bits()
            | Self::SET_IMMUTABILITY_POLICY.bits();
    }
}

/// Wire order of permission characters. Never sort or reorder.
const PERMISSION_ORDER: [(SasPermissions, char); 13] = [
    (SasPermissions::READ, 'r'),
    (SasPermissions::ADD, 'a'),
    (SasPermissions::CREATE, 'c'),
    (SasPermissions::WRITE, 'w'),
    (SasPermissions::DELETE, 'd'),
    (SasPermissions::DELETE_VERSION, 'x'),
    (SasPermissions::PERMANENT_DELETE, 'y'),
    (SasPermissions::LIST, 'l'),
    (SasPermissions::TAGS, 't'),
    (SasPermissions::FILTER, 'f'),
    (SasPermissions::MOVE, 'm'),
    (SasPermissions::EXECUTE, 'e'),
    (SasPermissions::SET_IMMUTABILITY_POLICY, 'i'),
];

impl SasPermissions {
    /// Permissions accepted for the given resource kind.
    pub fn allowed_for(resource: SasResource) -> Self {
        match resource {
            SasResource::Container => Self::CONTAINER_ALL,
            SasResource::Blob | SasResource::BlobSnapshot | SasResource::BlobVersion => {
                Self::BLOB_ALL
            }
        }
    }

    /// Check that every flag is valid for `resource`.
    pub fn validate_for(self, resource: SasResource) -> Result<()> {
        let unsupported = self.difference(Self::allowed_for(resource));
        if unsupported.is_empty() {
            return Ok(());
        }

        Err(Error::invalid_argument(format!(
            "permissions '{}' are not valid for {} resources",
            unsupported.to_permission_string(),
            resource
        )))
    }

    /// Serialize into the service's permission string, e.g. `racwdl`.
    pub fn to_permission_string(self) -> String {
        PERMISSION_ORDER
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, c)| *c)
            .collect()
    }
}

impl fmt::Display for SasPermissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_permission_string())
    }
}

/// Parse a permission string in any order.
///
/// Unknown characters fail with `InvalidArgument`.
impl FromStr for SasPermissions {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.chars().try_fold(SasPermissions::empty(), |acc, c| {
            PERMISSION_ORDER
                .iter()
                .find(|(_, v)| *v == c)
                .map(|(flag, _)| acc | *flag)
                .ok_or_else(|| {
                    Error::invalid_argument(format!("unknown SAS permission character '{c}'"))
                })
        })
    }
}
