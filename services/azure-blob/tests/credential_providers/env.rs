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
use blobsign_azure_blob::{Credential, EnvCredentialProvider};
use blobsign_core::{Context, ProvideCredential, StaticEnv};
use test_case::test_case;

#[test_case(&[("AZBLOB_ACCOUNT_NAME", "a"), ("AZBLOB_ACCOUNT_KEY", "a2V5")], Some(Credential::with_shared_key("a", "a2V5")); "azblob names")]
#[test_case(&[("AZURE_STORAGE_ACCOUNT_NAME", "a"), ("AZURE_STORAGE_ACCOUNT_KEY", "a2V5")], Some(Credential::with_shared_key("a", "a2V5")); "azure storage names")]
#[test_case(&[("AZBLOB_ACCOUNT_NAME", ""), ("AZURE_STORAGE_ACCOUNT_NAME", "b"), ("AZBLOB_ACCOUNT_KEY", "a2V5")], Some(Credential::with_shared_key("b", "a2V5")); "empty value falls through")]
#[test_case(&[("AZURE_STORAGE_SAS_TOKEN", "?sv=2020-12-06&sig=a"), ("AZBLOB_ACCOUNT_NAME", "a"), ("AZBLOB_ACCOUNT_KEY", "a2V5")], Some(Credential::with_sas_token("sv=2020-12-06&sig=a")); "sas token wins")]
#[test_case(&[("AZBLOB_ACCOUNT_KEY", "a2V5")], None; "key without name")]
#[test_case(&[], None; "nothing")]
#[tokio::test]
async fn test_env_credential_provider(envs: &[(&str, &str)], expected: Option<Credential>) {
    let ctx = Context::new().with_env(StaticEnv::from_pairs(envs.iter().copied()));

    let cred = EnvCredentialProvider::new()
        .provide_credential(&ctx)
        .await
        .unwrap();
    assert_eq!(cred, expected);
}
