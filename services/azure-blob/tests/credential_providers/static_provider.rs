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
use blobsign_azure_blob::{Credential, StaticCredentialProvider};
use blobsign_core::{Context, ProvideCredential, SigningCredential};

#[tokio::test]
async fn test_static_provider_is_stable() {
    let provider = StaticCredentialProvider::new_shared_key("devaccount", "a2V5");
    let ctx = Context::new();

    let first = provider.provide_credential(&ctx).await.unwrap().unwrap();
    let second = provider.provide_credential(&ctx).await.unwrap().unwrap();
    assert_eq!(first, second);
    assert!(first.is_valid());
}

#[tokio::test]
async fn test_static_provider_empty_token_is_invalid() {
    let cred = StaticCredentialProvider::new_sas_token("?")
        .provide_credential(&Context::new())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(cred, Credential::with_sas_token(""));
    assert!(!cred.is_valid());
}
