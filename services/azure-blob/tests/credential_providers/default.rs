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
use blobsign_azure_blob::{Credential, DefaultCredentialProvider, RequestSigner};
use blobsign_core::{Context, OsEnv, ProvideCredential, Signer, StaticEnv};

fn is_test_enabled() -> bool {
    std::env::var("BLOBSIGN_AZURE_BLOB_TEST").unwrap_or_default() == "on"
}

#[tokio::test]
async fn test_default_provider_from_os_env() {
    if !is_test_enabled() {
        eprintln!("Skipping test: BLOBSIGN_AZURE_BLOB_TEST is not enabled");
        return;
    }

    let ctx = Context::new().with_env(OsEnv);
    let cred = DefaultCredentialProvider::new()
        .provide_credential(&ctx)
        .await
        .unwrap();
    assert!(cred.is_some(), "live tests need a credential in env");
}

#[tokio::test]
async fn test_default_provider_with_signer() {
    let ctx = Context::new().with_env(StaticEnv::from_pairs([(
        "AZURE_STORAGE_CONNECTION_STRING",
        "UseDevelopmentStorage=true",
    )]));
    let signer: Signer<Credential> =
        Signer::new(ctx, DefaultCredentialProvider::new(), RequestSigner::new());

    let mut parts = http::Request::get("http://127.0.0.1:10000/devstoreaccount1/logs?restype=container")
        .body(())
        .unwrap()
        .into_parts()
        .0;
    signer.sign(&mut parts, None).await.unwrap();

    let auth = parts.headers["authorization"].to_str().unwrap();
    assert!(auth.starts_with("SharedKey devstoreaccount1:"));
}

#[tokio::test]
async fn test_default_provider_nothing_configured() {
    let signer: Signer<Credential> = Signer::new(
        Context::new(),
        DefaultCredentialProvider::new(),
        RequestSigner::new(),
    );

    let mut parts = http::Request::get("https://devaccount.blob.core.windows.net/logs")
        .body(())
        .unwrap()
        .into_parts()
        .0;
    assert!(signer.sign(&mut parts, None).await.is_err());
}
