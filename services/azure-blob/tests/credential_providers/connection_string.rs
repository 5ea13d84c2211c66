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
use blobsign_azure_blob::{Config, ConnectionStringCredentialProvider, Credential};
use blobsign_core::{Context, ProvideCredential, StaticEnv};
use pretty_assertions::assert_eq;

#[tokio::test]
async fn test_connection_string_with_sas() {
    let conn_str = "BlobEndpoint=https://devaccount.blob.core.windows.net/;\n                    SharedAccessSignature=sv=2020-12-06&sr=c&sp=rl&se=2022-03-01T08%3A12%3A34Z&sig=abc%3D";
    let ctx = Context::new().with_env(StaticEnv::from_pairs([(
        "AZURE_STORAGE_CONNECTION_STRING",
        conn_str,
    )]));

    let cred = ConnectionStringCredentialProvider::new()
        .provide_credential(&ctx)
        .await
        .unwrap();
    assert_eq!(
        cred,
        Some(Credential::with_sas_token(
            "sv=2020-12-06&sr=c&sp=rl&se=2022-03-01T08%3A12%3A34Z&sig=abc%3D"
        ))
    );

    let config = Config::try_from_connection_string(conn_str).unwrap();
    assert_eq!(
        config.endpoint.as_deref(),
        Some("https://devaccount.blob.core.windows.net/")
    );
}
