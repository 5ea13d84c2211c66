use std::time::Duration;

use blobsign_azure_blob::{RequestSigner, StaticCredentialProvider};
use blobsign_core::{Context, Signer};

const SAS_TOKEN: &str =
    "sv=2020-12-06&sr=c&sp=rl&se=2022-03-01T08%3A12%3A34Z&sig=TI5X2GRi9NYQr5ddWb1EHLHVqGmyQ6nJosCyy3Dg%2F4I%3D";

fn signer() -> Signer<blobsign_azure_blob::Credential> {
    let loader = StaticCredentialProvider::new_sas_token(SAS_TOKEN);
    Signer::new(Context::new(), loader, RequestSigner::new())
}

#[tokio::test]
async fn test_sas_token_signing() {
    let mut parts = http::Request::get("https://devaccount.blob.core.windows.net/logs")
        .header("x-ms-version", "2020-12-06")
        .body(())
        .unwrap()
        .into_parts()
        .0;

    signer().sign(&mut parts, None).await.unwrap();

    // With SAS token, no Authorization header should be added
    assert!(!parts.headers.contains_key("authorization"));
    assert_eq!(
        parts.uri.to_string(),
        format!("https://devaccount.blob.core.windows.net/logs?{SAS_TOKEN}")
    );
}

#[tokio::test]
async fn test_sas_token_with_existing_query() {
    let mut parts =
        http::Request::get("https://devaccount.blob.core.windows.net/logs?restype=container&comp=list&prefix=a%2Fb")
            .body(())
            .unwrap()
            .into_parts()
            .0;

    signer()
        .sign(&mut parts, Some(Duration::from_secs(60)))
        .await
        .unwrap();

    assert_eq!(
        parts.uri.query(),
        Some(format!("restype=container&comp=list&prefix=a%2Fb&{SAS_TOKEN}").as_str())
    );
}

#[tokio::test]
async fn test_sas_token_preserves_headers() {
    let mut parts = http::Request::put("https://devaccount.blob.core.windows.net/logs/a.txt")
        .header("x-ms-blob-type", "BlockBlob")
        .header("content-type", "text/plain")
        .body(())
        .unwrap()
        .into_parts()
        .0;

    signer().sign(&mut parts, None).await.unwrap();

    assert_eq!(parts.headers["x-ms-blob-type"], "BlockBlob");
    assert_eq!(parts.headers["content-type"], "text/plain");
    assert!(!parts.headers.contains_key("x-ms-date"));
}
