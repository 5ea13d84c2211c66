use std::time::Duration;

use blobsign_azure_blob::{
    CustomerProvidedKey, RequestSigner, SasPermissions, SasQueryParameters, SasResource,
    StaticCredentialProvider,
};
use blobsign_core::{Context, ErrorKind, Signer};
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;

const ACCOUNT_NAME: &str = "devaccount";
const ACCOUNT_KEY: &str =
    "Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==";

fn signer(builder: RequestSigner) -> Signer<blobsign_azure_blob::Credential> {
    let loader = StaticCredentialProvider::new_shared_key(ACCOUNT_NAME, ACCOUNT_KEY);
    Signer::new(Context::new(), loader, builder)
}

fn signing_time() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2022, 3, 1, 8, 12, 34).unwrap()
}

#[tokio::test]
async fn test_shared_key_signing_get() {
    let mut parts = http::Request::get(
        "https://devaccount.blob.core.windows.net/logs?restype=container&comp=list",
    )
    .body(())
    .unwrap()
    .into_parts()
    .0;

    signer(RequestSigner::new().with_time(signing_time()))
        .sign(&mut parts, None)
        .await
        .unwrap();

    assert_eq!(parts.headers["x-ms-date"], "Tue, 01 Mar 2022 08:12:34 GMT");
    assert_eq!(
        parts.headers["authorization"],
        "SharedKey devaccount:x3SyuDyZ3dp50F7ySGoTsKLK2pZa6EhXxL+dRyPLhy4="
    );
}

#[tokio::test]
async fn test_shared_key_signing_with_customer_provided_key() {
    let mut parts = http::Request::put("https://devaccount.blob.core.windows.net/logs/a.txt")
        .header("x-ms-blob-type", "BlockBlob")
        .header("content-length", "12")
        .body(())
        .unwrap()
        .into_parts()
        .0;

    let cpk = CustomerProvidedKey::from_key_bytes(&[7u8; 32]).unwrap();
    signer(RequestSigner::new().with_customer_provided_key(cpk.clone()))
        .sign(&mut parts, None)
        .await
        .unwrap();

    assert_eq!(parts.headers["x-ms-encryption-algorithm"], "AES256");
    assert_eq!(parts.headers["x-ms-encryption-key-sha256"], cpk.key_sha256());
    assert!(parts.headers["x-ms-encryption-key"].is_sensitive());
    let auth = parts.headers["authorization"].to_str().unwrap();
    assert!(auth.starts_with("SharedKey devaccount:"));
}

#[tokio::test]
async fn test_shared_key_query_signing() {
    let mut parts = http::Request::get("https://devaccount.blob.core.windows.net/logs/dir/a%20b.txt")
        .body(())
        .unwrap()
        .into_parts()
        .0;

    signer(
        RequestSigner::new()
            .with_time(signing_time())
            .with_permissions(SasPermissions::READ | SasPermissions::WRITE | SasPermissions::LIST),
    )
    .sign(&mut parts, Some(Duration::from_secs(3600)))
    .await
    .unwrap();

    assert!(!parts.headers.contains_key("authorization"));

    let sas: SasQueryParameters = parts.uri.query().unwrap().parse().unwrap();
    assert_eq!(sas.resource().unwrap(), Some(SasResource::Blob));
    assert_eq!(
        sas.permissions().unwrap(),
        SasPermissions::READ | SasPermissions::WRITE
    );
    assert_eq!(sas.expires_on(), Some("2022-03-01T09:12:34Z"));
}

#[tokio::test]
async fn test_shared_key_query_signing_version() {
    let mut parts = http::Request::get(
        "https://devaccount.blob.core.windows.net/logs/a.txt?versionid=2022-02-01T00%3A00%3A00.1234567Z",
    )
    .body(())
    .unwrap()
    .into_parts()
    .0;

    signer(RequestSigner::new())
        .sign(&mut parts, Some(Duration::from_secs(60)))
        .await
        .unwrap();

    let sas: SasQueryParameters = parts.uri.query().unwrap().parse().unwrap();
    assert_eq!(sas.resource().unwrap(), Some(SasResource::BlobVersion));
    assert_eq!(sas.get("versionid"), Some("2022-02-01T00:00:00.1234567Z"));
}

#[tokio::test]
async fn test_shared_key_query_signing_without_usable_permissions() {
    let mut parts = http::Request::get("https://devaccount.blob.core.windows.net/logs/a.txt")
        .body(())
        .unwrap()
        .into_parts()
        .0;

    let err = signer(RequestSigner::new().with_permissions(SasPermissions::LIST))
        .sign(&mut parts, Some(Duration::from_secs(60)))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}
