//! Azure Blob Storage signer
//!
//! This crate provides:
//! - A service SAS (Shared Access Signature) builder for containers, blobs,
//!   blob snapshots and blob versions
//! - Shared Key request signing
//! - Stored access policy (signed identifier) bodies
//! - Encryption scope and customer-provided key headers
//!
//! # Example
//!
//! Mint a read/list SAS for a container:
//!
//! ```rust
//! use blobsign_azure_blob::{BlobSasBuilder, Credential, SasPermissions, SasProtocol, SasResource};
//!
//! # fn main() -> blobsign_core::Result<()> {
//! let cred = Credential::with_shared_key(
//!     "devstoreaccount1",
//!     "Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==",
//! );
//!
//! let sas = BlobSasBuilder::new(SasResource::Container)
//!     .with_container_name("logs")
//!     .with_permissions(SasPermissions::READ | SasPermissions::LIST)?
//!     .with_protocol(SasProtocol::HttpsOnly)
//!     .with_expires_on(blobsign_core::time::now() + chrono::TimeDelta::hours(72))
//!     .to_sas_query_parameters(&cred)?;
//!
//! let url = sas.append_to_url("https://devstoreaccount1.blob.core.windows.net/logs?restype=container&comp=list");
//! # Ok(())
//! # }
//! ```
//!
//! Sign requests with credentials loaded from the environment:
//!
//! ```rust,no_run
//! use blobsign_azure_blob::{DefaultCredentialProvider, RequestSigner};
//! use blobsign_core::{Context, OsEnv, Signer};
//!
//! #[tokio::main]
//! async fn main() -> blobsign_core::Result<()> {
//!     let ctx = Context::new().with_env(OsEnv);
//!     let signer = Signer::new(ctx, DefaultCredentialProvider::new(), RequestSigner::new());
//!
//!     let (mut parts, _) = http::Request::get("https://account.blob.core.windows.net/container/blob")
//!         .body(())?
//!         .into_parts();
//!     signer.sign(&mut parts, None).await?;
//!
//!     Ok(())
//! }
//! ```

mod constants;

mod config;
pub use config::Config;

mod connection_string;

mod credential;
pub use credential::Credential;

mod encryption;
pub use encryption::{ContainerEncryptionScope, CustomerProvidedKey, EncryptionScope};

mod sas;
pub use sas::{
    BlobSasBuilder, SasIpRange, SasPermissions, SasProtocol, SasQueryParameters, SasResource,
};

mod signed_identifier;
pub use signed_identifier::{
    signed_identifiers_from_xml, signed_identifiers_to_xml, SignedIdentifier,
    MAX_IDENTIFIER_LEN, MAX_SIGNED_IDENTIFIERS,
};

mod sign_request;
pub use sign_request::RequestSigner;

mod provide_credential;
pub use provide_credential::*;
