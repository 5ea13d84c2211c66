use crate::constants::*;
use crate::encryption::{CustomerProvidedKey, EncryptionScope};
use crate::sas::{BlobSasBuilder, SasPermissions, SasResource};
use crate::Credential;
use async_trait::async_trait;
use blobsign_core::hash::{base64_decode, base64_hmac_sha256};
use blobsign_core::time::{format_http_date, now, DateTime};
use blobsign_core::{Context, Error, Result, SignRequest, SigningMethod, SigningRequest};
use http::request::Parts;
use http::{header, HeaderValue};
use log::debug;
use percent_encoding::percent_encode;
use std::fmt::Write;
use std::net::IpAddr;
use std::time::Duration;

/// RequestSigner that implement Azure Storage Shared Key Authorization.
///
/// - [Authorize with Shared Key](https://docs.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key)
///
/// Query signing with a shared key appends a service SAS for the request
/// path instead.
#[derive(Debug)]
pub struct RequestSigner {
    time: Option<DateTime>,
    permissions: SasPermissions,
    encryption_scope: Option<EncryptionScope>,
    customer_provided_key: Option<CustomerProvidedKey>,
}

impl RequestSigner {
    /// Create a new builder for Azure Storage signer.
    pub fn new() -> Self {
        Self {
            time: None,
            permissions: SasPermissions::READ,
            encryption_scope: None,
            customer_provided_key: None,
        }
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Permissions granted by SAS tokens generated in query signing.
    ///
    /// Flags the addressed resource doesn't accept are dropped per request.
    /// Defaults to read.
    pub fn with_permissions(mut self, permissions: SasPermissions) -> Self {
        self.permissions = permissions;
        self
    }

    /// Send `x-ms-encryption-scope` with every request.
    pub fn with_encryption_scope(mut self, scope: EncryptionScope) -> Self {
        self.encryption_scope = Some(scope);
        self
    }

    /// Send the customer-provided key headers with every request.
    pub fn with_customer_provided_key(mut self, key: CustomerProvidedKey) -> Self {
        self.customer_provided_key = Some(key);
        self
    }
}

impl Default for RequestSigner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SignRequest for RequestSigner {
    type Credential = Credential;

    async fn sign_request(
        &self,
        _: &Context,
        req: &mut Parts,
        credential: Option<&Self::Credential>,
        expires_in: Option<Duration>,
    ) -> Result<()> {
        let Some(cred) = credential else {
            return Err(Error::request_invalid("credential is required"));
        };

        let method = SigningMethod::from(expires_in);
        let mut ctx = SigningRequest::build(req)?;

        // Encryption headers are part of the signed x-ms-* set.
        if let Some(scope) = &self.encryption_scope {
            scope.apply(&mut ctx.headers)?;
        }
        if let Some(cpk) = &self.customer_provided_key {
            cpk.apply(&mut ctx.headers)?;
        }

        match cred {
            Credential::SasToken { token } => {
                ctx.query_append(token);
            }
            Credential::SharedKey {
                account_name,
                account_key,
            } => match method {
                SigningMethod::Query(d) => {
                    let now_time = self.time.unwrap_or_else(now);
                    let expires_in = chrono::TimeDelta::from_std(d).map_err(|e| {
                        Error::invalid_argument("expires_in is out of range").with_source(e)
                    })?;

                    let expires_on = now_time.checked_add_signed(expires_in).ok_or_else(|| {
                        Error::invalid_argument("expires_in is out of range")
                    })?;

                    let builder = self.sas_builder(&ctx)?.with_expires_on(expires_on);
                    let token = builder.to_sas_query_parameters(cred)?;
                    for (k, v) in token.iter() {
                        ctx.query_push(k, v);
                    }
                }
                SigningMethod::Header => {
                    let now_time = self.time.unwrap_or_else(now);
                    if !ctx.headers.contains_key(X_MS_VERSION) {
                        ctx.headers
                            .insert(X_MS_VERSION, HeaderValue::from_static(SAS_VERSION));
                    }

                    let string_to_sign = string_to_sign(&mut ctx, account_name, now_time)?;
                    let decode_content = base64_decode(account_key)?;
                    let signature =
                        base64_hmac_sha256(&decode_content, string_to_sign.as_bytes())?;

                    ctx.headers.insert(header::AUTHORIZATION, {
                        let mut value: HeaderValue =
                            format!("SharedKey {account_name}:{signature}").parse()?;
                        value.set_sensitive(true);
                        value
                    });
                }
            },
        }

        // Apply percent encoding for query parameters
        for (_, v) in ctx.query.iter_mut() {
            *v = percent_encode(v.as_bytes(), &AZURE_QUERY_ENCODE_SET).to_string();
        }

        ctx.apply(req)
    }
}

impl RequestSigner {
    /// Build a service SAS for the container or blob the request addresses.
    fn sas_builder(&self, ctx: &SigningRequest) -> Result<BlobSasBuilder> {
        let path = ctx.path_percent_decoded()?;
        let mut path = path.trim_start_matches('/');

        // Emulator and other path-style endpoints carry the account first.
        if is_path_style(ctx.authority.host()) {
            path = path.split_once('/').map(|(_, rest)| rest).unwrap_or_default();
        }

        let (container, blob) = match path.split_once('/') {
            Some((container, blob)) => (container, blob),
            None => (path, ""),
        };
        if container.is_empty() {
            return Err(Error::request_invalid(
                "request path must address a container to be signed with a SAS",
            ));
        }

        let resource = if blob.is_empty() {
            SasResource::Container
        } else if ctx.query_get("snapshot").is_some() {
            SasResource::BlobSnapshot
        } else if ctx.query_get("versionid").is_some() {
            SasResource::BlobVersion
        } else {
            SasResource::Blob
        };

        let permissions = self.permissions & SasPermissions::allowed_for(resource);
        if permissions.is_empty() {
            return Err(Error::invalid_argument(format!(
                "permissions '{}' grant nothing on {resource} resources",
                self.permissions
            )));
        }

        let mut builder = BlobSasBuilder::new(resource)
            .with_container_name(container)
            .with_blob_name(blob)
            .with_permissions(permissions)?;
        if let Some(snapshot) = ctx.query_get("snapshot") {
            builder = builder.with_snapshot(snapshot);
        }
        if let Some(version_id) = ctx.query_get("versionid") {
            builder = builder.with_version_id(version_id);
        }
        if let Some(scope) = &self.encryption_scope {
            builder = builder.with_encryption_scope(scope.name());
        }

        Ok(builder)
    }
}

fn is_path_style(host: &str) -> bool {
    let host = host.trim_start_matches('[').trim_end_matches(']');
    host.eq_ignore_ascii_case("localhost") || host.parse::<IpAddr>().is_ok()
}

/// Construct string to sign
///
/// ## Format
///
/// ```text
/// VERB + "\n" +
/// Content-Encoding + "\n" +
/// Content-Language + "\n" +
/// Content-Length + "\n" +
/// Content-MD5 + "\n" +
/// Content-Type + "\n" +
/// Date + "\n" +
/// If-Modified-Since + "\n" +
/// If-Match + "\n" +
/// If-None-Match + "\n" +
/// If-Unmodified-Since + "\n" +
/// Range + "\n" +
/// CanonicalizedHeaders +
/// CanonicalizedResource;
/// ```
///
/// ## Reference
///
/// - [Blob, Queue, and File Services (Shared Key authorization)](https://docs.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key)
fn string_to_sign(
    ctx: &mut SigningRequest,
    account_name: &str,
    now_time: DateTime,
) -> Result<String> {
    let mut s = String::with_capacity(128);

    writeln!(&mut s, "{}", ctx.method.as_str())?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::CONTENT_ENCODING)?)?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::CONTENT_LANGUAGE)?)?;
    writeln!(&mut s, "{}", {
        let content_length = ctx.header_get_or_default(&header::CONTENT_LENGTH)?;
        if content_length == "0" {
            ""
        } else {
            content_length
        }
    })?;
    writeln!(
        &mut s,
        "{}",
        ctx.header_get_or_default(&header::HeaderName::from_static(CONTENT_MD5))?
    )?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::CONTENT_TYPE)?)?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::DATE)?)?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::IF_MODIFIED_SINCE)?)?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::IF_MATCH)?)?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::IF_NONE_MATCH)?)?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::IF_UNMODIFIED_SINCE)?)?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::RANGE)?)?;
    writeln!(&mut s, "{}", canonicalize_header(ctx, now_time)?)?;
    write!(&mut s, "{}", canonicalize_resource(ctx, account_name))?;

    debug!("string to sign: {}", &s);

    Ok(s)
}

/// ## Reference
///
/// - [Constructing the canonicalized headers string](https://docs.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key#constructing-the-canonicalized-headers-string)
fn canonicalize_header(ctx: &mut SigningRequest, now_time: DateTime) -> Result<String> {
    ctx.headers
        .insert(X_MS_DATE, format_http_date(now_time).parse()?);

    Ok(SigningRequest::header_to_string(
        ctx.header_to_vec_with_prefix("x-ms-")?,
        ":",
        "\n",
    ))
}

/// ## Reference
///
/// - [Constructing the canonicalized resource string](https://docs.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key#constructing-the-canonicalized-resource-string)
fn canonicalize_resource(ctx: &SigningRequest, account_name: &str) -> String {
    if ctx.query.is_empty() {
        return format!("/{}{}", account_name, ctx.path);
    }

    let query = ctx
        .query
        .iter()
        .map(|(k, v)| (k.to_lowercase(), v.clone()))
        .collect();

    format!(
        "/{}{}\n{}",
        account_name,
        ctx.path,
        SigningRequest::query_to_percent_decoded_string(query, ":", "\n")
    )
}
