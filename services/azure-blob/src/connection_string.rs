use std::collections::HashMap;

use blobsign_core::{Error, Result};

use crate::{Config, Credential};

// Azurite defaults.
const DEVELOPMENT_ACCOUNT_NAME: &str = "devstoreaccount1";
const DEVELOPMENT_ACCOUNT_KEY: &str =
    "Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==";
const DEVELOPMENT_BLOB_URI: &str = "http://127.0.0.1:10000";

/// Parses an [Azure connection string][1] for the blob service.
///
/// [1]: https://learn.microsoft.com/en-us/azure/storage/common/storage-configure-connection-string
pub(crate) fn parse(conn_str: &str) -> Result<Config> {
    let key_values = parse_into_key_values(conn_str)?;

    if let Some(config) = collect_development_config(&key_values) {
        return Ok(config);
    }

    let mut config = Config {
        account_name: key_values.get("AccountName").cloned(),
        endpoint: collect_endpoint(&key_values)?,
        ..Default::default()
    };

    if let Some(cred) = collect_credential(&key_values) {
        set_credential(&mut config, cred);
    };

    Ok(config)
}

fn parse_into_key_values(conn_str: &str) -> Result<HashMap<String, String>> {
    conn_str
        .trim()
        .replace(['\r', '\n'], "")
        .split(';')
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .map(|field| {
            let (key, value) = field.split_once('=').ok_or_else(|| {
                Error::config_invalid(format!(
                    "invalid connection string, expected '=' in field: {field}"
                ))
            })?;
            Ok((key.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}

/// `UseDevelopmentStorage=true` points at a local Azurite emulator.
fn collect_development_config(key_values: &HashMap<String, String>) -> Option<Config> {
    if key_values.get("UseDevelopmentStorage").map(String::as_str) != Some("true") {
        return None;
    }

    let account_name = key_values
        .get("AccountName")
        .cloned()
        .unwrap_or_else(|| DEVELOPMENT_ACCOUNT_NAME.to_string());
    let account_key = key_values
        .get("AccountKey")
        .cloned()
        .unwrap_or_else(|| DEVELOPMENT_ACCOUNT_KEY.to_string());
    let proxy_uri = key_values
        .get("DevelopmentStorageProxyUri")
        .map(String::as_str)
        .unwrap_or(DEVELOPMENT_BLOB_URI);

    Some(Config {
        endpoint: Some(format!("{proxy_uri}/{account_name}")),
        account_name: Some(account_name),
        account_key: Some(account_key),
        ..Default::default()
    })
}

/// Users are still able to set the endpoint later, so it isn't enforced.
fn collect_endpoint(key_values: &HashMap<String, String>) -> Result<Option<String>> {
    if let Some(endpoint) = key_values.get("BlobEndpoint") {
        return Ok(Some(endpoint.clone()));
    }

    let (account_name, endpoint_suffix) = match (
        key_values.get("AccountName"),
        key_values.get("EndpointSuffix"),
    ) {
        (Some(name), Some(suffix)) => (name, suffix),
        _ => return Ok(None),
    };

    let protocol = key_values
        .get("DefaultEndpointsProtocol")
        .map(String::as_str)
        .unwrap_or("https");
    if protocol != "http" && protocol != "https" {
        return Err(Error::config_invalid(format!(
            "invalid DefaultEndpointsProtocol: {protocol}"
        )));
    }

    Ok(Some(format!(
        "{protocol}://{account_name}.blob.{endpoint_suffix}"
    )))
}

fn collect_credential(key_values: &HashMap<String, String>) -> Option<Credential> {
    if let Some(token) = key_values.get("SharedAccessSignature") {
        Some(Credential::with_sas_token(token))
    } else if let (Some(account_name), Some(account_key)) =
        (key_values.get("AccountName"), key_values.get("AccountKey"))
    {
        Some(Credential::with_shared_key(account_name, account_key))
    } else {
        None
    }
}

fn set_credential(config: &mut Config, cred: Credential) {
    match cred {
        Credential::SasToken { token } => {
            config.sas_token = Some(token);
        }
        Credential::SharedKey {
            account_name,
            account_key,
        } => {
            config.account_name = Some(account_name);
            config.account_key = Some(account_key);
        }
    }
}
