use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};

// Headers used in azure services.
pub const X_MS_DATE: &str = "x-ms-date";
pub const X_MS_VERSION: &str = "x-ms-version";
pub const CONTENT_MD5: &str = "content-md5";

// Server-side encryption headers.
pub const X_MS_ENCRYPTION_SCOPE: &str = "x-ms-encryption-scope";
pub const X_MS_DEFAULT_ENCRYPTION_SCOPE: &str = "x-ms-default-encryption-scope";
pub const X_MS_DENY_ENCRYPTION_SCOPE_OVERRIDE: &str = "x-ms-deny-encryption-scope-override";
pub const X_MS_ENCRYPTION_KEY: &str = "x-ms-encryption-key";
pub const X_MS_ENCRYPTION_KEY_SHA256: &str = "x-ms-encryption-key-sha256";
pub const X_MS_ENCRYPTION_ALGORITHM: &str = "x-ms-encryption-algorithm";

/// Service version used for the string to sign of service SAS tokens.
///
/// The signing string layout (including the encryption scope segment)
/// belongs to this version and later.
pub const SAS_VERSION: &str = "2020-12-06";

// Env values used in azure services.
pub const AZBLOB_ACCOUNT_NAME: &str = "AZBLOB_ACCOUNT_NAME";
pub const AZBLOB_ACCOUNT_KEY: &str = "AZBLOB_ACCOUNT_KEY";
pub const AZBLOB_ENDPOINT: &str = "AZBLOB_ENDPOINT";
pub const AZURE_STORAGE_ACCOUNT_NAME: &str = "AZURE_STORAGE_ACCOUNT_NAME";
pub const AZURE_STORAGE_ACCOUNT_KEY: &str = "AZURE_STORAGE_ACCOUNT_KEY";
pub const AZURE_STORAGE_SAS_TOKEN: &str = "AZURE_STORAGE_SAS_TOKEN";
pub const AZURE_STORAGE_CONNECTION_STRING: &str = "AZURE_STORAGE_CONNECTION_STRING";

/// Characters left unescaped in query values: RFC 3986 unreserved set.
pub static AZURE_QUERY_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');
