use std::borrow::Cow;
use std::mem;
use std::str::FromStr;
use std::time::Duration;

use http::header::HeaderName;
use http::uri::Authority;
use http::uri::PathAndQuery;
use http::uri::Scheme;
use http::HeaderMap;
use http::Method;
use http::Uri;

use crate::{Error, Result};

/// Signing context for request.
///
/// Query values are kept decoded while signing; the signer is responsible
/// for encoding them again before [`SigningRequest::apply`].
#[derive(Debug)]
pub struct SigningRequest {
    /// HTTP method.
    pub method: Method,
    /// HTTP scheme.
    pub scheme: Scheme,
    /// HTTP authority.
    pub authority: Authority,
    /// HTTP path.
    pub path: String,
    /// HTTP query parameters.
    pub query: Vec<(String, String)>,
    /// HTTP headers.
    pub headers: HeaderMap,
}

impl SigningRequest {
    /// Build a signing context from http::request::Parts.
    pub fn build(parts: &mut http::request::Parts) -> Result<Self> {
        let uri = mem::take(&mut parts.uri).into_parts();
        let paq = uri
            .path_and_query
            .unwrap_or_else(|| PathAndQuery::from_static("/"));

        Ok(SigningRequest {
            method: parts.method.clone(),
            scheme: uri.scheme.unwrap_or(Scheme::HTTP),
            authority: uri.authority.ok_or_else(|| {
                Error::request_invalid("request without authority is invalid for signing")
            })?,
            path: paq.path().to_string(),
            query: paq
                .query()
                .map(|v| {
                    form_urlencoded::parse(v.as_bytes())
                        .map(|(k, v)| (k.into_owned(), v.into_owned()))
                        .collect()
                })
                .unwrap_or_default(),

            // Take the headers out of the request to avoid copy.
            // We will return it back when apply the context.
            headers: mem::take(&mut parts.headers),
        })
    }

    /// Apply the signing context back to http::request::Parts.
    pub fn apply(mut self, parts: &mut http::request::Parts) -> Result<()> {
        let query_size = self.query_size();

        // Return headers back.
        mem::swap(&mut parts.headers, &mut self.headers);
        parts.method = self.method;
        parts.uri = {
            let mut uri_parts = mem::take(&mut parts.uri).into_parts();
            uri_parts.scheme = Some(self.scheme);
            uri_parts.authority = Some(self.authority);
            uri_parts.path_and_query = {
                let paq = if query_size == 0 {
                    self.path
                } else {
                    let mut s = self.path;
                    s.reserve(query_size + 1);

                    s.push('?');
                    for (i, (k, v)) in self.query.iter().enumerate() {
                        if i > 0 {
                            s.push('&');
                        }

                        s.push_str(k);
                        if !v.is_empty() {
                            s.push('=');
                            s.push_str(v);
                        }
                    }

                    s
                };

                Some(PathAndQuery::from_str(&paq)?)
            };
            Uri::from_parts(uri_parts)?
        };

        Ok(())
    }

    /// Get the path percent decoded.
    ///
    /// Escapes that don't decode to valid UTF-8 are rejected.
    pub fn path_percent_decoded(&self) -> Result<Cow<'_, str>> {
        percent_encoding::percent_decode_str(&self.path)
            .decode_utf8()
            .map_err(|e| {
                Error::request_invalid(format!("path '{}' is not valid UTF-8", self.path))
                    .with_source(e)
            })
    }

    /// Get query size.
    #[inline]
    pub fn query_size(&self) -> usize {
        self.query
            .iter()
            .map(|(k, v)| k.len() + v.len())
            .sum::<usize>()
    }

    /// Get the first query value with the given key.
    pub fn query_get(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Push a new query pair into query list.
    #[inline]
    pub fn query_push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.query.push((key.into(), value.into()));
    }

    /// Push a pre-encoded query string into query list.
    ///
    /// The whole string is stored as a key with an empty value so that it
    /// is written back verbatim.
    #[inline]
    pub fn query_append(&mut self, query: &str) {
        self.query.push((query.to_string(), "".to_string()));
    }

    /// Convert sorted query to string with values percent decoded.
    ///
    /// ```shell
    /// [(a, b), (c, d)] => "a:b\nc:d"
    /// ```
    pub fn query_to_percent_decoded_string(
        mut query: Vec<(String, String)>,
        sep: &str,
        join: &str,
    ) -> String {
        let mut s = String::with_capacity(16);

        // Sort via query name.
        query.sort();

        for (idx, (k, v)) in query.into_iter().enumerate() {
            if idx != 0 {
                s.push_str(join);
            }

            s.push_str(&k);
            if !v.is_empty() {
                s.push_str(sep);
                s.push_str(&percent_encoding::percent_decode_str(&v).decode_utf8_lossy());
            }
        }

        s
    }

    /// Get header value by name.
    ///
    /// Returns empty string if header not found.
    #[inline]
    pub fn header_get_or_default(&self, key: &HeaderName) -> Result<&str> {
        match self.headers.get(key) {
            Some(v) => Ok(v.to_str()?),
            None => Ok(""),
        }
    }

    /// Get headers with given prefix, names lower-cased.
    pub fn header_to_vec_with_prefix(&self, prefix: &str) -> Result<Vec<(String, String)>> {
        self.headers
            .iter()
            .filter(|(k, _)| k.as_str().starts_with(prefix))
            .map(|(k, v)| -> Result<(String, String)> {
                Ok((k.as_str().to_lowercase(), v.to_str()?.to_string()))
            })
            .collect()
    }

    /// Convert sorted headers to string.
    ///
    /// ```shell
    /// [(a, b), (c, d)] => "a:b\nc:d"
    /// ```
    pub fn header_to_string(mut headers: Vec<(String, String)>, sep: &str, join: &str) -> String {
        let mut s = String::with_capacity(16);

        // Sort via header name.
        headers.sort();

        for (idx, (k, v)) in headers.into_iter().enumerate() {
            if idx != 0 {
                s.push_str(join);
            }

            s.push_str(&k);
            s.push_str(sep);
            s.push_str(&v);
        }

        s
    }
}

/// SigningMethod is the method that used in signing.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SigningMethod {
    /// Signing with header.
    Header,
    /// Signing with query.
    Query(Duration),
}

impl From<Option<Duration>> for SigningMethod {
    fn from(expires_in: Option<Duration>) -> Self {
        match expires_in {
            Some(d) => SigningMethod::Query(d),
            None => SigningMethod::Header,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parts(uri: &str) -> http::request::Parts {
        http::Request::get(uri)
            .header("x-ms-version", "2020-12-06")
            .header("content-type", "text/plain")
            .body(())
            .unwrap()
            .into_parts()
            .0
    }

    #[test]
    fn test_path_percent_decoded_rejects_invalid_utf8() {
        let mut p = parts("https://devaccount.blob.core.windows.net/logs/a%FF.txt");
        let req = SigningRequest::build(&mut p).unwrap();

        let err = req.path_percent_decoded().unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::RequestInvalid);
    }

    #[test]
    fn test_build_and_apply() {
        let mut p = parts("https://devaccount.blob.core.windows.net/logs/app%20one.txt?comp=list&prefix=a%2Fb");
        let mut req = SigningRequest::build(&mut p).unwrap();

        assert_eq!(req.path, "/logs/app%20one.txt");
        assert_eq!(req.path_percent_decoded().unwrap(), "/logs/app one.txt");
        assert_eq!(req.query_get("prefix"), Some("a/b"));
        assert!(p.headers.is_empty());

        req.query_push("sig", "abc");
        req.apply(&mut p).unwrap();

        assert_eq!(
            p.uri.to_string(),
            "https://devaccount.blob.core.windows.net/logs/app%20one.txt?comp=list&prefix=a/b&sig=abc"
        );
        assert_eq!(p.headers.len(), 2);
    }

    #[test]
    fn test_build_without_authority() {
        let mut p = http::Request::get("/container").body(()).unwrap().into_parts().0;
        let err = SigningRequest::build(&mut p).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::RequestInvalid);
    }

    #[test]
    fn test_header_to_string() {
        let mut p = parts("https://devaccount.blob.core.windows.net/logs");
        let req = SigningRequest::build(&mut p).unwrap();

        let headers = req.header_to_vec_with_prefix("x-ms-").unwrap();
        assert_eq!(
            SigningRequest::header_to_string(headers, ":", "\n"),
            "x-ms-version:2020-12-06"
        );
        assert_eq!(
            req.header_get_or_default(&http::header::CONTENT_TYPE).unwrap(),
            "text/plain"
        );
        assert_eq!(
            req.header_get_or_default(&http::header::RANGE).unwrap(),
            ""
        );
    }

    #[test]
    fn test_query_to_percent_decoded_string() {
        let query = vec![
            ("restype".to_string(), "container".to_string()),
            ("comp".to_string(), "list".to_string()),
            ("prefix".to_string(), "a%2Fb".to_string()),
        ];
        assert_eq!(
            SigningRequest::query_to_percent_decoded_string(query, ":", "\n"),
            "comp:list\nprefix:a/b\nrestype:container"
        );
    }

    #[test]
    fn test_signing_method_from_expires_in() {
        assert_eq!(SigningMethod::from(None), SigningMethod::Header);
        assert_eq!(
            SigningMethod::from(Some(Duration::from_secs(60))),
            SigningMethod::Query(Duration::from_secs(60))
        );
    }
}
