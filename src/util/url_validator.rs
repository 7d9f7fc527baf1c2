use thiserror::Error;
use url::Url;

/// Errors from server URL validation.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    /// The URL string could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The URL uses a scheme other than http or https.
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    /// Credentials embedded in the URL.
    #[error("Credentials in the server URL are not supported")]
    EmbeddedCredentials,
    /// The URL has no host at all.
    #[error("Server URL has no host")]
    MissingHost,
}

/// Validate the configured backend URL before the client is built from it.
///
/// Accepts only `http`/`https` with a host and no embedded credentials.
/// Localhost and private addresses are allowed; the backend is commonly a
/// local or LAN deployment. A missing trailing slash is added so that
/// relative endpoint paths join underneath the URL instead of replacing its
/// last segment.
pub fn validate_server_url(url_str: &str) -> Result<Url, UrlValidationError> {
    let mut url = Url::parse(url_str)?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }

    if url.host_str().is_none() {
        return Err(UrlValidationError::MissingHost);
    }

    if !url.username().is_empty() || url.password().is_some() {
        return Err(UrlValidationError::EmbeddedCredentials);
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_http_accepted() {
        let url = validate_server_url("http://127.0.0.1:5000").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:5000/");
    }

    #[test]
    fn test_https_with_path_gets_trailing_slash() {
        let url = validate_server_url("https://example.org/site").unwrap();
        assert_eq!(url.path(), "/site/");
    }

    #[test]
    fn test_non_http_schemes_rejected() {
        assert!(validate_server_url("file:///etc/passwd").is_err());
        assert!(validate_server_url("ftp://example.com").is_err());
    }

    #[test]
    fn test_credentials_rejected() {
        assert!(validate_server_url("http://user:pw@example.com").is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(validate_server_url("not a url").is_err());
    }
}
