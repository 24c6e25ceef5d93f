use crate::{DigestResolver, RegistryCoordinate, RegistryError};
use serde::Deserialize;
use std::io::Read;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

/// Validity window assumed for a bearer token before re-acquisition.
pub const TOKEN_TTL: Duration = Duration::from_secs(300);

/// Manifest media types the digest lookup declares willingness to accept.
/// The registry answers with whichever it has; the digest header is the same.
pub const MANIFEST_MEDIA_TYPES: [&str; 3] = [
    "application/vnd.oci.image.index.v1+json",
    "application/vnd.oci.image.manifest.v1+json",
    "application/vnd.docker.distribution.manifest.v2+json",
];

const DIGEST_HEADER: &str = "Docker-Content-Digest";

#[derive(Debug)]
struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// HTTP client for one registry coordinate: anonymous pull-scope token
/// exchange with a process-wide timed cache, and manifest digest lookup.
///
/// The cache is a single `Mutex`-guarded entry refreshed only on expiry, so
/// however many resolutions share this client, the token endpoint is hit at
/// most once per validity window.
pub struct RegistryClient {
    coordinate: RegistryCoordinate,
    api_base: String,
    token_ttl: Duration,
    agent: ureq::Agent,
    token_cache: Mutex<Option<CachedToken>>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
}

impl RegistryClient {
    pub fn new(coordinate: RegistryCoordinate) -> Self {
        let api_base = coordinate.api_base();
        Self::with_api_base(coordinate, &api_base)
    }

    /// Point the client at an explicit API base URL instead of
    /// `https://{host}`. Used by tests against a local mock registry.
    pub fn with_api_base(coordinate: RegistryCoordinate, api_base: &str) -> Self {
        Self {
            coordinate,
            api_base: api_base.trim_end_matches('/').to_owned(),
            token_ttl: TOKEN_TTL,
            agent: ureq::Agent::new_with_defaults(),
            token_cache: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    pub fn coordinate(&self) -> &RegistryCoordinate {
        &self.coordinate
    }

    /// Return the cached bearer token, re-acquiring it if expired.
    fn token(&self) -> Result<String, RegistryError> {
        let mut cache = self
            .token_cache
            .lock()
            .expect("token cache lock poisoned");

        if let Some(cached) = cache.as_ref() {
            if Instant::now() < cached.expires_at {
                return Ok(cached.value.clone());
            }
        }

        let repository = self.coordinate.repository().to_owned();
        let url = format!(
            "{}/token?scope=repository:{repository}:pull",
            self.api_base
        );
        debug!("GET {url}");

        let auth_err = |reason: String| RegistryError::Authentication {
            repository: repository.clone(),
            reason,
        };

        let resp = self
            .agent
            .get(&url)
            .call()
            .map_err(|e| auth_err(e.to_string()))?;
        let mut body = Vec::new();
        resp.into_body()
            .into_reader()
            .read_to_end(&mut body)
            .map_err(|e| auth_err(e.to_string()))?;
        let parsed: TokenResponse = serde_json::from_slice(&body)
            .map_err(|e| auth_err(format!("invalid token response: {e}")))?;

        *cache = Some(CachedToken {
            value: parsed.token.clone(),
            expires_at: Instant::now() + self.token_ttl,
        });
        Ok(parsed.token)
    }
}

impl DigestResolver for RegistryClient {
    /// Resolve a tag to its content digest via the manifest endpoint.
    ///
    /// The digest is read from the `Docker-Content-Digest` response header;
    /// a missing header or any HTTP failure is fatal for the run — the tag
    /// must not be silently omitted from the catalog.
    fn resolve_digest(&self, tag: &str) -> Result<String, RegistryError> {
        let token = self.token()?;
        let reference = format!("{}:{tag}", self.coordinate);
        let url = format!(
            "{}/v2/{}/manifests/{tag}",
            self.api_base,
            self.coordinate.repository()
        );
        debug!("GET {url}");

        let resolution_err = |reason: String| RegistryError::DigestResolution {
            reference: reference.clone(),
            reason,
        };

        let resp = self
            .agent
            .get(&url)
            .header("Authorization", &format!("Bearer {token}"))
            .header("Accept", &MANIFEST_MEDIA_TYPES.join(","))
            .call()
            .map_err(|e| match e {
                ureq::Error::StatusCode(code) => resolution_err(format!("HTTP {code}")),
                other => resolution_err(other.to_string()),
            })?;

        resp.headers()
            .get(DIGEST_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(ToOwned::to_owned)
            .ok_or_else(|| resolution_err(format!("response carried no {DIGEST_HEADER} header")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::str::FromStr;
    use std::sync::{Arc, Mutex};

    /// A captured HTTP request for header and path inspection.
    #[derive(Debug, Clone)]
    struct CapturedRequest {
        path: String,
        headers: HashMap<String, String>,
    }

    /// Minimal registry double: serves the token endpoint and the manifest
    /// endpoint, recording every request.
    struct MockRegistry {
        addr: String,
        requests: Arc<Mutex<Vec<CapturedRequest>>>,
        _handle: std::thread::JoinHandle<()>,
    }

    #[derive(Clone)]
    struct MockBehavior {
        token_status: u16,
        digest: Option<String>,
        manifest_status: u16,
    }

    impl Default for MockBehavior {
        fn default() -> Self {
            Self {
                token_status: 200,
                digest: Some("sha256:feedface".to_owned()),
                manifest_status: 200,
            }
        }
    }

    impl MockRegistry {
        fn start(behavior: MockBehavior) -> Self {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            let addr = format!("http://{}", listener.local_addr().unwrap());
            let requests: Arc<Mutex<Vec<CapturedRequest>>> = Arc::new(Mutex::new(Vec::new()));

            let reqs = Arc::clone(&requests);
            let handle = std::thread::spawn(move || {
                for stream in listener.incoming() {
                    let Ok(mut stream) = stream else { break };
                    let behavior = behavior.clone();
                    let reqs = Arc::clone(&reqs);

                    std::thread::spawn(move || {
                        let mut reader = BufReader::new(stream.try_clone().unwrap());
                        let mut request_line = String::new();
                        if reader.read_line(&mut request_line).is_err() {
                            return;
                        }
                        let mut parts = request_line.trim().splitn(3, ' ');
                        let _method = parts.next().unwrap_or_default();
                        let path = parts.next().unwrap_or_default().to_owned();

                        let mut headers = HashMap::new();
                        loop {
                            let mut line = String::new();
                            if reader.read_line(&mut line).is_err() || line.trim().is_empty() {
                                break;
                            }
                            if let Some((k, v)) = line.trim().split_once(": ") {
                                headers.insert(k.to_lowercase(), v.to_owned());
                            }
                        }

                        reqs.lock().unwrap().push(CapturedRequest {
                            path: path.clone(),
                            headers,
                        });

                        let response = if path.starts_with("/token") {
                            if behavior.token_status == 200 {
                                let body = r#"{"token":"mock-token-1"}"#;
                                format!(
                                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                                    body.len()
                                )
                            } else {
                                format!(
                                    "HTTP/1.1 {} Error\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                                    behavior.token_status
                                )
                            }
                        } else if path.contains("/manifests/") {
                            if behavior.manifest_status != 200 {
                                format!(
                                    "HTTP/1.1 {} Error\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                                    behavior.manifest_status
                                )
                            } else if let Some(digest) = &behavior.digest {
                                format!(
                                    "HTTP/1.1 200 OK\r\nDocker-Content-Digest: {digest}\r\nContent-Length: 2\r\nConnection: close\r\n\r\n{{}}"
                                )
                            } else {
                                "HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\n{}"
                                    .to_owned()
                            }
                        } else {
                            "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                                .to_owned()
                        };

                        let _ = stream.write_all(response.as_bytes());
                        let _ = stream.flush();
                    });
                }
            });

            MockRegistry {
                addr,
                requests,
                _handle: handle,
            }
        }

        fn captured(&self) -> Vec<CapturedRequest> {
            self.requests.lock().unwrap().clone()
        }

        fn token_requests(&self) -> usize {
            self.captured()
                .iter()
                .filter(|r| r.path.starts_with("/token"))
                .count()
        }
    }

    fn coordinate() -> RegistryCoordinate {
        RegistryCoordinate::from_str("ghcr.io/cloudnative-pg/postgresql").unwrap()
    }

    fn client_for(server: &MockRegistry) -> RegistryClient {
        RegistryClient::with_api_base(coordinate(), &server.addr)
    }

    #[test]
    fn resolves_digest_from_response_header() {
        let server = MockRegistry::start(MockBehavior::default());
        let client = client_for(&server);
        let digest = client
            .resolve_digest("17.6-202509161052-minimal-bookworm")
            .unwrap();
        assert_eq!(digest, "sha256:feedface");
    }

    #[test]
    fn manifest_request_carries_bearer_token_and_accept_list() {
        let server = MockRegistry::start(MockBehavior::default());
        let client = client_for(&server);
        client.resolve_digest("17.6-202509161052").unwrap();

        std::thread::sleep(std::time::Duration::from_millis(50));
        let manifest_req = server
            .captured()
            .into_iter()
            .find(|r| r.path.contains("/manifests/"))
            .expect("manifest request captured");
        assert_eq!(
            manifest_req.headers.get("authorization"),
            Some(&"Bearer mock-token-1".to_owned())
        );
        let accept = manifest_req.headers.get("accept").expect("accept header");
        for media_type in MANIFEST_MEDIA_TYPES {
            assert!(accept.contains(media_type), "accept must list {media_type}");
        }
        assert!(manifest_req
            .path
            .ends_with("/v2/cloudnative-pg/postgresql/manifests/17.6-202509161052"));
    }

    #[test]
    fn token_is_cached_across_resolutions() {
        let server = MockRegistry::start(MockBehavior::default());
        let client = client_for(&server);
        client.resolve_digest("17.6").unwrap();
        client.resolve_digest("16.4").unwrap();
        client.resolve_digest("13.0").unwrap();

        std::thread::sleep(std::time::Duration::from_millis(50));
        assert_eq!(server.token_requests(), 1, "token fetched once per window");
    }

    #[test]
    fn expired_token_is_refreshed() {
        let server = MockRegistry::start(MockBehavior::default());
        let client = client_for(&server).with_token_ttl(Duration::ZERO);
        client.resolve_digest("17.6").unwrap();
        client.resolve_digest("16.4").unwrap();

        std::thread::sleep(std::time::Duration::from_millis(50));
        assert_eq!(server.token_requests(), 2, "zero TTL forces re-acquisition");
    }

    #[test]
    fn missing_digest_header_is_a_resolution_error() {
        let server = MockRegistry::start(MockBehavior {
            digest: None,
            ..MockBehavior::default()
        });
        let client = client_for(&server);
        let err = client.resolve_digest("17.6").unwrap_err();
        assert!(
            matches!(err, RegistryError::DigestResolution { ref reference, .. }
                if reference == "ghcr.io/cloudnative-pg/postgresql:17.6")
        );
    }

    #[test]
    fn manifest_http_error_is_a_resolution_error() {
        let server = MockRegistry::start(MockBehavior {
            manifest_status: 404,
            ..MockBehavior::default()
        });
        let client = client_for(&server);
        let err = client.resolve_digest("17.6").unwrap_err();
        assert!(matches!(err, RegistryError::DigestResolution { .. }));
    }

    #[test]
    fn token_failure_is_an_authentication_error() {
        let server = MockRegistry::start(MockBehavior {
            token_status: 500,
            ..MockBehavior::default()
        });
        let client = client_for(&server);
        let err = client.resolve_digest("17.6").unwrap_err();
        assert!(
            matches!(err, RegistryError::Authentication { ref repository, .. }
                if repository == "cloudnative-pg/postgresql")
        );
    }

    #[test]
    fn unreachable_registry_is_an_authentication_error() {
        let client = RegistryClient::with_api_base(coordinate(), "http://127.0.0.1:1");
        let err = client.resolve_digest("17.6").unwrap_err();
        assert!(matches!(err, RegistryError::Authentication { .. }));
    }
}
