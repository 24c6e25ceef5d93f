use crate::RegistryError;
use std::fmt;
use std::str::FromStr;

/// A registry coordinate: host plus repository path, e.g.
/// `ghcr.io/cloudnative-pg/postgresql`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegistryCoordinate {
    host: String,
    repository: String,
}

impl RegistryCoordinate {
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Repository path within the registry, e.g. `cloudnative-pg/postgresql`.
    pub fn repository(&self) -> &str {
        &self.repository
    }

    /// Base URL of the registry's HTTP API.
    pub fn api_base(&self) -> String {
        format!("https://{}", self.host)
    }
}

impl FromStr for RegistryCoordinate {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_end_matches('/');
        let Some((host, repository)) = trimmed.split_once('/') else {
            return Err(RegistryError::InvalidCoordinate(s.to_owned()));
        };
        if host.is_empty() || repository.is_empty() {
            return Err(RegistryError::InvalidCoordinate(s.to_owned()));
        }
        Ok(Self {
            host: host.to_owned(),
            repository: repository.to_owned(),
        })
    }
}

impl fmt::Display for RegistryCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.host, self.repository)
    }
}
