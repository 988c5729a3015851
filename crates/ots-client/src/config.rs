use ots::protocol::Credentials;
use ots::{Error, Result};
use serde::Deserialize;
use std::fmt;

pub const ENV_ENDPOINT: &str = "OTS_ENDPOINT";
pub const ENV_ACCESS_KEY_ID: &str = "OTS_ACCESS_KEY_ID";
pub const ENV_ACCESS_KEY_SECRET: &str = "OTS_ACCESS_KEY_SECRET";
pub const ENV_INSTANCE_NAME: &str = "OTS_INSTANCE_NAME";

/// Connection settings for one OTS instance.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct OtsConfig {
    pub endpoint: String,
    pub access_key_id: String,
    pub access_key_secret: String,
    pub instance_name: String,
}

impl OtsConfig {
    pub fn new(
        endpoint: impl Into<String>,
        access_key_id: impl Into<String>,
        access_key_secret: impl Into<String>,
        instance_name: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            access_key_id: access_key_id.into(),
            access_key_secret: access_key_secret.into(),
            instance_name: instance_name.into(),
        }
    }

    /// Reads `OTS_ENDPOINT`, `OTS_ACCESS_KEY_ID`, `OTS_ACCESS_KEY_SECRET` and
    /// `OTS_INSTANCE_NAME`. Blank values count as missing.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let read = |name: &str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| Error::invalid_input(format!("{name} is not set")))
        };
        Ok(Self {
            endpoint: read(ENV_ENDPOINT)?,
            access_key_id: read(ENV_ACCESS_KEY_ID)?,
            access_key_secret: read(ENV_ACCESS_KEY_SECRET)?,
            instance_name: read(ENV_INSTANCE_NAME)?,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(Error::invalid_input(format!(
                "endpoint must be an http(s) URL, got {:?}",
                self.endpoint
            )));
        }
        for (field, value) in [
            ("access_key_id", &self.access_key_id),
            ("access_key_secret", &self.access_key_secret),
            ("instance_name", &self.instance_name),
        ] {
            if value.trim().is_empty() {
                return Err(Error::invalid_input(format!("{field} is empty")));
            }
        }
        Ok(())
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(
            self.endpoint.clone(),
            self.access_key_id.clone(),
            self.access_key_secret.clone(),
            self.instance_name.clone(),
        )
    }
}

impl fmt::Debug for OtsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OtsConfig")
            .field("endpoint", &self.endpoint)
            .field("access_key_id", &self.access_key_id)
            .field("access_key_secret", &"<redacted>")
            .field("instance_name", &self.instance_name)
            .finish()
    }
}
