use crate::{Error, Result};

/// Connection settings for one compute deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectorConfig {
    pub compute_url: String,
    pub auth_token: String,
    pub project_id: Option<String>,
    pub region_name: Option<String>,
}

impl CollectorConfig {
    /// Create from env vars:
    ///
    /// - `OPENSTACK_COMPUTE_URL` (required; `v1.1` in the URL selects the 1.1 API)
    /// - `OPENSTACK_AUTH_TOKEN` (required)
    /// - `OPENSTACK_PROJECT_ID` (optional)
    /// - `OPENSTACK_REGION_NAME` (optional; a label carried into the report, it
    ///   does not select the endpoint)
    ///
    /// A `.env` file in the working directory is loaded first if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) against an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let optional = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |key: &str| optional(key).ok_or_else(|| Error::MissingEnv(key.into()));

        let compute_url = required("OPENSTACK_COMPUTE_URL")?;
        if !compute_url.starts_with("http://") && !compute_url.starts_with("https://") {
            return Err(Error::InvalidConfig(format!(
                "OPENSTACK_COMPUTE_URL must be an http(s) URL, got {compute_url}"
            )));
        }

        Ok(Self {
            compute_url,
            auth_token: required("OPENSTACK_AUTH_TOKEN")?,
            project_id: optional("OPENSTACK_PROJECT_ID"),
            region_name: optional("OPENSTACK_REGION_NAME"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_full_config() {
        let config = CollectorConfig::from_lookup(lookup(&[
            ("OPENSTACK_COMPUTE_URL", "https://nova.example.com:8774/v1.1/tenant"),
            ("OPENSTACK_AUTH_TOKEN", "secret"),
            ("OPENSTACK_PROJECT_ID", "tenant"),
            ("OPENSTACK_REGION_NAME", "DFW"),
        ]))
        .unwrap();

        assert_eq!(
            config,
            CollectorConfig {
                compute_url: "https://nova.example.com:8774/v1.1/tenant".into(),
                auth_token: "secret".into(),
                project_id: Some("tenant".into()),
                region_name: Some("DFW".into()),
            }
        );
    }

    #[test]
    fn test_blank_optional_vars_are_unset() {
        let config = CollectorConfig::from_lookup(lookup(&[
            ("OPENSTACK_COMPUTE_URL", "http://127.0.0.1:8774/v1.0"),
            ("OPENSTACK_AUTH_TOKEN", "secret"),
            ("OPENSTACK_REGION_NAME", "  "),
        ]))
        .unwrap();

        assert_eq!(config.project_id, None);
        assert_eq!(config.region_name, None);
    }

    #[test]
    fn test_missing_token() {
        let err = CollectorConfig::from_lookup(lookup(&[(
            "OPENSTACK_COMPUTE_URL",
            "https://nova.example.com/v1.1/tenant",
        )]))
        .unwrap_err();

        assert!(matches!(err, Error::MissingEnv(ref key) if key == "OPENSTACK_AUTH_TOKEN"));
    }

    #[test]
    fn test_rejects_non_http_url() {
        let err = CollectorConfig::from_lookup(lookup(&[
            ("OPENSTACK_COMPUTE_URL", "nova.example.com/v1.1"),
            ("OPENSTACK_AUTH_TOKEN", "secret"),
        ]))
        .unwrap_err();

        assert!(matches!(err, Error::InvalidConfig(_)));
    }
}
