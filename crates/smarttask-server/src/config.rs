use serde::Serialize;

/// Request-facing configuration. Populated from `SMARTTASK_*` environment
/// variables in `main`; everything has a sensible default so tests can use
/// `ApiConfig::default()` directly.
#[derive(Debug, Clone, Serialize)]
pub struct ApiConfig {
    pub max_body_bytes: usize,
    /// Header carrying the verified identity injected by the external
    /// identity provider's proxy. Requests without it never reach a handler.
    pub identity_header: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 16 * 1024,
            identity_header: "x-user-id".to_string(),
        }
    }
}

pub fn validate_startup_config(api: &ApiConfig) -> Result<(), String> {
    if api.max_body_bytes == 0 {
        return Err("max_body_bytes must be > 0".to_string());
    }
    let header = api.identity_header.as_str();
    if header.is_empty() {
        return Err("identity_header must not be empty".to_string());
    }
    if !header
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(format!(
            "identity_header {header:?} must be a lowercase header name"
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_passes_validation() {
        validate_startup_config(&ApiConfig::default()).expect("default config is valid");
    }

    #[test]
    fn startup_validation_rejects_bad_identity_header() {
        let cfg = ApiConfig {
            identity_header: "X-User-Id".to_string(),
            ..ApiConfig::default()
        };
        let err = validate_startup_config(&cfg).expect_err("uppercase header");
        assert!(err.contains("lowercase"));

        let cfg = ApiConfig {
            identity_header: String::new(),
            ..ApiConfig::default()
        };
        assert!(validate_startup_config(&cfg).is_err());
    }

    #[test]
    fn startup_validation_rejects_zero_body_limit() {
        let cfg = ApiConfig {
            max_body_bytes: 0,
            ..ApiConfig::default()
        };
        assert!(validate_startup_config(&cfg).is_err());
    }
}
