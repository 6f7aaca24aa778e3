use std::env;

pub const DEFAULT_LOOKUP_TIMEOUT: u64 = 30;

#[derive(Debug, Clone)]
pub struct Envs {
    /**
     * Base URL of the lookup table endpoint
     *
     * Tables are fetched from `<url>/map/0/<map_name>/1-filter`.
     * Environment variable: FORMFLOW_LOOKUP_URL
     * Default: none
     */
    pub lookup_url: Option<String>,
    /**
     * Lookup request timeout in seconds
     *
     * Environment variable: FORMFLOW_LOOKUP_TIMEOUT
     * Default: 30
     */
    pub lookup_timeout: u64,
}

impl Envs {
    pub fn load() -> Self {
        let lookup_url = env::var("FORMFLOW_LOOKUP_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let lookup_timeout = env::var("FORMFLOW_LOOKUP_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_LOOKUP_TIMEOUT);

        Self {
            lookup_url,
            lookup_timeout,
        }
    }
}
