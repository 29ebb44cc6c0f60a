//! Runtime configuration read from the environment

use std::path::PathBuf;

use anyhow::{Context, Result};

/// Default listening port
pub const DEFAULT_PORT: u16 = 5000;

/// Default upload limit in megabytes
pub const DEFAULT_MAX_UPLOAD_MB: usize = 64;

/// Application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Directory holding `current.csv` and `settings.json`
    pub data_dir: PathBuf,
    
    /// Port to listen on
    pub port: u16,
    
    /// Debug mode binds to loopback only
    pub debug: bool,
    
    /// Largest accepted request body, in bytes
    pub max_upload_bytes: usize,
}

impl AppConfig {
    /// Build the configuration from process environment variables
    ///
    /// - `LABELER_DATA_DIR` (default `data`)
    /// - `PORT` (default 5000)
    /// - `LABELER_DEBUG` (`1`, `true`, `yes`, `on`)
    /// - `LABELER_MAX_UPLOAD_MB` (default 64)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
    
    /// Build the configuration from an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let data_dir = lookup("LABELER_DATA_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data"));
        
        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse().with_context(|| format!("Invalid PORT '{}'", raw))?,
            None => DEFAULT_PORT,
        };
        
        let debug = lookup("LABELER_DEBUG")
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false);
        
        let max_upload_mb: usize = match lookup("LABELER_MAX_UPLOAD_MB") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid LABELER_MAX_UPLOAD_MB '{}'", raw))?,
            None => DEFAULT_MAX_UPLOAD_MB,
        };
        
        Ok(Self {
            data_dir,
            port,
            debug,
            max_upload_bytes: max_upload_mb * 1024 * 1024,
        })
    }
    
    /// Host to bind: loopback in debug mode, all interfaces otherwise
    pub fn host(&self) -> &'static str {
        if self.debug {
            "127.0.0.1"
        } else {
            "0.0.0.0"
        }
    }
    
    /// Socket address string to bind
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host(), self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    
    fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }
    
    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.bind_addr(), "0.0.0.0:5000");
        assert_eq!(config.max_upload_bytes, 64 * 1024 * 1024);
    }
    
    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("LABELER_DATA_DIR", "/tmp/labels"),
            ("PORT", "8080"),
            ("LABELER_DEBUG", "Yes"),
        ])
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/labels"));
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
    }
    
    #[test]
    fn test_invalid_port() {
        assert!(config_from(&[("PORT", "http")]).is_err());
    }
}
