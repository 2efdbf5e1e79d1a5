//! Istio integration configuration
//!
//! Values are read from `batata.istio.*` keys, e.g. in `conf/application.yml`:
//!
//! ```yaml
//! batata:
//!   istio:
//!     domain:
//!       suffix: nacos
//!     mcp:
//!       server:
//!         enabled: true
//! ```
//!
//! Every key can be overridden from the environment by upper-casing it and
//! replacing dots with underscores, e.g. `BATATA_ISTIO_DOMAIN_SUFFIX=global`.

use std::path::Path;

use batata_istio_common::{IstioError, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

const DOMAIN_SUFFIX: &str = "batata.istio.domain.suffix";
const SERVER_PORT: &str = "batata.istio.server.port";
const MCP_ENABLED: &str = "batata.istio.mcp.server.enabled";
const XDS_ENABLED: &str = "batata.istio.xds.server.enabled";
const DEBOUNCE_AFTER: &str = "batata.istio.debounce.after";
const DEBOUNCE_MAX: &str = "batata.istio.debounce.max";
const FULL_PUSH_INTERVAL: &str = "batata.istio.full.push.interval";

/// Istio integration settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IstioConfig {
    /// Appended to every exported host name
    pub domain_suffix: String,
    /// Port the MCP/xDS server listens on
    pub server_port: u16,
    pub mcp_enabled: bool,
    pub xds_enabled: bool,
    /// Quiet period before a registry change triggers a push
    pub debounce_after_ms: u64,
    /// Upper bound on how long pushes may be delayed by debouncing
    pub debounce_max_ms: u64,
    pub full_push_interval_ms: u64,
}

impl Default for IstioConfig {
    fn default() -> Self {
        Self {
            domain_suffix: "nacos".to_string(),
            server_port: 18848,
            mcp_enabled: false,
            xds_enabled: false,
            debounce_after_ms: 100,
            debounce_max_ms: 10_000,
            full_push_interval_ms: 30_000,
        }
    }
}

impl IstioConfig {
    /// Read settings from a loaded configuration, using defaults for missing keys
    pub fn from_config(config: &Config) -> Self {
        let defaults = Self::default();
        let get_u64 = |key: &str, default: u64| {
            config
                .get_int(key)
                .ok()
                .and_then(|v| u64::try_from(v).ok())
                .unwrap_or(default)
        };

        Self {
            domain_suffix: config
                .get_string(DOMAIN_SUFFIX)
                .unwrap_or(defaults.domain_suffix),
            server_port: config
                .get_int(SERVER_PORT)
                .ok()
                .and_then(|v| u16::try_from(v).ok())
                .unwrap_or(defaults.server_port),
            mcp_enabled: config.get_bool(MCP_ENABLED).unwrap_or(defaults.mcp_enabled),
            xds_enabled: config.get_bool(XDS_ENABLED).unwrap_or(defaults.xds_enabled),
            debounce_after_ms: get_u64(DEBOUNCE_AFTER, defaults.debounce_after_ms),
            debounce_max_ms: get_u64(DEBOUNCE_MAX, defaults.debounce_max_ms),
            full_push_interval_ms: get_u64(FULL_PUSH_INTERVAL, defaults.full_push_interval_ms),
        }
    }

    /// Load from an optional file plus `BATATA_ISTIO_*` environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, Self::environment())
    }

    /// Environment source mapping `BATATA_ISTIO_DOMAIN_SUFFIX` to `batata.istio.domain.suffix`
    fn environment() -> Environment {
        Environment::with_prefix("batata")
            .separator("_")
            .keep_prefix(true)
            .try_parsing(true)
    }

    fn load_with(path: Option<&Path>, environment: Environment) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }
        let config = builder
            .add_source(environment)
            .build()
            .map_err(|e| IstioError::Config(e.to_string()))?;

        let istio_config = Self::from_config(&config);
        istio_config.validate()?;
        Ok(istio_config)
    }

    /// The domain suffix must be usable as trailing host name labels
    pub fn validate(&self) -> Result<()> {
        if self.domain_suffix.is_empty() {
            return Err(IstioError::Config(
                "domain suffix must not be empty".to_string(),
            ));
        }
        if let Some(c) = self
            .domain_suffix
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '.'))
        {
            return Err(IstioError::Config(format!(
                "domain suffix '{}' contains invalid character '{}'",
                self.domain_suffix, c
            )));
        }
        if self.debounce_after_ms > self.debounce_max_ms {
            return Err(IstioError::Config(format!(
                "debounce after ({}ms) exceeds debounce max ({}ms)",
                self.debounce_after_ms, self.debounce_max_ms
            )));
        }
        Ok(())
    }

    /// Host name exported for a service display name
    pub fn host_name(&self, service_name: &str) -> String {
        format!("{}.{}", service_name, self.domain_suffix)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = IstioConfig::default();
        assert_eq!(config.domain_suffix, "nacos");
        assert_eq!(config.server_port, 18848);
        assert!(!config.mcp_enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_empty_config_uses_defaults() {
        let config = Config::builder().build().unwrap();
        assert_eq!(IstioConfig::from_config(&config), IstioConfig::default());
    }

    #[test]
    fn test_from_config_overrides() {
        let config = Config::builder()
            .set_override(DOMAIN_SUFFIX, "global")
            .unwrap()
            .set_override(MCP_ENABLED, true)
            .unwrap()
            .set_override(SERVER_PORT, 15010)
            .unwrap()
            .set_override(DEBOUNCE_AFTER, 200)
            .unwrap()
            .build()
            .unwrap();

        let istio_config = IstioConfig::from_config(&config);
        assert_eq!(istio_config.domain_suffix, "global");
        assert!(istio_config.mcp_enabled);
        assert!(!istio_config.xds_enabled);
        assert_eq!(istio_config.server_port, 15010);
        assert_eq!(istio_config.debounce_after_ms, 200);
        assert_eq!(istio_config.debounce_max_ms, 10_000);
    }

    #[test]
    fn test_out_of_range_port_falls_back() {
        let config = Config::builder()
            .set_override(SERVER_PORT, 70000)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(IstioConfig::from_config(&config).server_port, 18848);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        writeln!(
            file,
            "batata:\n  istio:\n    domain:\n      suffix: mesh.local\n    xds:\n      server:\n        enabled: true"
        )
        .unwrap();

        let config = IstioConfig::load_with(Some(file.path()), env(&[])).unwrap();
        assert_eq!(config.domain_suffix, "mesh.local");
        assert!(config.xds_enabled);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config =
            IstioConfig::load_with(Some(&dir.path().join("absent.yml")), env(&[])).unwrap();
        assert_eq!(config.domain_suffix, "nacos");
    }

    fn env(vars: &[(&str, &str)]) -> Environment {
        let mut source = config::Map::new();
        for (key, value) in vars {
            source.insert(key.to_string(), value.to_string());
        }
        IstioConfig::environment().source(Some(source))
    }

    #[test]
    fn test_environment_overrides() {
        let config = IstioConfig::load_with(
            None,
            env(&[
                ("BATATA_ISTIO_DOMAIN_SUFFIX", "mesh"),
                ("BATATA_ISTIO_MCP_SERVER_ENABLED", "true"),
                ("BATATA_ISTIO_FULL_PUSH_INTERVAL", "60000"),
                ("PATH", "/usr/bin"),
            ]),
        )
        .unwrap();

        assert_eq!(config.domain_suffix, "mesh");
        assert!(config.mcp_enabled);
        assert_eq!(config.full_push_interval_ms, 60_000);
        assert_eq!(config.server_port, 18848);
    }

    #[test]
    fn test_environment_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        writeln!(
            file,
            "batata:\n  istio:\n    domain:\n      suffix: mesh.local\n    server:\n      port: 15010"
        )
        .unwrap();

        let config = IstioConfig::load_with(
            Some(file.path()),
            env(&[("BATATA_ISTIO_DOMAIN_SUFFIX", "global")]),
        )
        .unwrap();
        assert_eq!(config.domain_suffix, "global");
        assert_eq!(config.server_port, 15010);
    }

    #[test]
    fn test_validate_rejects_bad_suffix() {
        let mut config = IstioConfig {
            domain_suffix: String::new(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(IstioError::Config(_))));

        config.domain_suffix = "svc_cluster".to_string();
        assert!(matches!(config.validate(), Err(IstioError::Config(_))));

        config.domain_suffix = "svc.cluster.local".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_inverted_debounce() {
        let config = IstioConfig {
            debounce_after_ms: 20_000,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_host_name() {
        let config = IstioConfig {
            domain_suffix: "global".to_string(),
            ..Default::default()
        };
        assert_eq!(config.host_name("orders"), "orders.global");
    }

    #[test]
    fn test_serde_camel_case() {
        let json = serde_json::to_value(IstioConfig::default()).unwrap();
        assert_eq!(json["domainSuffix"], "nacos");
        assert_eq!(json["fullPushIntervalMs"], 30_000);
    }
}
