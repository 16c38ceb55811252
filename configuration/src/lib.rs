use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

pub fn get_config<T: DeserializeOwned>(config_path: PathBuf) -> Result<T, config::ConfigError> {
    let f = config::File::from(config_path);
    let config = config::Config::builder().add_source(f).build()?;
    config.try_deserialize::<T>()
}

/// Same as [`get_config`] but a missing file yields the defaults.
pub fn get_config_or_default<T>(config_path: PathBuf) -> Result<T, config::ConfigError>
where
    T: DeserializeOwned + Default,
{
    if !config_path.exists() {
        return Ok(T::default());
    }
    get_config(config_path)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EsniConfiguration {
    pub resolver: ResolverConfig,
    pub esni: EsniSettings,
    pub debug: DebugConfiguration,
}

/// The DNS-over-TLS resolver every lookup goes to.
#[derive(Clone, Debug, Deserialize)]
pub struct ResolverConfig {
    pub address: SocketAddr,
    /// Name checked against the resolver certificate. The IP of `address`
    /// is used when unset.
    #[serde(default)]
    pub server_name: Option<String>,
}

impl ResolverConfig {
    pub fn new(address: SocketAddr) -> Self {
        Self {
            address,
            server_name: None,
        }
    }

    pub fn server_name(&self) -> String {
        match &self.server_name {
            Some(name) => name.clone(),
            None => self.address.ip().to_string(),
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self::new(SocketAddr::new(IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1)), 853))
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EsniMode {
    /// Any lookup or key failure fails the whole config build.
    #[default]
    Required,
    /// Fall back to a config without ESNI keys.
    Optional,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EsniSettings {
    pub mode: EsniMode,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DebugConfiguration {
    /// Takes precedence over `SSLKEYLOGFILE`.
    pub keylog_file: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
}

impl DebugConfiguration {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
