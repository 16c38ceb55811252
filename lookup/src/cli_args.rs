use argh::FromArgs;
use std::path::PathBuf;

fn default_config_path() -> PathBuf {
    PathBuf::from("./esni_config.toml")
}

#[derive(Debug, FromArgs)]
/// Fetch a host's ESNI keys and IPv4 address over DNS-over-TLS.
pub struct CliArgs {
    #[argh(positional)]
    /// host to look up, e.g. `www.cloudflare.com`
    pub hostname: String,

    #[argh(
        option,
        description = "config file path, default: './esni_config.toml'",
        default = "default_config_path()"
    )]
    pub config: PathBuf,

    #[argh(switch, description = "skip the A record lookup")]
    pub no_ipv4: bool,

    #[argh(switch, description = "continue without ESNI if the keys are unusable")]
    pub optional: bool,
}
