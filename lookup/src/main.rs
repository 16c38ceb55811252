use configuration::{get_config_or_default, EsniConfiguration, EsniMode};
use esni::{ClientConfigBuilder, EsniKeys, EsniResolver};
use rustls::KeyLog;
use std::error::Error;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;
use transport::{DotConnector, KeyLogSink};

mod cli_args;

use cli_args::CliArgs;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args: CliArgs = argh::from_env();
    let config: EsniConfiguration = get_config_or_default(args.config.clone())?;

    let key_log = open_key_log(&config)?;
    let connector = DotConnector::new(&config.resolver, key_log.clone())?;
    let resolver = EsniResolver::new(connector);
    info!(
        resolver = %config.resolver.address,
        server_name = %config.resolver.server_name(),
        "using DoT resolver"
    );

    let timeout = config.debug.timeout();

    if args.no_ipv4 {
        let resolution = with_timeout(timeout, resolver.resolve(&args.hostname, false)).await??;
        println!("ESNI keys ({} bytes): {}", resolution.keys.len(), hex(&resolution.keys));
        match EsniKeys::parse(&resolution.keys) {
            Ok(keys) => print_keys(&keys),
            Err(e) => println!("keys do not parse: {}", e),
        }
        return Ok(());
    }

    let mode = if args.optional {
        EsniMode::Optional
    } else {
        config.esni.mode
    };
    let tls = Arc::new(transport::client_config(key_log));
    let builder = ClientConfigBuilder::new(resolver, tls).mode(mode);

    let (client_config, ipv4) = with_timeout(timeout, builder.build(&args.hostname)).await??;
    println!("server name: {:?}", client_config.server_name);
    match &client_config.esni_keys {
        Some(keys) => print_keys(keys),
        None => println!("ESNI: disabled"),
    }
    match ipv4 {
        Some(addr) => println!("IPv4: {}", addr),
        None => println!("IPv4: unknown"),
    }

    Ok(())
}

/// `--config`'s keylog_file wins over `SSLKEYLOGFILE`.
fn open_key_log(config: &EsniConfiguration) -> std::io::Result<Option<Arc<dyn KeyLog>>> {
    let sink = match &config.debug.keylog_file {
        Some(path) => Some(KeyLogSink::open(path)?),
        None => KeyLogSink::from_env()?,
    };

    Ok(sink.map(|s| Arc::new(s) as Arc<dyn KeyLog>))
}

async fn with_timeout<F: Future>(
    timeout: Option<Duration>,
    f: F,
) -> Result<F::Output, tokio::time::error::Elapsed> {
    match timeout {
        Some(d) => tokio::time::timeout(d, f).await,
        None => Ok(f.await),
    }
}

fn print_keys(keys: &EsniKeys) {
    println!("ESNI version: {:#06x}", keys.version);
    for share in &keys.keys {
        println!(
            "  key share: group {:#06x}, {} bytes",
            share.group,
            share.key_exchange.len()
        );
    }
    println!("  cipher suites: {:04x?}", keys.cipher_suites);
    println!("  valid: {} .. {}", keys.not_before, keys.not_after);
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
