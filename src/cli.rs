//! Command-line interface.
//!
//! Flags override the environment: a value given on the command line always
//! wins over the matching `MCP_*` variable.

use clap::Parser;

use crate::core::{Config, Result};

#[cfg(feature = "http")]
use crate::core::transport::{HttpConfig, TransportConfig};

/// Command-line arguments.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "hk_tech_mcp_server",
    version,
    about = "MCP server for Hong Kong Government information security incident statistics"
)]
pub struct Cli {
    /// Serve over streamable HTTP instead of stdio.
    #[arg(short = 's', long = "sse")]
    pub sse: bool,

    /// Host to bind in HTTP mode (implies --sse).
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind in HTTP mode (implies --sse).
    #[arg(long)]
    pub port: Option<u16>,

    /// Log level: trace, debug, info, warn or error.
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Cli {
    /// Whether the flags ask for the HTTP transport.
    pub fn wants_http(&self) -> bool {
        self.sse || self.host.is_some() || self.port.is_some()
    }

    /// Apply these flags on top of `config`.
    pub fn apply(self, config: &mut Config) -> Result<()> {
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }

        if self.wants_http() {
            self.apply_http(config)?;
        }

        Ok(())
    }

    #[cfg(feature = "http")]
    fn apply_http(self, config: &mut Config) -> Result<()> {
        // Keep MCP_HTTP_* values even when MCP_TRANSPORT did not pick HTTP.
        let mut http = match config.transport.as_http() {
            Some(http) => http.clone(),
            None => HttpConfig::from_env()?,
        };

        if let Some(host) = self.host {
            http.host = host;
        }
        if let Some(port) = self.port {
            http.port = port;
        }

        config.transport = TransportConfig::Http(http);
        Ok(())
    }

    #[cfg(not(feature = "http"))]
    fn apply_http(self, _config: &mut Config) -> Result<()> {
        Err(crate::core::Error::config(
            "HTTP transport requested but this build has no `http` feature",
        ))
    }
}

/// Build the startup configuration: environment first, then flags.
pub fn load_config(cli: Cli) -> Result<Config> {
    let mut config = Config::from_env()?;
    cli.apply(&mut config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    #[cfg(feature = "http")]
    use crate::core::config::ENV_TEST_LOCK;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("hk_tech_mcp_server").chain(args.iter().copied()))
            .unwrap()
    }

    #[cfg(feature = "http")]
    fn clear_env() {
        unsafe {
            for key in ["MCP_TRANSPORT", "MCP_HTTP_HOST", "MCP_HTTP_PORT", "MCP_LOG_LEVEL"] {
                std::env::remove_var(key);
            }
        }
    }

    #[test]
    fn test_parse_flags() {
        let cli = parse(&["--sse", "--host", "0.0.0.0", "--port", "9000"]);
        assert!(cli.sse);
        assert_eq!(cli.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(cli.port, Some(9000));
    }

    #[test]
    fn test_short_sse_flag() {
        assert!(parse(&["-s"]).wants_http());
        assert!(!parse(&[]).wants_http());
    }

    #[test]
    fn test_invalid_port_rejected() {
        let result = Cli::try_parse_from(["hk_tech_mcp_server", "--port", "70000"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_log_level_flag() {
        let mut config = Config::default();
        parse(&["--log-level", "debug"]).apply(&mut config).unwrap();
        assert_eq!(config.logging.level, "debug");
    }

    #[cfg(feature = "stdio")]
    #[test]
    fn test_no_flags_keeps_transport() {
        let mut config = Config::default();
        parse(&[]).apply(&mut config).unwrap();
        assert!(config.transport.is_stdio());
    }

    #[cfg(feature = "http")]
    #[test]
    fn test_sse_flag_selects_http_with_defaults() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        clear_env();

        let config = load_config(parse(&["--sse"])).unwrap();
        let http = config.transport.as_http().expect("http transport");
        assert_eq!(http.address(), "127.0.0.1:8000");
    }

    #[cfg(feature = "http")]
    #[test]
    fn test_flags_override_env() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        clear_env();
        unsafe {
            std::env::set_var("MCP_TRANSPORT", "http");
            std::env::set_var("MCP_HTTP_HOST", "10.0.0.1");
            std::env::set_var("MCP_HTTP_PORT", "8100");
        }

        let config = load_config(parse(&["--port", "9200"]));
        clear_env();

        let config = config.unwrap();
        let http = config.transport.as_http().expect("http transport");
        assert_eq!(http.host, "10.0.0.1");
        assert_eq!(http.port, 9200);
    }

    #[cfg(feature = "http")]
    #[test]
    fn test_env_http_settings_used_without_env_transport() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        clear_env();
        unsafe {
            std::env::set_var("MCP_HTTP_PORT", "8300");
        }

        let config = load_config(parse(&["--sse"]));
        clear_env();

        let http = config.unwrap().transport.as_http().cloned().expect("http transport");
        assert_eq!(http.port, 8300);
    }
}
