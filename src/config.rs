use std::net::Ipv4Addr;
use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// Name of the directory under the data directory that holds the scripts.
pub const SCRIPT_DIR: &str = "lua";

/// Startup configuration. Parsed once and handed to the server.
#[derive(Debug, Clone, Parser, PartialEq, Eq)]
#[command(name = "maiden", version, about = "Serves a tree of user scripts over HTTP")]
pub struct Config {
    /// HTTP port
    #[arg(long, default_value_t = 5000)]
    pub port: u16,

    /// Path to user data directory
    #[arg(long, default_value = "data/")]
    pub data: PathBuf,

    /// Path to static site directory
    #[arg(long, default_value = "site/")]
    pub site: PathBuf,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 5000,
            data: PathBuf::from("data/"),
            site: PathBuf::from("site/"),
            debug: false,
        }
    }
}

impl Config {
    /// The root of the script tree, `{data}/lua`.
    pub fn scripts_dir(&self) -> PathBuf {
        self.data.join(SCRIPT_DIR)
    }

    /// The address the server listens on.
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }

    /// The default log filter for the binary.
    pub fn log_level(&self) -> log::LevelFilter {
        if self.debug {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_parsed_defaults() {
        assert_eq!(Config::parse_from(["maiden"]), Config::default());
    }

    #[test]
    fn parses_flags() {
        let config = Config::parse_from([
            "maiden", "--port", "8080", "--data", "/tmp/d", "--site", "/srv", "--debug",
        ]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.scripts_dir(), PathBuf::from("/tmp/d/lua"));
        assert_eq!(config.site, PathBuf::from("/srv"));
        assert_eq!(config.log_level(), log::LevelFilter::Debug);
        assert_eq!(config.listen_addr().port(), 8080);
    }
}
