use clap::Parser;
use std::net::SocketAddr;
use std::path::Path;

/// Cricket points table service with a net-run-rate range solver
#[derive(Parser, Debug, Clone)]
#[command(name = "nrr-calculator", version, about)]
pub struct Config {
    /// HTTP listen address
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8080")]
    pub listen_addr: String,

    /// SQLite database path holding the current points table (":memory:" for none)
    #[arg(long, env = "DATABASE_PATH", default_value = "nrr.db")]
    pub database_path: String,

    /// JSON points table used to seed the store (defaults to the built-in table)
    #[arg(long, env = "STANDINGS_FILE")]
    pub standings_file: Option<String>,

    /// Replace the stored table with the seed on start-up
    #[arg(long, env = "RESEED", default_value = "false")]
    pub reseed: bool,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.listen_addr.parse::<SocketAddr>().is_err() {
            anyhow::bail!("listen_addr '{}' is not a socket address", self.listen_addr);
        }
        if self.database_path.trim().is_empty() {
            anyhow::bail!("database_path must not be empty");
        }
        if let Some(path) = &self.standings_file {
            if !Path::new(path).is_file() {
                anyhow::bail!("standings_file '{}' does not exist", path);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::parse_from(["nrr-calculator"]);
        assert_eq!(config.listen_addr, "0.0.0.0:8080");
        assert!(!config.reseed);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_bad_address() {
        let config = Config::parse_from(["nrr-calculator", "--listen-addr", "localhost"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_missing_seed_file() {
        let config = Config::parse_from([
            "nrr-calculator",
            "--standings-file",
            "/nonexistent/points.json",
        ]);
        assert!(config.validate().is_err());
    }
}
