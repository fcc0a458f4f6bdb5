use std::path::PathBuf;

use clap::Parser;
use lokiz::config::ClientConfig;
use lokiz::feed::AutoplayPolicy;

#[derive(Parser, Debug)]
#[command(name = "lokiz", about = "LOKIZ short-video client", version)]
pub struct Cli {
    /// TOML config file. Missing files fall back to defaults.
    #[arg(long, default_value = "lokiz.toml")]
    pub config: PathBuf,
    #[arg(long)]
    pub api_url: Option<String>,
    #[arg(long)]
    pub session_path: Option<PathBuf>,
    #[arg(long)]
    pub settle_delay_ms: Option<u64>,
    /// allowed, muted-only or blocked
    #[arg(long)]
    pub autoplay: Option<AutoplayPolicy>,
    #[arg(long)]
    pub log_level: Option<String>,
    #[arg(long)]
    pub log_file: Option<PathBuf>,
    /// Run on mock data without a backend.
    #[arg(long, default_value_t = false)]
    pub offline: bool,
}

impl Cli {
    pub fn merge_into_config(self, mut cfg: ClientConfig) -> ClientConfig {
        if let Some(v) = self.api_url {
            cfg.api_url = v;
        }
        if let Some(v) = self.session_path {
            cfg.session_path = v;
        }
        if let Some(v) = self.settle_delay_ms {
            cfg.settle_delay_ms = v;
        }
        if let Some(v) = self.autoplay {
            cfg.autoplay = v;
        }
        if let Some(v) = self.log_level {
            cfg.log_level = v;
        }
        if let Some(v) = self.log_file {
            cfg.log_file = v;
        }
        if self.offline || cfg!(feature = "offline") {
            cfg.offline = true;
        }
        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_file_values() {
        let cli = Cli::parse_from(["lokiz", "--api-url", "http://api.test", "--autoplay", "muted-only", "--offline"]);
        let file = ClientConfig { settle_delay_ms: 300, ..ClientConfig::default() };
        let cfg = cli.merge_into_config(file);
        assert_eq!(cfg.api_url, "http://api.test");
        assert_eq!(cfg.autoplay, AutoplayPolicy::MutedOnly);
        assert_eq!(cfg.settle_delay_ms, 300);
        assert!(cfg.offline);
    }

    #[test]
    fn unset_flags_keep_file_values() {
        let cli = Cli::parse_from(["lokiz"]);
        let file = ClientConfig { log_level: "debug".into(), ..ClientConfig::default() };
        assert_eq!(cli.merge_into_config(file).log_level, "debug");
    }
}
