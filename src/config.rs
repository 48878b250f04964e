use clap::Parser;
use std::time::Duration;

/// Server settings. Flags win over environment variables, which may come from `.env`.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "tictactoe_server", about = "Two-player tic-tac-toe over WebSockets")]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = 9000)]
    pub port: u16,

    /// Drop rooms stuck waiting for an opponent after this many seconds (0 keeps them forever)
    #[arg(long, env = "WAITING_TTL_SECS", default_value_t = 0)]
    pub waiting_ttl_secs: u64,

    /// How often to look for idle rooms
    #[arg(long, env = "SWEEP_INTERVAL_SECS", default_value_t = 60)]
    pub sweep_interval_secs: u64,
}

impl Config {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// `None` when expiry is switched off
    pub fn waiting_ttl(&self) -> Option<Duration> {
        (self.waiting_ttl_secs > 0).then(|| Duration::from_secs(self.waiting_ttl_secs))
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}
