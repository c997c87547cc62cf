use std::time::Duration;

/// Process configuration, read once at startup from flags or environment.
#[derive(Clone, clap::Parser)]
#[command(name = "till", version, about = "User and session management backend")]
pub struct Config {
    /// Address to listen on.
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:3000")]
    pub bind: String,
    /// PostgreSQL URL. Accounts are kept in memory when absent.
    #[arg(long = "db-url", env = "DB_URL")]
    pub database: Option<String>,
    /// Token signing secret.
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub secret: String,
    /// Token lifetime, e.g. "24h" or "30m".
    #[arg(long, env = "TOKEN_TTL", default_value = "24h", value_parser = lifetime)]
    pub ttl: Duration,
    #[arg(long, env = "WORKERS", default_value_t = 6)]
    pub workers: usize,
    /// Bootstrap administrator, created at startup if the email is unknown.
    #[arg(long = "admin-name", env = "ADMIN_NAME", default_value = "Administrator")]
    pub admin_name: String,
    #[arg(long = "admin-email", env = "ADMIN_EMAIL")]
    pub admin_email: Option<String>,
    #[arg(long = "admin-password", env = "ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: Option<String>,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(!self.secret.trim().is_empty(), "JWT_SECRET must not be empty");
        anyhow::ensure!(self.workers > 0, "WORKERS must be positive");
        anyhow::ensure!(
            self.admin_email.is_some() == self.admin_password.is_some(),
            "ADMIN_EMAIL and ADMIN_PASSWORD must be set together"
        );
        Ok(())
    }
}

fn lifetime(s: &str) -> Result<Duration, String> {
    till_core::duration(s)
        .filter(|d| !d.is_zero())
        .filter(|d| *d <= till_core::TOKEN_DURATION_MAX)
        .ok_or_else(|| format!("invalid duration '{}', expected e.g. 30s, 15m, 24h, 7d", s))
}
