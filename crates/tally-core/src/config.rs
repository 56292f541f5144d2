#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_dir: String,
    pub geoip_path: String,
    pub admin_username: String,
    /// Argon2 PHC string read from `TALLY_ADMIN_PASSWORD_HASH`.
    pub admin_password_hash: String,
    pub duckdb_memory_limit: String,
}

impl Config {
    /// Read configuration from the environment.
    ///
    /// `TALLY_ADMIN_PASSWORD_HASH` is required: the stats routes must never be
    /// served without credentials.
    pub fn from_env() -> Result<Self, String> {
        let admin_password_hash = std::env::var("TALLY_ADMIN_PASSWORD_HASH")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| "TALLY_ADMIN_PASSWORD_HASH not set".to_string())?;

        Ok(Self {
            port: std::env::var("TALLY_PORT")
                .unwrap_or_else(|_| "1323".to_string())
                .parse()
                .map_err(|e| format!("invalid port: {e}"))?,
            data_dir: std::env::var("TALLY_DATA_DIR")
                .unwrap_or_else(|_| "./database".to_string()),
            geoip_path: std::env::var("TALLY_GEOIP_PATH")
                .unwrap_or_else(|_| "./GeoLite2-Country.mmdb".to_string()),
            admin_username: std::env::var("TALLY_ADMIN_USERNAME")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| "admin".to_string()),
            admin_password_hash,
            duckdb_memory_limit: std::env::var("TALLY_DUCKDB_MEMORY")
                .unwrap_or_else(|_| "1GB".to_string()),
        })
    }

    /// Location of the DuckDB file inside `data_dir`.
    pub fn db_path(&self) -> String {
        format!("{}/hits.db", self.data_dir)
    }
}
