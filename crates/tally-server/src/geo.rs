use std::net::IpAddr;

use anyhow::{anyhow, Context, Result};
use maxminddb::{geoip2, Reader};
use tracing::trace;

use tally_core::analytics::CountryResolver;

/// Country lookup backed by a MaxMind GeoLite2 Country database.
pub struct MaxMindCountryResolver {
    reader: Reader<Vec<u8>>,
}

impl MaxMindCountryResolver {
    /// Load the `.mmdb` file at `path` into memory.
    pub fn open(path: &str) -> Result<Self> {
        let reader = Reader::open_readfile(path)
            .with_context(|| format!("failed to open GeoIP database at {path}"))?;
        Ok(Self { reader })
    }
}

impl CountryResolver for MaxMindCountryResolver {
    /// English country name for `ip`.
    ///
    /// An address missing from the database resolves to an empty name; only
    /// an unparsable address or a reader error is a failure.
    fn country(&self, ip: &str) -> Result<String> {
        let addr: IpAddr = ip
            .parse()
            .map_err(|_| anyhow!("invalid client IP: {ip:?}"))?;

        let record: Option<geoip2::Country> = self.reader.lookup(addr)?.decode()?;
        let name = record
            .and_then(|r| r.country.names.english)
            .unwrap_or_default()
            .to_string();

        trace!("MaxMind lookup for {}: country={:?}", ip, name);
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_database_is_an_error() {
        assert!(MaxMindCountryResolver::open("/nonexistent/GeoLite2-Country.mmdb").is_err());
    }
}
