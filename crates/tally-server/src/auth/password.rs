//! Argon2id handling for the single admin credential guarding `/stats`.

use anyhow::{anyhow, Context, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

/// Memory cost in KB used by `tally hash-password` (64MB).
pub const DEFAULT_M_COST: u32 = 65536;

const T_COST: u32 = 3;
const P_COST: u32 = 1;

fn argon2id(m_cost: u32) -> Result<Argon2<'static>> {
    let params = Params::new(m_cost, T_COST, P_COST, Some(32))
        .map_err(|e| anyhow!("argon2 params: {e}"))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Produce the PHC string to put in `TALLY_ADMIN_PASSWORD_HASH`.
pub fn hash_password(password: &str, m_cost: u32) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    argon2id(m_cost)?
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| anyhow!("hash_password: {e}"))
}

/// Reject a configured admin hash that could never verify.
///
/// Called at startup so a typo in the env file fails loudly instead of
/// locking everyone out of `/stats`.
pub fn check_admin_hash(hash: &str) -> Result<()> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| anyhow!("{e}"))
        .context("TALLY_ADMIN_PASSWORD_HASH is not a PHC string")?;
    if !parsed.algorithm.as_str().starts_with("argon2") {
        return Err(anyhow!(
            "TALLY_ADMIN_PASSWORD_HASH uses {}, expected argon2",
            parsed.algorithm
        ));
    }
    Ok(())
}

/// Check a Basic-auth password against the admin hash. Cost parameters are
/// read from the hash itself; a malformed hash never verifies.
pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}
