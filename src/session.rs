//! Sign-in, restore and sign-out of an admin session.

use crate::ability::Ability;
use crate::config::Acl;
use crate::error::Result;
use crate::profile::AdminProfile;
use crate::store::ProfileStore;

/// Persist `profile` under `key` and build its ability.
///
/// The ability is built before anything is stored, so a profile that cannot
/// gate a session is never persisted.
pub fn login(
    store: &dyn ProfileStore,
    key: &str,
    profile: &AdminProfile,
    policy: &Acl,
) -> Result<Ability> {
    let ability = Ability::from_profile(profile, policy)?;
    store.save(key, &serde_json::to_string(profile)?)?;
    tracing::info!(role = ability.role(), "admin signed in");
    Ok(ability)
}

/// Rebuild the ability for a stored session.
pub fn restore(store: &dyn ProfileStore, key: &str, policy: &Acl) -> Result<Ability> {
    let raw = store.load(key)?;
    Ability::from_stored(raw.as_deref(), policy)
}

pub fn logout(store: &dyn ProfileStore, key: &str) -> Result<()> {
    store.remove(key)?;
    tracing::info!("admin signed out");
    Ok(())
}
