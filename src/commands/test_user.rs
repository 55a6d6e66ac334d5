//! `--test-user <id>`: resolves a single id and prints its record without
//! ever calling the block endpoint.

use super::Cli;
use crate::api::RemoteClient;
use crate::config::Config;
use crate::libs::cache::{owner_id_from, IdentifierCache};
use crate::libs::credentials::CredentialStore;
use crate::msg_print;
use anyhow::Result;
use std::time::Duration;

pub async fn run(cli: &Cli, id: &str) -> Result<()> {
    let config = Config::load()?;
    let cache_dir = super::resolve_cache_dir(cli)?;
    let cookies_path = super::resolve_cookies_path(cli);

    let mut credentials = CredentialStore::new(cookies_path, Duration::from_secs(config.credential_cache_ttl_secs));
    let mapping = credentials.load()?;

    let owner = owner_id_from(&mapping);
    let cache = IdentifierCache::new(cache_dir, owner);

    if let Some((profile, relationship)) = cache.full_user(id) {
        msg_print!(format!("{} (cached): {:?} / {:?}", id, profile, relationship));
        return Ok(());
    }

    let header_enhancement = config.header_enhancement && !cli.disable_header_enhancement;
    let forwarded_for_enabled = config.forwarded_for_enabled || cli.enable_forwarded_for;
    let mut client = RemoteClient::new(header_enhancement, forwarded_for_enabled, &config.forwarded_for_ranges)?;

    let (results, _status) = client.lookup_batch(std::slice::from_ref(&id.to_string()), &mapping).await?;
    match results.into_iter().next() {
        Some((_, Some(user))) => {
            cache.write_profile(&user.profile)?;
            cache.write_relationship(&user.profile.id, &user.relationship)?;
            msg_print!(format!("{}: {:?} / {:?}", id, user.profile, user.relationship));
        }
        _ => msg_print!(format!("{}: no record found", id)),
    }

    Ok(())
}
