//! Nickname allocation for accounts that predate nicknames.
//!
//! The handle is derived from the email local part and made unique by probing
//! `base`, `base_1`, `base_2`, … The unique index on `users.nickname` is the
//! final arbiter: when a write loses a race, probing resumes at the next
//! suffix.

use anyhow::Result;
use tracing::{debug, info};

use crate::constants::account;
use crate::db::{Store, UniqueWrite};
use crate::domain::validation::is_nickname_char;
use crate::models::Account;

/// Reduced, truncated email local part; `user` when what is left is shorter
/// than a registrable nickname.
#[must_use]
pub fn derive_base(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default();

    let base: String = local
        .chars()
        .filter(|c| is_nickname_char(*c))
        .take(account::NICKNAME_BASE_MAX_CHARS)
        .collect();

    if base.chars().count() < account::NICKNAME_MIN_CHARS {
        account::NICKNAME_FALLBACK.to_string()
    } else {
        base
    }
}

/// `base` for attempt 0, `base_N` afterwards.
#[must_use]
pub fn candidate(base: &str, attempt: u32) -> String {
    if attempt == 0 {
        base.to_string()
    } else {
        format!("{base}_{attempt}")
    }
}

/// Returns the account with a nickname, allocating one if it had none.
pub async fn ensure_nickname(store: &Store, account: Account) -> Result<Account> {
    if account.nickname.is_some() {
        return Ok(account);
    }

    let repo = store.user_repo();
    let base = derive_base(&account.email);
    let mut attempt = 0;

    loop {
        let handle = candidate(&base, attempt);
        attempt += 1;

        if repo.nickname_taken(&handle, Some(account.id)).await? {
            continue;
        }

        match repo.set_nickname(account.id, &handle).await? {
            UniqueWrite::Written(()) => {
                info!(user_id = %account.id, nickname = %handle, "Allocated nickname");
                return Ok(Account {
                    nickname: Some(handle),
                    ..account
                });
            }
            UniqueWrite::Duplicate => {
                debug!(user_id = %account.id, nickname = %handle, "Nickname race lost, probing on");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::validation::validate_nickname;

    #[test]
    fn test_derive_base_strips_disallowed_chars() {
        assert_eq!(derive_base("foo@bar.com"), "foo");
        assert_eq!(derive_base("j.doe+news@bar.com"), "j.doenews");
        assert_eq!(derive_base("анна@bar.com"), "user");
        assert_eq!(derive_base("@bar.com"), "user");
    }

    #[test]
    fn test_derive_base_never_below_registrable_length() {
        assert_eq!(derive_base("jo@bar.com"), "user");
        assert_eq!(derive_base("j+@bar.com"), "user");
        assert_eq!(derive_base("joe@bar.com"), "joe");

        for email in ["a@bar.com", "jo@bar.com", "+x@bar.com", "joe@bar.com"] {
            assert!(validate_nickname(&derive_base(email)).is_ok(), "{email}");
        }
    }

    #[test]
    fn test_derive_base_truncates() {
        let email = format!("{}@bar.com", "a".repeat(40));
        assert_eq!(derive_base(&email).len(), account::NICKNAME_BASE_MAX_CHARS);
    }

    #[test]
    fn test_candidates() {
        assert_eq!(candidate("foo", 0), "foo");
        assert_eq!(candidate("foo", 1), "foo_1");
        assert_eq!(candidate("foo", 2), "foo_2");
    }
}
