use std::sync::Mutex;

use log::debug;
use serde::Serialize;
use sevencow_core::hash::{base64url_encode, base64url_hmac_sha1};
use sevencow_core::time::{now, DateTime};
use sevencow_core::{Error, Result};

use crate::constants::UPLOAD_TOKEN_REFRESH_MARGIN;
use crate::credential::Credential;

/// Policy encoded into an upload token.
#[derive(Serialize)]
struct PutPolicy<'a> {
    scope: &'a str,
    deadline: i64,
}

#[derive(Debug, Clone)]
struct Issued {
    value: String,
    issued_at: i64,
}

/// UploadToken authorizes uploads into a scope for a limited time.
///
/// The scope is either `bucket`, which allows any key, or `bucket:key`,
/// which pins the upload to that key and lets it overwrite an existing file.
///
/// The token is generated locally and cached. It is reissued once it is
/// older than `ttl - 60` seconds, so an in-flight upload never carries an
/// expired token.
#[derive(Debug)]
pub struct UploadToken {
    credential: Credential,
    scope: String,
    ttl: i64,
    issued: Mutex<Option<Issued>>,
}

impl UploadToken {
    /// Create a new upload token for `scope` that lives `ttl` seconds.
    pub fn new(credential: Credential, scope: impl Into<String>, ttl: i64) -> Self {
        Self {
            credential,
            scope: scope.into(),
            ttl,
            issued: Mutex::new(None),
        }
    }

    /// The scope this token authorizes.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Get the token, reissuing it if needed.
    pub fn token(&self) -> Result<String> {
        self.token_at(now())
    }

    /// Get the token as seen at `now`.
    ///
    /// Concurrent callers of the same token never issue it twice for one
    /// refresh window.
    pub fn token_at(&self, now: DateTime) -> Result<String> {
        let now = now.timestamp();
        let mut issued = self.issued.lock().expect("lock poisoned");

        if let Some(v) = issued.as_ref() {
            if now - v.issued_at < self.ttl - UPLOAD_TOKEN_REFRESH_MARGIN {
                return Ok(v.value.clone());
            }
        }

        let value = self.make_token(now)?;
        debug!("issued upload token for scope {}", self.scope);
        *issued = Some(Issued {
            value: value.clone(),
            issued_at: now,
        });
        Ok(value)
    }

    fn make_token(&self, issued_at: i64) -> Result<String> {
        let policy = PutPolicy {
            scope: &self.scope,
            deadline: issued_at + self.ttl,
        };
        let policy = serde_json::to_vec(&policy)
            .map_err(|e| Error::unexpected("failed to encode upload policy").with_source(e))?;

        let encoded = base64url_encode(&policy);
        let signature =
            base64url_hmac_sha1(self.credential.secret_key.as_bytes(), encoded.as_bytes());
        Ok(format!("{}:{signature}:{encoded}", self.credential.access_key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sevencow_core::time::from_timestamp;
    use test_case::test_case;

    const T: i64 = 1_400_000_000;

    fn at(secs: i64) -> DateTime {
        from_timestamp(secs).expect("timestamp must be valid")
    }

    #[test]
    fn test_token_format() -> Result<()> {
        let token = UploadToken::new(Credential::new("ak", "sk"), "photos", 3600);
        assert_eq!(
            token.token_at(at(T))?,
            "ak:hLLI27XkYncy5faIrDCim0Nyn_Y=:eyJzY29wZSI6InBob3RvcyIsImRlYWRsaW5lIjoxNDAwMDAzNjAwfQ=="
        );

        let token = UploadToken::new(Credential::new("ak", "sk"), "photos:a.jpg", 3600);
        assert_eq!(
            token.token_at(at(T))?,
            "ak:y9xd5FLsmXXNgj1lpo2p_nb6f4I=:eyJzY29wZSI6InBob3RvczphLmpwZyIsImRlYWRsaW5lIjoxNDAwMDAzNjAwfQ=="
        );

        Ok(())
    }

    #[test_case(0 ; "at issue time")]
    #[test_case(1 ; "one second later")]
    #[test_case(1800 ; "half way")]
    #[test_case(3539 ; "last cached second")]
    fn test_token_cached_within_window(offset: i64) {
        let token = UploadToken::new(Credential::new("ak", "sk"), "photos", 3600);
        let first = token.token_at(at(T)).unwrap();

        assert_eq!(token.token_at(at(T + offset)).unwrap(), first);
    }

    #[test_case(3540 ; "refresh margin reached")]
    #[test_case(3600 ; "expired")]
    #[test_case(7200 ; "long expired")]
    fn test_token_reissued_after_window(offset: i64) {
        let token = UploadToken::new(Credential::new("ak", "sk"), "photos", 3600);
        let first = token.token_at(at(T)).unwrap();

        let second = token.token_at(at(T + offset)).unwrap();
        assert_ne!(second, first);
        // The new token opens a new window.
        assert_eq!(token.token_at(at(T + offset + 3539)).unwrap(), second);
    }

    #[test]
    fn test_short_ttl_reissues_every_time() -> Result<()> {
        let token = UploadToken::new(Credential::new("ak", "sk"), "photos", 60);

        let first = token.token_at(at(T))?;
        assert_eq!(token.scope(), "photos");
        // Same second gives the same deadline, hence the same value.
        assert_eq!(token.token_at(at(T))?, first);
        assert_ne!(token.token_at(at(T + 1))?, first);
        Ok(())
    }
}
