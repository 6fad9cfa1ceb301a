use super::constants::*;
use sevencow_core::Context;

/// Config carries all the configuration for the qiniu client.
#[derive(Clone, Debug)]
pub struct Config {
    /// `access_key` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`QINIU_ACCESS_KEY`]
    pub access_key: Option<String>,
    /// `secret_key` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`QINIU_SECRET_KEY`]
    pub secret_key: Option<String>,
    /// Endpoint of the resource service, used for bucket and file management.
    ///
    /// - default to `http://rs.qbox.me`
    pub rs_host: String,
    /// Endpoint of the upload service.
    ///
    /// - default to `http://up.qiniu.com`
    pub up_host: String,
    /// Endpoint of the list service.
    ///
    /// - default to `http://rsf.qbox.me`
    pub rsf_host: String,
    /// Lifetime of upload tokens in seconds.
    ///
    /// - default to `3600`
    pub upload_token_ttl: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            access_key: None,
            secret_key: None,
            rs_host: RS_HOST.to_string(),
            up_host: UP_HOST.to_string(),
            rsf_host: RSF_HOST.to_string(),
            upload_token_ttl: DEFAULT_UPLOAD_TOKEN_TTL,
        }
    }
}

impl Config {
    /// Set the access key and secret key.
    pub fn with_credential(mut self, access_key: &str, secret_key: &str) -> Self {
        self.access_key = Some(access_key.to_string());
        self.secret_key = Some(secret_key.to_string());
        self
    }

    /// Load config from env.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        if let Some(v) = ctx.env_var(QINIU_ACCESS_KEY) {
            self.access_key.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(QINIU_SECRET_KEY) {
            self.secret_key.get_or_insert(v);
        }

        self
    }
}
