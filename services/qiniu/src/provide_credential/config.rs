use async_trait::async_trait;
use sevencow_core::{Context, ProvideCredential, Result};
use std::sync::Arc;

use crate::config::Config;
use crate::credential::Credential;

/// ConfigCredentialProvider will load credential from config.
///
/// Fields left unset in the config are filled from the environment.
#[derive(Debug)]
pub struct ConfigCredentialProvider {
    config: Arc<Config>,
}

impl ConfigCredentialProvider {
    /// Create a new loader via config.
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ProvideCredential for ConfigCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let config = self.config.as_ref().clone().from_env(ctx);

        if let (Some(ak), Some(sk)) = (&config.access_key, &config.secret_key) {
            return Ok(Some(Credential::new(ak.clone(), sk.clone())));
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;
    use sevencow_core::StaticEnv;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_config_credential_provider() {
        let config = Arc::new(Config::default().with_credential("access_key", "secret_key"));
        let loader = ConfigCredentialProvider::new(config);

        let cred = loader
            .provide_credential(&Context::new())
            .await
            .expect("load must succeed")
            .expect("must load succeed");
        assert_eq!("access_key", cred.access_key);
        assert_eq!("secret_key", cred.secret_key);
    }

    #[tokio::test]
    async fn test_config_credential_provider_with_env() {
        let ctx = Context::new().with_env(StaticEnv {
            envs: HashMap::from([(QINIU_SECRET_KEY.to_string(), "env_secret_key".to_string())]),
        });
        let config = Arc::new(Config {
            access_key: Some("access_key".to_string()),
            ..Default::default()
        });
        let loader = ConfigCredentialProvider::new(config);

        let cred = loader
            .provide_credential(&ctx)
            .await
            .expect("load must succeed")
            .expect("must load succeed");
        assert_eq!("access_key", cred.access_key);
        assert_eq!("env_secret_key", cred.secret_key);
    }
}
