use async_trait::async_trait;
use log::{debug, warn};
use sevencow_core::{Context, ProvideCredential, Result};
use std::sync::Arc;

use crate::config::Config;
use crate::credential::Credential;
use crate::provide_credential::{ConfigCredentialProvider, EnvCredentialProvider};

/// DefaultCredentialProvider will try to load credential from different sources.
///
/// Resolution order:
///
/// 1. Config (fields left unset are filled from env)
/// 2. Environment variables
#[derive(Debug)]
pub struct DefaultCredentialProvider {
    providers: Vec<Box<dyn ProvideCredential<Credential = Credential>>>,
}

impl Default for DefaultCredentialProvider {
    fn default() -> Self {
        Self::new(Arc::new(Config::default()))
    }
}

impl DefaultCredentialProvider {
    /// Create a new DefaultCredentialProvider
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            providers: vec![
                Box::new(ConfigCredentialProvider::new(config)),
                Box::new(EnvCredentialProvider::new()),
            ],
        }
    }

    /// Add a credential provider to the front of the default chain.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use sevencow_qiniu::{DefaultCredentialProvider, StaticCredentialProvider};
    ///
    /// let provider = DefaultCredentialProvider::default()
    ///     .push_front(StaticCredentialProvider::new("access_key", "secret_key"));
    /// ```
    pub fn push_front(mut self, provider: impl ProvideCredential<Credential = Credential>) -> Self {
        self.providers.insert(0, Box::new(provider));
        self
    }
}

#[async_trait]
impl ProvideCredential for DefaultCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        for provider in &self.providers {
            match provider.provide_credential(ctx).await {
                Ok(Some(cred)) => {
                    debug!("loaded credential from provider: {provider:?}");
                    return Ok(Some(cred));
                }
                Ok(None) => continue,
                Err(e) => {
                    warn!("error loading credential from provider {provider:?}: {e}");
                    continue;
                }
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;
    use crate::StaticCredentialProvider;
    use sevencow_core::StaticEnv;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_default_loader_without_env() {
        let ctx = Context::new().with_env(StaticEnv::default());

        let loader = DefaultCredentialProvider::default();
        let credential = loader.provide_credential(&ctx).await.unwrap();

        assert!(credential.is_none());
    }

    #[tokio::test]
    async fn test_default_loader_with_env() {
        let ctx = Context::new().with_env(StaticEnv {
            envs: HashMap::from_iter([
                (QINIU_ACCESS_KEY.to_string(), "access_key".to_string()),
                (QINIU_SECRET_KEY.to_string(), "secret_key".to_string()),
            ]),
        });

        let loader = DefaultCredentialProvider::default();
        let credential = loader.provide_credential(&ctx).await.unwrap().unwrap();

        assert_eq!("access_key", credential.access_key);
        assert_eq!("secret_key", credential.secret_key);
    }

    #[tokio::test]
    async fn test_default_loader_push_front() {
        let ctx = Context::new().with_env(StaticEnv {
            envs: HashMap::from_iter([
                (QINIU_ACCESS_KEY.to_string(), "access_key".to_string()),
                (QINIU_SECRET_KEY.to_string(), "secret_key".to_string()),
            ]),
        });

        let loader = DefaultCredentialProvider::default()
            .push_front(StaticCredentialProvider::new("static_ak", "static_sk"));
        let credential = loader.provide_credential(&ctx).await.unwrap().unwrap();

        assert_eq!("static_ak", credential.access_key);
        assert_eq!("static_sk", credential.secret_key);
    }
}
