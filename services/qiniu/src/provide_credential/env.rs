use crate::{constants::*, Credential};
use async_trait::async_trait;
use sevencow_core::{Context, ProvideCredential, Result};

/// EnvCredentialProvider loads qiniu credentials from environment variables.
///
/// This provider looks for the following environment variables:
/// - `QINIU_ACCESS_KEY`: The qiniu access key
/// - `QINIU_SECRET_KEY`: The qiniu secret key
#[derive(Debug, Default)]
pub struct EnvCredentialProvider;

impl EnvCredentialProvider {
    /// Create a new EnvCredentialProvider.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProvideCredential for EnvCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let envs = ctx.env_vars();

        match (envs.get(QINIU_ACCESS_KEY), envs.get(QINIU_SECRET_KEY)) {
            (Some(ak), Some(sk)) => Ok(Some(Credential::new(ak.clone(), sk.clone()))),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sevencow_core::StaticEnv;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_env_credential_provider() -> anyhow::Result<()> {
        let envs = HashMap::from([
            (QINIU_ACCESS_KEY.to_string(), "test_access_key".to_string()),
            (QINIU_SECRET_KEY.to_string(), "test_secret_key".to_string()),
        ]);
        let ctx = Context::new().with_env(StaticEnv { envs });

        let cred = EnvCredentialProvider::new()
            .provide_credential(&ctx)
            .await?
            .expect("credential must be loaded");
        assert_eq!(cred.access_key, "test_access_key");
        assert_eq!(cred.secret_key, "test_secret_key");

        Ok(())
    }

    #[tokio::test]
    async fn test_env_credential_provider_partial_credentials() -> anyhow::Result<()> {
        let envs = HashMap::from([(QINIU_ACCESS_KEY.to_string(), "test_access_key".to_string())]);
        let ctx = Context::new().with_env(StaticEnv { envs });

        let cred = EnvCredentialProvider::new().provide_credential(&ctx).await?;
        assert!(cred.is_none());

        Ok(())
    }
}
