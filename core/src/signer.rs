use crate::{Context, Error, ProvideCredential, Result, SignRequest, SigningCredential};
use std::sync::{Arc, Mutex};

/// Signer is the main struct used to sign the request.
///
/// The credential is loaded on first use and kept for as long as it stays
/// valid.
#[derive(Clone, Debug)]
pub struct Signer<K: SigningCredential> {
    ctx: Context,
    loader: Arc<dyn ProvideCredential<Credential = K>>,
    builder: Arc<dyn SignRequest<Credential = K>>,
    credential: Arc<Mutex<Option<K>>>,
}

impl<K: SigningCredential> Signer<K> {
    /// Create a new signer.
    pub fn new(
        ctx: Context,
        loader: impl ProvideCredential<Credential = K>,
        builder: impl SignRequest<Credential = K>,
    ) -> Self {
        Self {
            ctx,

            loader: Arc::new(loader),
            builder: Arc::new(builder),
            credential: Arc::new(Mutex::new(None)),
        }
    }

    /// Get the context this signer works with.
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Get the current credential, loading it if needed.
    pub async fn credential(&self) -> Result<K> {
        let cred = self.credential.lock().expect("lock poisoned").clone();
        if let Some(cred) = cred.filter(|c| c.is_valid()) {
            return Ok(cred);
        }

        let cred = self
            .loader
            .provide_credential(&self.ctx)
            .await?
            .filter(|c| c.is_valid())
            .ok_or_else(|| Error::credential_invalid("no valid credential found"))?;
        *self.credential.lock().expect("lock poisoned") = Some(cred.clone());
        Ok(cred)
    }

    /// Signing request.
    pub async fn sign(&self, req: &mut http::request::Parts, body: &[u8]) -> Result<()> {
        let cred = self.credential().await?;

        self.builder
            .sign_request(&self.ctx, req, body, Some(&cred))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Debug)]
    struct TestCredential(String);

    impl SigningCredential for TestCredential {
        fn is_valid(&self) -> bool {
            !self.0.is_empty()
        }
    }

    #[derive(Debug, Default)]
    struct CountingLoader {
        value: String,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ProvideCredential for CountingLoader {
        type Credential = TestCredential;

        async fn provide_credential(&self, _: &Context) -> Result<Option<Self::Credential>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Some(TestCredential(self.value.clone())))
        }
    }

    #[derive(Debug)]
    struct HeaderBuilder;

    #[async_trait]
    impl SignRequest for HeaderBuilder {
        type Credential = TestCredential;

        async fn sign_request(
            &self,
            _: &Context,
            req: &mut http::request::Parts,
            body: &[u8],
            credential: Option<&Self::Credential>,
        ) -> Result<()> {
            let cred = credential.ok_or_else(|| Error::credential_invalid("missing"))?;
            let value = format!("{}:{}", cred.0, body.len());
            req.headers.insert("x-test-sign", value.parse()?);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_sign_loads_credential_once() -> Result<()> {
        let calls = Arc::new(AtomicUsize::new(0));
        let loader = CountingLoader {
            value: "ak".to_string(),
            calls: calls.clone(),
        };
        let signer = Signer::new(Context::new(), loader, HeaderBuilder);

        for _ in 0..3 {
            let mut parts = http::Request::post("http://rs.qbox.me/buckets")
                .body(())?
                .into_parts()
                .0;
            signer.sign(&mut parts, b"op=1").await?;
            assert_eq!(parts.headers["x-test-sign"], "ak:4");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_sign_without_valid_credential() -> Result<()> {
        let signer = Signer::new(Context::new(), CountingLoader::default(), HeaderBuilder);

        let mut parts = http::Request::post("http://rs.qbox.me/buckets")
            .body(())?
            .into_parts()
            .0;
        let err = signer.sign(&mut parts, &[]).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CredentialInvalid);

        Ok(())
    }
}
