//! Qiniu access token and the request signer built on it.
use std::fmt::Write;

use async_trait::async_trait;
use http::header::AUTHORIZATION;
use http::HeaderValue;
use http::Uri;
use log::debug;
use sevencow_core::hash::base64url_hmac_sha1;
use sevencow_core::{Context, Error, Result, SignRequest};

use crate::credential::Credential;

/// Params that will be covered by an access token.
///
/// The service recomputes the signature over the exact body it receives, so
/// `Form` pairs are encoded in the order given.
#[derive(Debug, Clone, Copy)]
pub enum Params<'a> {
    /// A body that is already encoded, used verbatim.
    Raw(&'a str),
    /// Pairs to be form urlencoded in order.
    Form(&'a [(&'a str, &'a str)]),
}

impl Params<'_> {
    /// Encode params into the body string.
    pub fn encode(&self) -> String {
        match self {
            Params::Raw(s) => s.to_string(),
            Params::Form(pairs) => form_urlencoded::Serializer::new(String::new())
                .extend_pairs(pairs.iter())
                .finish(),
        }
    }
}

/// Build the access token for `url` with optional params.
///
/// ```
/// use sevencow_qiniu::{access_token, Credential, Params};
///
/// let cred = Credential::new("ak", "sk");
/// let token = access_token(&cred, "http://rs.qbox.me/batch", Some(Params::Raw("op=/stat/YTpi")))?;
/// assert!(token.starts_with("ak:"));
/// # Ok::<(), sevencow_core::Error>(())
/// ```
pub fn access_token(cred: &Credential, url: &str, params: Option<Params<'_>>) -> Result<String> {
    let uri: Uri = url.parse()?;
    let body = params.map(|p| p.encode()).unwrap_or_default();

    sign_uri(cred, &uri, body.as_bytes())
}

/// Sign `path[?query]\n[body]` with the secret key.
fn sign_uri(cred: &Credential, uri: &Uri, body: &[u8]) -> Result<String> {
    let mut s = String::new();
    s.write_str(uri.path())?;
    if let Some(query) = uri.query().filter(|q| !q.is_empty()) {
        write!(&mut s, "?{query}")?;
    }
    s.write_str("\n")?;
    debug!("access token signing path: {}", s.trim_end());

    let mut data = s.into_bytes();
    data.extend_from_slice(body);

    let signature = base64url_hmac_sha1(cred.secret_key.as_bytes(), &data);
    Ok(format!("{}:{signature}", cred.access_key))
}

/// RequestSigner adds the `QBox` authorization to management requests.
///
/// Upload requests carry an upload token in their form instead and are not
/// signed by it.
#[derive(Debug, Default)]
pub struct RequestSigner;

impl RequestSigner {
    /// Create a new signer.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SignRequest for RequestSigner {
    type Credential = Credential;

    async fn sign_request(
        &self,
        _ctx: &Context,
        parts: &mut http::request::Parts,
        body: &[u8],
        credential: Option<&Self::Credential>,
    ) -> Result<()> {
        let cred = credential.ok_or_else(|| Error::credential_invalid("missing credential"))?;
        let token = sign_uri(cred, &parts.uri, body)?;

        parts.headers.insert(AUTHORIZATION, {
            let mut value: HeaderValue = format!("QBox {token}").parse()?;
            value.set_sensitive(true);

            value
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sevencow_core::Signer;

    use crate::StaticCredentialProvider;

    fn cred() -> Credential {
        Credential::new("ak", "sk")
    }

    #[test]
    fn test_access_token() -> Result<()> {
        assert_eq!(
            access_token(&cred(), "http://rs.qbox.me/buckets", None)?,
            "ak:0Il45vhQFb2WthjjU7XTIaqf3t0="
        );
        assert_eq!(
            access_token(&cred(), "http://rsf.qbox.me/list?bucket=photos&limit=10", None)?,
            "ak:9AIbG1FVQCUxqpCWPNJQcwoOOq0="
        );
        assert_eq!(
            access_token(
                &cred(),
                "http://rs.qbox.me/batch",
                Some(Params::Raw(
                    "op=/stat/cGhvdG9zOmEuanBn&op=/stat/cGhvdG9zOmIuanBn"
                )),
            )?,
            "ak:VgwRZRqLLVxKyY3SH85hRSIsVfk="
        );

        Ok(())
    }

    #[test]
    fn test_access_token_form_params_keep_order() -> Result<()> {
        let params = Params::Form(&[("b", "2"), ("a", "1 2")]);
        assert_eq!(params.encode(), "b=2&a=1+2");
        assert_eq!(
            access_token(&cred(), "http://rs.qbox.me/batch", Some(params))?,
            "ak:6FyXluRKb5a-gSx2qzBSMqRy-Ik="
        );

        let reversed = Params::Form(&[("a", "1 2"), ("b", "2")]);
        assert_ne!(
            access_token(&cred(), "http://rs.qbox.me/batch", Some(reversed))?,
            "ak:6FyXluRKb5a-gSx2qzBSMqRy-Ik="
        );

        Ok(())
    }

    #[test]
    fn test_access_token_is_pure() -> Result<()> {
        let url = "http://rsf.qbox.me/list?bucket=photos&limit=10";
        let base = access_token(&cred(), url, Some(Params::Raw("op=1")))?;

        assert_eq!(base, access_token(&cred(), url, Some(Params::Raw("op=1")))?);
        assert_ne!(base, access_token(&cred(), url, Some(Params::Raw("op=2")))?);
        assert_ne!(
            base,
            access_token(
                &cred(),
                "http://rsf.qbox.me/list?bucket=photos&limit=11",
                Some(Params::Raw("op=1"))
            )?
        );
        assert_ne!(
            base,
            access_token(
                &cred(),
                "http://rsf.qbox.me/lisT?bucket=photos&limit=10",
                Some(Params::Raw("op=1"))
            )?
        );

        Ok(())
    }

    #[test]
    fn test_access_token_invalid_url() {
        let err = access_token(&cred(), "http://rs.qbox.me/a b", None).unwrap_err();
        assert_eq!(err.kind(), sevencow_core::ErrorKind::RequestInvalid);
    }

    #[tokio::test]
    async fn test_request_signer() -> Result<()> {
        let signer = Signer::new(
            Context::new(),
            StaticCredentialProvider::new("ak", "sk"),
            RequestSigner::new(),
        );

        let req = http::Request::post("http://rs.qbox.me/stat/cGhvdG9zOmEuanBn").body(())?;
        let (mut parts, _) = req.into_parts();
        signer.sign(&mut parts, &[]).await?;

        let auth = parts.headers.get(AUTHORIZATION).expect("must be signed");
        assert!(auth.is_sensitive());
        assert_eq!(auth.to_str()?, "QBox ak:2VMkKGBD4gvDYRViEABuu0EWZ1c=");

        Ok(())
    }
}
