use std::collections::HashMap;
use std::fmt::Write;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{Method, Request, Response, StatusCode};
use log::debug;
use serde_json::Value;
use sevencow_core::hash::base64url_encode;
use sevencow_core::{Context, Error, ProvideCredential, Result, Signer};

use crate::access_token::RequestSigner;
use crate::bucket::Bucket;
use crate::config::Config;
use crate::constants::FORM_CONTENT_TYPE;
use crate::credential::Credential;
use crate::multipart::Multipart;
use crate::provide_credential::DefaultCredentialProvider;
use crate::types::{Entry, ListOptions, OneOrMany, PutOptions, Transfer, Upload};
use crate::upload_token::UploadToken;

/// Client talks to the Qiniu storage service.
///
/// Management requests are signed with an access token. Uploads carry an
/// upload token, cached per scope for the lifetime of the client.
///
/// `Client` is cheap to clone, clones share credential and token caches.
#[derive(Clone, Debug)]
pub struct Client {
    signer: Signer<Credential>,
    config: Arc<Config>,
    upload_tokens: Arc<Mutex<HashMap<String, Arc<UploadToken>>>>,
}

impl Client {
    /// Create a client that loads its credential from `config` first and
    /// from env after.
    ///
    /// ```
    /// use sevencow_core::{Context, OsEnv};
    /// use sevencow_qiniu::{Client, Config};
    ///
    /// let ctx = Context::new().with_env(OsEnv);
    /// let client = Client::new(ctx, Config::default().with_credential("ak", "sk"));
    /// ```
    pub fn new(ctx: Context, config: Config) -> Self {
        let config = Arc::new(config);
        let loader = DefaultCredentialProvider::new(config.clone());

        Self::build(ctx, config, loader)
    }

    /// Create a client with a custom credential provider.
    pub fn with_credential_provider(
        ctx: Context,
        config: Config,
        provider: impl ProvideCredential<Credential = Credential>,
    ) -> Self {
        Self::build(ctx, Arc::new(config), provider)
    }

    fn build(
        ctx: Context,
        config: Arc<Config>,
        provider: impl ProvideCredential<Credential = Credential>,
    ) -> Self {
        Self {
            signer: Signer::new(ctx, provider, RequestSigner::new()),
            config,
            upload_tokens: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Get the config of this client.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get a handle bound to bucket `name`.
    pub fn bucket(&self, name: &str) -> Bucket {
        Bucket::new(self.clone(), name)
    }

    /// Get the upload token for `scope`.
    ///
    /// Tokens are kept per scope and reissued shortly before they expire.
    pub async fn upload_token(&self, scope: &str) -> Result<String> {
        let cred = self.signer.credential().await?;

        let token = self
            .upload_tokens
            .lock()
            .expect("lock poisoned")
            .entry(scope.to_string())
            .or_insert_with(|| {
                Arc::new(UploadToken::new(
                    cred,
                    scope,
                    self.config.upload_token_ttl,
                ))
            })
            .clone();

        token.token()
    }

    /// List all buckets of the account.
    pub async fn list_buckets(&self) -> Result<Value> {
        let url = format!("{}/buckets", self.config.rs_host);
        self.api_call(&url, None).await
    }

    /// Buckets are not created through the API.
    ///
    /// Buckets created this way can't be bound to their default domain, so
    /// this always fails with [`ErrorKind::PolicyDenied`] and sends nothing.
    ///
    /// [`ErrorKind::PolicyDenied`]: sevencow_core::ErrorKind::PolicyDenied
    pub async fn create_bucket(&self, name: &str) -> Result<Value> {
        Err(Error::policy_denied(format!(
            "bucket {name} must be created from the web console"
        )))
    }

    /// Drop the bucket and everything in it.
    pub async fn drop_bucket(&self, name: &str) -> Result<Value> {
        let url = format!("{}/drop/{name}", self.config.rs_host);
        self.api_call(&url, None).await
    }

    /// List files in `bucket`.
    pub async fn list_files(&self, bucket: &str, opts: ListOptions) -> Result<Value> {
        let url = format!("{}/list?{}", self.config.rsf_host, opts.query(bucket));
        self.api_call(&url, None).await
    }

    /// Upload one or many files into `bucket`.
    ///
    /// Every file is sent in its own upload request, one after another.
    /// Results are returned in input order.
    pub async fn put(
        &self,
        bucket: &str,
        uploads: impl Into<OneOrMany<Upload>>,
        opts: PutOptions,
    ) -> Result<OneOrMany<Value>> {
        match uploads.into().check("put")? {
            OneOrMany::One(upload) => Ok(OneOrMany::One(self.put_one(bucket, upload, opts).await?)),
            OneOrMany::Many(uploads) => {
                let mut results = Vec::with_capacity(uploads.len());
                for upload in uploads {
                    results.push(self.put_one(bucket, upload, opts).await?);
                }
                Ok(OneOrMany::Many(results))
            }
        }
    }

    async fn put_one(&self, bucket: &str, upload: Upload, opts: PutOptions) -> Result<Value> {
        let data = match upload.data.clone() {
            Some(data) => data,
            None => Bytes::from(self.signer.context().file_read(&upload.filename).await?),
        };

        let entry = Entry::new(bucket, upload.key(&data, opts.keep_name));
        let scope = if opts.overwrite {
            entry.to_string()
        } else {
            bucket.to_string()
        };
        let token = self.upload_token(&scope).await?;

        let mime = mime_guess::from_path(&upload.filename).first();
        let mut action = format!("/rs-put/{}", entry.encode());
        if let Some(mime) = &mime {
            write!(
                action,
                "/mimeType/{}",
                base64url_encode(mime.essence_str().as_bytes())
            )?;
        }

        let form = Multipart::new()
            .text("auth", &token)
            .text("action", &action)
            .file(
                "file",
                &upload.base_name(),
                mime.as_ref()
                    .map(|v| v.essence_str())
                    .unwrap_or("application/octet-stream"),
                data,
            );

        let url = format!("{}/upload", self.config.up_host);
        let req = Request::builder()
            .method(Method::POST)
            .uri(&url)
            .header(CONTENT_TYPE, form.content_type())
            .body(form.build())?;

        debug!("uploading {} as {entry}", upload.filename);
        let resp = self.signer.context().http_send(req).await?;
        check_response(&url, resp)
    }

    /// Get the metadata of one or many files.
    pub async fn stat(
        &self,
        bucket: &str,
        keys: impl Into<OneOrMany<String>>,
    ) -> Result<OneOrMany<Value>> {
        let ops = keys.into().map(|key| Entry::new(bucket, key).encode());
        self.dispatch("stat", ops).await
    }

    /// Delete one or many files.
    pub async fn delete(
        &self,
        bucket: &str,
        keys: impl Into<OneOrMany<String>>,
    ) -> Result<OneOrMany<Value>> {
        let ops = keys.into().map(|key| Entry::new(bucket, key).encode());
        self.dispatch("delete", ops).await
    }

    /// Copy one or many files.
    pub async fn copy(&self, transfers: impl Into<OneOrMany<Transfer>>) -> Result<OneOrMany<Value>> {
        let ops = transfers.into().map(|t| t.encode());
        self.dispatch("copy", ops).await
    }

    /// Move one or many files.
    pub async fn mv(&self, transfers: impl Into<OneOrMany<Transfer>>) -> Result<OneOrMany<Value>> {
        let ops = transfers.into().map(|t| t.encode());
        self.dispatch("move", ops).await
    }

    /// Send `action` on encoded args as a single call or one batch call.
    async fn dispatch(&self, action: &str, ops: OneOrMany<String>) -> Result<OneOrMany<Value>> {
        match ops.check(action)? {
            OneOrMany::One(op) => {
                let url = format!("{}/{action}/{op}", self.config.rs_host);
                Ok(OneOrMany::One(self.api_call(&url, None).await?))
            }
            OneOrMany::Many(ops) => {
                let url = format!("{}/batch", self.config.rs_host);
                let body = ops
                    .iter()
                    .map(|op| format!("op=/{action}/{op}"))
                    .collect::<Vec<_>>()
                    .join("&");

                // Per item results come as an array. Anything else is the
                // whole answer and is handed back untouched.
                Ok(match self.api_call(&url, Some(body)).await? {
                    Value::Array(results) => OneOrMany::Many(results),
                    Value::Null => OneOrMany::Many(Vec::new()),
                    v => OneOrMany::One(v),
                })
            }
        }
    }

    /// POST a signed management request.
    async fn api_call(&self, url: &str, body: Option<String>) -> Result<Value> {
        let body = Bytes::from(body.unwrap_or_default());
        let req = Request::builder()
            .method(Method::POST)
            .uri(url)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(body)?;

        let (mut parts, body) = req.into_parts();
        self.signer.sign(&mut parts, &body).await?;
        let req = Request::from_parts(parts, body);

        debug!("sending request: {} {}", req.method(), req.uri());
        let resp = self.signer.context().http_send(req).await?;
        check_response(url, resp)
    }
}

/// Turn a response into its JSON payload.
///
/// Anything but `200 OK` is an error. An empty body is `null`.
fn check_response(url: &str, resp: Response<Bytes>) -> Result<Value> {
    let status = resp.status();
    debug!("got response: {url} {status}");

    let body = resp.into_body();
    if status != StatusCode::OK {
        return Err(Error::http_status(url, status, &body));
    }
    if body.is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_slice(&body).map_err(|e| {
        Error::unexpected("failed to parse response as json")
            .with_source(e)
            .with_url(url)
    })
}
