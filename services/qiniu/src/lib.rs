//! Qiniu object storage client for sevencow.
//!
//! This crate signs requests for the Qiniu storage service and runs the
//! bucket and file operations on top of them.
//!
//! ## Overview
//!
//! Qiniu uses two kinds of HMAC-SHA1 signatures:
//!
//! - **Access token**: signs the path, query and body of each management
//!   request and is sent as `Authorization: QBox <token>`.
//! - **Upload token**: signs a JSON policy with the upload scope and a
//!   deadline. It is sent inside the multipart upload form and cached until
//!   shortly before it expires.
//!
//! ## Quick Start
//!
//! ```no_run
//! use sevencow_core::{Context, OsEnv, Result};
//! use sevencow_file_read_tokio::TokioFileRead;
//! use sevencow_http_send_reqwest::ReqwestHttpSend;
//! use sevencow_qiniu::{Client, Config, ListOptions, PutOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let ctx = Context::new()
//!         .with_file_read(TokioFileRead)
//!         .with_http_send(ReqwestHttpSend::default())
//!         .with_env(OsEnv);
//!
//!     let config = Config::default().from_env(&ctx);
//!     let client = Client::new(ctx, config);
//!
//!     let bucket = client.bucket("photos");
//!     bucket
//!         .put(vec!["/tmp/a.jpg", "/tmp/b.png"], PutOptions::default())
//!         .await?;
//!     let files = bucket.list_files(ListOptions::default().with_limit(10)).await?;
//!     println!("{files}");
//!
//!     bucket.stat(vec!["a.jpg", "b.png"]).await?;
//!     bucket.delete("a.jpg").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Single and batch operations
//!
//! `stat`, `delete`, `copy` and `mv` take a [`OneOrMany`]. A single item is
//! sent as one request and answered with [`OneOrMany::One`]. A batch is sent
//! as one `/batch` request and answered with [`OneOrMany::Many`] in input
//! order. Empty batches are rejected before anything is sent.
//!
//! ## Credential Sources
//!
//! ```bash
//! export QINIU_ACCESS_KEY=your-access-key
//! export QINIU_SECRET_KEY=your-secret-key
//! ```

mod constants;

mod config;
pub use config::Config;

mod credential;
pub use credential::Credential;

mod access_token;
pub use access_token::{access_token, Params, RequestSigner};

mod upload_token;
pub use upload_token::UploadToken;

mod types;
pub use types::{Entry, ListOptions, OneOrMany, PutOptions, Transfer, Upload};

mod multipart;

mod client;
pub use client::Client;

mod bucket;
pub use bucket::Bucket;

mod provide_credential;
pub use provide_credential::*;
