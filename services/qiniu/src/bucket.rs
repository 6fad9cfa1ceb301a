use serde_json::Value;
use sevencow_core::Result;

use crate::client::Client;
use crate::types::{ListOptions, OneOrMany, PutOptions, Transfer, Upload};

/// Bucket is a [`Client`] bound to one bucket.
///
/// ```no_run
/// use sevencow_core::{Context, OsEnv};
/// use sevencow_qiniu::{Client, Config, PutOptions};
///
/// # async fn run() -> sevencow_core::Result<()> {
/// let client = Client::new(Context::new().with_env(OsEnv), Config::default());
/// let bucket = client.bucket("photos");
///
/// bucket.put("/tmp/a.jpg", PutOptions::default()).await?;
/// bucket.mv(("a.jpg", "b.jpg")).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Bucket {
    client: Client,
    name: String,
}

impl Bucket {
    pub(crate) fn new(client: Client, name: &str) -> Self {
        Self {
            client,
            name: name.to_string(),
        }
    }

    /// Name of the bucket.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// List files in this bucket.
    pub async fn list_files(&self, opts: ListOptions) -> Result<Value> {
        self.client.list_files(&self.name, opts).await
    }

    /// Upload one or many files into this bucket.
    pub async fn put(
        &self,
        uploads: impl Into<OneOrMany<Upload>>,
        opts: PutOptions,
    ) -> Result<OneOrMany<Value>> {
        self.client.put(&self.name, uploads, opts).await
    }

    /// Get the metadata of one or many files.
    pub async fn stat(&self, keys: impl Into<OneOrMany<String>>) -> Result<OneOrMany<Value>> {
        self.client.stat(&self.name, keys).await
    }

    /// Delete one or many files.
    pub async fn delete(&self, keys: impl Into<OneOrMany<String>>) -> Result<OneOrMany<Value>> {
        self.client.delete(&self.name, keys).await
    }

    /// Copy files inside this bucket, from the first key of each pair to
    /// the second.
    pub async fn copy(
        &self,
        pairs: impl Into<OneOrMany<(String, String)>>,
    ) -> Result<OneOrMany<Value>> {
        self.client.copy(self.transfers(pairs.into())).await
    }

    /// Move files inside this bucket, from the first key of each pair to
    /// the second.
    pub async fn mv(
        &self,
        pairs: impl Into<OneOrMany<(String, String)>>,
    ) -> Result<OneOrMany<Value>> {
        self.client.mv(self.transfers(pairs.into())).await
    }

    /// Drop this bucket.
    pub async fn drop(&self) -> Result<Value> {
        self.client.drop_bucket(&self.name).await
    }

    fn transfers(&self, pairs: OneOrMany<(String, String)>) -> OneOrMany<Transfer> {
        pairs.map(|(src, dest)| Transfer::new(&self.name, &src, &self.name, &dest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Config, Entry, StaticCredentialProvider};
    use sevencow_core::Context;

    #[test]
    fn test_transfers_stay_in_bucket() {
        let client = Client::with_credential_provider(
            Context::new(),
            Config::default(),
            StaticCredentialProvider::new("ak", "sk"),
        );
        let bucket = client.bucket("photos");
        assert_eq!(bucket.name(), "photos");

        let transfers = bucket.transfers(vec![("a.jpg", "b.jpg"), ("c.jpg", "d.jpg")].into());
        assert_eq!(
            transfers,
            OneOrMany::Many(vec![
                Transfer {
                    src: Entry::new("photos", "a.jpg"),
                    dest: Entry::new("photos", "b.jpg"),
                },
                Transfer {
                    src: Entry::new("photos", "c.jpg"),
                    dest: Entry::new("photos", "d.jpg"),
                },
            ])
        );
    }
}
