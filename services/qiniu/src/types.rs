use std::fmt::{Display, Formatter};
use std::path::Path;

use bytes::Bytes;
use sevencow_core::hash::{base64url_encode, hex_md5};
use sevencow_core::{Error, Result};

/// Either a single item or an ordered batch of items.
///
/// Operations that accept it send exactly one request either way: `One`
/// maps to a single operation, `Many` to one batch request whose results are
/// returned in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OneOrMany<T> {
    /// A single item.
    One(T),
    /// An ordered batch of items.
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    /// Number of items.
    pub fn len(&self) -> usize {
        match self {
            OneOrMany::One(_) => 1,
            OneOrMany::Many(v) => v.len(),
        }
    }

    /// Returns `true` for an empty batch.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the single item, if this is `One`.
    pub fn one(self) -> Option<T> {
        match self {
            OneOrMany::One(v) => Some(v),
            OneOrMany::Many(_) => None,
        }
    }

    /// Get the batch, if this is `Many`.
    pub fn many(self) -> Option<Vec<T>> {
        match self {
            OneOrMany::One(_) => None,
            OneOrMany::Many(v) => Some(v),
        }
    }

    /// Flatten into a vec, keeping the order.
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(v) => vec![v],
            OneOrMany::Many(v) => v,
        }
    }

    /// Map every item, keeping the shape.
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> OneOrMany<U> {
        match self {
            OneOrMany::One(v) => OneOrMany::One(f(v)),
            OneOrMany::Many(v) => OneOrMany::Many(v.into_iter().map(f).collect()),
        }
    }

    /// Reject empty batches before anything is sent.
    pub(crate) fn check(self, op: &str) -> Result<Self> {
        if self.is_empty() {
            return Err(Error::request_invalid(format!(
                "{op}: batch must contain at least one item"
            )));
        }
        Ok(self)
    }
}

impl From<&str> for OneOrMany<String> {
    fn from(v: &str) -> Self {
        OneOrMany::One(v.to_string())
    }
}

impl From<String> for OneOrMany<String> {
    fn from(v: String) -> Self {
        OneOrMany::One(v)
    }
}

impl From<Vec<String>> for OneOrMany<String> {
    fn from(v: Vec<String>) -> Self {
        OneOrMany::Many(v)
    }
}

impl From<Vec<&str>> for OneOrMany<String> {
    fn from(v: Vec<&str>) -> Self {
        OneOrMany::Many(v.into_iter().map(String::from).collect())
    }
}

impl From<&[&str]> for OneOrMany<String> {
    fn from(v: &[&str]) -> Self {
        OneOrMany::Many(v.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for OneOrMany<String> {
    fn from(v: [&str; N]) -> Self {
        OneOrMany::Many(v.iter().map(|s| s.to_string()).collect())
    }
}

impl From<(&str, &str)> for OneOrMany<(String, String)> {
    fn from((src, dest): (&str, &str)) -> Self {
        OneOrMany::One((src.to_string(), dest.to_string()))
    }
}

impl From<Vec<(&str, &str)>> for OneOrMany<(String, String)> {
    fn from(v: Vec<(&str, &str)>) -> Self {
        OneOrMany::Many(
            v.into_iter()
                .map(|(src, dest)| (src.to_string(), dest.to_string()))
                .collect(),
        )
    }
}

impl From<Vec<(String, String)>> for OneOrMany<(String, String)> {
    fn from(v: Vec<(String, String)>) -> Self {
        OneOrMany::Many(v)
    }
}

impl From<Transfer> for OneOrMany<Transfer> {
    fn from(v: Transfer) -> Self {
        OneOrMany::One(v)
    }
}

impl From<Vec<Transfer>> for OneOrMany<Transfer> {
    fn from(v: Vec<Transfer>) -> Self {
        OneOrMany::Many(v)
    }
}

impl From<(&str, &str, &str, &str)> for OneOrMany<Transfer> {
    fn from(v: (&str, &str, &str, &str)) -> Self {
        OneOrMany::One(v.into())
    }
}

impl From<Vec<(&str, &str, &str, &str)>> for OneOrMany<Transfer> {
    fn from(v: Vec<(&str, &str, &str, &str)>) -> Self {
        OneOrMany::Many(v.into_iter().map(Transfer::from).collect())
    }
}

impl From<Upload> for OneOrMany<Upload> {
    fn from(v: Upload) -> Self {
        OneOrMany::One(v)
    }
}

impl From<Vec<Upload>> for OneOrMany<Upload> {
    fn from(v: Vec<Upload>) -> Self {
        OneOrMany::Many(v)
    }
}

impl From<&str> for OneOrMany<Upload> {
    fn from(v: &str) -> Self {
        OneOrMany::One(Upload::file(v))
    }
}

impl From<Vec<&str>> for OneOrMany<Upload> {
    fn from(v: Vec<&str>) -> Self {
        OneOrMany::Many(v.into_iter().map(Upload::file).collect())
    }
}

/// A file stored in a bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Bucket name.
    pub bucket: String,
    /// Key inside the bucket.
    pub key: String,
}

impl Entry {
    /// Create a new entry.
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Encode as the opaque url segment `base64url("bucket:key")`.
    pub fn encode(&self) -> String {
        base64url_encode(self.to_string().as_bytes())
    }
}

impl Display for Entry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.bucket, self.key)
    }
}

/// Source and destination of a copy or move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    /// Where the file is now.
    pub src: Entry,
    /// Where the file should be.
    pub dest: Entry,
}

impl Transfer {
    /// Create a new transfer.
    pub fn new(src_bucket: &str, src_key: &str, dest_bucket: &str, dest_key: &str) -> Self {
        Self {
            src: Entry::new(src_bucket, src_key),
            dest: Entry::new(dest_bucket, dest_key),
        }
    }

    pub(crate) fn encode(&self) -> String {
        format!("{}/{}", self.src.encode(), self.dest.encode())
    }
}

impl From<(&str, &str, &str, &str)> for Transfer {
    fn from((src_bucket, src_key, dest_bucket, dest_key): (&str, &str, &str, &str)) -> Self {
        Transfer::new(src_bucket, src_key, dest_bucket, dest_key)
    }
}

/// Filters for listing files in a bucket.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Continuation marker returned by the previous page.
    pub marker: Option<String>,
    /// Max entries per page.
    pub limit: Option<usize>,
    /// Only list keys starting with it.
    pub prefix: Option<String>,
}

impl ListOptions {
    /// Set the marker.
    pub fn with_marker(mut self, marker: &str) -> Self {
        self.marker = Some(marker.to_string());
        self
    }

    /// Set the limit.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set the prefix.
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = Some(prefix.to_string());
        self
    }

    /// Build the list query. Empty values are left out.
    pub(crate) fn query(&self, bucket: &str) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        query.append_pair("bucket", bucket);
        if let Some(v) = self.marker.as_deref().filter(|v| !v.is_empty()) {
            query.append_pair("marker", v);
        }
        if let Some(v) = self.limit.filter(|v| *v > 0) {
            query.append_pair("limit", &v.to_string());
        }
        if let Some(v) = self.prefix.as_deref().filter(|v| !v.is_empty()) {
            query.append_pair("prefix", v);
        }
        query.finish()
    }
}

/// How uploaded files are named and whether they may replace existing ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PutOptions {
    /// Use the base name of the local file as key.
    ///
    /// Otherwise the key is the hex md5 of the content with the original
    /// extension kept. Default to `false`.
    pub keep_name: bool,
    /// Allow replacing an existing file with the same key.
    ///
    /// Default to `true`.
    pub overwrite: bool,
}

impl Default for PutOptions {
    fn default() -> Self {
        Self {
            keep_name: false,
            overwrite: true,
        }
    }
}

impl PutOptions {
    /// Set keep_name.
    pub fn with_keep_name(mut self, keep_name: bool) -> Self {
        self.keep_name = keep_name;
        self
    }

    /// Set overwrite.
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }
}

/// A file to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    /// Local path, or just a name when `data` is given.
    pub filename: String,
    /// Content to upload. Read from `filename` when absent.
    pub data: Option<Bytes>,
}

impl Upload {
    /// Upload the local file at `path`.
    pub fn file(path: &str) -> Self {
        Self {
            filename: path.to_string(),
            data: None,
        }
    }

    /// Upload in-memory content under `filename`.
    pub fn bytes(filename: &str, data: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.to_string(),
            data: Some(data.into()),
        }
    }

    /// Base name of `filename`.
    pub fn base_name(&self) -> String {
        Path::new(&self.filename)
            .file_name()
            .map(|v| v.to_string_lossy().to_string())
            .unwrap_or_else(|| self.filename.clone())
    }

    /// Key of the uploaded file for `content`.
    pub fn key(&self, content: &[u8], keep_name: bool) -> String {
        if keep_name {
            return self.base_name();
        }

        let digest = hex_md5(content);
        match Path::new(&self.filename).extension() {
            Some(ext) => format!("{digest}.{}", ext.to_string_lossy()),
            None => digest,
        }
    }
}
