// Env values used in qiniu services.
pub const QINIU_ACCESS_KEY: &str = "QINIU_ACCESS_KEY";
pub const QINIU_SECRET_KEY: &str = "QINIU_SECRET_KEY";

// Service endpoints.
pub const RS_HOST: &str = "http://rs.qbox.me";
pub const UP_HOST: &str = "http://up.qiniu.com";
pub const RSF_HOST: &str = "http://rsf.qbox.me";

/// Lifetime of an upload token in seconds.
pub const DEFAULT_UPLOAD_TOKEN_TTL: i64 = 3600;
/// Upload tokens are reissued this many seconds before they expire.
pub const UPLOAD_TOKEN_REFRESH_MARGIN: i64 = 60;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
