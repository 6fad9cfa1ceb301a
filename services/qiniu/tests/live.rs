use std::env;

use log::warn;
use sevencow_core::{Context, Result};
use sevencow_file_read_tokio::TokioFileRead;
use sevencow_http_send_reqwest::ReqwestHttpSend;
use sevencow_qiniu::{Bucket, Client, Config, ListOptions, PutOptions, StaticCredentialProvider};

fn init_bucket() -> Option<Bucket> {
    let _ = env_logger::builder().is_test(true).try_init();
    let _ = dotenv::dotenv();

    if env::var("SEVENCOW_QINIU_TEST").is_err() || env::var("SEVENCOW_QINIU_TEST").unwrap() != "on"
    {
        return None;
    }

    let access_key = env::var("SEVENCOW_QINIU_ACCESS_KEY")
        .expect("env SEVENCOW_QINIU_ACCESS_KEY must set");
    let secret_key = env::var("SEVENCOW_QINIU_SECRET_KEY")
        .expect("env SEVENCOW_QINIU_SECRET_KEY must set");
    let bucket = env::var("SEVENCOW_QINIU_BUCKET").expect("env SEVENCOW_QINIU_BUCKET must set");

    let ctx = Context::new()
        .with_file_read(TokioFileRead)
        .with_http_send(ReqwestHttpSend::default());
    let client = Client::with_credential_provider(
        ctx,
        Config::default(),
        StaticCredentialProvider::new(&access_key, &secret_key),
    );

    Some(client.bucket(&bucket))
}

#[tokio::test]
async fn test_live_put_list_delete() -> Result<()> {
    let Some(bucket) = init_bucket() else {
        warn!("SEVENCOW_QINIU_TEST is not set, skipped");
        return Ok(());
    };

    let dir = tempfile::tempdir()?;
    let mut paths = Vec::new();
    for idx in 0..3 {
        let path = dir.path().join(format!("sevencow{idx}.txt"));
        std::fs::write(&path, format!("{idx}{idx}{idx}{idx}"))?;
        paths.push(path.to_string_lossy().to_string());
    }

    let results = bucket
        .put(
            paths.iter().map(|p| p.as_str()).collect::<Vec<_>>(),
            PutOptions::default(),
        )
        .await?
        .many()
        .expect("put many must return many");
    assert_eq!(results.len(), 3);

    let keys: Vec<String> = results
        .iter()
        .filter_map(|v| v["key"].as_str().map(String::from))
        .collect();
    assert_eq!(keys.len(), 3);

    let listed = bucket
        .list_files(ListOptions::default().with_prefix(""))
        .await?;
    let listed = listed.to_string();
    for key in &keys {
        assert!(listed.contains(key.as_str()), "{key} must be listed");
    }

    let stat = bucket.stat(keys.clone()).await?;
    assert_eq!(stat.len(), 3);

    bucket.delete(keys).await?;
    Ok(())
}
