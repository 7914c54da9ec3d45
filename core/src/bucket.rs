use crate::{error::Result, store::ObjectStore, types::Listing};

pub const DEFAULT_MAX_KEYS: i32 = 1000;

/// Fetches the first page of keys under `prefix`.
///
/// A successful call proves the credentials, region and bucket are usable.
/// Failures come back classified as `Auth`, `NotFound` or `Connectivity`.
pub async fn list_bucket<S>(
    store: &S,
    bucket: &str,
    prefix: &str,
    max_keys: i32,
) -> Result<Listing>
where
    S: ObjectStore + ?Sized,
{
    tracing::info!(bucket, prefix, max_keys, "listing bucket");
    let listing = store.list_objects(bucket, prefix, max_keys).await?;
    tracing::info!(
        count = listing.objects.len(),
        truncated = listing.truncated,
        "listed bucket"
    );
    Ok(listing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::CosError,
        store::testing::{Call, RecordingStore},
        types::ObjectSummary,
    };

    #[tokio::test]
    async fn returns_single_page() {
        let store = RecordingStore {
            listing: Listing {
                objects: vec![ObjectSummary {
                    key: "index.html".to_string(),
                    size: 512,
                    last_modified: None,
                }],
                truncated: true,
            },
            ..Default::default()
        };

        let listing = list_bucket(&store, "example-1250000000", "", DEFAULT_MAX_KEYS)
            .await
            .unwrap();
        assert_eq!(listing.objects.len(), 1);
        assert!(listing.truncated);
        assert_eq!(
            store.calls(),
            vec![Call::List {
                bucket: "example-1250000000".to_string(),
                prefix: String::new(),
                max_keys: 1000,
            }]
        );
    }

    #[tokio::test]
    async fn distinguishes_failure_kinds() {
        let cases: [(&'static str, fn(&CosError) -> bool); 3] = [
            ("InvalidAccessKeyId", |e| matches!(e, CosError::Auth(_))),
            ("SignatureDoesNotMatch", |e| matches!(e, CosError::Auth(_))),
            ("NoSuchBucket", |e| matches!(e, CosError::NotFound(_))),
        ];
        for (code, check) in cases {
            let store = RecordingStore {
                fail_with: Some(code),
                ..Default::default()
            };
            let err = list_bucket(&store, "missing", "", 10).await.unwrap_err();
            assert!(check(&err), "{code} -> {err:?}");
        }
    }
}
