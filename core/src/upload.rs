use std::future::Future;

use crate::{
    error::{CosError, Result},
    plan::{plan, Strategy, UploadPlan, UploadRequest},
    store::{MultipartUpload, ObjectStore, PutObject},
    types::UploadOutcome,
};

#[derive(Debug)]
pub enum UploadReport {
    /// The request was only planned.
    DryRun(UploadPlan),
    Uploaded {
        plan: UploadPlan,
        outcome: UploadOutcome,
    },
}

impl UploadReport {
    pub fn plan(&self) -> &UploadPlan {
        match self {
            Self::DryRun(plan) | Self::Uploaded { plan, .. } => plan,
        }
    }
}

/// Plans `request` and, unless it is a dry run, sends it to the store that
/// `connect` yields. `connect` is not called for dry runs.
pub async fn run_upload<F, Fut, S>(request: &UploadRequest, connect: F) -> Result<UploadReport>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = S>,
    S: ObjectStore,
{
    let plan = plan(request)?;
    for warning in &plan.warnings {
        tracing::warn!(key = %plan.key, "{warning}");
    }

    if request.dry_run {
        return Ok(UploadReport::DryRun(plan));
    }

    let store = connect().await;
    let outcome = execute(&store, &plan).await?;
    Ok(UploadReport::Uploaded { plan, outcome })
}

/// Transfers the file described by `plan`.
pub async fn execute<S>(store: &S, plan: &UploadPlan) -> Result<UploadOutcome>
where
    S: ObjectStore + ?Sized,
{
    tracing::info!(
        key = %plan.key,
        size = plan.size,
        strategy = plan.strategy.name(),
        "uploading"
    );
    match &plan.strategy {
        Strategy::Single { content_type, acl } => {
            let body = tokio::fs::read(&plan.local_path)
                .await
                .map_err(|source| CosError::Io {
                    path: plan.local_path.clone(),
                    source,
                })?;
            store
                .put_object(PutObject {
                    bucket: &plan.bucket,
                    key: &plan.key,
                    body,
                    content_type: Some(content_type.as_str()),
                    acl: acl.as_deref(),
                    storage_class: &plan.storage_class,
                })
                .await
        }
        Strategy::Multipart {
            part_size,
            threads,
            digest,
        } => {
            store
                .upload_multipart(MultipartUpload {
                    bucket: &plan.bucket,
                    key: &plan.key,
                    path: &plan.local_path,
                    part_size: *part_size,
                    threads: *threads,
                    storage_class: &plan.storage_class,
                    digest: *digest,
                })
                .await
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        fs,
        sync::atomic::{AtomicUsize, Ordering},
    };

    use tempfile::TempDir;

    use super::*;
    use crate::{
        plan::tests::{request_for, sized_file},
        store::testing::{Call, RecordingStore},
    };

    const MIB: u64 = 1024 * 1024;

    #[tokio::test]
    async fn dry_run_never_calls_the_store() {
        let dir = TempDir::new().unwrap();
        let store = RecordingStore::default();

        for size in [10, 6 * MIB] {
            let request = UploadRequest {
                dry_run: true,
                ..request_for(sized_file(&dir, "file.bin", size))
            };
            let report = run_upload(&request, || async { &store }).await.unwrap();
            assert!(matches!(report, UploadReport::DryRun(_)));
        }
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn store_is_only_connected_for_real_uploads() {
        let dir = TempDir::new().unwrap();
        let store = RecordingStore::default();
        let connects = AtomicUsize::new(0);
        let connect = || {
            connects.fetch_add(1, Ordering::SeqCst);
            async { &store }
        };

        let request = UploadRequest {
            dry_run: true,
            ..request_for(sized_file(&dir, "file.bin", 10))
        };
        run_upload(&request, connect).await.unwrap();
        assert_eq!(connects.load(Ordering::SeqCst), 0);

        let request = UploadRequest {
            dry_run: false,
            ..request
        };
        run_upload(&request, connect).await.unwrap();
        assert_eq!(connects.load(Ordering::SeqCst), 1);
        assert_eq!(store.calls().len(), 1);
    }

    #[tokio::test]
    async fn dry_run_still_reports_missing_file() {
        let dir = TempDir::new().unwrap();
        let store = RecordingStore::default();
        let request = UploadRequest {
            dry_run: true,
            ..request_for(dir.path().join("absent.bin"))
        };

        let err = run_upload(&request, || async { &store }).await.unwrap_err();
        assert!(matches!(err, CosError::NotFound(_)));
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn small_file_is_put_with_its_bytes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hello.txt");
        fs::write(&path, b"hello cos!").unwrap();
        let store = RecordingStore::default();
        let request = UploadRequest {
            key: Some("greetings/hello.txt".to_string()),
            acl: Some("public-read".to_string()),
            ..request_for(path)
        };

        let report = run_upload(&request, || async { &store }).await.unwrap();
        let UploadReport::Uploaded { outcome, .. } = report else {
            panic!("expected an upload");
        };
        assert_eq!(outcome.key, "greetings/hello.txt");
        assert_eq!(
            store.calls(),
            vec![Call::Put {
                key: "greetings/hello.txt".to_string(),
                body: b"hello cos!".to_vec(),
                content_type: Some("text/plain; charset=utf-8".to_string()),
                acl: Some("public-read".to_string()),
                storage_class: "STANDARD".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn large_file_goes_through_multipart() {
        let dir = TempDir::new().unwrap();
        let path = sized_file(&dir, "big.bin", 6 * MIB);
        let store = RecordingStore::default();
        let request = UploadRequest {
            part_size: 5 * MIB,
            threads: 4,
            digest: true,
            content_type: Some("application/x-custom".to_string()),
            ..request_for(path)
        };

        let report = run_upload(&request, || async { &store }).await.unwrap();
        assert_eq!(report.plan().warnings.len(), 1);

        let calls = store.calls();
        assert_eq!(calls.len(), 1);
        let Call::Multipart {
            key,
            part_size,
            threads,
            digest,
            ..
        } = &calls[0]
        else {
            panic!("expected a multipart call, got {:?}", calls[0]);
        };
        assert_eq!(key, "big.bin");
        assert_eq!(*part_size, 5 * MIB);
        assert_eq!(*threads, 4);
        assert!(*digest);
    }

    #[tokio::test]
    async fn store_errors_propagate_unchanged() {
        let dir = TempDir::new().unwrap();
        let store = RecordingStore {
            fail_with: Some("AccessDenied"),
            ..Default::default()
        };
        let request = request_for(sized_file(&dir, "file.bin", 10));

        let err = run_upload(&request, || async { &store }).await.unwrap_err();
        assert!(matches!(err, CosError::Auth(_)));
        assert_eq!(store.calls().len(), 1);
    }
}
