use std::{io::SeekFrom, path::Path};

use async_trait::async_trait;
use aws_sdk_s3::{
    config::{Credentials, RequestChecksumCalculation},
    primitives::{ByteStream, DateTimeFormat},
    types::{CompletedMultipartUpload, CompletedPart, ObjectCannedAcl, StorageClass},
    Client,
};
use base64::{engine::general_purpose::STANDARD as B64, Engine as _};
use futures_util::{StreamExt, TryStreamExt};
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use crate::{
    config::CosConfig,
    error::{CosError, Result},
    plan::effective_part_size,
    store::{MultipartUpload, ObjectStore, PutObject},
    types::{Listing, ObjectSummary, UploadOutcome},
};

/// [`ObjectStore`] backed by the S3-compatible COS API.
#[derive(Clone)]
pub struct CosClient {
    client: Client,
}

impl CosClient {
    pub async fn connect(config: &CosConfig) -> Self {
        let credentials = Credentials::new(
            config.credentials.secret_id.clone(),
            config.credentials.secret_key.clone(),
            config.credentials.token.clone(),
            None,
            "cos-static",
        );
        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .endpoint_url(config.endpoint_url())
            .load()
            .await;
        tracing::debug!(
            endpoint = %config.endpoint_url(),
            region = %config.region,
            "created COS client"
        );
        Self {
            client: Client::from_conf(s3_config(&sdk_config)),
        }
    }

    async fn upload_part(
        &self,
        request: &MultipartUpload<'_>,
        upload_id: &str,
        range: PartRange,
    ) -> Result<CompletedPart> {
        let body = read_part(request.path, range).await?;
        let digest = request.digest.then(|| B64.encode(md5::compute(&body).0));

        let resp = self
            .client
            .upload_part()
            .bucket(request.bucket)
            .key(request.key)
            .upload_id(upload_id)
            .part_number(range.number)
            .set_content_md5(digest)
            .body(ByteStream::from(body))
            .send()
            .await?;
        tracing::debug!(part = range.number, len = range.len, "uploaded part");

        Ok(CompletedPart::builder()
            .part_number(range.number)
            .set_e_tag(resp.e_tag().map(str::to_string))
            .build())
    }

    async fn abort(&self, request: &MultipartUpload<'_>, upload_id: &str) {
        let result = self
            .client
            .abort_multipart_upload()
            .bucket(request.bucket)
            .key(request.key)
            .upload_id(upload_id)
            .send()
            .await;
        if let Err(error) = result {
            tracing::warn!(
                error = %CosError::from(error),
                upload_id,
                "failed to abort multipart upload"
            );
        }
    }
}

/// Only checksums the operation demands are computed by the SDK; per-part
/// Content-MD5 is the sole opt-in integrity header.
fn s3_config(sdk_config: &aws_config::SdkConfig) -> aws_sdk_s3::Config {
    aws_sdk_s3::config::Builder::from(sdk_config)
        .request_checksum_calculation(RequestChecksumCalculation::WhenRequired)
        .build()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PartRange {
    pub number: i32,
    pub offset: u64,
    pub len: u64,
}

/// Splits `size` bytes into consecutive ranges of `part_size`, numbered from 1.
pub(crate) fn part_ranges(size: u64, part_size: u64) -> Vec<PartRange> {
    if size == 0 {
        return vec![PartRange {
            number: 1,
            offset: 0,
            len: 0,
        }];
    }
    (0..size.div_ceil(part_size))
        .map(|i| {
            let offset = i * part_size;
            PartRange {
                number: i as i32 + 1,
                offset,
                len: part_size.min(size - offset),
            }
        })
        .collect()
}

async fn read_part(path: &Path, range: PartRange) -> Result<Vec<u8>> {
    let io_err = |source| CosError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut file = tokio::fs::File::open(path).await.map_err(io_err)?;
    file.seek(SeekFrom::Start(range.offset))
        .await
        .map_err(io_err)?;
    let mut buf = vec![0; range.len as usize];
    file.read_exact(&mut buf).await.map_err(io_err)?;
    Ok(buf)
}

#[async_trait]
impl ObjectStore for CosClient {
    async fn list_objects(&self, bucket: &str, prefix: &str, max_keys: i32) -> Result<Listing> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .prefix(prefix)
            .max_keys(max_keys)
            .send()
            .await?;

        let objects = output
            .contents()
            .iter()
            .filter_map(|object| {
                let key = object.key()?;
                Some(ObjectSummary {
                    key: key.to_string(),
                    size: object.size().unwrap_or_default().max(0) as u64,
                    last_modified: object
                        .last_modified()
                        .and_then(|time| time.fmt(DateTimeFormat::DateTime).ok()),
                })
            })
            .collect();

        Ok(Listing {
            objects,
            truncated: output.is_truncated().unwrap_or(false),
        })
    }

    async fn put_object(&self, request: PutObject<'_>) -> Result<UploadOutcome> {
        let resp = self
            .client
            .put_object()
            .bucket(request.bucket)
            .key(request.key)
            .storage_class(StorageClass::from(request.storage_class))
            .set_content_type(request.content_type.map(str::to_string))
            .set_acl(request.acl.map(ObjectCannedAcl::from))
            .body(ByteStream::from(request.body))
            .send()
            .await?;

        Ok(UploadOutcome {
            key: request.key.to_string(),
            e_tag: resp.e_tag().map(str::to_string),
            strategy: "single".to_string(),
            parts: 1,
        })
    }

    async fn upload_multipart(&self, request: MultipartUpload<'_>) -> Result<UploadOutcome> {
        let size = tokio::fs::metadata(request.path)
            .await
            .map_err(|source| CosError::Io {
                path: request.path.to_path_buf(),
                source,
            })?
            .len();
        if request.part_size == 0 || request.threads == 0 {
            return Err(CosError::InvalidConfig(
                "part size and thread count must be positive".to_string(),
            ));
        }

        let create = self
            .client
            .create_multipart_upload()
            .bucket(request.bucket)
            .key(request.key)
            .storage_class(StorageClass::from(request.storage_class))
            .send()
            .await?;
        let upload_id = create
            .upload_id()
            .ok_or_else(|| CosError::Service {
                code: "MissingUploadId".to_string(),
                message: "create multipart upload returned no upload id".to_string(),
            })?
            .to_string();

        let part_size = effective_part_size(size, request.part_size);
        if part_size != request.part_size {
            tracing::info!(
                requested = request.part_size,
                part_size,
                "raised part size to stay within the part limit"
            );
        }
        let ranges = part_ranges(size, part_size);
        let part_count = ranges.len();
        tracing::info!(
            key = request.key,
            %upload_id,
            parts = part_count,
            threads = request.threads,
            "started multipart upload"
        );

        let uploaded = futures_util::stream::iter(ranges)
            .map(|range| self.upload_part(&request, &upload_id, range))
            .buffer_unordered(request.threads)
            .try_collect::<Vec<_>>()
            .await;
        let mut parts = match uploaded {
            Ok(parts) => parts,
            Err(error) => {
                self.abort(&request, &upload_id).await;
                return Err(error);
            }
        };
        parts.sort_by_key(|part| part.part_number());

        let completed = CompletedMultipartUpload::builder()
            .set_parts(Some(parts))
            .build();
        let resp = match self
            .client
            .complete_multipart_upload()
            .bucket(request.bucket)
            .key(request.key)
            .upload_id(&upload_id)
            .multipart_upload(completed)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(error) => {
                self.abort(&request, &upload_id).await;
                return Err(error.into());
            }
        };

        Ok(UploadOutcome {
            key: request.key.to_string(),
            e_tag: resp.e_tag().map(str::to_string),
            strategy: "multipart".to_string(),
            parts: part_count,
        })
    }
}
