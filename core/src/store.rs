use std::path::Path;

use async_trait::async_trait;

use crate::{
    error::Result,
    types::{Listing, UploadOutcome},
};

pub struct PutObject<'a> {
    pub bucket: &'a str,
    pub key: &'a str,
    pub body: Vec<u8>,
    pub content_type: Option<&'a str>,
    pub acl: Option<&'a str>,
    pub storage_class: &'a str,
}

pub struct MultipartUpload<'a> {
    pub bucket: &'a str,
    pub key: &'a str,
    pub path: &'a Path,
    pub part_size: u64,
    pub threads: usize,
    pub storage_class: &'a str,
    /// Send a Content-MD5 header with every part
    pub digest: bool,
}

/// The three storage calls the utilities need. Region and credentials are
/// bound when the implementation is constructed.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn list_objects(&self, bucket: &str, prefix: &str, max_keys: i32) -> Result<Listing>;

    async fn put_object(&self, request: PutObject<'_>) -> Result<UploadOutcome>;

    async fn upload_multipart(&self, request: MultipartUpload<'_>) -> Result<UploadOutcome>;
}

#[async_trait]
impl<T> ObjectStore for &T
where
    T: ObjectStore + ?Sized,
{
    async fn list_objects(&self, bucket: &str, prefix: &str, max_keys: i32) -> Result<Listing> {
        (**self).list_objects(bucket, prefix, max_keys).await
    }

    async fn put_object(&self, request: PutObject<'_>) -> Result<UploadOutcome> {
        (**self).put_object(request).await
    }

    async fn upload_multipart(&self, request: MultipartUpload<'_>) -> Result<UploadOutcome> {
        (**self).upload_multipart(request).await
    }
}
