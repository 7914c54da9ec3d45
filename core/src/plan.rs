//! Upload strategy selection.
//!
//! Files up to [`SINGLE_UPLOAD_LIMIT`] go out in one `PutObject` request that
//! can carry a content type and ACL. Anything larger is split into parts and
//! sent as a multipart upload, which takes neither.

use std::{
    fmt,
    fs::File,
    path::{Path, PathBuf},
};

use bytesize::ByteSize;
use serde::Serialize;

use crate::{
    config::CosConfig,
    error::{CosError, Result},
};

/// Largest file sent as a single request (5 MiB, inclusive).
pub const SINGLE_UPLOAD_LIMIT: u64 = 5 * 1024 * 1024;

/// Multipart uploads accept at most this many parts.
pub const MAX_PARTS: u64 = 10_000;

/// Part size actually used for a `size`-byte upload: the requested size,
/// raised when it would need more than [`MAX_PARTS`] parts.
pub fn effective_part_size(size: u64, part_size: u64) -> u64 {
    part_size.max(size.div_ceil(MAX_PARTS)).max(1)
}

pub const DEFAULT_STORAGE_CLASS: &str = "STANDARD";

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub local_path: PathBuf,
    /// Object key; the file name is used when absent or blank
    pub key: Option<String>,
    pub config: CosConfig,
    pub content_type: Option<String>,
    pub storage_class: String,
    pub acl: Option<String>,
    /// Part size in bytes
    pub part_size: u64,
    pub threads: usize,
    pub digest: bool,
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "strategy", rename_all = "lowercase")]
pub enum Strategy {
    Single {
        content_type: String,
        acl: Option<String>,
    },
    Multipart {
        part_size: u64,
        threads: usize,
        digest: bool,
    },
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Single { .. } => "single",
            Self::Multipart { .. } => "multipart",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadPlan {
    pub local_path: PathBuf,
    pub bucket: String,
    pub region: String,
    pub key: String,
    pub size: u64,
    pub storage_class: String,
    #[serde(flatten)]
    pub strategy: Strategy,
    pub warnings: Vec<String>,
}

impl UploadPlan {
    /// Number of parts the upload is split into; 1 for a single request.
    pub fn part_count(&self) -> u64 {
        match self.strategy {
            Strategy::Single { .. } => 1,
            Strategy::Multipart { part_size, .. } => self
                .size
                .div_ceil(effective_part_size(self.size, part_size))
                .max(1),
        }
    }
}

impl fmt::Display for UploadPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  Local: {}", self.local_path.display())?;
        writeln!(
            f,
            "  Size: {} ({} bytes)",
            ByteSize(self.size).to_string_as(true),
            self.size
        )?;
        writeln!(f, "  Bucket: {}", self.bucket)?;
        writeln!(f, "  Region: {}", self.region)?;
        writeln!(f, "  Key: {}", self.key)?;
        writeln!(f, "  Storage class: {}", self.storage_class)?;
        write!(f, "  Strategy: {}", self.strategy.name())?;
        match &self.strategy {
            Strategy::Single { content_type, acl } => {
                write!(f, "\n  Content-Type: {content_type}")?;
                if let Some(acl) = acl {
                    write!(f, "\n  ACL: {acl}")?;
                }
            }
            Strategy::Multipart {
                part_size,
                threads,
                digest,
            } => {
                write!(
                    f,
                    "\n  Part size: {} ({} parts)",
                    ByteSize(*part_size).to_string_as(true),
                    self.part_count()
                )?;
                write!(f, "\n  Threads: {threads}")?;
                write!(f, "\n  MD5 per part: {}", if *digest { "yes" } else { "no" })?;
            }
        }
        Ok(())
    }
}

/// Guesses a MIME type from the file extension.
pub fn guess_content_type(path: &Path) -> String {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("txt") | Some("log") => mime::TEXT_PLAIN_UTF_8.to_string(),
        Some("html") | Some("htm") => mime::TEXT_HTML_UTF_8.to_string(),
        Some("css") => mime::TEXT_CSS_UTF_8.to_string(),
        Some("csv") => mime::TEXT_CSV_UTF_8.to_string(),
        Some("js") | Some("mjs") => mime::APPLICATION_JAVASCRIPT_UTF_8.to_string(),
        Some("json") => mime::APPLICATION_JSON.to_string(),
        Some("xml") => mime::TEXT_XML.to_string(),
        Some("pdf") => mime::APPLICATION_PDF.to_string(),
        Some("png") => mime::IMAGE_PNG.to_string(),
        Some("jpg") | Some("jpeg") => mime::IMAGE_JPEG.to_string(),
        Some("gif") => mime::IMAGE_GIF.to_string(),
        Some("svg") => mime::IMAGE_SVG.to_string(),
        Some("bmp") => mime::IMAGE_BMP.to_string(),
        Some("ico") => "image/x-icon".to_string(),
        Some("webp") => "image/webp".to_string(),
        Some("wasm") => "application/wasm".to_string(),
        Some("zip") => "application/zip".to_string(),
        Some("gz") | Some("tgz") => "application/gzip".to_string(),
        Some("tar") => "application/x-tar".to_string(),
        Some("mp4") => "video/mp4".to_string(),
        Some("mp3") => "audio/mpeg".to_string(),
        _ => FALLBACK_CONTENT_TYPE.to_string(),
    }
}

fn resolve_key(key: Option<&str>, path: &Path) -> Result<String> {
    if let Some(key) = key.map(str::trim).filter(|key| !key.is_empty()) {
        return Ok(key.to_string());
    }
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            CosError::InvalidConfig(format!(
                "cannot derive an object key from {}; pass --key",
                path.display()
            ))
        })
}

/// Decides how `request` should be uploaded.
///
/// Reads the file size once; nothing is sent anywhere.
pub fn plan(request: &UploadRequest) -> Result<UploadPlan> {
    let path = &request.local_path;
    let not_found = || CosError::NotFound(format!("local file not found: {}", path.display()));

    let file = File::open(path).map_err(|_| not_found())?;
    let metadata = file.metadata().map_err(|_| not_found())?;
    if !metadata.is_file() {
        return Err(not_found());
    }
    let size = metadata.len();

    let key = resolve_key(request.key.as_deref(), path)?;
    let local_path = std::fs::canonicalize(path).unwrap_or_else(|_| path.clone());

    let mut warnings = Vec::new();
    let strategy = if size <= SINGLE_UPLOAD_LIMIT {
        Strategy::Single {
            content_type: request
                .content_type
                .clone()
                .unwrap_or_else(|| guess_content_type(path)),
            acl: request.acl.clone(),
        }
    } else {
        if request.part_size == 0 {
            return Err(CosError::InvalidConfig(
                "part size must be greater than zero".to_string(),
            ));
        }
        if request.threads < 1 {
            return Err(CosError::InvalidConfig(
                "thread count must be at least 1".to_string(),
            ));
        }
        if let Some(content_type) = &request.content_type {
            warnings.push(format!(
                "content type {content_type:?} is ignored for multipart uploads (files over {})",
                ByteSize(SINGLE_UPLOAD_LIMIT).to_string_as(true)
            ));
        }
        if let Some(acl) = &request.acl {
            warnings.push(format!(
                "ACL {acl:?} is ignored for multipart uploads (files over {})",
                ByteSize(SINGLE_UPLOAD_LIMIT).to_string_as(true)
            ));
        }

        Strategy::Multipart {
            part_size: request.part_size,
            threads: request.threads,
            digest: request.digest,
        }
    };

    Ok(UploadPlan {
        local_path,
        bucket: request.config.bucket.clone(),
        region: request.config.region.clone(),
        key,
        size,
        storage_class: request.storage_class.clone(),
        strategy,
        warnings,
    })
}
