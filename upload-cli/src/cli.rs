use std::path::PathBuf;

use clap::Parser;
use cos_core::{plan::DEFAULT_STORAGE_CLASS, ConnectionArgs, CosConfig, UploadRequest};

const MIB: u64 = 1024 * 1024;

/// Upload a local file to Tencent COS
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the local file to upload
    pub local_path: PathBuf,
    /// Destination object key (defaults to the file name)
    #[arg(long)]
    pub key: Option<String>,
    #[command(flatten)]
    pub connection: ConnectionArgs,
    /// COS storage class (STANDARD, STANDARD_IA, ARCHIVE, ...)
    #[arg(long, default_value = DEFAULT_STORAGE_CLASS)]
    pub storage_class: String,
    /// Content-Type for single-request uploads (files up to 5 MiB)
    #[arg(long)]
    pub content_type: Option<String>,
    /// Multipart chunk size in MiB for large files
    #[arg(long, default_value_t = 8)]
    pub part_size: u64,
    /// Concurrent part uploads for large files
    #[arg(long, default_value_t = 5)]
    pub threads: usize,
    /// Send an MD5 digest with every multipart part
    #[arg(long)]
    pub md5: bool,
    /// Canned ACL for single-request uploads, e.g. private, public-read
    #[arg(long)]
    pub acl: Option<String>,
    /// Print the planned upload and exit
    #[arg(long)]
    pub dry_run: bool,
    /// Print the dry-run plan or the upload result as JSON
    #[arg(long)]
    pub json: bool,
}

impl Args {
    pub fn into_request(self, config: CosConfig) -> UploadRequest {
        UploadRequest {
            local_path: self.local_path,
            key: self.key,
            config,
            content_type: self.content_type,
            storage_class: self.storage_class,
            acl: self.acl,
            part_size: self.part_size.saturating_mul(MIB),
            threads: self.threads,
            digest: self.md5,
            dry_run: self.dry_run,
        }
    }
}
