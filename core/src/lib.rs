pub mod bucket;
pub mod config;
pub mod error;
pub mod logging;
pub mod plan;
pub mod s3;
pub mod store;
pub mod types;
pub mod upload;

pub use crate::{
    config::{ConnectionArgs, CosConfig, Credentials},
    error::{CosError, Result},
    plan::{plan, Strategy, UploadPlan, UploadRequest},
    s3::CosClient,
    store::ObjectStore,
    upload::{run_upload, UploadReport},
};
