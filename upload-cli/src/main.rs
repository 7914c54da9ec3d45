mod cli;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use cos_core::{run_upload, CosClient, CosError, UploadReport};

use crate::cli::Args;

async fn run(args: Args) -> Result<()> {
    let json = args.json;
    let config = args.connection.clone().resolve()?;
    let request = args.into_request(config);

    if !request.dry_run && !json {
        println!("Tencent COS Upload");
        println!("========================================");
        println!("Bucket: {}", request.config.bucket);
        println!("Region: {}", request.config.region);
        println!("Local: {}", request.local_path.display());
        println!();
    }

    let report = run_upload(&request, || CosClient::connect(&request.config))
        .await
        .with_context(|| format!("upload of {} failed", request.local_path.display()))?;

    match report {
        UploadReport::DryRun(plan) if json => {
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        UploadReport::DryRun(plan) => {
            println!("Dry run: would upload");
            println!("{plan}");
        }
        UploadReport::Uploaded { outcome, .. } if json => {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        UploadReport::Uploaded { plan, outcome } => {
            println!(
                "✓ Upload complete ({}, {} part(s))",
                outcome.strategy, outcome.parts
            );
            println!("Object Key: {}", outcome.key);
            println!("Size: {} bytes", plan.size);
            if let Some(e_tag) = outcome.e_tag {
                println!("ETag: {e_tag}");
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    cos_core::logging::init();
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::debug!(?error, "upload failed");
            eprintln!("Error: {error:#}");
            let code = error
                .downcast_ref::<CosError>()
                .map_or(1, CosError::exit_code);
            ExitCode::from(code)
        }
    }
}
