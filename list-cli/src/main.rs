mod cli;

use std::process::ExitCode;

use anyhow::{Context, Result};
use bytesize::ByteSize;
use clap::Parser;
use cli_table::{
    format::{Border, Justify, Separator},
    Cell, Table,
};
use cos_core::{bucket, types::Listing, CosClient, CosError};

use crate::cli::Args;

const RULE: &str = "----------------------------------------";

fn print_table(listing: &Listing, show: usize) -> Result<()> {
    let table = listing
        .objects
        .iter()
        .take(show)
        .map(|object| {
            vec![
                object.key.as_str().cell(),
                ByteSize(object.size)
                    .to_string()
                    .cell()
                    .justify(Justify::Right),
                object.last_modified.as_deref().unwrap_or("-").cell(),
            ]
        })
        .collect::<Vec<_>>()
        .table()
        .title(vec!["KEY".cell(), "SIZE".cell(), "LAST MODIFIED".cell()])
        .separator(
            Separator::builder()
                .column(None)
                .row(None)
                .title(None)
                .build(),
        )
        .border(Border::builder().build());
    cli_table::print_stdout(table)?;
    Ok(())
}

async fn run(args: Args) -> Result<()> {
    let config = args.connection.resolve()?;
    let client = CosClient::connect(&config).await;

    if args.json {
        let listing = bucket::list_bucket(&client, &config.bucket, &args.prefix, args.max_keys)
            .await
            .context("failed to list bucket")?;
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    println!("Tencent COS Configuration Test");
    println!("{}", RULE.replace('-', "="));
    println!("Bucket: {}", config.bucket);
    println!("Region: {}", config.region);
    println!("Secret ID: {}", config.credentials.masked_id());
    println!();
    println!("Listing objects under {:?}...", args.prefix);
    println!("{RULE}");

    let listing = bucket::list_bucket(&client, &config.bucket, &args.prefix, args.max_keys)
        .await
        .context("unable to access COS bucket, please check your configuration")?;

    let count = listing.objects.len();
    if count == 0 {
        println!("✓ Configuration is correct! Bucket is accessible but nothing matched the prefix.");
    } else {
        let more = if listing.truncated { "+" } else { "" };
        println!("✓ Configuration is correct! Found {count}{more} object(s):");
        print_table(&listing, args.show)?;
        if count > args.show {
            println!("  ... and {}{more} more objects", count - args.show);
        }
    }
    println!();
    println!("✓ SUCCESS: Tencent COS configuration is working correctly!");
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    cos_core::logging::init();
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::debug!(?error, "listing failed");
            eprintln!("✗ FAILED: {error:#}");
            let code = error
                .downcast_ref::<CosError>()
                .map_or(1, CosError::exit_code);
            ExitCode::from(code)
        }
    }
}
