use anyhow::Context;
use card_image_etl::core::CardLookup;
use card_image_etl::utils::logger;
use card_image_etl::{build_lookup_request, LookupResult, ScryfallClient, ScryfallConfig};
use clap::Parser;
use std::time::Duration;

/// 單張卡片查詢，用來確認查詢字串是否正確
#[derive(Parser)]
#[command(name = "card_lookup")]
#[command(about = "Resolve the Scryfall image URL of a single card")]
struct Args {
    #[arg(long)]
    name: String,

    #[arg(long)]
    set: String,

    #[arg(long)]
    collector_number: Option<String>,

    #[arg(long, default_value = card_image_etl::adapters::scryfall::DEFAULT_API_BASE)]
    api_base: String,

    #[arg(long, default_value_t = card_image_etl::adapters::scryfall::DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    let client = ScryfallClient::new(ScryfallConfig {
        api_base: args.api_base.clone(),
        timeout: Duration::from_secs(args.timeout_secs),
        ..Default::default()
    })
    .context("failed to build HTTP client")?;

    let request = build_lookup_request(&args.name, &args.set, args.collector_number.as_deref());
    println!("🔎 Request: {}", request);
    println!("👉 URL: {}", client.request_url(&request));

    match client.lookup(&request).await {
        LookupResult::Found { image_url } => println!("✅ {}", image_url),
        LookupResult::NotFound => println!("❌ No image found for {} ({})", args.name, args.set),
        LookupResult::RemoteError(failure) => {
            anyhow::bail!("lookup failed for {} ({}): {}", args.name, args.set, failure)
        }
    }

    Ok(())
}
