use card_image_etl::core::ConfigProvider;
use card_image_etl::utils::error::ErrorSeverity;
use card_image_etl::utils::{logger, validation::Validate};
use card_image_etl::{CardImagePipeline, EtlEngine, LocalStorage, TomlConfig};
use clap::Parser;

#[derive(Parser)]
#[command(name = "toml-etl")]
#[command(about = "Card image ETL driven by a TOML job file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "card-etl.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override the delay between requests (milliseconds)
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Dry run - show what would be processed without executing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // 載入 TOML 配置
    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 初始化日誌
    if config.log_format() == Some("json") {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    // 應用命令列覆蓋設定
    if let Some(delay_ms) = args.delay_ms {
        config.pacing = Some(card_image_etl::config::toml_config::PacingConfig {
            delay_ms: Some(delay_ms),
        });
        tracing::info!("🔧 Request delay overridden to: {}ms", delay_ms);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No requests will be sent");
        perform_dry_run(&config).await?;
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());

    let storage = LocalStorage::new(config.base_dir().to_string());
    let pipeline = CardImagePipeline::new(storage, config)?;

    let cancel = pipeline.cancel_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("⏹️ Interrupt received, stopping after the current card");
            cancel.cancel();
        }
    });

    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ ETL process completed successfully!");
            println!("✅ ETL process completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ ETL process failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!("  Job: {}", config.job.name);
    if let Some(description) = &config.job.description {
        println!("  Description: {}", description);
    }
    println!("  API: {}", config.api_base());
    println!("  Input: {}/{}", config.base_dir(), config.input_path());
    println!("  Output: {}/{}", config.base_dir(), config.output_path());
    println!("  Delay: {:?}", config.request_delay());
    println!("  Timeout: {:?}", config.request_timeout());

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

/// 讀取輸入並列出每張卡片會送出的請求
async fn perform_dry_run(config: &TomlConfig) -> Result<(), Box<dyn std::error::Error>> {
    use card_image_etl::app::record_format::RecordFormat;
    use card_image_etl::core::Storage;
    use card_image_etl::{build_lookup_request, FixedDelay, ScryfallClient, ScryfallConfig};

    let storage = LocalStorage::new(config.base_dir().to_string());
    let format = RecordFormat::from_path(config.input_path())?;
    let cards = format.decode(&storage.read_file(config.input_path()).await?)?;
    let client = ScryfallClient::new(ScryfallConfig::from_provider(config))?;

    println!("🔍 Dry Run Analysis: {} cards", cards.len());
    for (index, card) in cards.iter().enumerate() {
        let collector_number = card.collector_number();
        let request = build_lookup_request(&card.name, &card.set, collector_number.as_deref());
        println!("  #{} {} ({})", index + 1, card.name, card.set.trim());
        println!("      {} -> {}", request, client.request_url(&request));
    }

    let estimated = FixedDelay::new(config.request_delay()).total_for(cards.len());
    println!();
    println!("⏱️ Minimum run time from pacing alone: {:?}", estimated);
    println!("✅ Dry run analysis complete.");

    Ok(())
}
