use channel_etl::config::toml_config::TomlConfig;
use channel_etl::core::ConfigProvider;
use channel_etl::utils::{logger, validation::Validate};
use channel_etl::{
    ChannelClassifier, CsvClassificationPipeline, DatasetLoader, EtlEngine, LocalStorage,
};
use clap::Parser;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "batch-classify")]
#[command(about = "Classify a CSV of visits using a TOML job file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "channel-etl.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override the output compression setting from config
    #[arg(long)]
    compress: Option<bool>,

    /// Dry run - show what would be processed without executing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose);

    tracing::info!("🚀 Starting batch classification");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    // 載入 TOML 配置
    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 應用命令列覆蓋設定
    if let Some(compress) = args.compress {
        config.output.compress = Some(compress);
        tracing::info!("🔧 Compression overridden to: {}", compress);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config, &args);

    let loader = DatasetLoader::new();

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
        perform_dry_run(&config, &loader).await;
        return Ok(());
    }

    let dataset = loader.load(&config.dataset_source()).await;
    let classifier = Arc::new(ChannelClassifier::new(dataset));

    let pipeline = CsvClassificationPipeline::new(LocalStorage::current_dir(), config, classifier);
    let engine = EtlEngine::new(pipeline);

    match engine.run().await {
        Ok(report) => {
            tracing::info!("✅ Batch classification completed successfully!");
            println!("✅ Batch classification completed successfully!");
            println!(
                "📊 {} rows classified, {} skipped, {} unassigned, {} mismatched",
                report.summary.classified_rows,
                report.summary.skipped_rows,
                report.summary.unassigned_rows,
                report.summary.mismatched_rows
            );
            println!("📁 Output saved to: {}", report.output_path);
        }
        Err(e) => {
            // 記錄詳細錯誤信息
            tracing::error!(
                "❌ Batch classification failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = e.exit_code();
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
    println!("  Dataset: {}", config.dataset_source());
    println!("  Input: {}", config.input_path());
    println!("  Output: {}", config.output_path());
    println!("  Compressed: {}", config.compress_output());

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

async fn perform_dry_run(config: &TomlConfig, loader: &DatasetLoader) {
    println!("🔍 Dry Run Analysis:");
    println!();

    // 資料集檢查
    println!("📚 Reference Dataset:");
    match loader.try_load(&config.dataset_source()).await {
        Ok(dataset) => {
            println!("  Entries: {}", dataset.len());
            let mut counts: Vec<_> = dataset.count_by_category().into_iter().collect();
            counts.sort();
            for (category, count) in counts {
                println!("  {}: {}", category, count);
            }
        }
        Err(e) => {
            println!("  ⚠️ Unavailable: {}", e);
            println!("  Classification would fall back to pattern rules only");
        }
    }

    // 欄位對應
    println!();
    println!("🔄 Column Mapping:");
    let columns = config.columns();
    println!("  source -> {}", columns.source);
    println!("  medium -> {}", columns.medium);
    println!("  campaign -> {}", columns.campaign);
    println!("  url -> {}", columns.url);
    println!("  expected channel -> {}", columns.expected_channel);

    println!();
    println!("💾 Output Configuration:");
    if config.compress_output() {
        println!("  {}/classification_output.zip", config.output_path());
    } else {
        println!("  {}/classified.csv", config.output_path());
        println!("  {}/summary.json", config.output_path());
    }

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");
}
