use channel_etl::config::{BuildUrlArgs, Command};
use channel_etl::core::campaign_url::{
    analyze_url, check_alignment, AnalysisOutcome, CampaignUrlBuilder, UtmField,
};
use channel_etl::utils::{logger, validation::Validate};
use channel_etl::{
    channel_rule, load_reference_dataset, Alignment, Channel, ChannelClassifier, CliConfig,
    CsvClassificationPipeline, EtlEngine, EtlError, LocalStorage,
};
use clap::Parser;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if let Err(e) = run(config).await {
        tracing::error!(
            "❌ {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = e.exit_code();
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

async fn run(config: CliConfig) -> Result<(), EtlError> {
    match config.command {
        Command::Channels => {
            print_channels();
            return Ok(());
        }
        Command::BuildUrl(args) => return build_url(args),
        _ => {}
    }

    let dataset = load_reference_dataset(&config.dataset_source()).await;
    let classifier = Arc::new(ChannelClassifier::new(dataset));
    if classifier.is_degraded() {
        tracing::warn!("⚠️ Running without a reference dataset; known-site rules are disabled");
    }

    match config.command {
        Command::Classify {
            source,
            medium,
            campaign,
            expected,
            explain,
        } => {
            let rule = classifier.matching_rule(&source, &medium, &campaign);
            println!("{}", rule.channel);
            if explain {
                println!("  {}", rule.description);
                println!("  Condition: {}", rule.condition);
            }
            if expected.is_some() {
                print_alignment(rule.channel, expected);
            }
        }
        Command::AnalyzeUrl { url, expected } => {
            let analysis = analyze_url(&classifier, &url)?;
            println!("utm_source:   {}", analysis.utm.source);
            println!("utm_medium:   {}", analysis.utm.medium);
            println!("utm_campaign: {}", analysis.utm.campaign);
            match analysis.outcome {
                AnalysisOutcome::MissingParameters => {
                    println!("⚠️ Missing utm_source and utm_medium; GA4 will report this visit by referrer");
                }
                AnalysisOutcome::Classified { channel } => {
                    println!("Predicted channel: {}", channel);
                    if analysis.is_unassigned() {
                        println!("⚠️ These values do not match any default channel definition");
                    }
                    if expected.is_some() {
                        print_alignment(channel, expected);
                    }
                }
            }
        }
        Command::SuggestSources { channel, filter } => {
            for source in classifier.suggestions().suggest_sources(channel, &filter) {
                println!("{}", source);
            }
        }
        Command::SuggestMediums {
            source,
            channel,
            filter,
        } => {
            for medium in classifier.suggestions().suggest_mediums(&source, channel, &filter) {
                println!("{}", medium);
            }
        }
        Command::Batch(args) => {
            let job = args.into_job();
            let pipeline =
                CsvClassificationPipeline::new(LocalStorage::current_dir(), job, classifier);
            let report = EtlEngine::new(pipeline).run().await?;

            println!("✅ Classified {} rows", report.summary.classified_rows);
            for (channel, count) in &report.summary.channel_counts {
                println!("  {:<28} {}", channel, count);
            }
            if report.summary.skipped_rows > 0 {
                println!("⚠️ Skipped {} rows with unreadable URLs", report.summary.skipped_rows);
            }
            println!("📁 Output saved to: {}", report.output_path);
        }
        Command::Channels | Command::BuildUrl(_) => {}
    }

    Ok(())
}

fn print_alignment(predicted: Channel, expected: Option<Channel>) {
    match check_alignment(predicted, expected) {
        Alignment::Aligned => println!("✅ Matches the expected channel"),
        Alignment::Mismatch => println!(
            "❌ Expected {}, but these values classify as {}",
            expected.map(|c| c.to_string()).unwrap_or_default(),
            predicted
        ),
        Alignment::Unassigned => println!("⚠️ Expected channel cannot be reached: values are Unassigned"),
        Alignment::NoExpectation => {}
    }
}

fn print_channels() {
    for channel in Channel::sorted_by_label() {
        let rule = channel_rule(channel);
        println!("{}", channel);
        println!("  {}", rule.description);
        println!("  Condition: {}", rule.condition);
    }
}

fn build_url(args: BuildUrlArgs) -> Result<(), EtlError> {
    let optional = [
        (UtmField::Content, args.content),
        (UtmField::Term, args.term),
        (UtmField::Id, args.id),
        (UtmField::SourcePlatform, args.source_platform),
        (UtmField::CreativeFormat, args.creative_format),
        (UtmField::MarketingTactic, args.marketing_tactic),
    ];

    let mut builder = CampaignUrlBuilder::new(args.base_url)
        .source(args.source)
        .medium(args.medium)
        .campaign(args.campaign)
        .force_lowercase(args.lowercase);
    for (field, value) in optional {
        if let Some(value) = value {
            builder = builder.param(field, value);
        }
    }

    for field in builder.space_warnings() {
        eprintln!("⚠️ {} contains spaces; consider '-' or '_' instead", field);
    }

    println!("{}", builder.build()?);
    Ok(())
}
