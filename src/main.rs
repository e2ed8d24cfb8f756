use clap::Parser;
use country_tally::adapters::progress::{BarProgress, TracingProgress};
use country_tally::core::{Progress, ProgressObserver, Storage};
use country_tally::report;
use country_tally::utils::error::ErrorSeverity;
use country_tally::utils::logger;
use country_tally::{CliConfig, LocalStorage, StripeCustomerSource, TallyEngine, TallyError};

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting country-tally");

    if let Err(e) = run(&config).await {
        tracing::error!(
            "❌ Tally failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        // 依嚴重程度決定退出碼
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

async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

async fn run(config: &CliConfig) -> Result<(), TallyError> {
    let settings = config.load_settings()?;
    tracing::debug!("Resolved settings: {:?}", settings);

    let source = StripeCustomerSource::from_config(&settings);
    let engine = TallyEngine::from_config(source, &settings);

    // JSON 日誌模式不畫進度條
    let bar = BarProgress::new(settings.limit, !(config.no_progress || config.log_json));
    let logged = TracingProgress::new();
    let observer = |p: Progress| {
        bar.on_progress(p);
        logged.on_progress(p);
    };

    // Ctrl-C 時立即放棄進行中的請求
    let result = engine.run_until(&observer, interrupted()).await;
    bar.finish();
    let result = result?;

    let rendered = report::render(&result, &settings.render)?;

    match &settings.output_dir {
        Some(dir) => {
            let file_name = settings.render.format.file_name();
            let storage = LocalStorage::new(dir.clone());
            storage.write_file(&file_name, rendered.as_bytes()).await?;
            tracing::info!("📁 Report saved to: {}/{}", dir, file_name);
            println!("✅ Tallied {} customers", result.total);
            println!("📁 Report saved to: {}/{}", dir, file_name);
        }
        None => println!("{}", rendered),
    }

    Ok(())
}
