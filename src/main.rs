use anyhow::Context;
use clap::Parser;
use social_scout::domain::model::Platform;
use social_scout::domain::ports::MediaSource;
use social_scout::render::render_key_values;
use social_scout::utils::error::{ErrorSeverity, ScoutError};
use social_scout::utils::{logger, validation::Validate};
use social_scout::{
    CliConfig, EtlEngine, HikerClient, InstagramSource, LamatokClient, LocalStorage, Profile,
    ScrapePipeline, ScrapeRequest, TikTokSource,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = CliConfig::parse();

    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting social-scout");
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = run(&config).await {
        let exit_code = match e.downcast_ref::<ScoutError>() {
            Some(err) => {
                tracing::error!(
                    "❌ Run failed: {:#} (Category: {:?}, Severity: {:?})",
                    e,
                    err.category(),
                    err.severity()
                );
                eprintln!("❌ {}", err.user_friendly_message());
                eprintln!("💡 Suggestion: {}", err.recovery_suggestion());
                match err.severity() {
                    ErrorSeverity::Low => 0,
                    ErrorSeverity::Medium => 2,
                    ErrorSeverity::High => 1,
                    ErrorSeverity::Critical => 3,
                }
            }
            None => {
                tracing::error!("❌ Run failed: {:#}", e);
                eprintln!("❌ {:#}", e);
                1
            }
        };

        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn run(config: &CliConfig) -> anyhow::Result<()> {
    let profile = match &config.profile {
        Some(path) => Profile::from_file(path)
            .with_context(|| format!("Failed to load profile {}", path))?,
        None => Profile::from_env(),
    };
    profile.validate()?;

    if let Some(username) = &config.inspect_user {
        return inspect_user(&profile, username).await;
    }

    let request = config.to_request()?;
    for invalid in &request.invalid_targets {
        tracing::warn!(target_input = %invalid, "Ignoring invalid hashtag");
        eprintln!("⚠️  Ignoring invalid hashtag: {}", invalid);
    }
    request.validate()?;

    match request.platform {
        Platform::Instagram => {
            let ig = &profile.instagram;
            let client = HikerClient::new(&ig.base_url, ig.token()?, ig.timeout())?;
            scrape(InstagramSource::new(client), request).await
        }
        Platform::TikTok => {
            let tt = &profile.tiktok;
            let client = LamatokClient::new(&tt.base_url, tt.access_key()?, tt.timeout())?;
            scrape(TikTokSource::new(client), request).await
        }
    }
}

async fn scrape<M: MediaSource>(source: M, request: ScrapeRequest) -> anyhow::Result<()> {
    let storage = LocalStorage::new(request.output_path.clone());
    let engine = EtlEngine::new(ScrapePipeline::new(storage, source, request));

    let report = engine.run().await?;
    println!("{}", report.table);

    if report.is_empty() {
        return Ok(());
    }

    println!();
    println!(
        "✅ {} posts kept ({} fetched, {} requests, feed: {})",
        report.rows,
        report.meta.total_fetched,
        report.meta.total_requests,
        report.meta.effective_feed
    );
    if report.meta.fallback_used {
        println!("↪️  Top feed ran short, filled up from recent");
    }
    for path in &report.outputs {
        println!("📁 Saved to: {}", path);
    }
    if !report.meta.failures.is_empty() {
        eprintln!("⚠️  {} target(s) failed", report.meta.failures.len());
    }

    Ok(())
}

async fn inspect_user(profile: &Profile, username: &str) -> anyhow::Result<()> {
    let ig = &profile.instagram;
    let client = HikerClient::new(&ig.base_url, ig.token()?, ig.timeout())?;
    let username = username.trim().trim_start_matches('@');

    let details = client.user_details(username).await?;
    println!("{}", render_key_values(&details.profile));
    println!();
    println!(
        "Sampled {} posts and {} reels from the first page",
        details.posts_count, details.reels_count
    );
    Ok(())
}
