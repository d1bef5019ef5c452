mod api;
mod server;

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use viralscope::config::AppConfig;
use viralscope::error::AnalysisError;
use viralscope::pipeline::Analyzer;
use viralscope::platforms::{PlatformClient, VkClient, XClient, YouTubeClient};
use viralscope::scoring::ViralityScorer;
use viralscope::trends::TrendsAnalyzer;
use viralscope::{format_float, format_number, Platform};

#[derive(Parser)]
#[command(name = "viralscope", about = "Cross-platform engagement analyzer")]
struct Cli {
    /// Path to a TOML config file; defaults to config/viralscope.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    Analyze(AnalyzeArgs),
    Trends(TrendsArgs),
    Serve(ServeArgs),
}

#[derive(Args, Debug, Clone)]
struct AnalyzeArgs {
    /// Platform to query: youtube, x or vk.
    #[arg(long, default_value = "youtube")]
    platform: String,
    #[arg(long)]
    keyword: String,
    #[arg(long, default_value = "US")]
    region: String,
    #[arg(long, default_value_t = 5)]
    max_posts: u32,
    #[arg(long, default_value_t = 0)]
    min_subs: u64,
    #[arg(long, default_value_t = 0)]
    min_vids: u64,
}

#[derive(Args, Debug, Clone)]
struct TrendsArgs {
    #[arg(long, default_value = "US")]
    region: String,
    #[arg(long)]
    max_results: Option<u32>,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,
    #[arg(long, default_value_t = 8787)]
    pub port: u16,
}

#[tokio::main]
async fn main() {
    load_dotenv();
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let cli = Cli::parse();
    let (config, _path) = AppConfig::load(cli.config)?;

    match cli.command {
        Command::Analyze(args) => run_analyze(args, config).await,
        Command::Trends(args) => run_trends(args, config).await,
        Command::Serve(args) => server::serve(args, config).await,
    }
}

async fn run_analyze(args: AnalyzeArgs, config: AppConfig) -> Result<(), String> {
    let platform = Platform::from_str(&args.platform)
        .ok_or_else(|| format!("unknown platform: {}", args.platform))?;

    let client: Box<dyn PlatformClient> = match platform {
        Platform::YouTube => Box::new(YouTubeClient::from_env().map_err(|err| err.to_string())?),
        Platform::X => Box::new(XClient::from_env().map_err(|err| err.to_string())?),
        Platform::Vk => Box::new(VkClient::from_env().map_err(|err| err.to_string())?),
    };

    let analyzer = Analyzer::new(
        ViralityScorer::new(config.scoring.clone()),
        config.search.candidate_pool,
    );

    let params = viralscope::AnalysisParams {
        query: args.keyword.trim().to_string(),
        region: args.region.trim().to_uppercase(),
        max_posts: args.max_posts.clamp(1, 50),
        min_subscribers: args.min_subs,
        min_content_count: args.min_vids,
    };

    let mut accounts = match analyzer.run(client.as_ref(), &params).await {
        Ok(accounts) => accounts,
        Err(err @ AnalysisError::NoCandidates) | Err(err @ AnalysisError::NoneMatchedFilters) => {
            println!("{}", err);
            return Ok(());
        }
        Err(err) => return Err(err.to_string()),
    };

    accounts.sort_by(|a, b| {
        b.virality_score
            .partial_cmp(&a.virality_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    println!(
        "Found {} competitors for \"{}\" on {}:\n",
        accounts.len(),
        params.query,
        platform.label()
    );

    for (rank, account) in accounts.iter().enumerate() {
        println!("{}. {}", rank + 1, account.title);
        println!(
            "   subscribers: {} | posts analyzed: {} | avg views: {}",
            format_number(account.subscribers),
            account.posts.len(),
            format_number(account.avg_views as u64)
        );
        println!(
            "   virality score: {}",
            format_float(account.virality_score, 2)
        );
        for post in &account.posts {
            println!(
                "   - [{}] {} ({})",
                format_float(post.virality_score, 2),
                post.title,
                post.link
            );
        }
        println!();
    }

    Ok(())
}

async fn run_trends(args: TrendsArgs, config: AppConfig) -> Result<(), String> {
    let client = YouTubeClient::from_env().map_err(|err| err.to_string())?;
    let analyzer = TrendsAnalyzer::new(ViralityScorer::new(config.scoring.clone()));
    let region = args.region.trim().to_uppercase();
    let max_results = args.max_results.unwrap_or(config.search.trending_pool);

    let videos = match analyzer.run(&client, &region, max_results).await {
        Ok(videos) => videos,
        Err(err @ AnalysisError::NoCandidates) => {
            println!("{}", err);
            return Ok(());
        }
        Err(err) => return Err(err.to_string()),
    };

    println!("Trending in {} ({} videos):\n", region, videos.len());
    for (rank, video) in videos.iter().enumerate() {
        println!(
            "{}. [{}] {}",
            rank + 1,
            format_float(video.virality_score, 2),
            video.title
        );
        println!(
            "   {} | views: {} | likes: {} | comments: {}",
            video.channel.title,
            format_number(video.metrics.views),
            format_number(video.metrics.likes),
            format_number(video.metrics.comments)
        );
        println!("   {}", video.link);
    }

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

fn load_dotenv() {
    let _ = dotenvy::dotenv();
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let manifest_path = Path::new(manifest_dir).join(".env");
    let _ = dotenvy::from_path(manifest_path);
}
