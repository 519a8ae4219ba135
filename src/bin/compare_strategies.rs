use clap::Parser;
use posts_proxy::core::PostWithComments;
use posts_proxy::utils::logger;
use posts_proxy::{
    AggregationMode, CliConfig, CommentAggregator, CountingSource, JsonPlaceholderClient,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Runs both comment aggregation strategies against the upstream and reports
/// how many calls and how much time each one needed.
#[derive(Debug, Parser)]
#[command(name = "compare_strategies")]
#[command(about = "Compare N+1 and batched comment aggregation against the upstream")]
struct Args {
    #[command(flatten)]
    service: CliConfig,

    #[arg(long, default_value_t = 1)]
    rounds: u32,
}

struct Measurement {
    posts: Vec<PostWithComments>,
    calls: usize,
    elapsed: Duration,
}

async fn measure(
    aggregator: &CommentAggregator,
    source: &CountingSource<JsonPlaceholderClient>,
    mode: AggregationMode,
) -> anyhow::Result<Measurement> {
    source.reset();
    let started = Instant::now();
    let aggregation = aggregator.run(mode).await?;

    Ok(Measurement {
        posts: aggregation.posts,
        calls: source.reset(),
        elapsed: started.elapsed(),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init_logger(args.service.verbose, args.service.json_logs);

    let config = args.service.resolve()?;
    let source = Arc::new(CountingSource::new(JsonPlaceholderClient::new(&config)?));
    let aggregator = CommentAggregator::new(source.clone(), config.aggregate_limit);

    println!(
        "🚀 Comparing strategies against {} (first {} posts)",
        config.upstream_base_url, config.aggregate_limit
    );

    for round in 1..=args.rounds {
        let fanned = measure(&aggregator, &source, AggregationMode::FanOut).await?;
        let batched = measure(&aggregator, &source, AggregationMode::Batched).await?;

        let comment_total: usize = batched.posts.iter().map(|p| p.comments.len()).sum();

        println!("── round {} ──", round);
        println!(
            "  n+1     : {:>3} calls, {:>6} ms",
            fanned.calls,
            fanned.elapsed.as_millis()
        );
        println!(
            "  batched : {:>3} calls, {:>6} ms",
            batched.calls,
            batched.elapsed.as_millis()
        );
        println!(
            "  {} posts, {} comments, results {}",
            batched.posts.len(),
            comment_total,
            if fanned.posts == batched.posts {
                "✅ identical"
            } else {
                "❌ differ"
            }
        );
    }

    Ok(())
}
