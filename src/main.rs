mod config;
mod event;
mod gates;
mod github;
mod reviews;

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;
use gates::{HandlerError, PullHandler, SkipAuthors, SkipIfExcluded};
use github::{GitHubClient, PullRequest};
use reviews::{Produce, RawReviews, UniqueReviews, WithComments};

/// review-collector — one-shot job that rebuilds a normalized, de-duplicated
/// view of every review on a pull request, ready for downstream scoring.
#[derive(Parser, Debug)]
#[command(name = "review-collector", version, about)]
struct Cli {
    /// Path to the triggering event payload (JSON)
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    event: PathBuf,

    /// Optional output file for the aggregated JSON document (stdout by default)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Post a short collection summary back to the pull request
    #[arg(long)]
    post: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!("loading configuration");
    let config = Config::load()?;

    info!(path = %cli.event.display(), "reading event payload");
    let event = event::Event::from_file(&cli.event)?;
    let actor = event.actor()?.to_string();
    let number = event.pull_number()?;
    info!(actor = %actor, pull = number, "event received");

    let client = GitHubClient::new(&config.repository, &config.token);

    let pull = event::resolve_pull(&client, number).await?;
    info!(pull = pull.number, title = %pull.title, "pull request found");

    let pipeline = CollectReviews {
        client,
        min_lines: config.min_lines,
        output: cli.output,
        post: cli.post,
    };
    SkipIfExcluded::new(SkipAuthors::new(config.skip_authors), pipeline)
        .exec(&pull, &actor)
        .await?;

    Ok(())
}

/// The pipeline behind the author gate: change-size check, review fetching,
/// de-duplication, aggregation, serialization.
struct CollectReviews {
    client: GitHubClient,
    min_lines: u64,
    output: Option<PathBuf>,
    post: bool,
}

#[async_trait::async_trait]
impl PullHandler for CollectReviews {
    async fn handle(&self, pull: &PullRequest, _actor: &str) -> Result<(), HandlerError> {
        if self.min_lines != 0 {
            // The list endpoint omits additions/deletions, so the gate needs
            // one dedicated fetch. Skipping here avoids all review fetching.
            let detailed = self.client.pull(pull.number).await?;
            let changes = gates::changed_lines(&detailed);
            if gates::below_minimum(changes, self.min_lines) {
                info!(
                    pull = pull.number,
                    changes,
                    min = self.min_lines,
                    "skipping pull request, changes below minimum"
                );
                return Ok(());
            }
        }

        info!("collecting reviews");
        let dataset = WithComments::new(
            UniqueReviews::new(RawReviews::new(self.client.clone(), pull.number)),
            self.client.clone(),
            pull.number,
            Arc::new(reviews::authored),
        )
        .produce()
        .await?;
        info!(reviews = dataset.len(), "reviews collected");

        let encoded = serde_json::to_string_pretty(&dataset)?;
        match &self.output {
            Some(path) => std::fs::write(path, &encoded)?,
            None => println!("{encoded}"),
        }

        if self.post {
            let summary = format!(
                "Collected {} review(s) on pull request #{}.",
                dataset.len(),
                pull.number
            );
            self.client
                .create_issue_comment(pull.number, &summary)
                .await?;
            info!("posted collection summary");
        }
        Ok(())
    }
}
