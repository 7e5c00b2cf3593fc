//! CLI for seqvid - keyframe-sequence video generation.

use clap::{Args, Parser, Subcommand};
use seqvid::{
    ClientConfig, ImageUpload, JobClient, JobClientBuilder, JobService, JobServiceExt,
    JobStatusReport, JobSubmission,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "seqvid")]
#[command(about = "Generate a video from an ordered sequence of 2-6 images")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Service base URL (overrides SEQVID_API_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit images for video generation
    Submit(SubmitArgs),

    /// Query the status of a job
    Status(StatusArgs),

    /// Block until a job finishes (the service does the waiting)
    Wait(WaitArgs),

    /// Check that the service is up
    Health,
}

#[derive(Args)]
struct SubmitArgs {
    /// Keyframe images, in playback order
    #[arg(required = true, num_args = 1..)]
    images: Vec<PathBuf>,

    /// Text prompt describing the transition
    #[arg(short, long)]
    prompt: Option<String>,

    /// Wait for the job to finish after submitting
    #[arg(short, long)]
    wait: bool,

    /// Save the finished video here (implies --wait)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct StatusArgs {
    /// Job identifier returned by submit
    job_id: String,

    /// Keep polling until the job is finished
    #[arg(long)]
    watch: bool,

    /// Seconds between polls when watching
    #[arg(long, default_value_t = 5)]
    interval: u64,

    /// Give up watching after this many seconds
    #[arg(long, default_value_t = 600)]
    timeout: u64,
}

#[derive(Args)]
struct WaitArgs {
    /// Job identifier returned by submit
    job_id: String,

    /// Save the finished video here
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seqvid=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let client = build_client(cli.base_url.as_deref())?;

    match cli.command {
        Commands::Submit(args) => submit(&client, args, cli.json).await?,
        Commands::Status(args) => status(&client, args, cli.json).await?,
        Commands::Wait(args) => wait(&client, args, cli.json).await?,
        Commands::Health => health(&client, cli.json).await?,
    }

    Ok(())
}

fn build_client(base_url: Option<&str>) -> anyhow::Result<JobClient> {
    let builder = match base_url {
        Some(url) => JobClient::builder().config(ClientConfig::new(url)?),
        None => JobClientBuilder::from_env()?,
    };
    let client = builder.build()?;
    tracing::info!(base_url = %client.base_url(), "using service");
    Ok(client)
}

async fn submit(client: &JobClient, args: SubmitArgs, json_output: bool) -> anyhow::Result<()> {
    let images = args
        .images
        .iter()
        .map(|path| ImageUpload::from_path(path))
        .collect::<seqvid::Result<Vec<_>>>()?;

    let mut submission = JobSubmission::new(images);
    if let Some(prompt) = args.prompt {
        submission = submission.with_prompt(prompt);
    }

    let job = client.submit_job(&submission).await?;

    if !args.wait && args.output.is_none() {
        if json_output {
            println!("{}", serde_json::to_string_pretty(&job)?);
        } else {
            println!("Submitted job: {} ({})", job.job_id, job.status);
            if let Some(message) = job.message().filter(|m| !m.is_empty()) {
                println!("{message}");
            }
        }
        return Ok(());
    }

    if !json_output {
        eprintln!("Submitted job {}, waiting for completion...", job.job_id);
    }
    let done = client.wait_for_completion(&job.job_id).await?;
    finish(client, &done, args.output.as_deref(), json_output).await
}

async fn status(client: &JobClient, args: StatusArgs, json_output: bool) -> anyhow::Result<()> {
    let report = if args.watch {
        client
            .poll_until_terminal(
                &args.job_id,
                Duration::from_secs(args.interval.max(1)),
                Duration::from_secs(args.timeout),
            )
            .await?
    } else {
        client.job_status(&args.job_id).await?
    };

    print_report(&report, json_output)
}

async fn wait(client: &JobClient, args: WaitArgs, json_output: bool) -> anyhow::Result<()> {
    let done = client.wait_for_completion(&args.job_id).await?;
    finish(client, &done, args.output.as_deref(), json_output).await
}

async fn health(client: &JobClient, json_output: bool) -> anyhow::Result<()> {
    client.health_check().await?;
    if json_output {
        println!("{}", serde_json::json!({ "status": "healthy" }));
    } else {
        println!("Service at {} is healthy", client.base_url());
    }
    Ok(())
}

async fn finish(
    client: &JobClient,
    report: &JobStatusReport,
    output: Option<&Path>,
    json_output: bool,
) -> anyhow::Result<()> {
    print_report(report, json_output)?;

    let Some(output) = output else {
        return Ok(());
    };
    let Some(video_url) = report.video_url() else {
        anyhow::bail!(
            "job {} finished with status {} and no video",
            report.job_id,
            report.status
        );
    };

    let video = client.download_video(video_url).await?;
    video.save(output)?;
    if !json_output {
        println!(
            "Saved video: {} ({} bytes)",
            output.display(),
            video.size()
        );
    }
    Ok(())
}

fn print_report(report: &JobStatusReport, json_output: bool) -> anyhow::Result<()> {
    if json_output {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!("Job {}: {}", report.job_id, report.status);
    if let Some(message) = report.message() {
        println!("{message}");
    }
    if let Some(url) = report.video_url() {
        println!("Video: {url}");
    }
    Ok(())
}
