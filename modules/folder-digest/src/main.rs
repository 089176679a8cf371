use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use ai_client::OpenRouter;
use anyhow::Result;
use clap::Parser;
use drive_client::DriveClient;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use folder_digest::fetcher::FolderLister;
use folder_digest::report::print_report;
use folder_digest::{
    ChatPayloadBuilder, Config, FileFetcher, ManifestFolderLister, PayloadEncoder, Pipeline,
    StaticFolderLister, SummaryClient, SummaryResult,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Parser)]
#[command(name = "folder-digest")]
#[command(about = "Download a shared folder's files and summarize them with an LLM")]
#[command(version)]
struct Cli {
    /// Shared folder link (overrides DRIVE_FOLDER_URL)
    #[arg(long)]
    folder: Option<String>,

    /// Where downloaded files are written (overrides DOWNLOAD_DIR)
    #[arg(long)]
    download_dir: Option<PathBuf>,

    /// Result JSON path (overrides SUMMARY_OUTPUT)
    #[arg(long)]
    output: Option<PathBuf>,

    /// OpenRouter model id (overrides OPENROUTER_MODEL)
    #[arg(long)]
    model: Option<String>,

    /// JSON file listing `{"filename", "file_id"}` entries (overrides DRIVE_MANIFEST)
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// Print the report without writing the result file
    #[arg(long)]
    no_save: bool,
}

impl Cli {
    fn apply(&self, config: &mut Config) {
        if let Some(folder) = &self.folder {
            config.folder_url = folder.clone();
        }
        if let Some(dir) = &self.download_dir {
            config.download_dir = dir.clone();
        }
        if let Some(output) = &self.output {
            config.output_path = output.clone();
        }
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(manifest) = &self.manifest {
            config.manifest_path = Some(manifest.clone());
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(e) => {
            error!(error = ?e, "Unexpected failure");
            eprintln!("Error: {e}. See the log for details.");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("folder_digest=info".parse()?)
                .add_directive("drive_client=info".parse()?)
                .add_directive("ai_client=info".parse()?),
        )
        .init();

    info!("Folder digest starting...");

    let mut config = Config::from_env();
    cli.apply(&mut config);
    config.log_redacted();

    let pipeline = build_pipeline(&config);
    let result = pipeline.run(&config.folder_url).await;

    print_report(&result);

    match &result {
        SummaryResult::Success(_) if cli.no_save => {
            info!("Skipping result file (--no-save)");
        }
        SummaryResult::Success(_) => {
            if let Err(e) = result.save(&config.output_path) {
                error!(error = %e, "Could not save results");
                eprintln!("Error: {e}");
                return Ok(ExitCode::FAILURE);
            }
            println!("\nResults saved to {}", config.output_path.display());
        }
        SummaryResult::Failure(_) => return Ok(ExitCode::FAILURE),
    }

    Ok(ExitCode::SUCCESS)
}

fn build_pipeline(config: &Config) -> Pipeline {
    let lister: Arc<dyn FolderLister> = match &config.manifest_path {
        Some(path) => Arc::new(ManifestFolderLister::new(path)),
        None => Arc::new(StaticFolderLister::default()),
    };
    let fetcher = FileFetcher::new(lister, Arc::new(DriveClient::new()));

    let transport = OpenRouter::new(&config.api_key, &config.model)
        .with_base_url(&config.base_url)
        .with_app_name(&config.app_name)
        .with_site_url(&config.site_url)
        .with_timeout(REQUEST_TIMEOUT);
    let summarizer = SummaryClient::new(
        Arc::new(transport),
        ChatPayloadBuilder::new(&config.language),
    );

    Pipeline::new(
        Arc::new(fetcher),
        Arc::new(PayloadEncoder::new()),
        Arc::new(summarizer),
        &config.download_dir,
    )
}
