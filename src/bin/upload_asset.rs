use asset_uploader::client::{ClientConfig, Osc52Clipboard, SelectedFile, UploadClient, UploadForm, UploadResult};
use clap::Parser;
use dotenvy::dotenv;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about = "Upload a file to the asset uploader service", long_about = None)]
struct Args {
    /// File to upload
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Name to store the file under
    #[arg(short, long, default_value = "")]
    name: String,

    /// Server base URL (defaults to API_URL or http://127.0.0.1:3000)
    #[arg(short, long)]
    url: Option<String>,

    /// Request timeout in milliseconds (defaults to API_TIMEOUT or 30000)
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Copy the resulting URL to the clipboard
    #[arg(short, long)]
    copy: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "asset_uploader=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = ClientConfig::from_env();
    if let Some(url) = args.url {
        config.base_url = url;
    }
    if let Some(ms) = args.timeout_ms {
        config.timeout = Duration::from_millis(ms);
    }

    let client = UploadClient::new(&config)?;
    let mut form = UploadForm::new();
    form.set_file_name(args.name);

    if let Some(path) = &args.file {
        match SelectedFile::from_path(path).await {
            Ok(file) => {
                eprintln!("{}", file.summary());
                form.select_file(file);
            }
            Err(e) => {
                error!("Failed to read {}: {}", path.display(), e);
                eprintln!("❌ Could not read {}: {}", path.display(), e);
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    eprintln!("⏳ Uploading to {}...", client.upload_url());

    match form.submit(&client).await {
        UploadResult::Uploaded { url } => {
            println!("✅ Upload Successful!");
            println!("File URL: {}", url);

            if args.copy {
                form.copy_locator(&mut Osc52Clipboard::stdout());
                if form.copy_acknowledged() {
                    println!("📋 Copied!");
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        UploadResult::Failed { .. } => {
            let errors = form.errors();
            if let Some(msg) = &errors.file_name {
                eprintln!("❌ {}", msg);
            }
            if let Some(msg) = &errors.file {
                eprintln!("❌ {}", msg);
            }
            Ok(ExitCode::FAILURE)
        }
    }
}
