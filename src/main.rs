use anyhow::Context;
use image_translate_client::{
    AppConfig, CandidateFile, CopyTarget, UploadWorkflow, ValidationVerdict, WorkflowState,
};
use std::env;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const USAGE: &str = "Usage: image-translate [--config <config.toml>] <image>";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();

    let (config, image_path) = match args.as_slice() {
        [flag, config, image] if flag == "--config" => (
            AppConfig::load_from_file(config)
                .with_context(|| format!("failed loading config {}", config))?,
            image.as_str(),
        ),
        [image] => (
            AppConfig::load_if_present("config.toml").context("failed loading config.toml")?,
            image.as_str(),
        ),
        _ => anyhow::bail!(USAGE),
    };

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(&config.logging.level))?,
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!(endpoint = %config.upload.endpoint_url, "Loaded configuration");

    let workflow = UploadWorkflow::from_config(&config.upload)?;
    let file = CandidateFile::from_path(image_path).await?;

    if let ValidationVerdict::Rejected(reason) = workflow.validate(&file) {
        anyhow::bail!("{}", reason);
    }

    workflow.submit(file).settled().await;

    match workflow.current_state() {
        WorkflowState::Succeeded(result) => {
            println!("Source text:\n{}\n", result.text(CopyTarget::Source));
            println!("Translation:\n{}", result.text(CopyTarget::Translation));
            Ok(())
        }
        WorkflowState::Failed(err) => Err(err.into()),
        other => anyhow::bail!("upload ended in unexpected state '{}'", other.label()),
    }
}
