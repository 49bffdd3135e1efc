use color_eyre::Result;
use pipeline::Pipeline;
use tracing::info;

mod capture;
mod configuration;
mod export;
mod image_processing;
mod pipeline;
mod sentiment;
mod server;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt().compact().init();
    info!("starting up");

    let configuration = configuration::load()?;
    std::fs::create_dir_all(&configuration.artifacts_directory)?;

    let pipeline = Pipeline::new(configuration.clone())?;
    server::start(configuration, pipeline).await?;

    Ok(())
}
