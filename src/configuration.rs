use std::net::SocketAddr;
use std::time::Duration;

use camino::Utf8PathBuf;
use color_eyre::Result;
use config::Config;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Configuration {
    /// The directory where screenshots and export files are stored.
    #[serde(default = "default_artifacts_directory")]
    pub artifacts_directory: Utf8PathBuf,
    /// The address the HTTP server listens on.
    #[serde(default = "default_listen_address")]
    pub listen_address: SocketAddr,
    /// How long to wait for the post container to show up, in milliseconds.
    #[serde(default = "default_content_ready_timeout_ms")]
    pub content_ready_timeout_ms: u64,
    /// Extra wait after the post appears so comments finish loading, in milliseconds.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    /// Run the browser without a visible window. Off by default: Instagram's
    /// bot detection behaves differently under headless Chrome.
    #[serde(default)]
    pub headless: bool,
    /// Browser viewport width in pixels.
    #[serde(default = "default_viewport_width")]
    pub viewport_width: u32,
    /// Browser viewport height in pixels.
    #[serde(default = "default_viewport_height")]
    pub viewport_height: u32,
    /// Path to the ocrs text detection model.
    #[serde(default = "default_detection_model")]
    pub detection_model: Utf8PathBuf,
    /// Path to the ocrs text recognition model.
    #[serde(default = "default_recognition_model")]
    pub recognition_model: Utf8PathBuf,
}

impl Configuration {
    pub fn content_ready_timeout(&self) -> Duration {
        Duration::from_millis(self.content_ready_timeout_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

fn default_artifacts_directory() -> Utf8PathBuf {
    Utf8PathBuf::from("static/images")
}

fn default_listen_address() -> SocketAddr {
    ([127, 0, 0, 1], 5000).into()
}

fn default_content_ready_timeout_ms() -> u64 {
    10_000
}

fn default_settle_delay_ms() -> u64 {
    5_000
}

fn default_viewport_width() -> u32 {
    1920
}

fn default_viewport_height() -> u32 {
    1080
}

fn default_detection_model() -> Utf8PathBuf {
    Utf8PathBuf::from("models/text-detection.rten")
}

fn default_recognition_model() -> Utf8PathBuf {
    Utf8PathBuf::from("models/text-recognition.rten")
}

pub fn load() -> Result<Configuration> {
    let settings = Config::builder()
        .add_source(config::File::with_name("vibecheck").required(false))
        .add_source(config::Environment::with_prefix("VIBECHECK"))
        .build()?;

    settings.try_deserialize().map_err(From::from)
}
