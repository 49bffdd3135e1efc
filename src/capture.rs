use std::time::Duration;

use camino::Utf8PathBuf;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::error::CdpError;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::page::{Page, ScreenshotParams};
use futures::StreamExt;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};
use url::Url;

use crate::configuration::Configuration;

/// CSS selector for the main post container.
const POST_CONTAINER_SELECTOR: &str = "article";

const READY_POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("invalid post URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("invalid browser configuration: {0}")]
    BrowserConfig(String),
    #[error("failed to launch browser: {0}")]
    Launch(#[source] CdpError),
    #[error("failed to navigate to {url}: {source}")]
    Navigation {
        url: String,
        #[source]
        source: CdpError,
    },
    #[error("content not ready after {timeout:?}")]
    ContentNotReady { timeout: Duration },
    #[error("failed to capture screenshot: {0}")]
    Screenshot(#[source] CdpError),
    #[error("failed to write screenshot to {path}: {source}")]
    WriteArtifact {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A validated request to capture one post.
#[derive(Debug, Clone)]
pub struct CaptureRequest {
    url: Url,
    post_id: String,
}

impl CaptureRequest {
    pub fn new(url: &str) -> Result<Self, CaptureError> {
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err(CaptureError::InvalidUrl {
                url: url.to_owned(),
                reason: "empty URL".to_owned(),
            });
        }
        let url = Url::parse(trimmed).map_err(|e| CaptureError::InvalidUrl {
            url: trimmed.to_owned(),
            reason: e.to_string(),
        })?;
        let post_id = derive_post_id(&url)?;
        Ok(Self { url, post_id })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The stable identifier the artifact path is keyed by.
    pub fn post_id(&self) -> &str {
        &self.post_id
    }
}

/// Derive the post identifier from the URL: the last non-empty path segment
/// (the segment before the trailing slash on a canonical post URL).
fn derive_post_id(url: &Url) -> Result<String, CaptureError> {
    let invalid = |reason: &str| CaptureError::InvalidUrl {
        url: url.to_string(),
        reason: reason.to_owned(),
    };

    let segment = url
        .path_segments()
        .and_then(|mut segments| segments.rev().find(|segment| !segment.is_empty()))
        .ok_or_else(|| invalid("no path segments to derive a post id from"))?;

    // The id becomes part of a filename, so only allow shortcode characters.
    if segment
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
    {
        Ok(segment.to_owned())
    } else {
        Err(invalid("path segment is not a valid post id"))
    }
}

/// The saved screenshot of one rendered post.
#[derive(Debug, Clone)]
pub struct ScreenshotArtifact {
    pub post_id: String,
    /// Where the PNG was written. Deterministic per post id, so re-running
    /// the same URL overwrites instead of accumulating files.
    pub path: Utf8PathBuf,
    pub png: Vec<u8>,
}

impl ScreenshotArtifact {
    pub fn filename(&self) -> &str {
        self.path.file_name().unwrap_or(self.post_id.as_str())
    }
}

/// Drives the browser for a single capture: navigate, wait for the post to
/// render, let the comments settle, screenshot.
///
/// Each call to [`RenderCapture::capture`] owns an isolated browser session
/// which is torn down before the call returns, on every path.
pub struct RenderCapture {
    configuration: Configuration,
}

impl RenderCapture {
    pub fn new(configuration: Configuration) -> Self {
        Self { configuration }
    }

    pub fn artifact_path(&self, post_id: &str) -> Utf8PathBuf {
        self.configuration
            .artifacts_directory
            .join(format!("post_{post_id}.png"))
    }

    #[instrument(skip(self, request), fields(url = %request.url(), post_id = request.post_id()))]
    pub async fn capture(&self, request: &CaptureRequest) -> Result<ScreenshotArtifact, CaptureError> {
        let (mut browser, handler_task) = self.launch().await?;
        let result = self.capture_with_browser(&browser, request).await;

        // The session must be released no matter how the capture went.
        if let Err(error) = browser.close().await {
            warn!("failed to close browser cleanly: {error}");
        }
        let _ = browser.wait().await;
        handler_task.abort();

        result
    }

    async fn launch(&self) -> Result<(Browser, JoinHandle<()>), CaptureError> {
        let (width, height) = (
            self.configuration.viewport_width,
            self.configuration.viewport_height,
        );
        let mut builder = BrowserConfig::builder()
            .window_size(width, height)
            .viewport(Viewport {
                width,
                height,
                ..Viewport::default()
            });
        if !self.configuration.headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(CaptureError::BrowserConfig)?;

        let (browser, mut handler) = Browser::launch(config).await.map_err(CaptureError::Launch)?;
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        Ok((browser, handler_task))
    }

    async fn capture_with_browser(
        &self,
        browser: &Browser,
        request: &CaptureRequest,
    ) -> Result<ScreenshotArtifact, CaptureError> {
        let navigation_error = |source| CaptureError::Navigation {
            url: request.url().to_string(),
            source,
        };

        let page = browser
            .new_page(request.url().as_str())
            .await
            .map_err(navigation_error)?;
        page.wait_for_navigation().await.map_err(navigation_error)?;

        self.wait_for_content(&page).await?;

        // Comments load asynchronously after the post container appears, and
        // there is no reliable completion signal to wait on.
        tokio::time::sleep(self.configuration.settle_delay()).await;

        let png = page
            .screenshot(
                ScreenshotParams::builder()
                    .format(CaptureScreenshotFormat::Png)
                    .build(),
            )
            .await
            .map_err(CaptureError::Screenshot)?;

        let path = self.artifact_path(request.post_id());
        tokio::fs::write(&path, &png)
            .await
            .map_err(|source| CaptureError::WriteArtifact {
                path: path.clone(),
                source,
            })?;
        info!("captured {path} ({} bytes)", png.len());

        Ok(ScreenshotArtifact {
            post_id: request.post_id().to_owned(),
            path,
            png,
        })
    }

    /// Poll for the post container until it shows up or the deadline passes.
    async fn wait_for_content(&self, page: &Page) -> Result<(), CaptureError> {
        let timeout = self.configuration.content_ready_timeout();
        tokio::time::timeout(timeout, async {
            loop {
                if page.find_element(POST_CONTAINER_SELECTOR).await.is_ok() {
                    return;
                }
                tokio::time::sleep(READY_POLL_INTERVAL).await;
            }
        })
        .await
        .map_err(|_| CaptureError::ContentNotReady { timeout })
    }
}
