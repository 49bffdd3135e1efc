use thiserror::Error;
use tracing::{info, instrument};

use crate::capture::{CaptureError, CaptureRequest, RenderCapture, ScreenshotArtifact};
use crate::configuration::Configuration;
use crate::image_processing::ocr::{RecognitionError, TextRecognizer};
use crate::image_processing::preprocess::{self, PreprocessError};
use crate::sentiment;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to render the post: {0}")]
    Render(#[from] CaptureError),
    #[error("failed to decode the captured image: {0}")]
    ImageDecode(#[from] PreprocessError),
    #[error("text recognition failed: {0}")]
    Recognition(#[from] RecognitionError),
    /// The screenshot decoded and recognition ran, but no text came out.
    /// Distinct from [`PipelineError::Recognition`]: this one gets a user
    /// message, that one a diagnostic.
    #[error("no text found in the screenshot")]
    NoTextFound,
}

/// Terminal output of a successful run.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub text: String,
    /// Polarity in [-1.0, 1.0].
    pub sentiment: f32,
    pub screenshot: ScreenshotArtifact,
}

/// Sequences capture → preprocess → recognize → score.
pub struct Pipeline {
    capture: RenderCapture,
    recognizer: TextRecognizer,
}

impl Pipeline {
    pub fn new(configuration: Configuration) -> Result<Self, RecognitionError> {
        let recognizer = TextRecognizer::new(&configuration)?;
        Ok(Self {
            capture: RenderCapture::new(configuration),
            recognizer,
        })
    }

    /// Run the full pipeline for one post URL.
    ///
    /// Stages run strictly in order and the first failure aborts the rest;
    /// no partial result is returned. A screenshot already written to disk
    /// stays there when a later stage fails — the capture is the expensive
    /// part, and the file is what you want when recognition misbehaves.
    #[instrument(skip(self))]
    pub async fn invoke(&self, url: &str) -> Result<PipelineResult, PipelineError> {
        let request = CaptureRequest::new(url)?;
        let screenshot = self.capture.capture(&request).await?;
        let normalized = preprocess::normalize(&screenshot.png)?;
        let text = require_text(self.recognizer.extract_text(&normalized)?)?;
        let sentiment = sentiment::polarity(&text);
        info!(sentiment, "pipeline finished for post {}", screenshot.post_id);

        Ok(PipelineResult {
            text,
            sentiment,
            screenshot,
        })
    }
}

/// Empty recognition output terminates the run: a sentiment score is only
/// ever computed over actual text, never defaulted to neutral.
fn require_text(text: String) -> Result<String, PipelineError> {
    if text.trim().is_empty() {
        Err(PipelineError::NoTextFound)
    } else {
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_is_no_text_found() {
        assert!(matches!(
            require_text(String::new()),
            Err(PipelineError::NoTextFound)
        ));
    }

    #[test]
    fn whitespace_only_text_is_no_text_found() {
        assert!(matches!(
            require_text("  \n\t ".to_owned()),
            Err(PipelineError::NoTextFound)
        ));
    }

    #[test]
    fn real_text_passes_through_unchanged() {
        assert_eq!(require_text("I love this!".to_owned()).unwrap(), "I love this!");
    }

    #[test]
    fn capture_errors_map_to_the_render_stage() {
        let error = PipelineError::from(CaptureError::BrowserConfig("bad".to_owned()));
        assert!(matches!(error, PipelineError::Render(_)));
        assert!(error.to_string().starts_with("failed to render"));
    }

    #[test]
    fn no_text_found_reads_differently_from_an_engine_fault() {
        let no_text = PipelineError::NoTextFound.to_string();
        let fault = PipelineError::Recognition(RecognitionError::Engine("boom".to_owned()));
        assert_ne!(no_text, fault.to_string());
    }
}
