use camino::Utf8Path;
use image::GrayImage;
use ocrs::{ImageSource, OcrEngine, OcrEngineParams};
use thiserror::Error;
use tracing::instrument;

use crate::configuration::Configuration;

#[derive(Debug, Error)]
pub enum RecognitionError {
    #[error("failed to load OCR model {path}: {message}")]
    ModelLoad { path: String, message: String },
    #[error("OCR engine fault: {0}")]
    Engine(String),
}

/// Text recognition over preprocessed screenshots.
///
/// The ocrs engine runs full-page layout detection followed by line
/// recognition, which suits the paragraph-like blocks a post caption and its
/// stacked comments form. Both models load once, at construction.
pub struct TextRecognizer {
    engine: OcrEngine,
}

impl TextRecognizer {
    pub fn new(configuration: &Configuration) -> Result<Self, RecognitionError> {
        let mut params = OcrEngineParams::default();
        params.detection_model = Some(load_model(&configuration.detection_model)?);
        params.recognition_model = Some(load_model(&configuration.recognition_model)?);
        let engine =
            OcrEngine::new(params).map_err(|e| RecognitionError::Engine(e.to_string()))?;
        Ok(Self { engine })
    }

    /// Extract whatever text is visible in the image. An image with no
    /// recognizable glyphs yields an empty string, not an error.
    #[instrument(skip_all)]
    pub fn extract_text(&self, image: &GrayImage) -> Result<String, RecognitionError> {
        let engine_fault = |e: &dyn std::fmt::Display| RecognitionError::Engine(e.to_string());

        let source = ImageSource::from_bytes(image.as_raw(), image.dimensions())
            .map_err(|e| engine_fault(&e))?;
        let input = self
            .engine
            .prepare_input(source)
            .map_err(|e| engine_fault(&e))?;
        let text = self.engine.get_text(&input).map_err(|e| engine_fault(&e))?;
        Ok(text.trim().to_owned())
    }
}

fn load_model(path: &Utf8Path) -> Result<rten::Model, RecognitionError> {
    rten::Model::load_file(path.as_std_path()).map_err(|e| RecognitionError::ModelLoad {
        path: path.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_models_fail_at_construction() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.rten");
        let mut configuration: Configuration = serde_json::from_str("{}").unwrap();
        configuration.detection_model = missing.to_str().unwrap().into();
        configuration.recognition_model = configuration.detection_model.clone();

        assert!(matches!(
            TextRecognizer::new(&configuration),
            Err(RecognitionError::ModelLoad { .. })
        ));
    }
}
