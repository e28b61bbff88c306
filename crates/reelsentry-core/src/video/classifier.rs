//! Object Classification Capability
//!
//! The detection model is an opaque oracle behind the [`ObjectClassifier`]
//! trait: one image in, zero or more labeled boxes out. The label vocabulary
//! is model-defined external configuration; confidence values are preserved
//! at full source precision for downstream threshold comparison. No caching
//! across frames.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use image::RgbImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during classification
#[derive(Error, Debug, Clone)]
pub enum ClassifierError {
    /// The inference call failed for this frame
    #[error("Inference request failed: {0}")]
    Inference(String),

    /// The frame could not be encoded for transport
    #[error("Failed to encode frame: {0}")]
    Encoding(String),
}

/// Result type for classification operations
pub type ClassifierResult<T> = Result<T, ClassifierError>;

// =============================================================================
// Detection Models
// =============================================================================

/// Normalized bounding box (coordinates in 0.0 - 1.0)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    /// Creates a new bounding box
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Returns the area (0.0 - 1.0)
    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

/// One labeled box from the classifier, before frame attribution
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDetection {
    /// Model-defined label
    pub label: String,
    /// Detection confidence (0.0 - 1.0), full source precision
    pub confidence: f64,
    /// Bounding box (if the model provides one)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
}

impl RawDetection {
    /// Creates a detection without a bounding box
    pub fn new(label: &str, confidence: f64) -> Self {
        Self {
            label: label.to_string(),
            confidence,
            bounding_box: None,
        }
    }

    /// Sets the bounding box
    pub fn with_bounding_box(mut self, bounding_box: BoundingBox) -> Self {
        self.bounding_box = Some(bounding_box);
        self
    }
}

/// A detection attributed to a sampled frame (1-based decode order)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    pub label: String,
    pub confidence: f64,
    pub frame_index: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
}

impl Detection {
    /// Attributes a raw detection to the frame it was sampled from. The frame
    /// index is supplied by the caller, not the classifier.
    pub fn from_raw(raw: RawDetection, frame_index: u64) -> Self {
        Self {
            label: raw.label,
            confidence: raw.confidence,
            frame_index,
            bounding_box: raw.bounding_box,
        }
    }
}

// =============================================================================
// Classifier Trait
// =============================================================================

/// Object-detection capability.
///
/// Implementations:
/// - [`HttpClassifier`]: network-backed inference service
/// - [`StubClassifier`]: deterministic stub for tests and offline runs
#[async_trait]
pub trait ObjectClassifier: Send + Sync {
    /// Classifies a single frame.
    async fn classify(&self, frame: &RgbImage) -> ClassifierResult<Vec<RawDetection>>;
}

// =============================================================================
// HTTP Classifier
// =============================================================================

/// Bounded timeout for one inference request.
pub const DEFAULT_CLASSIFY_TIMEOUT_SECS: u64 = 60;

#[derive(Deserialize)]
struct ClassifyResponse {
    #[serde(default)]
    detections: Vec<RawDetection>,
}

/// Parses the inference service response body.
fn parse_classify_response(raw: &str) -> ClassifierResult<Vec<RawDetection>> {
    let parsed: ClassifyResponse = serde_json::from_str(raw)
        .map_err(|e| ClassifierError::Inference(format!("Malformed classifier response: {}", e)))?;
    Ok(parsed.detections)
}

/// Classifier backed by an HTTP inference service.
///
/// Posts one PNG-encoded frame per request and expects
/// `{"detections": [{"label", "confidence", "boundingBox"?}]}` back.
pub struct HttpClassifier {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpClassifier {
    /// Creates a classifier for the given inference endpoint.
    pub fn new(endpoint: &str) -> ClassifierResult<Self> {
        if endpoint.is_empty() {
            return Err(ClassifierError::Inference(
                "Classifier endpoint is required".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_CLASSIFY_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                ClassifierError::Inference(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            endpoint: endpoint.to_string(),
            client,
        })
    }

    fn encode_png(frame: &RgbImage) -> ClassifierResult<Vec<u8>> {
        let mut buf = Vec::new();
        frame
            .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
            .map_err(|e| ClassifierError::Encoding(e.to_string()))?;
        Ok(buf)
    }
}

#[async_trait]
impl ObjectClassifier for HttpClassifier {
    async fn classify(&self, frame: &RgbImage) -> ClassifierResult<Vec<RawDetection>> {
        let png = Self::encode_png(frame)?;

        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "image/png")
            .body(png)
            .send()
            .await
            .map_err(|e| ClassifierError::Inference(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ClassifierError::Inference(format!(
                "Service returned {}",
                response.status()
            )));
        }

        let raw = response
            .text()
            .await
            .map_err(|e| ClassifierError::Inference(e.to_string()))?;
        parse_classify_response(&raw)
    }
}

// =============================================================================
// Stub Classifier
// =============================================================================

/// Deterministic classifier for tests and offline smoke runs.
///
/// Replays a scripted outcome per call, in order; calls past the end of the
/// script return no detections.
pub struct StubClassifier {
    script: Vec<ClassifierResult<Vec<RawDetection>>>,
    cursor: AtomicUsize,
}

impl StubClassifier {
    /// Creates a stub replaying the given per-call outcomes.
    pub fn new(script: Vec<ClassifierResult<Vec<RawDetection>>>) -> Self {
        Self {
            script,
            cursor: AtomicUsize::new(0),
        }
    }

    /// A stub that never detects anything.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl ObjectClassifier for StubClassifier {
    async fn classify(&self, _frame: &RgbImage) -> ClassifierResult<Vec<RawDetection>> {
        let index = self.cursor.fetch_add(1, Ordering::SeqCst);
        self.script
            .get(index)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_from_raw() {
        let raw = RawDetection::new("knife", 0.45)
            .with_bounding_box(BoundingBox::new(0.1, 0.2, 0.3, 0.4));
        let detection = Detection::from_raw(raw, 30);

        assert_eq!(detection.label, "knife");
        assert_eq!(detection.confidence, 0.45);
        assert_eq!(detection.frame_index, 30);
        assert_eq!(detection.bounding_box.unwrap().area(), 0.3 * 0.4);
    }

    #[test]
    fn test_detection_serialization() {
        let detection = Detection::from_raw(RawDetection::new("knife", 0.45), 30);
        let json = serde_json::to_string(&detection).unwrap();
        assert!(json.contains("\"label\":\"knife\""));
        assert!(json.contains("\"frameIndex\":30"));

        let parsed: Detection = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, detection);
    }

    #[test]
    fn test_parse_classify_response() {
        let raw = r#"{"detections": [
            {"label": "knife", "confidence": 0.45},
            {"label": "person", "confidence": 0.91,
             "boundingBox": {"left": 0.1, "top": 0.1, "width": 0.5, "height": 0.8}}
        ]}"#;

        let detections = parse_classify_response(raw).unwrap();
        assert_eq!(detections.len(), 2);
        assert_eq!(detections[0].label, "knife");
        assert_eq!(detections[0].confidence, 0.45);
        assert!(detections[0].bounding_box.is_none());
        assert!(detections[1].bounding_box.is_some());
    }

    #[test]
    fn test_parse_classify_response_empty_body() {
        let detections = parse_classify_response("{}").unwrap();
        assert!(detections.is_empty());
    }

    #[test]
    fn test_parse_classify_response_malformed() {
        let err = parse_classify_response("not json").unwrap_err();
        assert!(matches!(err, ClassifierError::Inference(_)));
    }

    #[test]
    fn test_http_classifier_requires_endpoint() {
        let result = HttpClassifier::new("");
        assert!(matches!(result, Err(ClassifierError::Inference(_))));
    }

    #[test]
    fn test_encode_png() {
        let frame = RgbImage::new(2, 2);
        let png = HttpClassifier::encode_png(&frame).unwrap();
        // PNG signature
        assert_eq!(&png[..4], &[0x89, b'P', b'N', b'G']);
    }

    #[tokio::test]
    async fn test_stub_replays_script_in_order() {
        let stub = StubClassifier::new(vec![
            Ok(vec![RawDetection::new("knife", 0.45)]),
            Err(ClassifierError::Inference("gpu fault".to_string())),
            Ok(Vec::new()),
        ]);
        let frame = RgbImage::new(1, 1);

        let first = stub.classify(&frame).await.unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].label, "knife");

        assert!(stub.classify(&frame).await.is_err());
        assert!(stub.classify(&frame).await.unwrap().is_empty());
        // past the end of the script
        assert!(stub.classify(&frame).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stub_empty_never_detects() {
        let stub = StubClassifier::empty();
        let frame = RgbImage::new(1, 1);
        assert!(stub.classify(&frame).await.unwrap().is_empty());
    }
}
