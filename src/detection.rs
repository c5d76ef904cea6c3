use std::collections::BTreeMap;

use ndarray::ArrayView3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{options::DetectorConfig, orientation::Rotation, Point, Polyline, Rect};

#[derive(Error, Debug)]
pub enum FaceDetectionError {
    #[error("Could not load image from uri {uri}: {reason}")]
    LoadError { uri: String, reason: String },
    #[error("Failed to run face detection: {0}")]
    DetectError(String),
    #[error("IO error: {0}")]
    IoError(std::io::Error),
    #[error("Image error: {0}")]
    ImageError(String),
    #[error("Other error: {0}")]
    Other(String),
}

impl FaceDetectionError {
    /// Stable code reported to the scripting side.
    pub fn code(&self) -> &'static str {
        match self {
            FaceDetectionError::LoadError { .. } => "E_LOAD",
            FaceDetectionError::DetectError(_) => "E_DETECT",
            _ => "E_UNEXPECTED",
        }
    }
}

impl From<std::io::Error> for FaceDetectionError {
    fn from(err: std::io::Error) -> Self {
        FaceDetectionError::IoError(err)
    }
}

impl From<image::ImageError> for FaceDetectionError {
    fn from(err: image::ImageError) -> Self {
        FaceDetectionError::ImageError(err.to_string())
    }
}

pub type FaceDetectionResult<R> = Result<R, FaceDetectionError>;

/// Named anatomical point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LandmarkType {
    LeftCheek,
    LeftEar,
    LeftEye,
    MouthBottom,
    MouthLeft,
    MouthRight,
    NoseBase,
    RightCheek,
    RightEar,
    RightEye,
}

/// Named facial feature outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContourType {
    Face,
    LeftCheek,
    LeftEye,
    LeftEyebrowBottom,
    LeftEyebrowTop,
    LowerLipBottom,
    LowerLipTop,
    NoseBottom,
    NoseBridge,
    RightCheek,
    RightEye,
    RightEyebrowBottom,
    RightEyebrowTop,
    UpperLipBottom,
    UpperLipTop,
}

/// One detected face.
///
/// Detectors return it in source pixel space; [`crate::FaceProcessor`] returns
/// it in display space. Serializes to the record shape the scripting side
/// expects (`bounds`, `rollAngle`, `landmarks`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Face {
    pub bounds: Rect,
    /// Rotation around the axis pointing out of the image, in degrees.
    pub roll_angle: f64,
    /// Rotation around the horizontal axis, in degrees.
    pub pitch_angle: f64,
    /// Rotation around the vertical axis, in degrees.
    pub yaw_angle: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landmarks: Option<BTreeMap<LandmarkType, Point>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contours: Option<BTreeMap<ContourType, Polyline>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_eye_open_probability: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_eye_open_probability: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smiling_probability: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_id: Option<i64>,
}

impl Face {
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            ..Default::default()
        }
    }
}

/// Outcome of one frame detection call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameDetection {
    pub faces: Vec<Face>,
    /// The frame as base64 PNG, present when `convert_frame` was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_data: Option<String>,
}

/// Camera frame or decoded image handed to a detector.
#[derive(Debug, Clone)]
pub struct Frame<'a> {
    /// Pixels laid out as (height, width, channels).
    pub pixels: ArrayView3<'a, u8>,
    /// Rotation the camera pipeline applied to the sensor image. The detector
    /// reports geometry in the upright image, whose axes are swapped for
    /// 90 and 270 degrees.
    pub orientation: Rotation,
}

impl<'a> Frame<'a> {
    pub fn new(pixels: ArrayView3<'a, u8>) -> Self {
        Self {
            pixels,
            orientation: Rotation::Rotation0,
        }
    }

    pub fn with_orientation(mut self, orientation: Rotation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn width(&self) -> usize {
        self.pixels.dim().1
    }

    pub fn height(&self) -> usize {
        self.pixels.dim().0
    }

    /// Size of the image the detector reports geometry in.
    pub fn upright_size(&self) -> (f64, f64) {
        let (width, height) = (self.width() as f64, self.height() as f64);
        if self.orientation.is_transposed() {
            (height, width)
        } else {
            (width, height)
        }
    }
}

/// Face detection backend.
///
/// Returns faces in the upright source pixel space of the frame, un-normalized.
/// Optional fields should only be filled when the matching config mode is on.
pub trait FaceDetector: Send + Sync {
    fn detect(&self, frame: &Frame, config: &DetectorConfig) -> FaceDetectionResult<Vec<Face>>;
}
