//! Detection options.
//!
//! Options arrive from the scripting side as loosely typed maps. They are
//! parsed once into [`FaceDetectionOptions`]; a missing or malformed value
//! keeps its default instead of failing the call.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::normalize::CameraFacing;

/// Favor speed or accuracy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceMode {
    #[default]
    Fast,
    Accurate,
}

/// Whether an optional detector output is produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureMode {
    #[default]
    None,
    All,
}

impl FeatureMode {
    pub fn is_enabled(self) -> bool {
        self == FeatureMode::All
    }
}

/// Configuration handed to the detector backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DetectorConfig {
    pub performance_mode: PerformanceMode,
    /// Detect landmarks: eyes, ears, nose, cheeks, mouth.
    pub landmark_mode: FeatureMode,
    /// Detect contours of facial features.
    pub contour_mode: FeatureMode,
    /// Classify eyes open and smiling.
    pub classification_mode: FeatureMode,
    /// Smallest face to detect, as the ratio of head width to image width.
    pub min_face_size: f64,
    /// Assign faces an id that is stable across frames.
    pub tracking_enabled: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            performance_mode: PerformanceMode::Fast,
            landmark_mode: FeatureMode::None,
            contour_mode: FeatureMode::None,
            classification_mode: FeatureMode::None,
            min_face_size: 0.15,
            tracking_enabled: false,
        }
    }
}

/// Options of one detection call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FaceDetectionOptions {
    #[serde(flatten)]
    pub detector: DetectorConfig,
    /// Compensate device rotation and camera mirroring in the normalizer.
    pub auto_mode: bool,
    pub window_width: f64,
    pub window_height: f64,
    pub camera_facing: CameraFacing,
    /// Return the frame itself, encoded, next to the faces.
    pub convert_frame: bool,
}

impl Default for FaceDetectionOptions {
    fn default() -> Self {
        Self {
            detector: DetectorConfig::default(),
            auto_mode: false,
            window_width: 1.0,
            window_height: 1.0,
            camera_facing: CameraFacing::Front,
            convert_frame: false,
        }
    }
}

impl FaceDetectionOptions {
    /// Parses options from a loosely typed map.
    ///
    /// Booleans and numbers are also accepted in their string form
    /// (`"true"`, `"0.2"`). Unknown keys are ignored.
    pub fn from_value(value: &Value) -> Self {
        let mut options = Self::default();
        let Some(map) = value.as_object() else {
            if !value.is_null() {
                log::debug!("Ignoring non-object detection options: {}", value);
            }
            return options;
        };

        let config = &mut options.detector;
        read_option(map, "performanceMode", parse_enum, &mut config.performance_mode);
        read_option(map, "landmarkMode", parse_enum, &mut config.landmark_mode);
        read_option(map, "contourMode", parse_enum, &mut config.contour_mode);
        read_option(map, "classificationMode", parse_enum, &mut config.classification_mode);
        read_option(map, "minFaceSize", parse_ratio, &mut config.min_face_size);
        read_option(map, "trackingEnabled", parse_bool, &mut config.tracking_enabled);
        read_option(map, "autoMode", parse_bool, &mut options.auto_mode);
        read_option(map, "windowWidth", parse_extent, &mut options.window_width);
        read_option(map, "windowHeight", parse_extent, &mut options.window_height);
        read_option(map, "cameraFacing", parse_enum, &mut options.camera_facing);
        read_option(map, "convertFrame", parse_bool, &mut options.convert_frame);

        options
    }
}

fn read_option<T, F>(map: &Map<String, Value>, key: &str, parse: F, target: &mut T)
where
    F: Fn(&Value) -> Option<T>,
{
    match map.get(key) {
        None | Some(Value::Null) => {}
        Some(value) => match parse(value) {
            Some(parsed) => *target = parsed,
            None => log::debug!("Ignoring malformed option {}: {}", key, value),
        },
    }
}

fn parse_enum<T: DeserializeOwned>(value: &Value) -> Option<T> {
    serde_json::from_value(value.clone()).ok()
}

fn parse_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::String(text) => text.parse().ok(),
        _ => None,
    }
}

fn parse_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    };
    number.filter(|number| number.is_finite())
}

fn parse_ratio(value: &Value) -> Option<f64> {
    parse_number(value).filter(|ratio| *ratio > 0.0 && *ratio <= 1.0)
}

fn parse_extent(value: &Value) -> Option<f64> {
    parse_number(value).filter(|extent| *extent > 0.0)
}
