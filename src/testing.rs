use std::collections::BTreeMap;
use std::path::PathBuf;

use ndarray::Array3;
use rstest::fixture;

use crate::{
    detection::{ContourType, Face, FaceDetectionError, FaceDetectionResult, FaceDetector, Frame},
    options::DetectorConfig,
    LandmarkType, Point, Rect,
};

/// Detector returning a fixed set of faces.
pub struct StubDetector {
    faces: Vec<Face>,
    fail: bool,
}

impl StubDetector {
    pub fn new(faces: Vec<Face>) -> Self {
        Self { faces, fail: false }
    }

    pub fn failing() -> Self {
        Self {
            faces: Vec::new(),
            fail: true,
        }
    }
}

impl FaceDetector for StubDetector {
    fn detect(&self, _frame: &Frame, _config: &DetectorConfig) -> FaceDetectionResult<Vec<Face>> {
        if self.fail {
            return Err(FaceDetectionError::DetectError("stub failure".to_string()));
        }
        Ok(self.faces.clone())
    }
}

/// Face at {10, 20, 30, 40} with every optional field filled except the
/// right eye probability.
#[fixture]
pub fn sample_face() -> Face {
    Face {
        bounds: Rect::at(10.0, 20.0).with_size(30.0, 40.0),
        roll_angle: 4.5,
        pitch_angle: -2.0,
        yaw_angle: 12.0,
        landmarks: Some(BTreeMap::from([
            (LandmarkType::LeftEye, Point::new(18.0, 32.0)),
            (LandmarkType::RightEye, Point::new(32.0, 32.0)),
            (LandmarkType::NoseBase, Point::new(25.0, 40.0)),
        ])),
        contours: Some(BTreeMap::from([(
            ContourType::UpperLipTop,
            vec![
                Point::new(18.0, 48.0),
                Point::new(25.0, 46.0),
                Point::new(32.0, 48.0),
            ],
        )])),
        left_eye_open_probability: Some(0.9),
        right_eye_open_probability: None,
        smiling_probability: Some(0.8),
        tracking_id: Some(7),
    }
}

/// Black 100 x 200 RGB frame.
#[fixture]
pub fn sample_frame() -> Array3<u8> {
    Array3::zeros((200, 100, 3))
}

#[fixture]
pub fn output_dir() -> PathBuf {
    let output_path = PathBuf::from("tests/output");
    std::fs::create_dir_all(output_path.clone()).expect("Can't create output directory");
    output_path
}
