//! Normalizes face detector output into display coordinates.
//!
//! A [`FaceDetector`] backend reports faces in the pixel space of the camera
//! frame or image. [`FaceProcessor`] maps every box, landmark and contour into
//! the display space of the caller, compensating device rotation and camera
//! mirroring when auto mode is on.

mod rect;
pub use rect::{Point, Polyline, Rect};

mod normalize;
pub use normalize::{
    normalize_point, normalize_polyline, normalize_rect, CameraFacing, TransformContext,
};

mod orientation;
pub use orientation::{
    DeviceOrientation, FixedOrientation, OrientationSensor, OrientationSource,
    OrientationTracker, Rotation, RotationConvention,
};

mod detection;
pub use detection::{
    ContourType, Face, FaceDetectionError, FaceDetectionResult, FaceDetector, Frame,
    FrameDetection, LandmarkType,
};

mod options;
pub use options::{DetectorConfig, FaceDetectionOptions, FeatureMode, PerformanceMode};

mod imaging;
pub use imaging::{encode_png_base64, ToArray3, ToRgb8};

mod loader;
pub use loader::{ImageLoader, UriImageLoader};

#[cfg(test)]
pub mod testing;

mod processor;
pub use processor::{normalize_face, transform_context, FaceProcessor};

mod builder;
pub use builder::FaceProcessorBuilder;

#[cfg(feature = "viz")]
pub mod viz;
