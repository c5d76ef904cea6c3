use std::sync::Arc;
use std::thread::JoinHandle;

use crate::{
    detection::{
        Face, FaceDetectionError, FaceDetectionResult, FaceDetector, Frame, FrameDetection,
    },
    imaging::{encode_png_base64, ToArray3, ToRgb8},
    loader::ImageLoader,
    normalize::TransformContext,
    options::{DetectorConfig, FaceDetectionOptions},
    orientation::{OrientationSource, Rotation},
};

/// Reported for classification scores the detector could not compute.
const UNAVAILABLE_PROBABILITY: f64 = -1.0;

/// Reported as tracking id when tracking is disabled or unavailable.
const NO_TRACKING_ID: i64 = -1;

/// Runs a detector and normalizes its output into display space.
///
/// Built with [`crate::FaceProcessorBuilder`].
pub struct FaceProcessor {
    pub(crate) detector: Box<dyn FaceDetector>,
    pub(crate) orientation: Arc<dyn OrientationSource>,
    pub(crate) loader: Box<dyn ImageLoader>,
}

impl FaceProcessor {
    /// Detects faces on a camera frame.
    ///
    /// Never fails: a frame that cannot be processed is logged and yields no
    /// faces, so the camera pipeline keeps running.
    pub fn detect_frame(&self, frame: &Frame, options: &FaceDetectionOptions) -> Vec<Face> {
        match self.try_detect_frame(frame, options) {
            Ok(faces) => faces,
            Err(err) => {
                log::warn!("Error processing face detection [{}]: {}", err.code(), err);
                Vec::new()
            }
        }
    }

    /// Runs [`detect_frame`](FaceProcessor::detect_frame) and, when
    /// `convert_frame` is set, attaches the frame pixels as a base64 PNG.
    ///
    /// A frame that cannot be encoded is logged and leaves `frame_data` empty.
    pub fn process_frame(&self, frame: &Frame, options: &FaceDetectionOptions) -> FrameDetection {
        let faces = self.detect_frame(frame, options);
        let frame_data = if options.convert_frame {
            match encode_png_base64(&frame.pixels.to_rgb8()) {
                Ok(data) => Some(data),
                Err(err) => {
                    log::warn!("Error converting frame [{}]: {}", err.code(), err);
                    None
                }
            }
        } else {
            None
        };

        FrameDetection { faces, frame_data }
    }

    /// Same as [`detect_frame`](FaceProcessor::detect_frame), with errors surfaced.
    pub fn try_detect_frame(
        &self,
        frame: &Frame,
        options: &FaceDetectionOptions,
    ) -> FaceDetectionResult<Vec<Face>> {
        if frame.width() == 0 || frame.height() == 0 {
            return Err(FaceDetectionError::ImageError("frame is empty".to_string()));
        }

        let faces = self.detector.detect(frame, &options.detector)?;
        let (source_width, source_height) = frame.upright_size();
        let ctx = transform_context(
            source_width,
            source_height,
            options,
            self.orientation.current(),
        );
        log::debug!("Detected {} faces, normalizing with {:?}", faces.len(), ctx);

        Ok(faces
            .iter()
            .map(|face| normalize_face(face, &ctx, &options.detector))
            .collect())
    }

    /// Detects faces in a static image.
    ///
    /// Coordinates are in window units: with the default window size of 1.0
    /// they are fractions of the image size, not pixels. Resolves to an empty
    /// list on any load or detection failure.
    pub fn detect_image(&self, uri: &str, options: &FaceDetectionOptions) -> Vec<Face> {
        match self.try_detect_image(uri, options) {
            Ok(faces) => faces,
            Err(err) => {
                log::warn!("Error detecting faces in {} [{}]: {}", uri, err.code(), err);
                Vec::new()
            }
        }
    }

    /// Same as [`detect_image`](FaceProcessor::detect_image), with errors surfaced.
    ///
    /// The device rotation plays no part here: decoded pixels are already
    /// upright, so auto mode only mirrors according to the camera facing.
    pub fn try_detect_image(
        &self,
        uri: &str,
        options: &FaceDetectionOptions,
    ) -> FaceDetectionResult<Vec<Face>> {
        let pixels = self.loader.load(uri)?.into_array3()?;
        let frame = Frame::new(pixels.view());

        let faces = self.detector.detect(&frame, &options.detector)?;
        let (source_width, source_height) = frame.upright_size();
        let ctx = transform_context(source_width, source_height, options, Rotation::Rotation0);

        Ok(faces
            .iter()
            .map(|face| normalize_face(face, &ctx, &options.detector))
            .collect())
    }

    /// Whether the image at `uri` contains at least one face.
    pub fn has_face_in_image(&self, uri: &str) -> FaceDetectionResult<bool> {
        Ok(self.count_faces_in_image(uri)? > 0)
    }

    /// Number of faces in the image at `uri`, with the default detector config.
    pub fn count_faces_in_image(&self, uri: &str) -> FaceDetectionResult<usize> {
        let pixels = self.loader.load(uri)?.into_array3()?;
        let faces = self
            .detector
            .detect(&Frame::new(pixels.view()), &DetectorConfig::default())?;
        Ok(faces.len())
    }

    /// Runs [`detect_image`](FaceProcessor::detect_image) on a worker thread.
    ///
    /// The handle always resolves exactly once; there is no cancellation.
    pub fn spawn_detect_image(
        self: &Arc<Self>,
        uri: impl Into<String>,
        options: FaceDetectionOptions,
    ) -> JoinHandle<Vec<Face>> {
        let processor = Arc::clone(self);
        let uri = uri.into();
        std::thread::spawn(move || processor.detect_image(&uri, &options))
    }
}

/// Builds the transform of one detection call.
///
/// # Arguments
///
/// * `source_width`, `source_height` - Size of the upright source image.
/// * `options` - Window size, camera facing and auto mode of the call.
/// * `device_rotation` - Current device rotation.
pub fn transform_context(
    source_width: f64,
    source_height: f64,
    options: &FaceDetectionOptions,
    device_rotation: Rotation,
) -> TransformContext {
    TransformContext::fit_window(
        source_width,
        source_height,
        options.window_width,
        options.window_height,
    )
    .auto_mode(options.auto_mode)
    .camera_facing(options.camera_facing)
    .device_rotation(device_rotation)
}

/// Normalizes every geometric field of a face with the same transform.
///
/// Optional fields are only emitted when enabled in `config`.
pub fn normalize_face(face: &Face, ctx: &TransformContext, config: &DetectorConfig) -> Face {
    let landmarks = config.landmark_mode.is_enabled().then(|| {
        face.landmarks
            .iter()
            .flatten()
            .map(|(landmark, point)| (*landmark, ctx.normalize_point(point)))
            .collect()
    });
    let contours = config.contour_mode.is_enabled().then(|| {
        face.contours
            .iter()
            .flatten()
            .map(|(contour, points)| (*contour, ctx.normalize_polyline(points)))
            .collect()
    });

    let classified = config.classification_mode.is_enabled();
    let probability =
        |value: Option<f64>| classified.then(|| value.unwrap_or(UNAVAILABLE_PROBABILITY));

    let tracking_id = if config.tracking_enabled {
        face.tracking_id.unwrap_or(NO_TRACKING_ID)
    } else {
        NO_TRACKING_ID
    };

    Face {
        bounds: ctx.normalize_rect(&face.bounds),
        roll_angle: face.roll_angle,
        pitch_angle: face.pitch_angle,
        yaw_angle: face.yaw_angle,
        landmarks,
        contours,
        left_eye_open_probability: probability(face.left_eye_open_probability),
        right_eye_open_probability: probability(face.right_eye_open_probability),
        smiling_probability: probability(face.smiling_probability),
        tracking_id: Some(tracking_id),
    }
}
