use std::sync::Arc;

use crate::{
    detection::FaceDetector,
    loader::{ImageLoader, UriImageLoader},
    orientation::{FixedOrientation, OrientationSource},
    FaceProcessor,
};

/// Builder for [`FaceProcessor`].
pub struct FaceProcessorBuilder {
    detector: Box<dyn FaceDetector>,
    orientation: Arc<dyn OrientationSource>,
    loader: Box<dyn ImageLoader>,
}

impl FaceProcessorBuilder {
    /// Create a new builder around the given detector backend.
    ///
    /// Until an orientation source is set the device is assumed to be in
    /// portrait.
    pub fn new(detector: Box<dyn FaceDetector>) -> Self {
        Self {
            detector,
            orientation: Arc::new(FixedOrientation::default()),
            loader: Box::new(UriImageLoader::new()),
        }
    }

    /// Set the source of the device rotation, usually a shared
    /// [`crate::OrientationTracker`].
    pub fn orientation_source(mut self, orientation: Arc<dyn OrientationSource>) -> Self {
        self.orientation = orientation;
        self
    }

    /// Set the loader used by the static image entry points.
    pub fn image_loader(mut self, loader: Box<dyn ImageLoader>) -> Self {
        self.loader = loader;
        self
    }

    /// Builds the processor.
    pub fn build(self) -> FaceProcessor {
        FaceProcessor {
            detector: self.detector,
            orientation: self.orientation,
            loader: self.loader,
        }
    }
}

#[cfg(test)]
mod tests {
    use image::RgbImage;
    use ndarray::Array3;

    use super::*;
    use crate::{
        detection::{FaceDetectionResult, Frame},
        options::FaceDetectionOptions,
        orientation::{OrientationTracker, Rotation},
        testing::StubDetector,
    };

    struct SolidImageLoader;

    impl ImageLoader for SolidImageLoader {
        fn load(&self, _uri: &str) -> FaceDetectionResult<RgbImage> {
            Ok(RgbImage::new(4, 4))
        }
    }

    #[test]
    fn defaults_to_portrait() {
        let processor = FaceProcessorBuilder::new(Box::new(StubDetector::new(vec![]))).build();
        assert_eq!(processor.orientation.current(), Rotation::Rotation0);
    }

    #[test]
    fn uses_injected_collaborators() {
        let tracker = Arc::new(OrientationTracker::new());
        tracker.on_orientation_changed(300.0);

        let processor = FaceProcessorBuilder::new(Box::new(StubDetector::new(vec![])))
            .orientation_source(tracker)
            .image_loader(Box::new(SolidImageLoader))
            .build();

        assert_eq!(processor.orientation.current(), Rotation::Rotation270);
        assert_eq!(processor.count_faces_in_image("memory://solid").unwrap(), 0);

        let pixels = Array3::<u8>::zeros((4, 4, 3));
        assert!(processor
            .detect_frame(&Frame::new(pixels.view()), &FaceDetectionOptions::default())
            .is_empty());
    }
}
