use pyo3::prelude::*;
use vision_faces as rust;

#[pyclass]
#[derive(Copy, Clone)]
enum CameraFacing {
    Front = 0,
    Back = 1,
}

impl From<CameraFacing> for rust::CameraFacing {
    fn from(facing: CameraFacing) -> Self {
        match facing {
            CameraFacing::Front => rust::CameraFacing::Front,
            CameraFacing::Back => rust::CameraFacing::Back,
        }
    }
}

type RectTuple = (f64, f64, f64, f64);

fn context(
    source_size: (f64, f64),
    scale: (f64, f64),
    auto_mode: bool,
    camera_facing: CameraFacing,
    rotation: i32,
) -> rust::TransformContext {
    rust::TransformContext::new(source_size.0, source_size.1)
        .scale(scale.0, scale.1)
        .auto_mode(auto_mode)
        .camera_facing(camera_facing.into())
        .device_rotation(rust::Rotation::from_degrees(rotation))
}

/// Normalizes a bounding box.
///
/// # Arguments
///
/// * `rect` - The box as (x, y, width, height) in source pixels.
/// * `source_size` - The (width, height) of the source image.
/// * `scale` - Display / source ratio per axis.
/// * `auto_mode` - Compensate device rotation and camera mirroring.
/// * `camera_facing` - Camera that produced the image.
/// * `rotation` - Device rotation in degrees, one of 0, 90, 180, 270.
///
/// # Returns
///
/// The normalized box as (x, y, width, height).
#[pyfunction]
#[pyo3(signature = (rect, source_size, scale=(1.0, 1.0), auto_mode=false,
    camera_facing=CameraFacing::Front, rotation=0))]
fn normalize_rect(
    rect: RectTuple,
    source_size: (f64, f64),
    scale: (f64, f64),
    auto_mode: bool,
    camera_facing: CameraFacing,
    rotation: i32,
) -> RectTuple {
    let ctx = context(source_size, scale, auto_mode, camera_facing, rotation);
    let (x, y, width, height) = rect;
    ctx.normalize_rect(&rust::Rect::at(x, y).with_size(width, height))
        .to_xywh()
}

/// Normalizes a list of (x, y) points, a single landmark or a contour,
/// with the same transform as `normalize_rect`.
#[pyfunction]
#[pyo3(signature = (points, source_size, scale=(1.0, 1.0), auto_mode=false,
    camera_facing=CameraFacing::Front, rotation=0))]
fn normalize_points(
    points: Vec<(f64, f64)>,
    source_size: (f64, f64),
    scale: (f64, f64),
    auto_mode: bool,
    camera_facing: CameraFacing,
    rotation: i32,
) -> Vec<(f64, f64)> {
    let ctx = context(source_size, scale, auto_mode, camera_facing, rotation);
    let points: Vec<rust::Point> = points
        .into_iter()
        .map(|(x, y)| rust::Point::new(x, y))
        .collect();
    ctx.normalize_polyline(&points)
        .into_iter()
        .map(|point| (point.x, point.y))
        .collect()
}

/// Device orientation tracker fed by sensor callbacks.
#[pyclass]
struct OrientationTracker {
    tracker: rust::OrientationTracker,
}

#[pymethods]
impl OrientationTracker {
    #[new]
    fn new() -> Self {
        Self {
            tracker: rust::OrientationTracker::new(),
        }
    }

    /// Feeds a rotation sensor reading, in degrees.
    fn on_orientation_changed(&self, degrees: f64) {
        self.tracker.on_orientation_changed(degrees);
    }

    /// Feeds an accelerometer sample, in g.
    fn on_acceleration(&self, x: f64, y: f64, z: f64) {
        self.tracker.on_acceleration(x, y, z);
    }

    fn start(&self) {
        self.tracker.start();
    }

    fn stop(&self) {
        self.tracker.stop();
    }

    /// Current device rotation in degrees.
    #[getter]
    fn rotation(&self) -> u16 {
        use rust::OrientationSource;
        self.tracker.current().degrees()
    }
}

/// py-vision-faces is a Python binding to the vision-faces library.
#[pymodule]
fn py_vision_faces(_py: Python<'_>, m: &PyModule) -> PyResult<()> {
    m.add_class::<CameraFacing>()?;
    m.add_class::<OrientationTracker>()?;
    m.add_function(wrap_pyfunction!(normalize_rect, m)?)?;
    m.add_function(wrap_pyfunction!(normalize_points, m)?)?;
    Ok(())
}
