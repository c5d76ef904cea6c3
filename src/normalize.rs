//! Maps detector geometry from source pixel space into display space.
//!
//! Every auto-mode case is a single affine point map built from an optional
//! axis swap followed by a scale and an optional mirror on each output axis.
//! Boxes, landmarks and contours of one face all go through the same map, so
//! a landmark inside its box stays inside the normalized box.

use serde::{Deserialize, Serialize};

use crate::{orientation::Rotation, Point, Polyline, Rect};

/// Which camera produced the frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraFacing {
    #[default]
    Front,
    Back,
}

/// Everything needed to normalize the geometry of one detection call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformContext {
    /// Width of the source image, in the orientation the detector reports.
    pub source_width: f64,
    /// Height of the source image, in the orientation the detector reports.
    pub source_height: f64,
    /// Display / source ratio along the output x-axis.
    pub scale_x: f64,
    /// Display / source ratio along the output y-axis.
    pub scale_y: f64,
    /// Compensate rotation and mirroring here instead of in the caller.
    pub auto_mode: bool,
    pub camera_facing: CameraFacing,
    pub device_rotation: Rotation,
}

impl TransformContext {
    /// Creates an identity context for a source of the given size.
    pub fn new(source_width: f64, source_height: f64) -> Self {
        Self {
            source_width,
            source_height,
            scale_x: 1.0,
            scale_y: 1.0,
            auto_mode: false,
            camera_facing: CameraFacing::default(),
            device_rotation: Rotation::default(),
        }
    }

    /// Creates a context scaling the source to the given window size.
    ///
    /// A degenerate source dimension leaves that axis unscaled.
    pub fn fit_window(
        source_width: f64,
        source_height: f64,
        window_width: f64,
        window_height: f64,
    ) -> Self {
        let ratio = |window: f64, source: f64| {
            if source > 0.0 && source.is_finite() {
                window / source
            } else {
                1.0
            }
        };

        Self::new(source_width, source_height).scale(
            ratio(window_width, source_width),
            ratio(window_height, source_height),
        )
    }

    pub fn scale(mut self, scale_x: f64, scale_y: f64) -> Self {
        self.scale_x = scale_x;
        self.scale_y = scale_y;
        self
    }

    pub fn auto_mode(mut self, auto_mode: bool) -> Self {
        self.auto_mode = auto_mode;
        self
    }

    pub fn camera_facing(mut self, camera_facing: CameraFacing) -> Self {
        self.camera_facing = camera_facing;
        self
    }

    pub fn device_rotation(mut self, device_rotation: Rotation) -> Self {
        self.device_rotation = device_rotation;
        self
    }

    /// Scaled source width, the extent mirrored against on the x-axis.
    pub fn display_width(&self) -> f64 {
        self.source_width * self.scale_x
    }

    /// Scaled source height, the extent mirrored against on the y-axis.
    pub fn display_height(&self) -> f64 {
        self.source_height * self.scale_y
    }

    pub fn normalize_rect(&self, rect: &Rect) -> Rect {
        normalize_rect(rect, self)
    }

    pub fn normalize_point(&self, point: &Point) -> Point {
        normalize_point(point, self)
    }

    pub fn normalize_polyline(&self, points: &[Point]) -> Polyline {
        normalize_polyline(points, self)
    }
}

/// Axis operations selected by camera facing and device rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AxisMapping {
    swap_axes: bool,
    mirror_x: bool,
    mirror_y: bool,
}

impl AxisMapping {
    const IDENTITY: AxisMapping = AxisMapping::new(false, false, false);

    const fn new(swap_axes: bool, mirror_x: bool, mirror_y: bool) -> Self {
        Self {
            swap_axes,
            mirror_x,
            mirror_y,
        }
    }

    fn for_context(ctx: &TransformContext) -> Self {
        if !ctx.auto_mode {
            return Self::IDENTITY;
        }

        match (ctx.camera_facing, ctx.device_rotation) {
            (CameraFacing::Front, Rotation::Rotation0) => Self::new(false, true, false),
            (CameraFacing::Front, Rotation::Rotation270) => Self::new(true, false, false),
            (CameraFacing::Front, Rotation::Rotation180) => Self::new(false, false, true),
            (CameraFacing::Front, Rotation::Rotation90) => Self::new(true, true, true),
            (CameraFacing::Back, Rotation::Rotation0) => Self::IDENTITY,
            (CameraFacing::Back, Rotation::Rotation270) => Self::new(true, false, true),
            (CameraFacing::Back, Rotation::Rotation180) => Self::new(false, true, true),
            (CameraFacing::Back, Rotation::Rotation90) => Self::new(true, true, false),
        }
    }

    fn map_point(&self, point: &Point, ctx: &TransformContext) -> Point {
        let (u, v) = if self.swap_axes {
            (point.y, point.x)
        } else {
            (point.x, point.y)
        };
        let Point { x, y } = Point::new(u, v).scale(ctx.scale_x, ctx.scale_y);

        Point {
            x: if self.mirror_x { ctx.display_width() - x } else { x },
            y: if self.mirror_y { ctx.display_height() - y } else { y },
        }
    }

    fn map_rect(&self, rect: &Rect, ctx: &TransformContext) -> Rect {
        let (u, v, extent_u, extent_v) = if self.swap_axes {
            (rect.y, rect.x, rect.height, rect.width)
        } else {
            (rect.x, rect.y, rect.width, rect.height)
        };
        let Rect {
            x,
            y,
            width,
            height,
        } = Rect::at(u, v)
            .with_size(extent_u, extent_v)
            .scale(ctx.scale_x, ctx.scale_y);

        // A mirrored origin is the far corner of the box: (D - origin) - extent.
        Rect {
            x: if self.mirror_x {
                (ctx.display_width() - x) - width
            } else {
                x
            },
            y: if self.mirror_y {
                (ctx.display_height() - y) - height
            } else {
                y
            },
            width,
            height,
        }
    }
}

/// Normalizes a bounding box.
///
/// # Arguments
///
/// * `rect` - Box in source pixel space.
/// * `ctx` - Transform to apply.
///
/// # Returns
///
/// * `Rect` - Box in display space. The size is never negative, the origin is
///   not clamped to the display.
pub fn normalize_rect(rect: &Rect, ctx: &TransformContext) -> Rect {
    AxisMapping::for_context(ctx).map_rect(rect, ctx)
}

/// Normalizes a single landmark point with the same map as [`normalize_rect`].
pub fn normalize_point(point: &Point, ctx: &TransformContext) -> Point {
    AxisMapping::for_context(ctx).map_point(point, ctx)
}

/// Normalizes every point of a contour, keeping count and order.
pub fn normalize_polyline(points: &[Point], ctx: &TransformContext) -> Polyline {
    let mapping = AxisMapping::for_context(ctx);
    points
        .iter()
        .map(|point| mapping.map_point(point, ctx))
        .collect()
}
