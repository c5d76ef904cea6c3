//! Device orientation tracking.
//!
//! A hardware sensor pushes raw readings into an [`OrientationTracker`]; the
//! detection path only ever sees the [`OrientationSource`] trait, so tests and
//! hosts without a sensor can inject a [`FixedOrientation`] instead.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Mutex, MutexGuard};

/// Clockwise rotation in 90 degree steps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Rotation {
    #[default]
    Rotation0,
    Rotation90,
    Rotation180,
    Rotation270,
}

impl Rotation {
    /// Parses a rotation expressed in degrees.
    ///
    /// Multiples of 90 are accepted in any turn (`-90` is `Rotation270`),
    /// every other value falls back to `Rotation0`.
    pub fn from_degrees(degrees: i32) -> Self {
        match degrees.rem_euclid(360) {
            90 => Rotation::Rotation90,
            180 => Rotation::Rotation180,
            270 => Rotation::Rotation270,
            _ => Rotation::Rotation0,
        }
    }

    pub fn degrees(self) -> u16 {
        match self {
            Rotation::Rotation0 => 0,
            Rotation::Rotation90 => 90,
            Rotation::Rotation180 => 180,
            Rotation::Rotation270 => 270,
        }
    }

    /// Whether the rotation swaps the horizontal and vertical axes.
    pub fn is_transposed(self) -> bool {
        matches!(self, Rotation::Rotation90 | Rotation::Rotation270)
    }

    /// The rotation that undoes this one.
    pub fn inverse(self) -> Self {
        match self {
            Rotation::Rotation90 => Rotation::Rotation270,
            Rotation::Rotation270 => Rotation::Rotation90,
            other => other,
        }
    }

    fn to_bits(self) -> u8 {
        match self {
            Rotation::Rotation0 => 0,
            Rotation::Rotation90 => 1,
            Rotation::Rotation180 => 2,
            Rotation::Rotation270 => 3,
        }
    }

    fn from_bits(bits: u8) -> Self {
        match bits {
            1 => Rotation::Rotation90,
            2 => Rotation::Rotation180,
            3 => Rotation::Rotation270,
            _ => Rotation::Rotation0,
        }
    }
}

/// Physical attitude of the device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DeviceOrientation {
    #[default]
    Portrait,
    LandscapeLeft,
    PortraitUpsideDown,
    LandscapeRight,
}

impl DeviceOrientation {
    /// Buckets a raw orientation sensor reading.
    ///
    /// Readings are taken modulo 360. Negative readings are what sensors report
    /// when the device lies flat and map to portrait.
    pub fn from_sensor_degrees(degrees: f64) -> Self {
        if !degrees.is_finite() || degrees < 0.0 {
            return DeviceOrientation::Portrait;
        }

        let degrees = degrees.rem_euclid(360.0);
        if (45.0..135.0).contains(&degrees) {
            DeviceOrientation::LandscapeLeft
        } else if (135.0..225.0).contains(&degrees) {
            DeviceOrientation::PortraitUpsideDown
        } else if (225.0..315.0).contains(&degrees) {
            DeviceOrientation::LandscapeRight
        } else {
            DeviceOrientation::Portrait
        }
    }

    /// Derives the orientation from accelerometer data, in g along each
    /// device axis.
    pub fn from_acceleration(x: f64, y: f64, z: f64) -> Self {
        let (x_norm, y_norm, z_norm) = (x.abs(), y.abs(), z.abs());

        // Lying flat.
        if z_norm > x_norm && z_norm > y_norm {
            return DeviceOrientation::Portrait;
        }

        if x_norm > y_norm {
            if x > 0.0 {
                DeviceOrientation::LandscapeRight
            } else {
                DeviceOrientation::LandscapeLeft
            }
        } else if y > 0.0 {
            DeviceOrientation::PortraitUpsideDown
        } else {
            DeviceOrientation::Portrait
        }
    }

    pub fn rotation(self) -> Rotation {
        match self {
            DeviceOrientation::Portrait => Rotation::Rotation0,
            DeviceOrientation::LandscapeLeft => Rotation::Rotation90,
            DeviceOrientation::PortraitUpsideDown => Rotation::Rotation180,
            DeviceOrientation::LandscapeRight => Rotation::Rotation270,
        }
    }
}

impl From<Rotation> for DeviceOrientation {
    fn from(rotation: Rotation) -> Self {
        match rotation {
            Rotation::Rotation0 => DeviceOrientation::Portrait,
            Rotation::Rotation90 => DeviceOrientation::LandscapeLeft,
            Rotation::Rotation180 => DeviceOrientation::PortraitUpsideDown,
            Rotation::Rotation270 => DeviceOrientation::LandscapeRight,
        }
    }
}

/// How a device orientation is reported as a rotation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RotationConvention {
    /// Rotation of the device itself.
    #[default]
    Device,
    /// Rotation of the display surface, the inverse of the device rotation.
    Surface,
}

/// Provides the current device rotation to the detection path.
pub trait OrientationSource: Send + Sync {
    fn current(&self) -> Rotation;
}

/// Orientation source that never changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixedOrientation(pub Rotation);

impl OrientationSource for FixedOrientation {
    fn current(&self) -> Rotation {
        self.0
    }
}

/// Hardware listener feeding an [`OrientationTracker`].
pub trait OrientationSensor: Send {
    /// Whether the hardware can report orientation at all.
    fn can_detect_orientation(&self) -> bool {
        true
    }

    fn enable(&mut self);

    fn disable(&mut self);
}

/// Sensor-driven orientation state.
///
/// Starts in `Rotation0` until the first reading arrives. After [`stop`]
/// readings are ignored and the last state is kept until [`start`] is called
/// again.
///
/// [`start`]: OrientationTracker::start
/// [`stop`]: OrientationTracker::stop
pub struct OrientationTracker {
    rotation: AtomicU8,
    listening: AtomicBool,
    convention: RotationConvention,
    sensor: Mutex<Option<Box<dyn OrientationSensor>>>,
}

impl OrientationTracker {
    /// Creates a listening tracker without a hardware sensor attached.
    /// Readings are pushed by the host through [`on_orientation_changed`]
    /// or [`on_acceleration`].
    ///
    /// [`on_orientation_changed`]: OrientationTracker::on_orientation_changed
    /// [`on_acceleration`]: OrientationTracker::on_acceleration
    pub fn new() -> Self {
        Self {
            rotation: AtomicU8::new(Rotation::Rotation0.to_bits()),
            listening: AtomicBool::new(true),
            convention: RotationConvention::default(),
            sensor: Mutex::new(None),
        }
    }

    /// Creates a tracker that owns the given sensor and enables it.
    pub fn with_sensor(sensor: Box<dyn OrientationSensor>) -> Self {
        let tracker = Self {
            rotation: AtomicU8::new(Rotation::Rotation0.to_bits()),
            listening: AtomicBool::new(false),
            convention: RotationConvention::default(),
            sensor: Mutex::new(Some(sensor)),
        };
        tracker.start();
        tracker
    }

    /// Sets the convention used to report rotations.
    pub fn convention(mut self, convention: RotationConvention) -> Self {
        self.convention = convention;
        self
    }

    /// Starts (or restarts) listening for readings.
    pub fn start(&self) {
        self.stop();

        let mut sensor = self.sensor();
        if let Some(sensor) = sensor.as_mut() {
            if !sensor.can_detect_orientation() {
                log::warn!("Device orientation cannot be detected, keeping {:?}", self.current());
                return;
            }
            log::debug!("Enabling device orientation listener");
            sensor.enable();
        }
        self.listening.store(true, Ordering::Release);
    }

    /// Stops listening. Safe to call repeatedly or before [`start`].
    ///
    /// [`start`]: OrientationTracker::start
    pub fn stop(&self) {
        if !self.listening.swap(false, Ordering::AcqRel) {
            return;
        }
        if let Some(sensor) = self.sensor().as_mut() {
            log::debug!("Disabling device orientation listener");
            sensor.disable();
        }
    }

    pub fn is_listening(&self) -> bool {
        self.listening.load(Ordering::Acquire)
    }

    /// Sensor callback for a rotation reading in degrees.
    pub fn on_orientation_changed(&self, degrees: f64) {
        self.update(DeviceOrientation::from_sensor_degrees(degrees));
    }

    /// Sensor callback for an accelerometer sample.
    pub fn on_acceleration(&self, x: f64, y: f64, z: f64) {
        self.update(DeviceOrientation::from_acceleration(x, y, z));
    }

    /// Current orientation of the device, regardless of the convention.
    pub fn orientation(&self) -> DeviceOrientation {
        let rotation = self.current();
        match self.convention {
            RotationConvention::Device => rotation.into(),
            RotationConvention::Surface => rotation.inverse().into(),
        }
    }

    fn update(&self, orientation: DeviceOrientation) {
        if !self.is_listening() {
            return;
        }

        let rotation = match self.convention {
            RotationConvention::Device => orientation.rotation(),
            RotationConvention::Surface => orientation.rotation().inverse(),
        };
        let previous = self.rotation.swap(rotation.to_bits(), Ordering::Relaxed);
        let previous = Rotation::from_bits(previous);
        if previous != rotation {
            log::debug!("Device rotation changed from {:?} -> {:?}", previous, rotation);
        }
    }

    fn sensor(&self) -> MutexGuard<'_, Option<Box<dyn OrientationSensor>>> {
        self.sensor.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for OrientationTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for OrientationTracker {
    fn drop(&mut self) {
        self.stop();
    }
}

impl OrientationSource for OrientationTracker {
    fn current(&self) -> Rotation {
        Rotation::from_bits(self.rotation.load(Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rstest::rstest;

    use super::*;

    #[derive(Default)]
    struct CountingSensor {
        enabled: Arc<AtomicU8>,
        disabled: Arc<AtomicU8>,
    }

    impl OrientationSensor for CountingSensor {
        fn enable(&mut self) {
            self.enabled.fetch_add(1, Ordering::SeqCst);
        }

        fn disable(&mut self) {
            self.disabled.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[rstest]
    #[case(0, Rotation::Rotation0)]
    #[case(90, Rotation::Rotation90)]
    #[case(180, Rotation::Rotation180)]
    #[case(270, Rotation::Rotation270)]
    #[case(-90, Rotation::Rotation270)]
    #[case(450, Rotation::Rotation90)]
    #[case(45, Rotation::Rotation0)]
    #[case(1, Rotation::Rotation0)]
    fn rotation_from_degrees(#[case] degrees: i32, #[case] expected: Rotation) {
        assert_eq!(Rotation::from_degrees(degrees), expected);
    }

    #[rstest]
    #[case(0.0, DeviceOrientation::Portrait)]
    #[case(44.9, DeviceOrientation::Portrait)]
    #[case(45.0, DeviceOrientation::LandscapeLeft)]
    #[case(100.0, DeviceOrientation::LandscapeLeft)]
    #[case(135.0, DeviceOrientation::PortraitUpsideDown)]
    #[case(200.0, DeviceOrientation::PortraitUpsideDown)]
    #[case(225.0, DeviceOrientation::LandscapeRight)]
    #[case(314.0, DeviceOrientation::LandscapeRight)]
    #[case(315.0, DeviceOrientation::Portrait)]
    #[case(460.0, DeviceOrientation::LandscapeLeft)]
    #[case(-1.0, DeviceOrientation::Portrait)]
    #[case(f64::NAN, DeviceOrientation::Portrait)]
    fn sensor_degrees_are_bucketed(#[case] degrees: f64, #[case] expected: DeviceOrientation) {
        assert_eq!(DeviceOrientation::from_sensor_degrees(degrees), expected);
    }

    #[rstest]
    #[case(0.0, -1.0, 0.0, DeviceOrientation::Portrait)]
    #[case(0.0, 1.0, 0.0, DeviceOrientation::PortraitUpsideDown)]
    #[case(1.0, 0.1, 0.0, DeviceOrientation::LandscapeRight)]
    #[case(-1.0, 0.1, 0.0, DeviceOrientation::LandscapeLeft)]
    #[case(0.5, 0.2, -0.9, DeviceOrientation::Portrait)]
    fn acceleration_is_classified(
        #[case] x: f64,
        #[case] y: f64,
        #[case] z: f64,
        #[case] expected: DeviceOrientation,
    ) {
        assert_eq!(DeviceOrientation::from_acceleration(x, y, z), expected);
    }

    #[test]
    fn tracker_starts_in_portrait() {
        let tracker = OrientationTracker::new();
        assert_eq!(tracker.current(), Rotation::Rotation0);
        assert!(tracker.is_listening());
    }

    #[test]
    fn tracker_follows_sensor_readings() {
        let tracker = OrientationTracker::new();

        tracker.on_orientation_changed(100.0);
        assert_eq!(tracker.current(), Rotation::Rotation90);

        tracker.on_orientation_changed(200.0);
        assert_eq!(tracker.current(), Rotation::Rotation180);

        tracker.on_acceleration(1.0, 0.0, 0.0);
        assert_eq!(tracker.current(), Rotation::Rotation270);
    }

    #[test]
    fn stopped_tracker_is_frozen_until_restarted() {
        let tracker = OrientationTracker::new();
        tracker.on_orientation_changed(100.0);

        tracker.stop();
        tracker.stop();
        tracker.on_orientation_changed(200.0);
        assert_eq!(tracker.current(), Rotation::Rotation90);
        assert!(!tracker.is_listening());

        tracker.start();
        tracker.on_orientation_changed(200.0);
        assert_eq!(tracker.current(), Rotation::Rotation180);
    }

    #[test]
    fn surface_convention_inverts_landscape() {
        let tracker = OrientationTracker::new().convention(RotationConvention::Surface);

        tracker.on_orientation_changed(100.0);
        assert_eq!(tracker.current(), Rotation::Rotation270);
        assert_eq!(tracker.orientation(), DeviceOrientation::LandscapeLeft);

        tracker.on_orientation_changed(200.0);
        assert_eq!(tracker.current(), Rotation::Rotation180);
    }

    #[test]
    fn sensor_is_enabled_and_released() {
        let sensor = CountingSensor::default();
        let (enabled, disabled) = (sensor.enabled.clone(), sensor.disabled.clone());

        let tracker = OrientationTracker::with_sensor(Box::new(sensor));
        assert_eq!(enabled.load(Ordering::SeqCst), 1);

        tracker.stop();
        tracker.stop();
        assert_eq!(disabled.load(Ordering::SeqCst), 1);

        tracker.start();
        assert_eq!(enabled.load(Ordering::SeqCst), 2);

        drop(tracker);
        assert_eq!(disabled.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn tracker_is_shareable_as_source() {
        let tracker = Arc::new(OrientationTracker::new());
        let source: Arc<dyn OrientationSource> = tracker.clone();

        std::thread::spawn(move || tracker.on_orientation_changed(250.0))
            .join()
            .unwrap();
        assert_eq!(source.current(), Rotation::Rotation270);
    }
}
