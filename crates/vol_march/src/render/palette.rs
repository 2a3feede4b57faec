//! 1-D color ramps mapping normalized values to colors.
use glam::Vec3;
use tracing::warn;

/// A 1-D color lookup sampled by a normalized value in `[0, 1]`.
pub trait Palette: Send + Sync {
    fn sample(&self, t: f32) -> Vec3;
}

/// Evenly spaced color stops, linearly interpolated.
#[derive(Clone, Debug)]
pub struct ColorRamp {
    stops: Vec<Vec3>,
}

impl ColorRamp {
    /// Creates a ramp from evenly spaced stops.
    pub fn new(stops: Vec<Vec3>) -> Self {
        if stops.is_empty() {
            warn!("Color ramp has no stops; it will sample black.");
        }
        Self { stops }
    }

    /// Black to white.
    pub fn grayscale() -> Self {
        Self::new(vec![Vec3::ZERO, Vec3::ONE])
    }

    /// Deep blue through cyan to white, for atmosphere-like media.
    pub fn atmosphere() -> Self {
        Self::new(vec![
            Vec3::new(0.016, 0.047, 0.216),
            Vec3::new(0.078, 0.231, 0.529),
            Vec3::new(0.235, 0.490, 0.757),
            Vec3::new(0.518, 0.745, 0.894),
            Vec3::new(0.839, 0.925, 0.973),
            Vec3::new(1.0, 1.0, 1.0),
        ])
    }

    /// The familiar perceptually uniform dark-purple-to-yellow ramp.
    pub fn viridis() -> Self {
        Self::new(vec![
            Vec3::new(0.267, 0.004, 0.329),
            Vec3::new(0.282, 0.140, 0.457),
            Vec3::new(0.253, 0.265, 0.529),
            Vec3::new(0.206, 0.371, 0.553),
            Vec3::new(0.163, 0.471, 0.558),
            Vec3::new(0.127, 0.566, 0.550),
            Vec3::new(0.134, 0.658, 0.517),
            Vec3::new(0.266, 0.749, 0.440),
            Vec3::new(0.477, 0.821, 0.318),
            Vec3::new(0.741, 0.873, 0.150),
            Vec3::new(0.993, 0.906, 0.144),
        ])
    }
}

impl Palette for ColorRamp {
    fn sample(&self, t: f32) -> Vec3 {
        let t = t.clamp(0.0, 1.0);

        if self.stops.is_empty() {
            return Vec3::ZERO;
        }
        if self.stops.len() == 1 {
            return self.stops[0];
        }

        let n = self.stops.len() - 1;
        let idx = ((t * n as f32).floor() as usize).min(n - 1);
        let frac = t * n as f32 - idx as f32;
        self.stops[idx].lerp(self.stops[idx + 1], frac)
    }
}
