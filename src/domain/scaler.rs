/// Scale-derived geometry constants.
///
/// Every buffer and size used by the layout passes is `floor(base × scale)`.
/// A `Scaler` is an immutable value; rescaling returns a new one.

const MIN_SIZE: f64 = 50.0;
const ACCESS_BUFFER: f64 = 10.0;
const VERTICAL_BUFFER: f64 = 20.0;
const CLASS_VERTICAL_BUFFER: f64 = 100.0;
const HORIZONTAL_BUFFER: f64 = 20.0;
const OBJECTS_BUFFER: f64 = 400.0;
const LINE_WIDTH: f64 = 10.0;

/// Perpendicular displacement of a call-edge control point, as a fraction
/// of the edge length.
pub const CURVATURE: f32 = 0.25;

/// Largest accepted scale. Beyond it the derived constants stop fitting a
/// realistic layout in `i32` coordinates.
pub const MAX_SCALE: f64 = 100.0;

/// Scales are snapped to this resolution so that `k` then `1/k` lands back
/// on the starting value.
const SCALE_RESOLUTION: f64 = 1e9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scaler {
    pub scale: f64,
    /// Side of a code line box; never below one pixel.
    pub min_size: i32,
    /// Height of the access strip on top of a function.
    pub access_buffer: i32,
    pub vertical_buffer: i32,
    /// Vertical gap between members of a class or struct.
    pub class_vertical_buffer: i32,
    pub horizontal_buffer: i32,
    /// Gap between independent roots.
    pub objects_buffer: i32,
    pub line_width: i32,
    pub curvature: f32,
}

impl Default for Scaler {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Scaler {
    pub fn new(scale: f64) -> Self {
        // The epsilon absorbs products like 0.8999999999999999 × 50.
        let derive = |base: f64| (base * scale + 1e-9).floor() as i32;
        Self {
            scale,
            min_size: derive(MIN_SIZE).max(1),
            access_buffer: derive(ACCESS_BUFFER),
            vertical_buffer: derive(VERTICAL_BUFFER),
            class_vertical_buffer: derive(CLASS_VERTICAL_BUFFER),
            horizontal_buffer: derive(HORIZONTAL_BUFFER),
            objects_buffer: derive(OBJECTS_BUFFER),
            line_width: derive(LINE_WIDTH).max(1),
            curvature: CURVATURE,
        }
    }

    /// New constants for `scale × factor`. Layout is not re-run.
    pub fn rescale(&self, factor: f64) -> Scaler {
        let scale = (self.scale * factor * SCALE_RESOLUTION).round() / SCALE_RESOLUTION;
        Scaler::new(scale)
    }

    /// Finite, positive and at most `MAX_SCALE`.
    pub fn is_valid_scale(scale: f64) -> bool {
        scale.is_finite() && scale > 0.0 && scale <= MAX_SCALE
    }

    /// Horizontal start of the first root.
    pub fn root_margin(&self) -> i32 {
        self.objects_buffer / 4
    }
}
