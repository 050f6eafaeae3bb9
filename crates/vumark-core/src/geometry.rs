//! Display geometry - surface size, orientation and rotation

/// Device orientation, numbered the way the host platform reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i32)]
pub enum Orientation {
    #[default]
    Undefined = 0,
    Portrait = 1,
    Landscape = 2,
}

impl Orientation {
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            1 => Orientation::Portrait,
            2 => Orientation::Landscape,
            _ => Orientation::Undefined,
        }
    }

    pub fn as_raw(self) -> i32 {
        self as i32
    }
}

/// Display rotation in quarter turns from the natural orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i32)]
pub enum Rotation {
    #[default]
    Rotation0 = 0,
    Rotation90 = 1,
    Rotation180 = 2,
    Rotation270 = 3,
}

impl Rotation {
    /// Values outside 0..=3 wrap around.
    pub fn from_raw(raw: i32) -> Self {
        match raw.rem_euclid(4) {
            1 => Rotation::Rotation90,
            2 => Rotation::Rotation180,
            3 => Rotation::Rotation270,
            _ => Rotation::Rotation0,
        }
    }

    pub fn as_raw(self) -> i32 {
        self as i32
    }

    pub fn degrees(self) -> u32 {
        self as u32 * 90
    }
}

/// Pixel size of the rendering surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Orientation and rotation as a pair; a change in either invalidates the
/// engine's projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DisplayPose {
    pub orientation: Orientation,
    pub rotation: Rotation,
}

impl DisplayPose {
    pub fn new(orientation: Orientation, rotation: Rotation) -> Self {
        Self {
            orientation,
            rotation,
        }
    }
}

/// Everything the engine needs to (re)configure its viewport and projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DisplayGeometry {
    pub width: u32,
    pub height: u32,
    pub orientation: Orientation,
    pub rotation: Rotation,
}

impl DisplayGeometry {
    pub fn new(size: SurfaceSize, pose: DisplayPose) -> Self {
        Self {
            width: size.width,
            height: size.height,
            orientation: pose.orientation,
            rotation: pose.rotation,
        }
    }

    pub fn size(&self) -> SurfaceSize {
        SurfaceSize::new(self.width, self.height)
    }

    pub fn pose(&self) -> DisplayPose {
        DisplayPose::new(self.orientation, self.rotation)
    }
}
