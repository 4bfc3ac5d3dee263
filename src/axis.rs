use crate::{Error, Result};

/// The canonical (c, x, y, z, t) axis order used internally, regardless of
/// the order a dataset declares its axes in.
pub const CANONICAL_AXES: [Axis; 5] = [Axis::Component, Axis::X, Axis::Y, Axis::Z, Axis::Time];

/// One of the five logical axes an NGFF dataset may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Component,
    X,
    Y,
    Z,
    Time,
}

impl Axis {
    /// Parse an NGFF axis name.
    pub fn from_name(name: &str) -> Result<Self> {
        let out = match name {
            "c" => Self::Component,
            "x" => Self::X,
            "y" => Self::Y,
            "z" => Self::Z,
            "t" => Self::Time,
            other => return Err(Error::malformed(format!("unknown axis name {other:?}"))),
        };
        Ok(out)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Component => "c",
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
            Self::Time => "t",
        }
    }

    /// Slot of this axis in the canonical fixed-length-5 arrays.
    pub fn canonical_index(&self) -> usize {
        match self {
            Self::Component => 0,
            Self::X => 1,
            Self::Y => 2,
            Self::Z => 3,
            Self::Time => 4,
        }
    }

    pub fn is_spatial(&self) -> bool {
        matches!(self, Self::X | Self::Y | Self::Z)
    }
}

/// Number of spatial (x, y, z) axes among a declared axis list; this is the
/// dimensionality of the image.
pub fn spatial_dimension_of(axes: &[Axis]) -> usize {
    axes.iter().filter(|a| a.is_spatial()).count()
}
