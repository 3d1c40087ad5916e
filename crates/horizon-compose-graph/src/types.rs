//! Value types shared by the description graph and the compositor surface.
//!
//! Vectors and matrices come from `glam`. The small closed enumerations
//! below are the ones a producer encodes as integers; fields that carry them
//! hold a [`Tag`] so an out-of-range value survives parsing and is reported
//! when the graph is instantiated.

use std::fmt;

use crate::error::UnrecognizedTag;

pub use glam::{Affine2, Mat4, Vec2, Vec3, Vec4};

/// An 8-bit ARGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub a: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// Create a color from alpha, red, green and blue components.
    #[inline]
    pub const fn from_argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self { a, r, g, b }
    }

    /// Create an opaque color.
    #[inline]
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { a: 0xFF, r, g, b }
    }

    pub const TRANSPARENT: Self = Self::from_argb(0, 0, 0, 0);
    pub const BLACK: Self = Self::from_rgb(0, 0, 0);
    pub const WHITE: Self = Self::from_rgb(0xFF, 0xFF, 0xFF);
    pub const RED: Self = Self::from_rgb(0xFF, 0, 0);
    pub const GREEN: Self = Self::from_rgb(0, 0xFF, 0);
    pub const BLUE: Self = Self::from_rgb(0, 0, 0xFF);
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}{:02X}", self.a, self.r, self.g, self.b)
    }
}

/// A closed enumeration whose values may arrive as raw integers.
pub trait Enumeration: Copy + fmt::Debug {
    /// Human-readable name of the enumeration, used in error reports.
    const NAME: &'static str;
}

/// A value of a closed enumeration as delivered by a producer.
///
/// `Unrecognized` keeps the raw tag of a value this build does not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag<T> {
    Known(T),
    Unrecognized(u32),
}

impl<T: Enumeration> Tag<T> {
    /// Resolve to the known value, or report the raw tag.
    pub fn resolve(self) -> Result<T, UnrecognizedTag> {
        match self {
            Self::Known(value) => Ok(value),
            Self::Unrecognized(tag) => Err(UnrecognizedTag {
                enumeration: T::NAME,
                tag,
            }),
        }
    }

    /// The known value, if any.
    pub fn known(self) -> Option<T> {
        match self {
            Self::Known(value) => Some(value),
            Self::Unrecognized(_) => None,
        }
    }
}

impl<T> From<T> for Tag<T> {
    fn from(value: T) -> Self {
        Self::Known(value)
    }
}

macro_rules! enumeration {
    ($(#[$meta:meta])* $name:ident, $label:literal { $($(#[$vmeta:meta])* $variant:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl Enumeration for $name {
            const NAME: &'static str = $label;
        }
    };
}

enumeration! {
    /// How the edges of a visual are antialiased.
    BorderMode, "border mode" { Inherit, Soft, Hard }
}

enumeration! {
    /// Shape at the end of a stroke or dash.
    StrokeCap, "stroke cap" { Flat, Square, Round, Triangle }
}

enumeration! {
    /// Shape at the corners of a stroke.
    LineJoin, "stroke line join" { Miter, Bevel, Round, MiterOrBevel }
}

enumeration! {
    /// Boolean operation used to combine two canvas geometries.
    CombineMode, "combine mode" { Union, Exclude, Intersect, Xor }
}

enumeration! {
    /// Whether a path figure is closed when it ends.
    FigureLoop, "figure loop" { Open, Closed }
}

enumeration! {
    /// Fill rule for paths and geometry groups.
    FillRule, "fill rule" { Alternate, Winding }
}

enumeration! {
    /// Behavior of a gradient outside its stop range.
    ExtendMode, "extend mode" { Clamp, Wrap, Mirror }
}

enumeration! {
    /// Coordinate space of gradient points.
    MappingMode, "mapping mode" { Absolute, Relative }
}
