//! Path annotation enums
//!
//! These tags are attached to path nodes and path segments and are consumed by
//! the downstream sweep-profile generator.

use serde::{Deserialize, Serialize};

/// Geometric curve category of a compound path run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathCurveType {
    /// Straight polyline run
    Straight,
    /// Circular run along a ring of the circular grid
    Arc,
    /// Offset-Z shaped double bend in one plane
    SCurve,
    /// Single-plane quarter turn
    #[serde(rename = "curve_90")]
    Curve90,
}

impl std::fmt::Display for PathCurveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Straight => write!(f, "straight"),
            Self::Arc => write!(f, "arc"),
            Self::SCurve => write!(f, "s_curve"),
            Self::Curve90 => write!(f, "curve_90"),
        }
    }
}

/// Curve detector selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveDetector {
    /// Sliding six-node S-curve detector
    SCurve,
    /// Five/seven-node quarter turn detector
    #[serde(rename = "curve_90")]
    Curve90,
    /// Contiguous circular-grid runs
    CircularRun,
}

impl CurveDetector {
    /// All detectors in priority order.
    pub fn all() -> Vec<CurveDetector> {
        vec![Self::SCurve, Self::Curve90, Self::CircularRun]
    }
}

/// How a segment is turned into a sweep path downstream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DesignStrategy {
    /// Lone stitch between two neighbouring segments
    Single,
    /// Polyline, arc or classified curve run
    Compound,
    /// Smooth multi-node curve
    Spline,
}

impl DesignStrategy {
    /// All strategies.
    pub fn all() -> Vec<DesignStrategy> {
        vec![Self::Single, Self::Compound, Self::Spline]
    }
}

impl std::fmt::Display for DesignStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Single => write!(f, "single"),
            Self::Compound => write!(f, "compound"),
            Self::Spline => write!(f, "spline"),
        }
    }
}

/// Cross-section profile swept along a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathProfileType {
    LShape,
    LShapeAdjustedHeight,
    LShapePathColor,
    LShapeMirrored,
    LShapeMirroredAdjustedHeight,
    LShapeMirroredPathColor,
    OShape,
    OShapeSupport,
    UShape,
    UShapeAdjustedHeight,
    UShapePathColor,
    VShape,
    VShapePathColor,
    SquareClosedShape,
    SquareWithHoleShape,
}

impl PathProfileType {
    /// Profiles a path body may be swept with.
    ///
    /// Support and accent profiles are excluded; they are derived through
    /// [`PathProfileType::support_profile`] and
    /// [`PathProfileType::accent_profile`].
    pub fn path_profiles() -> Vec<PathProfileType> {
        vec![
            Self::LShape,
            Self::LShapeAdjustedHeight,
            Self::LShapeMirrored,
            Self::LShapeMirroredAdjustedHeight,
            Self::OShape,
            Self::UShape,
            Self::UShapeAdjustedHeight,
            Self::VShape,
            Self::SquareClosedShape,
            Self::SquareWithHoleShape,
        ]
    }

    /// Profiles that can anchor a mounting bridge.
    pub fn mounting_profiles() -> [PathProfileType; 3] {
        [Self::OShape, Self::UShape, Self::UShapeAdjustedHeight]
    }

    /// Support structure swept beneath this profile, if any.
    pub fn support_profile(self) -> Option<PathProfileType> {
        match self {
            Self::OShape => Some(Self::OShapeSupport),
            _ => None,
        }
    }

    /// Accent (colored inlay) profile for this profile, if any.
    pub fn accent_profile(self) -> Option<PathProfileType> {
        match self {
            Self::UShape | Self::UShapeAdjustedHeight | Self::SquareWithHoleShape => {
                Some(Self::UShapePathColor)
            }
            Self::VShape => Some(Self::VShapePathColor),
            Self::LShape | Self::LShapeAdjustedHeight => Some(Self::LShapePathColor),
            Self::LShapeMirrored | Self::LShapeMirroredAdjustedHeight => {
                Some(Self::LShapeMirroredPathColor)
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for PathProfileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::LShape => "l_shape",
            Self::LShapeAdjustedHeight => "l_shape_adjusted_height",
            Self::LShapePathColor => "l_shape_path_color",
            Self::LShapeMirrored => "l_shape_mirrored",
            Self::LShapeMirroredAdjustedHeight => "l_shape_mirrored_adjusted_height",
            Self::LShapeMirroredPathColor => "l_shape_mirrored_path_color",
            Self::OShape => "o_shape",
            Self::OShapeSupport => "o_shape_support",
            Self::UShape => "u_shape",
            Self::UShapeAdjustedHeight => "u_shape_adjusted_height",
            Self::UShapePathColor => "u_shape_path_color",
            Self::VShape => "v_shape",
            Self::VShapePathColor => "v_shape_path_color",
            Self::SquareClosedShape => "square_closed_shape",
            Self::SquareWithHoleShape => "square_with_hole_shape",
        };
        write!(f, "{}", name)
    }
}

/// Corner treatment between consecutive sweep edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionType {
    Round,
    Right,
}

impl TransitionType {
    /// The other transition.
    pub fn flipped(self) -> Self {
        match self {
            Self::Round => Self::Right,
            Self::Right => Self::Round,
        }
    }
}
