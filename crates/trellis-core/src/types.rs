//! Core value types for the Trellis layout engine.

use std::fmt;

/// Position tolerance for solved geometry. Rectangle invariants are
/// guaranteed to hold within this tolerance whenever the system is
/// satisfiable.
pub const POSITION_TOLERANCE: f64 = 1e-5;

/// Default gap between arranged symbols, in diagram units.
pub const DEFAULT_GAP: f64 = 20.0;

/// Default padding between a container and its enclosed children.
pub const DEFAULT_PADDING: f64 = 10.0;

/// Identifier of a registered symbol, formatted `plugin:name/sequence`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SymbolId(pub String);

impl SymbolId {
    /// Compose an id from its parts.
    pub fn new(plugin: &str, name: &str, sequence: u64) -> Self {
        Self(format!("{}:{}/{}", plugin, name, sequence))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a hint registration, formatted `hint:label/sequence`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HintId(pub String);

impl HintId {
    /// Compose an id from its parts.
    pub fn new(label: &str, sequence: u64) -> Self {
        Self(format!("hint:{}/{}", label, sequence))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Constraint strength tiers, strongest first.
///
/// Required constraints must hold; the lower tiers are satisfied
/// best-effort, each tier dominating everything below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Strength {
    Required,
    Strong,
    Medium,
    Weak,
}

impl Strength {
    pub fn is_required(self) -> bool {
        matches!(self, Strength::Required)
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strength::Required => "required",
            Strength::Strong => "strong",
            Strength::Medium => "medium",
            Strength::Weak => "weak",
        };
        f.write_str(name)
    }
}

/// Layout axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    /// The other axis.
    pub fn orthogonal(self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }
}

/// Kind of rectangle a bounds aggregate represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BoundsKind {
    /// A symbol's main rectangle.
    Symbol,
    /// The containment area of a container symbol.
    Container,
    /// The inner item area of a symbol.
    Item,
    /// A free-standing rectangle not owned by any symbol.
    Free,
}

/// Alignable attribute of a bounds aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AlignAttr {
    Left,
    Right,
    Top,
    Bottom,
    CenterX,
    CenterY,
    Width,
    Height,
}

impl fmt::Display for AlignAttr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AlignAttr::Left => "left",
            AlignAttr::Right => "right",
            AlignAttr::Top => "top",
            AlignAttr::Bottom => "bottom",
            AlignAttr::CenterX => "center_x",
            AlignAttr::CenterY => "center_y",
            AlignAttr::Width => "width",
            AlignAttr::Height => "height",
        };
        f.write_str(name)
    }
}
