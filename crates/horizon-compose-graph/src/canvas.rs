//! Canvas geometry descriptions.
//!
//! Canvas geometries are the 2-D shape descriptions wrapped by path nodes.
//! They form their own sub-graph with their own identities: a combination
//! refers to its operands by [`GeometryId`], and the same geometry can be
//! shared by any number of paths.

use slotmap::new_key_type;

use crate::types::{Affine2, CombineMode, FigureLoop, FillRule, Tag, Vec2};

new_key_type! {
    /// Identity of a canvas geometry in a [`SourceGraph`](crate::SourceGraph).
    pub struct GeometryId;
}

/// A 2-D geometry description.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasGeometry {
    /// Boolean combination of two geometries. `matrix` transforms `b`
    /// before combining.
    Combination {
        a: GeometryId,
        b: GeometryId,
        matrix: Affine2,
        mode: Tag<CombineMode>,
    },
    Ellipse {
        center: Vec2,
        radius: Vec2,
    },
    RoundedRectangle {
        origin: Vec2,
        size: Vec2,
        radius: Vec2,
    },
    /// A path built from a command stream.
    Path {
        fill_rule: FillRule,
        commands: Vec<PathCommand>,
    },
    Group {
        fill_rule: FillRule,
        geometries: Vec<GeometryId>,
    },
    Transformed {
        source: GeometryId,
        matrix: Affine2,
    },
    /// A geometry kind this build does not know.
    Unrecognized {
        tag: u32,
    },
}

impl CanvasGeometry {
    /// Geometries this geometry is built from.
    pub fn operands(&self) -> Vec<GeometryId> {
        match self {
            Self::Combination { a, b, .. } => vec![*a, *b],
            Self::Group { geometries, .. } => geometries.clone(),
            Self::Transformed { source, .. } => vec![*source],
            Self::Ellipse { .. }
            | Self::RoundedRectangle { .. }
            | Self::Path { .. }
            | Self::Unrecognized { .. } => Vec::new(),
        }
    }
}

/// One command of a path command stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    BeginFigure { start: Vec2 },
    AddLine { end: Vec2 },
    AddCubicBezier {
        control_point1: Vec2,
        control_point2: Vec2,
        end: Vec2,
    },
    EndFigure { figure_loop: Tag<FigureLoop> },
}

/// Incremental builder for [`CanvasGeometry::Path`].
#[derive(Debug, Clone, Default)]
pub struct PathBuilder {
    fill_rule: Option<FillRule>,
    commands: Vec<PathCommand>,
}

impl PathBuilder {
    /// Create an empty builder using the alternate fill rule.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fill_rule(mut self, fill_rule: FillRule) -> Self {
        self.fill_rule = Some(fill_rule);
        self
    }

    pub fn begin_figure(mut self, start: Vec2) -> Self {
        self.commands.push(PathCommand::BeginFigure { start });
        self
    }

    pub fn line_to(mut self, end: Vec2) -> Self {
        self.commands.push(PathCommand::AddLine { end });
        self
    }

    pub fn cubic_to(mut self, control_point1: Vec2, control_point2: Vec2, end: Vec2) -> Self {
        self.commands.push(PathCommand::AddCubicBezier {
            control_point1,
            control_point2,
            end,
        });
        self
    }

    pub fn end_figure(mut self, figure_loop: impl Into<Tag<FigureLoop>>) -> Self {
        self.commands.push(PathCommand::EndFigure {
            figure_loop: figure_loop.into(),
        });
        self
    }

    pub fn build(self) -> CanvasGeometry {
        CanvasGeometry::Path {
            fill_rule: self.fill_rule.unwrap_or(FillRule::Alternate),
            commands: self.commands,
        }
    }
}
