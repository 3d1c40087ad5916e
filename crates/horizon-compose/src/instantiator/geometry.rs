//! Canvas geometry construction.
//!
//! Canvas geometries have their own identity-keyed cache. Operands are built
//! before the geometry that combines them, since a native geometry is
//! immutable once constructed.

use horizon_compose_graph::{CanvasGeometry, GeometryId, PathCommand, UnrecognizedTag};

use super::Session;
use crate::compositor::{CanvasPathCommand, Compositor};
use crate::error::{InstantiationError, InstantiationResult};
use crate::logging::targets;

impl<C: Compositor> Session<'_, C> {
    /// The native geometry for `id`, built on first use.
    pub(super) fn canvas_geometry(&mut self, id: GeometryId) -> InstantiationResult<C::Geometry> {
        if let Some(geometry) = self.geometries.get(id) {
            self.stats.cache_hits += 1;
            tracing::trace!(target: targets::GEOMETRY, ?id, "cache hit");
            return Ok(geometry.clone());
        }

        let graph = self.graph;
        let source = graph
            .geometry(id)
            .ok_or(InstantiationError::MissingGeometry { geometry: id })?;

        let geometry = match source {
            CanvasGeometry::Combination { a, b, matrix, mode } => {
                let mode = mode.resolve()?;
                let a = self.canvas_geometry(*a)?;
                let b = self.canvas_geometry(*b)?;
                self.compositor.create_combination(&a, &b, *matrix, mode)
            }
            CanvasGeometry::Ellipse { center, radius } => {
                self.compositor.create_ellipse(*center, *radius)
            }
            CanvasGeometry::RoundedRectangle {
                origin,
                size,
                radius,
            } => self.compositor.create_rounded_rectangle(*origin, *size, *radius),
            CanvasGeometry::Path {
                fill_rule,
                commands,
            } => {
                let commands = commands
                    .iter()
                    .map(resolve_command)
                    .collect::<Result<Vec<_>, _>>()?;
                self.compositor.create_path_geometry(*fill_rule, &commands)
            }
            CanvasGeometry::Group {
                fill_rule,
                geometries,
            } => {
                let members = geometries
                    .iter()
                    .map(|member| self.canvas_geometry(*member))
                    .collect::<InstantiationResult<Vec<_>>>()?;
                self.compositor.create_group(*fill_rule, &members)
            }
            CanvasGeometry::Transformed { source, matrix } => {
                let source = self.canvas_geometry(*source)?;
                self.compositor.create_transformed(&source, *matrix)
            }
            CanvasGeometry::Unrecognized { tag } => {
                return Err(InstantiationError::UnrecognizedGeometry {
                    geometry: id,
                    tag: *tag,
                });
            }
        };

        self.geometries.insert(id, geometry.clone());
        self.stats.geometries_created += 1;
        tracing::trace!(target: targets::GEOMETRY, ?id, "created canvas geometry");
        Ok(geometry)
    }
}

fn resolve_command(command: &PathCommand) -> Result<CanvasPathCommand, UnrecognizedTag> {
    Ok(match *command {
        PathCommand::BeginFigure { start } => CanvasPathCommand::BeginFigure { start },
        PathCommand::AddLine { end } => CanvasPathCommand::AddLine { end },
        PathCommand::AddCubicBezier {
            control_point1,
            control_point2,
            end,
        } => CanvasPathCommand::AddCubicBezier {
            control_point1,
            control_point2,
            end,
        },
        PathCommand::EndFigure { figure_loop } => CanvasPathCommand::EndFigure {
            figure_loop: figure_loop.resolve()?,
        },
    })
}
