use cubecast_common::CubeId;

/// Why a placement was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementReason {
    OutOfBounds,
    Collision,
}

impl std::fmt::Display for PlacementReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlacementReason::OutOfBounds => write!(f, "out of world bounds"),
            PlacementReason::Collision => write!(f, "blocked by a non-traversable cube"),
        }
    }
}

/// Caller-facing errors from world operations. None of these are fatal;
/// they travel back through the same request/response channel as success.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    #[error("cube {0} not found")]
    NotFound(CubeId),
    #[error("placement at ({x:.1}, {y:.1}, {z:.1}) rejected: {reason}")]
    Placement {
        x: f32,
        y: f32,
        z: f32,
        reason: PlacementReason,
    },
    #[error("cube {0} is not moveable")]
    Immovable(CubeId),
    #[error("cube {id} does not support {operation}")]
    Capability { id: CubeId, operation: &'static str },
}

impl WorldError {
    /// Short machine-readable kind tag for the response channel.
    pub fn kind(&self) -> &'static str {
        match self {
            WorldError::NotFound(_) => "not_found",
            WorldError::Placement { .. } => "placement",
            WorldError::Immovable(_) => "immovable",
            WorldError::Capability { .. } => "capability",
        }
    }
}
