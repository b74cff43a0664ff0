use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};

/// Stable handle for every cell in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellId(pub Uuid);

impl CellId {
    /// Generate a new random cell ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CellId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// Organism identity label shared by every cell of one organism.
///
/// The label references the organism-owning cell, which is where eating
/// credits energy. Membership is decided by equality only; the label is never
/// used to walk the organism's structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrganismId(pub CellId);

impl OrganismId {
    /// The cell that owns this organism's energy reserve.
    pub fn owner(self) -> CellId {
        self.0
    }
}

impl fmt::Display for OrganismId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "org:{}", self.0)
    }
}

/// Behavioral role of a cell. Every system filters on this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellKind {
    /// Plain body tissue. Connectors latch onto it.
    Structure,
    /// Latches onto foreign structure cells and merges organisms.
    Connector,
    /// Consumes overlapping food cells.
    Mouth,
    /// Passive storage tissue.
    Storage,
    /// Spends accumulated energy to clone its organism.
    Reproducer,
    /// Free-floating nutrient.
    Food,
}

impl CellKind {
    /// All kinds, in declaration order.
    pub const ALL: [CellKind; 6] = [
        Self::Structure,
        Self::Connector,
        Self::Mouth,
        Self::Storage,
        Self::Reproducer,
        Self::Food,
    ];

    /// Parse a kind from its snake_case name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "structure" => Some(Self::Structure),
            "connector" => Some(Self::Connector),
            "mouth" => Some(Self::Mouth),
            "storage" => Some(Self::Storage),
            "reproducer" => Some(Self::Reproducer),
            "food" => Some(Self::Food),
            _ => None,
        }
    }
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Structure => write!(f, "structure"),
            Self::Connector => write!(f, "connector"),
            Self::Mouth => write!(f, "mouth"),
            Self::Storage => write!(f, "storage"),
            Self::Reproducer => write!(f, "reproducer"),
            Self::Food => write!(f, "food"),
        }
    }
}

/// Physical parameters of a circular cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsProperties {
    /// Collision radius. Must be positive.
    pub radius: f32,
    /// Velocity damping factor in [0, 1]; 1 keeps all velocity.
    pub friction: f32,
    /// Restitution on boundary contact in [0, 1].
    pub bounciness: f32,
}

impl Default for PhysicsProperties {
    fn default() -> Self {
        Self {
            radius: 0.5,
            friction: 0.5,
            bounciness: 0.5,
        }
    }
}

impl PhysicsProperties {
    /// Check the ranges required by the solver.
    pub fn validate(&self) -> CoreResult<()> {
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(CoreError::Validation(format!(
                "radius must be positive, got {}",
                self.radius
            )));
        }
        if !(0.0..=1.0).contains(&self.friction) {
            return Err(CoreError::Validation(format!(
                "friction must be in [0, 1], got {}",
                self.friction
            )));
        }
        if !(0.0..=1.0).contains(&self.bounciness) {
            return Err(CoreError::Validation(format!(
                "bounciness must be in [0, 1], got {}",
                self.bounciness
            )));
        }
        Ok(())
    }
}

/// Directed elastic link from its owning cell to `target`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    /// The cell this link pulls toward.
    pub target: CellId,
    /// Distance the link tries to maintain.
    pub rest_length: f32,
    /// Fraction of the error corrected per pass, in [0, 1].
    pub stiffness: f32,
}

impl Constraint {
    /// Create a link to `target`.
    pub fn new(target: CellId, rest_length: f32, stiffness: f32) -> Self {
        Self {
            target,
            rest_length,
            stiffness,
        }
    }

    /// Check `rest_length >= 0` and `stiffness` in [0, 1].
    pub fn validate(&self) -> CoreResult<()> {
        if !(self.rest_length.is_finite() && self.rest_length >= 0.0) {
            return Err(CoreError::Validation(format!(
                "rest length must be non-negative, got {}",
                self.rest_length
            )));
        }
        if !(0.0..=1.0).contains(&self.stiffness) {
            return Err(CoreError::Validation(format!(
                "stiffness must be in [0, 1], got {}",
                self.stiffness
            )));
        }
        Ok(())
    }
}

/// The atomic simulated unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// Unique identifier for this cell.
    pub id: CellId,
    /// Behavioral role.
    pub kind: CellKind,
    /// Current world position.
    pub position: Vec2,
    /// Position one tick ago. Implicit velocity is `position - previous_position`.
    pub previous_position: Vec2,
    /// Radius, friction and bounciness.
    pub physics: PhysicsProperties,
    /// Organism membership label.
    pub organism: OrganismId,
    /// Energy reserve, present on organism owners and food.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub energy: Option<f32>,
    /// Elastic links owned by this cell, processed in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<Constraint>,
}

impl Cell {
    /// Create a resting cell that is its own organism.
    pub fn new(kind: CellKind, position: Vec2) -> Self {
        Self::with_id(CellId::new(), kind, position)
    }

    /// Create a cell with a pre-assigned ID.
    pub fn with_id(id: CellId, kind: CellKind, position: Vec2) -> Self {
        Self {
            id,
            kind,
            position,
            previous_position: position,
            physics: PhysicsProperties::default(),
            organism: OrganismId(id),
            energy: None,
            constraints: Vec::new(),
        }
    }

    /// Create a food cell carrying `value` energy.
    pub fn food(position: Vec2, value: f32) -> Self {
        Self::new(CellKind::Food, position).with_energy(value)
    }

    /// Replace the physical properties.
    pub fn with_physics(mut self, physics: PhysicsProperties) -> Self {
        self.physics = physics;
        self
    }

    /// Set only the radius, keeping friction and bounciness.
    pub fn with_radius(mut self, radius: f32) -> Self {
        self.physics.radius = radius;
        self
    }

    /// Attach an energy reserve.
    pub fn with_energy(mut self, energy: f32) -> Self {
        self.energy = Some(energy);
        self
    }

    /// Join an existing organism.
    pub fn with_organism(mut self, organism: OrganismId) -> Self {
        self.organism = organism;
        self
    }

    /// Append a link.
    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Give the cell an initial implicit velocity.
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.previous_position = self.position - velocity;
        self
    }

    /// Implicit velocity derived from the last two positions.
    pub fn velocity(&self) -> Vec2 {
        self.position - self.previous_position
    }

    /// Whether this cell owns its organism's energy reserve.
    pub fn is_organism_owner(&self) -> bool {
        self.organism.owner() == self.id
    }

    /// Check every invariant the solver relies on.
    pub fn validate(&self) -> CoreResult<()> {
        if !(self.position.is_finite() && self.previous_position.is_finite()) {
            return Err(CoreError::Validation(format!(
                "cell {} has a non-finite position",
                self.id
            )));
        }
        self.physics.validate()?;
        for constraint in &self.constraints {
            constraint.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_id_display_shows_short_form() {
        let id = CellId(Uuid::parse_str("a3f2b1c8-1234-5678-9abc-def012345678").unwrap());
        assert_eq!(id.to_string(), "a3f2b1c8");
        assert_eq!(OrganismId(id).to_string(), "org:a3f2b1c8");
    }

    #[test]
    fn new_cell_is_its_own_organism_at_rest() {
        let cell = Cell::new(CellKind::Structure, Vec2::new(3.0, -2.0));
        assert_eq!(cell.organism, OrganismId(cell.id));
        assert!(cell.is_organism_owner());
        assert_eq!(cell.velocity(), Vec2::ZERO);
        assert!(cell.energy.is_none());
        assert!(cell.constraints.is_empty());
    }

    #[test]
    fn with_velocity_sets_previous_position() {
        let cell = Cell::new(CellKind::Mouth, Vec2::new(10.0, 10.0)).with_velocity(Vec2::X);
        assert_eq!(cell.previous_position, Vec2::new(9.0, 10.0));
        assert_eq!(cell.velocity(), Vec2::X);
    }

    #[test]
    fn food_carries_energy() {
        let food = Cell::food(Vec2::ZERO, 5.0);
        assert_eq!(food.kind, CellKind::Food);
        assert_eq!(food.energy, Some(5.0));
    }

    #[test]
    fn kind_parse_round_trips_display() {
        for kind in CellKind::ALL {
            assert_eq!(CellKind::parse(&kind.to_string()), Some(kind));
        }
        assert_eq!(CellKind::parse("plankton"), None);
    }

    #[test]
    fn validation_rejects_bad_physics() {
        let cell = Cell::new(CellKind::Structure, Vec2::ZERO).with_radius(0.0);
        assert!(cell.validate().is_err());

        let cell = Cell::new(CellKind::Structure, Vec2::ZERO).with_physics(PhysicsProperties {
            friction: 1.5,
            ..PhysicsProperties::default()
        });
        assert!(cell.validate().is_err());

        let cell = Cell::new(CellKind::Structure, Vec2::new(f32::NAN, 0.0));
        assert!(cell.validate().is_err());
    }

    #[test]
    fn validation_rejects_bad_constraints() {
        let other = CellId::new();
        let cell = Cell::new(CellKind::Structure, Vec2::ZERO)
            .with_constraint(Constraint::new(other, -1.0, 0.5));
        assert!(cell.validate().is_err());

        let cell = Cell::new(CellKind::Structure, Vec2::ZERO)
            .with_constraint(Constraint::new(other, 1.0, 2.0));
        assert!(cell.validate().is_err());

        let cell = Cell::new(CellKind::Structure, Vec2::ZERO)
            .with_constraint(Constraint::new(other, 0.0, 1.0));
        assert!(cell.validate().is_ok());
    }

    #[test]
    fn cell_serializes_kind_as_snake_case() {
        let cell = Cell::new(CellKind::Reproducer, Vec2::ZERO).with_energy(60.0);
        let json = serde_json::to_value(&cell).unwrap();
        assert_eq!(json["kind"], "reproducer");
        assert!(json.get("constraints").is_none());
        let back: Cell = serde_json::from_value(json).unwrap();
        assert_eq!(back, cell);
    }
}
