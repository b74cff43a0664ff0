use std::collections::HashMap;

use cw_core::{Cell, CellId, World};
use glam::{IVec2, Vec2};

use crate::config::SimConfig;
use crate::error::{SimError, SimResult};

/// Offsets of the 3x3 block around a grid cell, center included.
const NEIGHBORHOOD: [IVec2; 9] = [
    IVec2::new(-1, -1),
    IVec2::new(-1, 0),
    IVec2::new(-1, 1),
    IVec2::new(0, -1),
    IVec2::new(0, 0),
    IVec2::new(0, 1),
    IVec2::new(1, -1),
    IVec2::new(1, 0),
    IVec2::new(1, 1),
];

/// Grid coordinate of a position. Floors toward negative infinity.
pub fn grid_coord(position: Vec2, cell_size: f32) -> IVec2 {
    (position / cell_size).floor().as_ivec2()
}

/// Pack a grid coordinate into a bucket key. Distinct coordinates never
/// share a key.
pub fn grid_hash(coord: IVec2) -> u64 {
    (u64::from(coord.x as u32) << 32) | u64::from(coord.y as u32)
}

/// `coord + offset`, or `None` if either axis leaves the `i32` range.
fn offset_coord(coord: IVec2, offset: IVec2) -> Option<IVec2> {
    Some(IVec2::new(
        coord.x.checked_add(offset.x)?,
        coord.y.checked_add(offset.y)?,
    ))
}

/// Inverse of [`grid_hash`].
pub fn grid_unhash(hash: u64) -> IVec2 {
    IVec2::new((hash >> 32) as u32 as i32, hash as u32 as i32)
}

/// Broadphase multi-map from grid bucket to the cells whose center lies in it.
///
/// Built from scratch for one query and dropped afterwards; there is no
/// incremental update. Neighbor queries cover the 3x3 block around a point,
/// which finds every pair within one `cell_size` of each other.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f32,
    buckets: HashMap<u64, Vec<CellId>>,
    len: usize,
}

impl SpatialGrid {
    /// Bucket every cell of `world` accepted by `filter`.
    ///
    /// Cells with a non-finite position are left out. Fails when `cell_size`
    /// is unusable or any bucket ends up holding more than `max_occupancy`
    /// cells.
    pub fn build(
        world: &World,
        cell_size: f32,
        max_occupancy: usize,
        filter: impl Fn(&Cell) -> bool,
    ) -> SimResult<Self> {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(SimError::InvalidConfig(format!(
                "grid cell size must be positive, got {cell_size}"
            )));
        }

        let mut buckets: HashMap<u64, Vec<CellId>> = HashMap::new();
        let mut len = 0;
        for cell in world.all_cells().filter(|c| filter(c)) {
            if !cell.position.is_finite() {
                tracing::trace!(cell = %cell.id, "skipping non-finite position in broadphase");
                continue;
            }
            let key = grid_hash(grid_coord(cell.position, cell_size));
            buckets.entry(key).or_default().push(cell.id);
            len += 1;
        }

        if let Some((key, ids)) = buckets.iter().find(|(_, ids)| ids.len() > max_occupancy) {
            return Err(SimError::GridCapacity {
                coord: grid_unhash(*key),
                occupancy: ids.len(),
                limit: max_occupancy,
            });
        }

        Ok(Self {
            cell_size,
            buckets,
            len,
        })
    }

    /// Build with the cell size and capacity from `config`.
    pub fn from_config(
        world: &World,
        config: &SimConfig,
        filter: impl Fn(&Cell) -> bool,
    ) -> SimResult<Self> {
        Self::build(
            world,
            config.grid_cell_size,
            config.max_bucket_occupancy,
            filter,
        )
    }

    /// Grid coordinate of a position under this grid's cell size.
    pub fn coord_of(&self, position: Vec2) -> IVec2 {
        grid_coord(position, self.cell_size)
    }

    /// Cells bucketed at `coord`.
    pub fn bucket(&self, coord: IVec2) -> &[CellId] {
        self.buckets
            .get(&grid_hash(coord))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Cells in the 3x3 block around `position`, including any cell at
    /// `position` itself. Callers filter out self.
    ///
    /// Near the edge of the `i32` coordinate range the block is cut short
    /// instead of wrapping; far-out positions all share the saturated edge
    /// bucket.
    pub fn neighborhood(&self, position: Vec2) -> impl Iterator<Item = CellId> + '_ {
        let center = self.coord_of(position);
        NEIGHBORHOOD
            .iter()
            .filter_map(move |offset| offset_coord(center, *offset))
            .flat_map(move |coord| self.bucket(coord).iter().copied())
    }

    /// Edge length of one bucket.
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Number of cells bucketed.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Return `true` if no cell was bucketed.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of non-empty buckets.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}
