//! Recursive subdivision of a region into leaf cells
use std::{collections::BTreeMap, sync::Arc};

use arrayvec::ArrayVec;

use super::{
    cell::{self, CellKey, Leaf},
    Settings,
};
use crate::{
    eval::{ClauseSchedule, Evaluator},
    region::{Region, Subregion},
    types::Interval,
    Error,
};

/// Leaf cells which contain a vertex, sorted by cell coordinates
pub type Leaves<const D: usize> = BTreeMap<CellKey, Leaf<D>>;

/// Counters collected while subdividing
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Stats {
    /// Cells which were entirely outside the shape
    pub empty: usize,
    /// Cells which were entirely inside the shape
    pub full: usize,
    /// Leaf cells which were sampled (with or without a vertex)
    pub sampled: usize,
    /// Lowest clause utilization seen after a `push`
    pub min_utilization: f64,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            empty: 0,
            full: 0,
            sampled: 0,
            min_utilization: 1.0,
        }
    }
}

impl std::ops::AddAssign for Stats {
    fn add_assign(&mut self, rhs: Self) {
        self.empty += rhs.empty;
        self.full += rhs.full;
        self.sampled += rhs.sampled;
        self.min_utilization = self.min_utilization.min(rhs.min_utilization);
    }
}

/// Per-thread state for subdividing a region
///
/// `D` is 3 for volumes and 2 for slices.
pub struct Worker<const D: usize> {
    eval: Evaluator,
    prune: bool,
    cell_size: usize,
    leaves: Leaves<D>,
    stats: Stats,
}

impl<const D: usize> Worker<D> {
    pub fn new(schedule: Arc<ClauseSchedule>, settings: &Settings) -> Self {
        let mut eval = Evaluator::from_schedule(schedule);
        eval.set_matrix(&settings.world_to_model);
        Self {
            eval,
            prune: settings.prune,
            cell_size: settings.min_cell_size as usize,
            leaves: Leaves::new(),
            stats: Stats::default(),
        }
    }

    /// Subdivides the given cell, returning its leaves and counters
    ///
    /// The worker is left empty and may be reused.
    pub fn run(
        &mut self,
        cell: Subregion,
    ) -> Result<(Leaves<D>, Stats), Error> {
        self.recurse(cell)?;
        Ok((
            std::mem::take(&mut self.leaves),
            std::mem::take(&mut self.stats),
        ))
    }

    fn recurse(&mut self, cell: Subregion) -> Result<(), Error> {
        let [x, y, z] = cell.bounds();
        let z = if D == 2 {
            Interval::new(z.lower(), z.lower())
        } else {
            z
        };
        self.eval.set_interval(x, y, z);
        let i = if self.prune {
            let i = self.eval.push();
            self.stats.min_utilization =
                self.stats.min_utilization.min(self.eval.utilization());
            i
        } else {
            self.eval.interval()
        };

        let out = if i.upper() < 0.0 {
            self.stats.full += 1;
            Ok(())
        } else if i.lower() > 0.0 {
            self.stats.empty += 1;
            Ok(())
        } else if is_leaf::<D>(&cell, self.cell_size) {
            self.leaf(&cell)
        } else {
            children::<D>(&cell)
                .into_iter()
                .try_for_each(|c| self.recurse(c))
        };

        if self.prune {
            self.eval.pop()?;
        }
        out
    }

    fn leaf(&mut self, cell: &Subregion) -> Result<(), Error> {
        self.stats.sampled += 1;
        if let Some(leaf) = cell::sample::<D>(&mut self.eval, cell)? {
            let s = self.cell_size;
            let key = [cell.x.min() / s, cell.y.min() / s, cell.z.min() / s]
                .map(|k| k as u32);
            self.leaves.insert(key, leaf);
        }
        Ok(())
    }
}

/// Checks whether a cell is small enough to be sampled directly
///
/// The Z axis is ignored for 2D cells.
fn is_leaf<const D: usize>(cell: &Subregion, cell_size: usize) -> bool {
    cell.x.size() <= cell_size
        && cell.y.size() <= cell_size
        && (D == 2 || cell.z.size() <= cell_size)
}

/// Subdivides a cell, using `octsect` where possible in 3D
fn children<'a, const D: usize>(
    cell: &Subregion<'a>,
) -> ArrayVec<Subregion<'a>, 8> {
    if D == 3 && cell.can_octsect() {
        cell.octsect().into()
    } else {
        let (a, b) = if D == 2 {
            cell.split_xy()
        } else {
            cell.split()
        };
        [a, b].into_iter().collect()
    }
}

/// Subdivides a region and samples every leaf which contains the surface
///
/// With a thread pool, the region's top-level children are processed in
/// parallel, each by its own [`Worker`].  Leaves are given dense indices in
/// key order once every worker has finished.
pub fn extract<const D: usize>(
    schedule: Arc<ClauseSchedule>,
    region: &Region,
    settings: &Settings,
) -> Result<Leaves<D>, Error> {
    use rayon::prelude::*;

    let s = settings.min_cell_size;
    if !s.is_power_of_two() {
        return Err(Error::BadCellSize(s));
    }

    let root = region.subregion();
    let (mut leaves, stats) = match settings.threads {
        Some(pool) if !is_leaf::<D>(&root, s as usize) => {
            let cells = children::<D>(&root);
            log::debug!(
                "subdividing {} cells on {} threads",
                cells.len(),
                pool.thread_count()
            );
            let init = || Worker::<D>::new(schedule.clone(), settings);
            let out = pool.run(|| {
                cells
                    .par_iter()
                    .map_init(init, |w, c| w.run(*c))
                    .collect::<Result<Vec<_>, Error>>()
            })?;
            let mut leaves = Leaves::new();
            let mut stats = Stats::default();
            for (l, s) in out {
                leaves.extend(l);
                stats += s;
            }
            (leaves, stats)
        }
        _ => Worker::<D>::new(schedule, settings).run(root)?,
    };

    for (i, leaf) in leaves.values_mut().enumerate() {
        leaf.index = i;
    }
    log::debug!(
        "extracted {} leaves ({} sampled, {} empty, {} full cells); \
         min utilization {:.3}",
        leaves.len(),
        stats.sampled,
        stats.empty,
        stats.full,
        stats.min_utilization,
    );
    Ok(leaves)
}
