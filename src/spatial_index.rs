/*
 * Spatial Index Module
 *
 * This module defines the SpatialIndex struct used for neighbor lookups.
 * The square map [-map_size, map_size]^2 is divided into a grid of equal
 * buckets, each holding the ids of the agents currently inside it.
 *
 * Concurrency contract:
 * - All bucket mutation (set, remove, cross-bucket moved) happens under a
 *   single lock
 * - A move that stays inside its bucket never touches the lock
 * - Queries copy a bucket out under a short read lock; the copy may be
 *   stale by at most one in-flight insert/remove when the caller uses it
 *
 * Known limitation: close_to only looks at the bucket containing the query
 * point, so agents right across a bucket border are invisible to each
 * other. neighborhood_into offers the 3x3 alternative.
 */

use parking_lot::RwLock;
use tracing::debug;

use crate::vec2::Vec2;

pub struct SpatialIndex {
    pub map_size: f32,
    pub chunk_size: f32,
    pub divisions: usize,
    chunks: RwLock<Vec<Vec<usize>>>,
}

impl SpatialIndex {
    pub fn new(map_size: f32, divisions: usize) -> Self {
        let divisions = divisions.max(1);
        let chunk_size = (map_size * 2.0) / divisions as f32;

        // Initialize an empty grid
        let mut chunks = Vec::with_capacity(divisions * divisions);
        for _ in 0..(divisions * divisions) {
            chunks.push(Vec::new());
        }

        Self {
            map_size,
            chunk_size,
            divisions,
            chunks: RwLock::new(chunks),
        }
    }

    // Convert world coordinates to a flat bucket index
    #[inline]
    pub fn chunk_index(&self, position: Vec2) -> usize {
        let (x, y) = self.chunk_coords(position);
        x + y * self.divisions
    }

    #[inline]
    fn chunk_coords(&self, position: Vec2) -> (usize, usize) {
        let max_cell = (self.divisions - 1) as f32;
        // Translate into [0, 2 * map_size) then clamp so edges stay in range
        let x = ((position.x + self.map_size) / self.chunk_size).clamp(0.0, max_cell) as usize;
        let y = ((position.y + self.map_size) / self.chunk_size).clamp(0.0, max_cell) as usize;
        (x, y)
    }

    pub fn bucket_count(&self) -> usize {
        self.divisions * self.divisions
    }

    pub fn bucket_len(&self, chunk: usize) -> usize {
        self.chunks.read().get(chunk).map_or(0, Vec::len)
    }

    // Total number of memberships across all buckets
    pub fn len(&self) -> usize {
        self.chunks.read().iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, index: usize, position: Vec2) -> bool {
        let chunk = self.chunk_index(position);
        self.chunks.read()[chunk].contains(&index)
    }

    // New agent `index` is at `position`
    pub fn set(&self, index: usize, position: Vec2) {
        let chunk = self.chunk_index(position);
        self.chunks.write()[chunk].push(index);
    }

    // Remove agent `index`, which is expected in the bucket of `position`
    pub fn remove(&self, index: usize, position: Vec2) {
        let chunk = self.chunk_index(position);
        let mut chunks = self.chunks.write();
        let bucket = &mut chunks[chunk];

        match bucket.iter().position(|&agent| agent == index) {
            Some(slot) => {
                bucket.swap_remove(slot);
            }
            None => debug!(index, chunk, "trying to remove missing index"),
        }
    }

    // Agent `index` moved from `old_position` to `new_position`
    pub fn moved(&self, index: usize, old_position: Vec2, new_position: Vec2) {
        let old_chunk = self.chunk_index(old_position);
        let new_chunk = self.chunk_index(new_position);

        if old_chunk == new_chunk {
            // Same bucket, nothing to do
            return;
        }

        let mut chunks = self.chunks.write();

        let bucket = &mut chunks[old_chunk];
        let Some(slot) = bucket.iter().position(|&agent| agent == index) else {
            debug!(index, old_chunk, new_chunk, "trying to move missing index");
            return;
        };
        bucket.swap_remove(slot);

        chunks[new_chunk].push(index);
    }

    // Agents in the single bucket containing `position`
    pub fn close_to(&self, position: Vec2) -> Vec<usize> {
        let mut result = Vec::new();
        self.close_to_into(position, &mut result);
        result
    }

    // Same as close_to, but reuses the caller's buffer
    pub fn close_to_into(&self, position: Vec2, result: &mut Vec<usize>) {
        result.clear();
        let chunk = self.chunk_index(position);
        result.extend_from_slice(&self.chunks.read()[chunk]);
    }

    // Agents in the bucket containing `position` and its 8 neighbors
    pub fn neighborhood_into(&self, position: Vec2, result: &mut Vec<usize>) {
        result.clear();
        let (grid_x, grid_y) = self.chunk_coords(position);
        let last = self.divisions - 1;

        let chunks = self.chunks.read();
        for check_y in grid_y.saturating_sub(1)..=(grid_y + 1).min(last) {
            let y_index = check_y * self.divisions;
            for check_x in grid_x.saturating_sub(1)..=(grid_x + 1).min(last) {
                result.extend_from_slice(&chunks[y_index + check_x]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vec2::vec2;

    fn index() -> SpatialIndex {
        SpatialIndex::new(1024.0, 16)
    }

    #[test]
    fn chunk_index_clamps_edges_into_range() {
        let index = index();
        let d = index.divisions;

        assert_eq!(index.chunk_index(vec2(-1024.0, -1024.0)), 0);
        assert_eq!(index.chunk_index(vec2(1024.0, 1024.0)), d * d - 1);
        assert_eq!(index.chunk_index(vec2(1024.0, -1024.0)), d - 1);
        assert_eq!(index.chunk_index(vec2(-1024.0, 1024.0)), (d - 1) * d);

        // Outside the map still lands on a border bucket
        assert_eq!(index.chunk_index(vec2(-5000.0, 5000.0)), (d - 1) * d);
    }

    #[test]
    fn chunk_index_partitions_the_map() {
        let index = index();
        let d = index.divisions;
        let chunk = index.chunk_size;

        for cy in 0..d {
            for cx in 0..d {
                // Centre of each cell maps to that cell
                let centre = vec2(
                    -1024.0 + (cx as f32 + 0.5) * chunk,
                    -1024.0 + (cy as f32 + 0.5) * chunk,
                );
                assert_eq!(index.chunk_index(centre), cx + cy * d);

                // Lower-left corner belongs to the cell it opens
                let corner = vec2(-1024.0 + cx as f32 * chunk, -1024.0 + cy as f32 * chunk);
                assert_eq!(index.chunk_index(corner), cx + cy * d);
            }
        }

        let mut step = -1024.0;
        while step <= 1024.0 {
            assert!(index.chunk_index(vec2(step, -step)) < d * d);
            step += 7.3;
        }
    }

    #[test]
    fn set_and_close_to_share_a_bucket() {
        let index = index();
        index.set(3, vec2(10.0, 10.0));
        index.set(4, vec2(12.0, 11.0));
        index.set(5, vec2(-500.0, 300.0));

        let mut nearby = index.close_to(vec2(11.0, 11.0));
        nearby.sort_unstable();
        assert_eq!(nearby, vec![3, 4]);
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn remove_missing_index_is_a_no_op() {
        let index = index();
        index.set(1, vec2(0.5, 0.5));
        index.remove(2, vec2(0.5, 0.5));
        assert_eq!(index.close_to(vec2(0.5, 0.5)), vec![1]);

        index.remove(1, vec2(0.5, 0.5));
        assert!(index.is_empty());
    }

    #[test]
    fn moved_within_a_bucket_changes_nothing() {
        let index = index();
        index.set(7, vec2(1.0, 1.0));
        let chunk = index.chunk_index(vec2(1.0, 1.0));

        index.moved(7, vec2(1.0, 1.0), vec2(2.0, 2.0));
        assert_eq!(index.bucket_len(chunk), 1);
        assert!(index.contains(7, vec2(2.0, 2.0)));
    }

    #[test]
    fn moved_across_buckets_transfers_membership_once() {
        let index = index();
        let old = vec2(1.0, 1.0);
        let new = vec2(-300.0, 700.0);
        index.set(7, old);

        index.moved(7, old, new);
        assert!(!index.contains(7, old));
        assert!(index.contains(7, new));
        assert_eq!(index.bucket_len(index.chunk_index(new)), 1);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn moved_missing_index_leaves_new_bucket_alone() {
        let index = index();
        let new = vec2(-300.0, 700.0);

        index.moved(9, vec2(1.0, 1.0), new);
        assert_eq!(index.bucket_len(index.chunk_index(new)), 0);
    }

    #[test]
    fn single_bucket_query_misses_agents_across_the_border() {
        let index = index();
        // 0.0 is a bucket border for this grid
        index.set(1, vec2(-0.5, 10.0));
        index.set(2, vec2(0.5, 10.0));

        assert_eq!(index.close_to(vec2(0.5, 10.0)), vec![2]);

        let mut nearby = Vec::new();
        index.neighborhood_into(vec2(0.5, 10.0), &mut nearby);
        nearby.sort_unstable();
        assert_eq!(nearby, vec![1, 2]);
    }

    #[test]
    fn neighborhood_at_the_corner_stays_in_bounds() {
        let index = index();
        index.set(1, vec2(-1024.0, -1024.0));
        let mut nearby = Vec::new();
        index.neighborhood_into(vec2(-1024.0, -1024.0), &mut nearby);
        assert_eq!(nearby, vec![1]);
    }

    #[test]
    fn concurrent_moves_keep_every_agent_once() {
        let index = index();
        for agent in 0..64 {
            index.set(agent, vec2(-1000.0, -1000.0));
        }

        std::thread::scope(|scope| {
            for worker in 0..4 {
                let index = &index;
                scope.spawn(move || {
                    for agent in (worker * 16)..(worker * 16 + 16) {
                        let target = vec2(agent as f32 * 30.0 - 900.0, 900.0);
                        index.moved(agent, vec2(-1000.0, -1000.0), target);
                    }
                });
            }
        });

        assert_eq!(index.len(), 64);
        for agent in 0..64 {
            assert!(index.contains(agent, vec2(agent as f32 * 30.0 - 900.0, 900.0)));
        }
    }
}
