// SPDX-License-Identifier: MIT OR Apache-2.0

//! Board representation with cluster and liberty maintenance
//!
//! The board keeps every stone's connected group in an id-indexed cluster
//! arena. Stones carry the id of their owning cluster; merging groups
//! repoints the ids rather than chasing references. Liberties are stored
//! per cluster as a set of empty coordinates, so the liberty count is the
//! number of distinct liberty points by construction.

use crate::{Color, Coord};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Arena index of a cluster.
type ClusterId = u32;

/// A placed stone: its color and the cluster it belongs to.
#[derive(Debug, Clone, Copy)]
struct Stone {
    color: Color,
    cluster: ClusterId,
}

/// Maximal connected group of same-colored stones.
#[derive(Debug, Clone)]
pub struct Cluster {
    color: Color,
    members: HashSet<Coord>,
    liberties: HashSet<Coord>,
}

impl Cluster {
    /// Color of every stone in the group
    pub fn color(&self) -> Color {
        self.color
    }

    /// Positions of the member stones
    pub fn members(&self) -> &HashSet<Coord> {
        &self.members
    }

    /// Number of distinct empty points adjacent to the group
    pub fn liberty_count(&self) -> usize {
        self.liberties.len()
    }
}

/// Stones captured by each color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prisoners {
    /// Stones Black has captured
    pub black: u16,
    /// Stones White has captured
    pub white: u16,
}

/// Live board state mutated in place by accepted moves.
///
/// The persisted projection is the flat grid plus prisoners and ko point;
/// `restore` rebuilds the cluster arena from that projection.
#[derive(Debug, Clone)]
pub struct BoardState {
    size: u8,
    stones: HashMap<Coord, Stone>,
    clusters: HashMap<ClusterId, Cluster>,
    next_cluster: ClusterId,
    prisoners: Prisoners,
    ko_point: Option<Coord>,
}

impl BoardState {
    /// Create a new empty board with the specified size
    pub fn new(size: u8) -> Self {
        Self {
            size,
            stones: HashMap::new(),
            clusters: HashMap::new(),
            next_cluster: 0,
            prisoners: Prisoners::default(),
            ko_point: None,
        }
    }

    /// Rebuild a board from its persisted projection.
    ///
    /// Clusters are recovered by connectivity flood fill over the grid;
    /// move history is never consulted.
    pub fn restore(
        size: u8,
        grid: &[Option<Color>],
        prisoners: Prisoners,
        ko_point: Option<Coord>,
    ) -> Self {
        let mut board = Self::new(size);
        board.prisoners = prisoners;
        board.ko_point = ko_point;

        for y in 0..size {
            for x in 0..size {
                let coord = Coord::new(x, y);
                let Some(color) = grid.get(coord.index(size)).copied().flatten() else {
                    continue;
                };
                if board.stones.contains_key(&coord) {
                    continue;
                }

                // Flood fill the whole group this stone belongs to.
                let id = board.alloc_cluster(color);
                let mut queue = vec![coord];
                while let Some(current) = queue.pop() {
                    if board.stones.contains_key(&current) {
                        continue;
                    }
                    board.stones.insert(current, Stone { color, cluster: id });
                    if let Some(cluster) = board.clusters.get_mut(&id) {
                        cluster.members.insert(current);
                    }
                    for n in current.neighbors(size) {
                        if grid.get(n.index(size)).copied().flatten() == Some(color)
                            && !board.stones.contains_key(&n)
                        {
                            queue.push(n);
                        }
                    }
                }
                board.recompute_liberties(id);
            }
        }

        board
    }

    /// Board size
    pub fn size(&self) -> u8 {
        self.size
    }

    /// Stone color at the coordinate, if occupied
    pub fn stone_at(&self, coord: Coord) -> Option<Color> {
        self.stones.get(&coord).map(|s| s.color)
    }

    /// Cluster owning the stone at the coordinate
    pub fn cluster_at(&self, coord: Coord) -> Option<&Cluster> {
        let stone = self.stones.get(&coord)?;
        self.clusters.get(&stone.cluster)
    }

    /// Prisoner counts
    pub fn prisoners(&self) -> Prisoners {
        self.prisoners
    }

    /// Position forbidden for immediate recapture, if any
    pub fn ko_point(&self) -> Option<Coord> {
        self.ko_point
    }

    /// All live clusters
    pub fn clusters(&self) -> impl Iterator<Item = &Cluster> {
        self.clusters.values()
    }

    /// Denormalize the stone map into a flat row-major grid
    pub fn grid(&self) -> Vec<Option<Color>> {
        let cells = (self.size as usize) * (self.size as usize);
        let mut grid = vec![None; cells];
        for (coord, stone) in &self.stones {
            grid[coord.index(self.size)] = Some(stone.color);
        }
        grid
    }

    /// Count stones of the given color on the board
    pub fn stone_count(&self, color: Color) -> usize {
        self.stones.values().filter(|s| s.color == color).count()
    }

    /// Attempt to place a stone. Returns whether the move was accepted;
    /// a rejected move leaves the board untouched.
    pub fn play(&mut self, coord: Coord, color: Color) -> bool {
        if !coord.is_valid(self.size) || self.stones.contains_key(&coord) {
            return false;
        }
        if self.ko_point == Some(coord) {
            tracing::debug!(x = coord.x, y = coord.y, "move rejected at ko point");
            return false;
        }
        if !self.is_legal(coord, color) {
            tracing::debug!(x = coord.x, y = coord.y, ?color, "move rejected as suicide");
            return false;
        }

        // Place the new stone as a singleton cluster.
        let id = self.alloc_cluster(color);
        self.stones.insert(coord, Stone { color, cluster: id });
        if let Some(cluster) = self.clusters.get_mut(&id) {
            cluster.members.insert(coord);
        }

        // Merge friendly neighbor clusters into the new one.
        let friendly: HashSet<ClusterId> = coord
            .neighbors(self.size)
            .into_iter()
            .filter_map(|n| self.stones.get(&n))
            .filter(|s| s.color == color && s.cluster != id)
            .map(|s| s.cluster)
            .collect();
        for other in friendly {
            self.merge_into(id, other);
        }

        // Remove enemy neighbor clusters whose last liberty this was.
        // The placement resolves any stored ko point before a capture may
        // install a new one.
        self.ko_point = None;
        let enemies: HashSet<ClusterId> = coord
            .neighbors(self.size)
            .into_iter()
            .filter_map(|n| self.stones.get(&n))
            .filter(|s| s.color != color)
            .map(|s| s.cluster)
            .collect();
        let mut removed = Vec::new();
        for enemy in enemies {
            let captured = self
                .clusters
                .get(&enemy)
                .map(|c| c.liberties.len() == 1 && c.liberties.contains(&coord))
                .unwrap_or(false);
            if !captured {
                continue;
            }
            let Some(cluster) = self.clusters.remove(&enemy) else {
                continue;
            };
            match color {
                Color::Black => self.prisoners.black += cluster.members.len() as u16,
                Color::White => self.prisoners.white += cluster.members.len() as u16,
            }
            self.ko_point = if cluster.members.len() == 1 {
                cluster.members.iter().next().copied()
            } else {
                None
            };
            for member in cluster.members {
                self.stones.remove(&member);
                removed.push(member);
            }
        }
        if !removed.is_empty() {
            tracing::debug!(
                x = coord.x,
                y = coord.y,
                ?color,
                captured = removed.len(),
                ko = ?self.ko_point,
                "capture resolved"
            );
        }

        // Recompute liberties of every cluster the move touched: the
        // merged cluster, survivors adjacent to the placed stone, and
        // clusters adjacent to any removed stone.
        let mut affected = HashSet::from([id]);
        for n in coord.neighbors(self.size) {
            if let Some(stone) = self.stones.get(&n) {
                affected.insert(stone.cluster);
            }
        }
        for gone in &removed {
            for n in gone.neighbors(self.size) {
                if let Some(stone) = self.stones.get(&n) {
                    affected.insert(stone.cluster);
                }
            }
        }
        for cluster in affected {
            self.recompute_liberties(cluster);
        }

        true
    }

    fn alloc_cluster(&mut self, color: Color) -> ClusterId {
        let id = self.next_cluster;
        self.next_cluster += 1;
        self.clusters.insert(
            id,
            Cluster {
                color,
                members: HashSet::new(),
                liberties: HashSet::new(),
            },
        );
        id
    }

    /// Legality from the four neighbors, evaluated against the pre-move
    /// board: an empty neighbor, a friendly group with a spare liberty,
    /// or an enemy group this move captures.
    fn is_legal(&self, coord: Coord, color: Color) -> bool {
        for n in coord.neighbors(self.size) {
            let Some(stone) = self.stones.get(&n) else {
                return true;
            };
            let Some(cluster) = self.clusters.get(&stone.cluster) else {
                continue;
            };
            if stone.color == color && cluster.liberties.len() > 1 {
                return true;
            }
            if stone.color != color && cluster.liberties.len() == 1 {
                return true;
            }
        }
        false
    }

    /// Union `other` into `target`, repointing every member stone.
    fn merge_into(&mut self, target: ClusterId, other: ClusterId) {
        let Some(absorbed) = self.clusters.remove(&other) else {
            return;
        };
        for member in &absorbed.members {
            if let Some(stone) = self.stones.get_mut(member) {
                stone.cluster = target;
            }
        }
        if let Some(cluster) = self.clusters.get_mut(&target) {
            cluster.members.extend(absorbed.members);
        }
    }

    /// Rebuild a cluster's liberty set. The set itself is the visited
    /// tracker: an empty point adjacent to several member stones counts
    /// once.
    fn recompute_liberties(&mut self, id: ClusterId) {
        let Some(cluster) = self.clusters.get(&id) else {
            return;
        };
        let mut liberties = HashSet::new();
        for member in &cluster.members {
            for n in member.neighbors(self.size) {
                if !self.stones.contains_key(&n) {
                    liberties.insert(n);
                }
            }
        }
        if let Some(cluster) = self.clusters.get_mut(&id) {
            cluster.liberties = liberties;
        }
    }
}
