use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use synapse_common::Tier;

/// Sentinel for "never activated".
pub(crate) const NEVER: f32 = f32::NEG_INFINITY;

/// Nominal scene radius before per-axis scaling.
const SCENE_RADIUS: f32 = 10.0;

/// Per-axis ellipsoid scale giving the scene its flattened silhouette.
const AXIS_SCALE: Vec3 = Vec3::new(1.2, 0.8, 1.0);

/// One point in the graph.
#[derive(Debug, Clone)]
pub struct Node {
    pub position: Vec3,
    /// Resting render size before any pulse scaling.
    pub base_size: f32,
    /// Visual weight in [0.1, 1.0).
    pub base_strength: f32,
    pub active: bool,
    /// Activity-clock time of the last activation, [`NEVER`] if none.
    pub last_active: f32,
    /// Neighbor indices this node chose during the build. Inbound
    /// connections from other nodes are not mirrored here.
    pub connections: Vec<usize>,
}

/// Undirected connection between two nodes.
#[derive(Debug, Clone)]
pub struct Edge {
    pub a: usize,
    pub b: usize,
    /// Mean of the endpoint strengths.
    pub strength: f32,
    pub active: bool,
    pub last_active: f32,
}

/// The owned node/edge collections plus animation state for one mounted
/// scene. Rebuilt whenever the tier changes in a way that alters target
/// counts.
#[derive(Debug)]
pub struct SceneGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    /// Edge indices incident to each node, for activation propagation.
    incident: Vec<Vec<usize>>,
    tier: Tier,
    connection_limit: usize,
    pub(crate) clock: f32,
    pub(crate) drift: (f32, f32),
    pub(crate) rng: SmallRng,
}

impl SceneGraph {
    /// Build a scene with a fresh random seed. Rebuilds are expected to
    /// produce visually different but structurally equivalent graphs.
    pub fn build(tier: Tier, node_count: usize, connection_limit: usize) -> Self {
        Self::build_with_rng(
            tier,
            node_count,
            connection_limit,
            SmallRng::from_entropy(),
        )
    }

    /// Build with a fixed seed. Used by tests; rendering never needs it.
    pub fn build_seeded(tier: Tier, node_count: usize, connection_limit: usize, seed: u64) -> Self {
        Self::build_with_rng(
            tier,
            node_count,
            connection_limit,
            SmallRng::seed_from_u64(seed),
        )
    }

    fn build_with_rng(
        tier: Tier,
        node_count: usize,
        connection_limit: usize,
        mut rng: SmallRng,
    ) -> Self {
        let mut nodes = Vec::with_capacity(node_count);
        for _ in 0..node_count {
            let position = random_point_in_unit_ball(&mut rng) * SCENE_RADIUS * AXIS_SCALE;
            let base_strength = rng.gen_range(0.1..1.0);
            nodes.push(Node {
                position,
                base_size: 0.12 + 0.18 * base_strength,
                base_strength,
                active: false,
                last_active: NEVER,
                connections: Vec::new(),
            });
        }

        let mut edges: Vec<Edge> = Vec::new();
        let mut connected: HashSet<(usize, usize)> = HashSet::new();

        // O(n^2) nearest-neighbor wiring: bounded by the tier-dependent
        // node counts, cheap enough to run on every rebuild.
        if node_count >= 2 && connection_limit >= 2 {
            let mut order: Vec<usize> = Vec::with_capacity(node_count - 1);
            for i in 0..node_count {
                let desired = rng.gen_range(1..connection_limit);

                order.clear();
                order.extend((0..node_count).filter(|&j| j != i));
                order.sort_by(|&x, &y| {
                    let dx = nodes[i].position.distance_squared(nodes[x].position);
                    let dy = nodes[i].position.distance_squared(nodes[y].position);
                    dx.total_cmp(&dy)
                });

                let mut made = 0;
                for &j in &order {
                    if made >= desired {
                        break;
                    }
                    let key = (i.min(j), i.max(j));
                    if !connected.insert(key) {
                        continue;
                    }
                    let strength = (nodes[i].base_strength + nodes[j].base_strength) * 0.5;
                    edges.push(Edge {
                        a: i,
                        b: j,
                        strength,
                        active: false,
                        last_active: NEVER,
                    });
                    nodes[i].connections.push(j);
                    made += 1;
                }
            }
        }

        let mut incident = vec![Vec::new(); node_count];
        for (index, edge) in edges.iter().enumerate() {
            incident[edge.a].push(index);
            incident[edge.b].push(index);
        }

        tracing::debug!(
            %tier,
            nodes = nodes.len(),
            edges = edges.len(),
            "scene graph built"
        );

        Self {
            nodes,
            edges,
            incident,
            tier,
            connection_limit,
            clock: 0.0,
            drift: (0.0, 0.0),
            rng,
        }
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn connection_limit(&self) -> usize {
        self.connection_limit
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Current value of the synthetic activity clock, in seconds.
    pub fn clock(&self) -> f32 {
        self.clock
    }

    /// Disjoint-field borrow split for the animation pass.
    pub(crate) fn split_mut(
        &mut self,
    ) -> (&mut [Node], &mut [Edge], &[Vec<usize>], &mut SmallRng) {
        (
            &mut self.nodes,
            &mut self.edges,
            &self.incident,
            &mut self.rng,
        )
    }
}

/// Uniform sample inside the unit ball by rejection.
fn random_point_in_unit_ball(rng: &mut SmallRng) -> Vec3 {
    loop {
        let p = Vec3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        );
        if p.length_squared() <= 1.0 {
            return p;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn no_duplicate_undirected_edges() {
        for seed in 0..5 {
            let scene = SceneGraph::build_seeded(Tier::High, 180, 5, seed);
            let mut seen = HashSet::new();
            for edge in scene.edges() {
                let key = (edge.a.min(edge.b), edge.a.max(edge.b));
                assert!(seen.insert(key), "duplicate edge {key:?} (seed {seed})");
                assert_ne!(edge.a, edge.b);
            }
        }
    }

    #[test]
    fn degree_bound_holds() {
        for seed in 0..5 {
            let scene = SceneGraph::build_seeded(Tier::Medium, 140, 4, seed);
            for node in scene.nodes() {
                assert!(node.connections.len() < 4);
                assert!(!node.connections.is_empty());
            }
        }
    }

    #[test]
    fn edge_endpoints_index_into_nodes() {
        let scene = SceneGraph::build_seeded(Tier::Low, 90, 4, 7);
        for edge in scene.edges() {
            assert!(edge.a < scene.node_count());
            assert!(edge.b < scene.node_count());
        }
    }

    #[test]
    fn edge_strength_is_mean_of_endpoints() {
        let scene = SceneGraph::build_seeded(Tier::Low, 30, 3, 11);
        for edge in scene.edges() {
            let expected =
                (scene.nodes()[edge.a].base_strength + scene.nodes()[edge.b].base_strength) * 0.5;
            assert!((edge.strength - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn node_strength_in_documented_range() {
        let scene = SceneGraph::build_seeded(Tier::High, 180, 5, 3);
        for node in scene.nodes() {
            assert!(node.base_strength >= 0.1 && node.base_strength < 1.0);
            assert!(node.base_size > 0.0);
        }
    }

    #[test]
    fn positions_stay_inside_scaled_ellipsoid() {
        let scene = SceneGraph::build_seeded(Tier::High, 180, 5, 9);
        for node in scene.nodes() {
            let p = node.position / (AXIS_SCALE * SCENE_RADIUS);
            assert!(p.length_squared() <= 1.0 + 1e-5);
        }
    }

    #[test]
    fn degenerate_counts_build_empty_graphs() {
        let empty = SceneGraph::build_seeded(Tier::Low, 0, 4, 0);
        assert_eq!(empty.node_count(), 0);
        assert_eq!(empty.edge_count(), 0);

        let single = SceneGraph::build_seeded(Tier::Low, 1, 4, 0);
        assert_eq!(single.node_count(), 1);
        assert_eq!(single.edge_count(), 0);

        let no_links = SceneGraph::build_seeded(Tier::Low, 20, 1, 0);
        assert_eq!(no_links.node_count(), 20);
        assert_eq!(no_links.edge_count(), 0);
    }

    #[test]
    fn forced_low_fifty_nodes_limit_three() {
        for seed in 0..5 {
            let scene = SceneGraph::build_seeded(Tier::Low, 50, 3, seed);
            assert_eq!(scene.node_count(), 50);
            for node in scene.nodes() {
                let n = node.connections.len();
                assert!((1..=2).contains(&n), "connections = {n} (seed {seed})");
            }
        }
    }

    #[test]
    fn high_tier_build_completes_within_bound() {
        // Documented upper bound for the O(n^2) distance sort at the
        // largest default count.
        let start = Instant::now();
        let scene = SceneGraph::build_seeded(Tier::High, 180, 5, 1);
        let elapsed = start.elapsed();
        assert_eq!(scene.node_count(), 180);
        assert!(
            elapsed.as_millis() < 50,
            "build took {elapsed:?}, expected < 50ms"
        );
    }

    #[test]
    fn rebuilds_differ_without_a_seed() {
        let a = SceneGraph::build(Tier::Low, 40, 4);
        let b = SceneGraph::build(Tier::Low, 40, 4);
        // Structural equivalence, not identity.
        assert_eq!(a.node_count(), b.node_count());
        let same_positions = a
            .nodes()
            .iter()
            .zip(b.nodes())
            .all(|(x, y)| x.position == y.position);
        assert!(!same_positions);
    }
}
