use {
    crate::options::Options,
    model::{Point, Segment, SegmentId},
    petgraph::graph::{DiGraph, NodeIndex},
    std::collections::HashMap,
};

#[derive(Debug, Clone)]
pub struct Edge {
    pub segment_id: SegmentId,
    pub depart_time: u64,
    pub arrive_time: u64,
}

/// Groups segment endpoints into nodes within `epsilon` of each other and
/// builds the directed multigraph the DFS walks.
pub struct SegmentGraph {
    pub graph: DiGraph<Point, Edge>,
    by_segment: HashMap<SegmentId, Segment>,
}

impl SegmentGraph {
    pub fn build(segments: &[Segment], opts: &Options) -> Self {
        let mut graph = DiGraph::new();
        let mut nodes: Vec<NodeIndex> = Vec::new();

        let mut node_for = |graph: &mut DiGraph<Point, Edge>,
                             nodes: &mut Vec<NodeIndex>,
                             point: Point|
         -> NodeIndex {
            for &idx in nodes.iter() {
                if graph[idx].is_near(&point, opts.nearness_epsilon) {
                    return idx;
                }
            }
            let idx = graph.add_node(point);
            nodes.push(idx);
            idx
        };

        let mut filtered: Vec<&Segment> = segments
            .iter()
            .filter(|s| {
                opts.mode_filter.as_ref().is_none_or(|allowed| allowed.contains(&s.mode))
            })
            .collect();
        // Deterministic iteration order regardless of the snapshot's HashMap
        // origin (§4.C determinism contract).
        filtered.sort_by(|a, b| a.segment_id.cmp(&b.segment_id));

        let mut by_segment = HashMap::new();
        for segment in filtered {
            let from = node_for(&mut graph, &mut nodes, segment.origin);
            let to = node_for(&mut graph, &mut nodes, segment.destination);
            graph.add_edge(
                from,
                to,
                Edge {
                    segment_id: segment.segment_id.clone(),
                    depart_time: segment.depart_time,
                    arrive_time: segment.arrive_time,
                },
            );
            by_segment.insert(segment.segment_id.clone(), segment.clone());
        }

        Self { graph, by_segment }
    }

    pub fn nearest_node(&self, point: &Point, epsilon: f64) -> Option<NodeIndex> {
        self.graph
            .node_indices()
            .filter(|&idx| self.graph[idx].is_near(point, epsilon))
            .min_by(|&a, &b| {
                self.graph[a]
                    .distance(point)
                    .total_cmp(&self.graph[b].distance(point))
            })
    }

    pub fn segment(&self, id: &SegmentId) -> &Segment {
        &self.by_segment[id]
    }
}
