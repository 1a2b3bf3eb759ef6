use {
    crate::{graph::SegmentGraph, options::Options},
    model::{round_price, stable_bundle_id, Bundle, Point, Price, Segment},
    petgraph::{graph::NodeIndex, visit::EdgeRef},
    rust_decimal::prelude::{FromPrimitive, ToPrimitive},
};

/// An in-progress walk from the search origin: the current node and the
/// ordered segments taken to reach it.
struct PartialPath<'a> {
    node: NodeIndex,
    segments: Vec<&'a Segment>,
}

/// Enumerates simple paths from `start` that reach within `nearness_epsilon`
/// of `destination`, respecting `max_transfers`, `time_tolerance` and
/// `time_window`, and turns each into a priced `Bundle`.
pub fn enumerate_paths(
    graph: &SegmentGraph,
    start: NodeIndex,
    destination: &Point,
    start_time: u64,
    opts: &Options,
) -> Vec<Bundle> {
    let mut bundles = Vec::new();
    let deadline = start_time.saturating_add(opts.time_window);
    let mut path = PartialPath { node: start, segments: Vec::new() };
    walk(graph, &mut path, destination, start_time, deadline, opts, &mut bundles);
    bundles
}

fn walk(
    graph: &SegmentGraph,
    path: &mut PartialPath,
    destination: &Point,
    start_time: u64,
    deadline: u64,
    opts: &Options,
    out: &mut Vec<Bundle>,
) {
    if !path.segments.is_empty() && graph.graph[path.node].is_near(destination, opts.nearness_epsilon) {
        out.push(build_bundle(&path.segments, opts));
    }

    if path.segments.len() >= opts.max_transfers {
        return;
    }

    // τ bounds the wait between *consecutive* segments (§4.C step 4); the
    // first leg's lateness relative to `start_time` is bounded only by
    // `deadline` (`start_time + time_window`).
    let earliest_depart = path.segments.last().map(|seg| seg.arrive_time);

    let mut candidates: Vec<_> = graph
        .graph
        .edges(path.node)
        .map(|e| (e.target(), &graph.graph[e.id()]))
        .filter(|(_, edge)| {
            let within_tolerance = match earliest_depart {
                Some(prev_arrive) => {
                    edge.depart_time >= prev_arrive
                        && edge.depart_time - prev_arrive <= opts.time_tolerance
                }
                None => edge.depart_time >= start_time,
            };
            within_tolerance
                && edge.depart_time <= deadline
                && !path.segments.iter().any(|s| s.segment_id == edge.segment_id)
        })
        .collect();
    // Deterministic child-expansion order (§4.C determinism contract).
    candidates.sort_by(|a, b| a.1.segment_id.cmp(&b.1.segment_id));

    for (next_node, edge) in candidates {
        let segment = graph.segment(&edge.segment_id);
        path.segments.push(segment);
        let mut next = PartialPath { node: next_node, segments: path.segments.clone() };
        walk(graph, &mut next, destination, start_time, deadline, opts, out);
        path.segments.pop();
    }
}

fn build_bundle(segments: &[&Segment], opts: &Options) -> Bundle {
    let ordered_ids: Vec<_> = segments.iter().map(|s| s.segment_id.clone()).collect();
    let base_price: Price = segments.iter().map(|s| s.price).sum();
    let discount = discount_for(segments.len(), opts);
    let discount_factor = Price::from_f64(1.0 - discount).unwrap_or(Price::ONE);
    let final_price = round_price(base_price * discount_factor);

    let depart_time = segments.first().expect("non-empty path").depart_time;
    let arrive_time = segments.last().expect("non-empty path").arrive_time;
    let total_duration = arrive_time.saturating_sub(depart_time) as f64;
    let final_price_f64 = final_price.to_f64().unwrap_or(0.0);
    let utility_score = -(final_price_f64 + opts.wait_penalty_weight * total_duration);

    Bundle {
        bundle_id: stable_bundle_id(&ordered_ids),
        segments: ordered_ids,
        origin: segments.first().expect("non-empty path").origin,
        destination: segments.last().expect("non-empty path").destination,
        depart_time,
        arrive_time,
        base_price,
        discount,
        final_price,
        num_segments: segments.len(),
        modes: segments.iter().map(|s| s.mode).collect(),
        utility_score,
    }
}

/// `min(maxDiscountRate, (len - 1) * perSegmentDiscount)` (§4.C step 5).
fn discount_for(len: usize, opts: &Options) -> f64 {
    let additive = (len.saturating_sub(1)) as f64 * opts.per_segment_discount;
    additive.min(opts.max_discount_rate)
}

/// Sorts by `utility_score` descending, ties broken by ascending `bundle_id`
/// (§4.C, §8.2), then truncates to `max_results`.
pub fn sort_and_truncate(bundles: &mut Vec<Bundle>, max_results: usize) {
    bundles.sort_by(|a, b| {
        b.utility_score
            .partial_cmp(&a.utility_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.bundle_id.cmp(&b.bundle_id))
    });
    bundles.truncate(max_results);
}
