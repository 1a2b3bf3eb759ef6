//! The Bundle Router: a peer-local graph-search engine that assembles
//! segments into priced multi-modal bundles. Reads an immutable snapshot,
//! never mutates, and never returns an error — an unreachable destination or
//! an empty snapshot simply yields an empty result (§4.C).

mod graph;
mod options;
mod search;

pub use options::Options;

use model::{Bundle, Point, Segment};

/// Builds a ranked list of bundle candidates from `snapshot` connecting
/// `origin` to `destination` no earlier than `start_time`. Deterministic:
/// the same snapshot and options always produce the same ordered output
/// (§8.2).
pub fn build(
    snapshot: &[Segment],
    origin: Point,
    destination: Point,
    start_time: u64,
    opts: &Options,
) -> Vec<Bundle> {
    let graph = graph::SegmentGraph::build(snapshot, opts);
    let Some(start) = graph.nearest_node(&origin, opts.nearness_epsilon) else {
        tracing::debug!("no node within epsilon of origin; returning empty bundle list");
        return Vec::new();
    };
    let mut bundles =
        search::enumerate_paths(&graph, start, &destination, start_time, opts);
    search::sort_and_truncate(&mut bundles, opts.max_results);
    bundles
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::{AgentId, Mode, SegmentId, SegmentSource, SegmentStatus};
    use rust_decimal::Decimal;

    fn seg(id: &str, ox: f64, oy: f64, dx: f64, dy: f64, dep: u64, arr: u64, price: i64) -> Segment {
        Segment {
            segment_id: SegmentId::from(id),
            provider_id: AgentId::from("p"),
            mode: Mode::Bike,
            origin: Point::new(ox, oy),
            destination: Point::new(dx, dy),
            depart_time: dep,
            arrive_time: arr,
            price: Decimal::new(price, 2),
            capacity: 1,
            remaining: 1,
            created_tick: 0,
            status: SegmentStatus::Open,
            source: Some(SegmentSource::Proactive),
            target_request_id: None,
        }
    }

    #[test]
    fn empty_snapshot_yields_empty_result() {
        let out = build(&[], Point::new(0.0, 0.0), Point::new(1.0, 1.0), 0, &Options::default());
        assert!(out.is_empty());
    }

    #[test]
    fn single_segment_bundle_has_no_discount() {
        let segments = vec![seg("A", 0.0, 0.0, 10.0, 10.0, 50, 70, 1200)];
        let out = build(
            &segments,
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            50,
            &Options::default(),
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].num_segments, 1);
        assert_eq!(out[0].discount, 0.0);
        assert_eq!(out[0].base_price, Decimal::new(1200, 2));
    }

    #[test]
    fn three_leg_bundle_applies_stacked_discount() {
        let segments = vec![
            seg("A", 0.0, 0.0, 3.0, 3.0, 10, 20, 200),
            seg("B", 3.0, 3.0, 7.0, 7.0, 22, 35, 400),
            seg("C", 7.0, 7.0, 10.0, 10.0, 37, 45, 180),
        ];
        let out = build(
            &segments,
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            10,
            &Options::default(),
        );
        assert_eq!(out.len(), 1);
        let bundle = &out[0];
        assert_eq!(bundle.segments.len(), 3);
        assert_eq!(bundle.base_price, Decimal::new(780, 2));
        assert!((bundle.discount - 0.10).abs() < 1e-9);
        assert_eq!(bundle.final_price, Decimal::new(702, 2));
    }

    #[test]
    fn first_leg_lateness_is_bounded_by_time_window_not_tau() {
        // Departs 8 ticks after start_time, past the default τ=5 but well
        // inside the default 500-tick time_window (§4.C step 4 scopes τ to
        // consecutive segment pairs, not the first leg against start_time).
        let segments = vec![seg("A", 0.0, 0.0, 10.0, 10.0, 58, 70, 1200)];
        let out = build(
            &segments,
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            50,
            &Options::default(),
        );
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn determinism_same_snapshot_same_order() {
        let segments = vec![
            seg("A", 0.0, 0.0, 3.0, 3.0, 10, 20, 200),
            seg("B", 3.0, 3.0, 7.0, 7.0, 22, 35, 400),
            seg("C", 7.0, 7.0, 10.0, 10.0, 37, 45, 180),
        ];
        let opts = Options::default();
        let first = build(&segments, Point::new(0.0, 0.0), Point::new(10.0, 10.0), 10, &opts);
        let second = build(&segments, Point::new(0.0, 0.0), Point::new(10.0, 10.0), 10, &opts);
        let first_ids: Vec<_> = first.iter().map(|b| b.bundle_id.clone()).collect();
        let second_ids: Vec<_> = second.iter().map(|b| b.bundle_id.clone()).collect();
        assert_eq!(first_ids, second_ids);
    }
}
