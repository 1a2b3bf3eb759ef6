//! End-to-end scenarios exercising the Coordinator against a scripted fake
//! chain: a single segment all the way through reservation, confirmation,
//! contention, revert and expiry.

use {
    model::{Bundle, Point, RunId, SegmentStatus},
    rust_decimal::Decimal,
    testlib::scenarios,
};

fn single_segment_bundle(segment_id: &model::SegmentId) -> Bundle {
    Bundle {
        bundle_id: model::stable_bundle_id(std::slice::from_ref(segment_id)),
        segments: vec![segment_id.clone()],
        origin: Point::new(0.0, 0.0),
        destination: Point::new(5.0, 5.0),
        depart_time: 10,
        arrive_time: 20,
        base_price: Decimal::new(500, 2),
        discount: 0.0,
        final_price: Decimal::new(500, 2),
        num_segments: 1,
        modes: vec![model::Mode::Car],
        utility_score: 0.0,
    }
}

#[tokio::test]
async fn s1_direct_bundle_confirms() {
    let fixture = testlib::fixture().await;
    let coordinator = &fixture.coordinator;

    let (segment, request) = scenarios::s1_direct_bundle();
    let segment_id = segment.segment_id.clone();
    coordinator.publish_segment(segment).unwrap();
    let request_id = coordinator.create_request(request).unwrap();

    let bundles = coordinator.build_bundles(Point::new(0.0, 0.0), Point::new(10.0, 10.0), 50);
    assert_eq!(bundles.len(), 1);
    let bundle = bundles.into_iter().next().unwrap();
    assert_eq!(bundle.segments, vec![segment_id.clone()]);
    assert_eq!(bundle.discount, 0.0);

    coordinator
        .reserve_bundle(model::AgentId::from("C1"), request_id, bundle)
        .await
        .unwrap();

    let segment = coordinator.get_segment(&segment_id).unwrap();
    assert_eq!(segment.remaining, 0);

    // Give the background confirmation handler a chance to run.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    let stats = coordinator.stats();
    assert_eq!(stats.ledger.confirmed, 1);
}

#[tokio::test]
async fn s2_three_leg_bundle_applies_discount() {
    let fixture = testlib::fixture().await;
    let coordinator = &fixture.coordinator;

    for leg in scenarios::s2_three_leg_discount_bundle() {
        coordinator.publish_segment(leg).unwrap();
    }

    let bundles = coordinator.build_bundles(Point::new(0.0, 0.0), Point::new(10.0, 10.0), 10);
    assert_eq!(bundles.len(), 1);
    let bundle = &bundles[0];
    assert_eq!(bundle.segments.len(), 3);
    assert!((bundle.discount - 0.10).abs() < 1e-9);
    assert_eq!(bundle.final_price.to_string(), "7.02");
}

#[tokio::test]
async fn s3_capacity_race_only_one_reservation_succeeds() {
    let fixture = testlib::fixture().await;
    let coordinator = fixture.coordinator.clone();

    let segment_id = scenarios::contended_segment().segment_id;
    coordinator.publish_segment(scenarios::contended_segment()).unwrap();
    let r1 = coordinator.create_request(scenarios::requester("R1", "C1")).unwrap();
    let r2 = coordinator.create_request(scenarios::requester("R2", "C2")).unwrap();

    let coordinator_a = coordinator.clone();
    let bundle_a = single_segment_bundle(&segment_id);
    let task_a = tokio::spawn(async move {
        coordinator_a.reserve_bundle(model::AgentId::from("C1"), r1, bundle_a).await
    });
    let coordinator_b = coordinator.clone();
    let bundle_b = single_segment_bundle(&segment_id);
    let task_b = tokio::spawn(async move {
        coordinator_b.reserve_bundle(model::AgentId::from("C2"), r2, bundle_b).await
    });

    let (a, b) = (task_a.await.unwrap(), task_b.await.unwrap());
    let successes = [&a, &b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one reserveBundle call must succeed");

    let segment = coordinator.get_segment(&segment_id).unwrap();
    assert_eq!(segment.remaining, 0);
}

#[tokio::test]
async fn s4_ledger_revert_releases_hold_and_reopens_request() {
    let fixture = testlib::fixture().await;
    let coordinator = &fixture.coordinator;
    fixture.rpc.revert_next(1);

    let segment_id = scenarios::contended_segment().segment_id;
    coordinator.publish_segment(scenarios::contended_segment()).unwrap();
    let request_id = coordinator.create_request(scenarios::requester("R1", "C1")).unwrap();

    coordinator
        .reserve_bundle(model::AgentId::from("C1"), request_id, single_segment_bundle(&segment_id))
        .await
        .unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    let segment = coordinator.get_segment(&segment_id).unwrap();
    assert_eq!(segment.remaining, 1);
    assert_eq!(segment.status, SegmentStatus::Open);
}

#[tokio::test]
async fn s5_expiry_tick_excludes_segment_from_snapshot() {
    let fixture = testlib::fixture().await;
    let coordinator = &fixture.coordinator;

    let segment = scenarios::s5_expiring_segment();
    let segment_id = segment.segment_id.clone();
    coordinator.publish_segment(segment).unwrap();

    let report = coordinator.tick(41);
    assert_eq!(report.segments_expired, 1);

    let segment = coordinator.get_segment(&segment_id).unwrap();
    assert_eq!(segment.status, SegmentStatus::Expired);

    let bundles = coordinator.build_bundles(Point::new(0.0, 0.0), Point::new(1.0, 1.0), 0);
    assert!(bundles.is_empty());
}

#[tokio::test]
async fn s6_export_with_overwrite_replaces_run_exactly_once() {
    let fixture = testlib::fixture().await;
    let coordinator = &fixture.coordinator;

    let (segment, request) = scenarios::s1_direct_bundle();
    coordinator.publish_segment(segment).unwrap();
    coordinator.create_request(request).unwrap();

    // `sqlite::memory:` gives every new pool its own throwaway database, so
    // exercising overwrite semantics across several `export_simulation`
    // calls needs a real file the pools can all see.
    let db_path = std::env::temp_dir().join("maas-coordinator-test-s6.sqlite3");
    let _ = std::fs::remove_file(&db_path);
    let config = exporter::Config { database_url: format!("sqlite://{}?mode=rwc", db_path.display()) };
    let run_id = RunId::from("run-s6");
    coordinator.export_simulation(run_id.clone(), &config, false).await.unwrap();

    let err = coordinator.export_simulation(run_id.clone(), &config, false).await.unwrap_err();
    assert!(matches!(err, exporter::Error::DuplicateRun(id) if id == "run-s6"));

    coordinator.export_simulation(run_id.clone(), &config, true).await.unwrap();

    let pool = exporter::connect(&config).await.unwrap();
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM run WHERE run_id = 'run-s6'")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count.0, 1);
}
