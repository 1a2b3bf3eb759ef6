//! Fixture builders for the end-to-end scenarios named in the spec's
//! concrete-examples section (S1-S6): segments and requests with the exact
//! coordinates, times and prices the scenarios describe.

use {
    marketplace::{NewRequest, NewSegment},
    model::{AgentId, Mode, Point, Price, RequestId, SegmentId, SegmentSource},
    rust_decimal::Decimal,
    std::{collections::HashMap, str::FromStr},
};

fn price(s: &str) -> Price {
    Decimal::from_str(s).expect("valid literal")
}

/// S1: a single segment spanning the whole request, no transfers.
pub fn s1_direct_bundle() -> (NewSegment, NewRequest) {
    let segment = NewSegment {
        segment_id: SegmentId::from("A"),
        provider_id: AgentId::from("P1"),
        mode: Mode::Car,
        origin: Point::new(0.0, 0.0),
        destination: Point::new(10.0, 10.0),
        depart_time: 50,
        arrive_time: 70,
        price: price("12.00"),
        capacity: 1,
        source: Some(SegmentSource::Proactive),
        target_request_id: None,
    };
    let request = NewRequest {
        request_id: RequestId::from("R1"),
        commuter_id: AgentId::from("C1"),
        origin: Point::new(0.0, 0.0),
        destination: Point::new(10.0, 10.0),
        start_time: 50,
        max_price: Some(price("15.00")),
        purpose: "commute".into(),
        requirements: HashMap::new(),
        ttl_ticks: 1_000,
    };
    (segment, request)
}

/// S2: a three-leg chain, each leg handed off at the previous leg's
/// destination within the router's time tolerance.
pub fn s2_three_leg_discount_bundle() -> [NewSegment; 3] {
    let leg = |id: &str, ox, oy, dx, dy, depart, arrive, p: &str| NewSegment {
        segment_id: SegmentId::from(id),
        provider_id: AgentId::from("P1"),
        mode: Mode::Bus,
        origin: Point::new(ox, oy),
        destination: Point::new(dx, dy),
        depart_time: depart,
        arrive_time: arrive,
        price: price(p),
        capacity: 1,
        source: Some(SegmentSource::Proactive),
        target_request_id: None,
    };
    [
        leg("A", 0.0, 0.0, 3.0, 3.0, 10, 20, "2.00"),
        leg("B", 3.0, 3.0, 7.0, 7.0, 22, 35, "4.00"),
        leg("C", 7.0, 7.0, 10.0, 10.0, 37, 45, "1.80"),
    ]
}

/// S3/S4: a single, single-capacity segment contended by two requests.
pub fn contended_segment() -> NewSegment {
    NewSegment {
        segment_id: SegmentId::from("X"),
        provider_id: AgentId::from("P1"),
        mode: Mode::Car,
        origin: Point::new(0.0, 0.0),
        destination: Point::new(5.0, 5.0),
        depart_time: 10,
        arrive_time: 20,
        price: price("5.00"),
        capacity: 1,
        source: Some(SegmentSource::Proactive),
        target_request_id: None,
    }
}

pub fn requester(id: &str, commuter: &str) -> NewRequest {
    NewRequest {
        request_id: RequestId::from(id),
        commuter_id: AgentId::from(commuter),
        origin: Point::new(0.0, 0.0),
        destination: Point::new(5.0, 5.0),
        start_time: 10,
        max_price: None,
        purpose: "commute".into(),
        requirements: HashMap::new(),
        ttl_ticks: 1_000,
    }
}

/// S5: a segment that departs before the tick that will expire it.
pub fn s5_expiring_segment() -> NewSegment {
    NewSegment {
        segment_id: SegmentId::from("E"),
        provider_id: AgentId::from("P1"),
        mode: Mode::Walk,
        origin: Point::new(0.0, 0.0),
        destination: Point::new(1.0, 1.0),
        depart_time: 40,
        arrive_time: 41,
        price: price("1.00"),
        capacity: 1,
        source: Some(SegmentSource::Proactive),
        target_request_id: None,
    }
}
