//! Fluent builders for `NewSegment`/`NewRequest`, so a scenario that only
//! cares about one or two fields doesn't have to restate the rest of the
//! struct literal. Production code always populates the full struct
//! directly; these exist only to keep test fixtures short.

use {
    marketplace::{NewRequest, NewSegment},
    model::{AgentId, Mode, Point, Price, RequestId, SegmentId, SegmentSource},
    rust_decimal::Decimal,
    std::{collections::HashMap, str::FromStr},
};

fn price(s: &str) -> Price {
    Decimal::from_str(s).expect("valid literal")
}

pub struct SegmentBuilder {
    inner: NewSegment,
}

impl SegmentBuilder {
    pub fn new(segment_id: &str, provider_id: &str) -> Self {
        Self {
            inner: NewSegment {
                segment_id: SegmentId::from(segment_id),
                provider_id: AgentId::from(provider_id),
                mode: Mode::Car,
                origin: Point::new(0.0, 0.0),
                destination: Point::new(1.0, 1.0),
                depart_time: 0,
                arrive_time: 1,
                price: price("1.00"),
                capacity: 1,
                source: Some(SegmentSource::Proactive),
                target_request_id: None,
            },
        }
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.inner.mode = mode;
        self
    }

    pub fn route(mut self, origin: Point, destination: Point) -> Self {
        self.inner.origin = origin;
        self.inner.destination = destination;
        self
    }

    pub fn schedule(mut self, depart_time: u64, arrive_time: u64) -> Self {
        self.inner.depart_time = depart_time;
        self.inner.arrive_time = arrive_time;
        self
    }

    pub fn price(mut self, amount: &str) -> Self {
        self.inner.price = price(amount);
        self
    }

    pub fn capacity(mut self, capacity: u32) -> Self {
        self.inner.capacity = capacity;
        self
    }

    pub fn in_response_to(mut self, request_id: &str) -> Self {
        self.inner.source = Some(SegmentSource::ResponseToRequest);
        self.inner.target_request_id = Some(RequestId::from(request_id));
        self
    }

    pub fn build(self) -> NewSegment {
        self.inner
    }
}

pub struct RequestorBuilder {
    inner: NewRequest,
}

impl RequestorBuilder {
    pub fn new(request_id: &str, commuter_id: &str) -> Self {
        Self {
            inner: NewRequest {
                request_id: RequestId::from(request_id),
                commuter_id: AgentId::from(commuter_id),
                origin: Point::new(0.0, 0.0),
                destination: Point::new(1.0, 1.0),
                start_time: 0,
                max_price: None,
                purpose: "commute".into(),
                requirements: HashMap::new(),
                ttl_ticks: 1_000,
            },
        }
    }

    pub fn route(mut self, origin: Point, destination: Point) -> Self {
        self.inner.origin = origin;
        self.inner.destination = destination;
        self
    }

    pub fn start_time(mut self, start_time: u64) -> Self {
        self.inner.start_time = start_time;
        self
    }

    pub fn max_price(mut self, amount: &str) -> Self {
        self.inner.max_price = Some(price(amount));
        self
    }

    pub fn purpose(mut self, purpose: &str) -> Self {
        self.inner.purpose = purpose.into();
        self
    }

    pub fn ttl_ticks(mut self, ttl_ticks: u64) -> Self {
        self.inner.ttl_ticks = ttl_ticks;
        self
    }

    pub fn build(self) -> NewRequest {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_builder_overrides_only_named_fields() {
        let segment = SegmentBuilder::new("A", "P1")
            .schedule(10, 20)
            .price("3.50")
            .build();
        assert_eq!(segment.depart_time, 10);
        assert_eq!(segment.arrive_time, 20);
        assert_eq!(segment.price, price("3.50"));
        assert_eq!(segment.capacity, 1);
    }

    #[test]
    fn requestor_builder_sets_max_price() {
        let request = RequestorBuilder::new("R1", "C1").max_price("15.00").build();
        assert_eq!(request.max_price, Some(price("15.00")));
    }
}
