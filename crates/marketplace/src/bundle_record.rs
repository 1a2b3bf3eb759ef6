//! A durable digest of a `Bundle` captured at the moment it is reserved.
//!
//! Per §3.3 a Bundle itself is ephemeral: constructed by the router,
//! returned to the caller, and discarded. But §4.E item 5 requires the
//! analytical exporter to write `bundles` and `bundle_segments` rows for
//! every bundle that was ever reserved, so the store keeps this lightweight
//! summary alongside the Reservation that realized it -- not the live
//! Bundle, just enough of its shape to reconstruct those two tables later.

use model::{Bundle, BundleId, Mode, Point, Price, SegmentId};

#[derive(Debug, Clone)]
pub struct BundleRecord {
    pub bundle_id: BundleId,
    pub segments: Vec<SegmentId>,
    pub origin: Point,
    pub destination: Point,
    pub depart_time: u64,
    pub arrive_time: u64,
    pub base_price: Price,
    pub discount: f64,
    pub final_price: Price,
    pub modes: Vec<Mode>,
}

impl From<&Bundle> for BundleRecord {
    fn from(bundle: &Bundle) -> Self {
        Self {
            bundle_id: bundle.bundle_id.clone(),
            segments: bundle.segments.clone(),
            origin: bundle.origin,
            destination: bundle.destination,
            depart_time: bundle.depart_time,
            arrive_time: bundle.arrive_time,
            base_price: bundle.base_price,
            discount: bundle.discount,
            final_price: bundle.final_price,
            modes: bundle.modes.clone(),
        }
    }
}
