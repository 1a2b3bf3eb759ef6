use {
    crate::{ids::{BundleId, SegmentId}, point::Point, price::Price, segment::Mode},
    serde::{Deserialize, Serialize},
    sha2::{Digest, Sha256},
};

/// An ordered, end-to-end journey composed of segments. Ephemeral: it is
/// constructed by the router, returned to the caller, and discarded unless
/// turned into a Reservation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bundle {
    pub bundle_id: BundleId,
    pub segments: Vec<SegmentId>,
    pub origin: Point,
    pub destination: Point,
    pub depart_time: u64,
    pub arrive_time: u64,
    pub base_price: Price,
    pub discount: f64,
    pub final_price: Price,
    pub num_segments: usize,
    pub modes: Vec<Mode>,
    pub utility_score: f64,
}

/// Deterministic id for an ordered list of segment ids (§3.1, `bundleId`).
/// A stable hash rather than a random one so that `buildBundles` run twice on
/// the same snapshot produces byte-identical bundle ids (§8.2, router
/// determinism).
pub fn stable_bundle_id(ordered_segment_ids: &[SegmentId]) -> BundleId {
    let mut hasher = Sha256::new();
    for id in ordered_segment_ids {
        hasher.update(id.as_str().as_bytes());
        hasher.update(b"\0");
    }
    BundleId(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic_and_order_sensitive() {
        let a = SegmentId::from("A");
        let b = SegmentId::from("B");
        let h1 = stable_bundle_id(&[a.clone(), b.clone()]);
        let h2 = stable_bundle_id(&[a.clone(), b.clone()]);
        let h3 = stable_bundle_id(&[b, a]);
        assert_eq!(h1, h2);
        assert_ne!(h1, h3);
    }
}
