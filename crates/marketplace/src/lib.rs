//! The Marketplace Store: the single source of truth for off-chain state.
//! All mutations are serializable at the granularity of a logical record; a
//! single reader-writer lock guards the whole store, and no operation
//! performs network or disk I/O while holding it.

pub mod aggregate;
pub mod bundle_record;
pub mod inputs;
pub mod store;

pub use {
    aggregate::TickAggregate,
    bundle_record::BundleRecord,
    inputs::{NewOffer, NewRequest, NewSegment},
    store::{offer_id_of, ExpiryReport, Store, StoreCounts},
};
