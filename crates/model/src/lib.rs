//! Tagged record types and the shared error taxonomy for the MaaS
//! marketplace core. No I/O, no async: every other crate in the workspace
//! builds on these definitions.

pub mod agent;
pub mod bundle;
pub mod error;
pub mod ids;
pub mod match_record;
pub mod notification;
pub mod offer;
pub mod point;
pub mod price;
pub mod request;
pub mod reservation;
pub mod segment;
pub mod transaction;

pub use {
    agent::{Agent, Role},
    bundle::{stable_bundle_id, Bundle},
    error::{Error, ErrorKind, Result},
    ids::{AgentId, BundleId, OfferId, ReservationId, RequestId, RunId, SegmentId, TxId},
    match_record::Match,
    notification::{Notification, NotificationKind},
    offer::Offer,
    point::Point,
    price::{round_price, Price},
    request::{Request, RequestStatus},
    reservation::{Reservation, SettlementState},
    segment::{Mode, Segment, SegmentSource, SegmentStatus},
    transaction::{Transaction, TxOrigin, TxState},
};
