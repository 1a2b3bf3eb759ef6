use {derive_more::{Display, From}, serde::{Deserialize, Serialize}};

macro_rules! opaque_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Display, From, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }
    };
}

opaque_id!(AgentId);
opaque_id!(RequestId);
opaque_id!(SegmentId);
opaque_id!(OfferId);
opaque_id!(ReservationId);
opaque_id!(BundleId);
opaque_id!(TxId);
opaque_id!(RunId);
