// ── Domain model ──
//
// Policy records, generations of them, and the deltas computed between
// generations.

pub mod delta;
pub mod generation;
pub mod record;

pub use delta::{FieldChange, RecordDelta};
pub use generation::Generation;
pub use record::{
    DSTINTF_FIELD, NAME_FIELD, POLICY_ID_FIELD, PolicyId, PolicyRecord, SRCINTF_FIELD, UNNAMED,
    interface_name, names_interface, normalize_interfaces,
};
