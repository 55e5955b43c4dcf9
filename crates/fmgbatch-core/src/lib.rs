// fmgbatch-core: policy records, change detection and reconciliation
//
// Everything between the JSON-RPC client and the CLI: the on-disk record
// store, the generation diff, bulk interface rewriting, and the remote
// apply/download workflows.

pub mod apply;
pub mod config;
pub mod diff;
pub mod download;
pub mod error;
pub mod model;
pub mod remote;
pub mod rewrite;
pub mod store;

pub use apply::{
    ApplyOutcome, ApplyStatus, ApplySummary, FieldOutcome, apply, apply_one, apply_with,
};
pub use config::{ManagerConfig, TlsVerification};
pub use diff::{WatchedFields, compare_records, diff};
pub use download::{DownloadEvent, download};
pub use error::{CoreError, FileError};
pub use model::{FieldChange, Generation, PolicyId, PolicyRecord, RecordDelta};
pub use remote::{PolicyApi, PolicyPackage};
pub use rewrite::{
    DEFAULT_REPLACEMENTS, DEFAULT_TARGET_INTERFACE, InterfaceRewrite, replace_interface,
};
pub use store::{load_generation, record_path, save_record};

pub use fmgbatch_api::{Scope, Status};
