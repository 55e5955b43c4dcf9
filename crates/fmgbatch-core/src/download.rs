// ── Download ──
//
// Snapshot a remote package into a record directory: list, then fetch each
// policy in full and save it as `policy_<id>.json`.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{CoreError, FileError};
use crate::model::PolicyId;
use crate::remote::PolicyApi;
use crate::store;

/// Progress notifications emitted by [`download`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadEvent {
    /// The package listing came back with `total` entries.
    Listed { total: usize },
    Saved { policy_id: PolicyId, path: PathBuf },
}

/// Download every policy in scope into `output_dir`.
///
/// `output_dir` is created before anything is fetched. Returns the number
/// of records written. Stops at the first API or file error.
pub async fn download<A, F>(
    api: &A,
    output_dir: &Path,
    mut on_progress: F,
) -> Result<usize, CoreError>
where
    A: PolicyApi,
    F: FnMut(DownloadEvent),
{
    fs::create_dir_all(output_dir).map_err(|source| FileError::Write {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let summaries = api.list_policies().await?;
    info!(count = summaries.len(), "found policies");
    on_progress(DownloadEvent::Listed {
        total: summaries.len(),
    });

    let mut saved = 0;
    for summary in &summaries {
        let Some(id) = summary.policy_id() else {
            warn!(name = summary.name(), "policy summary without policyid, skipping");
            continue;
        };
        let record = api.get_policy(id).await?;
        let path = store::record_path(output_dir, id);
        store::save_record(&record, &path)?;
        saved += 1;
        on_progress(DownloadEvent::Saved {
            policy_id: id,
            path,
        });
    }

    info!(
        count = saved,
        directory = %output_dir.display(),
        "downloaded policies"
    );
    Ok(saved)
}
