use crate::error::RenderExportError;
use crate::models::Snapshot;

pub fn snapshot_to_json(snapshot: &Snapshot) -> Result<String, RenderExportError> {
    Ok(serde_json::to_string_pretty(snapshot)?)
}

pub fn snapshot_from_json(json: &str) -> Result<Snapshot, RenderExportError> {
    Ok(serde_json::from_str(json)?)
}
