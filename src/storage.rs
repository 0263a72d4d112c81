use crate::errors::AppError;
use crate::models::StudentsDocument;
use std::path::Path;
use tokio::fs;
use tracing::warn;

/// Reads the document from disk. A missing file is an empty store; anything
/// else that goes wrong is surfaced to the caller.
pub async fn load_document(path: &Path) -> Result<StudentsDocument, AppError> {
    match fs::read(path).await {
        Ok(bytes) => serde_json::from_slice(&bytes).map_err(|err| {
            warn!("failed to parse data file {}: {err}", path.display());
            AppError::internal(err)
        }),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(StudentsDocument::default()),
        Err(err) => Err(AppError::internal(err)),
    }
}

pub async fn persist_document(path: &Path, document: &StudentsDocument) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(document)?;
    fs::write(path, payload).await?;
    Ok(())
}
