use crate::errors::{AppError, STUDENT_NOT_FOUND};
use crate::models::{Student, StudentInput, StudentsDocument};
use crate::storage::{load_document, persist_document};
use chrono::{NaiveDate, Utc};
use std::path::{Path, PathBuf};
use tokio::{fs, sync::Mutex};
use tracing::info;

/// Student records persisted as one JSON document.
///
/// Every operation re-reads the file, so edits made to it while the server
/// runs are picked up. Operations hold `lock` for their whole
/// read-modify-write window; two requests in this process can never
/// overwrite each other's change.
pub struct RecordStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl RecordStore {
    /// Opens the store, creating the file (and its directory) if needed.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let document = load_document(&path).await?;
        persist_document(&path, &document).await?;
        info!(
            "record store ready at {} with {} students",
            path.display(),
            document.estudiantes.len()
        );

        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn list(&self) -> Result<Vec<Student>, AppError> {
        let _guard = self.lock.lock().await;
        Ok(load_document(&self.path).await?.estudiantes)
    }

    pub async fn create(&self, input: StudentInput) -> Result<Student, AppError> {
        let new = input.into_new_student()?;

        let _guard = self.lock.lock().await;
        let mut document = load_document(&self.path).await?;
        let student = Student {
            id: next_id(&document.estudiantes, Utc::now().timestamp_millis())?,
            nombre: new.nombre,
            apellidos: new.apellidos,
            nota: new.nota,
            asignatura: new.asignatura,
            fecha: today(),
        };
        document.estudiantes.push(student.clone());
        persist_document(&self.path, &document).await?;

        info!("created student {}", student.id);
        Ok(student)
    }

    pub async fn update(&self, id: i64, input: StudentInput) -> Result<Student, AppError> {
        let _guard = self.lock.lock().await;
        let mut document = load_document(&self.path).await?;
        let student = find_mut(&mut document, id)?;

        student.apply(input.into_changes()?);
        let updated = student.clone();
        persist_document(&self.path, &document).await?;

        info!("updated student {id}");
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        let _guard = self.lock.lock().await;
        let mut document = load_document(&self.path).await?;
        let before = document.estudiantes.len();
        document.estudiantes.retain(|student| student.id != id);
        if document.estudiantes.len() == before {
            return Err(AppError::not_found(STUDENT_NOT_FOUND));
        }
        persist_document(&self.path, &document).await?;

        info!("deleted student {id}");
        Ok(())
    }
}

fn find_mut(document: &mut StudentsDocument, id: i64) -> Result<&mut Student, AppError> {
    document
        .estudiantes
        .iter_mut()
        .find(|student| student.id == id)
        .ok_or_else(|| AppError::not_found(STUDENT_NOT_FOUND))
}

/// Ids follow the wall clock in milliseconds but never repeat or go
/// backwards relative to what is already stored.
fn next_id(existing: &[Student], now_millis: i64) -> Result<i64, AppError> {
    match existing.iter().map(|student| student.id).max() {
        Some(max) if max >= now_millis => max.checked_add(1).ok_or_else(|| {
            AppError::internal_message("no student ids left above the stored maximum")
        }),
        _ => Ok(now_millis),
    }
}

/// Creation dates are UTC calendar days.
fn today() -> NaiveDate {
    Utc::now().date_naive()
}
