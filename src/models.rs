use crate::errors::{AppError, GRADE_OUT_OF_RANGE, MISSING_FIELDS};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_SUBJECT: &str = "General";
pub const MIN_GRADE: f64 = 0.0;
pub const MAX_GRADE: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    pub nombre: String,
    pub apellidos: String,
    pub nota: f64,
    pub asignatura: String,
    pub fecha: NaiveDate,
}

/// On-disk document: `{ "estudiantes": [...] }`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StudentsDocument {
    #[serde(default)]
    pub estudiantes: Vec<Student>,
}

/// A grade as submitted by a client: either a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum GradeInput {
    Number(f64),
    Text(String),
}

impl GradeInput {
    pub fn parse(&self) -> Result<f64, AppError> {
        let value = match self {
            GradeInput::Number(value) => *value,
            GradeInput::Text(raw) => raw
                .trim()
                .parse::<f64>()
                .map_err(|_| AppError::bad_request(GRADE_OUT_OF_RANGE))?,
        };
        if !value.is_finite() || !(MIN_GRADE..=MAX_GRADE).contains(&value) {
            return Err(AppError::bad_request(GRADE_OUT_OF_RANGE));
        }
        Ok(value)
    }
}

/// Body of both create and update requests. Every field is optional here;
/// which ones are required depends on the operation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentInput {
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub apellidos: Option<String>,
    #[serde(default)]
    pub nota: Option<GradeInput>,
    #[serde(default)]
    pub asignatura: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewStudent {
    pub nombre: String,
    pub apellidos: String,
    pub nota: f64,
    pub asignatura: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StudentChanges {
    pub nombre: Option<String>,
    pub apellidos: Option<String>,
    pub nota: Option<f64>,
    pub asignatura: Option<String>,
}

fn trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .map(str::to_string)
}

fn required(value: &str) -> Result<String, AppError> {
    trimmed(Some(value)).ok_or_else(|| AppError::bad_request(MISSING_FIELDS))
}

impl StudentInput {
    pub fn into_new_student(self) -> Result<NewStudent, AppError> {
        let nombre = trimmed(self.nombre.as_deref());
        let apellidos = trimmed(self.apellidos.as_deref());
        let (Some(nombre), Some(apellidos), Some(nota)) = (nombre, apellidos, self.nota) else {
            return Err(AppError::bad_request(MISSING_FIELDS));
        };

        Ok(NewStudent {
            nombre,
            apellidos,
            nota: nota.parse()?,
            asignatura: trimmed(self.asignatura.as_deref())
                .unwrap_or_else(|| DEFAULT_SUBJECT.to_string()),
        })
    }

    /// Validates a partial update without touching any record, so a rejected
    /// update never leaves a half-applied change behind.
    pub fn into_changes(self) -> Result<StudentChanges, AppError> {
        let nota = self.nota.as_ref().map(GradeInput::parse).transpose()?;

        let nombre = self.nombre.as_deref().map(required).transpose()?;
        let apellidos = self.apellidos.as_deref().map(required).transpose()?;

        Ok(StudentChanges {
            nombre,
            apellidos,
            nota,
            // blank subject on update keeps the stored one
            asignatura: trimmed(self.asignatura.as_deref()),
        })
    }
}

impl Student {
    pub fn apply(&mut self, changes: StudentChanges) {
        if let Some(nombre) = changes.nombre {
            self.nombre = nombre;
        }
        if let Some(apellidos) = changes.apellidos {
            self.apellidos = apellidos;
        }
        if let Some(nota) = changes.nota {
            self.nota = nota;
        }
        if let Some(asignatura) = changes.asignatura {
            self.asignatura = asignatura;
        }
    }
}
