use crate::grades::{classify, Bucket, PASS_THRESHOLD};
use crate::models::Student;
use serde::Deserialize;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    All,
    Pass,
    Fail,
    Excellent,
}

impl Filter {
    pub const ALL: [Filter; 4] = [Filter::All, Filter::Pass, Filter::Fail, Filter::Excellent];

    pub fn matches(self, student: &Student) -> bool {
        match self {
            Filter::All => true,
            Filter::Pass => student.nota >= PASS_THRESHOLD,
            Filter::Fail => student.nota < PASS_THRESHOLD,
            Filter::Excellent => classify(student.nota) == Bucket::Excellent,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Filter::All => "all",
            Filter::Pass => "pass",
            Filter::Fail => "fail",
            Filter::Excellent => "excellent",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Filter::All => "Todos",
            Filter::Pass => "Aprobados",
            Filter::Fail => "Suspendidos",
            Filter::Excellent => "Excelentes",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|filter| filter.as_str() == raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Nombre,
    Apellidos,
    Nota,
}

impl SortField {
    pub fn as_str(self) -> &'static str {
        match self {
            SortField::Nombre => "nombre",
            SortField::Apellidos => "apellidos",
            SortField::Nota => "nota",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        [SortField::Nombre, SortField::Apellidos, SortField::Nota]
            .into_iter()
            .find(|field| field.as_str() == raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub field: SortField,
    pub direction: Direction,
}

/// What the table is currently showing: which rows, in which order, and
/// which record (if any) is loaded into the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewState {
    pub filter: Filter,
    pub sort: Option<SortOrder>,
    pub editing: Option<i64>,
}

/// Raw query string form of [`ViewState`]. Kept loose so a stale or
/// hand-edited URL degrades to defaults instead of a 400.
#[derive(Debug, Default, Deserialize)]
pub struct ViewQuery {
    pub filtro: Option<String>,
    pub campo: Option<String>,
    pub orden: Option<String>,
    pub editando: Option<String>,
}

impl From<ViewQuery> for ViewState {
    fn from(query: ViewQuery) -> Self {
        let filter = query.filtro.as_deref().and_then(Filter::parse).unwrap_or_default();
        let sort = query.campo.as_deref().and_then(SortField::parse).map(|field| SortOrder {
            field,
            direction: match query.orden.as_deref() {
                Some("desc") => Direction::Desc,
                _ => Direction::Asc,
            },
        });
        let editing = query.editando.as_deref().and_then(|raw| raw.trim().parse().ok());

        Self {
            filter,
            sort,
            editing,
        }
    }
}

impl ViewState {
    /// Sort order a click on `field`'s header should produce: a second click
    /// on an ascending column flips it, anything else starts ascending.
    pub fn toggled_sort(&self, field: SortField) -> SortOrder {
        let direction = match self.sort {
            Some(current) if current.field == field && current.direction == Direction::Asc => {
                Direction::Desc
            }
            _ => Direction::Asc,
        };
        SortOrder { field, direction }
    }

    /// Filters, then stable-sorts, a snapshot of the store.
    pub fn apply(&self, students: &[Student]) -> Vec<Student> {
        let mut rows: Vec<Student> = students
            .iter()
            .filter(|student| self.filter.matches(student))
            .cloned()
            .collect();

        if let Some(order) = self.sort {
            rows.sort_by(|a, b| {
                let ordering = compare(order.field, a, b);
                match order.direction {
                    Direction::Asc => ordering,
                    Direction::Desc => ordering.reverse(),
                }
            });
        }
        rows
    }
}

fn compare(field: SortField, a: &Student, b: &Student) -> Ordering {
    match field {
        SortField::Nombre => a.nombre.to_lowercase().cmp(&b.nombre.to_lowercase()),
        SortField::Apellidos => a.apellidos.to_lowercase().cmp(&b.apellidos.to_lowercase()),
        SortField::Nota => a.nota.total_cmp(&b.nota),
    }
}
