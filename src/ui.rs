use crate::grades::classify;
use crate::models::Student;
use crate::stats::Statistics;
use crate::view::{Direction, Filter, SortField, ViewState};
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fmt::Write;

const SORTABLE: [(SortField, &str); 3] = [
    (SortField::Nombre, "Nombre"),
    (SortField::Apellidos, "Apellidos"),
    (SortField::Nota, "Nota"),
];

/// Full page with the table and statistics already rendered for `view`.
///
/// An `editing` id only survives when it names a stored record; the form is
/// then rendered in edit mode for it, otherwise the page starts in create mode.
pub fn render_index(students: &[Student], stats: &Statistics, view: &ViewState) -> String {
    let editing = view
        .editing
        .and_then(|id| students.iter().find(|student| student.id == id));
    let view = ViewState {
        editing: editing.map(|student| student.id),
        ..*view
    };

    fill_template(
        INDEX_HTML,
        &[
            ("FILTERS", render_filters(&view)),
            ("STATS", render_statistics(stats)),
            ("FORM", render_form(editing)),
            ("TABLE", render_students_table(&view.apply(students), &view)),
            ("STATE", initial_state(&view)),
        ],
    )
}

/// Substitutes `{{NAME}}` slots in one pass over `template`. Inserted values
/// are never scanned again, so user text that looks like a slot stays as is.
fn fill_template(template: &str, slots: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        let Some(len) = rest[start..].find("}}") else {
            break;
        };
        let end = start + len + 2;
        out.push_str(&rest[..start]);
        let name = &rest[start + 2..start + len];
        match slots.iter().find(|(slot, _)| *slot == name) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[start..end]),
        }
        rest = &rest[end..];
    }
    out.push_str(rest);
    out
}

fn render_form(editing: Option<&Student>) -> String {
    let value = |text: &str| encode_double_quoted_attribute(text).into_owned();
    let (nombre, apellidos, nota, asignatura) = match editing {
        Some(student) => (
            value(&student.nombre),
            value(&student.apellidos),
            student.nota.to_string(),
            value(&student.asignatura),
        ),
        None => Default::default(),
    };
    let (submit, cancel_class) = match editing {
        Some(_) => ("Actualizar", "boton-secundario"),
        None => ("Agregar", "boton-secundario oculto"),
    };

    format!(
        r#"      <label>Nombre <input id="nombre" name="nombre" value="{nombre}" required /></label>
      <label>Apellidos <input id="apellidos" name="apellidos" value="{apellidos}" required /></label>
      <label>Nota <input id="nota" name="nota" type="number" min="0" max="10" step="0.01" value="{nota}" required /></label>
      <label>Asignatura <input id="asignatura" name="asignatura" placeholder="General" value="{asignatura}" /></label>
      <button type="submit" class="boton-primario">{submit}</button>
      <button type="button" id="cancelar-edicion" class="{cancel_class}">Cancelar</button>"#
    )
}

/// Table markup for rows that have already been filtered and sorted.
pub fn render_students_table(rows: &[Student], view: &ViewState) -> String {
    if rows.is_empty() {
        return r#"<div class="estado-vacio">
  <div class="icono-estado-vacio">📚</div>
  <h3>No hay estudiantes todavía</h3>
  <p>Agrega el primer estudiante usando el formulario superior</p>
</div>"#
            .to_string();
    }

    let mut html = String::from("<table>\n  <thead>\n    <tr>\n");
    for (field, label) in SORTABLE {
        let next = view.toggled_sort(field);
        let arrow = match view.sort {
            Some(current) if current.field == field => match current.direction {
                Direction::Asc => "▲",
                Direction::Desc => "▼",
            },
            _ => "↕",
        };
        let _ = writeln!(
            html,
            r#"      <th class="ordenable" data-campo="{}" data-orden="{}">{label} {arrow}</th>"#,
            next.field.as_str(),
            next.direction.as_str(),
        );
    }
    html.push_str(
        "      <th>Asignatura</th>\n      <th>Fecha</th>\n      <th>Acciones</th>\n    </tr>\n  </thead>\n  <tbody>\n",
    );

    for student in rows {
        html.push_str(&render_student_row(student, view.editing == Some(student.id)));
    }
    html.push_str("  </tbody>\n</table>");
    html
}

fn render_student_row(student: &Student, editing: bool) -> String {
    let row_class = if editing { r#" class="editando""# } else { "" };
    format!(
        r#"    <tr{row_class} data-id="{id}">
      <td>{nombre}</td>
      <td>{apellidos}</td>
      <td><span class="insignia-nota {bucket}" title="{label}">{nota}</span></td>
      <td>{asignatura}</td>
      <td>{fecha}</td>
      <td>
        <div class="acciones">
          <button type="button" class="boton boton-editar" data-id="{id}">Editar</button>
          <button type="button" class="boton boton-eliminar" data-id="{id}">Eliminar</button>
        </div>
      </td>
    </tr>
"#,
        id = student.id,
        nombre = encode_text(&student.nombre),
        apellidos = encode_text(&student.apellidos),
        bucket = classify(student.nota).css_class(),
        label = classify(student.nota).label(),
        nota = student.nota,
        asignatura = encode_text(&student.asignatura),
        fecha = student.fecha,
    )
}

pub fn render_statistics(stats: &Statistics) -> String {
    let cards = [
        ("👥", stats.total.to_string(), "Total Estudiantes".to_string()),
        ("📈", format!("{:.2}", stats.average), "Nota Promedio".to_string()),
        (
            "✅",
            stats.pass_count.to_string(),
            format!("Aprobados ({:.1}%)", stats.pass_percentage),
        ),
        ("❌", stats.fail_count.to_string(), "Suspendidos".to_string()),
        ("🏆", stats.max_grade.to_string(), "Nota Máxima".to_string()),
        ("📉", stats.min_grade.to_string(), "Nota Mínima".to_string()),
    ];

    let mut html = String::new();
    for (icon, value, label) in cards {
        let _ = writeln!(
            html,
            r#"<div class="tarjeta-estadistica">
  <div class="icono-estadistica">{icon}</div>
  <div class="valor-estadistica">{value}</div>
  <div class="etiqueta-estadistica">{label}</div>
</div>"#
        );
    }
    html
}

fn render_filters(view: &ViewState) -> String {
    let mut html = String::new();
    for filter in Filter::ALL {
        let active = if filter == view.filter { " activo" } else { "" };
        let _ = writeln!(
            html,
            r#"<button type="button" class="boton-filtro{active}" data-filtro="{}">{}</button>"#,
            encode_double_quoted_attribute(filter.as_str()),
            filter.label(),
        );
    }
    html
}

fn initial_state(view: &ViewState) -> String {
    serde_json::json!({
        "filtro": view.filter.as_str(),
        "campo": view.sort.map(|order| order.field.as_str()),
        "orden": view.sort.map_or("asc", |order| order.direction.as_str()),
        "editando": view.editing,
    })
    .to_string()
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="es">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Gestión de Notas de Exámenes</title>
  <style>
    :root {
      --bg-1: #eef2f7;
      --bg-2: #c9d8ec;
      --ink: #1f2933;
      --accent: #3b6fb6;
      --accent-2: #2f4858;
      --card: rgba(255, 255, 255, 0.9);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #f7f9fc 100%);
      color: var(--ink);
      font-family: "Segoe UI", "Trebuchet MS", sans-serif;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(1040px, 100%);
      margin: 0 auto;
      background: var(--card);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 28px;
    }

    h1 {
      margin: 0;
      font-size: clamp(1.8rem, 4vw, 2.5rem);
    }

    .subtitulo {
      margin: 6px 0 0;
      color: #5f6b76;
    }

    .cuadricula-estadisticas {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(150px, 1fr));
      gap: 16px;
    }

    .tarjeta-estadistica {
      background: white;
      border-radius: 18px;
      padding: 18px;
      border: 1px solid rgba(47, 72, 88, 0.08);
      text-align: center;
    }

    .icono-estadistica {
      font-size: 1.6rem;
    }

    .valor-estadistica {
      font-size: 1.7rem;
      font-weight: 600;
      color: var(--accent-2);
    }

    .etiqueta-estadistica {
      font-size: 0.8rem;
      text-transform: uppercase;
      letter-spacing: 0.08em;
      color: #7b8794;
    }

    form {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(180px, 1fr));
      gap: 12px;
      align-items: end;
    }

    label {
      display: grid;
      gap: 6px;
      font-size: 0.85rem;
      color: #52606d;
    }

    input {
      padding: 10px 12px;
      border-radius: 12px;
      border: 1px solid #cbd2d9;
      font-size: 1rem;
    }

    button {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 10px 18px;
      font-size: 0.95rem;
      font-weight: 600;
      cursor: pointer;
    }

    .boton-primario {
      background: var(--accent);
      color: white;
    }

    .boton-secundario {
      background: #e4e7eb;
      color: var(--ink);
    }

    .oculto {
      display: none;
    }

    .filtros {
      display: flex;
      flex-wrap: wrap;
      gap: 8px;
    }

    .boton-filtro {
      background: rgba(47, 72, 88, 0.08);
      color: #52606d;
    }

    .boton-filtro.activo {
      background: var(--accent-2);
      color: white;
    }

    table {
      width: 100%;
      border-collapse: collapse;
    }

    th, td {
      padding: 10px 12px;
      text-align: left;
      border-bottom: 1px solid #e4e7eb;
    }

    th.ordenable {
      cursor: pointer;
      user-select: none;
    }

    tr.editando {
      background: #fff8e1;
    }

    .insignia-nota {
      display: inline-block;
      min-width: 42px;
      text-align: center;
      padding: 4px 10px;
      border-radius: 999px;
      font-weight: 600;
      color: white;
    }

    .nota-excelente { background: #2d7a4b; }
    .nota-notable { background: #3b6fb6; }
    .nota-aprobado { background: #d69e2e; }
    .nota-suspendido { background: #c63b2b; }

    .acciones {
      display: flex;
      gap: 6px;
    }

    .boton-editar {
      background: #e3ecf8;
      color: var(--accent);
    }

    .boton-eliminar {
      background: #fbe4e1;
      color: #c63b2b;
    }

    .estado-vacio {
      text-align: center;
      color: #7b8794;
      padding: 32px 0;
    }

    .icono-estado-vacio {
      font-size: 2.4rem;
    }

    @media (max-width: 600px) {
      .app {
        padding: 24px 16px;
      }
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>📊 Gestión de Notas</h1>
      <p class="subtitulo">Registra las notas de tus estudiantes y consulta las estadísticas del grupo.</p>
    </header>

    <section id="cuadricula-estadisticas" class="cuadricula-estadisticas">
{{STATS}}
    </section>

    <form id="formulario-estudiante">
{{FORM}}
    </form>

    <nav class="filtros">
{{FILTERS}}
    </nav>

    <section id="contenedor-estudiantes">
{{TABLE}}
    </section>
  </main>

  <script>
    const state = {{STATE}};

    const form = document.getElementById('formulario-estudiante');
    const submitButton = form.querySelector('.boton-primario');
    const cancelButton = document.getElementById('cancelar-edicion');
    const tableEl = document.getElementById('contenedor-estudiantes');
    const statsEl = document.getElementById('cuadricula-estadisticas');

    const query = () => {
      const params = new URLSearchParams({ filtro: state.filtro });
      if (state.campo) {
        params.set('campo', state.campo);
        params.set('orden', state.orden);
      }
      if (state.editando !== null) {
        params.set('editando', state.editando);
      }
      return params.toString();
    };

    const loadFragment = async (path, target) => {
      const res = await fetch(`${path}?${query()}`);
      if (!res.ok) {
        throw new Error(`Unable to load ${path}`);
      }
      target.innerHTML = await res.text();
    };

    const refresh = () =>
      Promise.all([
        loadFragment('/fragmentos/estudiantes', tableEl),
        loadFragment('/fragmentos/estadisticas', statsEl),
      ]).catch((err) => console.error('Error cargando datos:', err));

    const send = async (url, method, body) => {
      const res = await fetch(url, {
        method,
        headers: { 'content-type': 'application/json' },
        body: body === undefined ? undefined : JSON.stringify(body),
      });
      if (!res.ok) {
        let message = `Request failed (${res.status})`;
        try {
          message = (await res.json()).error || message;
        } catch (_) {}
        throw new Error(message);
      }
      return res.status === 204 ? null : res.json();
    };

    const leaveEditMode = () => {
      state.editando = null;
      ['nombre', 'apellidos', 'nota', 'asignatura'].forEach((name) => {
        form[name].value = '';
      });
      submitButton.textContent = 'Agregar';
      cancelButton.classList.add('oculto');
    };

    const startEditing = async (id) => {
      const res = await fetch('/api/estudiantes');
      if (!res.ok) {
        throw new Error('Unable to load students');
      }
      const student = (await res.json()).find((s) => s.id === id);
      if (!student) {
        return;
      }
      form.nombre.value = student.nombre;
      form.apellidos.value = student.apellidos;
      form.nota.value = student.nota;
      form.asignatura.value = student.asignatura;
      state.editando = id;
      submitButton.textContent = 'Actualizar';
      cancelButton.classList.remove('oculto');
      window.scrollTo({ top: 0, behavior: 'smooth' });
      refresh();
    };

    form.addEventListener('submit', (event) => {
      event.preventDefault();
      const body = {
        nombre: form.nombre.value,
        apellidos: form.apellidos.value,
        nota: form.nota.value,
        asignatura: form.asignatura.value,
      };
      const request = state.editando !== null
        ? send(`/api/estudiantes/${state.editando}`, 'PUT', body)
        : send('/api/estudiantes', 'POST', body);

      request
        .then(() => {
          leaveEditMode();
          refresh();
        })
        .catch((err) => {
          console.error('Error guardando estudiante:', err);
          alert(err.message);
        });
    });

    cancelButton.addEventListener('click', () => {
      leaveEditMode();
      refresh();
    });

    document.querySelectorAll('.boton-filtro').forEach((button) => {
      button.addEventListener('click', () => {
        document.querySelectorAll('.boton-filtro').forEach((b) => b.classList.remove('activo'));
        button.classList.add('activo');
        state.filtro = button.dataset.filtro;
        refresh();
      });
    });

    tableEl.addEventListener('click', (event) => {
      const header = event.target.closest('th[data-campo]');
      if (header) {
        state.campo = header.dataset.campo;
        state.orden = header.dataset.orden;
        refresh();
        return;
      }

      const edit = event.target.closest('.boton-editar');
      if (edit) {
        startEditing(Number(edit.dataset.id)).catch((err) =>
          console.error('Error editando estudiante:', err)
        );
        return;
      }

      const remove = event.target.closest('.boton-eliminar');
      if (remove && confirm('¿Estás seguro de que deseas eliminar este estudiante?')) {
        const id = Number(remove.dataset.id);
        send(`/api/estudiantes/${id}`, 'DELETE')
          .then(() => {
            if (state.editando === id) {
              leaveEditMode();
            }
            refresh();
          })
          .catch((err) => {
            console.error('Error eliminando estudiante:', err);
            alert(err.message);
          });
      }
    });
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::aggregate;
    use crate::view::SortOrder;
    use chrono::NaiveDate;

    fn student(id: i64, nombre: &str, nota: f64) -> Student {
        Student {
            id,
            nombre: nombre.into(),
            apellidos: "Ruiz".into(),
            nota,
            asignatura: "General".into(),
            fecha: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
        }
    }

    #[test]
    fn empty_table_shows_placeholder() {
        let html = render_students_table(&[], &ViewState::default());
        assert!(html.contains("estado-vacio"));
        assert!(!html.contains("<table>"));
    }

    #[test]
    fn rows_carry_bucket_class_and_actions() {
        let rows = [student(11, "Ana", 9.5), student(12, "Luis", 3.0)];
        let html = render_students_table(&rows, &ViewState::default());

        assert!(html.contains(r#"<span class="insignia-nota nota-excelente" title="Sobresaliente">9.5</span>"#));
        assert!(html.contains(r#"<span class="insignia-nota nota-suspendido" title="Suspenso">3</span>"#));
        assert!(html.contains(r#"class="boton boton-editar" data-id="11""#));
        assert!(html.contains(r#"class="boton boton-eliminar" data-id="12""#));
        assert!(html.contains("<td>2026-10-19</td>"));
    }

    #[test]
    fn user_text_is_escaped() {
        let rows = [student(1, "<script>alert(1)</script>", 6.0)];
        let html = render_students_table(&rows, &ViewState::default());
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn headers_advertise_the_next_sort() {
        let view = ViewState {
            sort: Some(SortOrder {
                field: SortField::Nota,
                direction: Direction::Asc,
            }),
            ..ViewState::default()
        };
        let html = render_students_table(&[student(1, "Ana", 6.0)], &view);
        assert!(html.contains(r#"data-campo="nota" data-orden="desc">Nota ▲</th>"#));
        assert!(html.contains(r#"data-campo="nombre" data-orden="asc">Nombre ↕</th>"#));
    }

    #[test]
    fn editing_row_is_highlighted() {
        let view = ViewState {
            editing: Some(2),
            ..ViewState::default()
        };
        let html = render_students_table(&[student(1, "Ana", 6.0), student(2, "Eva", 7.0)], &view);
        assert!(html.contains(r#"<tr class="editando" data-id="2">"#));
        assert!(html.contains(r#"<tr data-id="1">"#));
    }

    #[test]
    fn statistics_use_fixed_decimals() {
        let stats = aggregate(&[student(1, "Ana", 8.0)]);
        let html = render_statistics(&stats);
        assert!(html.contains(r#"<div class="valor-estadistica">8.00</div>"#));
        assert!(html.contains("Aprobados (100.0%)"));
        assert_eq!(html.matches("tarjeta-estadistica").count(), 6);

        let empty = render_statistics(&aggregate(&[]));
        assert!(empty.contains(r#"<div class="valor-estadistica">0.00</div>"#));
        assert!(empty.contains("Aprobados (0.0%)"));
    }

    #[test]
    fn index_applies_view_and_embeds_state() {
        let students = [student(1, "Ana", 9.5), student(2, "Luis", 3.0)];
        let view = ViewState {
            filter: Filter::Fail,
            ..ViewState::default()
        };
        let html = render_index(&students, &aggregate(&students), &view);

        assert!(html.contains("Luis"));
        assert!(!html.contains(">Ana<"));
        assert!(html.contains(r#"class="boton-filtro activo" data-filtro="fail""#));
        assert!(html.contains(r#""filtro":"fail""#));
        assert!(html.contains(r#""editando":null"#));
        assert!(!html.contains("{{"));
    }
    #[test]
    fn slot_like_names_render_the_same_on_page_and_fragment() {
        let students = [student(1, "{{STATE}}", 6.0), student(2, "{{TABLE}}", 3.0)];
        let view = ViewState::default();
        let page = render_index(&students, &aggregate(&students), &view);
        let fragment = render_students_table(&view.apply(&students), &view);

        assert!(fragment.contains("<td>{{STATE}}</td>"));
        assert!(page.contains("<td>{{STATE}}</td>"));
        assert!(page.contains("<td>{{TABLE}}</td>"));
        assert!(page.contains(&fragment));
    }

    #[test]
    fn unknown_editing_id_starts_in_create_mode() {
        let students = [student(1, "Ana", 6.0)];
        let view = ViewState {
            editing: Some(42),
            ..ViewState::default()
        };
        let html = render_index(&students, &aggregate(&students), &view);

        assert!(html.contains(r#""editando":null"#));
        assert!(html.contains(r#"<button type="submit" class="boton-primario">Agregar</button>"#));
        assert!(html.contains(r#"class="boton-secundario oculto">Cancelar</button>"#));
        assert!(html.contains(r#"name="nombre" value="""#));
        assert!(!html.contains(r#"class="editando""#));
    }

    #[test]
    fn known_editing_id_renders_the_form_in_edit_mode() {
        let mut editing = student(7, "Ana \"la\" Grande", 7.5);
        editing.asignatura = "Física".into();
        let students = [student(1, "Luis", 4.0), editing];
        let view = ViewState {
            editing: Some(7),
            ..ViewState::default()
        };
        let html = render_index(&students, &aggregate(&students), &view);

        assert!(html.contains(r#""editando":7"#));
        assert!(html.contains(r#"<button type="submit" class="boton-primario">Actualizar</button>"#));
        assert!(html.contains(r#"<button type="button" id="cancelar-edicion" class="boton-secundario">Cancelar</button>"#));
        assert!(html.contains(r#"name="nombre" value="Ana &quot;la&quot; Grande""#));
        assert!(html.contains(r#"value="7.5""#));
        assert!(html.contains(r#"value="Física""#));
        assert!(html.contains(r#"<tr class="editando" data-id="7">"#));
    }
}
