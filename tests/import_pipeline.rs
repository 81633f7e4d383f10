mod common;

use std::io::Write;

use calendario::db::catalog::{list_courses, list_turmas, list_ucs};
use calendario::db::lessons::{get_lesson, list_lessons};
use calendario::db::DbPool;
use calendario::error::AppError;
use calendario::excel::{ParseContext, ValidSlot};
use calendario::import::{
    resolve_entities, run_import, run_import_rows, upsert_lesson, IMPORT_CREATED_DESCRIPTION,
    IMPORT_UPDATED_DESCRIPTION,
};
use calendario::models::{LessonFilter, Period, UpsertAction};
use tempfile::TempDir;

fn open_pool() -> (TempDir, DbPool) {
    let dir = tempfile::tempdir().expect("tempdir");
    let pool = DbPool::open(dir.path().join("calendario.db"), 2, 5_000).expect("open pool");
    (dir, pool)
}

fn row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|c| c.to_string()).collect()
}

fn slot(date: &str, period: Period, turma: &str, uc: &str, lab: &str) -> ValidSlot {
    ValidSlot {
        row: 1,
        col: 2,
        date: date.to_string(),
        period,
        turma: turma.to_string(),
        uc: uc.to_string(),
        lab: lab.to_string(),
        course_prefix: "TI".to_string(),
    }
}

#[test]
fn test_resolver_reuses_entities_across_spellings() {
    let (_dir, pool) = open_pool();
    let conn = pool.get().expect("conn");

    let a = resolve_entities(&conn, "TI", "TI - 27", "uc12").expect("primera resolución");
    let b = resolve_entities(&conn, "ti", "  ti-27 ", "UC12").expect("segunda resolución");
    let c = resolve_entities(&conn, "TI", "TI-27", " uc 12").expect("tercera resolución");

    assert_eq!(a, b);
    assert_eq!(a.course_id, c.course_id);
    assert_eq!(a.turma_id, c.turma_id);
    assert_eq!(a.uc.id, c.uc.id);
    assert_eq!(a.turma, "TI-27");
    assert_eq!(a.uc.name, "UC12");

    let courses = list_courses(&conn).expect("courses");
    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0].acronym, "TI");
    assert_eq!(courses[0].name, "Técnico em Informática");
    assert_eq!(list_turmas(&conn, None).expect("turmas").len(), 1);

    let ucs = list_ucs(&conn, Some(a.course_id)).expect("ucs");
    assert_eq!(ucs.len(), 1);
    assert_eq!(ucs[0].hours, 0);
}

#[test]
fn test_resolver_matches_legacy_unnormalized_class() {
    let (_dir, pool) = open_pool();
    let conn = pool.get().expect("conn");
    conn.execute("INSERT INTO courses (name, acronym) VALUES ('Técnico em Informática', 'TI')", [])
        .expect("curso");
    // fila histórica sin normalizar
    conn.execute("INSERT INTO turmas (name, course_id) VALUES ('ti 27', 1)", []).expect("turma");

    let r = resolve_entities(&conn, "TI", "TI27", "UC12").expect("resolve");
    assert_eq!(r.turma_id, 1);
    assert_eq!(list_turmas(&conn, None).expect("turmas").len(), 1);
}

#[test]
fn test_unknown_prefix_creates_placeholder_course() {
    let (_dir, pool) = open_pool();
    let conn = pool.get().expect("conn");
    resolve_entities(&conn, "QUI", "QUI1", "UC01").expect("resolve");
    let courses = list_courses(&conn).expect("courses");
    assert_eq!(courses[0].name, "Curso Importado (QUI)");
    assert_eq!(courses[0].acronym, "QUI");
}

#[test]
fn test_upsert_creates_then_updates_same_slot() {
    let (_dir, pool) = open_pool();
    let conn = pool.get().expect("conn");

    let first = slot("2026-03-02", Period::Tarde, "TI27", "UC12", "LAB43");
    let resolved = resolve_entities(&conn, "TI", &first.turma, &first.uc).expect("resolve");
    let created = upsert_lesson(&conn, &first, &resolved).expect("insert");
    assert_eq!(created.action, UpsertAction::Created);
    assert_eq!(get_lesson(&conn, created.lesson_id).expect("get").description, IMPORT_CREATED_DESCRIPTION);

    let second = slot("2026-03-02", Period::Tarde, "ti 27", "UC13", "LAB50");
    let resolved = resolve_entities(&conn, "TI", &second.turma, &second.uc).expect("resolve");
    let updated = upsert_lesson(&conn, &second, &resolved).expect("update");
    assert_eq!(updated.action, UpsertAction::Updated);
    assert_eq!(updated.lesson_id, created.lesson_id);

    let lesson = get_lesson(&conn, updated.lesson_id).expect("get");
    assert_eq!(lesson.uc_name, "UC13");
    assert_eq!(lesson.lab, "LAB50");
    assert_eq!(lesson.turma, "TI27");
    assert_eq!(lesson.description, IMPORT_UPDATED_DESCRIPTION);

    // otro periodo es otro slot
    let night = slot("2026-03-02", Period::Noite, "TI27", "UC12", "LAB43");
    let resolved = resolve_entities(&conn, "TI", &night.turma, &night.uc).expect("resolve");
    assert_eq!(upsert_lesson(&conn, &night, &resolved).expect("insert").action, UpsertAction::Created);
}

#[test]
fn test_partial_failure_does_not_abort_batch() {
    let (_dir, pool) = open_pool();
    let rows = vec![
        row(&["Março/2026"]),
        row(&["Data", "Dia", "Tarde", "Noite"]),
        row(&["02/03", "Segunda", "TI 27 - UC12 - LAB43", "TI 28 - UC13 - LAB44"]),
        row(&["03/03", "Terça", "TI 27 - UC12 - LAB43", "TI 28 UC13 LAB44"]),
        row(&["04/03", "Quarta", "ADM 3 - UC01 - LAB10", "ADM 4 - UC02 - LAB11"]),
    ];
    let report = run_import_rows(&pool, &rows, &ParseContext::for_year(2026));

    assert_eq!(report.stats.total_lines, 3);
    assert_eq!(report.stats.processed, 6);
    assert_eq!(report.stats.created, 5);
    assert_eq!(report.stats.updated, 0);
    assert_eq!(report.stats.errors, 1);
    assert_eq!(report.lessons.len(), 5);
    assert_eq!(report.details.len(), 1);
    assert_eq!(report.details[0].row, 4);
    assert_eq!(report.details[0].col, Some(3));
    assert!(report.lessons.iter().all(|l| l.status == "created"));
    assert_eq!(report.message, "Importação concluída: 5 criadas, 0 atualizadas, 1 erros");

    let conn = pool.get().expect("conn");
    assert_eq!(list_lessons(&conn, &LessonFilter::default()).expect("lessons").len(), 5);
    assert_eq!(list_courses(&conn).expect("courses").len(), 2);
}

#[test]
fn test_reimport_is_idempotent() {
    let (_dir, pool) = open_pool();
    let rows = vec![
        row(&["Março/2026"]),
        row(&["02/03", "Segunda", "TI 27 - UC12 - LAB43", "TI 28 - UC13 - LAB44"]),
    ];
    let ctx = ParseContext::for_year(2026);

    let first = run_import_rows(&pool, &rows, &ctx);
    assert_eq!(first.stats.created, 2);
    assert_eq!(first.stats.updated, 0);

    let second = run_import_rows(&pool, &rows, &ctx);
    assert_eq!(second.stats.created, 0);
    assert_eq!(second.stats.updated, 2);
    assert_eq!(second.stats.errors, 0);
    assert_eq!(
        first.lessons.iter().map(|l| l.id).collect::<Vec<_>>(),
        second.lessons.iter().map(|l| l.id).collect::<Vec<_>>()
    );

    let conn = pool.get().expect("conn");
    assert_eq!(list_lessons(&conn, &LessonFilter::default()).expect("lessons").len(), 2);
    assert_eq!(list_turmas(&conn, None).expect("turmas").len(), 2);
}

#[test]
fn test_garbage_xlsx_is_structural_failure() {
    let (dir, pool) = open_pool();
    let path = dir.path().join("agenda.xlsx");
    let mut f = std::fs::File::create(&path).expect("create");
    f.write_all(b"esto no es un zip").expect("write");
    drop(f);

    match run_import(&pool, &path, &ParseContext::for_year(2026)) {
        Err(e @ AppError::Spreadsheet(_)) => assert_eq!(e.status_code().as_u16(), 400),
        other => panic!("se esperaba error de planilla, vino {:?}", other),
    }
}

#[test]
fn test_missing_file_and_wrong_extension() {
    let (dir, pool) = open_pool();
    let ctx = ParseContext::for_year(2026);

    assert!(run_import(&pool, dir.path().join("no-existe.xlsx"), &ctx).is_err());

    let csv = dir.path().join("agenda.csv");
    std::fs::write(&csv, "02/03;Segunda;TI 27 - UC12 - LAB43").expect("write");
    assert!(matches!(run_import(&pool, &csv, &ctx), Err(AppError::UnsupportedFile(_))));
}

#[test]
fn test_failed_slot_leaves_no_partial_entities() {
    let (_dir, pool) = open_pool();
    pool.get()
        .expect("conn")
        .execute_batch(
            "CREATE TRIGGER lessons_reject BEFORE INSERT ON lessons
             BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
        )
        .expect("trigger");

    let rows = vec![row(&["02/03/2026", "Segunda", "TI 27 - UC12 - LAB43", ""])];
    let report = run_import_rows(&pool, &rows, &ParseContext::for_year(2026));

    assert_eq!(report.stats.processed, 1);
    assert_eq!(report.stats.created, 0);
    assert_eq!(report.stats.errors, 1);
    assert_eq!(report.details[0].col, Some(2));
    assert!(report.details[0].error.contains("could not save lesson"));

    // curso, turma y UC creados por el resolver se deshacen con el slot
    let conn = pool.get().expect("conn");
    assert!(list_courses(&conn).expect("courses").is_empty());
    assert!(list_turmas(&conn, None).expect("turmas").is_empty());
    assert!(list_ucs(&conn, None).expect("ucs").is_empty());
}

#[test]
fn test_real_workbook_import_and_rerun() {
    let (dir, pool) = open_pool();
    let path = dir.path().join("agenda.xlsx");
    std::fs::write(&path, common::agenda_workbook_bytes()).expect("write xlsx");
    let ctx = ParseContext { default_year: 2020, sheet: Some(common::AGENDA_SHEET.to_string()) };

    let first = run_import(&pool, &path, &ctx).expect("import");
    assert_eq!(first.stats.total_lines, 2);
    assert_eq!(first.stats.processed, 3);
    assert_eq!(first.stats.created, 2);
    assert_eq!(first.stats.errors, 1);

    // la fecha nativa de Excel (serie 46083) llega como 2026-03-02
    assert_eq!(first.lessons[0].date, "2026-03-02");
    assert_eq!(first.lessons[0].period, Period::Tarde);
    assert_eq!(first.lessons[0].turma, "TI27");
    assert_eq!(first.lessons[1].period, Period::Noite);
    assert_eq!(first.lessons[1].lab, "LAB44");
    assert_eq!(first.details[0].row, 4);
    assert_eq!(first.details[0].col, Some(2));

    let second = run_import(&pool, &path, &ctx).expect("reimport");
    assert_eq!(second.stats.created, 0);
    assert_eq!(second.stats.updated, 2);
    assert_eq!(second.stats.errors, 1);
}

#[test]
fn test_first_sheet_is_used_when_none_is_configured() {
    let (dir, pool) = open_pool();
    let path = dir.path().join("agenda.xlsx");
    std::fs::write(&path, common::agenda_workbook_bytes()).expect("write xlsx");

    // la portada no tiene filas de datos
    let report = run_import(&pool, &path, &ParseContext::for_year(2026)).expect("import");
    assert_eq!(report.stats.total_lines, 0);
    assert_eq!(report.stats.processed, 0);

    let ctx = ParseContext { default_year: 2026, sheet: Some("NoExiste".to_string()) };
    let report = run_import(&pool, &path, &ctx).expect("import");
    assert_eq!(report.stats.processed, 0);
}
