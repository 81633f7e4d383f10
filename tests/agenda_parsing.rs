use calendario::excel::{parse_agenda_rows, ParseContext, SlotResult};
use calendario::models::Period;

fn row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|c| c.to_string()).collect()
}

fn valid(slots: &[SlotResult]) -> Vec<&calendario::excel::ValidSlot> {
    slots
        .iter()
        .filter_map(|s| match s {
            SlotResult::Valid(v) => Some(v),
            SlotResult::Error(_) => None,
        })
        .collect()
}

#[test]
fn test_month_header_then_two_periods() {
    let rows = vec![
        row(&["Março/2026"]),
        row(&["02/03", "Segunda", "TI 27 - UC12 - LAB43", "TI 28 - UC13 - LAB44"]),
    ];
    let parsed = parse_agenda_rows(&rows, &ParseContext::for_year(2020));
    assert_eq!(parsed.total_rows, 1);
    assert_eq!(parsed.slots.len(), 2);

    let v = valid(&parsed.slots);
    assert_eq!(v.len(), 2);
    assert_eq!(v[0].date, "2026-03-02");
    assert_eq!(v[0].period, Period::Tarde);
    assert_eq!(v[0].turma, "TI27");
    assert_eq!(v[0].uc, "UC12");
    assert_eq!(v[0].lab, "LAB43");
    assert_eq!(v[0].course_prefix, "TI");

    assert_eq!(v[1].date, "2026-03-02");
    assert_eq!(v[1].period, Period::Noite);
    assert_eq!(v[1].turma, "TI28");
    assert_eq!(v[1].uc, "UC13");
    assert_eq!(v[1].lab, "LAB44");
}

#[test]
fn test_full_date_in_cell_wins_over_header() {
    let rows = vec![
        row(&["Março/2026"]),
        row(&["02/03/2026", "Segunda", "TI 27 - UC12 - LAB43", ""]),
    ];
    let parsed = parse_agenda_rows(&rows, &ParseContext::for_year(1999));
    let v = valid(&parsed.slots);
    assert_eq!(v.len(), 1);
    assert_eq!(v[0].date, "2026-03-02");
}

#[test]
fn test_malformed_cell_is_an_error_slot() {
    let rows = vec![row(&["03/03/2026", "Terça", "TI 27 UC12", "TI 27 - UC12 - LAB43"])];
    let parsed = parse_agenda_rows(&rows, &ParseContext::for_year(2026));
    assert_eq!(parsed.slots.len(), 2);
    match &parsed.slots[0] {
        SlotResult::Error(e) => {
            assert_eq!(e.row, 1);
            assert_eq!(e.col, Some(2));
            assert_eq!(e.raw, "TI 27 UC12");
        }
        other => panic!("se esperaba error, vino {:?}", other),
    }
    assert!(parsed.slots[1].is_valid());
}

#[test]
fn test_extra_hyphens_stay_in_class_label() {
    let rows = vec![row(&["04/03/2026", "", "TI - 27 - UC12 - LAB43", ""])];
    let parsed = parse_agenda_rows(&rows, &ParseContext::for_year(2026));
    let v = valid(&parsed.slots);
    assert_eq!(v.len(), 1);
    assert_eq!(v[0].turma, "TI-27");
    assert_eq!(v[0].uc, "UC12");
    assert_eq!(v[0].lab, "LAB43");
}

#[test]
fn test_invalid_date_with_content_reports_error() {
    let rows = vec![row(&["31/02/2026", "", "TI 27 - UC12 - LAB43", ""])];
    let parsed = parse_agenda_rows(&rows, &ParseContext::for_year(2026));
    assert_eq!(parsed.total_rows, 1);
    assert_eq!(parsed.slots.len(), 1);
    assert!(!parsed.slots[0].is_valid());
}

#[test]
fn test_titles_and_blank_rows_are_skipped() {
    let rows = vec![
        row(&["AGENDA DE LABORATÓRIOS"]),
        row(&["", "", "", ""]),
        row(&["Abril/2026"]),
        row(&["Data", "Dia", "Tarde", "Noite"]),
        row(&["01/04", "Quarta", "", "ADM 3 - UC01 - LAB10"]),
    ];
    let parsed = parse_agenda_rows(&rows, &ParseContext::for_year(2026));
    assert_eq!(parsed.total_rows, 1);
    let v = valid(&parsed.slots);
    assert_eq!(v.len(), 1);
    assert_eq!(v[0].date, "2026-04-01");
    assert_eq!(v[0].period, Period::Noite);
    assert_eq!(v[0].turma, "ADM3");
    assert_eq!(v[0].row, 5);
}

#[test]
fn test_period_header_remaps_columns() {
    let rows = vec![
        row(&["Data", "Manhã", "Tarde", "Noite"]),
        row(&["05/03/2026", "TI 27 - UC12 - LAB43", "", "TI 28 - UC13 - LAB44"]),
    ];
    let parsed = parse_agenda_rows(&rows, &ParseContext::for_year(2026));
    let v = valid(&parsed.slots);
    assert_eq!(v.len(), 2);
    assert_eq!(v[0].period, Period::Manha);
    assert_eq!(v[0].col, 1);
    assert_eq!(v[1].period, Period::Noite);
}
