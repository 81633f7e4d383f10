use rust_xlsxwriter::{Format, Workbook};

/// Nombre de la hoja con la agenda; la primera hoja es una portada.
pub const AGENDA_SHEET: &str = "Agenda";

/// Workbook real con portada + agenda de marzo 2026.
///
/// La fila del 02/03 lleva la fecha como número de serie con formato de
/// fecha (46083); la del 03/03 como texto y con una celda mal formada en la
/// columna Tarde.
pub fn agenda_workbook_bytes() -> Vec<u8> {
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("dd/mm/yyyy");

    let cover = workbook.add_worksheet();
    cover.set_name("Capa").expect("sheet name");
    cover.write_string(0, 0, "AGENDA DE LABORATÓRIOS").expect("write");

    let agenda = workbook.add_worksheet();
    agenda.set_name(AGENDA_SHEET).expect("sheet name");
    agenda.write_string(0, 0, "Março/2026").expect("write");
    for (col, label) in ["Data", "Dia", "Tarde", "Noite"].iter().enumerate() {
        agenda.write_string(1, col as u16, *label).expect("write");
    }
    agenda.write_number_with_format(2, 0, 46083.0, &date_format).expect("write");
    agenda.write_string(2, 1, "Segunda").expect("write");
    agenda.write_string(2, 2, "TI 27 - UC12 - LAB43").expect("write");
    agenda.write_string(2, 3, "TI 28 - UC13 - LAB44").expect("write");
    agenda.write_string(3, 0, "03/03").expect("write");
    agenda.write_string(3, 1, "Terça").expect("write");
    agenda.write_string(3, 2, "TI 27 UC12").expect("write");

    workbook.save_to_buffer().expect("xlsx buffer")
}
