use chrono::{DateTime, NaiveDate, Utc};

use super::{
    DocumentResult,
    canvas::{CM, Font, Page, Rgb, render},
};

pub const DEFAULT_ROWS: usize = 25;
pub const MAX_ROWS: usize = 200;

const INK: Rgb = Rgb::hex(0x1a1a2e);
const SLATE: Rgb = Rgb::hex(0x2d3748);
const MUTED: Rgb = Rgb::hex(0x718096);
const GRID: Rgb = Rgb::hex(0xa0aec0);
const STRIPE: Rgb = Rgb::hex(0xf7fafc);

const MARGIN: f32 = 1.5 * CM;
const ROW_HEIGHT: f32 = 22.0;
const HEADER_HEIGHT: f32 = 20.0;
const FOOTER_SPACE: f32 = 2.2 * CM;

/// Header data of an attendance sheet.
#[derive(Debug, Clone)]
pub struct PlanillaDocument<'a> {
    pub module_title: &'a str,
    pub professional_name: &'a str,
    pub profession: Option<&'a str>,
    pub license_number: Option<&'a str>,
    pub session_date: NaiveDate,
    pub rows: usize,
    pub generated_at: DateTime<Utc>,
}

fn or_unspecified(value: Option<&str>) -> &str {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("No especificada")
}

/// Portrait A4 attendance sheet with numbered blank rows.
/// The participants table continues on extra pages when needed.
pub fn planilla_pdf(data: &PlanillaDocument<'_>) -> DocumentResult<Vec<u8>> {
    let rows = data.rows.clamp(1, MAX_ROWS);
    let mut pages = Vec::new();

    let mut page = Page::a4_portrait();
    let mut y = page.height() - MARGIN - 16.0;

    page.text_centered(y, Font::Bold, 16.0, INK, "PLANILLA DE CAPACITACIÓN PRESENCIAL");
    y -= 18.0;
    page.text_centered(y, Font::Regular, 11.0, SLATE, "REGISTRO DE ASISTENCIA");
    y -= 0.9 * CM;

    let date = data.session_date.format("%d/%m/%Y").to_string();
    let info = [
        ("Capacitación:", data.module_title),
        ("Responsable:", data.professional_name),
        ("Profesión:", or_unspecified(data.profession)),
        ("Matrícula:", or_unspecified(data.license_number)),
        ("Fecha:", date.as_str()),
        ("Lugar:", "________________________________________"),
    ];
    for (label, value) in info {
        page.text(MARGIN, y, Font::Bold, 10.0, SLATE, label);
        page.text(MARGIN + 3.5 * CM, y, Font::Regular, 10.0, SLATE, value);
        y -= 16.0;
    }
    y -= 0.6 * CM;

    let mut next = 1;
    while next <= rows {
        let capacity = (((y - HEADER_HEIGHT - FOOTER_SPACE - MARGIN) / ROW_HEIGHT).floor() as usize).max(1);
        let last = (next + capacity - 1).min(rows);

        draw_table(&mut page, y, next, last);
        next = last + 1;

        pages.push(page);
        page = Page::a4_portrait();
        y = page.height() - MARGIN;
    }

    let total = pages.len();
    let generated = format!("Generado el {}", data.generated_at.format("%d/%m/%Y %H:%M"));
    for (index, page) in pages.iter_mut().enumerate() {
        let base = MARGIN + 0.6 * CM;
        page.text_centered(
            base,
            Font::Oblique,
            8.0,
            MUTED,
            "Documento generado por ErgoSolutions - www.ergosolutions.com.ar",
        );
        page.text_centered(base - 11.0, Font::Oblique, 8.0, MUTED, &generated);
        if total > 1 {
            page.text_centered(
                base - 22.0,
                Font::Oblique,
                8.0,
                MUTED,
                &format!("Página {} de {}", index + 1, total),
            );
        }
    }

    render(pages, "Planilla de capacitación presencial")
}

fn draw_table(page: &mut Page, top: f32, first: usize, last: usize) {
    let table_width = page.width() - 2.0 * MARGIN;
    let widths = [1.0 * CM, 6.5 * CM, 3.0 * CM, table_width - 10.5 * CM];
    let headers = ["N°", "Nombre y Apellido", "DNI", "Firma"];

    page.fill_rect(MARGIN, top - HEADER_HEIGHT, table_width, HEADER_HEIGHT, SLATE);
    let mut x = MARGIN;
    for (header, width) in headers.iter().zip(widths) {
        page.text_in(x, width, top - HEADER_HEIGHT + 6.5, Font::Bold, 9.0, Rgb::WHITE, header);
        x += width;
    }

    let mut y = top - HEADER_HEIGHT;
    for number in first..=last {
        let row_bottom = y - ROW_HEIGHT;
        if number % 2 == 0 {
            page.fill_rect(MARGIN, row_bottom, table_width, ROW_HEIGHT, STRIPE);
        }
        page.text_in(MARGIN, widths[0], row_bottom + 7.5, Font::Regular, 9.0, SLATE, &number.to_string());
        y = row_bottom;
    }

    let bottom = y;
    page.stroke_rect(MARGIN, bottom, table_width, top - bottom, 0.5, GRID);

    let mut row_line = top - HEADER_HEIGHT;
    while row_line > bottom + 0.5 {
        page.line((MARGIN, row_line), (MARGIN + table_width, row_line), 0.5, GRID);
        row_line -= ROW_HEIGHT;
    }

    let mut x = MARGIN;
    for width in &widths[..widths.len() - 1] {
        x += width;
        page.line((x, top), (x, bottom), 0.5, GRID);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn sheet(rows: usize) -> Vec<u8> {
        planilla_pdf(&PlanillaDocument {
            module_title: "Ruido",
            professional_name: "Laura Díaz",
            profession: Some("Lic. en Higiene y Seguridad"),
            license_number: None,
            session_date: NaiveDate::from_ymd_opt(2025, 4, 10).unwrap(),
            rows,
            generated_at: Utc::now(),
        })
        .unwrap()
    }

    #[test]
    fn renders_default_sheet() {
        let bytes = sheet(DEFAULT_ROWS);
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn long_sheets_span_pages() {
        let doc = lopdf::Document::load_mem(&sheet(80)).unwrap();
        assert!(doc.get_pages().len() >= 2);
    }

    #[test]
    fn unspecified_fields() {
        assert_eq!(or_unspecified(None), "No especificada");
        assert_eq!(or_unspecified(Some("  ")), "No especificada");
        assert_eq!(or_unspecified(Some("MN 123")), "MN 123");
    }
}
