use chrono::NaiveDate;

use super::{
    DocumentResult,
    canvas::{CM, Font, Page, Rgb, render},
};

const NAVY: Rgb = Rgb::hex(0x1a365d);
const SLATE: Rgb = Rgb::hex(0x2d3748);
const GREY: Rgb = Rgb::hex(0x4a5568);
const MUTED: Rgb = Rgb::hex(0x718096);
const BLUE: Rgb = Rgb::hex(0x2b6cb0);

/// Everything printed on a training certificate.
#[derive(Debug, Clone)]
pub struct CertificateDocument<'a> {
    pub holder_name: &'a str,
    pub cuil: Option<&'a str>,
    pub module_title: &'a str,
    pub issued_on: NaiveDate,
    pub valid_until: NaiveDate,
    pub signer_name: &'a str,
    pub signer_titles: &'a [String],
}

/// Landscape A4 certificate.
pub fn certificate_pdf(data: &CertificateDocument<'_>) -> DocumentResult<Vec<u8>> {
    let mut page = Page::a4_landscape();
    let (width, height) = (page.width(), page.height());

    page.stroke_rect(CM, CM, width - 2.0 * CM, height - 2.0 * CM, 2.0, NAVY);
    page.stroke_rect(1.3 * CM, 1.3 * CM, width - 2.6 * CM, height - 2.6 * CM, 0.5, BLUE);

    let mut y = height - 3.2 * CM;
    page.text_centered(y, Font::Bold, 24.0, NAVY, "CERTIFICADO DE CAPACITACIÓN");
    y -= 26.0;
    page.text_centered(y, Font::Regular, 14.0, SLATE, "ERGONOMÍA Y PREVENCIÓN DE RIESGOS LABORALES");

    y -= 1.6 * CM;
    page.text_centered(y, Font::Regular, 12.0, GREY, "Se certifica que");
    y -= 0.9 * CM;
    page.text_centered(y, Font::Bold, 20.0, NAVY, &data.holder_name.to_uppercase());
    if let Some(cuil) = data.cuil {
        y -= 0.75 * CM;
        page.text_centered(y, Font::Regular, 12.0, GREY, &format!("CUIL: {cuil}"));
    }

    y -= 1.0 * CM;
    page.text_centered(
        y,
        Font::Regular,
        12.0,
        GREY,
        "ha completado satisfactoriamente la capacitación en",
    );
    y -= 0.8 * CM;
    page.text_centered(y, Font::BoldOblique, 16.0, BLUE, &format!("\"{}\"", data.module_title));

    y -= 1.2 * CM;
    let label_right = width / 2.0 - 0.2 * CM;
    let value_left = width / 2.0 + 0.2 * CM;
    for (label, value) in [
        ("Fecha de emisión:", data.issued_on),
        ("Válido hasta:", data.valid_until),
    ] {
        let label_width = super::canvas::text_width(label, Font::Regular, 11.0);
        page.text(label_right - label_width, y, Font::Regular, 11.0, SLATE, label);
        page.text(value_left, y, Font::Regular, 11.0, SLATE, &value.format("%d/%m/%Y").to_string());
        y -= 18.0;
    }

    y -= 0.9 * CM;
    if !data.signer_name.trim().is_empty() {
        page.text_centered(y, Font::Bold, 12.0, SLATE, data.signer_name.trim());
    }
    for title in data.signer_titles {
        y -= 14.0;
        page.text_centered(y, Font::Regular, 10.0, GREY, title);
    }
    y -= 12.0;
    let half = 5.5 * CM;
    page.line((width / 2.0 - half, y), (width / 2.0 + half, y), 0.7, GREY);
    y -= 13.0;
    page.text_centered(y, Font::Regular, 10.0, MUTED, "Responsable de Capacitación");

    page.text_centered(
        2.2 * CM,
        Font::Oblique,
        9.0,
        MUTED,
        "Este certificado tiene una validez de 1 (un) año desde la fecha de emisión.",
    );
    page.text_centered(
        2.2 * CM - 12.0,
        Font::Oblique,
        9.0,
        MUTED,
        "Emitido por el Sistema de Capacitación en Ergonomía.",
    );

    render(vec![page], "Certificado de Capacitación")
}
