// src/services/document_service.rs

use std::{collections::HashMap, path::PathBuf};

use genpdf::{elements, render, style, Element, Mm, Position, RenderResult, Scale, Size};
use image::Luma;
use qrcode::QrCode;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        finance::MonthlyReport,
        settings::{CardField, CardLayout, LayoutField, SystemConfig},
    },
};

// Resolução padrão do genpdf para imagens
const IMAGE_DPI: f64 = 300.0;
const MM_PER_INCH: f64 = 25.4;

fn pdf_error(e: impl std::fmt::Display) -> AppError {
    AppError::PdfError(e.to_string())
}

/// Código curto e legível (carteirinha, certificado).
pub fn short_code() -> String {
    Uuid::new_v4().simple().to_string()[..10].to_uppercase()
}

/// Converte a posição em % para milímetros dentro da página.
pub fn field_position_mm(layout: &CardLayout, field: &LayoutField) -> (f64, f64) {
    (
        layout.width_mm * field.x_percent / 100.0,
        layout.height_mm * field.y_percent / 100.0,
    )
}

/// Lado do QR Code em mm (size_percent é relativo à largura da página).
pub fn qr_side_mm(layout: &CardLayout, field: &LayoutField) -> f64 {
    layout.width_mm * field.size_percent / 100.0
}

/// Valores de uma página: um texto por campo e o conteúdo do QR Code.
#[derive(Debug, Default, Clone)]
pub struct PageData {
    pub values: HashMap<CardField, String>,
    pub qr_payload: Option<String>,
}

impl PageData {
    pub fn with(mut self, field: CardField, value: impl Into<String>) -> Self {
        self.values.insert(field, value.into());
        self
    }

    pub fn with_qr(mut self, payload: impl Into<String>) -> Self {
        self.qr_payload = Some(payload.into());
        self
    }

    fn text_for(&self, field: &LayoutField) -> Option<String> {
        match field.field {
            CardField::Text => field.text.clone(),
            CardField::QrCode => None,
            other => self.values.get(&other).cloned(),
        }
    }
}

fn qr_image(payload: &str, side_mm: f64) -> Result<elements::Image, AppError> {
    let code = QrCode::new(payload.as_bytes()).map_err(pdf_error)?;

    // Renderiza para imagem
    let image_buffer = code.render::<Luma<u8>>().quiet_zone(false).build();
    let natural_mm = f64::from(image_buffer.width()) / IMAGE_DPI * MM_PER_INCH;
    let scale = if natural_mm > 0.0 { side_mm / natural_mm } else { 1.0 };

    let dynamic_image = image::DynamicImage::ImageLuma8(image_buffer);
    Ok(elements::Image::from_dynamic_image(dynamic_image)
        .map_err(pdf_error)?
        .with_dpi(IMAGE_DPI)
        .with_scale(Scale::new(scale, scale)))
}

/// Uma página desenhada com posicionamento absoluto, como o editor de layout.
struct LayoutPage {
    layout: CardLayout,
    data: PageData,
}

impl Element for LayoutPage {
    fn render(
        &mut self,
        context: &genpdf::Context,
        area: render::Area<'_>,
        style: style::Style,
    ) -> Result<RenderResult, genpdf::error::Error> {
        for field in &self.layout.fields {
            let (x_mm, y_mm) = field_position_mm(&self.layout, field);

            if field.field == CardField::QrCode {
                let Some(payload) = &self.data.qr_payload else {
                    continue;
                };
                let side = qr_side_mm(&self.layout, field);
                let mut image = qr_image(payload, side)
                    .map_err(|e| genpdf::error::Error::new(e.to_string(), genpdf::error::ErrorKind::Internal))?
                    .with_position(Position::new(x_mm, y_mm));
                image.render(context, area.clone(), style)?;
                continue;
            }

            let Some(text) = self.data.text_for(field) else {
                continue;
            };
            let mut field_style = style.with_font_size(field.font_size);
            if field.bold {
                field_style = field_style.bold();
            }
            area.print_str(&context.font_cache, Position::new(x_mm, y_mm), field_style, text)?;
        }

        Ok(RenderResult { size: area.size(), has_more: false })
    }
}

#[derive(Clone)]
pub struct DocumentService {
    fonts_dir: PathBuf,
    font_family: String,
}

impl DocumentService {
    pub fn new(fonts_dir: PathBuf, font_family: String) -> Self {
        Self { fonts_dir, font_family }
    }

    fn new_document(&self, title: &str) -> Result<genpdf::Document, AppError> {
        // {FONT_FAMILY}-Regular.ttf, -Bold, -Italic e -BoldItalic em FONTS_DIR
        let font_family = genpdf::fonts::from_files(&self.fonts_dir, &self.font_family, None)
            .map_err(|_| AppError::FontNotFound(self.fonts_dir.display().to_string()))?;

        let mut doc = genpdf::Document::new(font_family);
        doc.set_title(title);
        Ok(doc)
    }

    /// Uma página por item, todas no mesmo layout (carteirinhas, certificados).
    pub fn render_layout_pages(
        &self,
        title: &str,
        layout: &CardLayout,
        pages: Vec<PageData>,
    ) -> Result<Vec<u8>, AppError> {
        let mut doc = self.new_document(title)?;
        doc.set_paper_size(Size::new(Mm::from(layout.width_mm), Mm::from(layout.height_mm)));

        let total = pages.len();
        for (index, data) in pages.into_iter().enumerate() {
            doc.push(LayoutPage { layout: layout.clone(), data });
            if index + 1 < total {
                doc.push(elements::PageBreak::new());
            }
        }

        let mut buffer = Vec::new();
        doc.render(&mut buffer).map_err(pdf_error)?;
        Ok(buffer)
    }

    /// Versão impressa do relatório mensal de mensalidades.
    pub fn monthly_report_pdf(
        &self,
        config: &SystemConfig,
        report: &MonthlyReport,
    ) -> Result<Vec<u8>, AppError> {
        let mut doc = self.new_document(&format!("Relatório {}", report.month))?;
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(10);
        doc.set_page_decorator(decorator);

        // --- CABEÇALHO ---
        let title_text = if config.terreiro_name.is_empty() {
            "Relatório financeiro".to_string()
        } else {
            config.terreiro_name.clone()
        };
        doc.push(elements::Paragraph::new(title_text).styled(style::Style::new().bold().with_font_size(18)));
        if let Some(doc_num) = &config.document_number {
            doc.push(
                elements::Paragraph::new(format!("CNPJ/CPF: {}", doc_num))
                    .styled(style::Style::new().with_font_size(10)),
            );
        }
        doc.push(elements::Break::new(1.5));
        doc.push(
            elements::Paragraph::new(format!("MENSALIDADES - {}", report.month))
                .styled(style::Style::new().bold().with_font_size(14)),
        );
        doc.push(elements::Break::new(1));

        // --- TABELA ---
        // Pesos das colunas: Nome (4), Categoria (2), Valor (2), Situação (2)
        let mut table = elements::TableLayout::new(vec![4, 2, 2, 2]);
        table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

        let style_bold = style::Style::new().bold();
        table
            .row()
            .element(elements::Paragraph::new("Membro").styled(style_bold))
            .element(elements::Paragraph::new("Categoria").styled(style_bold))
            .element(elements::Paragraph::new("Valor").styled(style_bold))
            .element(elements::Paragraph::new("Situação").styled(style_bold))
            .push()
            .map_err(pdf_error)?;

        for line in &report.lines {
            table
                .row()
                .element(elements::Paragraph::new(line.member_name.clone()))
                .element(elements::Paragraph::new(format!("{:?}", line.category)))
                .element(elements::Paragraph::new(format!("R$ {:.2}", line.amount)))
                .element(elements::Paragraph::new(format!("{:?}", line.status)))
                .push()
                .map_err(pdf_error)?;
        }
        doc.push(table);
        doc.push(elements::Break::new(2));

        // --- TOTAIS ---
        for (label, value) in [
            ("Previsto", report.total_expected),
            ("Recebido", report.total_collected),
            ("Pendente", report.total_pending),
            ("Doações", report.donations_total),
            ("Cantina", report.canteen_total),
        ] {
            let mut paragraph = elements::Paragraph::new(format!("{label}: R$ {value:.2}"));
            paragraph.set_alignment(genpdf::Alignment::Right);
            doc.push(paragraph.styled(style::Style::new().bold().with_font_size(11)));
        }

        let mut buffer = Vec::new();
        doc.render(&mut buffer).map_err(pdf_error)?;
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_positions_become_millimetres() {
        let layout = CardLayout::default_id_card();
        let name = layout
            .fields
            .iter()
            .find(|f| f.field == CardField::Name)
            .unwrap();

        let (x, y) = field_position_mm(&layout, name);
        assert!((x - 85.6 * 0.38).abs() < 1e-9);
        assert!((y - 54.0 * 0.36).abs() < 1e-9);

        let qr = layout.fields.iter().find(|f| f.field == CardField::QrCode).unwrap();
        assert!((qr_side_mm(&layout, qr) - 85.6 * 0.28).abs() < 1e-9);
    }

    #[test]
    fn text_fields_resolve_from_page_data() {
        let data = PageData::default().with(CardField::Name, "Ana de Oxum").with_qr("ABC");
        let layout = CardLayout::default_certificate();

        let texts: Vec<Option<String>> = layout.fields.iter().map(|f| data.text_for(f)).collect();
        assert!(texts.contains(&Some("Ana de Oxum".to_string())));
        assert!(texts.contains(&Some("CERTIFICADO".to_string())));
        // Campos sem valor ficam em branco
        assert!(texts.contains(&None));
    }

    #[test]
    fn missing_fonts_are_reported() {
        let service = DocumentService::new(PathBuf::from("/caminho/que/nao/existe"), "Roboto".into());
        let result = service.render_layout_pages("t", &CardLayout::default_id_card(), vec![]);
        assert!(matches!(result, Err(AppError::FontNotFound(_))));
    }

    #[test]
    fn short_codes_are_upper_hex() {
        let code = short_code();
        assert_eq!(code.len(), 10);
        assert!(code.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }
}
