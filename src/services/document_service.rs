// src/services/document_service.rs

use genpdf::{elements, style, Element};
use image::Luma;
use qrcode::QrCode;
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::{Acquire, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::found, error::AppError},
    db::{ListingRepository, PropertyRepository},
    models::property::Furnishing,
};

/// Link público do anúncio (vai no QR Code do folheto).
pub fn listing_public_url(base_url: &str, listing_id: Uuid) -> String {
    format!("{}/listings/{}", base_url.trim_end_matches('/'), listing_id)
}

/// "R$ 1.250.000,00"
pub fn format_brl(value: Decimal) -> String {
    let raw = format!("{:.2}", value);
    let (sign, raw) = match raw.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", raw.as_str()),
    };
    let (int_part, frac_part) = raw.split_once('.').unwrap_or((raw, "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    format!("{}R$ {},{}", sign, grouped, frac_part)
}

/// Amenidades gravadas como array JSON de textos; o resto é ignorado.
pub fn amenity_labels(amenities: &Value) -> Vec<String> {
    amenities
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn furnishing_label(furnishing: Furnishing) -> &'static str {
    match furnishing {
        Furnishing::Unfurnished => "Sem mobília",
        Furnishing::SemiFurnished => "Semimobiliado",
        Furnishing::Furnished => "Mobiliado",
    }
}

fn pdf_err(e: impl std::fmt::Display) -> AppError {
    AppError::PdfError(e.to_string())
}

#[derive(Clone)]
pub struct DocumentService {
    listing_repo: ListingRepository,
    property_repo: PropertyRepository,
    public_base_url: String,
    fonts_dir: String,
}

impl DocumentService {
    pub fn new(
        listing_repo: ListingRepository,
        property_repo: PropertyRepository,
        public_base_url: String,
        fonts_dir: String,
    ) -> Self {
        Self { listing_repo, property_repo, public_base_url, fonts_dir }
    }

    /// Folheto em PDF do anúncio.
    pub async fn listing_brochure<'e, A>(&self, conn: A, listing_id: Uuid) -> Result<Vec<u8>, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut conn = conn.acquire().await?;

        // 1. Busca os dados
        let listing = found(self.listing_repo.find_by_id(&mut *conn, listing_id).await?, "listing")?;
        let unit = found(self.property_repo.find_unit(&mut *conn, listing.unit_id).await?, "unit")?;
        let building = found(self.property_repo.find_building(&mut *conn, unit.building_id).await?, "building")?;

        // 2. Configura o PDF
        let font_family = genpdf::fonts::from_files(&self.fonts_dir, "Roboto", None)
            .map_err(|e| AppError::PdfError(format!("fonte não encontrada em {}: {}", self.fonts_dir, e)))?;

        let mut doc = genpdf::Document::new(font_family);
        doc.set_title(listing.title.clone());
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(10);
        doc.set_page_decorator(decorator);

        // --- CABEÇALHO ---
        doc.push(elements::Paragraph::new(listing.title.clone()).styled(style::Style::new().bold().with_font_size(18)));
        doc.push(
            elements::Paragraph::new(format!("{} - {}, {}", building.name, building.locality, building.city))
                .styled(style::Style::new().with_font_size(11)),
        );
        doc.push(elements::Break::new(1.5));

        let mut price = elements::Paragraph::new(format_brl(listing.price));
        price.set_alignment(genpdf::Alignment::Right);
        doc.push(price.styled(style::Style::new().bold().with_font_size(16)));
        if listing.price_negotiable {
            let mut note = elements::Paragraph::new("Valor negociável");
            note.set_alignment(genpdf::Alignment::Right);
            doc.push(note.styled(style::Style::new().italic().with_font_size(9)));
        }
        doc.push(elements::Break::new(1.5));

        // --- FICHA DA UNIDADE ---
        let mut table = elements::TableLayout::new(vec![1, 2]);
        table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

        let bold = style::Style::new().bold();
        let mut rows: Vec<(&str, String)> = vec![
            ("Unidade", unit.unit_number.clone()),
            ("Dormitórios", unit.bedrooms.to_string()),
            ("Banheiros", unit.bathrooms.to_string()),
            ("Mobília", furnishing_label(unit.furnishing).to_string()),
            ("Endereço", building.address.clone()),
        ];
        if let Some(floor) = unit.floor {
            rows.push(("Andar", floor.to_string()));
        }
        if let Some(area) = unit.area_sqft {
            rows.push(("Área (sq ft)", area.to_string()));
        }
        if let Some(facing) = unit.facing.as_deref() {
            rows.push(("Face", facing.to_string()));
        }
        if let Some(developer) = building.developer.as_deref() {
            rows.push(("Construtora", developer.to_string()));
        }

        for (label, value) in rows {
            table
                .row()
                .element(elements::Paragraph::new(label).styled(bold))
                .element(elements::Paragraph::new(value))
                .push()
                .map_err(pdf_err)?;
        }
        doc.push(table);

        if let Some(description) = listing.description.as_deref() {
            doc.push(elements::Break::new(1.5));
            doc.push(elements::Paragraph::new(description));
        }

        // --- AMENIDADES ---
        let amenities = amenity_labels(&building.amenities);
        if !amenities.is_empty() {
            doc.push(elements::Break::new(1.5));
            doc.push(elements::Paragraph::new("Lazer e comodidades").styled(bold.with_font_size(12)));
            let mut list = elements::UnorderedList::new();
            for amenity in amenities {
                list.push(elements::Paragraph::new(amenity));
            }
            doc.push(list);
        }

        // --- QR CODE PARA O ANÚNCIO ---
        let url = listing_public_url(&self.public_base_url, listing.id);
        let code = QrCode::new(url.as_bytes()).map_err(pdf_err)?;
        let image_buffer = code.render::<Luma<u8>>().build();
        let dynamic_image = image::DynamicImage::ImageLuma8(image_buffer);
        let qr = elements::Image::from_dynamic_image(dynamic_image)
            .map_err(pdf_err)?
            .with_scale(genpdf::Scale::new(0.5, 0.5));

        doc.push(elements::Break::new(2));
        doc.push(qr);
        doc.push(elements::Paragraph::new(url).styled(style::Style::new().italic().with_font_size(8)));

        // 3. Renderiza em memória
        let mut buffer = Vec::new();
        doc.render(&mut buffer).map_err(pdf_err)?;

        tracing::info!(listing_id = %listing.id, bytes = buffer.len(), "Folheto gerado");
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn formats_prices_in_reais() {
        assert_eq!(format_brl(Decimal::from_str("1250000").unwrap()), "R$ 1.250.000,00");
        assert_eq!(format_brl(Decimal::from_str("850000.5").unwrap()), "R$ 850.000,50");
        assert_eq!(format_brl(Decimal::from_str("999.99").unwrap()), "R$ 999,99");
    }

    #[test]
    fn public_url_ignores_trailing_slash() {
        let id = Uuid::new_v4();
        assert_eq!(
            listing_public_url("https://crm.example.com/", id),
            format!("https://crm.example.com/listings/{}", id)
        );
    }

    #[test]
    fn amenities_keep_only_text_entries() {
        let labels = amenity_labels(&json!(["piscina", " academia ", 3, "", null]));
        assert_eq!(labels, vec!["piscina", "academia"]);
        assert!(amenity_labels(&json!({"piscina": true})).is_empty());
    }
}
