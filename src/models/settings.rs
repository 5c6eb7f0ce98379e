// src/models/settings.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::db::repository::Document;
use crate::models::inventory::validate_not_negative;

// Tamanho padrão de carteirinha (CR80) e de certificado (A4 paisagem), em mm
pub const ID_CARD_WIDTH_MM: f64 = 85.6;
pub const ID_CARD_HEIGHT_MM: f64 = 54.0;
pub const CERTIFICATE_WIDTH_MM: f64 = 297.0;
pub const CERTIFICATE_HEIGHT_MM: f64 = 210.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CardField {
    Name,
    Role,
    MemberCode,
    TerreiroName,
    IssueDate,
    ValidUntil,
    CourseTitle,
    Workload,
    CompletionDate,
    QrCode,
    Text, // Texto fixo (usa `text`)
}

// Um elemento posicionado em porcentagem da página
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LayoutField {
    pub field: CardField,
    #[serde(default)]
    pub text: Option<String>,
    #[schema(example = 35.0)]
    #[validate(range(min = 0.0, max = 100.0, message = "A posição deve ficar entre 0 e 100%."))]
    pub x_percent: f64,
    #[schema(example = 40.0)]
    #[validate(range(min = 0.0, max = 100.0, message = "A posição deve ficar entre 0 e 100%."))]
    pub y_percent: f64,
    #[schema(example = 9)]
    #[validate(range(min = 1, message = "A fonte precisa de tamanho."))]
    pub font_size: u8,
    #[serde(default)]
    pub bold: bool,
    // Largura do QR Code em % da largura da página
    #[serde(default = "default_size_percent")]
    #[validate(range(min = 0.0, max = 100.0, message = "O tamanho deve ficar entre 0 e 100%."))]
    pub size_percent: f64,
}

fn default_size_percent() -> f64 {
    20.0
}

impl LayoutField {
    fn at(field: CardField, x_percent: f64, y_percent: f64, font_size: u8, bold: bool) -> Self {
        Self {
            field,
            text: None,
            x_percent,
            y_percent,
            font_size,
            bold,
            size_percent: default_size_percent(),
        }
    }

    fn text(value: &str, x_percent: f64, y_percent: f64, font_size: u8, bold: bool) -> Self {
        Self {
            text: Some(value.to_string()),
            ..Self::at(CardField::Text, x_percent, y_percent, font_size, bold)
        }
    }

    fn qr(x_percent: f64, y_percent: f64, size_percent: f64) -> Self {
        Self {
            size_percent,
            ..Self::at(CardField::QrCode, x_percent, y_percent, 8, false)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CardLayout {
    #[validate(range(exclusive_min = 0.0, message = "A página precisa de largura."))]
    pub width_mm: f64,
    #[validate(range(exclusive_min = 0.0, message = "A página precisa de altura."))]
    pub height_mm: f64,
    #[validate(nested)]
    pub fields: Vec<LayoutField>,
}

impl CardLayout {
    pub fn default_id_card() -> Self {
        Self {
            width_mm: ID_CARD_WIDTH_MM,
            height_mm: ID_CARD_HEIGHT_MM,
            fields: vec![
                LayoutField::at(CardField::TerreiroName, 5.0, 6.0, 10, true),
                LayoutField::qr(5.0, 32.0, 28.0),
                LayoutField::at(CardField::Name, 38.0, 36.0, 9, true),
                LayoutField::at(CardField::Role, 38.0, 50.0, 8, false),
                LayoutField::at(CardField::MemberCode, 38.0, 64.0, 7, false),
                LayoutField::at(CardField::ValidUntil, 38.0, 78.0, 7, false),
            ],
        }
    }

    pub fn default_certificate() -> Self {
        Self {
            width_mm: CERTIFICATE_WIDTH_MM,
            height_mm: CERTIFICATE_HEIGHT_MM,
            fields: vec![
                LayoutField::text("CERTIFICADO", 35.0, 12.0, 28, true),
                LayoutField::text("Certificamos que", 10.0, 32.0, 14, false),
                LayoutField::at(CardField::Name, 10.0, 42.0, 22, true),
                LayoutField::text("concluiu o curso", 10.0, 55.0, 14, false),
                LayoutField::at(CardField::CourseTitle, 10.0, 63.0, 18, true),
                LayoutField::at(CardField::Workload, 10.0, 74.0, 12, false),
                LayoutField::at(CardField::CompletionDate, 10.0, 81.0, 12, false),
                LayoutField::at(CardField::TerreiroName, 10.0, 88.0, 12, true),
                LayoutField::qr(85.0, 72.0, 10.0),
            ],
        }
    }
}

// Mensalidades dos filhos da casa
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeeSchedule {
    #[schema(example = "50.00")]
    #[validate(custom(function = "validate_not_negative"))]
    pub medium_fee: Decimal,
    #[schema(example = "30.00")]
    #[validate(custom(function = "validate_not_negative"))]
    pub cambone_fee: Decimal,
    #[schema(example = 10)]
    #[validate(range(min = 1, max = 28, message = "O vencimento deve ser entre 1 e 28."))]
    pub due_day: u32,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            medium_fee: Decimal::new(5000, 2),
            cambone_fee: Decimal::new(3000, 2),
            due_day: 10,
        }
    }
}

// Configuração do terreiro (config/{clientId})
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SystemConfig {
    #[schema(ignore)] // O contexto (Header) já define o terreiro
    pub id: Uuid,

    #[schema(example = "Tenda de Umbanda Caboclo Pena Branca")]
    pub terreiro_name: String,
    #[schema(example = "12.345.678/0001-99")]
    pub document_number: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub logo_url: Option<String>,
    #[schema(example = "#1d4ed8")]
    pub primary_color: Option<String>,

    pub fees: FeeSchedule,

    #[schema(example = 12)]
    pub id_card_validity_months: u32,
    pub id_card_layout: CardLayout,
    pub certificate_layout: CardLayout,

    pub updated_at: Option<DateTime<Utc>>,
}

impl Document for SystemConfig {
    const COLLECTION: &'static str = "config";
    const RESOURCE: &'static str = "config";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl SystemConfig {
    pub fn defaults(client_id: Uuid, terreiro_name: &str) -> Self {
        Self {
            id: client_id,
            terreiro_name: terreiro_name.to_string(),
            document_number: None,
            address: None,
            phone: None,
            email: None,
            logo_url: None,
            primary_color: None,
            fees: FeeSchedule::default(),
            id_card_validity_months: 12,
            id_card_layout: CardLayout::default_id_card(),
            certificate_layout: CardLayout::default_certificate(),
            updated_at: None,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    #[schema(example = "Tenda de Umbanda Caboclo Pena Branca")]
    #[validate(length(min = 1, message = "O nome do terreiro é obrigatório."))]
    pub terreiro_name: String,
    pub document_number: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub logo_url: Option<String>,
    pub primary_color: Option<String>,
    #[validate(nested)]
    pub fees: FeeSchedule,
    #[validate(range(min = 1, message = "A validade precisa de pelo menos um mês."))]
    pub id_card_validity_months: u32,
    #[validate(nested)]
    pub id_card_layout: CardLayout,
    #[validate(nested)]
    pub certificate_layout: CardLayout,
}
