// src/models/email.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::db::repository::Document;

// Conta de e-mail do cliente simulado (sem IMAP/SMTP de verdade)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmailAccount {
    pub id: Uuid,
    #[schema(example = "secretaria@terreiro.com.br")]
    pub address: String,
    pub display_name: String,
    pub imap_host: Option<String>,
    pub smtp_host: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Document for EmailAccount {
    const COLLECTION: &'static str = "email_accounts";
    const RESOURCE: &'static str = "email_account";

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Folder {
    Inbox,
    Sent,
    Trash,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmailMessage {
    pub id: Uuid,
    pub account_id: Uuid,
    pub folder: Folder,
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
    pub read: bool,
    pub sent_at: DateTime<Utc>,
}

impl Document for EmailMessage {
    const COLLECTION: &'static str = "email_messages";
    const RESOURCE: &'static str = "email_message";

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveAccountPayload {
    pub id: Option<Uuid>,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub address: String,
    #[validate(length(min = 1, message = "O nome de exibição é obrigatório."))]
    pub display_name: String,
    pub imap_host: Option<String>,
    pub smtp_host: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendMessagePayload {
    #[validate(length(min = 1, message = "Informe ao menos um destinatário."))]
    pub to: Vec<String>,
    #[validate(length(min = 1, message = "O assunto é obrigatório."))]
    pub subject: String,
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct FolderFilter {
    pub folder: Option<Folder>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MailboxSnapshot {
    pub unread: usize,
    pub messages: Vec<EmailMessage>,
}
