// src/services/email_service.rs

use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;
use validator::ValidateEmail;

use crate::{
    common::error::AppError,
    db::{EmailAccountRepository, EmailMessageRepository, Scope},
    models::email::{
        EmailAccount, EmailMessage, Folder, MailboxSnapshot, SaveAccountPayload, SendMessagePayload,
    },
};

/// Cliente de e-mail simulado: nada sai da máquina, só documentos por terreiro.
#[derive(Clone)]
pub struct EmailService {
    account_repo: EmailAccountRepository,
    message_repo: EmailMessageRepository,
    delay: Duration,
}

fn newest_first(messages: &mut [EmailMessage]) {
    messages.sort_by(|a, b| b.sent_at.cmp(&a.sent_at));
}

impl EmailService {
    pub fn new(
        account_repo: EmailAccountRepository,
        message_repo: EmailMessageRepository,
        delay: Duration,
    ) -> Self {
        Self { account_repo, message_repo, delay }
    }

    // Simula a latência do servidor remoto
    async fn network_delay(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }

    // --- CONTAS ---

    pub async fn list_accounts(&self, client_id: Uuid) -> Result<Vec<EmailAccount>, AppError> {
        let mut accounts = self.account_repo.get_all(Scope::Tenant(client_id)).await?;
        accounts.sort_by(|a, b| a.address.cmp(&b.address));
        Ok(accounts)
    }

    pub async fn save_account(
        &self,
        client_id: Uuid,
        payload: SaveAccountPayload,
    ) -> Result<EmailAccount, AppError> {
        let scope = Scope::Tenant(client_id);
        let existing = match payload.id {
            Some(id) => self.account_repo.find(scope, id).await?,
            None => None,
        };

        let account = EmailAccount {
            id: payload.id.unwrap_or_else(Uuid::new_v4),
            address: payload.address.trim().to_lowercase(),
            display_name: payload.display_name,
            imap_host: payload.imap_host,
            smtp_host: payload.smtp_host,
            created_at: existing.map(|a| a.created_at).unwrap_or_else(Utc::now),
        };

        self.account_repo.save(scope, &account).await?;
        Ok(account)
    }

    /// Remove a conta e todas as mensagens dela.
    pub async fn delete_account(&self, client_id: Uuid, account_id: Uuid) -> Result<(), AppError> {
        let scope = Scope::Tenant(client_id);
        self.account_repo.delete_existing(scope, account_id).await?;

        let messages = self
            .message_repo
            .find_where(scope, "accountId", account_id)
            .await?;
        for message in &messages {
            self.message_repo.delete(scope, message.id).await?;
        }

        tracing::info!("📭 Conta {} removida com {} mensagens", account_id, messages.len());
        Ok(())
    }

    // --- MENSAGENS ---

    pub async fn list(
        &self,
        client_id: Uuid,
        account_id: Uuid,
        folder: Folder,
    ) -> Result<Vec<EmailMessage>, AppError> {
        let scope = Scope::Tenant(client_id);
        self.account_repo.get(scope, account_id).await?;

        let mut messages = self
            .message_repo
            .find_where(scope, "accountId", account_id)
            .await?;
        messages.retain(|m| m.folder == folder);
        newest_first(&mut messages);
        Ok(messages)
    }

    /// "Sincroniza" a caixa de entrada.
    pub async fn check_mail(
        &self,
        client_id: Uuid,
        account_id: Uuid,
    ) -> Result<MailboxSnapshot, AppError> {
        self.network_delay().await;

        let messages = self.list(client_id, account_id, Folder::Inbox).await?;
        let unread = messages.iter().filter(|m| !m.read).count();
        Ok(MailboxSnapshot { unread, messages })
    }

    /// Grava em SENT e entrega uma cópia no INBOX de cada conta local destinatária.
    pub async fn send_message(
        &self,
        client_id: Uuid,
        account_id: Uuid,
        payload: SendMessagePayload,
    ) -> Result<EmailMessage, AppError> {
        let scope = Scope::Tenant(client_id);
        let account = self.account_repo.get(scope, account_id).await?;

        let mut to = Vec::with_capacity(payload.to.len());
        for recipient in payload.to {
            let recipient = recipient.trim().to_lowercase();
            if !recipient.validate_email() {
                return Err(AppError::InvalidRecipient(recipient));
            }
            to.push(recipient);
        }

        self.network_delay().await;

        let sent = EmailMessage {
            id: Uuid::new_v4(),
            account_id: account.id,
            folder: Folder::Sent,
            from: account.address.clone(),
            to,
            subject: payload.subject,
            body: payload.body,
            read: true,
            sent_at: Utc::now(),
        };
        self.message_repo.save(scope, &sent).await?;

        let accounts = self.account_repo.get_all(scope).await?;
        let mut delivered = 0;
        for local in accounts.iter().filter(|a| sent.to.contains(&a.address)) {
            let copy = EmailMessage {
                id: Uuid::new_v4(),
                account_id: local.id,
                folder: Folder::Inbox,
                read: false,
                ..sent.clone()
            };
            self.message_repo.save(scope, &copy).await?;
            delivered += 1;
        }

        tracing::info!("📨 Mensagem de {} enviada ({} entregas locais)", sent.from, delivered);
        Ok(sent)
    }

    async fn update_message(
        &self,
        client_id: Uuid,
        message_id: Uuid,
        change: impl FnOnce(&mut EmailMessage),
    ) -> Result<EmailMessage, AppError> {
        let scope = Scope::Tenant(client_id);
        let mut message = self.message_repo.get(scope, message_id).await?;
        change(&mut message);
        self.message_repo.save(scope, &message).await?;
        Ok(message)
    }

    pub async fn mark_read(&self, client_id: Uuid, message_id: Uuid) -> Result<EmailMessage, AppError> {
        self.update_message(client_id, message_id, |m| m.read = true).await
    }

    pub async fn move_to_trash(
        &self,
        client_id: Uuid,
        message_id: Uuid,
    ) -> Result<EmailMessage, AppError> {
        self.update_message(client_id, message_id, |m| m.folder = Folder::Trash).await
    }

    pub async fn delete_message(&self, client_id: Uuid, message_id: Uuid) -> Result<(), AppError> {
        self.message_repo
            .delete_existing(Scope::Tenant(client_id), message_id)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppState;
    use crate::services::member_service::tests::seed_client;

    async fn account(state: &AppState, client_id: Uuid, address: &str) -> EmailAccount {
        state
            .email_service
            .save_account(
                client_id,
                SaveAccountPayload {
                    id: None,
                    address: address.into(),
                    display_name: address.into(),
                    imap_host: None,
                    smtp_host: None,
                },
            )
            .await
            .unwrap()
    }

    fn message(to: &[&str]) -> SendMessagePayload {
        SendMessagePayload {
            to: to.iter().map(|s| s.to_string()).collect(),
            subject: "Gira de sábado".into(),
            body: "Confirmada às 20h.".into(),
        }
    }

    #[tokio::test]
    async fn sending_delivers_to_local_accounts() {
        let state = AppState::in_memory();
        let client_id = seed_client(&state, None).await;
        let email = &state.email_service;
        let secretaria = account(&state, client_id, "secretaria@casa.com").await;
        let tesouraria = account(&state, client_id, "Tesouraria@casa.com").await;

        email
            .send_message(client_id, secretaria.id, message(&["tesouraria@casa.com", "fora@outro.com"]))
            .await
            .unwrap();

        let sent = email.list(client_id, secretaria.id, Folder::Sent).await.unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to.len(), 2);

        let inbox = email.check_mail(client_id, tesouraria.id).await.unwrap();
        assert_eq!(inbox.unread, 1);
        assert_eq!(inbox.messages[0].from, "secretaria@casa.com");

        email.mark_read(client_id, inbox.messages[0].id).await.unwrap();
        assert_eq!(email.check_mail(client_id, tesouraria.id).await.unwrap().unread, 0);
    }

    #[tokio::test]
    async fn invalid_recipient_is_rejected() {
        let state = AppState::in_memory();
        let client_id = seed_client(&state, None).await;
        let secretaria = account(&state, client_id, "secretaria@casa.com").await;

        assert!(matches!(
            state
                .email_service
                .send_message(client_id, secretaria.id, message(&["sem-arroba"]))
                .await,
            Err(AppError::InvalidRecipient(_))
        ));
        let sent = state.email_service.list(client_id, secretaria.id, Folder::Sent).await.unwrap();
        assert!(sent.is_empty());
    }

    #[tokio::test]
    async fn trash_and_account_removal() {
        let state = AppState::in_memory();
        let client_id = seed_client(&state, None).await;
        let email = &state.email_service;
        let secretaria = account(&state, client_id, "secretaria@casa.com").await;

        let sent = email
            .send_message(client_id, secretaria.id, message(&["secretaria@casa.com"]))
            .await
            .unwrap();
        email.move_to_trash(client_id, sent.id).await.unwrap();
        assert_eq!(email.list(client_id, secretaria.id, Folder::Trash).await.unwrap().len(), 1);
        assert_eq!(email.list(client_id, secretaria.id, Folder::Inbox).await.unwrap().len(), 1);

        email.delete_account(client_id, secretaria.id).await.unwrap();
        assert!(matches!(
            email.list(client_id, secretaria.id, Folder::Inbox).await,
            Err(AppError::NotFound("email_account"))
        ));
        assert!(matches!(
            email.mark_read(client_id, sent.id).await,
            Err(AppError::NotFound("email_message"))
        ));
    }
}
