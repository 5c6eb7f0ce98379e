// src/services/master_service.rs

use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::{dates::Month, error::AppError},
    db::{AffiliateRepository, InvoiceRepository, PlanRepository, Scope},
    models::{
        auth::User,
        master::{
            Affiliate, AffiliateCommission, CreateClientPayload, Invoice, InvoiceFilter,
            InvoiceStatus, MasterReport, Plan, SaveAffiliatePayload, SavePlanPayload,
            UpdateClientPayload,
        },
        tenancy::{ClientStatus, SaasClient},
    },
    services::tenancy_service::{NewClient, TenantService},
};

/// Status como aparece no JSON ("ACTIVE", "BLOCKED"...).
fn status_key(status: ClientStatus) -> String {
    serde_json::to_value(status)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_else(|| format!("{status:?}").to_uppercase())
}

/// Terreiros que recebem fatura: ativos, ou em teste com mensalidade definida.
fn is_billable(client: &SaasClient) -> bool {
    match client.status {
        ClientStatus::Active => true,
        ClientStatus::Trial => client.monthly_fee > Decimal::ZERO,
        ClientStatus::Blocked | ClientStatus::Cancelled => false,
    }
}

fn is_overdue(invoice: &Invoice, today: NaiveDate, grace_days: u32) -> bool {
    // carência que estoura o calendário nunca vence
    invoice.status == InvoiceStatus::Pending
        && invoice
            .due_date
            .checked_add_signed(chrono::Duration::days(i64::from(grace_days)))
            .is_some_and(|limit| limit < today)
}

/// Consolida as faturas do mês. Canceladas ficam fora do previsto.
pub fn build_master_report(
    month: Month,
    clients: &[SaasClient],
    affiliates: &[Affiliate],
    invoices: &[Invoice],
) -> MasterReport {
    let key = month.key();
    let of_month: Vec<&Invoice> = invoices
        .iter()
        .filter(|i| i.month == key && i.status != InvoiceStatus::Cancelled)
        .collect();

    let sum = |status: InvoiceStatus| -> Decimal {
        of_month
            .iter()
            .filter(|i| i.status == status)
            .map(|i| i.amount)
            .sum()
    };
    let total_collected = sum(InvoiceStatus::Paid);
    let total_pending = sum(InvoiceStatus::Pending);

    let mut clients_by_status = BTreeMap::new();
    for client in clients {
        *clients_by_status.entry(status_key(client.status)).or_insert(0) += 1;
    }

    let commissions: Vec<AffiliateCommission> = affiliates
        .iter()
        .map(|affiliate| {
            let client_ids: Vec<Uuid> = clients
                .iter()
                .filter(|c| c.affiliate_id == Some(affiliate.id))
                .map(|c| c.id)
                .collect();
            let paid_total: Decimal = of_month
                .iter()
                .filter(|i| i.status == InvoiceStatus::Paid && client_ids.contains(&i.client_id))
                .map(|i| i.amount)
                .sum();
            AffiliateCommission {
                affiliate_id: affiliate.id,
                affiliate_name: affiliate.name.clone(),
                clients: client_ids.len(),
                paid_total,
                commission: (paid_total * affiliate.commission_rate).round_dp(2),
            }
        })
        .collect();
    let total_commission = commissions.iter().map(|c| c.commission).sum();

    MasterReport {
        month: key,
        total_expected: total_collected + total_pending,
        total_collected,
        total_pending,
        invoices: of_month.len(),
        clients_by_status,
        commissions,
        total_commission,
    }
}

#[derive(Clone)]
pub struct MasterService {
    plan_repo: PlanRepository,
    affiliate_repo: AffiliateRepository,
    invoice_repo: InvoiceRepository,
    tenant_service: TenantService,
}

impl MasterService {
    pub fn new(
        plan_repo: PlanRepository,
        affiliate_repo: AffiliateRepository,
        invoice_repo: InvoiceRepository,
        tenant_service: TenantService,
    ) -> Self {
        Self { plan_repo, affiliate_repo, invoice_repo, tenant_service }
    }

    // --- PLANOS ---

    pub async fn list_plans(&self) -> Result<Vec<Plan>, AppError> {
        let mut plans = self.plan_repo.get_all(Scope::Root).await?;
        plans.sort_by(|a, b| a.monthly_price.cmp(&b.monthly_price));
        Ok(plans)
    }

    /// Só um plano fica marcado como padrão.
    pub async fn save_plan(&self, payload: SavePlanPayload) -> Result<Plan, AppError> {
        if let Some(id) = payload.id {
            self.plan_repo.get(Scope::Root, id).await?;
        }

        let plan = Plan {
            id: payload.id.unwrap_or_else(Uuid::new_v4),
            name: payload.name,
            monthly_price: payload.monthly_price,
            max_members: payload.max_members,
            features: payload.features,
            active: payload.active,
            is_default: payload.is_default,
        };

        if plan.is_default {
            for mut other in self.plan_repo.get_all(Scope::Root).await? {
                if other.id != plan.id && other.is_default {
                    other.is_default = false;
                    self.plan_repo.save(Scope::Root, &other).await?;
                }
            }
        }

        self.plan_repo.save(Scope::Root, &plan).await?;
        Ok(plan)
    }

    pub async fn delete_plan(&self, plan_id: Uuid) -> Result<(), AppError> {
        self.plan_repo.delete_existing(Scope::Root, plan_id).await
    }

    // --- AFILIADOS ---

    pub async fn list_affiliates(&self) -> Result<Vec<Affiliate>, AppError> {
        let mut affiliates = self.affiliate_repo.get_all(Scope::Root).await?;
        affiliates.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(affiliates)
    }

    /// O código é guardado em maiúsculas e é único entre afiliados.
    pub async fn save_affiliate(&self, payload: SaveAffiliatePayload) -> Result<Affiliate, AppError> {
        let code = payload.code.trim().to_uppercase();
        let taken = self
            .affiliate_repo
            .find_where(Scope::Root, "code", &code)
            .await?
            .into_iter()
            .any(|a| Some(a.id) != payload.id);
        if taken {
            return Err(AppError::AffiliateCodeAlreadyExists(code));
        }

        let existing = match payload.id {
            Some(id) => Some(self.affiliate_repo.get(Scope::Root, id).await?),
            None => None,
        };

        let affiliate = Affiliate {
            id: payload.id.unwrap_or_else(Uuid::new_v4),
            name: payload.name,
            email: payload.email.trim().to_lowercase(),
            code,
            commission_rate: payload.commission_rate,
            active: payload.active,
            created_at: existing.map(|a| a.created_at).unwrap_or_else(Utc::now),
        };

        self.affiliate_repo.save(Scope::Root, &affiliate).await?;
        Ok(affiliate)
    }

    pub async fn delete_affiliate(&self, affiliate_id: Uuid) -> Result<(), AppError> {
        self.affiliate_repo.delete_existing(Scope::Root, affiliate_id).await
    }

    // --- CLIENTES ---

    /// Terreiro aberto pelo master já nasce ativo.
    pub async fn create_client(
        &self,
        payload: CreateClientPayload,
    ) -> Result<(SaasClient, User), AppError> {
        if let Some(affiliate_id) = payload.affiliate_id {
            self.affiliate_repo.get(Scope::Root, affiliate_id).await?;
        }

        self.tenant_service
            .create_client(NewClient {
                name: payload.name,
                owner_name: payload.owner_name,
                owner_email: payload.owner_email,
                admin_password: payload.admin_password,
                plan_id: payload.plan_id,
                affiliate_id: payload.affiliate_id,
                monthly_fee: payload.monthly_fee,
                due_day: payload.due_day,
                status: ClientStatus::Active,
            })
            .await
    }

    pub async fn update_client(
        &self,
        client_id: Uuid,
        payload: UpdateClientPayload,
    ) -> Result<SaasClient, AppError> {
        if let Some(affiliate_id) = payload.affiliate_id {
            self.affiliate_repo.get(Scope::Root, affiliate_id).await?;
        }
        self.tenant_service.update_client(client_id, payload).await
    }

    /// Apaga o terreiro e as faturas dele; o relatório do mês deixa de contá-las.
    pub async fn delete_client(&self, client_id: Uuid) -> Result<u64, AppError> {
        let invoices = self
            .invoice_repo
            .find_where(Scope::Root, "clientId", client_id)
            .await?;
        let purged = self.tenant_service.delete_client(client_id).await?;
        for invoice in &invoices {
            self.invoice_repo.delete(Scope::Root, invoice.id).await?;
        }
        Ok(purged)
    }

    // --- FATURAS ---

    /// Uma fatura por terreiro faturável no mês; rodar de novo não duplica.
    pub async fn generate_invoices(&self, month: Month) -> Result<Vec<Invoice>, AppError> {
        let key = month.key();
        let clients = self.tenant_service.list_clients().await?;
        let existing = self.invoice_repo.find_where(Scope::Root, "month", &key).await?;

        let now = Utc::now();
        let mut created = Vec::new();
        for client in clients.iter().filter(|c| is_billable(c)) {
            let already_billed = existing
                .iter()
                .any(|i| i.client_id == client.id && i.status != InvoiceStatus::Cancelled);
            if already_billed {
                continue;
            }

            let invoice = Invoice {
                id: Uuid::new_v4(),
                client_id: client.id,
                client_name: client.name.clone(),
                month: key.clone(),
                amount: client.monthly_fee,
                due_date: month.day_clamped(client.due_day),
                status: InvoiceStatus::Pending,
                paid_at: None,
                created_at: now,
            };
            self.invoice_repo.save(Scope::Root, &invoice).await?;
            created.push(invoice);
        }

        tracing::info!("🧾 {} faturas geradas para {}", created.len(), key);
        Ok(created)
    }

    pub async fn list_invoices(&self, filter: InvoiceFilter) -> Result<Vec<Invoice>, AppError> {
        let month = filter.month.as_deref().map(Month::parse).transpose()?;

        let mut invoices = match filter.client_id {
            Some(client_id) => self.invoice_repo.find_where(Scope::Root, "clientId", client_id).await?,
            None => self.invoice_repo.get_all(Scope::Root).await?,
        };
        if let Some(month) = month {
            let key = month.key();
            invoices.retain(|i| i.month == key);
        }
        invoices.sort_by(|a, b| {
            b.month
                .cmp(&a.month)
                .then_with(|| a.client_name.cmp(&b.client_name))
        });
        Ok(invoices)
    }

    /// Baixa a fatura. Terreiro bloqueado sem outra fatura vencida volta a ficar ativo.
    pub async fn mark_paid(&self, invoice_id: Uuid, today: NaiveDate) -> Result<Invoice, AppError> {
        let mut invoice = self.invoice_repo.get(Scope::Root, invoice_id).await?;
        if invoice.status != InvoiceStatus::Pending {
            return Err(AppError::InvoiceClosed);
        }

        invoice.status = InvoiceStatus::Paid;
        invoice.paid_at = Some(Utc::now());
        self.invoice_repo.save(Scope::Root, &invoice).await?;

        let client = self.tenant_service.get_client(invoice.client_id).await?;
        if client.status == ClientStatus::Blocked {
            let still_overdue = self
                .invoice_repo
                .find_where(Scope::Root, "clientId", client.id)
                .await?
                .iter()
                .any(|i| is_overdue(i, today, 0));
            if !still_overdue {
                self.tenant_service
                    .change_status(client.id, ClientStatus::Active)
                    .await?;
            }
        }

        tracing::info!("💰 Fatura {} de '{}' paga", invoice.month, invoice.client_name);
        Ok(invoice)
    }

    pub async fn cancel_invoice(&self, invoice_id: Uuid) -> Result<Invoice, AppError> {
        let mut invoice = self.invoice_repo.get(Scope::Root, invoice_id).await?;
        if invoice.status != InvoiceStatus::Pending {
            return Err(AppError::InvoiceClosed);
        }

        invoice.status = InvoiceStatus::Cancelled;
        self.invoice_repo.save(Scope::Root, &invoice).await?;
        Ok(invoice)
    }

    /// Bloqueia terreiros ativos com fatura pendente vencida há mais de `grace_days`.
    pub async fn block_overdue(
        &self,
        today: NaiveDate,
        grace_days: u32,
    ) -> Result<Vec<SaasClient>, AppError> {
        let invoices = self.invoice_repo.get_all(Scope::Root).await?;
        let clients = self.tenant_service.list_clients().await?;

        let mut blocked = Vec::new();
        for client in clients.into_iter().filter(|c| c.status == ClientStatus::Active) {
            let overdue = invoices
                .iter()
                .any(|i| i.client_id == client.id && is_overdue(i, today, grace_days));
            if overdue {
                let client = self
                    .tenant_service
                    .change_status(client.id, ClientStatus::Blocked)
                    .await?;
                blocked.push(client);
            }
        }

        if !blocked.is_empty() {
            tracing::warn!("⛔ {} terreiros bloqueados por inadimplência", blocked.len());
        }
        Ok(blocked)
    }

    pub async fn report(&self, month: Month) -> Result<MasterReport, AppError> {
        let clients = self.tenant_service.list_clients().await?;
        let affiliates = self.affiliate_repo.get_all(Scope::Root).await?;
        let invoices = self.invoice_repo.get_all(Scope::Root).await?;

        Ok(build_master_report(month, &clients, &affiliates, &invoices))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppState;

    fn may() -> Month {
        Month::parse("2024-05").unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn client_payload(email: &str, fee: i64, affiliate_id: Option<Uuid>) -> CreateClientPayload {
        CreateClientPayload {
            name: format!("Terreiro {email}"),
            owner_name: "Responsável".into(),
            owner_email: email.into(),
            admin_password: "123456".into(),
            plan_id: None,
            affiliate_id,
            monthly_fee: Some(Decimal::new(fee, 2)),
            due_day: 10,
        }
    }

    fn affiliate_payload(code: &str) -> SaveAffiliatePayload {
        SaveAffiliatePayload {
            id: None,
            name: "Revenda Axé".into(),
            email: "revenda@axe.com".into(),
            code: code.into(),
            commission_rate: Decimal::new(10, 2),
            active: true,
        }
    }

    #[tokio::test]
    async fn affiliate_codes_are_unique_and_uppercase() {
        let state = AppState::in_memory();
        let master = &state.master_service;

        let affiliate = master.save_affiliate(affiliate_payload("axe10")).await.unwrap();
        assert_eq!(affiliate.code, "AXE10");

        assert!(matches!(
            master.save_affiliate(affiliate_payload("AXE10")).await,
            Err(AppError::AffiliateCodeAlreadyExists(_))
        ));

        let mut update = affiliate_payload("axe10");
        update.id = Some(affiliate.id);
        update.name = "Revenda Axé Ltda".into();
        let updated = master.save_affiliate(update).await.unwrap();
        assert_eq!(updated.created_at, affiliate.created_at);
    }

    #[tokio::test]
    async fn invoice_generation_is_idempotent() {
        let state = AppState::in_memory();
        let master = &state.master_service;
        master.create_client(client_payload("a@casa.com", 4990, None)).await.unwrap();
        let (blocked, _) = master.create_client(client_payload("b@casa.com", 4990, None)).await.unwrap();
        state
            .tenant_service
            .change_status(blocked.id, ClientStatus::Blocked)
            .await
            .unwrap();

        assert_eq!(master.generate_invoices(may()).await.unwrap().len(), 1);
        assert!(master.generate_invoices(may()).await.unwrap().is_empty());

        let invoices = master
            .list_invoices(InvoiceFilter { month: Some("2024-05".into()), client_id: None })
            .await
            .unwrap();
        assert_eq!(invoices.len(), 1);
        assert_eq!(invoices[0].due_date, day(10));
    }

    #[tokio::test]
    async fn overdue_clients_are_blocked_and_payment_reactivates() {
        let state = AppState::in_memory();
        let master = &state.master_service;
        let (client, _) = master.create_client(client_payload("a@casa.com", 4990, None)).await.unwrap();
        let invoice = master.generate_invoices(may()).await.unwrap().remove(0);

        // Vence dia 10; com 5 dias de carência só bloqueia a partir do dia 16
        assert!(master.block_overdue(day(15), 5).await.unwrap().is_empty());
        let blocked = master.block_overdue(day(16), 5).await.unwrap();
        assert_eq!(blocked.len(), 1);
        assert_eq!(blocked[0].status, ClientStatus::Blocked);

        let paid = master.mark_paid(invoice.id, day(16)).await.unwrap();
        assert_eq!(paid.status, InvoiceStatus::Paid);
        assert_eq!(
            state.tenant_service.get_client(client.id).await.unwrap().status,
            ClientStatus::Active
        );

        assert!(matches!(master.mark_paid(invoice.id, day(16)).await, Err(AppError::InvoiceClosed)));
        assert!(matches!(master.cancel_invoice(invoice.id).await, Err(AppError::InvoiceClosed)));
    }

    #[tokio::test]
    async fn report_totals_and_commissions() {
        let state = AppState::in_memory();
        let master = &state.master_service;
        let affiliate = master.save_affiliate(affiliate_payload("AXE10")).await.unwrap();
        master
            .create_client(client_payload("a@casa.com", 10000, Some(affiliate.id)))
            .await
            .unwrap();
        master.create_client(client_payload("b@casa.com", 5000, None)).await.unwrap();
        master.create_client(client_payload("c@casa.com", 3000, None)).await.unwrap();

        let invoices = master.generate_invoices(may()).await.unwrap();
        let by_amount = |cents| invoices.iter().find(|i| i.amount == Decimal::new(cents, 2)).unwrap().id;
        master.mark_paid(by_amount(10000), day(5)).await.unwrap();
        master.cancel_invoice(by_amount(3000)).await.unwrap();

        let report = master.report(may()).await.unwrap();
        assert_eq!(report.invoices, 2);
        assert_eq!(report.total_collected, Decimal::new(10000, 2));
        assert_eq!(report.total_pending, Decimal::new(5000, 2));
        assert_eq!(report.total_expected, report.total_collected + report.total_pending);
        assert_eq!(report.clients_by_status["ACTIVE"], 3);
        assert_eq!(report.commissions[0].clients, 1);
        assert_eq!(report.total_commission, Decimal::new(1000, 2));
    }

    #[tokio::test]
    async fn huge_grace_period_never_blocks() {
        let state = AppState::in_memory();
        let master = &state.master_service;
        master.create_client(client_payload("a@casa.com", 4990, None)).await.unwrap();
        master.generate_invoices(may()).await.unwrap();

        let june = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert!(master.block_overdue(june, u32::MAX).await.unwrap().is_empty());
        assert_eq!(master.block_overdue(june, 0).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_client_requires_known_affiliate() {
        let state = AppState::in_memory();
        let master = &state.master_service;
        let (client, _) = master.create_client(client_payload("a@casa.com", 4990, None)).await.unwrap();

        let update = |affiliate_id| UpdateClientPayload {
            name: client.name.clone(),
            plan_id: None,
            affiliate_id,
            monthly_fee: Decimal::new(4990, 2),
            due_day: 10,
        };
        assert!(matches!(
            master.update_client(client.id, update(Some(Uuid::new_v4()))).await,
            Err(AppError::NotFound("affiliate"))
        ));

        let affiliate = master.save_affiliate(affiliate_payload("AXE10")).await.unwrap();
        let updated = master.update_client(client.id, update(Some(affiliate.id))).await.unwrap();
        assert_eq!(updated.affiliate_id, Some(affiliate.id));
    }

    #[tokio::test]
    async fn deleting_a_client_drops_its_invoices() {
        let state = AppState::in_memory();
        let master = &state.master_service;
        let (gone, _) = master.create_client(client_payload("a@casa.com", 10000, None)).await.unwrap();
        master.create_client(client_payload("b@casa.com", 5000, None)).await.unwrap();
        master.generate_invoices(may()).await.unwrap();

        master.delete_client(gone.id).await.unwrap();

        let report = master.report(may()).await.unwrap();
        assert_eq!(report.invoices, 1);
        assert_eq!(report.total_expected, Decimal::new(5000, 2));
        assert!(matches!(
            state.tenant_service.get_client(gone.id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
