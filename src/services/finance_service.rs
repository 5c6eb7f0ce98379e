// src/services/finance_service.rs

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::{dates::Month, error::AppError},
    db::{DonationRepository, MemberRepository, SaleRepository, Scope},
    models::{
        canteen::CanteenSale,
        finance::{
            Donation, DonationKind, FeeCategory, MemberFeeLine, MonthlyReport, SaveDonationPayload,
        },
        members::{Member, MemberStatus, PaymentStatus},
        settings::FeeSchedule,
    },
    services::{document_service::DocumentService, settings_service::SettingsService},
};

/// Quanto o membro deve por mês. Médium que também é cambone paga só a de médium.
pub fn fee_for(member: &Member, fees: &FeeSchedule) -> Option<(FeeCategory, Decimal)> {
    if member.is_medium {
        Some((FeeCategory::Medium, fees.medium_fee))
    } else if member.is_cambone {
        Some((FeeCategory::Cambone, fees.cambone_fee))
    } else {
        None
    }
}

/// Conciliação do mês. Isentos aparecem nas linhas mas ficam fora do previsto.
pub fn build_monthly_report(
    month: Month,
    fees: &FeeSchedule,
    members: &[Member],
    donations: &[Donation],
    sales: &[CanteenSale],
) -> MonthlyReport {
    let key = month.key();

    let mut lines: Vec<MemberFeeLine> = members
        .iter()
        .filter(|m| m.status == MemberStatus::Active)
        .filter_map(|m| {
            let (category, amount) = fee_for(m, fees)?;
            let status = m
                .monthly_payments
                .get(&key)
                .copied()
                .unwrap_or(PaymentStatus::Pending);
            Some(MemberFeeLine {
                member_id: m.id,
                member_name: m.name.clone(),
                category,
                amount,
                status,
            })
        })
        .collect();
    lines.sort_by(|a, b| a.member_name.cmp(&b.member_name));

    let mut total_collected = Decimal::ZERO;
    let mut total_pending = Decimal::ZERO;
    let (mut paid_count, mut pending_count, mut exempt_count) = (0, 0, 0);
    for line in &lines {
        match line.status {
            PaymentStatus::Paid => {
                total_collected += line.amount;
                paid_count += 1;
            }
            PaymentStatus::Pending => {
                total_pending += line.amount;
                pending_count += 1;
            }
            PaymentStatus::Exempt => exempt_count += 1,
        }
    }

    let donations_total = donations
        .iter()
        .filter(|d| d.kind == DonationKind::Money && month.contains(d.date))
        .map(|d| d.amount)
        .sum();
    let canteen_total = sales
        .iter()
        .filter(|s| month.contains(s.sold_at.date_naive()))
        .map(|s| s.total)
        .sum();

    MonthlyReport {
        month: key,
        total_expected: total_collected + total_pending,
        total_collected,
        total_pending,
        paid_count,
        pending_count,
        exempt_count,
        lines,
        donations_total,
        canteen_total,
    }
}

#[derive(Clone)]
pub struct FinanceService {
    member_repo: MemberRepository,
    donation_repo: DonationRepository,
    sale_repo: SaleRepository,
    settings_service: SettingsService,
    document_service: DocumentService,
}

impl FinanceService {
    pub fn new(
        member_repo: MemberRepository,
        donation_repo: DonationRepository,
        sale_repo: SaleRepository,
        settings_service: SettingsService,
        document_service: DocumentService,
    ) -> Self {
        Self { member_repo, donation_repo, sale_repo, settings_service, document_service }
    }

    // --- DOAÇÕES ---

    pub async fn list_donations(
        &self,
        client_id: Uuid,
        month: Option<Month>,
    ) -> Result<Vec<Donation>, AppError> {
        let mut donations = self.donation_repo.get_all(Scope::Tenant(client_id)).await?;
        if let Some(month) = month {
            donations.retain(|d| month.contains(d.date));
        }
        donations.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(donations)
    }

    pub async fn save_donation(
        &self,
        client_id: Uuid,
        payload: SaveDonationPayload,
    ) -> Result<Donation, AppError> {
        let scope = Scope::Tenant(client_id);
        let existing = match payload.id {
            Some(id) => self.donation_repo.find(scope, id).await?,
            None => None,
        };

        let donation = Donation {
            id: payload.id.unwrap_or_else(Uuid::new_v4),
            member_id: payload.member_id,
            donor_name: payload.donor_name,
            kind: payload.kind,
            amount: payload.amount,
            description: payload.description,
            date: payload.date,
            created_at: existing.map(|d| d.created_at).unwrap_or_else(Utc::now),
        };

        self.donation_repo.save(scope, &donation).await?;
        Ok(donation)
    }

    pub async fn delete_donation(&self, client_id: Uuid, donation_id: Uuid) -> Result<(), AppError> {
        self.donation_repo
            .delete_existing(Scope::Tenant(client_id), donation_id)
            .await
    }

    // --- RELATÓRIOS ---

    pub async fn monthly_report(&self, client_id: Uuid, month: Month) -> Result<MonthlyReport, AppError> {
        let scope = Scope::Tenant(client_id);
        let config = self.settings_service.get_settings(client_id).await?;
        let members = self.member_repo.get_all(scope).await?;
        let donations = self.donation_repo.get_all(scope).await?;
        let sales = self.sale_repo.get_all(scope).await?;

        Ok(build_monthly_report(month, &config.fees, &members, &donations, &sales))
    }

    pub async fn report_pdf(&self, client_id: Uuid, month: Month) -> Result<Vec<u8>, AppError> {
        let config = self.settings_service.get_settings(client_id).await?;
        let report = self.monthly_report(client_id, month).await?;

        tracing::info!("🧾 Gerando relatório financeiro de {}", report.month);
        self.document_service.monthly_report_pdf(&config, &report)
    }
}
