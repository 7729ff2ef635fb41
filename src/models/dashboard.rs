// src/models/dashboard.rs

use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::{
    coins::LeaderboardEntry,
    lead::LeadSummary,
    offer::Offer,
    team::Role,
    visit::{Visit, VisitTour},
};

// Contagem agrupada por status (o status vem como texto do SQL)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    #[schema(example = "qualified")]
    pub status: String,
    pub count: i64,
}

// 1. Visão do administrador (a imobiliária inteira)
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminDashboard {
    pub leads_by_status: Vec<StatusCount>,
    pub seller_leads_by_status: Vec<StatusCount>,
    pub listings_by_status: Vec<StatusCount>,
    pub visits_today: i64,
    pub visits_completed_this_week: i64,
    pub open_offers: i64,
    pub pending_approvals: i64,
    pub leaderboard: Vec<LeaderboardEntry>,
}

// 2. Corretor de compradores
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BuyerAgentDashboard {
    pub my_leads_by_status: Vec<StatusCount>,
    pub upcoming_visits: Vec<Visit>,
    pub open_offers: Vec<Offer>,
    pub follow_ups_due_today: Vec<LeadSummary>,
    pub coin_balance: i64,
}

// 3. Captador
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListingAgentDashboard {
    pub my_listings_by_status: Vec<StatusCount>,
    pub my_seller_leads_by_status: Vec<StatusCount>,
    pub open_offers_on_my_listings: Vec<Offer>,
    pub my_pending_approvals: i64,
    pub coin_balance: i64,
}

// 4. Corretor de campo
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldAgentDashboard {
    pub visits_today: Vec<Visit>,
    pub upcoming_tours: Vec<VisitTour>,
    pub completed_this_week: i64,
    pub coin_balance: i64,
}

/// O painel devolvido depende do papel de quem chama
#[derive(Debug, Serialize, ToSchema)]
#[serde(tag = "role", content = "dashboard", rename_all = "snake_case")]
pub enum RoleDashboard {
    Admin(AdminDashboard),
    BuyerAgent(BuyerAgentDashboard),
    ListingAgent(ListingAgentDashboard),
    FieldAgent(FieldAgentDashboard),
}

impl RoleDashboard {
    pub fn role(&self) -> Role {
        match self {
            RoleDashboard::Admin(_) => Role::Admin,
            RoleDashboard::BuyerAgent(_) => Role::BuyerAgent,
            RoleDashboard::ListingAgent(_) => Role::ListingAgent,
            RoleDashboard::FieldAgent(_) => Role::FieldAgent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dashboard_is_tagged_with_role() {
        let dash = RoleDashboard::FieldAgent(FieldAgentDashboard {
            visits_today: vec![],
            upcoming_tours: vec![],
            completed_this_week: 3,
            coin_balance: 40,
        });
        assert_eq!(dash.role(), Role::FieldAgent);

        let json = serde_json::to_value(&dash).unwrap();
        assert_eq!(json["role"], "field_agent");
        assert_eq!(json["dashboard"]["completedThisWeek"], 3);
        assert_eq!(json["dashboard"]["coinBalance"], 40);
    }
}
