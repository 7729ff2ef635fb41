// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::middleware;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(title = "Brokerage CRM API", description = "CRM de imobiliária: leads, anúncios, visitas e propostas"),
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::get_me,
        handlers::auth::change_password,

        // --- Team ---
        handlers::team::create_member,
        handlers::team::list_members,
        handlers::team::get_member,
        handlers::team::update_member,
        handlers::team::list_permissions,

        // --- Contacts ---
        handlers::contacts::create_contact,
        handlers::contacts::list_contacts,
        handlers::contacts::get_contact,
        handlers::contacts::update_contact,
        handlers::contacts::delete_contact,

        // --- Leads ---
        handlers::leads::create_lead,
        handlers::leads::list_leads,
        handlers::leads::get_lead,
        handlers::leads::update_lead,
        handlers::leads::change_lead_status,
        handlers::leads::assign_lead,
        handlers::leads::delete_lead,

        // --- Seller Leads ---
        handlers::leads::create_seller_lead,
        handlers::leads::list_seller_leads,
        handlers::leads::get_seller_lead,
        handlers::leads::update_seller_lead,
        handlers::leads::change_seller_lead_status,
        handlers::leads::convert_seller_lead,
        handlers::leads::delete_seller_lead,

        // --- Properties ---
        handlers::properties::create_building,
        handlers::properties::list_buildings,
        handlers::properties::get_building,
        handlers::properties::update_building,
        handlers::properties::delete_building,
        handlers::properties::create_unit,
        handlers::properties::list_units,
        handlers::properties::get_unit,
        handlers::properties::update_unit,
        handlers::properties::delete_unit,

        // --- Listings ---
        handlers::listings::create_listing,
        handlers::listings::list_listings,
        handlers::listings::get_listing,
        handlers::listings::update_listing,
        handlers::listings::delete_listing,
        handlers::listings::submit_listing,
        handlers::listings::approve_listing,
        handlers::listings::reject_listing,
        handlers::listings::change_listing_status,
        handlers::listings::add_media,
        handlers::listings::list_media,
        handlers::listings::set_cover,
        handlers::listings::delete_media,
        handlers::documents::listing_brochure,

        // --- Visits ---
        handlers::visits::schedule_visit,
        handlers::visits::list_visits,
        handlers::visits::get_visit,
        handlers::visits::confirm_visit,
        handlers::visits::resend_otp,
        handlers::visits::reschedule_visit,
        handlers::visits::cancel_visit,
        handlers::visits::complete_visit,

        // --- Tours ---
        handlers::visits::create_tour,
        handlers::visits::list_tours,
        handlers::visits::get_tour,
        handlers::visits::attach_visit,
        handlers::visits::detach_visit,
        handlers::visits::change_tour_status,

        // --- Offers ---
        handlers::offers::create_offer,
        handlers::offers::list_offers,
        handlers::offers::get_offer,
        handlers::offers::counter_offer,
        handlers::offers::revise_offer,
        handlers::offers::accept_offer,
        handlers::offers::reject_offer,
        handlers::offers::withdraw_offer,

        // --- Activity ---
        handlers::activity::create_note,
        handlers::activity::list_notes,
        handlers::activity::update_note,
        handlers::activity::delete_note,
        handlers::activity::log_communication,
        handlers::activity::list_communications,
        handlers::activity::create_task,
        handlers::activity::list_tasks,
        handlers::activity::get_task,
        handlers::activity::update_task,
        handlers::activity::change_task_status,
        handlers::activity::delete_task,

        // --- Notifications ---
        handlers::notifications::list_notifications,
        handlers::notifications::unread_count,
        handlers::notifications::mark_read,
        handlers::notifications::mark_all_read,

        // --- Coins ---
        handlers::coins::my_ledger,
        handlers::coins::member_ledger,
        handlers::coins::my_balance,
        handlers::coins::leaderboard,
        handlers::coins::adjust,
        handlers::coins::list_rules,
        handlers::coins::upsert_rule,

        // --- Automations ---
        handlers::automations::create_automation,
        handlers::automations::list_automations,
        handlers::automations::get_automation,
        handlers::automations::update_automation,
        handlers::automations::delete_automation,

        // --- Dashboard ---
        handlers::dashboard::get_dashboard,
    ),
    components(
        schemas(
            // --- Team / Auth ---
            models::team::Role,
            models::team::TeamMember,
            models::team::CreateMemberPayload,
            models::team::UpdateMemberPayload,
            models::team::ChangePasswordPayload,
            models::auth::LoginPayload,
            models::auth::AuthResponse,
            middleware::rbac::PermissionEntry,

            // --- Contacts ---
            models::contact::Contact,
            models::contact::ContactPayload,
            models::contact::UpdateContactPayload,

            // --- Leads ---
            models::lead::LeadSource,
            models::lead::LeadStatus,
            models::lead::SellerLeadStatus,
            models::lead::PropertyType,
            models::lead::Lead,
            models::lead::LeadSummary,
            models::lead::SellerLead,
            models::lead::SellerLeadConversion,
            models::lead::CreateLeadPayload,
            models::lead::UpdateLeadPayload,
            models::lead::LeadStatusPayload,
            models::lead::AssignLeadPayload,
            models::lead::CreateSellerLeadPayload,
            models::lead::UpdateSellerLeadPayload,
            models::lead::SellerLeadStatusPayload,
            models::lead::ConvertSellerLeadPayload,

            // --- Properties ---
            models::property::Furnishing,
            models::property::Building,
            models::property::Unit,
            models::property::BuildingPayload,
            models::property::UnitPayload,
            models::property::UpdateUnitPayload,

            // --- Listings ---
            models::listing::ListingStatus,
            models::listing::MediaKind,
            models::listing::Listing,
            models::listing::MediaItem,
            models::listing::ListingDetail,
            models::listing::MediaPayload,
            models::listing::NewUnitPayload,
            models::listing::CreateListingPayload,
            models::listing::UpdateListingPayload,
            models::listing::RejectListingPayload,
            models::listing::ListingStatusPayload,

            // --- Visits ---
            models::visit::VisitStatus,
            models::visit::InterestLevel,
            models::visit::TourStatus,
            models::visit::Visit,
            models::visit::VisitTour,
            models::visit::TourDetail,
            models::visit::ScheduleVisitPayload,
            models::visit::RescheduleVisitPayload,
            models::visit::CancelVisitPayload,
            models::visit::CompleteVisitPayload,
            models::visit::CreateTourPayload,
            models::visit::AttachVisitPayload,
            models::visit::TourStatusPayload,

            // --- Offers ---
            models::offer::OfferStatus,
            models::offer::Offer,
            models::offer::CreateOfferPayload,
            models::offer::CounterOfferPayload,
            models::offer::ReviseOfferPayload,

            // --- Activity ---
            models::activity::EntityKind,
            models::activity::CommunicationChannel,
            models::activity::CommunicationDirection,
            models::activity::TaskStatus,
            models::activity::TaskPriority,
            models::activity::Note,
            models::activity::Communication,
            models::activity::Task,
            models::activity::CreateNotePayload,
            models::activity::UpdateNotePayload,
            models::activity::CreateCommunicationPayload,
            models::activity::CreateTaskPayload,
            models::activity::UpdateTaskPayload,
            models::activity::TaskStatusPayload,

            // --- Notifications ---
            models::notification::NotificationKind,
            models::notification::Notification,
            models::notification::UnreadCount,
            handlers::notifications::MarkedRead,

            // --- Coins ---
            models::coins::CreditRule,
            models::coins::CreditLedgerEntry,
            models::coins::LeaderboardEntry,
            models::coins::CoinBalance,
            models::coins::AdjustCoinsPayload,
            models::coins::UpsertRulePayload,

            // --- Automations ---
            models::automation::AutomationEvent,
            models::automation::AutomationAction,
            models::automation::AutomationRule,
            models::automation::CreateAutomationPayload,
            models::automation::UpdateAutomationPayload,

            // --- Dashboard ---
            models::dashboard::StatusCount,
            models::dashboard::AdminDashboard,
            models::dashboard::BuyerAgentDashboard,
            models::dashboard::ListingAgentDashboard,
            models::dashboard::FieldAgentDashboard,
            models::dashboard::RoleDashboard,
        )
    ),
    tags(
        (name = "Auth", description = "Login e dados do usuário"),
        (name = "Team", description = "Equipe, papéis e permissões"),
        (name = "Contacts", description = "Contatos de compradores e proprietários"),
        (name = "Leads", description = "Funil de compradores"),
        (name = "Seller Leads", description = "Captação de imóveis"),
        (name = "Properties", description = "Empreendimentos e unidades"),
        (name = "Listings", description = "Anúncios, mídias e aprovação de catálogo"),
        (name = "Visits", description = "Agendamento e conclusão de visitas com OTP"),
        (name = "Tours", description = "Roteiros de visitas"),
        (name = "Offers", description = "Propostas e contrapropostas"),
        (name = "Activity", description = "Notas, comunicações e tarefas"),
        (name = "Notifications", description = "Notificações internas"),
        (name = "Coins", description = "Moedas de gamificação"),
        (name = "Automations", description = "Regras disparadas por eventos"),
        (name = "Dashboard", description = "Painéis por papel")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_workflow_paths_and_bearer_scheme() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/v1/visits/{id}/complete"));
        assert!(doc.paths.paths.contains_key("/api/v1/offers/{id}/accept"));
        assert!(doc.paths.paths.contains_key("/api/v1/seller-leads/{id}/convert"));

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("api_jwt"));
    }
}
