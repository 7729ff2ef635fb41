pub mod activity_service;
pub mod auth;
pub mod automation_service;
pub mod coin_service;
pub mod contact_service;
pub mod dashboard_service;
pub mod document_service;
pub mod lead_service;
pub mod listing_service;
pub mod notification_service;
pub mod offer_service;
pub mod property_service;
pub mod seller_lead_service;
pub mod team_service;
pub mod visit_service;
