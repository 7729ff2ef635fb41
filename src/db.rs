pub mod activity_repo;
pub use activity_repo::ActivityRepository;
pub mod automation_repo;
pub use automation_repo::AutomationRepository;
pub mod coin_repo;
pub use coin_repo::CoinRepository;
pub mod contact_repo;
pub use contact_repo::ContactRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
pub mod lead_repo;
pub use lead_repo::LeadRepository;
pub mod listing_repo;
pub use listing_repo::ListingRepository;
pub mod notification_repo;
pub use notification_repo::NotificationRepository;
pub mod offer_repo;
pub use offer_repo::OfferRepository;
pub mod property_repo;
pub use property_repo::PropertyRepository;
pub mod seller_lead_repo;
pub use seller_lead_repo::SellerLeadRepository;
pub mod team_repo;
pub use team_repo::TeamRepository;
pub mod visit_repo;
pub use visit_repo::VisitRepository;
