pub mod activity;
pub mod auth;
pub mod automations;
pub mod coins;
pub mod contacts;
pub mod dashboard;
pub mod documents;
pub mod leads;
pub mod listings;
pub mod notifications;
pub mod offers;
pub mod properties;
pub mod team;
pub mod visits;
