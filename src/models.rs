pub mod activity;
pub mod auth;
pub mod automation;
pub mod coins;
pub mod contact;
pub mod dashboard;
pub mod lead;
pub mod listing;
pub mod notification;
pub mod offer;
pub mod property;
pub mod team;
pub mod visit;
