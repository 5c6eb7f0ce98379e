pub mod auth;
pub mod canteen;
pub mod courses;
pub mod dashboard;
pub mod email;
pub mod events;
pub mod finance;
pub mod id_cards;
pub mod inventory;
pub mod master;
pub mod members;
pub mod settings;
pub mod tenancy;
