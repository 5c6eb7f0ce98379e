pub mod auth;
pub mod backup;
pub mod canteen;
pub mod courses;
pub mod dashboard;
pub mod documents;
pub mod email;
pub mod events;
pub mod finance;
pub mod inventory;
pub mod master;
pub mod members;
pub mod rbac;
pub mod settings;
