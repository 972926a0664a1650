//! HTTP endpoints, one module per resource

pub mod backup_data;
pub mod dashboard;
pub mod notification;
pub mod route;
pub mod session;
pub mod tanda_terima;
pub mod tiket;
