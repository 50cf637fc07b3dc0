pub mod attachment_service;
pub mod dashboard_service;
pub mod purchase_service;
pub mod query_service;

pub use attachment_service::AttachmentService;
pub use dashboard_service::DashboardService;
pub use purchase_service::PurchaseService;
pub use query_service::QueryService;

pub use crate::errors::{Committed, CoreError, CoreResult};
