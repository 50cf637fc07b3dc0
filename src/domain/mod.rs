//! Canonical purchase domain models. All external input is normalized into
//! these types before it reaches the record store.

pub mod attachment;
pub mod line_item;
pub mod merchant;
pub mod purchase;
pub mod warranty;

pub use attachment::{Attachment, AttachmentKind, FileUpload};
pub use line_item::LineItem;
pub use merchant::{Merchant, MerchantRegistry, GENERIC_MERCHANT_ID};
pub use purchase::{Amounts, ExtractStatus, Purchase};
pub use warranty::{Warranty, WarrantyLevel, WarrantyStatus, WarrantyType};
