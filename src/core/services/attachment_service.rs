//! Attachment ingestion for purchases and individual line items.

use crate::domain::{Attachment, FileUpload};
use crate::errors::CoreResult;
use crate::store::PurchaseStore;

pub struct AttachmentService;

impl AttachmentService {
    /// Appends an uploaded file to the purchase.
    pub fn add_to_purchase(
        store: &PurchaseStore,
        id: &str,
        file: &FileUpload,
    ) -> CoreResult<Attachment> {
        store.add_attachment(id, file)
    }

    /// Appends an uploaded file to one line item. An unknown line-item id is
    /// given a placeholder item instead of failing the upload.
    pub fn add_to_line_item(
        store: &PurchaseStore,
        id: &str,
        line_item_id: &str,
        file: &FileUpload,
    ) -> CoreResult<Attachment> {
        store.add_line_item_attachment(id, line_item_id, file)
    }
}
