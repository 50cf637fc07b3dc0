use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// File attached to a purchase or a line item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attachment {
    pub id: String,
    pub filename: String,
    #[serde(rename = "type")]
    pub kind: AttachmentKind,
    pub size: u64,
    pub url: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Image,
    Pdf,
    File,
}

impl AttachmentKind {
    /// Infers the attachment kind from the declared media type first, the
    /// filename extension second.
    pub fn infer(media_type: &str, filename: &str) -> Self {
        if media_type.starts_with("image") {
            AttachmentKind::Image
        } else if filename.to_lowercase().ends_with(".pdf") {
            AttachmentKind::Pdf
        } else {
            AttachmentKind::File
        }
    }
}

/// Incoming file descriptor handed to attachment ingestion.
#[derive(Debug, Clone, Default)]
pub struct FileUpload {
    pub filename: String,
    pub media_type: String,
    pub size: u64,
}

impl FileUpload {
    pub fn new(filename: impl Into<String>, media_type: impl Into<String>, size: u64) -> Self {
        Self {
            filename: filename.into(),
            media_type: media_type.into(),
            size,
        }
    }
}

impl Attachment {
    /// Builds an attachment for an upload, scoped under the owning record id.
    pub fn from_upload(scope: &str, file: &FileUpload) -> Self {
        let kind = AttachmentKind::infer(&file.media_type, &file.filename);
        let code = Uuid::new_v4().simple().to_string();
        let id = format!("{}-u-{}", scope, &code[..6]);
        let url = match kind {
            AttachmentKind::Image => {
                format!("https://placehold.co/800x600?text={}", file.filename)
            }
            _ => "https://www.w3.org/WAI/ER/tests/xhtml/testfiles/resources/pdf/dummy.pdf".into(),
        };
        Self {
            id,
            filename: file.filename.clone(),
            kind,
            size: file.size,
            url,
        }
    }
}
