//! Shared HTTP constants (headers, form fields, client-facing messages).

pub(crate) const HEADER_REQUEST_ID: &str = "x-request-id";

pub(crate) const UPLOAD_FIELD: &str = "markdown_file";
pub(crate) const MARKDOWN_EXTENSION: &str = ".md";

pub(crate) const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub(crate) const DOWNLOAD_DISPOSITION: &str =
    "attachment; filename=\"converted_document.docx\"";

pub(crate) const MSG_NO_FILE_UPLOADED: &str = "No file uploaded";
pub(crate) const MSG_ONLY_MARKDOWN: &str = "Only .md files are allowed";
pub(crate) const MSG_NO_COMPLETED_CONVERSION: &str = "No completed conversion available";
pub(crate) const MSG_CONVERSION_NOT_FOUND: &str = "Conversion not found";
pub(crate) const MSG_CANCELLED: &str = "Conversion cancelled before completion";
pub(crate) const MSG_EMPTY_OUTPUT: &str = "converter reported success but produced no output";
