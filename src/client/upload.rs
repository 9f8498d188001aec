//! Attachment checks run the moment a file is picked.
//!
//! A rejected file is cleared from the input, so it never reaches the
//! submitted form; the server enforces the same size cap on its side.

use std::sync::Arc;

use tracing::info;

use super::toast::{Severity, ToastNotifier};

/// Largest accepted attachment, 16 MiB.
pub const MAX_UPLOAD_BYTES: u64 = 16 * 1024 * 1024;

const BYTES_PER_MIB: f64 = 1024.0 * 1024.0;

/// Attachment types the help desk stores.
pub const ALLOWED_EXTENSIONS: &[&str] = &["txt", "pdf", "png", "jpg", "jpeg", "gif", "doc", "docx", "xls", "xlsx"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub size_bytes: u64,
}

impl SelectedFile {
    #[must_use]
    pub fn new(name: impl Into<String>, size_bytes: u64) -> Self {
        Self { name: name.into(), size_bytes }
    }

    /// Lower-cased text after the last dot, if any.
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
    }
}

pub trait FileInputView: Send + Sync {
    fn clear_selection(&self);
}

pub trait UploadPreviewView: Send + Sync {
    fn show(&self, name: &str, size_label: &str);
    fn hide(&self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadCheck {
    /// Nothing selected; the preview is hidden.
    Empty,
    Accepted { size_label: String },
    TooLarge { size_label: String },
    DisallowedType { extension: Option<String> },
}

/// Size in MiB to two decimals, e.g. `"16.00 MB"`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mib_label(size_bytes: u64) -> String {
    format!("{:.2} MB", size_bytes as f64 / BYTES_PER_MIB)
}

/// Human-readable size with one decimal, stepping by 1024 up to GB.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_file_size(size_bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    if size_bytes == 0 {
        return "0 B".to_owned();
    }

    let mut size = size_bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{size:.1} {}", UNITS[unit])
}

// =============================================================================
// GUARD
// =============================================================================

pub struct FileUploadGuard {
    input: Arc<dyn FileInputView>,
    preview: Option<Arc<dyn UploadPreviewView>>,
    toasts: ToastNotifier,
    max_bytes: u64,
    allowed_extensions: Option<&'static [&'static str]>,
}

impl FileUploadGuard {
    #[must_use]
    pub fn new(input: Arc<dyn FileInputView>, toasts: ToastNotifier) -> Self {
        Self { input, preview: None, toasts, max_bytes: MAX_UPLOAD_BYTES, allowed_extensions: None }
    }

    #[must_use]
    pub fn with_preview(mut self, preview: Arc<dyn UploadPreviewView>) -> Self {
        self.preview = Some(preview);
        self
    }

    /// Also reject files whose extension is not in `extensions`.
    #[must_use]
    pub fn with_allowed_extensions(mut self, extensions: &'static [&'static str]) -> Self {
        self.allowed_extensions = Some(extensions);
        self
    }

    /// Check the file just picked. `None` means the selection was emptied.
    pub fn on_select(&self, file: Option<&SelectedFile>) -> UploadCheck {
        let Some(file) = file else {
            self.hide_preview();
            return UploadCheck::Empty;
        };

        let size_label = mib_label(file.size_bytes);
        if file.size_bytes > self.max_bytes {
            info!(name = %file.name, size_bytes = file.size_bytes, "attachment over size limit");
            self.reject(&format!(
                "File size exceeds {}MB limit. Please choose a smaller file.",
                self.max_bytes / (1024 * 1024)
            ));
            return UploadCheck::TooLarge { size_label };
        }

        if let Some(allowed) = self.allowed_extensions {
            let extension = file.extension();
            if !extension.as_deref().is_some_and(|ext| allowed.contains(&ext)) {
                info!(name = %file.name, "attachment type not allowed");
                self.reject("Only documents and images are allowed!");
                return UploadCheck::DisallowedType { extension };
            }
        }

        if let Some(preview) = &self.preview {
            preview.show(&file.name, &size_label);
        }
        UploadCheck::Accepted { size_label }
    }

    fn reject(&self, message: &str) {
        self.input.clear_selection();
        self.hide_preview();
        self.toasts.notify(message, Severity::Warning);
    }

    fn hide_preview(&self) {
        if let Some(preview) = &self.preview {
            preview.hide();
        }
    }
}

#[cfg(test)]
#[path = "upload_test.rs"]
mod tests;
