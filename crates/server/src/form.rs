//! `multipart/form-data` request bodies.
//!
//! Problem and solution forms are submitted as multipart requests, since
//! they carry uploaded attachments next to the plain text fields.

use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, Multipart},
};
use common::storage::{sanitize_filename, FilenameError};

/// Name of the multipart field that carries attachments.
pub const FILES_FIELD: &str = "files";

/// A single uploaded file.
pub struct Upload {
    /// Sanitized file name.
    pub filename: String,

    pub data: Bytes,
}

/// Collected multipart request body.
pub struct MultipartForm {
    fields: HashMap<String, String>,
    files: Vec<Upload>,
}

impl MultipartForm {
    /// Read every field of a multipart request.
    ///
    /// Fields that carry a file name are collected as uploads, empty
    /// file inputs without a name are skipped.
    pub async fn read<E>(mut data: Multipart) -> Result<Self, E>
    where
        E: From<MultipartError> + From<FilenameError>,
    {
        let mut fields = HashMap::new();
        let mut files = Vec::new();

        while let Some(field) = data.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match field.file_name().map(str::to_string) {
                Some(filename) if name == FILES_FIELD => {
                    let data = field.bytes().await?;

                    if filename.is_empty() && data.is_empty() {
                        continue;
                    }

                    files.push(Upload {
                        filename: sanitize_filename(&filename)?,
                        data,
                    });
                }
                Some(_) => continue,
                None => {
                    fields.insert(name, field.text().await?);
                }
            }
        }

        Ok(MultipartForm { fields, files })
    }

    /// Take a trimmed text field value.
    pub fn take(&mut self, name: &str) -> Option<String> {
        self.fields
            .remove(name)
            .map(|value| value.trim().to_string())
    }

    /// Take every uploaded file.
    pub fn take_files(&mut self) -> Vec<Upload> {
        std::mem::take(&mut self.files)
    }
}
