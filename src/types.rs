//! Shared types passed between pipeline stages.
//!
//! Discovery produces [`PageDescriptor`]s; the plan builder consumes them.
//! Both stages also serialize these into CLI output, so field names are stable.

use crate::naming;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One buildable page: an HTML template plus the script that drives it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDescriptor {
    /// Nesting group (the module directory). Absent in flat layouts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_name: Option<String>,
    /// Template file name without extension (nested) or directory name (flat).
    pub page_id: String,
    pub template_path: PathBuf,
    pub script_path: PathBuf,
}

impl PageDescriptor {
    /// Entry key of this page (see [`naming::page_entry_key`]).
    pub fn entry_key(&self) -> String {
        naming::page_entry_key(self.module_name.as_deref(), &self.page_id)
    }

    /// Output file name of the generated page.
    pub fn html_filename(&self, folder_as_name: bool) -> String {
        naming::page_html_filename(self.module_name.as_deref(), &self.page_id, folder_as_name)
    }
}
