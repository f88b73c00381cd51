//! Bulk stock import.
//!
//! Each entry goes through [`StockScreen::submit`] exactly as if typed into
//! the form, so imported items obey the same validation and name rules.

use stockroom_core::{StockForm, StockItemId};
use tracing::{info, warn};

use crate::error::AppError;
use crate::screens::StockScreen;
use crate::store::DocumentStore;

/// Per-entry outcome of an import.
#[derive(Debug, Default)]
pub struct ImportReport {
    /// Names and identifiers of created items.
    pub created: Vec<(String, StockItemId)>,
    /// Names of rejected entries with the reason.
    pub failed: Vec<(String, AppError)>,
}

impl ImportReport {
    /// Whether every entry was created.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Submit every form in order, continuing past failures.
///
/// Leaves edit mode first so every entry creates a new item.
pub async fn import_forms<S: DocumentStore>(
    screen: &mut StockScreen<S>,
    forms: Vec<StockForm>,
) -> ImportReport {
    screen.cancel_edit();
    let mut report = ImportReport::default();
    for form in forms {
        let name = form.name.trim().to_owned();
        *screen.form_mut() = form;
        match screen.submit().await {
            Ok(id) => report.created.push((name, id)),
            Err(e) => {
                warn!(%name, error = %e, "Skipping import entry");
                screen.form_mut().clear();
                report.failed.push((name, e));
            }
        }
    }
    info!(
        created = report.created.len(),
        failed = report.failed.len(),
        "Import finished"
    );
    report
}
