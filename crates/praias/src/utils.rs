use serde::Serialize;

use crate::session::SelectionPayload;
use crate::types::BeachCatalog;

pub const BUTTONS_PER_ROW: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Button {
    pub label: String,
    pub payload: String,
}

impl Button {
    pub fn for_municipality(name: &str) -> Self {
        Self {
            label: name.to_string(),
            payload: SelectionPayload::encode(name),
        }
    }
}

/// One button per municipality, in catalog order, laid out two per row.
pub fn keyboard_rows(catalog: &BeachCatalog) -> Vec<Vec<Button>> {
    let buttons: Vec<Button> = catalog.names().map(Button::for_municipality).collect();
    buttons
        .chunks(BUTTONS_PER_ROW)
        .map(|row| row.to_vec())
        .collect()
}

#[derive(Debug)]
pub struct CatalogStats {
    pub municipalities: usize,
    pub empty_municipalities: usize,
    pub beaches: usize,
}

impl CatalogStats {
    pub fn from_catalog(catalog: &BeachCatalog) -> CatalogStats {
        CatalogStats {
            municipalities: catalog.len(),
            empty_municipalities: catalog.iter().filter(|m| m.beaches.is_empty()).count(),
            beaches: catalog.iter().map(|m| m.beaches.len()).sum(),
        }
    }
}

impl std::fmt::Display for CatalogStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\nStatistics:")?;
        writeln!(f, "  Municipalities:             {}", self.municipalities)?;
        writeln!(
            f,
            "  Without listed beaches:     {}",
            self.empty_municipalities
        )?;
        writeln!(f, "  Beaches:                    {}", self.beaches)
    }
}
