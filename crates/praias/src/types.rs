use std::fmt::Display;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// A fetched page: the HTTP status plus whatever body came back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    pub status: u16,
    pub body: String,
}

impl RawDocument {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn failed(status: u16) -> Self {
        Self {
            status,
            body: String::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Municipality {
    pub name: String,
    pub beaches: Vec<String>,
}

impl Display for Municipality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.beaches.len() {
            0 => write!(f, "{} (no beaches listed)", self.name),
            1 => write!(f, "{} (1 beach)", self.name),
            n => write!(f, "{} ({} beaches)", self.name, n),
        }
    }
}

/// Municipalities in the order their headings first appear in the article.
///
/// Lookups are linear; the target page has well under a hundred sections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BeachCatalog {
    municipalities: Vec<Municipality>,
}

impl BeachCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entry for `name`, creating an empty one at the end if this
    /// is the first time the name is seen.
    pub fn open(&mut self, name: &str) -> &mut Municipality {
        let idx = match self.municipalities.iter().position(|m| m.name == name) {
            Some(idx) => idx,
            None => {
                self.municipalities.push(Municipality {
                    name: name.to_string(),
                    beaches: Vec::new(),
                });
                self.municipalities.len() - 1
            }
        };
        &mut self.municipalities[idx]
    }

    /// Like [`open`](Self::open), but an existing entry loses its beaches. The
    /// entry keeps the position where the name was first seen.
    pub fn reset(&mut self, name: &str) -> &mut Municipality {
        let municipality = self.open(name);
        municipality.beaches.clear();
        municipality
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.municipalities
            .iter()
            .find(|m| m.name == name)
            .map(|m| m.beaches.as_slice())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.municipalities.iter().map(|m| m.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Municipality> {
        self.municipalities.iter()
    }

    pub fn len(&self) -> usize {
        self.municipalities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.municipalities.is_empty()
    }
}

impl Serialize for BeachCatalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.municipalities.len()))?;
        for municipality in &self.municipalities {
            map.serialize_entry(&municipality.name, &municipality.beaches)?;
        }
        map.end()
    }
}

/// One structural event from the article body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Heading { level: u8, text: String },
    List { items: Vec<String> },
}

/// Result of one extraction pass. An empty summary together with an empty
/// catalog means the page could not be fetched or had no article body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Extraction {
    pub summary: String,
    pub catalog: BeachCatalog,
}

impl Extraction {
    pub fn failure() -> Self {
        Self::default()
    }

    pub fn is_failure(&self) -> bool {
        self.summary.is_empty()
    }
}

impl Display for Extraction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.summary)?;
        writeln!(f)?;
        for (i, municipality) in self.catalog.iter().enumerate() {
            writeln!(f, "{:>3}. {}", i + 1, municipality)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_document_success_range() {
        assert!(RawDocument::new(200, "<html></html>").is_success());
        assert!(RawDocument::new(204, "").is_success());
        assert!(!RawDocument::failed(404).is_success());
        assert!(!RawDocument::failed(503).is_success());
        assert!(!RawDocument::new(301, "moved").is_success());
    }

    #[test]
    fn test_catalog_open_reuses_existing_entry() {
        let mut catalog = BeachCatalog::new();
        catalog.open("Recife").beaches.push("Boa Viagem".into());
        catalog.open("Olinda");
        catalog.open("Recife").beaches.push("Pina".into());

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["Recife", "Olinda"]);
        assert_eq!(
            catalog.get("Recife"),
            Some(&["Boa Viagem".to_string(), "Pina".to_string()][..])
        );
        assert_eq!(catalog.get("Olinda"), Some(&[] as &[String]));
        assert!(catalog.get("Ipojuca").is_none());
    }

    #[test]
    fn test_catalog_reset_clears_in_place() {
        let mut catalog = BeachCatalog::new();
        catalog.open("Recife").beaches.push("Pina".into());
        catalog.open("Olinda").beaches.push("Milagres".into());

        catalog.reset("Recife").beaches.push("Boa Viagem".into());
        catalog.reset("Goiana");

        assert_eq!(
            catalog.names().collect::<Vec<_>>(),
            vec!["Recife", "Olinda", "Goiana"]
        );
        assert_eq!(catalog.get("Recife"), Some(&["Boa Viagem".to_string()][..]));
        assert_eq!(catalog.get("Olinda"), Some(&["Milagres".to_string()][..]));
        assert_eq!(catalog.get("Goiana"), Some(&[] as &[String]));
    }

    #[test]
    fn test_catalog_serializes_in_document_order() {
        let mut catalog = BeachCatalog::new();
        catalog.open("Tamandaré").beaches.push("Carneiros".into());
        catalog.open("Ipojuca").beaches.push("Porto de Galinhas".into());
        catalog.open("Goiana");

        let json = serde_json::to_string(&catalog).expect("Failed to serialize");
        assert_eq!(
            json,
            r#"{"Tamandaré":["Carneiros"],"Ipojuca":["Porto de Galinhas"],"Goiana":[]}"#
        );
    }

    #[test]
    fn test_extraction_failure_sentinel() {
        let failure = Extraction::failure();
        assert!(failure.is_failure());
        assert!(failure.catalog.is_empty());

        let ok = Extraction {
            summary: "Lista de praias.".into(),
            catalog: BeachCatalog::new(),
        };
        assert!(!ok.is_failure());
    }

    #[test]
    fn test_municipality_display() {
        let mut catalog = BeachCatalog::new();
        catalog.open("Recife").beaches.push("Pina".into());
        catalog.open("Olinda");
        let rendered: Vec<String> = catalog.iter().map(|m| m.to_string()).collect();
        assert_eq!(rendered, vec!["Recife (1 beach)", "Olinda (no beaches listed)"]);
    }
}
