use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::console::Console;

/// Reference table: (name, effectiveness, difficulty).
const REFERENCE: [(&str, u32, u32); 8] = [
    ("Phishing", 8, 3),
    ("Pretexting", 7, 4),
    ("Baiting", 6, 2),
    ("Quid Pro Quo", 5, 3),
    ("Tailgating", 4, 1),
    ("Impersonation", 9, 6),
    ("Vishing", 7, 4),
    ("Watering Hole", 6, 5),
];

/// Named social engineering method with fixed scores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Technique {
    /// Catalog name.
    pub name: String,
    /// Effectiveness in [1,10].
    pub effectiveness: u32,
    /// Difficulty in [1,10].
    pub difficulty: u32,
}

/// Static technique catalog, ordered as the reference table.
#[derive(Debug, Clone)]
pub struct TechniqueCatalog {
    entries: IndexMap<String, Technique>,
}

impl TechniqueCatalog {
    /// Materializes the reference table.
    #[must_use]
    pub fn reference() -> Self {
        let entries = REFERENCE
            .iter()
            .map(|&(name, effectiveness, difficulty)| {
                (
                    name.to_string(),
                    Technique {
                        name: name.to_string(),
                        effectiveness,
                        difficulty,
                    },
                )
            })
            .collect();
        Self { entries }
    }

    /// Loads the catalog and reports its size on the console.
    pub fn analyze(console: &mut Console) -> Self {
        console.line("[+] Analyzing social engineering techniques...");
        let catalog = Self::reference();
        console.line(format!("    [+] Analyzed {} techniques", catalog.len()));
        catalog
    }

    /// Looks up a technique by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Technique> {
        self.entries.get(name)
    }

    /// Number of techniques.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Techniques in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Technique> {
        self.entries.values()
    }

    /// Owned copy in catalog order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Technique> {
        self.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_matches_reference_table() {
        let catalog = TechniqueCatalog::reference();
        assert_eq!(catalog.len(), 8);
        let triples: Vec<_> = catalog
            .iter()
            .map(|t| (t.name.as_str(), t.effectiveness, t.difficulty))
            .collect();
        assert_eq!(
            triples,
            vec![
                ("Phishing", 8, 3),
                ("Pretexting", 7, 4),
                ("Baiting", 6, 2),
                ("Quid Pro Quo", 5, 3),
                ("Tailgating", 4, 1),
                ("Impersonation", 9, 6),
                ("Vishing", 7, 4),
                ("Watering Hole", 6, 5),
            ]
        );
    }

    #[test]
    fn catalog_is_identical_across_loads() {
        assert_eq!(
            TechniqueCatalog::reference().to_vec(),
            TechniqueCatalog::reference().to_vec()
        );
    }

    #[test]
    fn lookup_by_name() {
        let catalog = TechniqueCatalog::reference();
        let impersonation = catalog.get("Impersonation").unwrap();
        assert_eq!((impersonation.effectiveness, impersonation.difficulty), (9, 6));
        assert!(catalog.get("Smishing").is_none());
    }

    #[test]
    fn analyze_reports_count() {
        let mut console = Console::captured();
        let catalog = TechniqueCatalog::analyze(&mut console);
        assert!(!catalog.is_empty());
        assert_eq!(console.lines()[1], "    [+] Analyzed 8 techniques");
    }
}
