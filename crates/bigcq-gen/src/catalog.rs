//! Template catalog: four template families plus the synonym dictionary.
//!
//! Loaded once at startup from a patterns directory and shared read-only by
//! every row. Any missing or malformed file is a fatal configuration error.
//!
//! | family                    | file                                          |
//! |---------------------------|-----------------------------------------------|
//! | SPO                       | `cq_general_templates_spo.json`               |
//! | SPO, equivalence          | `cq_general_templates_spo_equivalence.json`   |
//! | subclass                  | `cq_general_templates_subclass.json`          |
//! | subclass, equivalence     | `cq_general_templates_equivalence.json`       |
//! | synonyms                  | `synonym_classes.json`                        |

use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::category::{Category, CategoryMap};
use crate::synsets::SynonymDictionary;
use crate::CatalogError;

pub const SYNONYMS_FILE: &str = "synonym_classes.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FamilyKind {
    Spo,
    SpoEquivalence,
    Subclass,
    SubclassEquivalence,
}

impl FamilyKind {
    pub const ALL: [FamilyKind; 4] = [
        FamilyKind::Spo,
        FamilyKind::SpoEquivalence,
        FamilyKind::Subclass,
        FamilyKind::SubclassEquivalence,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            FamilyKind::Spo => "cq_general_templates_spo.json",
            FamilyKind::SpoEquivalence => "cq_general_templates_spo_equivalence.json",
            FamilyKind::Subclass => "cq_general_templates_subclass.json",
            FamilyKind::SubclassEquivalence => "cq_general_templates_equivalence.json",
        }
    }
}

/// Ordered templates per category. Categories absent from the file are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateFamily {
    templates: CategoryMap<Vec<String>>,
}

impl TemplateFamily {
    pub fn new(templates: CategoryMap<Vec<String>>) -> Self {
        Self { templates }
    }

    pub fn from_json_str(family: &str, text: &str) -> Result<Self, CatalogError> {
        let map: Map<String, Value> =
            serde_json::from_str(text).map_err(|source| CatalogError::Json {
                what: family.to_string(),
                source,
            })?;
        let mut templates: CategoryMap<Vec<String>> = CategoryMap::default();
        for (key, value) in map {
            let category: Category =
                key.parse()
                    .map_err(|_| CatalogError::UnknownCategory {
                        family: family.to_string(),
                        key: key.clone(),
                    })?;
            let list: Vec<String> =
                serde_json::from_value(value).map_err(|source| CatalogError::Json {
                    what: format!("{family} / {key}"),
                    source,
                })?;
            templates.set(category, list);
        }
        Ok(Self { templates })
    }

    pub fn get(&self, category: Category) -> &[String] {
        self.templates.get(category)
    }

    pub fn template_count(&self) -> usize {
        self.templates.iter().map(|(_, t)| t.len()).sum()
    }
}

/// Where the five resource files live.
#[derive(Debug, Clone)]
pub struct TemplatePaths {
    pub dir: PathBuf,
}

impl TemplatePaths {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn family(&self, kind: FamilyKind) -> PathBuf {
        self.dir.join(kind.file_name())
    }

    pub fn synonyms(&self) -> PathBuf {
        self.dir.join(SYNONYMS_FILE)
    }
}

fn read(path: &Path) -> Result<String, CatalogError> {
    std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Immutable template configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateCatalog {
    pub spo: TemplateFamily,
    pub spo_equivalence: TemplateFamily,
    pub subclass: TemplateFamily,
    pub subclass_equivalence: TemplateFamily,
    pub synonyms: SynonymDictionary,
}

impl TemplateCatalog {
    pub fn load(paths: &TemplatePaths) -> Result<Self, CatalogError> {
        let mut catalog = TemplateCatalog {
            synonyms: SynonymDictionary::load(&paths.synonyms())?,
            ..Default::default()
        };
        for kind in FamilyKind::ALL {
            let path = paths.family(kind);
            if !path.is_file() {
                return Err(CatalogError::MissingFamily {
                    kind: kind.file_name(),
                    path,
                });
            }
            let family = TemplateFamily::from_json_str(kind.file_name(), &read(&path)?)?;
            debug!(
                path = %path.display(),
                templates = family.template_count(),
                "loaded template family"
            );
            *catalog.family_mut(kind) = family;
        }
        info!(
            dir = %paths.dir.display(),
            synsets = catalog.synonyms.len(),
            "template catalog loaded"
        );
        Ok(catalog)
    }

    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, CatalogError> {
        Self::load(&TemplatePaths::new(dir.as_ref()))
    }

    pub fn family(&self, kind: FamilyKind) -> &TemplateFamily {
        match kind {
            FamilyKind::Spo => &self.spo,
            FamilyKind::SpoEquivalence => &self.spo_equivalence,
            FamilyKind::Subclass => &self.subclass,
            FamilyKind::SubclassEquivalence => &self.subclass_equivalence,
        }
    }

    fn family_mut(&mut self, kind: FamilyKind) -> &mut TemplateFamily {
        match kind {
            FamilyKind::Spo => &mut self.spo,
            FamilyKind::SpoEquivalence => &mut self.spo_equivalence,
            FamilyKind::Subclass => &mut self.subclass,
            FamilyKind::SubclassEquivalence => &mut self.subclass_equivalence,
        }
    }

    /// SPO templates, the equivalence variant for two-line axioms.
    pub fn spo_family(&self, is_equivalence: bool) -> &TemplateFamily {
        if is_equivalence {
            &self.spo_equivalence
        } else {
            &self.spo
        }
    }

    /// Subclass templates, the equivalence variant for two-line axioms.
    pub fn subclass_family(&self, is_equivalence: bool) -> &TemplateFamily {
        if is_equivalence {
            &self.subclass_equivalence
        } else {
            &self.subclass
        }
    }
}
