use std::collections::HashMap;
use std::path::Path;

use crate::schema::{FrameworkContent, Section};
use crate::ContentError;

/// All loaded framework declarations, keyed by framework slug.
/// Layout on disk: `<root>/<framework-slug>/sections.toml`.
#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    frameworks: HashMap<String, FrameworkContent>,
}

impl ContentStore {
    pub fn load(root: impl AsRef<Path>) -> Result<Self, ContentError> {
        let mut frameworks = HashMap::new();
        for entry in std::fs::read_dir(root.as_ref())? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let slug = entry.file_name().to_string_lossy().into_owned();
            let path = entry.path().join("sections.toml");
            if !path.is_file() {
                continue;
            }
            let raw = std::fs::read_to_string(&path)?;
            let fw = FrameworkContent::from_toml_str(&slug, &raw).map_err(|source| {
                ContentError::Parse { path: path.display().to_string(), source }
            })?;
            frameworks.insert(slug, fw);
        }
        Ok(Self { frameworks })
    }

    /// Build a store from already-parsed frameworks (tests, embedded use).
    pub fn from_frameworks(frameworks: Vec<FrameworkContent>) -> Self {
        Self {
            frameworks: frameworks.into_iter().map(|f| (f.slug.clone(), f)).collect(),
        }
    }

    pub fn framework(&self, slug: &str) -> Result<&FrameworkContent, ContentError> {
        self.frameworks
            .get(slug)
            .ok_or_else(|| ContentError::UnknownFramework(slug.to_string()))
    }

    pub fn sections_for(&self, framework: &str, lot: &str) -> Result<Vec<&Section>, ContentError> {
        Ok(self.framework(framework)?.sections_for_lot(lot))
    }

    pub fn section(
        &self,
        framework: &str,
        lot: &str,
        slug: &str,
    ) -> Result<&Section, ContentError> {
        self.framework(framework)?
            .section(lot, slug)
            .ok_or_else(|| ContentError::UnknownSection(slug.to_string()))
    }
}
