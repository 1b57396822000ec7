//! Reference glyph loading

use super::config::RecognitionConfig;
use super::error::{DecodeError, RecognitionError, RecognitionResult};
use super::preprocess::to_representation;
use image::GrayImage;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A named reference glyph in its matching representation.
#[derive(Debug, Clone)]
pub struct Template {
    pub name: String,
    pub image: GrayImage,
}

impl Template {
    pub fn new(name: impl Into<String>, image: GrayImage) -> Self {
        Self {
            name: name.into(),
            image,
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Decode an image file, naming the template after the file stem.
    fn from_file(path: &Path, config: &RecognitionConfig) -> Result<Self, DecodeError> {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .ok_or(DecodeError::MissingName)?
            .to_string();

        let gray = image::open(path)?.to_luma8();
        if gray.width() == 0 || gray.height() == 0 {
            return Err(DecodeError::EmptyImage);
        }

        Ok(Self::new(name, to_representation(gray, config)))
    }
}

/// A template file that was left out of the store during loading.
#[derive(Debug)]
pub struct SkippedTemplate {
    pub path: PathBuf,
    pub reason: DecodeError,
}

/// Read-only set of uniquely named templates, iterated in lexicographic filename order.
#[derive(Debug, Clone, Default)]
pub struct TemplateStore {
    templates: Vec<Template>,
}

impl TemplateStore {
    /// Build a store from prepared templates, keeping their order.
    ///
    /// Applies the same rules as [`TemplateStore::load`]: empty images are
    /// dropped and a later template replaces an earlier one of the same name.
    pub fn from_templates(templates: Vec<Template>) -> Self {
        let mut store = Self::default();
        for template in templates {
            if template.name.is_empty() || template.width() == 0 || template.height() == 0 {
                log::warn!("⚠️ Dropping unusable template '{}'", template.name);
                continue;
            }
            if let Some(replaced) = store.insert(template) {
                log::warn!("⚠️ Template '{}' replaced by a later one", replaced.name);
            }
        }
        store
    }

    /// Add `template`, replacing a same-named one in place. Returns the replaced template.
    fn insert(&mut self, template: Template) -> Option<Template> {
        match self.templates.iter_mut().find(|t| t.name == template.name) {
            Some(slot) => Some(std::mem::replace(slot, template)),
            None => {
                self.templates.push(template);
                None
            }
        }
    }

    /// Load every decodable image in `directory`.
    ///
    /// Only an unreadable directory is an error. Files that fail to decode,
    /// have no stem or are empty are returned in the skipped list. When two
    /// files share a stem the later one in filename order provides the
    /// symbol and the earlier one is reported as skipped.
    pub fn load(
        directory: impl AsRef<Path>,
        config: &RecognitionConfig,
    ) -> RecognitionResult<(Self, Vec<SkippedTemplate>)> {
        let directory = directory.as_ref();
        let unreadable = |source| RecognitionError::TemplateDirUnreadable {
            path: directory.to_path_buf(),
            source,
        };

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(directory).map_err(unreadable)? {
            let path = entry.map_err(unreadable)?.path();
            if path.is_file() {
                paths.push(path);
            } else {
                log::debug!("Ignoring non-file template entry {}", path.display());
            }
        }
        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        let mut store = Self::default();
        let mut origins: HashMap<String, PathBuf> = HashMap::new();
        let mut skipped = Vec::new();

        for path in paths {
            match Template::from_file(&path, config) {
                Ok(template) => {
                    log::debug!(
                        "Loaded template '{}' ({}x{}) from {}",
                        template.name,
                        template.width(),
                        template.height(),
                        path.display()
                    );
                    let previous = origins.insert(template.name.clone(), path.clone());
                    if let Some(replaced) = store.insert(template)
                        && let Some(previous) = previous
                    {
                        let reason = DecodeError::DuplicateName {
                            name: replaced.name,
                        };
                        log::warn!("⚠️ Skipping template {}: {}", previous.display(), reason);
                        skipped.push(SkippedTemplate {
                            path: previous,
                            reason,
                        });
                    }
                }
                Err(reason) => {
                    log::warn!("⚠️ Skipping template {}: {}", path.display(), reason);
                    skipped.push(SkippedTemplate { path, reason });
                }
            }
        }

        log::info!(
            "Loaded {} templates from {} ({} skipped)",
            store.len(),
            directory.display(),
            skipped.len()
        );

        Ok((store, skipped))
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.templates.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
