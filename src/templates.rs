//! Template lookup and rendering.
//!
//! Each skin under `templates/` is compiled into the binary by askama, so a template
//! that references an unknown field fails the build rather than a request. Scalar
//! fields are HTML-escaped by askama; list fields are [`Markup`](crate::normalize::Markup)
//! fragments the normalizer already escaped, inserted with `|safe`.

use std::collections::BTreeMap;

use askama::Template;
use thiserror::Error;
use tracing::debug;

use crate::normalize::{NormalizedRecord, TemplateId};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template {id} not found")]
    TemplateNotFound { id: i64 },
    #[error("template rendering failed: {0}")]
    Engine(#[from] askama::Error),
}

#[derive(Template)]
#[template(path = "template1.html")]
struct ChipSkin<'a> {
    record: &'a NormalizedRecord,
}

#[derive(Template)]
#[template(path = "template2.html")]
struct TagSkin<'a> {
    record: &'a NormalizedRecord,
}

#[derive(Template)]
#[template(path = "template3.html")]
struct BadgeSkin<'a> {
    record: &'a NormalizedRecord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Skin {
    Chip,
    Tag,
    Badge,
}

const BUILTIN_SKINS: [(TemplateId, Skin); 3] = [
    (TemplateId::new(1), Skin::Chip),
    (TemplateId::new(2), Skin::Tag),
    (TemplateId::new(3), Skin::Badge),
];

impl Skin {
    fn render(self, record: &NormalizedRecord) -> askama::Result<String> {
        match self {
            Skin::Chip => ChipSkin { record }.render(),
            Skin::Tag => TagSkin { record }.render(),
            Skin::Badge => BadgeSkin { record }.render(),
        }
    }
}

/// Read-only set of templates keyed by id, shared by all requests.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    skins: BTreeMap<TemplateId, Skin>,
}

impl TemplateStore {
    /// The skins compiled from `templates/template{id}.html`.
    pub fn builtin() -> Self {
        Self { skins: BUILTIN_SKINS.into_iter().collect() }
    }

    pub fn ids(&self) -> impl Iterator<Item = TemplateId> + '_ {
        self.skins.keys().copied()
    }

    /// Resolves a raw id from a request. Ids that are out of range or have no
    /// template are both reported as not found; there is no fallback skin.
    pub fn resolve(&self, raw: i64) -> Result<TemplateId, RenderError> {
        u32::try_from(raw)
            .ok()
            .map(TemplateId::new)
            .filter(|id| self.skins.contains_key(id))
            .ok_or(RenderError::TemplateNotFound { id: raw })
    }

    pub fn render(&self, id: TemplateId, record: &NormalizedRecord) -> Result<String, RenderError> {
        let skin = self
            .skins
            .get(&id)
            .ok_or(RenderError::TemplateNotFound { id: i64::from(id.get()) })?;
        debug!("Rendering {}", id.file_name());
        Ok(skin.render(record)?)
    }
}
