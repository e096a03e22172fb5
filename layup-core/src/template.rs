//! Thin wrapper over tera that enforces the one-layout, one-content
//! composition model: parse the root layout once, clone it per page,
//! attach exactly one content file, execute with no data context.
//!
//! Content files opt into the layout with `{% extends %}` against the
//! layout's file name (usually `base.html`); a file that does not
//! extend anything renders as-is. No variables are ever injected, so
//! everything a page shows comes from its own literal content.

use std::io::Write;
use std::path::{Path, PathBuf};

use tera::{Context, Tera};

#[derive(Debug)]
pub enum TemplateError {
    TeraError(tera::Error),
    InvalidPath(PathBuf),
}

impl From<tera::Error> for TemplateError {
    fn from(err: tera::Error) -> Self {
        TemplateError::TeraError(err)
    }
}

impl std::fmt::Display for TemplateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateError::TeraError(e) => write!(f, "Template error: {}", e),
            TemplateError::InvalidPath(p) => write!(f, "Invalid path: {}", p.display()),
        }
    }
}

impl std::error::Error for TemplateError {}

/// The parsed root layout. Stateless beyond its parsed form; re-load it
/// whenever a fresh view of the file on disk is wanted.
pub struct Layout {
    tera: Tera,
}

impl Layout {
    /// Parse the root layout from `path`. The template is registered
    /// under the file's name so content files can extend it.
    pub fn load(path: &Path) -> Result<Self, TemplateError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| TemplateError::InvalidPath(path.to_path_buf()))?;

        let mut tera = Tera::default();
        tera.add_template_file(path, Some(&name))?;

        Ok(Self { tera })
    }

    /// Clone the layout and parse one content file into the clone.
    pub fn compose(&self, content: &Path) -> Result<ComposedPage, TemplateError> {
        let name = content.to_string_lossy().into_owned();
        let mut tera = self.tera.clone();
        tera.add_template_file(content, Some(&name))?;

        Ok(ComposedPage { tera, name })
    }
}

/// One content file merged with the layout, ready to execute. Built per
/// page, executed once, discarded. A second content file is never
/// attached.
pub struct ComposedPage {
    tera: Tera,
    name: String,
}

impl ComposedPage {
    /// Execute with an empty context, streaming into `writer`.
    pub fn render_to<W: Write>(&self, writer: W) -> Result<(), TemplateError> {
        self.tera.render_to(&self.name, &Context::new(), writer)?;
        Ok(())
    }

    /// Execute with an empty context into a string.
    pub fn render(&self) -> Result<String, TemplateError> {
        Ok(self.tera.render(&self.name, &Context::new())?)
    }
}
