use std::path::{Path, PathBuf};

use crate::config::SitePaths;
use crate::copier::{copy_dir, CopyError};
use crate::scanner::{walk_files, ScanError};
use crate::template::{Layout, TemplateError};

/// A failure that stops the whole build: the shared layout is broken,
/// the static copy died, or a directory walk failed.
#[derive(Debug)]
pub enum BuildError {
    Layout(TemplateError),
    Copy(CopyError),
    Scan(ScanError),
}

impl From<TemplateError> for BuildError {
    fn from(err: TemplateError) -> Self {
        BuildError::Layout(err)
    }
}

impl From<CopyError> for BuildError {
    fn from(err: CopyError) -> Self {
        BuildError::Copy(err)
    }
}

impl From<ScanError> for BuildError {
    fn from(err: ScanError) -> Self {
        BuildError::Scan(err)
    }
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildError::Layout(e) => write!(f, "Layout error: {}", e),
            BuildError::Copy(e) => write!(f, "Static copy error: {}", e),
            BuildError::Scan(e) => write!(f, "Scan error: {}", e),
        }
    }
}

impl std::error::Error for BuildError {}

/// A failure scoped to one page. These are collected instead of
/// aborting the build; one bad content file should not block the rest
/// of the output.
#[derive(Debug)]
pub enum PageError {
    Template(TemplateError),
    Io(std::io::Error),
}

impl From<TemplateError> for PageError {
    fn from(err: TemplateError) -> Self {
        PageError::Template(err)
    }
}

impl From<std::io::Error> for PageError {
    fn from(err: std::io::Error) -> Self {
        PageError::Io(err)
    }
}

impl std::fmt::Display for PageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PageError::Template(e) => write!(f, "Template error: {}", e),
            PageError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for PageError {}

/// What a build pass did: which pages landed, how many static files
/// were copied, and which pages failed and why.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub rendered: Vec<PathBuf>,
    pub copied: usize,
    pub failures: Vec<(PathBuf, PageError)>,
}

impl BuildReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Build the whole site: copy static assets, then render every file
/// under the source tree through the shared layout into the output
/// tree, preserving relative paths.
///
/// The layout is parsed before anything is written, so a malformed
/// layout fails the build with the output tree untouched. Destination
/// files are created with truncate-or-create semantics, which keeps
/// repeated builds idempotent without a cleanup step.
pub fn build_site(paths: &SitePaths) -> Result<BuildReport, BuildError> {
    println!("parsing {}", paths.layout.display());
    let layout = Layout::load(&paths.layout)?;

    let copied = copy_dir(&paths.static_dir, &paths.output)?;

    let mut report = BuildReport {
        copied,
        ..Default::default()
    };
    for entry in walk_files(&paths.source) {
        let entry = entry?;
        let dest = paths.output.join(&entry.rel);
        match render_page(&layout, &entry.path, &dest) {
            Ok(()) => report.rendered.push(dest),
            Err(e) => {
                eprintln!("skipping {}: {}", entry.path.display(), e);
                report.failures.push((entry.path, e));
            }
        }
    }

    Ok(report)
}

fn render_page(layout: &Layout, source: &Path, dest: &Path) -> Result<(), PageError> {
    println!("parsing {}", source.display());
    let composed = layout.compose(source)?;

    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    println!("generating {}", dest.display());
    let file = std::fs::File::create(dest)?;
    composed.render_to(file)?;

    Ok(())
}
