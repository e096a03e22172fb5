pub mod builder;
pub mod config;
pub mod copier;
pub mod scanner;
pub mod template;

// Re-export main types
pub use builder::{build_site, BuildError, BuildReport, PageError};
pub use config::SitePaths;
pub use copier::copy_dir;
pub use scanner::{walk_files, FileEntry, ScanError};
pub use template::{ComposedPage, Layout, TemplateError};
