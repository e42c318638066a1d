//! Deck generation pipeline.
//!
//! One request runs through a fixed sequence of stages inside its own
//! UUID-named working directory:
//!
//! ```text
//! extract -> read part -> substitute -> write part -> logo -> repack -> cleanup
//! ```
//!
//! The working directory is removed whether the pipeline succeeds or not,
//! and also if the generation future is dropped part-way through.

use crate::asset::{replace_logo, LogoOutcome};
use crate::extract::extract_archive;
use crate::repack::repack_dir;
use crate::substitute::{PartEditor, SignatureEditor, SubstitutionReport};
use crate::template::TemplateLayout;
use deck_core::format::output_file_name;
use deck_core::{ClientData, Error, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

/// Paths and matching policy for a [`DeckGenerator`].
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Read-only template package shared by every request.
    pub template_path: PathBuf,

    /// Parent of the per-request working directories.
    pub work_root: PathBuf,

    /// Where generated decks are written.
    pub output_dir: PathBuf,

    /// Internal layout of the template.
    pub layout: TemplateLayout,

    /// Fail generation when any placeholder is left unmatched.
    pub strict_fields: bool,
}

impl GeneratorConfig {
    pub fn new(
        template_path: impl Into<PathBuf>,
        work_root: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            template_path: template_path.into(),
            work_root: work_root.into(),
            output_dir: output_dir.into(),
            layout: TemplateLayout::default(),
            strict_fields: false,
        }
    }

    pub fn with_layout(mut self, layout: TemplateLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_strict_fields(mut self, strict: bool) -> Self {
        self.strict_fields = strict;
        self
    }
}

/// A finished deck.
#[derive(Debug, Clone)]
pub struct GeneratedDeck {
    /// Absolute path of the new `.pptx`.
    pub path: PathBuf,

    /// Which placeholders were rewritten.
    pub report: SubstitutionReport,

    /// What happened to the logo.
    pub logo: LogoOutcome,
}

/// Pipeline stage, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Extracted,
    PartRead,
    Substituted,
    PartWritten,
    AssetHandled,
    Repacked,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Extracted => "EXTRACTED",
            Stage::PartRead => "PART_READ",
            Stage::Substituted => "SUBSTITUTED",
            Stage::PartWritten => "PART_WRITTEN",
            Stage::AssetHandled => "ASSET_HANDLED",
            Stage::Repacked => "REPACKED",
        };
        f.write_str(name)
    }
}

/// Request-scoped working directory.
///
/// Call [`WorkDir::remove`] on every path out of the pipeline; `Drop` is
/// the backstop for futures that are abandoned before they finish.
struct WorkDir {
    path: PathBuf,
    removed: bool,
}

impl WorkDir {
    async fn create(work_root: &Path) -> Result<Self> {
        let path = work_root.join(Uuid::new_v4().to_string());
        tokio::fs::create_dir_all(&path).await?;
        Ok(Self {
            path,
            removed: false,
        })
    }

    fn path(&self) -> &Path {
        &self.path
    }

    async fn remove(mut self) {
        match tokio::fs::remove_dir_all(&self.path).await {
            Ok(()) => log::debug!("Removed working directory {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::error!(
                "Failed to remove working directory {}: {}",
                self.path.display(),
                e
            ),
        }
        self.removed = true;
    }
}

impl Drop for WorkDir {
    fn drop(&mut self) {
        if !self.removed && self.path.exists() {
            log::warn!(
                "Working directory {} abandoned, removing",
                self.path.display()
            );
            if let Err(e) = std::fs::remove_dir_all(&self.path) {
                log::error!("Failed to remove {}: {}", self.path.display(), e);
            }
        }
    }
}

/// Generates customised decks from the shared template.
///
/// Cheap to clone; concurrent calls share nothing but the read-only
/// template file.
#[derive(Clone)]
pub struct DeckGenerator {
    config: Arc<GeneratorConfig>,
    editor: Arc<dyn PartEditor>,
}

impl DeckGenerator {
    /// Create a generator using the signature-matching editor.
    pub fn new(config: GeneratorConfig) -> Self {
        Self::with_editor(config, SignatureEditor::new())
    }

    /// Create a generator with a custom part editor.
    pub fn with_editor(config: GeneratorConfig, editor: impl PartEditor + 'static) -> Self {
        Self {
            config: Arc::new(config),
            editor: Arc::new(editor),
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate a deck for `data`, optionally swapping in `logo`.
    pub async fn generate(&self, data: &ClientData, logo: Option<&Path>) -> Result<GeneratedDeck> {
        data.validate()?;

        tokio::fs::create_dir_all(&self.config.output_dir).await?;
        let output_dir = std::path::absolute(&self.config.output_dir)?;
        let output = output_dir.join(output_file_name(
            &data.brand_name,
            chrono::Utc::now().timestamp_millis(),
        ));

        let workdir = WorkDir::create(&self.config.work_root).await?;
        log::info!(
            "Generating deck for '{}' in {}",
            data.brand_name,
            workdir.path().display()
        );

        let result = self.run(workdir.path(), data, logo, &output).await;
        workdir.remove().await;

        match result {
            Ok((report, logo)) => {
                log::info!("Generated {}", output.display());
                Ok(GeneratedDeck {
                    path: output,
                    report,
                    logo,
                })
            }
            Err(e) => {
                log::warn!("Deck generation failed ({}): {}", e.kind(), e);
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        workdir: &Path,
        data: &ClientData,
        logo: Option<&Path>,
        output: &Path,
    ) -> Result<(SubstitutionReport, LogoOutcome)> {
        let layout = &self.config.layout;

        let template = self.config.template_path.clone();
        let dest = workdir.to_path_buf();
        blocking(move || extract_archive(&template, &dest), Error::ExtractionError).await?;
        stage(Stage::Extracted);

        let part_path = TemplateLayout::resolve(workdir, &layout.slide_part);
        let bytes = tokio::fs::read(&part_path).await.map_err(|e| {
            Error::SubstitutionError(format!("Failed to read '{}': {}", layout.slide_part, e))
        })?;
        let markup = String::from_utf8(bytes).map_err(|e| {
            Error::SubstitutionError(format!("'{}' is not UTF-8: {}", layout.slide_part, e))
        })?;
        stage(Stage::PartRead);

        let substitution = self.editor.apply(&markup, data)?;
        let missing = substitution.report.missing();
        if self.config.strict_fields && !missing.is_empty() {
            let names: Vec<String> = missing.iter().map(ToString::to_string).collect();
            return Err(Error::SubstitutionError(format!(
                "Placeholders not found: {}",
                names.join(", ")
            )));
        }
        stage(Stage::Substituted);

        tokio::fs::write(&part_path, substitution.markup.as_bytes())
            .await
            .map_err(|e| {
                Error::SubstitutionError(format!("Failed to write '{}': {}", layout.slide_part, e))
            })?;
        stage(Stage::PartWritten);

        let logo = replace_logo(workdir, logo, layout).await?;
        stage(Stage::AssetHandled);

        let source = workdir.to_path_buf();
        let target = output.to_path_buf();
        blocking(move || repack_dir(&source, &target), Error::RepackError).await?;
        stage(Stage::Repacked);

        Ok((substitution.report, logo))
    }
}

fn stage(stage: Stage) {
    log::debug!("Pipeline stage: {}", stage);
}

/// Run blocking ZIP work off the async executor.
async fn blocking<T, F>(work: F, on_panic: fn(String) -> Error) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| on_panic(format!("Worker task failed: {}", e)))?
}
