//! Internal layout of the fixed pitch-deck template.

use std::path::{Path, PathBuf};

/// Locations inside the template package that generation touches.
///
/// Part paths are ZIP-style (`/`-separated) relative to the package root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateLayout {
    /// Slide whose placeholder runs are rewritten.
    pub slide_part: String,

    /// Relationship manifest of that slide.
    pub slide_rels_part: String,

    /// Folder holding media assets.
    pub media_dir: String,

    /// Base name of the placeholder logo, without extension.
    pub logo_base_name: String,

    /// Extension of the placeholder logo, without the dot.
    pub logo_default_extension: String,

    /// Package content-types part.
    pub content_types_part: String,
}

impl Default for TemplateLayout {
    fn default() -> Self {
        Self {
            slide_part: "ppt/slides/slide4.xml".to_string(),
            slide_rels_part: "ppt/slides/_rels/slide4.xml.rels".to_string(),
            media_dir: "ppt/media".to_string(),
            logo_base_name: "image8".to_string(),
            logo_default_extension: "png".to_string(),
            content_types_part: "[Content_Types].xml".to_string(),
        }
    }
}

impl TemplateLayout {
    /// File name of the logo for a given extension.
    pub fn logo_file_name(&self, extension: &str) -> String {
        format!("{}.{}", self.logo_base_name, extension)
    }

    /// Manifest `Target` value pointing at a logo file.
    ///
    /// Targets are relative to the slide folder, so media sits one level up.
    pub fn logo_target(&self, file_name: &str) -> String {
        let media_leaf = self.media_dir.rsplit('/').next().unwrap_or(&self.media_dir);
        format!("../{}/{}", media_leaf, file_name)
    }

    /// Resolve a part path against an extracted package root.
    pub fn resolve(root: &Path, part: &str) -> PathBuf {
        part.split('/')
            .filter(|segment| !segment.is_empty())
            .fold(root.to_path_buf(), |path, segment| path.join(segment))
    }
}
