//! Logo replacement.
//!
//! The template's placeholder logo is bound to the slide through a single
//! relationship. A replacement with the same extension just overwrites the
//! media file; any other extension lands beside it and the relationship
//! target is repointed.

use crate::template::TemplateLayout;
use deck_core::{Error, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::path::Path;
use tokio::fs;

/// What happened to the logo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogoOutcome {
    /// No logo given, or the path did not exist.
    Skipped,
    /// The logo was copied into the media folder.
    Replaced {
        file_name: String,
        manifest_rewritten: bool,
    },
}

/// MIME type declared for a media extension.
fn content_type_for(extension: &str) -> String {
    match extension {
        "png" => "image/png".to_string(),
        "jpg" | "jpeg" => "image/jpeg".to_string(),
        "gif" => "image/gif".to_string(),
        "svg" => "image/svg+xml".to_string(),
        other => format!("image/{}", other),
    }
}

/// Copy `logo` over the template's placeholder logo inside `workdir`.
pub async fn replace_logo(
    workdir: &Path,
    logo: Option<&Path>,
    layout: &TemplateLayout,
) -> Result<LogoOutcome> {
    let Some(logo) = logo else {
        log::info!("No logo provided, skipping logo update");
        return Ok(LogoOutcome::Skipped);
    };

    if !fs::try_exists(logo).await.unwrap_or(false) {
        log::warn!("Logo file not found at {}, skipping logo update", logo.display());
        return Ok(LogoOutcome::Skipped);
    }

    let extension = logo
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| layout.logo_default_extension.clone());

    let file_name = layout.logo_file_name(&extension);
    let media_dir = TemplateLayout::resolve(workdir, &layout.media_dir);
    fs::create_dir_all(&media_dir).await?;
    fs::copy(logo, media_dir.join(&file_name)).await?;
    log::debug!("Copied logo to {}/{}", layout.media_dir, file_name);

    if extension == layout.logo_default_extension {
        return Ok(LogoOutcome::Replaced {
            file_name,
            manifest_rewritten: false,
        });
    }

    let manifest_rewritten = retarget_relationship(workdir, layout, &file_name).await?;
    ensure_content_type(workdir, layout, &extension).await?;

    Ok(LogoOutcome::Replaced {
        file_name,
        manifest_rewritten,
    })
}

/// Point the placeholder's relationship at `file_name`.
///
/// Returns false (and logs) when the manifest has no entry for the
/// placeholder; that leaves the old image visible but is not fatal.
async fn retarget_relationship(
    workdir: &Path,
    layout: &TemplateLayout,
    file_name: &str,
) -> Result<bool> {
    let rels_path = TemplateLayout::resolve(workdir, &layout.slide_rels_part);
    let rels = fs::read_to_string(&rels_path).await.map_err(|e| {
        Error::RelationshipUpdateError(format!(
            "Failed to read '{}': {}",
            layout.slide_rels_part, e
        ))
    })?;

    let old_target = format!(
        r#"Target="{}""#,
        layout.logo_target(&layout.logo_file_name(&layout.logo_default_extension))
    );
    if !rels.contains(&old_target) {
        log::warn!(
            "No relationship targets the placeholder logo in {}",
            layout.slide_rels_part
        );
        return Ok(false);
    }

    let new_target = format!(r#"Target="{}""#, layout.logo_target(file_name));
    let rels = rels.replacen(&old_target, &new_target, 1);

    fs::write(&rels_path, rels).await.map_err(|e| {
        Error::RelationshipUpdateError(format!(
            "Failed to write '{}': {}",
            layout.slide_rels_part, e
        ))
    })?;

    Ok(true)
}

/// Declare a default content type for `extension` if the package lacks one.
async fn ensure_content_type(workdir: &Path, layout: &TemplateLayout, extension: &str) -> Result<()> {
    let path = TemplateLayout::resolve(workdir, &layout.content_types_part);
    let types = fs::read_to_string(&path).await.map_err(|e| {
        Error::RelationshipUpdateError(format!(
            "Failed to read '{}': {}",
            layout.content_types_part, e
        ))
    })?;

    let declared = declared_extensions(&types).map_err(|e| {
        Error::RelationshipUpdateError(format!(
            "Failed to parse '{}': {}",
            layout.content_types_part, e
        ))
    })?;
    if declared.iter().any(|d| d.eq_ignore_ascii_case(extension)) {
        return Ok(());
    }

    let Some(close) = types.rfind("</Types>") else {
        return Err(Error::RelationshipUpdateError(format!(
            "'{}' has no closing </Types>",
            layout.content_types_part
        )));
    };

    let mut updated = String::with_capacity(types.len() + 80);
    updated.push_str(&types[..close]);
    updated.push_str(&format!(
        r#"<Default Extension="{}" ContentType="{}"/>"#,
        extension,
        content_type_for(extension)
    ));
    updated.push_str(&types[close..]);

    fs::write(&path, updated).await.map_err(|e| {
        Error::RelationshipUpdateError(format!(
            "Failed to write '{}': {}",
            layout.content_types_part, e
        ))
    })?;

    Ok(())
}

/// `Extension` attributes of every `Default` element in a content-types part.
fn declared_extensions(types: &str) -> std::result::Result<Vec<String>, quick_xml::Error> {
    let mut reader = Reader::from_str(types);
    let mut extensions = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Default" => {
                if let Some(attr) = e.try_get_attribute("Extension")? {
                    extensions.push(attr.unescape_value()?.into_owned());
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(extensions)
}
