//! Fixture template packages for tests.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const HEADING_STYLE: &str = r#"<a:rPr lang="en-US" sz="3799"><a:solidFill><a:srgbClr val="510C3C"/></a:solidFill><a:latin typeface="Geometria"/><a:ea typeface="Geometria"/><a:cs typeface="Geometria"/><a:sym typeface="Geometria"/></a:rPr>"#;
const BODY_STYLE: &str = r#"<a:rPr lang="en-US" sz="3000"><a:solidFill><a:srgbClr val="000000"/></a:solidFill><a:latin typeface="Geometria"/><a:ea typeface="Geometria"/><a:cs typeface="Geometria"/><a:sym typeface="Geometria"/></a:rPr>"#;
const LABEL_STYLE: &str = r#"<a:rPr lang="en-US" sz="3000" b="1"/>"#;

fn run(style: &str, text: &str) -> String {
    format!("<a:r>{}<a:t>{}</a:t></a:r>", style, text)
}

/// Slide markup carrying every placeholder run of the real template.
pub fn slide_xml() -> String {
    let heading = [
        run(LABEL_STYLE, "Brand Name: "),
        run(HEADING_STYLE, "Go Colors"),
        "</a:p><a:p>".to_string(),
        run(LABEL_STYLE, "Industry:"),
        run(HEADING_STYLE, " Clothing"),
    ]
    .concat();
    let body = [
        run(LABEL_STYLE, "Target Audience:"),
        run(BODY_STYLE, " Female "),
        run(BODY_STYLE, "(25-40)"),
        "</a:p><a:p>".to_string(),
        run(LABEL_STYLE, "Primary Channel: "),
        run(BODY_STYLE, "Cinema"),
        "</a:p><a:p>".to_string(),
        run(LABEL_STYLE, "Key Regions:"),
        run(BODY_STYLE, " Chennai, Delhi NCR, Bengaluru, Hyderabad, Pune"),
    ]
    .concat();

    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
            r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
            r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">"#,
            r#"<p:cSld><p:spTree>"#,
            r#"<p:sp><p:nvSpPr><p:cNvPr id="13" name="TextBox 13"/></p:nvSpPr><p:txBody><a:bodyPr/><a:p>{}</a:p></p:txBody></p:sp>"#,
            r#"<p:sp><p:nvSpPr><p:cNvPr id="12" name="TextBox 12"/></p:nvSpPr><p:txBody><a:bodyPr/><a:p>{}</a:p></p:txBody></p:sp>"#,
            r#"<p:pic><p:blipFill><a:blip r:embed="rId5"/></p:blipFill></p:pic>"#,
            r#"</p:spTree></p:cSld></p:sld>"#
        ),
        heading, body
    )
}

pub fn slide_rels_xml() -> String {
    concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout2.xml"/>"#,
        r#"<Relationship Id="rId5" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="../media/image8.png"/>"#,
        r#"</Relationships>"#
    )
    .to_string()
}

pub fn content_types_xml() -> String {
    concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
        r#"<Default Extension="png" ContentType="image/png"/>"#,
        r#"<Default Extension="xml" ContentType="application/xml"/>"#,
        r#"<Override PartName="/ppt/slides/slide4.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#,
        r#"</Types>"#
    )
    .to_string()
}

pub const PLACEHOLDER_PNG: &[u8] = b"\x89PNG\r\n\x1a\nplaceholder";

/// Write a ZIP with the given entries.
pub fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
    let mut zip = ZipWriter::new(File::create(path).unwrap());
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, data) in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(data).unwrap();
    }
    zip.finish().unwrap();
}

/// Write the fixture template into `dir` and return its path.
pub fn write_template(dir: &Path) -> PathBuf {
    let path = dir.join("template.pptx");
    let slide = slide_xml();
    let rels = slide_rels_xml();
    let types = content_types_xml();
    write_zip(
        &path,
        &[
            ("[Content_Types].xml", types.as_bytes()),
            ("ppt/slides/slide4.xml", slide.as_bytes()),
            ("ppt/slides/_rels/slide4.xml.rels", rels.as_bytes()),
            ("ppt/media/image8.png", PLACEHOLDER_PNG),
        ],
    );
    path
}

/// Read one entry of a ZIP as bytes.
pub fn read_entry(path: &Path, name: &str) -> Option<Vec<u8>> {
    let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut entry = archive.by_name(name).ok()?;
    let mut data = Vec::new();
    entry.read_to_end(&mut data).unwrap();
    Some(data)
}

/// Read one entry of a ZIP as UTF-8 text.
pub fn read_entry_text(path: &Path, name: &str) -> Option<String> {
    read_entry(path, name).map(|data| String::from_utf8(data).unwrap())
}

/// Entry names of a ZIP, in archive order.
pub fn entry_names(path: &Path) -> Vec<String> {
    let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}
