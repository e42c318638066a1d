//! Text-run substitution for the template's client slide.
//!
//! Placeholder runs are located by their verbatim markup signature (run
//! properties plus the placeholder text) rather than by walking the XML
//! tree. That only works because the template's markup is fixed, so the
//! matching lives behind [`PartEditor`] and can be swapped for a structural
//! editor without touching the pipeline.

use deck_core::format::{escape_xml, region_display};
use deck_core::{ClientData, Error, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Run properties of the brand-name and industry runs (TextBox 13).
const HEADING_RUN_PROPS: &str = r#"<a:rPr lang="en-US" sz="3799"><a:solidFill><a:srgbClr val="510C3C"/></a:solidFill><a:latin typeface="Geometria"/><a:ea typeface="Geometria"/><a:cs typeface="Geometria"/><a:sym typeface="Geometria"/></a:rPr>"#;

/// Run properties of the audience/channel/regions runs (TextBox 12).
const BODY_RUN_PROPS: &str = r#"<a:rPr lang="en-US" sz="3000"><a:solidFill><a:srgbClr val="000000"/></a:solidFill><a:latin typeface="Geometria"/><a:ea typeface="Geometria"/><a:cs typeface="Geometria"/><a:sym typeface="Geometria"/></a:rPr>"#;

fn signature(run_props: &str, placeholder: &str) -> Regex {
    Regex::new(&format!(
        "({}<a:t>){}(</a:t>)",
        regex::escape(run_props),
        regex::escape(placeholder)
    ))
    .unwrap()
}

fn text_tail(placeholder: &str) -> Regex {
    Regex::new(&format!(">{}</a:t>", regex::escape(placeholder))).unwrap()
}

static BRAND_SIGNATURE: LazyLock<Regex> =
    LazyLock::new(|| signature(HEADING_RUN_PROPS, "Go Colors"));

static INDUSTRY_SIGNATURE: LazyLock<Regex> =
    LazyLock::new(|| signature(HEADING_RUN_PROPS, " Clothing"));

static AUDIENCE_SIGNATURE: LazyLock<Regex> =
    LazyLock::new(|| signature(BODY_RUN_PROPS, " Female "));

static AUDIENCE_FALLBACK: LazyLock<Regex> = LazyLock::new(|| text_tail(" Female "));

static CHANNEL_RUN: LazyLock<Regex> = LazyLock::new(|| text_tail("Cinema"));

static REGIONS_RUN: LazyLock<Regex> =
    LazyLock::new(|| text_tail(" Chennai, Delhi NCR, Bengaluru, Hyderabad, Pune"));

/// A client field that has a placeholder in the template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    BrandName,
    Industry,
    TargetAudience,
    PrimaryChannels,
    KeyRegions,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::BrandName,
        Field::Industry,
        Field::TargetAudience,
        Field::PrimaryChannels,
        Field::KeyRegions,
    ];
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Field::BrandName => "brand name",
            Field::Industry => "industry",
            Field::TargetAudience => "target audience",
            Field::PrimaryChannels => "primary channels",
            Field::KeyRegions => "key regions",
        };
        f.write_str(name)
    }
}

/// Which matcher produced a replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPass {
    /// Full run-property signature.
    Signature,
    /// Looser text-only match applied after the signature pass.
    Fallback,
}

/// Replacement count of one matcher pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMatch {
    pub field: Field,
    pub pass: MatchPass,
    pub replacements: usize,
}

/// Which placeholders were actually rewritten.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstitutionReport {
    matches: Vec<FieldMatch>,
}

impl SubstitutionReport {
    fn record(&mut self, field: Field, pass: MatchPass, replacements: usize) {
        self.matches.push(FieldMatch {
            field,
            pass,
            replacements,
        });
    }

    /// Every recorded pass, in application order.
    pub fn matches(&self) -> &[FieldMatch] {
        &self.matches
    }

    /// Total replacements for a field across passes.
    pub fn replacements(&self, field: Field) -> usize {
        self.matches
            .iter()
            .filter(|m| m.field == field)
            .map(|m| m.replacements)
            .sum()
    }

    /// Replacements for a field from one pass.
    pub fn replacements_in(&self, field: Field, pass: MatchPass) -> usize {
        self.matches
            .iter()
            .filter(|m| m.field == field && m.pass == pass)
            .map(|m| m.replacements)
            .sum()
    }

    pub fn is_rewritten(&self, field: Field) -> bool {
        self.replacements(field) > 0
    }

    /// Fields whose placeholder was not found by any pass.
    pub fn missing(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|f| !self.is_rewritten(*f))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }
}

/// Edited markup plus the match report.
#[derive(Debug, Clone)]
pub struct Substitution {
    pub markup: String,
    pub report: SubstitutionReport,
}

/// Rewrites one document part with client data.
pub trait PartEditor: Send + Sync {
    /// Return edited markup. Missing placeholders are reported, not errors.
    fn apply(&self, markup: &str, data: &ClientData) -> Result<Substitution>;
}

/// Signature-matching editor for the fixed pitch-deck template.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignatureEditor;

impl SignatureEditor {
    pub fn new() -> Self {
        Self
    }
}

impl PartEditor for SignatureEditor {
    fn apply(&self, markup: &str, data: &ClientData) -> Result<Substitution> {
        let channels = data.channel_text().ok_or(Error::NoValidChannels)?;

        let brand = escape_xml(&data.brand_name);
        let industry = escape_xml(&data.industry);
        let audience = escape_xml(&data.target_audience);
        let channels = escape_xml(&channels);
        let regions = escape_xml(&region_display(&data.key_regions));

        let mut report = SubstitutionReport::default();
        let mut text = markup.to_string();

        let (next, n) = replace(&BRAND_SIGNATURE, &text, 1, |caps| {
            format!("{}{}{}", &caps[1], brand, &caps[2])
        });
        report.record(Field::BrandName, MatchPass::Signature, n);
        text = next;

        let (next, n) = replace(&INDUSTRY_SIGNATURE, &text, 1, |caps| {
            format!("{} {}{}", &caps[1], industry, &caps[2])
        });
        report.record(Field::Industry, MatchPass::Signature, n);
        text = next;

        let (next, n) = replace(&AUDIENCE_SIGNATURE, &text, 1, |caps| {
            format!("{} {} {}", &caps[1], audience, &caps[2])
        });
        report.record(Field::TargetAudience, MatchPass::Signature, n);
        text = next;

        // The audience run's properties differ between template revisions, so
        // a text-only pass catches whatever the signature pass missed.
        let (next, n) = replace(&AUDIENCE_FALLBACK, &text, 0, |_| {
            format!("> {} </a:t>", audience)
        });
        report.record(Field::TargetAudience, MatchPass::Fallback, n);
        text = next;

        let (next, n) = replace(&CHANNEL_RUN, &text, 0, |_| format!(">{}</a:t>", channels));
        report.record(Field::PrimaryChannels, MatchPass::Signature, n);
        text = next;

        let (next, n) = replace(&REGIONS_RUN, &text, 0, |_| format!("> {}</a:t>", regions));
        report.record(Field::KeyRegions, MatchPass::Signature, n);
        text = next;

        for field in report.missing() {
            log::warn!("No placeholder matched for {}; left unchanged", field);
        }

        text_runs(&text).map_err(|e| {
            Error::SubstitutionError(format!("Edited part is not well-formed: {}", e))
        })?;

        Ok(Substitution {
            markup: text,
            report,
        })
    }
}

/// Replace up to `limit` matches (0 = all), returning the text and match count.
fn replace<F>(re: &Regex, text: &str, limit: usize, mut rep: F) -> (String, usize)
where
    F: FnMut(&Captures) -> String,
{
    let mut count = 0;
    let out = re
        .replacen(text, limit, |caps: &Captures| {
            count += 1;
            rep(caps)
        })
        .into_owned();
    (out, count)
}

/// Decoded text of every `<a:t>` run, in document order.
///
/// Fails if the markup is not well-formed or contains a bad entity.
pub fn text_runs(markup: &str) -> std::result::Result<Vec<String>, quick_xml::Error> {
    let mut reader = Reader::from_str(markup);
    let mut runs = Vec::new();
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(ref e) if e.name().as_ref() == b"a:t" => {
                in_text = true;
                runs.push(String::new());
            }
            Event::End(ref e) if e.name().as_ref() == b"a:t" => {
                in_text = false;
            }
            Event::Text(ref e) => {
                let text = e.unescape()?;
                if in_text {
                    if let Some(run) = runs.last_mut() {
                        run.push_str(&text);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(runs)
}
