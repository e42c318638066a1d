//! PPTX template customisation.
//!
//! A fixed template deck is unpacked into a per-request working directory,
//! one slide part has its placeholder text runs rewritten, the logo asset
//! is swapped, and the tree is zipped back into a new `.pptx`.

pub mod asset;
pub mod extract;
pub mod generator;
pub mod reaper;
pub mod repack;
pub mod substitute;
pub mod template;

#[cfg(test)]
mod testutil;

pub use asset::LogoOutcome;
pub use generator::{DeckGenerator, GeneratedDeck, GeneratorConfig};
pub use reaper::{reap_stale_workdirs, spawn_reaper};
pub use substitute::{Field, MatchPass, PartEditor, SignatureEditor, Substitution, SubstitutionReport};
pub use template::TemplateLayout;
