//! Template metadata and the registry resolving identifiers to it.
//!
//! A template is reduced to what the compositor needs: a display name, an accent color and a
//! header treatment. Aliases point at another template and may override its accent color; they
//! are otherwise identical to their target.

use serde::{Deserialize, Serialize};

use crate::error::ContextError;

/// How the personal information block at the top of the first page is drawn.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum HeaderStyle {
    /// A full-width band in the accent color with the name in white.
    Banner,
    /// The name in the accent color, underlined by a rule.
    Rule,
}

/// A template after alias resolution.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TemplateInfo {
    pub id: String,
    pub name: String,
    pub accent_color: [f32; 3],
    pub header: HeaderStyle,
}

/// The single operation the compositor needs from a template registry.
pub trait TemplateLookup {
    fn lookup(&self, template_id: &str) -> Option<TemplateInfo>;

    /// Like `lookup`, but turns a miss into a `TemplateNotFound` error.
    fn resolve(&self, template_id: &str) -> Result<TemplateInfo, ContextError> {
        self.lookup(template_id).ok_or_else(|| {
            log::error!("No template is registered under {:?}", template_id);
            ContextError::template_not_found(template_id)
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
enum TemplateEntry {
    Base {
        id: &'static str,
        name: &'static str,
        accent_color: [u8; 3],
        header: HeaderStyle,
    },
    Alias {
        id: &'static str,
        name: &'static str,
        target: &'static str,
        accent_color: Option<[u8; 3]>,
    },
}

impl TemplateEntry {
    fn id(&self) -> &'static str {
        match self {
            TemplateEntry::Base { id, .. } | TemplateEntry::Alias { id, .. } => id,
        }
    }
}

/// The templates shipped with the crate.
#[derive(Debug, Clone)]
pub struct BuiltinTemplates {
    entries: Vec<TemplateEntry>,
}

/// Alias chains longer than this are considered broken.
const MAXIMUM_ALIAS_DEPTH: usize = 8;

impl Default for BuiltinTemplates {
    #[rustfmt::skip]
    fn default() -> Self {
        use HeaderStyle::*;
        use TemplateEntry::*;

        BuiltinTemplates {
            entries: vec![
                Base { id: "modern", name: "Modern", accent_color: [0x25, 0x63, 0xEB], header: Banner },
                Base { id: "classic", name: "Classic", accent_color: [0x1F, 0x29, 0x37], header: Rule },
                Base { id: "minimal", name: "Minimal", accent_color: [0x4B, 0x55, 0x63], header: Rule },
                Base { id: "executive", name: "Executive", accent_color: [0x7C, 0x2D, 0x12], header: Banner },
                Base { id: "creative", name: "Creative", accent_color: [0xDB, 0x27, 0x77], header: Banner },
                Alias { id: "modern-green", name: "Modern Green", target: "modern", accent_color: Some([0x05, 0x96, 0x69]) },
                Alias { id: "modern-purple", name: "Modern Purple", target: "modern", accent_color: Some([0x7C, 0x3A, 0xED]) },
                Alias { id: "professional", name: "Professional", target: "classic", accent_color: None },
                Alias { id: "elegant", name: "Elegant", target: "classic", accent_color: Some([0x92, 0x40, 0x0E]) },
                Alias { id: "corporate", name: "Corporate", target: "executive", accent_color: Some([0x1E, 0x3A, 0x8A]) },
                Alias { id: "simple", name: "Simple", target: "minimal", accent_color: None },
            ],
        }
    }
}

impl BuiltinTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identifiers and display names of every registered template, aliases included.
    pub fn list(&self) -> Vec<(&'static str, &'static str)> {
        self.entries
            .iter()
            .map(|entry| match entry {
                TemplateEntry::Base { id, name, .. } | TemplateEntry::Alias { id, name, .. } => {
                    (*id, *name)
                }
            })
            .collect()
    }

    fn entry(&self, template_id: &str) -> Option<&TemplateEntry> {
        self.entries.iter().find(|entry| entry.id() == template_id)
    }
}

impl TemplateLookup for BuiltinTemplates {
    fn lookup(&self, template_id: &str) -> Option<TemplateInfo> {
        let requested = self.entry(template_id)?;
        let (name, mut accent_override) = match requested {
            TemplateEntry::Base { name, .. } | TemplateEntry::Alias { name, .. } => (*name, None),
        };

        // Follow the alias chain down to a base template; the accent closest to the requested
        // identifier wins
        let mut current = requested;
        for _ in 0..MAXIMUM_ALIAS_DEPTH {
            match current {
                TemplateEntry::Base {
                    accent_color,
                    header,
                    ..
                } => {
                    return Some(TemplateInfo {
                        id: template_id.to_string(),
                        name: name.to_string(),
                        accent_color: rgb(accent_override.unwrap_or(*accent_color)),
                        header: *header,
                    });
                }
                TemplateEntry::Alias {
                    target,
                    accent_color,
                    ..
                } => {
                    accent_override = accent_override.or(*accent_color);
                    current = match self.entry(target) {
                        Some(entry) => entry,
                        None => {
                            log::warn!(
                                "The template {:?} points at the unknown template {:?}",
                                template_id,
                                target
                            );
                            return None;
                        }
                    };
                }
            }
        }

        log::warn!("The alias chain of the template {:?} is too deep", template_id);
        None
    }
}

fn rgb([red, green, blue]: [u8; 3]) -> [f32; 3] {
    [red as f32 / 255.0, green as f32 / 255.0, blue as f32 / 255.0]
}
