use std::collections::HashMap;
use std::path::PathBuf;

use ab_glyph::FontArc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::style::{FontFamily, FontStyle};

/// Errors that can occur while loading font faces
#[derive(Debug, Error)]
pub enum FontError {
    #[error("failed to read font file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("font file {0:?} is not a usable font")]
    Invalid(PathBuf),

    #[error("built-in font data is not a usable font")]
    InvalidBuiltin,
}

/// One configured font file for a family/weight/slant combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontFaceConfig {
    pub family: FontFamily,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct FaceKey {
    family: FontFamily,
    bold: bool,
    italic: bool,
}

/// A resolved face plus the styling the face itself cannot provide.
#[derive(Debug, Clone, Copy)]
pub struct Face<'a> {
    pub font: &'a FontArc,
    /// Bold was requested but the face is not bold
    pub synthetic_bold: bool,
    /// Italic was requested but the face is not italic
    pub synthetic_italic: bool,
}

/// Font faces for every family the text tool offers.
///
/// Every family always has a regular face: the built-in faces that ship with
/// egui stand in for families without configured files. Missing bold or
/// italic faces fall back to the closest face and are synthesized when drawn.
#[derive(Clone)]
pub struct FontBook {
    faces: HashMap<FaceKey, FontArc>,
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook")
            .field("faces", &self.faces.len())
            .finish()
    }
}

impl FontBook {
    /// Only the built-in faces: a proportional face for every family except
    /// Courier, which gets the monospace face.
    pub fn builtin() -> Result<Self, FontError> {
        let proportional = FontArc::try_from_slice(epaint_default_fonts::UBUNTU_LIGHT)
            .map_err(|_| FontError::InvalidBuiltin)?;
        let monospace = FontArc::try_from_slice(epaint_default_fonts::HACK_REGULAR)
            .map_err(|_| FontError::InvalidBuiltin)?;

        let faces = FontFamily::ALL
            .into_iter()
            .map(|family| {
                let font = if family.is_monospace() {
                    monospace.clone()
                } else {
                    proportional.clone()
                };
                (
                    FaceKey {
                        family,
                        bold: false,
                        italic: false,
                    },
                    font,
                )
            })
            .collect();
        Ok(Self { faces })
    }

    /// Built-in faces overridden by the configured font files.
    pub fn load(configured: &[FontFaceConfig]) -> Result<Self, FontError> {
        let mut book = Self::builtin()?;
        for face in configured {
            let data = std::fs::read(&face.path).map_err(|source| FontError::Read {
                path: face.path.clone(),
                source,
            })?;
            let font = FontArc::try_from_vec(data).map_err(|_| FontError::Invalid(face.path.clone()))?;
            log::info!(
                "loaded {} font face (bold: {}, italic: {}) from {:?}",
                face.family.name(),
                face.bold,
                face.italic,
                face.path
            );
            book.faces.insert(
                FaceKey {
                    family: face.family,
                    bold: face.bold,
                    italic: face.italic,
                },
                font,
            );
        }
        Ok(book)
    }

    /// Pick the face for `style`, falling back towards the regular face.
    pub fn face(&self, style: &FontStyle) -> Option<Face<'_>> {
        let candidates = [
            (style.bold, style.italic),
            (style.bold, false),
            (false, style.italic),
            (false, false),
        ];
        candidates.into_iter().find_map(|(bold, italic)| {
            let key = FaceKey {
                family: style.family,
                bold,
                italic,
            };
            self.faces.get(&key).map(|font| Face {
                font,
                synthetic_bold: style.bold && !bold,
                synthetic_italic: style.italic && !italic,
            })
        })
    }
}
