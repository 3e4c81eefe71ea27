use chrono::NaiveDate;

use crate::{
    error::{EmojidayError, EmojidayResult},
    layout::GLYPHS_PER_ROW,
};

/// One visually-single emoji character, possibly composed of several code
/// points (joiners, variation selectors, regional indicators).
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Glyph {
    pub char: String,
    #[serde(default)]
    pub label: Option<String>,
}

impl Glyph {
    pub fn new(char: impl Into<String>) -> Self {
        Self {
            char: char.into(),
            label: None,
        }
    }

    pub fn with_label(char: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            char: char.into(),
            label: Some(label.into()),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Row of [`GLYPHS_PER_ROW`] glyphs on a rounded card.
    #[default]
    Normal,
    /// One large "essence" glyph, no card.
    Essence,
}

/// Immutable description of a single render.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct RenderRequest {
    pub glyphs: Vec<Glyph>,
    pub date: NaiveDate,
    /// RFC-3339-style timestamp from the upstream document; drives output
    /// file naming when present.
    #[serde(default)]
    pub timestamp: Option<String>,
    pub mode: RenderMode,
}

impl RenderRequest {
    pub fn validate(&self) -> EmojidayResult<()> {
        match self.mode {
            RenderMode::Normal => {
                if self.glyphs.len() != GLYPHS_PER_ROW {
                    return Err(EmojidayError::validation(format!(
                        "normal mode requires exactly {GLYPHS_PER_ROW} glyphs, got {}",
                        self.glyphs.len()
                    )));
                }
            }
            RenderMode::Essence => {
                if self.glyphs.len() != 1 {
                    return Err(EmojidayError::validation(format!(
                        "essence mode requires exactly 1 glyph, got {}",
                        self.glyphs.len()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Date as rendered on the card, e.g. `22 Nov 2025`.
    pub fn formatted_date(&self) -> String {
        self.date.format("%-d %b %Y").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(mode: RenderMode, n: usize) -> RenderRequest {
        RenderRequest {
            glyphs: (0..n).map(|_| Glyph::new("🌍")).collect(),
            date: NaiveDate::from_ymd_opt(2025, 11, 22).unwrap(),
            timestamp: None,
            mode,
        }
    }

    #[test]
    fn normal_mode_requires_full_row() {
        assert!(request(RenderMode::Normal, GLYPHS_PER_ROW).validate().is_ok());
        assert!(request(RenderMode::Normal, 4).validate().is_err());
        assert!(request(RenderMode::Normal, 0).validate().is_err());
    }

    #[test]
    fn essence_mode_requires_single_glyph() {
        assert!(request(RenderMode::Essence, 1).validate().is_ok());
        assert!(request(RenderMode::Essence, 2).validate().is_err());
        assert!(request(RenderMode::Essence, 0).validate().is_err());
    }

    #[test]
    fn date_formats_without_zero_padding() {
        let mut req = request(RenderMode::Essence, 1);
        req.date = NaiveDate::from_ymd_opt(2025, 11, 2).unwrap();
        assert_eq!(req.formatted_date(), "2 Nov 2025");
    }

    #[test]
    fn json_roundtrip() {
        let req = request(RenderMode::Normal, GLYPHS_PER_ROW);
        let s = serde_json::to_string(&req).unwrap();
        let de: RenderRequest = serde_json::from_str(&s).unwrap();
        assert_eq!(de.glyphs.len(), GLYPHS_PER_ROW);
        assert_eq!(de.mode, RenderMode::Normal);
        assert!(s.contains("\"normal\""));
    }
}
