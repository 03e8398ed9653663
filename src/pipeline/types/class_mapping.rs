use std::path::Path;

use image::Rgb;
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::error::AnalysisError;

const DEFAULT_PLANT_TYPE: &str = "Plant";
const DEFAULT_COLORS: [&str; 3] = ["#4CAF50", "#FF9800", "#F44336"];

/// Mapping document as written next to a trained model.
#[derive(Debug, Deserialize)]
struct ClassMappingDocument {
    #[serde(alias = "nombres_display")]
    display_names: Vec<String>,
    #[serde(default, alias = "tipo_planta")]
    plant_type: Option<String>,
    #[serde(default, alias = "mapeo_generador_a_original")]
    index_translation: Option<IndexMap<String, Value>>,
    #[serde(default, alias = "colores")]
    colors: Option<Vec<String>>,
}

/// Validated description of a model's output classes.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassMapping {
    display_names: Vec<String>,
    plant_type: String,
    index_translation: Option<IndexTranslation>,
    palette: ClassPalette,
}

impl ClassMapping {
    pub fn new(display_names: Vec<String>) -> Result<Self, AnalysisError> {
        if display_names.is_empty() {
            return Err(AnalysisError::InvalidMapping(
                "at least one display name is required".to_string(),
            ));
        }
        Ok(Self {
            display_names,
            plant_type: DEFAULT_PLANT_TYPE.to_string(),
            index_translation: None,
            palette: ClassPalette::default(),
        })
    }

    pub fn with_plant_type(mut self, plant_type: impl Into<String>) -> Self {
        self.plant_type = plant_type.into();
        self
    }

    pub fn with_translation(mut self, translation: IndexTranslation) -> Result<Self, AnalysisError> {
        translation.check_bounds(self.class_count())?;
        self.index_translation = Some(translation);
        Ok(self)
    }

    pub fn with_palette(mut self, palette: ClassPalette) -> Self {
        self.palette = palette;
        self
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, AnalysisError> {
        let document: ClassMappingDocument = serde_json::from_slice(bytes)
            .map_err(|e| AnalysisError::InvalidMapping(e.to_string()))?;
        Self::from_document(document)
    }

    pub fn from_path(path: &Path) -> Result<Self, AnalysisError> {
        let bytes = std::fs::read(path).map_err(|e| {
            AnalysisError::InvalidMapping(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json_slice(&bytes)
    }

    fn from_document(document: ClassMappingDocument) -> Result<Self, AnalysisError> {
        let mut mapping = Self::new(document.display_names)?;
        if let Some(plant_type) = document.plant_type {
            mapping = mapping.with_plant_type(plant_type);
        }
        if let Some(raw) = document.index_translation {
            mapping = mapping.with_translation(IndexTranslation::parse(&raw)?)?;
        }
        if let Some(colors) = document.colors {
            mapping = mapping.with_palette(ClassPalette::from_hex(&colors)?);
        }
        Ok(mapping)
    }

    pub fn class_count(&self) -> usize {
        self.display_names.len()
    }

    pub fn display_names(&self) -> &[String] {
        &self.display_names
    }

    pub fn display_name(&self, index: usize) -> Option<&str> {
        self.display_names.get(index).map(String::as_str)
    }

    pub fn plant_type(&self) -> &str {
        &self.plant_type
    }

    pub fn index_translation(&self) -> Option<&IndexTranslation> {
        self.index_translation.as_ref()
    }

    pub fn palette(&self) -> &ClassPalette {
        &self.palette
    }
}

/// Native model index -> canonical display index pairs, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexTranslation {
    pairs: Vec<(usize, usize)>,
}

impl IndexTranslation {
    pub fn new(pairs: Vec<(usize, usize)>) -> Self {
        Self { pairs }
    }

    /// Parses a JSON object whose keys and values are integer indices, usually as strings.
    pub fn parse(raw: &IndexMap<String, Value>) -> Result<Self, AnalysisError> {
        let pairs = raw
            .iter()
            .map(|(key, value)| Ok((parse_index(key)?, parse_value_index(value)?)))
            .collect::<Result<Vec<_>, AnalysisError>>()?;
        Ok(Self { pairs })
    }

    pub fn pairs(&self) -> &[(usize, usize)] {
        &self.pairs
    }

    fn check_bounds(&self, class_count: usize) -> Result<(), AnalysisError> {
        for &(native, canonical) in &self.pairs {
            if native >= class_count || canonical >= class_count {
                return Err(AnalysisError::InvalidMapping(format!(
                    "translation {native} -> {canonical} is outside 0..{class_count}"
                )));
            }
        }
        Ok(())
    }
}

fn parse_index(text: &str) -> Result<usize, AnalysisError> {
    text.trim().parse::<usize>().map_err(|_| {
        AnalysisError::InvalidMapping(format!("'{text}' is not a class index"))
    })
}

fn parse_value_index(value: &Value) -> Result<usize, AnalysisError> {
    match value {
        Value::String(text) => parse_index(text),
        Value::Number(number) => number
            .as_u64()
            .map(|n| n as usize)
            .ok_or_else(|| AnalysisError::InvalidMapping(format!("'{number}' is not a class index"))),
        other => Err(AnalysisError::InvalidMapping(format!(
            "'{other}' is not a class index"
        ))),
    }
}

/// Fixed bar colors per canonical class, reused cyclically when classes outnumber colors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassPalette {
    colors: Vec<Rgb<u8>>,
}

impl ClassPalette {
    pub fn new(colors: Vec<Rgb<u8>>) -> Result<Self, AnalysisError> {
        if colors.is_empty() {
            return Err(AnalysisError::InvalidMapping(
                "palette needs at least one color".to_string(),
            ));
        }
        Ok(Self { colors })
    }

    pub fn from_hex<S: AsRef<str>>(colors: &[S]) -> Result<Self, AnalysisError> {
        let colors = colors
            .iter()
            .map(|c| parse_hex_color(c.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(colors)
    }

    pub fn color_for(&self, class_index: usize) -> Rgb<u8> {
        self.colors[class_index % self.colors.len()]
    }
}

impl Default for ClassPalette {
    fn default() -> Self {
        let colors = DEFAULT_COLORS
            .iter()
            .filter_map(|hex| parse_hex_color(hex).ok())
            .collect();
        Self { colors }
    }
}

pub fn parse_hex_color(text: &str) -> Result<Rgb<u8>, AnalysisError> {
    let invalid = || AnalysisError::InvalidMapping(format!("'{text}' is not a #RRGGBB color"));
    let hex = text.strip_prefix('#').ok_or_else(invalid)?;
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(invalid());
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16).map_err(|_| invalid())
    };
    Ok(Rgb([channel(0..2)?, channel(2..4)?, channel(4..6)?]))
}
