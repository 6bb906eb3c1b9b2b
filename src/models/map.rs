//! Decoded map description: terrain templates plus ordered section records.

use std::collections::HashMap;

use super::tile::{MapBounds, TilePos};

/// One key/value line of a map section, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub key: String,
    pub value: String,
}

impl Record {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: key.into(), value: value.into() }
    }
}

/// Background terrain tile: which template, and which icon inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateCell {
    pub template: String,
    pub icon: usize,
}

impl TemplateCell {
    pub fn new(template: impl Into<String>, icon: usize) -> Self {
        Self { template: template.into(), icon }
    }
}

/// Everything the renderer needs from a decoded map file.
///
/// Section names are matched case-insensitively. Record order inside a
/// section is preserved exactly; it decides draw order and merge outcomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapDescription {
    pub bounds: MapBounds,
    /// Full-grid template layer, row-major over the game profile's grid.
    /// Empty when the map carries no template data.
    pub templates: Vec<Option<TemplateCell>>,
    sections: HashMap<String, Vec<Record>>,
}

impl MapDescription {
    pub fn new(bounds: MapBounds) -> Self {
        Self { bounds, templates: Vec::new(), sections: HashMap::new() }
    }

    /// Append a record to a section, creating the section on first use.
    pub fn push_record(&mut self, section: &str, key: impl Into<String>, value: impl Into<String>) {
        self.sections
            .entry(section.to_ascii_uppercase())
            .or_default()
            .push(Record::new(key, value));
    }

    /// Builder form of [`push_record`](Self::push_record).
    pub fn with_record(
        mut self,
        section: &str,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.push_record(section, key, value);
        self
    }

    /// Records of a section in declaration order; empty if absent.
    pub fn section(&self, name: &str) -> &[Record] {
        self.sections.get(&name.to_ascii_uppercase()).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Template at a grid position, given the grid width.
    pub fn template_at(&self, pos: TilePos, grid_width: u32) -> Option<&TemplateCell> {
        if pos.x < 0 || pos.y < 0 {
            return None;
        }
        let index = pos.y as usize * grid_width as usize + pos.x as usize;
        self.templates.get(index).and_then(Option::as_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_lookup_is_case_insensitive_and_ordered() {
        let map = MapDescription::new(MapBounds::new(0, 0, 4, 4))
            .with_record("Smudge", "0", "CR1,0")
            .with_record("SMUDGE", "1", "SC1,1");

        let records = map.section("smudge");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].value, "CR1,0");
        assert_eq!(records[1].value, "SC1,1");
        assert!(map.section("Units").is_empty());
    }

    #[test]
    fn test_template_at() {
        let mut map = MapDescription::new(MapBounds::new(0, 0, 2, 2));
        map.templates = vec![None, Some(TemplateCell::new("S01", 3)), None, None];
        assert_eq!(map.template_at(TilePos::new(1, 0), 2), Some(&TemplateCell::new("S01", 3)));
        assert_eq!(map.template_at(TilePos::new(0, 1), 2), None);
        assert_eq!(map.template_at(TilePos::new(-1, 0), 2), None);
    }
}
