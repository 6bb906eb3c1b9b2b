//! Typed declarations decoded from map section records
//!
//! Record order is preserved in every list. Malformed records become
//! warnings and are skipped; out-of-range direction or sub-cell values in
//! otherwise readable records abort the map.

use crate::error::{RenderError, Result, Warnings};
use crate::models::{MapDescription, Record, TilePos};
use crate::profile::GameProfile;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerrainDecl {
    pub id: String,
    pub tile: TilePos,
    pub trigger: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayDecl {
    pub id: String,
    pub tile: TilePos,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmudgeDecl {
    pub id: String,
    pub tile: TilePos,
    pub frame: usize,
}

/// Vehicle or aircraft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitDecl {
    pub house: String,
    pub id: String,
    pub health: i32,
    pub tile: TilePos,
    pub direction: u8,
    pub trigger: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfantryDecl {
    pub house: String,
    pub id: String,
    pub health: i32,
    pub tile: TilePos,
    pub subcell: u8,
    pub direction: u8,
    pub trigger: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureDecl {
    pub house: String,
    pub id: String,
    pub health: i32,
    pub tile: TilePos,
    pub direction: u8,
    pub trigger: Option<String>,
}

/// Entry of the AI base list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseDecl {
    pub id: String,
    pub tile: TilePos,
    pub number: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaypointDecl {
    pub number: u32,
    pub tile: TilePos,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellTriggerDecl {
    pub tile: TilePos,
    pub trigger: String,
}

/// Everything placed on a map, per section, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Declarations {
    pub terrain: Vec<TerrainDecl>,
    pub overlay: Vec<OverlayDecl>,
    pub smudges: Vec<SmudgeDecl>,
    pub units: Vec<UnitDecl>,
    pub aircraft: Vec<UnitDecl>,
    pub infantry: Vec<InfantryDecl>,
    pub structures: Vec<StructureDecl>,
    pub base_house: String,
    pub base: Vec<BaseDecl>,
    pub waypoints: Vec<WaypointDecl>,
    pub cell_triggers: Vec<CellTriggerDecl>,
}

/// Comma-separated fields of one record, with section context for messages.
struct Fields<'a> {
    section: &'static str,
    record: &'a Record,
    parts: Vec<&'a str>,
}

impl<'a> Fields<'a> {
    fn new(section: &'static str, record: &'a Record) -> Self {
        Self { section, record, parts: record.value.split(',').map(str::trim).collect() }
    }

    /// Record location prefix for warnings.
    fn context(&self) -> String {
        format!("[{}] {}={}", self.section, self.record.key, self.record.value)
    }

    fn text(&self, index: usize) -> std::result::Result<&'a str, String> {
        match self.parts.get(index) {
            Some(part) if !part.is_empty() => Ok(part),
            _ => Err(format!("{}: missing field {}", self.context(), index + 1)),
        }
    }

    fn number(&self, index: usize) -> std::result::Result<i64, String> {
        let text = self.text(index)?;
        text.parse().map_err(|_| format!("{}: '{}' is not a number", self.context(), text))
    }

    fn health(&self, index: usize) -> std::result::Result<i32, String> {
        let value = self.number(index)?;
        i32::try_from(value)
            .map_err(|_| format!("{}: health {} is out of range", self.context(), value))
    }

    fn trigger(&self, index: usize) -> Option<String> {
        trigger_name(self.parts.get(index).copied())
    }

    fn tile(&self, index: usize, profile: &GameProfile) -> std::result::Result<TilePos, String> {
        let cell = self.number(index)?;
        cell_tile(cell, profile)
            .ok_or_else(|| format!("{}: cell {} is outside the map", self.context(), cell))
    }
}

fn cell_tile(cell: i64, profile: &GameProfile) -> Option<TilePos> {
    profile.cell_to_tile(cell)
}

fn trigger_name(value: Option<&str>) -> Option<String> {
    match value.map(str::trim) {
        None | Some("") => None,
        Some(name) if name.eq_ignore_ascii_case("none") => None,
        Some(name) => Some(name.to_string()),
    }
}

fn key_cell(
    section: &'static str,
    record: &Record,
    profile: &GameProfile,
) -> std::result::Result<TilePos, String> {
    let context = || format!("[{}] {}={}", section, record.key, record.value);
    let cell: i64 = record
        .key
        .trim()
        .parse()
        .map_err(|_| format!("{}: key is not a cell number", context()))?;
    cell_tile(cell, profile)
        .ok_or_else(|| format!("{}: cell {} is outside the map", context(), cell))
}

fn direction(id: &str, value: i64) -> Result<u8> {
    u8::try_from(value).map_err(|_| RenderError::InvalidDirection { id: id.to_string(), value })
}

/// Decode every section the renderer uses.
pub fn decode(
    map: &MapDescription,
    profile: &GameProfile,
    warnings: &mut Warnings,
) -> Result<Declarations> {
    let mut decls = Declarations { base_house: "Neutral".to_string(), ..Default::default() };

    // Err(message) skips the record with a warning
    macro_rules! skip_on_err {
        ($expr:expr) => {
            match $expr {
                Ok(value) => value,
                Err(message) => {
                    warnings.push(message);
                    continue;
                }
            }
        };
    }

    for record in map.section("Terrain") {
        let tile = skip_on_err!(key_cell("Terrain", record, profile));
        let fields = Fields::new("Terrain", record);
        let id = skip_on_err!(fields.text(0)).to_ascii_uppercase();
        decls.terrain.push(TerrainDecl { id, tile, trigger: fields.trigger(1) });
    }

    for record in map.section("Overlay") {
        let tile = skip_on_err!(key_cell("Overlay", record, profile));
        let fields = Fields::new("Overlay", record);
        let id = skip_on_err!(fields.text(0)).to_ascii_uppercase();
        decls.overlay.push(OverlayDecl { id, tile });
    }

    for record in map.section("Smudge") {
        let fields = Fields::new("Smudge", record);
        let id = skip_on_err!(fields.text(0)).to_string();
        let tile = skip_on_err!(fields.tile(1, profile));
        let frame = if fields.parts.len() > 2 { skip_on_err!(fields.number(2)) } else { 0 };
        let frame = skip_on_err!(
            usize::try_from(frame).map_err(|_| format!("[Smudge] {}: negative frame", id))
        );
        decls.smudges.push(SmudgeDecl { id, tile, frame });
    }

    for (section, target) in [("Units", &mut decls.units), ("Aircraft", &mut decls.aircraft)] {
        for record in map.section(section) {
            let fields = Fields::new(section, record);
            let house = skip_on_err!(fields.text(0)).to_string();
            let id = skip_on_err!(fields.text(1)).to_ascii_uppercase();
            let health = skip_on_err!(fields.health(2));
            let tile = skip_on_err!(fields.tile(3, profile));
            let dir = skip_on_err!(fields.number(4));
            let direction = direction(&id, dir)?;
            let trigger = fields.trigger(6);
            target.push(UnitDecl { house, id, health, tile, direction, trigger });
        }
    }

    for record in map.section("Infantry") {
        let fields = Fields::new("Infantry", record);
        let house = skip_on_err!(fields.text(0)).to_string();
        let id = skip_on_err!(fields.text(1)).to_ascii_uppercase();
        let health = skip_on_err!(fields.health(2));
        let tile = skip_on_err!(fields.tile(3, profile));
        let sub = skip_on_err!(fields.number(4));
        let dir = skip_on_err!(fields.number(6));
        let subcell = match u8::try_from(sub) {
            Ok(value) if value <= 4 => value,
            _ => return Err(RenderError::InvalidSubcell { id, value: sub }),
        };
        let direction = direction(&id, dir)?;
        let trigger = fields.trigger(7);
        decls.infantry.push(InfantryDecl { house, id, health, tile, subcell, direction, trigger });
    }

    for record in map.section("Structures") {
        let fields = Fields::new("Structures", record);
        let house = skip_on_err!(fields.text(0)).to_string();
        let id = skip_on_err!(fields.text(1)).to_ascii_uppercase();
        let health = skip_on_err!(fields.health(2));
        let tile = skip_on_err!(fields.tile(3, profile));
        let dir = skip_on_err!(fields.number(4));
        let direction = direction(&id, dir)?;
        let trigger = fields.trigger(5);
        decls.structures.push(StructureDecl { house, id, health, tile, direction, trigger });
    }

    let mut number = 0;
    for record in map.section("Base") {
        let key = record.key.trim();
        if key.eq_ignore_ascii_case("player") {
            decls.base_house = record.value.trim().to_string();
            continue;
        }
        if key.eq_ignore_ascii_case("count") {
            continue;
        }
        let fields = Fields::new("Base", record);
        let id = skip_on_err!(fields.text(0)).to_ascii_uppercase();
        let tile = skip_on_err!(fields.tile(1, profile));
        decls.base.push(BaseDecl { id, tile, number });
        number += 1;
    }

    for record in map.section("Waypoints") {
        let waypoint: u32 = skip_on_err!(record
            .key
            .trim()
            .parse()
            .map_err(|_| format!("[Waypoints] {}: not a waypoint number", record.key)));
        let cell: i64 = skip_on_err!(record
            .value
            .trim()
            .parse()
            .map_err(|_| {
                format!("[Waypoints] {}={}: not a cell number", record.key, record.value)
            }));
        if cell < 0 {
            continue;
        }
        let tile = skip_on_err!(cell_tile(cell, profile).ok_or_else(|| {
            format!("[Waypoints] {}={}: cell is outside the map", record.key, record.value)
        }));
        decls.waypoints.push(WaypointDecl { number: waypoint, tile });
    }

    for record in map.section("CellTriggers") {
        let tile = skip_on_err!(key_cell("CellTriggers", record, profile));
        if let Some(trigger) = trigger_name(Some(&record.value)) {
            decls.cell_triggers.push(CellTriggerDecl { tile, trigger });
        }
    }

    log::debug!(
        "decoded {} terrain, {} overlay, {} smudge, {} units, {} aircraft, {} infantry, \
         {} structures, {} base",
        decls.terrain.len(),
        decls.overlay.len(),
        decls.smudges.len(),
        decls.units.len(),
        decls.aircraft.len(),
        decls.infantry.len(),
        decls.structures.len(),
        decls.base.len()
    );

    Ok(decls)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MapBounds;

    fn map() -> MapDescription {
        MapDescription::new(MapBounds::new(0, 0, 64, 64))
    }

    fn decode_ok(map: &MapDescription) -> (Declarations, Vec<String>) {
        let mut warnings = Warnings::new();
        let decls = decode(map, &GameProfile::TIBERIAN_DAWN, &mut warnings).unwrap();
        (decls, warnings.into_vec().into_iter().map(|w| w.message).collect())
    }

    #[test]
    fn test_decode_smudges_in_order() {
        let map = map().with_record("Smudge", "0", "CR1,65,0").with_record("Smudge", "1", "SC2,66");
        let (decls, warnings) = decode_ok(&map);
        assert!(warnings.is_empty());
        assert_eq!(
            decls.smudges,
            vec![
                SmudgeDecl { id: "CR1".to_string(), tile: TilePos::new(1, 1), frame: 0 },
                SmudgeDecl { id: "SC2".to_string(), tile: TilePos::new(2, 1), frame: 0 },
            ]
        );
    }

    #[test]
    fn test_decode_units_and_structures() {
        let map = map()
            .with_record("Units", "0", "GoodGuy,MTNK,256,130,64,Guard,None")
            .with_record("Structures", "0", "BadGuy,WEAP,128,200,0,trig1");
        let (decls, _) = decode_ok(&map);
        assert_eq!(decls.units[0].tile, TilePos::new(2, 2));
        assert_eq!(decls.units[0].direction, 64);
        assert_eq!(decls.units[0].trigger, None);
        assert_eq!(decls.structures[0].id, "WEAP");
        assert_eq!(decls.structures[0].trigger.as_deref(), Some("trig1"));
    }

    #[test]
    fn test_malformed_records_warn_and_skip() {
        let map = map()
            .with_record("Terrain", "abc", "TREE1,None")
            .with_record("Terrain", "70", "TREE2,None")
            .with_record("Units", "0", "GoodGuy,MTNK,256")
            .with_record("Overlay", "999999", "TI1");
        let (decls, warnings) = decode_ok(&map);
        assert_eq!(decls.terrain.len(), 1);
        assert!(decls.units.is_empty());
        assert!(decls.overlay.is_empty());
        assert_eq!(warnings.len(), 3);
        assert!(warnings[1].contains("missing field 4"));
    }

    #[test]
    fn test_oversized_health_warns_and_skips() {
        let map = map()
            .with_record("Structures", "0", "GoodGuy,WEAP,4294967552,200,0")
            .with_record("Structures", "1", "GoodGuy,PYLE,256,300,0");
        let (decls, warnings) = decode_ok(&map);
        assert_eq!(decls.structures.len(), 1);
        assert_eq!(decls.structures[0].id, "PYLE");
        assert_eq!(decls.structures[0].health, 256);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("health 4294967552 is out of range"));
    }

    #[test]
    fn test_direction_out_of_range_is_fatal() {
        let map = map().with_record("Units", "0", "GoodGuy,MTNK,256,130,300,Guard,None");
        let mut warnings = Warnings::new();
        let err = decode(&map, &GameProfile::TIBERIAN_DAWN, &mut warnings).unwrap_err();
        assert_eq!(err, RenderError::InvalidDirection { id: "MTNK".to_string(), value: 300 });
    }

    #[test]
    fn test_subcell_out_of_range_is_fatal() {
        let map = map().with_record("Infantry", "0", "GoodGuy,E1,256,130,7,Guard,0,None");
        let mut warnings = Warnings::new();
        let err = decode(&map, &GameProfile::TIBERIAN_DAWN, &mut warnings).unwrap_err();
        assert_eq!(err, RenderError::InvalidSubcell { id: "E1".to_string(), value: 7 });
    }

    #[test]
    fn test_base_list_numbers_entries() {
        let map = map()
            .with_record("Base", "Player", "BadGuy")
            .with_record("Base", "Count", "2")
            .with_record("Base", "000", "NUKE,325")
            .with_record("Base", "001", "PYLE,330");
        let (decls, _) = decode_ok(&map);
        assert_eq!(decls.base_house, "BadGuy");
        assert_eq!(decls.base.len(), 2);
        assert_eq!(decls.base[1].number, 1);
        assert_eq!(decls.base[1].tile, TilePos::new(10, 5));
    }

    #[test]
    fn test_waypoints_skip_unused() {
        let map = map().with_record("Waypoints", "0", "-1").with_record("Waypoints", "1", "65");
        let (decls, warnings) = decode_ok(&map);
        assert!(warnings.is_empty());
        assert_eq!(decls.waypoints, vec![WaypointDecl { number: 1, tile: TilePos::new(1, 1) }]);
    }

    #[test]
    fn test_cell_triggers() {
        let map = map()
            .with_record("CellTriggers", "66", "win")
            .with_record("CellTriggers", "67", "None");
        let (decls, _) = decode_ok(&map);
        assert_eq!(
            decls.cell_triggers,
            vec![CellTriggerDecl { tile: TilePos::new(2, 1), trigger: "win".to_string() }]
        );
    }
}
