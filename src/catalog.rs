//! Built-in per-id type facts: footprints, bibs, turrets, overlay classes, houses.

use crate::remap::HOUSE_RAMP_LEN;

/// Footprint and bib of a structure type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructureType {
    pub width: u32,
    pub height: u32,
    pub bib: bool,
}

impl StructureType {
    const fn new(width: u32, height: u32, bib: bool) -> Self {
        Self { width, height, bib }
    }
}

const STRUCTURES: &[(&str, StructureType)] = &[
    // Tiberian Dawn
    ("AFLD", StructureType::new(4, 2, true)),
    ("ATWR", StructureType::new(1, 2, false)),
    ("EYE", StructureType::new(2, 2, true)),
    ("FACT", StructureType::new(3, 2, true)),
    ("FIX", StructureType::new(3, 3, true)),
    ("GTWR", StructureType::new(1, 1, false)),
    ("GUN", StructureType::new(1, 1, false)),
    ("HAND", StructureType::new(2, 3, true)),
    ("HPAD", StructureType::new(2, 2, true)),
    ("HQ", StructureType::new(2, 2, true)),
    ("NUK2", StructureType::new(2, 2, true)),
    ("NUKE", StructureType::new(2, 2, true)),
    ("OBLI", StructureType::new(1, 2, false)),
    ("PROC", StructureType::new(3, 3, true)),
    ("PYLE", StructureType::new(2, 2, true)),
    ("SAM", StructureType::new(2, 1, false)),
    ("SILO", StructureType::new(2, 1, false)),
    ("TMPL", StructureType::new(3, 3, true)),
    ("WEAP", StructureType::new(3, 3, true)),
    // Red Alert
    ("APWR", StructureType::new(3, 3, true)),
    ("ATEK", StructureType::new(2, 2, true)),
    ("BARR", StructureType::new(2, 2, true)),
    ("DOME", StructureType::new(2, 2, true)),
    ("IRON", StructureType::new(2, 2, true)),
    ("KENN", StructureType::new(1, 1, false)),
    ("MSLO", StructureType::new(2, 1, false)),
    ("PDOX", StructureType::new(2, 2, true)),
    ("POWR", StructureType::new(2, 2, true)),
    ("SPEN", StructureType::new(3, 3, false)),
    ("STEK", StructureType::new(2, 2, true)),
    ("SYRD", StructureType::new(3, 3, false)),
    ("TENT", StructureType::new(2, 2, true)),
];

/// Footprint of a structure id; unknown ids are 1×1 without bib.
pub fn structure_type(id: &str) -> StructureType {
    STRUCTURES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(id))
        .map(|(_, ty)| *ty)
        .unwrap_or(StructureType::new(1, 1, false))
}

const TURRET_UNITS: &[&str] = &["1TNK", "2TNK", "3TNK", "4TNK", "HTNK", "JEEP", "LTNK", "MTNK"];

/// Units whose sheet carries 32 turret facings after the 32 body facings.
pub fn has_turret(id: &str) -> bool {
    TURRET_UNITS.iter().any(|name| name.eq_ignore_ascii_case(id))
}

const CONCEALED: &[&str] = &["MINP", "MINV", "STNK"];

/// Objects the game hides from the player.
pub fn is_concealed(id: &str) -> bool {
    CONCEALED.iter().any(|name| name.eq_ignore_ascii_case(id))
}

/// How an overlay id picks its frame and plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayClass {
    /// Connects to same-id neighbors.
    Wall,
    /// Density follows the number of resource neighbors.
    Resource,
    Crate,
    Plain,
}

const WALLS: &[&str] = &["BARB", "BRIK", "CYCL", "FENC", "SBAG", "WOOD"];
const CRATES: &[&str] = &["SCRATE", "WCRATE", "WWCRATE"];
const RESOURCE_PREFIXES: &[&str] = &["TI", "GOLD", "GEM"];

pub fn overlay_class(id: &str) -> OverlayClass {
    let upper = id.to_ascii_uppercase();
    if WALLS.contains(&upper.as_str()) {
        OverlayClass::Wall
    } else if CRATES.contains(&upper.as_str()) {
        OverlayClass::Crate
    } else if RESOURCE_PREFIXES.iter().any(|prefix| {
        upper
            .strip_prefix(prefix)
            .is_some_and(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()))
    }) {
        OverlayClass::Resource
    } else {
        OverlayClass::Plain
    }
}

const fn ramp_from(start: u8) -> [u8; HOUSE_RAMP_LEN] {
    let mut ramp = [0u8; HOUSE_RAMP_LEN];
    let mut i = 0;
    while i < HOUSE_RAMP_LEN {
        ramp[i] = start + i as u8;
        i += 1;
    }
    ramp
}

const HOUSES: &[(&str, [u8; HOUSE_RAMP_LEN])] = &[
    ("GoodGuy", ramp_from(176)),
    ("BadGuy", [127, 126, 125, 124, 122, 46, 120, 47, 125, 124, 123, 122, 42, 121, 120, 120]),
    ("Neutral", ramp_from(176)),
    ("Special", ramp_from(176)),
    ("Greece", ramp_from(176)),
    ("USSR", [229, 230, 231, 232, 233, 234, 235, 8, 236, 237, 238, 239, 221, 222, 223, 223]),
    ("Multi1", ramp_from(208)),
    ("Multi2", ramp_from(224)),
    ("Multi3", ramp_from(80)),
    ("Multi4", ramp_from(96)),
    ("Multi5", ramp_from(112)),
    ("Multi6", ramp_from(16)),
];

/// House-color ramp for a house name.
pub fn house_ramp(house: &str) -> Option<[u8; HOUSE_RAMP_LEN]> {
    HOUSES.iter().find(|(name, _)| name.eq_ignore_ascii_case(house)).map(|(_, ramp)| *ramp)
}
