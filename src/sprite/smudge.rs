//! Ground-overlay classification: craters, scorch marks and bibs.

/// Category of a smudge sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SmudgeType {
    Crater,
    Scorch,
    /// Bib declared directly in the smudge section.
    SmudgeBib,
    /// Bib synthesized from a structure footprint.
    StructureBib,
    Undefined,
}

/// Lookup-only reference to the structure a bib belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StructureRef {
    /// Whether the index points into the base list rather than the placed structures.
    pub base: bool,
    pub index: usize,
}

/// Smudge-specific sprite state.
#[derive(Debug, Clone, PartialEq)]
pub struct SmudgeState {
    pub kind: SmudgeType,
    pub owner: Option<StructureRef>,
}

impl SmudgeState {
    pub fn new(kind: SmudgeType) -> Self {
        Self { kind, owner: None }
    }

    pub fn owned_by(kind: SmudgeType, owner: StructureRef) -> Self {
        Self { kind, owner: Some(owner) }
    }
}

/// Classify a smudge id and return the id it is drawn with.
///
/// Every crater id collapses to `CR1`, as the game itself does.
pub fn classify_smudge(id: &str) -> (SmudgeType, String) {
    let upper = id.trim().to_ascii_uppercase();
    if bib_width(&upper).is_some() {
        return (SmudgeType::SmudgeBib, upper);
    }
    if let Some(n) = numbered(&upper, "CR") {
        if (1..=6).contains(&n) {
            return (SmudgeType::Crater, "CR1".to_string());
        }
    }
    if let Some(n) = numbered(&upper, "SC") {
        if (1..=6).contains(&n) {
            return (SmudgeType::Scorch, upper);
        }
    }
    (SmudgeType::Undefined, upper)
}

fn numbered(id: &str, prefix: &str) -> Option<u32> {
    let rest = id.strip_prefix(prefix)?;
    if rest.len() != 1 {
        return None;
    }
    rest.parse().ok()
}

/// Bib id used for a structure of the given tile width.
pub fn bib_id_for_width(width: u32) -> Option<&'static str> {
    match width {
        2 => Some("BIB3"),
        3 => Some("BIB2"),
        4 => Some("BIB1"),
        _ => None,
    }
}

/// Tile width of a bib id. Bibs are always two rows tall.
pub fn bib_width(id: &str) -> Option<u32> {
    match id.to_ascii_uppercase().as_str() {
        "BIB1" => Some(4),
        "BIB2" => Some(3),
        "BIB3" => Some(2),
        _ => None,
    }
}
