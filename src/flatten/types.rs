//! Flattening configuration

/// One depth in a nested document.
///
/// A path of levels describes how to reach the emitted collection:
/// `relation` names the array field on the parent node holding this
/// level's nodes (`None` for the root collection), and `ancestor_field`
/// is the name under which this node's `guid` is stamped onto descendant
/// records (e.g. `menu_guid`).
#[derive(Debug, Clone)]
pub struct LevelSpec {
    /// Array field on the parent holding this level's nodes
    pub relation: Option<&'static str>,
    /// Field name this level's guid takes on descendant records; also
    /// the context key used to filter this level in child extractions
    pub ancestor_field: Option<&'static str>,
    /// Fields holding deeper collections, removed from emitted records
    pub strip_fields: &'static [&'static str],
    /// Nodes without a non-empty `guid` are skipped entirely
    pub requires_guid: bool,
    /// Synthesized line-item identifier field for guid-less collections
    /// (prices); see [`super::line_item_id`]
    pub line_item_key: Option<&'static str>,
}

impl LevelSpec {
    /// A guid-carrying level stamped as `ancestor_field` on descendants
    pub fn keyed(
        relation: Option<&'static str>,
        ancestor_field: &'static str,
        strip_fields: &'static [&'static str],
    ) -> Self {
        Self {
            relation,
            ancestor_field: Some(ancestor_field),
            strip_fields,
            requires_guid: true,
            line_item_key: None,
        }
    }

    /// A leaf level whose nodes carry no guid; records get a synthesized
    /// identifier under `line_item_key`
    pub fn line_items(relation: &'static str, line_item_key: &'static str) -> Self {
        Self {
            relation: Some(relation),
            ancestor_field: None,
            strip_fields: &[],
            requires_guid: false,
            line_item_key: Some(line_item_key),
        }
    }
}

/// A complete flattening: the path of levels from the root collection
/// to the emitted depth.
#[derive(Debug, Clone)]
pub struct Flattener {
    /// Levels from root to emitted depth; the last one is emitted
    pub levels: Vec<LevelSpec>,
    /// Key under which an object-wrapped document holds the root
    /// collection; bare-array documents ignore this
    pub wrap_field: Option<&'static str>,
}

impl Flattener {
    /// `levels` is the path from the root collection to the emitted
    /// depth. An empty path describes no depth at all: it flattens to
    /// nothing and contributes no child-context identifiers.
    pub fn new(levels: Vec<LevelSpec>, wrap_field: Option<&'static str>) -> Self {
        Self { levels, wrap_field }
    }
}
