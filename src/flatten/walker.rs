//! Nested document walking

use super::keys::line_item_id;
use super::types::{Flattener, LevelSpec};
use crate::types::{Context, JsonValue, Record, DATE_FIELD, LOCATION_ID_FIELD};

impl Flattener {
    /// Flatten a parsed document into records at this flattener's
    /// emitted depth.
    ///
    /// `context` filters the walk: when it carries an ancestor field
    /// that one of the levels stamps (e.g. `menu_guid`), only the
    /// matching subtree is descended. Extraction context entries that no
    /// level knows about are ignored.
    pub fn flatten(
        &self,
        payload: &JsonValue,
        location_id: &str,
        date: &str,
        context: &Context,
    ) -> Vec<Record> {
        if self.levels.is_empty() {
            return Vec::new();
        }
        let Some(roots) = self.root_collection(payload) else {
            return Vec::new();
        };

        let mut out = Vec::new();
        let mut ancestors: Vec<(&'static str, String)> = Vec::new();
        for (index, node) in roots.iter().enumerate() {
            self.walk(0, node, index, &mut ancestors, location_id, date, context, &mut out);
        }
        out
    }

    /// The root node array: either the document itself or the
    /// collection under `wrap_field`.
    fn root_collection<'a>(&self, payload: &'a JsonValue) -> Option<&'a Vec<JsonValue>> {
        match payload {
            JsonValue::Array(items) => Some(items),
            JsonValue::Object(obj) => self
                .wrap_field
                .and_then(|field| obj.get(field))
                .and_then(JsonValue::as_array),
            _ => None,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn walk(
        &self,
        depth: usize,
        node: &JsonValue,
        index: usize,
        ancestors: &mut Vec<(&'static str, String)>,
        location_id: &str,
        date: &str,
        context: &Context,
        out: &mut Vec<Record>,
    ) {
        let Some(obj) = node.as_object() else {
            return;
        };
        let level = &self.levels[depth];

        let guid = obj
            .get("guid")
            .and_then(JsonValue::as_str)
            .filter(|g| !g.is_empty());
        if level.requires_guid && guid.is_none() {
            return;
        }

        // An extraction context naming this level's guid prunes every
        // other subtree
        if let Some(wanted) = level.ancestor_field.and_then(|f| context.get(f)) {
            if guid != Some(wanted.as_str()) {
                return;
            }
        }

        if depth == self.levels.len() - 1 {
            out.push(self.emit(level, obj, index, ancestors, location_id, date));
            return;
        }

        let child_level = &self.levels[depth + 1];
        let Some(relation) = child_level.relation else {
            return;
        };
        let Some(children) = obj.get(relation).and_then(JsonValue::as_array) else {
            return;
        };

        if let (Some(field), Some(guid)) = (level.ancestor_field, guid) {
            ancestors.push((field, guid.to_string()));
            for (child_index, child) in children.iter().enumerate() {
                self.walk(
                    depth + 1,
                    child,
                    child_index,
                    ancestors,
                    location_id,
                    date,
                    context,
                    out,
                );
            }
            ancestors.pop();
        }
    }

    /// Build the output record for one emitted node
    fn emit(
        &self,
        level: &LevelSpec,
        obj: &Record,
        index: usize,
        ancestors: &[(&'static str, String)],
        location_id: &str,
        date: &str,
    ) -> Record {
        let mut record = obj.clone();
        for field in level.strip_fields {
            record.remove(*field);
        }

        record.insert(LOCATION_ID_FIELD.to_string(), serde_json::json!(location_id));
        record.insert(DATE_FIELD.to_string(), serde_json::json!(date));
        for (field, guid) in ancestors {
            record.insert((*field).to_string(), serde_json::json!(guid));
        }

        if let Some(key) = level.line_item_key {
            let parent_guid = ancestors
                .last()
                .map(|(_, guid)| guid.as_str())
                .unwrap_or_default();
            let id = line_item_id(parent_guid, index, &record);
            record.insert(key.to_string(), serde_json::json!(id));
        }

        record
    }

    /// Context handed to child extractions for one emitted record.
    ///
    /// Carries ancestor identifiers only: `location_id`, `date`, the
    /// ancestor fields stamped by outer levels, and this record's own
    /// `guid` under the emitted level's ancestor field.
    pub fn child_context(&self, record: &Record) -> Context {
        let mut context = Context::new();
        for field in [LOCATION_ID_FIELD, DATE_FIELD] {
            if let Some(value) = record.get(field).and_then(JsonValue::as_str) {
                context.insert(field.to_string(), value.to_string());
            }
        }

        let Some(last) = self.levels.len().checked_sub(1) else {
            return context;
        };
        for (depth, level) in self.levels.iter().enumerate() {
            let Some(field) = level.ancestor_field else {
                continue;
            };
            let source = if depth == last { "guid" } else { field };
            if let Some(value) = record.get(source).and_then(JsonValue::as_str) {
                context.insert(field.to_string(), value.to_string());
            }
        }
        context
    }
}
