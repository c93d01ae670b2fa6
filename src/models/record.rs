//! Field access shared by households and individuals

use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::filter::FieldPath;

/// Separator between relation segments of a core path (`admin1__p_code`)
const PATH_SEPARATOR: &str = "__";

/// An entity predicates can be evaluated against
pub trait Record {
    /// Unicef ID of the entity
    fn unicef_id(&self) -> &str;

    /// Value of a top-level core field, `None` when unset
    fn core_value(&self, name: &str) -> Option<Value>;

    /// Flexible field values keyed by field name
    fn flex_fields(&self) -> &FxHashMap<String, Value>;

    /// Value stored at a predicate path; JSON null counts as missing
    fn value_at(&self, path: &FieldPath) -> Option<Value> {
        let value = match path {
            FieldPath::Core(path) => {
                let mut segments = path.split(PATH_SEPARATOR);
                let root = self.core_value(segments.next()?)?;
                segments.try_fold(root, |value, key| value.get(key).cloned())
            }
            FieldPath::Flex(name) => self.flex_fields().get(name).cloned(),
            FieldPath::Periodic { name, round } => self
                .flex_fields()
                .get(name)
                .and_then(|rounds| rounds.get(round.to_string()))
                .and_then(|entry| entry.get("value"))
                .cloned(),
        };
        value.filter(|value| !value.is_null())
    }
}
