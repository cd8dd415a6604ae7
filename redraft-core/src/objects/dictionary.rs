use crate::objects::{Object, ObjectId};
use indexmap::IndexMap;

/// An insertion-ordered PDF dictionary.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dictionary {
    entries: IndexMap<String, Object>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Object>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Object> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Object> {
        self.entries.get_mut(key)
    }

    /// Removes `key`, keeping the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<Object> {
        self.entries.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &Object> {
        self.entries.values()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&String, &Object)> {
        self.entries.iter()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Object)> {
        self.entries.iter()
    }

    pub fn get_dict(&self, key: &str) -> Option<&Dictionary> {
        self.get(key).and_then(Object::as_dict)
    }

    pub fn get_dict_mut(&mut self, key: &str) -> Option<&mut Dictionary> {
        match self.entries.get_mut(key) {
            Some(Object::Dictionary(dict)) => Some(dict),
            _ => None,
        }
    }

    pub fn get_reference(&self, key: &str) -> Option<ObjectId> {
        self.get(key).and_then(Object::as_reference)
    }

    pub fn get_array_mut(&mut self, key: &str) -> Option<&mut Vec<Object>> {
        self.entries.get_mut(key).and_then(Object::as_array_mut)
    }

    /// Returns the nested dictionary under `key`, inserting an empty one
    /// if the key is missing or holds another kind of value.
    pub fn dict_entry(&mut self, key: &str) -> &mut Dictionary {
        let slot = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| Object::Dictionary(Dictionary::new()));
        if !matches!(slot, Object::Dictionary(_)) {
            *slot = Object::Dictionary(Dictionary::new());
        }
        match slot {
            Object::Dictionary(dict) => dict,
            _ => unreachable!("slot was just set to a dictionary"),
        }
    }

    pub fn for_each_reference(&self, f: &mut impl FnMut(ObjectId)) {
        for value in self.entries.values() {
            value.for_each_reference(f);
        }
    }
}

impl FromIterator<(String, Object)> for Dictionary {
    fn from_iter<T: IntoIterator<Item = (String, Object)>>(iter: T) -> Self {
        let mut dict = Dictionary::new();
        for (key, value) in iter {
            dict.set(key, value);
        }
        dict
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_dictionary() {
        let dict = Dictionary::new();
        assert!(dict.is_empty());
        assert_eq!(dict.len(), 0);
    }

    #[test]
    fn test_set_and_get() {
        let mut dict = Dictionary::new();
        dict.set("Name", "Test");
        dict.set("Age", 42);
        dict.set("Active", true);

        assert_eq!(dict.get("Name"), Some(&Object::String("Test".to_string())));
        assert_eq!(dict.get("Age"), Some(&Object::Integer(42)));
        assert_eq!(dict.get("Active"), Some(&Object::Boolean(true)));
        assert_eq!(dict.get("Missing"), None);
    }

    #[test]
    fn test_keys_keep_insertion_order() {
        let mut dict = Dictionary::new();
        dict.set("Type", Object::name("Page"));
        dict.set("Parent", ObjectId::new(2, 0));
        dict.set("MediaBox", vec![Object::Integer(0)]);
        dict.set("Contents", ObjectId::new(4, 0));

        let keys: Vec<_> = dict.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Type", "Parent", "MediaBox", "Contents"]);
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut dict = Dictionary::new();
        dict.set("A", 1);
        dict.set("B", 2);
        dict.set("C", 3);

        assert_eq!(dict.remove("A"), Some(Object::Integer(1)));
        let keys: Vec<_> = dict.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["B", "C"]);
        assert_eq!(dict.remove("A"), None);
    }

    #[test]
    fn test_get_mut() {
        let mut dict = Dictionary::new();
        dict.set("Counter", 1);

        if let Some(Object::Integer(val)) = dict.get_mut("Counter") {
            *val = 2;
        }

        assert_eq!(dict.get("Counter"), Some(&Object::Integer(2)));
    }

    #[test]
    fn test_get_reference() {
        let mut dict = Dictionary::new();
        dict.set("Contents", ObjectId::new(8, 0));
        dict.set("Count", 3);

        assert_eq!(dict.get_reference("Contents"), Some(ObjectId::new(8, 0)));
        assert_eq!(dict.get_reference("Count"), None);
    }

    #[test]
    fn test_dict_entry_creates_and_replaces() {
        let mut dict = Dictionary::new();
        dict.dict_entry("Font").set("F1", ObjectId::new(3, 0));
        dict.set("XObject", 7);
        dict.dict_entry("XObject").set("Im1", ObjectId::new(4, 0));

        assert_eq!(
            dict.get_dict("Font").and_then(|f| f.get_reference("F1")),
            Some(ObjectId::new(3, 0))
        );
        assert!(dict.get_dict("XObject").is_some());
    }

    #[test]
    fn test_nested_dictionaries() {
        let mut root = Dictionary::new();
        let mut level1 = Dictionary::new();
        let mut level2 = Dictionary::new();

        level2.set("DeepValue", "Found");
        level1.set("Level2", Object::Dictionary(level2));
        root.set("Level1", Object::Dictionary(level1));

        let deep_value = root
            .get_dict("Level1")
            .and_then(|l1| l1.get_dict("Level2"))
            .and_then(|l2| l2.get("DeepValue"));

        assert_eq!(deep_value, Some(&Object::String("Found".to_string())));
    }

    #[test]
    fn test_from_iterator() {
        let items = vec![
            ("Name".to_string(), Object::String("Test".to_string())),
            ("Count".to_string(), Object::Integer(5)),
        ];

        let dict: Dictionary = items.into_iter().collect();

        assert_eq!(dict.len(), 2);
        assert_eq!(dict.get("Count"), Some(&Object::Integer(5)));
    }
}
