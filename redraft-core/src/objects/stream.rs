use crate::objects::Dictionary;

/// A stream record: its dictionary plus the raw bytes.
///
/// `Length` is kept in sync by every method that changes the data.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Stream {
    dictionary: Dictionary,
    data: Vec<u8>,
}

impl Stream {
    pub fn new(data: Vec<u8>) -> Self {
        Self::with_dictionary(Dictionary::new(), data)
    }

    pub fn with_dictionary(dictionary: Dictionary, data: Vec<u8>) -> Self {
        let mut dict = dictionary;
        dict.set("Length", data.len() as i64);

        Self {
            dictionary: dict,
            data,
        }
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn dictionary_mut(&mut self) -> &mut Dictionary {
        &mut self.dictionary
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn append(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
        self.sync_length();
    }

    pub fn set_data(&mut self, data: Vec<u8>) {
        self.data = data;
        self.sync_length();
    }

    fn sync_length(&mut self) {
        self.dictionary.set("Length", self.data.len() as i64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::Object;

    #[test]
    fn test_stream_new() {
        let data = vec![1, 2, 3, 4, 5];
        let stream = Stream::new(data.clone());

        assert_eq!(stream.data(), &data);
        assert_eq!(stream.dictionary().get("Length"), Some(&Object::Integer(5)));
    }

    #[test]
    fn test_stream_with_existing_length() {
        let mut dict = Dictionary::new();
        dict.set("Length", 999);
        dict.set("Type", Object::name("XObject"));

        let stream = Stream::with_dictionary(dict, vec![1, 2, 3, 4, 5]);

        assert_eq!(stream.dictionary().get("Length"), Some(&Object::Integer(5)));
    }

    #[test]
    fn test_append_updates_length() {
        let mut stream = Stream::new(b"q\n".to_vec());
        stream.append(b"Q\n");

        assert_eq!(stream.data(), b"q\nQ\n");
        assert_eq!(stream.dictionary().get("Length"), Some(&Object::Integer(4)));
    }

    #[test]
    fn test_set_data_updates_length() {
        let mut stream = Stream::new(b"abcdef".to_vec());
        stream.set_data(Vec::new());

        assert!(stream.is_empty());
        assert_eq!(stream.dictionary().get("Length"), Some(&Object::Integer(0)));
    }
}
