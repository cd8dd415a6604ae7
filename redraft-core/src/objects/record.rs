use crate::objects::{Dictionary, ObjectId, Stream};

/// The payload stored under an identifier.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Dictionary(Dictionary),
    Stream(Stream),
}

impl Record {
    pub fn kind(&self) -> &'static str {
        match self {
            Record::Dictionary(_) => "dictionary",
            Record::Stream(_) => "stream",
        }
    }

    /// The record's dictionary; for a stream, its stream dictionary.
    pub fn dictionary(&self) -> &Dictionary {
        match self {
            Record::Dictionary(dict) => dict,
            Record::Stream(stream) => stream.dictionary(),
        }
    }

    pub fn dictionary_mut(&mut self) -> &mut Dictionary {
        match self {
            Record::Dictionary(dict) => dict,
            Record::Stream(stream) => stream.dictionary_mut(),
        }
    }

    pub fn as_stream(&self) -> Option<&Stream> {
        match self {
            Record::Stream(stream) => Some(stream),
            Record::Dictionary(_) => None,
        }
    }

    pub fn as_stream_mut(&mut self) -> Option<&mut Stream> {
        match self {
            Record::Stream(stream) => Some(stream),
            Record::Dictionary(_) => None,
        }
    }

    /// Approximate heap footprint, used for snapshot accounting.
    pub fn byte_size(&self) -> usize {
        match self {
            Record::Dictionary(dict) => dict.len() * 32,
            Record::Stream(stream) => stream.dictionary().len() * 32 + stream.len(),
        }
    }

    pub fn for_each_reference(&self, f: &mut impl FnMut(ObjectId)) {
        self.dictionary().for_each_reference(f);
    }
}

impl From<Dictionary> for Record {
    fn from(dict: Dictionary) -> Self {
        Record::Dictionary(dict)
    }
}

impl From<Stream> for Record {
    fn from(stream: Stream) -> Self {
        Record::Stream(stream)
    }
}
