mod dictionary;
mod primitive;
mod record;
mod stream;

pub use dictionary::Dictionary;
pub use primitive::{Object, ObjectId};
pub use record::Record;
pub use stream::Stream;
