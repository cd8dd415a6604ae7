use crate::document::Document;
use crate::error::{PdfError, Result};
use crate::objects::{Dictionary, Object, ObjectId, Record};
use std::collections::HashMap;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

pub struct PdfWriter<W: Write> {
    writer: W,
    xref_positions: HashMap<ObjectId, u64>,
    current_position: u64,
}

impl<W: Write> PdfWriter<W> {
    pub fn new_with_writer(writer: W) -> Self {
        Self {
            writer,
            xref_positions: HashMap::new(),
            current_position: 0,
        }
    }

    /// Writes every live record of `document` followed by the
    /// cross-reference table and trailer.
    ///
    /// # Errors
    ///
    /// Fails with `TransactionMisuse` while a transaction is open and with
    /// `DanglingReference` if a live record points at a missing one.
    pub fn write_document(&mut self, document: &Document) -> Result<()> {
        ensure_closed(document)?;
        document.store().validate_references()?;

        self.write_header()?;
        for (id, record) in document.store().iter() {
            self.write_record(id, record)?;
        }

        let size = document.store().max_number() + 1;
        let xref_position = self.current_position;
        self.write_xref(size)?;
        self.write_trailer(size, document.catalog_id(), document.info_id(), xref_position)?;
        self.writer.flush()?;

        debug!(
            objects = self.xref_positions.len(),
            size,
            bytes = self.current_position,
            "wrote document"
        );
        Ok(())
    }

    fn write_header(&mut self) -> Result<()> {
        self.write_bytes(b"%PDF-1.7\n")?;
        // Binary comment to ensure file is treated as binary
        self.write_bytes(&[b'%', 0xE2, 0xE3, 0xCF, 0xD3, b'\n'])?;
        Ok(())
    }
}

impl PdfWriter<BufWriter<std::fs::File>> {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::new_with_writer(BufWriter::new(file)))
    }
}

impl<W: Write> PdfWriter<W> {
    fn write_record(&mut self, id: ObjectId, record: &Record) -> Result<()> {
        self.xref_positions.insert(id, self.current_position);

        let header = format!("{} {} obj\n", id.number(), id.generation());
        self.write_bytes(header.as_bytes())?;

        match record {
            Record::Dictionary(dict) => self.write_dictionary(dict)?,
            Record::Stream(stream) => {
                let mut dict = stream.dictionary().clone();
                dict.set("Length", stream.len() as i64);
                self.write_dictionary(&dict)?;
                self.write_bytes(b"\nstream\n")?;
                self.write_bytes(stream.data())?;
                self.write_bytes(b"\nendstream")?;
            }
        }

        self.write_bytes(b"\nendobj\n")?;
        Ok(())
    }

    fn write_dictionary(&mut self, dict: &Dictionary) -> Result<()> {
        self.write_bytes(b"<<")?;
        for (key, value) in dict.entries() {
            self.write_bytes(b"\n/")?;
            self.write_bytes(key.as_bytes())?;
            self.write_bytes(b" ")?;
            self.write_object_value(value)?;
        }
        self.write_bytes(b"\n>>")?;
        Ok(())
    }

    fn write_object_value(&mut self, object: &Object) -> Result<()> {
        match object {
            Object::Null => self.write_bytes(b"null")?,
            Object::Boolean(b) => self.write_bytes(if *b { b"true" } else { b"false" })?,
            Object::Integer(i) => self.write_bytes(i.to_string().as_bytes())?,
            Object::Real(f) => self.write_bytes(format_real(*f)?.as_bytes())?,
            Object::String(s) => self.write_bytes(&encode_string(s))?,
            Object::Name(n) => {
                self.write_bytes(b"/")?;
                self.write_bytes(n.as_bytes())?;
            }
            Object::Array(arr) => {
                self.write_bytes(b"[")?;
                for (i, obj) in arr.iter().enumerate() {
                    if i > 0 {
                        self.write_bytes(b" ")?;
                    }
                    self.write_object_value(obj)?;
                }
                self.write_bytes(b"]")?;
            }
            Object::Dictionary(dict) => self.write_dictionary(dict)?,
            Object::Reference(id) => {
                let ref_str = format!("{} {} R", id.number(), id.generation());
                self.write_bytes(ref_str.as_bytes())?;
            }
        }
        Ok(())
    }

    /// One subsection from 0 to `size - 1`. Reserved and retired numbers
    /// are written as free entries.
    fn write_xref(&mut self, size: u32) -> Result<()> {
        self.write_bytes(b"xref\n")?;
        self.write_bytes(format!("0 {size}\n").as_bytes())?;
        self.write_bytes(b"0000000000 65535 f \n")?;

        for number in 1..size {
            match self.xref_positions.get(&ObjectId::new(number, 0)) {
                Some(position) => {
                    let entry = format!("{position:010} 00000 n \n");
                    self.write_bytes(entry.as_bytes())?;
                }
                None => self.write_bytes(b"0000000000 00001 f \n")?,
            }
        }

        Ok(())
    }

    fn write_trailer(
        &mut self,
        size: u32,
        catalog_id: ObjectId,
        info_id: ObjectId,
        xref_position: u64,
    ) -> Result<()> {
        let mut trailer = Dictionary::new();
        trailer.set("Size", size);
        trailer.set("Root", catalog_id);
        trailer.set("Info", info_id);

        self.write_bytes(b"trailer\n")?;
        self.write_dictionary(&trailer)?;
        self.write_bytes(b"\nstartxref\n")?;
        self.write_bytes(xref_position.to_string().as_bytes())?;
        self.write_bytes(b"\n%%EOF\n")?;

        Ok(())
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.writer.write_all(data)?;
        self.current_position += data.len() as u64;
        Ok(())
    }
}

/// Serialization only sees committed state.
pub(crate) fn ensure_closed(document: &Document) -> Result<()> {
    if document.in_transaction() {
        return Err(PdfError::TransactionMisuse(format!(
            "cannot serialize with {} open transaction(s)",
            document.transaction_depth()
        )));
    }
    Ok(())
}

/// PDF has no syntax for NaN or infinities.
fn format_real(value: f64) -> Result<String> {
    if !value.is_finite() {
        return Err(PdfError::InvalidStructure(format!(
            "real value {value} cannot be written"
        )));
    }
    let formatted = format!("{value:.6}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    Ok(match trimmed {
        "" | "-" | "-0" => "0".to_string(),
        other => other.to_string(),
    })
}

/// A complete string token. Latin-1 text becomes a literal string with
/// octal escapes outside printable ASCII; anything wider becomes a UTF-16BE
/// hex string with a byte order mark.
fn encode_string(text: &str) -> Vec<u8> {
    if text.chars().any(|c| u32::from(c) > 0xFF) {
        let mut out = b"<FEFF".to_vec();
        for unit in text.encode_utf16() {
            out.extend_from_slice(format!("{unit:04X}").as_bytes());
        }
        out.push(b'>');
        return out;
    }

    let mut out = Vec::with_capacity(text.len() + 2);
    out.push(b'(');
    for c in text.chars() {
        let byte = u32::from(c) as u8;
        match byte {
            b'(' | b')' | b'\\' => {
                out.push(b'\\');
                out.push(byte);
            }
            0x20..=0x7E => out.push(byte),
            _ => out.extend_from_slice(format!("\\{byte:03o}").as_bytes()),
        }
    }
    out.push(b')');
    out
}
