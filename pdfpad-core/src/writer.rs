use crate::document::Document;
use crate::error::{PdfError, Result};
use crate::objects::{Dictionary, Object, ObjectId};
use crate::page::Page;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::io::Write;

/// Serializes a [`Document`] into PDF 1.7 syntax.
///
/// Object numbering is fixed: 1 catalog, 2 page tree, 3 info, then a
/// page object and a content stream per page. Byte offsets of every
/// indirect object are tracked for the cross-reference table.
pub struct PdfWriter<W: Write> {
    writer: W,
    xref_positions: HashMap<ObjectId, u64>,
    current_position: u64,
}

const CATALOG_ID: u32 = 1;
const PAGES_ID: u32 = 2;
const INFO_ID: u32 = 3;
const FIRST_PAGE_ID: u32 = 4;

impl<W: Write> PdfWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            xref_positions: HashMap::new(),
            current_position: 0,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    pub fn write_document(&mut self, document: &Document) -> Result<()> {
        self.write_header()?;

        let catalog_id = self.write_catalog()?;
        self.write_pages(document)?;
        let info_id = self.write_info(document)?;

        let xref_position = self.current_position;
        self.write_xref()?;
        self.write_trailer(catalog_id, info_id, xref_position)?;

        self.writer.flush().map_err(PdfError::StreamWrite)?;
        Ok(())
    }

    fn write_header(&mut self) -> Result<()> {
        self.write_bytes(b"%PDF-1.7\n")?;
        // Binary comment so transports treat the file as binary
        self.write_bytes(&[b'%', 0xE2, 0xE3, 0xCF, 0xD3, b'\n'])?;
        Ok(())
    }

    fn write_catalog(&mut self) -> Result<ObjectId> {
        let catalog_id = ObjectId::new(CATALOG_ID, 0);

        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name("Catalog".to_string()));
        catalog.set("Pages", ObjectId::new(PAGES_ID, 0));

        self.write_object(catalog_id, Object::Dictionary(catalog))?;
        Ok(catalog_id)
    }

    fn write_pages(&mut self, document: &Document) -> Result<ObjectId> {
        let pages_id = ObjectId::new(PAGES_ID, 0);

        let kids: Vec<Object> = (0..document.pages.len())
            .map(|i| Object::Reference(ObjectId::new(FIRST_PAGE_ID + i as u32 * 2, 0)))
            .collect();

        let mut pages_dict = Dictionary::new();
        pages_dict.set("Type", Object::Name("Pages".to_string()));
        pages_dict.set("Count", document.pages.len() as i64);
        pages_dict.set("Kids", kids);

        self.write_object(pages_id, Object::Dictionary(pages_dict))?;

        for (i, page) in document.pages.iter().enumerate() {
            let page_id = ObjectId::new(FIRST_PAGE_ID + i as u32 * 2, 0);
            let content_id = ObjectId::new(FIRST_PAGE_ID + i as u32 * 2 + 1, 0);

            self.write_page(page_id, pages_id, content_id, page)?;
            self.write_page_content(content_id, page)?;
        }

        Ok(pages_id)
    }

    fn write_page(
        &mut self,
        page_id: ObjectId,
        parent_id: ObjectId,
        content_id: ObjectId,
        page: &Page,
    ) -> Result<()> {
        let mut page_dict = Dictionary::new();
        page_dict.set("Type", Object::Name("Page".to_string()));
        page_dict.set("Parent", parent_id);
        page_dict.set(
            "MediaBox",
            vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(page.width()),
                Object::Real(page.height()),
            ],
        );
        page_dict.set("Contents", content_id);

        let mut font_dict = Dictionary::new();
        for font in page.used_fonts() {
            let mut font_entry = Dictionary::new();
            font_entry.set("Type", Object::Name("Font".to_string()));
            font_entry.set("Subtype", Object::Name("Type1".to_string()));
            font_entry.set("BaseFont", Object::Name(font.pdf_name().to_string()));
            font_dict.set(font.resource_name(), font_entry);
        }

        let mut resources = Dictionary::new();
        resources.set("Font", font_dict);
        page_dict.set("Resources", resources);

        self.write_object(page_id, Object::Dictionary(page_dict))?;
        Ok(())
    }

    fn write_page_content(&mut self, content_id: ObjectId, page: &Page) -> Result<()> {
        let content = page.content();

        let mut stream_dict = Dictionary::new();
        stream_dict.set("Length", content.len() as i64);

        self.write_object(content_id, Object::Stream(stream_dict, content))?;
        Ok(())
    }

    fn write_info(&mut self, document: &Document) -> Result<ObjectId> {
        let info_id = ObjectId::new(INFO_ID, 0);
        let mut info_dict = Dictionary::new();

        if let Some(ref title) = document.metadata.title {
            info_dict.set("Title", title.clone());
        }
        if let Some(ref author) = document.metadata.author {
            info_dict.set("Author", author.clone());
        }
        if let Some(ref producer) = document.metadata.producer {
            info_dict.set("Producer", producer.clone());
        }
        if let Some(creation_date) = document.metadata.creation_date {
            info_dict.set("CreationDate", format_pdf_date(creation_date));
        }

        self.write_object(info_id, Object::Dictionary(info_dict))?;
        Ok(info_id)
    }

    fn write_object(&mut self, id: ObjectId, object: Object) -> Result<()> {
        self.xref_positions.insert(id, self.current_position);

        let header = format!("{} {} obj\n", id.number(), id.generation());
        self.write_bytes(header.as_bytes())?;
        self.write_object_value(&object)?;
        self.write_bytes(b"\nendobj\n")?;
        Ok(())
    }

    fn write_object_value(&mut self, object: &Object) -> Result<()> {
        match object {
            Object::Null => self.write_bytes(b"null")?,
            Object::Boolean(b) => self.write_bytes(if *b { b"true" } else { b"false" })?,
            Object::Integer(i) => self.write_bytes(i.to_string().as_bytes())?,
            Object::Real(f) => self.write_bytes(
                format!("{f:.6}")
                    .trim_end_matches('0')
                    .trim_end_matches('.')
                    .as_bytes(),
            )?,
            Object::String(s) => {
                self.write_bytes(b"(")?;
                self.write_bytes(s.as_bytes())?;
                self.write_bytes(b")")?;
            }
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
            Object::Dictionary(dict) => {
                self.write_bytes(b"<<")?;
                for (key, value) in dict.entries() {
                    self.write_bytes(b"\n/")?;
                    self.write_bytes(key.as_bytes())?;
                    self.write_bytes(b" ")?;
                    self.write_object_value(value)?;
                }
                self.write_bytes(b"\n>>")?;
            }
            Object::Stream(dict, data) => {
                self.write_object_value(&Object::Dictionary(dict.clone()))?;
                self.write_bytes(b"\nstream\n")?;
                self.write_bytes(data)?;
                self.write_bytes(b"\nendstream")?;
            }
            Object::Reference(id) => {
                let ref_str = format!("{} {} R", id.number(), id.generation());
                self.write_bytes(ref_str.as_bytes())?;
            }
        }
        Ok(())
    }

    fn write_xref(&mut self) -> Result<()> {
        self.write_bytes(b"xref\n")?;

        let max_obj_num = self
            .xref_positions
            .keys()
            .map(|id| id.number())
            .max()
            .unwrap_or(0);

        self.write_bytes(b"0 ")?;
        self.write_bytes((max_obj_num + 1).to_string().as_bytes())?;
        self.write_bytes(b"\n")?;

        // Object 0 is the head of the free list
        self.write_bytes(b"0000000000 65535 f \n")?;

        for obj_num in 1..=max_obj_num {
            match self
                .xref_positions
                .iter()
                .find(|(id, _)| id.number() == obj_num)
            {
                Some((_, position)) => {
                    let entry = format!("{position:010} {:05} n \n", 0);
                    self.write_bytes(entry.as_bytes())?;
                }
                None => self.write_bytes(b"0000000000 00000 f \n")?,
            }
        }

        Ok(())
    }

    fn write_trailer(
        &mut self,
        catalog_id: ObjectId,
        info_id: ObjectId,
        xref_position: u64,
    ) -> Result<()> {
        let max_obj_num = self
            .xref_positions
            .keys()
            .map(|id| id.number())
            .max()
            .unwrap_or(0);

        let mut trailer = Dictionary::new();
        trailer.set("Size", (max_obj_num + 1) as i64);
        trailer.set("Root", catalog_id);
        trailer.set("Info", info_id);

        self.write_bytes(b"trailer\n")?;
        self.write_object_value(&Object::Dictionary(trailer))?;
        self.write_bytes(b"\nstartxref\n")?;
        self.write_bytes(xref_position.to_string().as_bytes())?;
        self.write_bytes(b"\n%%EOF\n")?;

        Ok(())
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.writer.write_all(data).map_err(PdfError::StreamWrite)?;
        self.current_position += data.len() as u64;
        Ok(())
    }
}

/// Format a DateTime as a PDF date string (D:YYYYMMDDHHmmSS+00'00).
fn format_pdf_date(date: DateTime<Utc>) -> String {
    format!("{}+00'00", date.format("D:%Y%m%d%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::Font;
    use chrono::TimeZone;

    fn sample_document(pages: usize) -> Document {
        let mut doc = Document::new();
        for i in 1..=pages {
            let mut page = Page::a4();
            page.centered_text(Font::Helvetica, 20.0, page.height() / 2.0, &i.to_string())
                .unwrap();
            doc.add_page(page);
        }
        doc
    }

    fn render(doc: &Document) -> Vec<u8> {
        let mut buffer = Vec::new();
        doc.write(&mut buffer).unwrap();
        buffer
    }

    #[test]
    fn test_write_header() {
        let mut buffer = Vec::new();
        let mut writer = PdfWriter::new(&mut buffer);
        writer.write_header().unwrap();

        assert!(buffer.starts_with(b"%PDF-1.7\n"));
        assert_eq!(&buffer[9..], &[b'%', 0xE2, 0xE3, 0xCF, 0xD3, b'\n']);
    }

    #[test]
    fn test_page_objects_match_page_count() {
        let bytes = render(&sample_document(4));
        let text = String::from_utf8_lossy(&bytes);

        let pages = text.matches("/Type /Page\n").count();
        let trees = text.matches("/Type /Pages\n").count();
        assert_eq!(pages, 4);
        assert_eq!(trees, 1);
        assert!(text.contains("/Count 4\n"));
    }

    #[test]
    fn test_xref_offsets_point_at_objects() {
        let bytes = render(&sample_document(2));
        let text = String::from_utf8_lossy(&bytes);

        let xref_at = text.find("xref\n").unwrap();
        // Every in-use entry's offset must land on "<num> 0 obj"
        for line in text[xref_at..].lines().skip(2) {
            if !line.ends_with("n ") {
                continue;
            }
            let offset: usize = line[..10].parse().unwrap();
            let at_offset = &bytes[offset..];
            let header_end = at_offset.iter().position(|&b| b == b'\n').unwrap();
            let header = std::str::from_utf8(&at_offset[..header_end]).unwrap();
            assert!(header.ends_with(" 0 obj"), "bad object header: {header}");
        }
    }

    #[test]
    fn test_trailer_references_catalog_and_startxref() {
        let bytes = render(&sample_document(1));
        let text = String::from_utf8_lossy(&bytes);

        assert!(text.contains("trailer\n"));
        assert!(text.contains("/Root 1 0 R"));
        assert!(text.contains("/Info 3 0 R"));

        let startxref_at = text.rfind("startxref\n").unwrap();
        let offset: usize = text[startxref_at..]
            .lines()
            .nth(1)
            .unwrap()
            .trim()
            .parse()
            .unwrap();
        assert_eq!(&bytes[offset..offset + 5], b"xref\n");
        assert!(text.ends_with("%%EOF\n"));
    }

    #[test]
    fn test_content_stream_length_matches() {
        let bytes = render(&sample_document(1));
        let text = String::from_utf8_lossy(&bytes);

        let length: usize = text
            .lines()
            .find(|l| l.starts_with("/Length "))
            .and_then(|l| l.trim_start_matches("/Length ").parse().ok())
            .unwrap();

        let stream_at = text.find("stream\n").unwrap() + "stream\n".len();
        let endstream_at = text.find("\nendstream").unwrap();
        assert_eq!(endstream_at - stream_at, length);
    }

    #[test]
    fn test_pdf_date_format() {
        let date = Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap();
        assert_eq!(format_pdf_date(date), "D:20260314092653+00'00");
    }
}
