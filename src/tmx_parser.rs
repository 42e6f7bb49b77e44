use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fmt;
use std::io::BufRead;

/// Upper bound on nested open elements. A well-formed TMX document never
/// goes deeper than `tmx > body > tu > tuv > seg` plus the occasional inline
/// markup, so anything beyond this is either garbage or an attempt to make
/// the reader buffer unbounded state.
const MAX_ELEMENT_DEPTH: usize = 8;

/// A structural event pulled out of a TMX document.
///
/// Only the elements that matter for pair extraction surface here; headers,
/// properties and inline markup are skipped by the reader.
#[derive(Debug, PartialEq)]
pub enum TmxEvent {
    /// A `<tu>` opened, with its `tuid` attribute when present.
    UnitStart(Option<String>),
    /// A `<tuv>` opened, with its `xml:lang` (or `lang`) attribute.
    VariantStart(String),
    /// Text content inside a `<seg>`. May arrive in several chunks.
    Text(String),
    VariantEnd,
    UnitEnd,
    /// End of input. Returned again on every subsequent call.
    DocumentEnd,
}

#[derive(Debug)]
pub enum ParseError {
    /// Structural violation in the markup, with a best-effort byte offset
    /// into the decompressed stream.
    Malformed { offset: usize, detail: String },
    Io(std::io::Error),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Malformed { offset, detail } => {
                write!(f, "malformed TMX at byte offset {}: {}", offset, detail)
            }
            ParseError::Io(err) => write!(f, "I/O error while reading TMX: {}", err),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::Malformed { .. } => None,
            ParseError::Io(err) => Some(err),
        }
    }
}

/// Which structural element the cursor is currently inside.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Cursor {
    Document,
    Unit,
    Variant,
    Segment,
}

/// What kind of element each open tag on the stack is.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Elem {
    Tu,
    Tuv,
    Seg,
    Other,
}

/// Pull-based TMX event reader.
///
/// Walks the document in a single forward pass; memory use is bounded by the
/// depth of currently open elements, never by document size. The reader owns
/// no pairing logic, it only reports structure.
pub struct TmxReader<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    stack: Vec<Elem>,
    cursor: Cursor,
    pending: Option<TmxEvent>,
    done: bool,
}

impl<R: BufRead> TmxReader<R> {
    pub fn new(input: R) -> TmxReader<R> {
        TmxReader {
            reader: Reader::from_reader(input),
            buf: Vec::new(),
            stack: Vec::new(),
            cursor: Cursor::Document,
            pending: None,
            done: false,
        }
    }

    fn malformed(&self, detail: impl Into<String>) -> ParseError {
        ParseError::Malformed {
            offset: self.reader.buffer_position(),
            detail: detail.into(),
        }
    }

    fn xml_error(&self, err: quick_xml::Error) -> ParseError {
        match err {
            quick_xml::Error::Io(err) => ParseError::Io(err),
            other => ParseError::Malformed {
                offset: self.reader.buffer_position(),
                detail: other.to_string(),
            },
        }
    }

    /// Pull the next structural event off the stream.
    pub fn read_event(&mut self) -> Result<TmxEvent, ParseError> {
        loop {
            if let Some(event) = self.pending.take() {
                return Ok(event);
            }
            if self.done {
                return Ok(TmxEvent::DocumentEnd);
            }

            self.buf.clear();
            // Detach the event from the read buffer so the state updates
            // below can borrow the reader mutably.
            let event = match self.reader.read_event_into(&mut self.buf) {
                Ok(event) => event.into_owned(),
                Err(err) => return Err(self.xml_error(err)),
            };

            match event {
                Event::Start(start) => {
                    if let Some(event) = self.open_element(&start, false)? {
                        return Ok(event);
                    }
                }
                Event::Empty(start) => {
                    if let Some(event) = self.open_element(&start, true)? {
                        return Ok(event);
                    }
                }
                Event::End(_) => {
                    let closed = match self.stack.pop() {
                        Some(elem) => elem,
                        None => return Err(self.malformed("closing tag without opening tag")),
                    };
                    match closed {
                        Elem::Tu => {
                            self.cursor = Cursor::Document;
                            return Ok(TmxEvent::UnitEnd);
                        }
                        Elem::Tuv => {
                            self.cursor = Cursor::Unit;
                            return Ok(TmxEvent::VariantEnd);
                        }
                        Elem::Seg => self.cursor = Cursor::Variant,
                        Elem::Other => {}
                    }
                }
                Event::Text(text) => {
                    if self.in_segment_text() {
                        let content = text.unescape().map_err(|e| self.xml_error(e))?;
                        return Ok(TmxEvent::Text(content.into_owned()));
                    }
                }
                Event::CData(data) => {
                    if self.in_segment_text() {
                        let content = String::from_utf8_lossy(data.into_inner().as_ref()).into_owned();
                        return Ok(TmxEvent::Text(content));
                    }
                }
                Event::Eof => {
                    if !self.stack.is_empty() {
                        return Err(
                            self.malformed("unexpected end of stream with unclosed elements")
                        );
                    }
                    self.done = true;
                    return Ok(TmxEvent::DocumentEnd);
                }
                Event::Decl(_) | Event::PI(_) | Event::Comment(_) | Event::DocType(_) => {}
            }
        }
    }

    /// Text counts whenever the cursor is inside a `<seg>`, including text
    /// wrapped in inline markup such as `<hi>`; whitespace between
    /// structural tags is dropped.
    fn in_segment_text(&self) -> bool {
        self.cursor == Cursor::Segment
    }

    fn open_element(
        &mut self,
        start: &BytesStart,
        self_closing: bool,
    ) -> Result<Option<TmxEvent>, ParseError> {
        if self.stack.len() >= MAX_ELEMENT_DEPTH {
            return Err(self.malformed(format!(
                "element nesting depth exceeds the limit of {}",
                MAX_ELEMENT_DEPTH
            )));
        }

        let event = match start.name().as_ref() {
            b"tu" => {
                if self.cursor != Cursor::Document {
                    return Err(self.malformed("<tu> nested inside another translation unit"));
                }
                let tuid = self.attribute(start, &[b"tuid"])?;
                if self_closing {
                    self.pending = Some(TmxEvent::UnitEnd);
                } else {
                    self.stack.push(Elem::Tu);
                    self.cursor = Cursor::Unit;
                }
                Some(TmxEvent::UnitStart(tuid))
            }
            b"tuv" => {
                if self.cursor != Cursor::Unit {
                    return Err(self.malformed("<tuv> outside of a translation unit"));
                }
                let lang = self
                    .attribute(start, &[b"xml:lang", b"lang"])?
                    .unwrap_or_default();
                if self_closing {
                    self.pending = Some(TmxEvent::VariantEnd);
                } else {
                    self.stack.push(Elem::Tuv);
                    self.cursor = Cursor::Variant;
                }
                Some(TmxEvent::VariantStart(lang))
            }
            b"seg" => {
                if self.cursor != Cursor::Variant {
                    return Err(self.malformed("<seg> outside of a translation unit variant"));
                }
                if !self_closing {
                    self.stack.push(Elem::Seg);
                    self.cursor = Cursor::Segment;
                }
                None
            }
            // header, prop, note, inline markup... anything else is skipped.
            _ => {
                if !self_closing {
                    self.stack.push(Elem::Other);
                }
                None
            }
        };

        Ok(event)
    }

    /// First attribute whose key matches one of `names`.
    fn attribute(
        &self,
        start: &BytesStart,
        names: &[&[u8]],
    ) -> Result<Option<String>, ParseError> {
        for attr in start.attributes() {
            let attr = match attr {
                Ok(attr) => attr,
                Err(err) => return Err(self.malformed(err.to_string())),
            };
            if names.contains(&attr.key.as_ref()) {
                return Ok(Some(String::from_utf8_lossy(&attr.value).into_owned()));
            }
        }
        Ok(None)
    }
}
