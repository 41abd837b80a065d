// SPDX-License-Identifier: MPL-2.0
//! Reader for Qt Linguist `.ts` translation files.
//!
//! Recognized structure:
//!
//! ```text
//! <TS language="bg">
//!   <context>
//!     <name>CanvasGridView</name>
//!     <message numerus="yes">
//!       <location filename="../view/canvasgridview.cpp" line="2399"/>
//!       <source>Icon size</source>
//!       <comment>disambiguation</comment>
//!       <translation type="unfinished">...</translation>
//!         or <translation><numerusform>...</numerusform>...</translation>
//!     </message>
//!   </context>
//! </TS>
//! ```
//!
//! Elements outside this set (`extracomment`, `translatorcomment`,
//! `oldsource`, ...) are skipped. `<byte value="..."/>` inside text is
//! decoded to its character; only the first `<lengthvariant>` of a
//! translation is kept.

use super::source::{CatalogDocument, ContextDoc, Location, MessageDoc, MessageStatus};
use crate::error::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    ContextName,
    Source,
    Comment,
    Translation,
    NumerusForm,
}

#[derive(Default)]
struct PendingMessage {
    source: Option<String>,
    comment: Option<String>,
    numerus: bool,
    translation: String,
    forms: Vec<String>,
    status: MessageStatus,
    location: Option<Location>,
}

struct TsReader<'a> {
    origin: &'a str,
    document: CatalogDocument,
    saw_root: bool,
    context: Option<ContextDoc>,
    message: Option<PendingMessage>,
    field: Option<Field>,
    text: String,
    // Set after the first <lengthvariant> of the current field is read.
    variant_done: bool,
}

/// Parses Qt Linguist XML into a [`CatalogDocument`].
pub(crate) fn parse(origin: &str, text: &str) -> Result<CatalogDocument> {
    let mut reader = Reader::from_str(text);
    let mut ts = TsReader {
        origin,
        document: CatalogDocument::default(),
        saw_root: false,
        context: None,
        message: None,
        field: None,
        text: String::new(),
        variant_done: false,
    };
    let mut depth = 0usize;

    loop {
        let event = reader.read_event().map_err(|e| {
            Error::malformed(origin, format!("{} at byte {}", e, reader.buffer_position()))
        })?;
        match event {
            Event::Start(e) => {
                depth += 1;
                ts.open(&e, depth)?;
            }
            Event::Empty(e) => {
                ts.open(&e, depth + 1)?;
                ts.close(e.name().as_ref())?;
            }
            Event::End(e) => {
                ts.close(e.name().as_ref())?;
                depth = depth.saturating_sub(1);
            }
            Event::Text(t) => {
                if ts.capturing() {
                    let unescaped = t.unescape().map_err(|e| Error::malformed(origin, e))?;
                    ts.text.push_str(&unescaped);
                }
            }
            Event::CData(c) => {
                if ts.capturing() {
                    ts.text.push_str(&String::from_utf8_lossy(&c));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if depth != 0 {
        return Err(Error::malformed(origin, "unexpected end of document"));
    }
    if !ts.saw_root {
        return Err(Error::malformed(origin, "missing <TS> root element"));
    }
    Ok(ts.document)
}

fn attribute(e: &BytesStart<'_>, origin: &str, name: &str) -> Result<Option<String>> {
    match e.try_get_attribute(name) {
        Ok(Some(attr)) => attr
            .unescape_value()
            .map(|v| Some(v.into_owned()))
            .map_err(|err| Error::malformed(origin, err)),
        Ok(None) => Ok(None),
        Err(err) => Err(Error::malformed(origin, err)),
    }
}

/// Decodes the `value` of a `<byte>` element: `x41` is hexadecimal, `65` decimal.
fn byte_value(value: &str) -> Option<char> {
    let code = match value.strip_prefix('x') {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => value.parse().ok()?,
    };
    char::from_u32(code)
}

impl TsReader<'_> {
    fn capturing(&self) -> bool {
        self.field.is_some() && !self.variant_done
    }

    fn begin_field(&mut self, field: Field) {
        self.field = Some(field);
        self.text.clear();
        self.variant_done = false;
    }

    fn end_field(&mut self) -> String {
        self.field = None;
        self.variant_done = false;
        std::mem::take(&mut self.text)
    }

    fn open(&mut self, e: &BytesStart<'_>, depth: usize) -> Result<()> {
        let name = e.name();
        let name = name.as_ref();

        if depth == 1 {
            if name != b"TS" {
                return Err(Error::malformed(self.origin, "missing <TS> root element"));
            }
            self.saw_root = true;
            self.document.language =
                attribute(e, self.origin, "language")?.filter(|lang| !lang.is_empty());
            return Ok(());
        }

        match name {
            b"context" => {
                self.context = Some(ContextDoc::default());
            }
            b"name" if self.context.is_some() && self.message.is_none() => {
                self.begin_field(Field::ContextName);
            }
            b"message" => {
                if self.context.is_none() {
                    return Err(Error::malformed(self.origin, "<message> outside <context>"));
                }
                let numerus = attribute(e, self.origin, "numerus")?.as_deref() == Some("yes");
                self.message = Some(PendingMessage {
                    numerus,
                    ..PendingMessage::default()
                });
            }
            b"location" => {
                let file = attribute(e, self.origin, "filename")?;
                let line = attribute(e, self.origin, "line")?.and_then(|l| l.parse().ok());
                if let (Some(message), Some(file)) = (self.message.as_mut(), file) {
                    if message.location.is_none() {
                        message.location = Some(Location { file, line });
                    }
                }
            }
            b"source" if self.message.is_some() => self.begin_field(Field::Source),
            b"comment" if self.message.is_some() => self.begin_field(Field::Comment),
            b"translation" if self.message.is_some() => {
                let status = match attribute(e, self.origin, "type")?.as_deref() {
                    Some("unfinished") => MessageStatus::Unfinished,
                    Some("obsolete") | Some("vanished") => MessageStatus::Obsolete,
                    _ => MessageStatus::Finished,
                };
                if let Some(message) = self.message.as_mut() {
                    message.status = status;
                }
                self.begin_field(Field::Translation);
            }
            b"numerusform" if self.message.is_some() => self.begin_field(Field::NumerusForm),
            b"byte" if self.capturing() => {
                if let Some(ch) = attribute(e, self.origin, "value")?.as_deref().and_then(byte_value) {
                    self.text.push(ch);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn close(&mut self, name: &[u8]) -> Result<()> {
        match (name, self.field) {
            (b"lengthvariant", Some(_)) => {
                self.variant_done = true;
            }
            (b"name", Some(Field::ContextName)) => {
                let text = self.end_field();
                if let Some(context) = self.context.as_mut() {
                    context.name = text;
                }
            }
            (b"source", Some(Field::Source)) => {
                let text = self.end_field();
                if let Some(message) = self.message.as_mut() {
                    message.source = Some(text);
                }
            }
            (b"comment", Some(Field::Comment)) => {
                let text = self.end_field();
                if let Some(message) = self.message.as_mut() {
                    message.comment = Some(text).filter(|c| !c.is_empty());
                }
            }
            (b"numerusform", Some(Field::NumerusForm)) => {
                let text = self.end_field();
                if let Some(message) = self.message.as_mut() {
                    message.forms.push(text);
                }
            }
            (b"translation", Some(Field::Translation)) => {
                let text = self.end_field();
                if let Some(message) = self.message.as_mut() {
                    message.translation = text;
                }
            }
            (b"translation", _) => {
                self.field = None;
            }
            (b"message", _) => self.finish_message()?,
            (b"context", _) => {
                if let Some(context) = self.context.take() {
                    if context.name.is_empty() {
                        return Err(Error::malformed(self.origin, "<context> without <name>"));
                    }
                    self.document.contexts.push(context);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn finish_message(&mut self) -> Result<()> {
        let Some(message) = self.message.take() else {
            return Ok(());
        };
        let Some(source) = message.source else {
            return Err(Error::malformed(self.origin, "<message> without <source>"));
        };
        let Some(context) = self.context.as_mut() else {
            return Ok(());
        };

        let template = MessageDoc {
            source,
            translation: String::new(),
            disambiguation: message.comment,
            plural_index: None,
            status: message.status,
            location: message.location,
        };

        if message.numerus && !message.forms.is_empty() {
            for (index, form) in message.forms.into_iter().enumerate() {
                context.messages.push(MessageDoc {
                    translation: form,
                    plural_index: Some(index),
                    ..template.clone()
                });
            }
        } else {
            context.messages.push(MessageDoc {
                translation: message.translation,
                ..template
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" ?><!DOCTYPE TS><TS language="bg" version="2.1">
<context>
    <name>CanvasGridView</name>
    <message>
        <location filename="../view/canvasgridview.cpp" line="2399"/>
        <source>Icon size</source>
        <translation>Размер на икона</translation>
    </message>
    <message>
        <location filename="../view/canvasgridview.cpp" line="2476"/>
        <source>Set Wallpaper</source>
        <translation>Задай тапет</translation>
    </message>
</context>
<context>
    <name>DesktopItemDelegate</name>
    <message>
        <source>Tiny</source>
        <translation>Тясна</translation>
    </message>
</context>
</TS>"#;

    #[test]
    fn parses_contexts_messages_and_language() {
        let doc = parse("sample.ts", SAMPLE).expect("sample should parse");

        assert_eq!(doc.language.as_deref(), Some("bg"));
        assert_eq!(doc.contexts.len(), 2);
        assert_eq!(doc.contexts[0].name, "CanvasGridView");
        let first = &doc.contexts[0].messages[0];
        assert_eq!(first.source, "Icon size");
        assert_eq!(first.translation, "Размер на икона");
        assert_eq!(
            first.location,
            Some(Location {
                file: "../view/canvasgridview.cpp".to_string(),
                line: Some(2399),
            })
        );
        assert_eq!(doc.contexts[1].messages[0].location, None);
    }

    #[test]
    fn numerus_message_yields_one_record_per_form() {
        let xml = r#"<TS language="ru"><context><name>Frame</name>
            <message numerus="yes">
                <source>%n wallpaper(s)</source>
                <translation>
                    <numerusform>%n обои</numerusform>
                    <numerusform>%n обоев</numerusform>
                    <numerusform>%n обоев</numerusform>
                </translation>
            </message></context></TS>"#;
        let doc = parse("frame_ru.ts", xml).unwrap();
        let messages = &doc.contexts[0].messages;

        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].plural_index, Some(0));
        assert_eq!(messages[0].translation, "%n обои");
        assert_eq!(messages[2].plural_index, Some(2));
        assert!(messages.iter().all(|m| m.source == "%n wallpaper(s)"));
    }

    #[test]
    fn comment_becomes_disambiguation_and_type_becomes_status() {
        let xml = r#"<TS><context><name>ZoneMainWindow</name>
            <message>
                <source>None</source>
                <comment>corner action</comment>
                <translation type="unfinished">Без</translation>
            </message>
            <message>
                <source>Old entry</source>
                <translation type="vanished">Стар</translation>
            </message></context></TS>"#;
        let doc = parse("zone.ts", xml).unwrap();
        let messages = &doc.contexts[0].messages;

        assert_eq!(doc.language, None);
        assert_eq!(messages[0].disambiguation.as_deref(), Some("corner action"));
        assert_eq!(messages[0].status, MessageStatus::Unfinished);
        assert_eq!(messages[1].status, MessageStatus::Obsolete);
    }

    #[test]
    fn entities_byte_elements_and_whitespace_are_preserved() {
        let xml = r#"<TS><context><name>Frame</name>
            <message>
                <source>Wait:&#x20;</source>
                <translation> Чакай &amp; виж<byte value="x9"/></translation>
            </message></context></TS>"#;
        let doc = parse("frame.ts", xml).unwrap();
        let message = &doc.contexts[0].messages[0];

        assert_eq!(message.source, "Wait: ");
        assert_eq!(message.translation, " Чакай & виж\t");
    }

    #[test]
    fn only_first_length_variant_is_kept() {
        let xml = r#"<TS><context><name>Frame</name>
            <message>
                <source>Wallpaper Slideshow</source>
                <translation variants="yes"><lengthvariant>Слайдшоу на тапети</lengthvariant><lengthvariant>Слайдшоу</lengthvariant></translation>
            </message></context></TS>"#;
        let doc = parse("frame.ts", xml).unwrap();
        assert_eq!(doc.contexts[0].messages[0].translation, "Слайдшоу на тапети");
    }

    #[test]
    fn empty_translation_element_is_accepted() {
        let xml = r#"<TS><context><name>Frame</name>
            <message><source>Apply</source><translation type="unfinished"/></message>
            </context></TS>"#;
        let doc = parse("frame.ts", xml).unwrap();
        assert_eq!(doc.contexts[0].messages[0].translation, "");
    }

    #[test]
    fn unterminated_document_is_malformed() {
        let xml = "<TS><context><name>Frame</name><message><source>Apply</source>";
        let err = parse("cut.ts", xml).unwrap_err();
        assert!(matches!(err, Error::MalformedCatalog { .. }));
    }

    #[test]
    fn mismatched_tags_are_malformed() {
        let xml = "<TS><context><name>Frame</context></TS>";
        assert!(matches!(parse("bad.ts", xml), Err(Error::MalformedCatalog { .. })));
    }

    #[test]
    fn wrong_root_is_malformed() {
        let xml = "<html><body/></html>";
        assert!(matches!(parse("page.html", xml), Err(Error::MalformedCatalog { .. })));
    }

    #[test]
    fn message_without_source_is_malformed() {
        let xml = "<TS><context><name>Frame</name><message><translation>x</translation></message></context></TS>";
        assert!(matches!(parse("nosrc.ts", xml), Err(Error::MalformedCatalog { .. })));
    }

    #[test]
    fn empty_input_is_malformed() {
        assert!(matches!(parse("empty.ts", ""), Err(Error::MalformedCatalog { .. })));
    }

    #[test]
    fn byte_value_decoding() {
        assert_eq!(byte_value("x9"), Some('\t'));
        assert_eq!(byte_value("65"), Some('A'));
        assert_eq!(byte_value("xZZ"), None);
    }
}
