//! Flat OpenDocument Text (`.fodt`) report writer.
//!
//! The document is streamed into a temporary file next to the destination
//! and only renamed into place by [`ReportDocument::finish`]. Dropping an
//! unfinished document removes the temporary file.

use crate::config::StyleConfig;
use crate::error::{AppError, Result};
use crate::selector::SelectedFile;
use crate::source::{ReadErrorPolicy, read_source};
use log;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::fmt::Display;
use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const HEADING_STYLE: &str = "Heading_20_1";
const CODE_STYLE: &str = "Code";

const NAMESPACES: [(&str, &str); 6] = [
    (
        "xmlns:office",
        "urn:oasis:names:tc:opendocument:xmlns:office:1.0",
    ),
    ("xmlns:style", "urn:oasis:names:tc:opendocument:xmlns:style:1.0"),
    ("xmlns:text", "urn:oasis:names:tc:opendocument:xmlns:text:1.0"),
    (
        "xmlns:fo",
        "urn:oasis:names:tc:opendocument:xmlns:xsl-fo-compatible:1.0",
    ),
    ("xmlns:meta", "urn:oasis:names:tc:opendocument:xmlns:meta:1.0"),
    ("xmlns:dc", "http://purl.org/dc/elements/1.1/"),
];

pub struct ReportDocument {
    path: PathBuf,
    writer: Writer<BufWriter<NamedTempFile>>,
    sections: usize,
}

impl ReportDocument {
    /// Opens a new document at `path`, writes the prolog, styles and metadata.
    pub fn create(path: &Path, title: &str, style: &StyleConfig) -> Result<Self> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|e| write_error(path, e))?;
        let temp = NamedTempFile::new_in(&dir).map_err(|e| write_error(path, e))?;
        log::debug!(
            "Writing report {} via temporary file {}",
            path.display(),
            temp.path().display()
        );

        let mut doc = Self {
            path: path.to_path_buf(),
            writer: Writer::new(BufWriter::new(temp)),
            sections: 0,
        };
        doc.write_prolog(title, style)?;
        Ok(doc)
    }

    /// Runs `build` against a fresh document. The report is persisted only
    /// if `build` succeeds; otherwise nothing is left at `path`.
    pub fn write_with<F>(path: &Path, title: &str, style: &StyleConfig, build: F) -> Result<PathBuf>
    where
        F: FnOnce(&mut ReportDocument) -> Result<()>,
    {
        let mut doc = Self::create(path, title, style)?;
        build(&mut doc)?;
        doc.finish()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sections(&self) -> usize {
        self.sections
    }

    /// Appends a level-1 heading followed by the monospaced body.
    pub fn add_section(&mut self, heading: &str, content: &str) -> Result<()> {
        self.emit(Event::Start(BytesStart::new("text:h").with_attributes([
            ("text:outline-level", "1"),
            ("text:style-name", HEADING_STYLE),
        ])))?;
        self.emit(Event::Text(BytesText::new(&xml_safe(heading))))?;
        self.emit(Event::End(BytesEnd::new("text:h")))?;

        self.emit(Event::Start(
            BytesStart::new("text:p").with_attributes([("text:style-name", CODE_STYLE)]),
        ))?;
        for line in content.split('\n') {
            let line = line.strip_suffix('\r').unwrap_or(line);
            self.write_line(line)?;
            self.emit(Event::Empty(BytesStart::new("text:line-break")))?;
        }
        self.emit(Event::End(BytesEnd::new("text:p")))?;
        self.emit(Event::Empty(BytesStart::new("text:p")))?;

        self.sections += 1;
        Ok(())
    }

    /// Closes the document and moves it into place.
    pub fn finish(mut self) -> Result<PathBuf> {
        self.emit(Event::End(BytesEnd::new("office:text")))?;
        self.emit(Event::End(BytesEnd::new("office:body")))?;
        self.emit(Event::End(BytesEnd::new("office:document")))?;

        let path = self.path;
        let temp = self
            .writer
            .into_inner()
            .into_inner()
            .map_err(|e| write_error(&path, e))?;
        temp.as_file().sync_all().map_err(|e| write_error(&path, e))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            temp.as_file()
                .set_permissions(fs::Permissions::from_mode(0o644))
                .map_err(|e| write_error(&path, e))?;
        }
        temp.persist(&path).map_err(|e| write_error(&path, e))?;
        log::info!(
            "Report saved to {} ({} sections)",
            path.display(),
            self.sections
        );
        Ok(path)
    }

    fn write_prolog(&mut self, title: &str, style: &StyleConfig) -> Result<()> {
        self.emit(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        self.emit(Event::Start(
            BytesStart::new("office:document")
                .with_attributes(NAMESPACES)
                .with_attributes([
                    ("office:version", "1.2"),
                    ("office:mimetype", "application/vnd.oasis.opendocument.text"),
                ]),
        ))?;

        self.emit(Event::Start(BytesStart::new("office:meta")))?;
        self.text_element(
            "meta:generator",
            concat!("srcreport/", env!("CARGO_PKG_VERSION")),
        )?;
        self.text_element("dc:title", title)?;
        let created = chrono::Local::now().format("%Y-%m-%dT%H:%M:%S").to_string();
        self.text_element("meta:creation-date", &created)?;
        self.emit(Event::End(BytesEnd::new("office:meta")))?;

        self.emit(Event::Start(BytesStart::new("office:styles")))?;
        self.paragraph_style(
            HEADING_STYLE,
            "Heading 1",
            &[
                ("fo:font-size", style.heading_size.as_str()),
                ("fo:font-weight", "bold"),
                ("fo:font-family", style.font_family.as_str()),
            ],
        )?;
        self.paragraph_style(
            CODE_STYLE,
            "Code",
            &[
                ("fo:font-size", style.code_size.as_str()),
                ("fo:font-family", style.font_family.as_str()),
            ],
        )?;
        self.emit(Event::End(BytesEnd::new("office:styles")))?;

        self.emit(Event::Start(BytesStart::new("office:body")))?;
        self.emit(Event::Start(BytesStart::new("office:text")))
    }

    fn paragraph_style(
        &mut self,
        name: &str,
        display_name: &str,
        text_properties: &[(&str, &str)],
    ) -> Result<()> {
        self.emit(Event::Start(BytesStart::new("style:style").with_attributes([
            ("style:name", name),
            ("style:display-name", display_name),
            ("style:family", "paragraph"),
        ])))?;
        self.emit(Event::Empty(
            BytesStart::new("style:text-properties")
                .with_attributes(text_properties.iter().copied()),
        ))?;
        self.emit(Event::End(BytesEnd::new("style:style")))
    }

    fn text_element(&mut self, name: &str, text: &str) -> Result<()> {
        self.emit(Event::Start(BytesStart::new(name)))?;
        self.emit(Event::Text(BytesText::new(&xml_safe(text))))?;
        self.emit(Event::End(BytesEnd::new(name)))
    }

    /// Text goes into spans; spaces and tabs become explicit elements so
    /// the destination format cannot collapse them.
    fn write_line(&mut self, line: &str) -> Result<()> {
        let mut run = String::new();
        let mut chars = line.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                ' ' => {
                    self.flush_span(&mut run)?;
                    let mut count = 1usize;
                    while chars.next_if_eq(&' ').is_some() {
                        count += 1;
                    }
                    self.write_spaces(count)?;
                }
                '\t' => {
                    self.flush_span(&mut run)?;
                    self.emit(Event::Empty(BytesStart::new("text:tab")))?;
                }
                c if is_xml_char(c) => run.push(c),
                _ => {}
            }
        }
        self.flush_span(&mut run)
    }

    fn write_spaces(&mut self, count: usize) -> Result<()> {
        let mut space = BytesStart::new("text:s");
        if count > 1 {
            space.push_attribute(("text:c", count.to_string().as_str()));
        }
        self.emit(Event::Empty(space))
    }

    fn flush_span(&mut self, run: &mut String) -> Result<()> {
        if run.is_empty() {
            return Ok(());
        }
        self.emit(Event::Start(BytesStart::new("text:span")))?;
        self.emit(Event::Text(BytesText::new(run.as_str())))?;
        self.emit(Event::End(BytesEnd::new("text:span")))?;
        run.clear();
        Ok(())
    }

    fn emit(&mut self, event: Event<'_>) -> Result<()> {
        self.writer
            .write_event(event)
            .map_err(|e| write_error(&self.path, e))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSummary {
    pub path: PathBuf,
    pub sections: usize,
    pub skipped: Vec<String>,
}

/// Renders `files` in the given order, one section per readable file.
/// `on_file` is called with each display path before the file is read.
pub fn write_report<F>(
    path: &Path,
    title: &str,
    style: &StyleConfig,
    files: &[SelectedFile],
    read_policy: ReadErrorPolicy,
    mut on_file: F,
) -> Result<ReportSummary>
where
    F: FnMut(&SelectedFile),
{
    let mut sections = 0;
    let mut skipped = Vec::new();
    let saved = ReportDocument::write_with(path, title, style, |doc| {
        for file in files {
            on_file(file);
            match read_source(file, read_policy)? {
                Some(source) => doc.add_section(&source.display_path, &source.content)?,
                None => skipped.push(file.display_path.clone()),
            }
        }
        sections = doc.sections();
        Ok(())
    })?;
    Ok(ReportSummary {
        path: saved,
        sections,
        skipped,
    })
}

fn write_error(path: &Path, err: impl Display) -> AppError {
    AppError::OutputWrite {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\t' | '\n' | '\r'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

fn xml_safe(text: &str) -> String {
    text.chars().filter(|&c| is_xml_char(c)).collect()
}
