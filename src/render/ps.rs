//! PostScript export.
//!
//! A [`PsExport`] is bound to a document and an inclusive page range when it
//! is created. It writes a DSC-conformant skeleton: the prolog on creation,
//! one page section per rendered page, and the trailer on
//! [`finish`](PsExport::finish) or drop. Page content operators are not
//! translated; each page section only sets up the page geometry.

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::{GlobalParams, PaperSize, PsLevel};
use crate::error::{Error, Result};
use crate::model::Page;
use crate::parser::Document;

/// A one-shot PostScript export of a page range.
pub struct PsExport {
    doc: Document,
    path: PathBuf,
    out: Option<BufWriter<File>>,
    /// 0-based index of the first exported page
    first: usize,
    count: usize,
    rendered: usize,
    /// Pages of the range already written, by offset from `first`
    done: Vec<bool>,
    level: PsLevel,
    paper: PaperSize,
}

impl PsExport {
    /// Bind `n_pages` pages starting at the 0-based `first_page` to `path`
    /// and write the prolog.
    ///
    /// The exported range is `[first_page + 1, first_page + n_pages]` in
    /// 1-based page numbers.
    pub fn create<P: AsRef<Path>>(
        doc: &Document,
        path: P,
        first_page: usize,
        n_pages: usize,
    ) -> Result<Self> {
        let page_count = doc.page_count();
        if n_pages == 0 {
            return Err(Error::InvalidPageRange("empty page range".to_string()));
        }
        let end = first_page
            .checked_add(n_pages)
            .filter(|end| *end <= page_count)
            .ok_or_else(|| {
                Error::InvalidPageRange(format!(
                    "pages {}-{} (document has {} pages)",
                    first_page.saturating_add(1),
                    first_page.saturating_add(n_pages),
                    page_count
                ))
            })?;

        let params = GlobalParams::global();
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)?;

        let mut export = Self {
            doc: doc.clone(),
            path,
            out: Some(BufWriter::new(file)),
            first: first_page,
            count: n_pages,
            rendered: 0,
            done: vec![false; n_pages],
            level: params.ps_level,
            paper: params.ps_paper_size,
        };
        export.write_prolog(end)?;

        log::debug!(
            "PostScript export of '{}' pages {}-{} to {}",
            doc.locator(),
            first_page + 1,
            end,
            export.path.display()
        );
        Ok(export)
    }

    /// 1-based number of the first exported page.
    pub fn first_page(&self) -> u32 {
        self.first as u32 + 1
    }

    /// 1-based number of the last exported page.
    pub fn last_page(&self) -> u32 {
        (self.first + self.count) as u32
    }

    /// Number of pages in the bound range.
    pub fn page_count(&self) -> usize {
        self.count
    }

    /// Number of page sections written so far.
    pub fn pages_rendered(&self) -> usize {
        self.rendered
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the section for one page of the bound range.
    ///
    /// Pages may come in any order, but each only once.
    pub fn render_page(&mut self, page: &Page) -> Result<()> {
        if !page.document().same_document(&self.doc) {
            return Err(Error::Other(
                "page belongs to a different document".to_string(),
            ));
        }
        if !(self.first..self.first + self.count).contains(&page.index()) {
            return Err(Error::InvalidPageRange(format!(
                "page {} is outside the exported range {}-{}",
                page.number(),
                self.first_page(),
                self.last_page()
            )));
        }
        let offset = page.index() - self.first;
        if self.done[offset] {
            return Err(Error::Other(format!(
                "page {} was already exported",
                page.number()
            )));
        }

        self.done[offset] = true;
        self.rendered += 1;
        let ordinal = self.rendered;
        let (width, height) = self.paper_for(page);
        let label = dsc_text(&page.label());
        let level = self.level;
        let rotation = page.rotation();
        let [x0, y0, _, _] = page.crop_box();

        let out = self.writer()?;
        writeln!(out, "%%Page: ({}) {}", label, ordinal)?;
        writeln!(out, "%%PageBoundingBox: 0 0 {} {}", width.ceil(), height.ceil())?;
        writeln!(out, "%%BeginPageSetup")?;
        if level != PsLevel::Level1 {
            writeln!(out, "<< /PageSize [{} {}] >> setpagedevice", width, height)?;
        }
        writeln!(out, "%%EndPageSetup")?;
        writeln!(out, "pdfdocStartPage")?;
        match rotation {
            90 => writeln!(out, "0 {} translate -90 rotate", height)?,
            180 => writeln!(out, "{} {} translate 180 rotate", width, height)?,
            270 => writeln!(out, "{} 0 translate 90 rotate", width)?,
            _ => {}
        }
        if x0 != 0.0 || y0 != 0.0 {
            writeln!(out, "{} {} translate", -x0, -y0)?;
        }
        writeln!(out, "pdfdocEndPage")?;
        writeln!(out, "%%PageTrailer")?;
        Ok(())
    }

    /// Render every page of the bound range that has not been rendered yet,
    /// in page order.
    pub fn render_all(&mut self) -> Result<()> {
        for offset in 0..self.count {
            if !self.done[offset] {
                let page = self.doc.page(self.first + offset);
                self.render_page(&page)?;
            }
        }
        Ok(())
    }

    /// Write the trailer and flush the output.
    pub fn finish(mut self) -> Result<()> {
        self.write_trailer()
    }

    fn write_prolog(&mut self, end: usize) -> Result<()> {
        let (width, height) = (self.first..end)
            .filter_map(|index| self.doc.device().page(index))
            .map(|geometry| match self.paper.dimensions() {
                Some(size) => size,
                None => geometry.size(),
            })
            .fold((0.0f32, 0.0f32), |(w, h), (pw, ph)| (w.max(pw), h.max(ph)));

        let title = self.doc.title().map(|title| dsc_text(&title));
        let count = self.count;
        let level = self.level.number();

        let out = self.writer()?;
        writeln!(out, "%!PS-Adobe-3.0")?;
        writeln!(out, "%%Creator: pdfdoc {}", env!("CARGO_PKG_VERSION"))?;
        if let Some(title) = title {
            writeln!(out, "%%Title: ({})", title)?;
        }
        writeln!(out, "%%LanguageLevel: {}", level)?;
        writeln!(out, "%%BoundingBox: 0 0 {} {}", width.ceil(), height.ceil())?;
        writeln!(out, "%%Pages: {}", count)?;
        writeln!(out, "%%EndComments")?;
        writeln!(out, "%%BeginProlog")?;
        writeln!(out, "/pdfdocDict 4 dict def")?;
        writeln!(out, "pdfdocDict begin")?;
        writeln!(out, "/pdfdocStartPage {{ save /pdfdocSave exch def }} def")?;
        writeln!(out, "/pdfdocEndPage {{ pdfdocSave restore showpage }} def")?;
        writeln!(out, "end")?;
        writeln!(out, "%%EndProlog")?;
        writeln!(out, "%%BeginSetup")?;
        writeln!(out, "pdfdocDict begin")?;
        writeln!(out, "%%EndSetup")?;
        Ok(())
    }

    fn write_trailer(&mut self) -> Result<()> {
        let Some(mut out) = self.out.take() else {
            return Ok(());
        };
        if self.rendered != self.count {
            log::debug!(
                "PostScript export finished with {} of {} pages",
                self.rendered,
                self.count
            );
        }
        writeln!(out, "%%Trailer")?;
        writeln!(out, "end")?;
        writeln!(out, "%%EOF")?;
        out.flush()?;
        Ok(())
    }

    fn writer(&mut self) -> Result<&mut BufWriter<File>> {
        self.out
            .as_mut()
            .ok_or_else(|| Error::Other("PostScript export already finished".to_string()))
    }

    fn paper_for(&self, page: &Page) -> (f32, f32) {
        self.paper.dimensions().unwrap_or_else(|| page.size())
    }
}

impl Drop for PsExport {
    fn drop(&mut self) {
        if let Err(e) = self.write_trailer() {
            log::warn!(
                "Failed to finish PostScript output {}: {}",
                self.path.display(),
                e
            );
        }
    }
}

impl fmt::Debug for PsExport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PsExport")
            .field("path", &self.path)
            .field("first_page", &self.first_page())
            .field("last_page", &self.last_page())
            .field("rendered", &self.rendered)
            .finish()
    }
}

/// Escape text for a DSC comment string.
fn dsc_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_ascii() && !c.is_ascii_control() => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}
