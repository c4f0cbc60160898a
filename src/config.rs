//! Process-wide font and encoding parameters.
//!
//! The table is read once, from [`SYSTEM_CONFIG_PATH`], the first time any
//! document is opened, and stays in place until the process exits. The file
//! uses xpdfrc-style lines:
//!
//! ```text
//! # comment
//! textEncoding  UTF-8
//! fontFile      Helvetica  /usr/share/fonts/type1/n019003l.pfb
//! fontDir       /usr/share/fonts/type1
//! psLevel       level2
//! psPaperSize   A4
//! ```

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;

/// Fixed location of the system parameter file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/pdfdocrc";

/// Extensions tried when searching font directories.
const FONT_EXTENSIONS: &[&str] = &["pfb", "pfa", "ttf", "otf"];

static GLOBAL_PARAMS: OnceCell<GlobalParams> = OnceCell::new();

/// Font and encoding parameters shared by every document in the process.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalParams {
    /// Output encoding for text produced code point by code point
    pub text_encoding: UnicodeMap,
    /// Explicit base font name -> font file mappings
    pub font_files: HashMap<String, PathBuf>,
    /// Directories searched for `<name>.<ext>` font files
    pub font_dirs: Vec<PathBuf>,
    /// PostScript language level for exports
    pub ps_level: PsLevel,
    /// Paper size for exports
    pub ps_paper_size: PaperSize,
}

impl Default for GlobalParams {
    fn default() -> Self {
        Self {
            text_encoding: UnicodeMap::Utf8,
            font_files: HashMap::new(),
            font_dirs: Vec::new(),
            ps_level: PsLevel::Level2,
            ps_paper_size: PaperSize::Match,
        }
    }
}

impl GlobalParams {
    /// The process-wide table, loading it from [`SYSTEM_CONFIG_PATH`] on first use.
    pub fn global() -> &'static GlobalParams {
        GLOBAL_PARAMS.get_or_init(|| Self::load_or_default(SYSTEM_CONFIG_PATH))
    }

    /// Install a table before first use.
    ///
    /// Returns `false` if the table has already been initialized; the
    /// existing table is kept in that case.
    pub fn install(params: GlobalParams) -> bool {
        GLOBAL_PARAMS.set(params).is_ok()
    }

    /// Load a parameter file, falling back to defaults if it cannot be read.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(params) => {
                log::debug!("Loaded parameters from {}", path.display());
                params
            }
            Err(e) => {
                log::debug!(
                    "No parameters at {} ({}), using defaults",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Load a parameter file.
    pub fn load<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(Self::parse(&text))
    }

    /// Parse parameter file contents. Malformed lines are logged and skipped.
    pub fn parse(text: &str) -> Self {
        let mut params = Self::default();

        for (line_no, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let tokens: Vec<&str> = line.split_whitespace().collect();
            let applied = match tokens.as_slice() {
                ["textEncoding", name] => UnicodeMap::from_name(name)
                    .map(|map| params.text_encoding = map)
                    .is_some(),
                ["fontFile", name, file] => {
                    params
                        .font_files
                        .insert((*name).to_string(), PathBuf::from(file));
                    true
                }
                ["fontDir", dir] => {
                    params.font_dirs.push(PathBuf::from(dir));
                    true
                }
                ["psLevel", level] => PsLevel::from_name(level)
                    .map(|level| params.ps_level = level)
                    .is_some(),
                ["psPaperSize", name] => PaperSize::from_name(name)
                    .map(|size| params.ps_paper_size = size)
                    .is_some(),
                ["psPaperSize", w, h] => match (w.parse(), h.parse()) {
                    (Ok(width), Ok(height)) => {
                        params.ps_paper_size = PaperSize::Custom { width, height };
                        true
                    }
                    _ => false,
                },
                _ => false,
            };

            if !applied {
                log::warn!("Ignoring parameter line {}: '{}'", line_no + 1, line);
            }
        }

        params
    }

    /// Locate an external font file for a non-embedded font.
    pub fn find_font_file(&self, base_name: &str) -> Option<PathBuf> {
        if let Some(path) = self.font_files.get(base_name) {
            return Some(path.clone());
        }

        self.font_dirs.iter().find_map(|dir| {
            FONT_EXTENSIONS
                .iter()
                .map(|ext| dir.join(format!("{base_name}.{ext}")))
                .find(|candidate| candidate.is_file())
        })
    }
}

/// Maps Unicode code points into the configured output encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnicodeMap {
    /// Every valid scalar value passes through
    #[default]
    Utf8,
    /// ISO 8859-1: code points above U+00FF are dropped
    Latin1,
    /// 7-bit ASCII: code points above U+007F are dropped
    Ascii7,
}

impl UnicodeMap {
    /// Look up an encoding by its configuration name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "UTF-8" | "UTF8" => Some(UnicodeMap::Utf8),
            "LATIN1" | "ISO-8859-1" => Some(UnicodeMap::Latin1),
            "ASCII7" | "ASCII" => Some(UnicodeMap::Ascii7),
            _ => None,
        }
    }

    /// Map a single code point; `None` if the encoding cannot represent it.
    pub fn map_unicode(self, code: u32) -> Option<char> {
        let limit = match self {
            UnicodeMap::Utf8 => u32::MAX,
            UnicodeMap::Latin1 => 0xFF,
            UnicodeMap::Ascii7 => 0x7F,
        };
        if code > limit {
            return None;
        }
        char::from_u32(code)
    }
}

/// PostScript language level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PsLevel {
    Level1,
    Level2,
    Level3,
}

impl PsLevel {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "level1" => Some(PsLevel::Level1),
            "level2" => Some(PsLevel::Level2),
            "level3" => Some(PsLevel::Level3),
            _ => None,
        }
    }

    /// Value for the `%%LanguageLevel` comment.
    pub fn number(self) -> u8 {
        match self {
            PsLevel::Level1 => 1,
            PsLevel::Level2 => 2,
            PsLevel::Level3 => 3,
        }
    }
}

/// Paper size used for PostScript export.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PaperSize {
    /// Use each page's own size
    Match,
    Letter,
    Legal,
    A4,
    A3,
    /// Explicit size in points
    Custom { width: f32, height: f32 },
}

impl PaperSize {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "match" => Some(PaperSize::Match),
            "letter" => Some(PaperSize::Letter),
            "legal" => Some(PaperSize::Legal),
            "A4" => Some(PaperSize::A4),
            "A3" => Some(PaperSize::A3),
            _ => None,
        }
    }

    /// Fixed size in points, or `None` for [`PaperSize::Match`].
    pub fn dimensions(self) -> Option<(f32, f32)> {
        match self {
            PaperSize::Match => None,
            PaperSize::Letter => Some((612.0, 792.0)),
            PaperSize::Legal => Some((612.0, 1008.0)),
            PaperSize::A4 => Some((595.0, 842.0)),
            PaperSize::A3 => Some((842.0, 1190.0)),
            PaperSize::Custom { width, height } => Some((width, height)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_file() {
        let params = GlobalParams::parse(
            "# system defaults\n\
             textEncoding Latin1\n\
             fontFile Helvetica /fonts/n019003l.pfb\n\
             fontDir /usr/share/fonts/type1\n\
             psLevel level3\n\
             psPaperSize A4\n",
        );

        assert_eq!(params.text_encoding, UnicodeMap::Latin1);
        assert_eq!(
            params.font_files.get("Helvetica"),
            Some(&PathBuf::from("/fonts/n019003l.pfb"))
        );
        assert_eq!(params.font_dirs, vec![PathBuf::from("/usr/share/fonts/type1")]);
        assert_eq!(params.ps_level, PsLevel::Level3);
        assert_eq!(params.ps_paper_size, PaperSize::A4);
    }

    #[test]
    fn test_parse_skips_malformed_lines() {
        let params = GlobalParams::parse("textEncoding Klingon\nbogus\npsPaperSize 100 200\n");
        assert_eq!(params.text_encoding, UnicodeMap::Utf8);
        assert_eq!(
            params.ps_paper_size,
            PaperSize::Custom {
                width: 100.0,
                height: 200.0
            }
        );
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let params = GlobalParams::load_or_default("/nonexistent/pdfdocrc");
        assert_eq!(params, GlobalParams::default());
    }

    #[test]
    fn test_global_is_initialized_once() {
        let first = GlobalParams::global() as *const GlobalParams;
        let second = GlobalParams::global() as *const GlobalParams;
        assert_eq!(first, second);
        assert!(!GlobalParams::install(GlobalParams::default()));
    }

    #[test]
    fn test_unicode_map() {
        assert_eq!(UnicodeMap::Utf8.map_unicode(0x20AC), Some('€'));
        assert_eq!(UnicodeMap::Latin1.map_unicode(0xE9), Some('é'));
        assert_eq!(UnicodeMap::Latin1.map_unicode(0x20AC), None);
        assert_eq!(UnicodeMap::Ascii7.map_unicode(0xE9), None);
        assert_eq!(UnicodeMap::Utf8.map_unicode(0xD800), None);
    }

    #[test]
    fn test_font_file_lookup() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Courier.pfb"), b"font").unwrap();

        let mut params = GlobalParams::default();
        params.font_dirs.push(dir.path().to_path_buf());
        params
            .font_files
            .insert("Symbol".to_string(), PathBuf::from("/fonts/s050000l.pfb"));

        assert_eq!(
            params.find_font_file("Courier"),
            Some(dir.path().join("Courier.pfb"))
        );
        assert_eq!(
            params.find_font_file("Symbol"),
            Some(PathBuf::from("/fonts/s050000l.pfb"))
        );
        assert_eq!(params.find_font_file("Times-Roman"), None);
    }
}
