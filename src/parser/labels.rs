//! Page label table (`/PageLabels` number tree).

use lopdf::{Dictionary, Document as LopdfDocument, Object};

use super::backend::{dict_get, dict_get_dict, integer, number_tree_entries, resolve_dict};
use crate::decode::decode_text_object;

/// Largest number written in roman numerals; larger ones fall back to decimal.
const ROMAN_LIMIT: i64 = 3999;
/// Longest letter run (`ZZZ...`); larger numbers fall back to decimal.
const LETTERS_MAX_REPEAT: i64 = 32;

/// Numbering style of a label range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelStyle {
    /// Prefix only
    None,
    Decimal,
    UpperRoman,
    LowerRoman,
    UpperLetters,
    LowerLetters,
}

impl LabelStyle {
    fn from_name(name: &[u8]) -> Self {
        match name {
            b"D" => LabelStyle::Decimal,
            b"R" => LabelStyle::UpperRoman,
            b"r" => LabelStyle::LowerRoman,
            b"A" => LabelStyle::UpperLetters,
            b"a" => LabelStyle::LowerLetters,
            _ => LabelStyle::None,
        }
    }

    fn format(self, n: i64) -> String {
        match self {
            LabelStyle::None => String::new(),
            LabelStyle::Decimal => n.to_string(),
            LabelStyle::UpperRoman if n <= ROMAN_LIMIT => to_roman(n),
            LabelStyle::LowerRoman if n <= ROMAN_LIMIT => to_roman(n).to_lowercase(),
            LabelStyle::UpperLetters if n <= 26 * LETTERS_MAX_REPEAT => to_letters(n),
            LabelStyle::LowerLetters if n <= 26 * LETTERS_MAX_REPEAT => {
                to_letters(n).to_lowercase()
            }
            _ => n.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
struct LabelRange {
    /// 0-based index of the first page in the range
    first: usize,
    style: LabelStyle,
    prefix: String,
    start: i64,
}

/// Printable page labels for a document.
#[derive(Debug, Clone, Default)]
pub struct PageLabels {
    ranges: Vec<LabelRange>,
}

impl PageLabels {
    /// Read the catalog's `/PageLabels` tree. `None` if the document has none.
    pub(crate) fn from_catalog(doc: &LopdfDocument, catalog: &Dictionary) -> Option<Self> {
        let root = dict_get_dict(doc, catalog, b"PageLabels")?;

        let ranges: Vec<LabelRange> = number_tree_entries(doc, root)
            .into_iter()
            .filter_map(|(first, value)| {
                let first = usize::try_from(first).ok()?;
                let dict = resolve_dict(doc, value)?;
                Some(LabelRange {
                    first,
                    style: match dict_get(doc, dict, b"S") {
                        Some(Object::Name(name)) => LabelStyle::from_name(name),
                        _ => LabelStyle::None,
                    },
                    prefix: dict_get(doc, dict, b"P")
                        .and_then(decode_text_object)
                        .unwrap_or_default(),
                    start: dict_get(doc, dict, b"St")
                        .and_then(integer)
                        .filter(|st| *st >= 1)
                        .unwrap_or(1),
                })
            })
            .collect();

        if ranges.is_empty() {
            return None;
        }
        Some(Self { ranges })
    }

    /// Label of the page at 0-based `index`, or `None` before the first range
    /// and when the page number does not fit an `i64`.
    pub fn label(&self, index: usize) -> Option<String> {
        let range = self.ranges.iter().rev().find(|range| range.first <= index)?;
        let offset = i64::try_from(index - range.first).ok()?;
        let n = range.start.checked_add(offset)?;
        Some(format!("{}{}", range.prefix, range.style.format(n)))
    }

    /// 0-based index of the first page carrying `label`.
    pub fn index_of(&self, label: &str, page_count: usize) -> Option<usize> {
        (0..page_count).find(|&index| self.label(index).as_deref() == Some(label))
    }
}

/// Resolve a label to a 0-based page index.
///
/// Documents without a label table use plain 1-based page numbers.
pub(crate) fn label_to_index(
    labels: Option<&PageLabels>,
    label: &str,
    page_count: usize,
) -> Option<usize> {
    if let Some(labels) = labels {
        return labels.index_of(label, page_count);
    }

    let number: usize = label.trim().parse().ok()?;
    let index = number.checked_sub(1)?;
    (index < page_count).then_some(index)
}

fn to_roman(mut n: i64) -> String {
    const NUMERALS: [(i64, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];

    let mut out = String::new();
    for (value, numeral) in NUMERALS {
        while n >= value {
            out.push_str(numeral);
            n -= value;
        }
    }
    out
}

/// A..Z, then AA..ZZ, then AAA..ZZZ.
fn to_letters(n: i64) -> String {
    if n < 1 {
        return String::new();
    }
    let letter = (b'A' + ((n - 1) % 26) as u8) as char;
    let repeat = ((n - 1) / 26 + 1) as usize;
    std::iter::repeat(letter).take(repeat).collect()
}
