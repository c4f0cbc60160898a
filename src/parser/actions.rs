//! Reading actions and destinations from the object graph.

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use super::backend::{dict_get, dict_get_dict, name_str, number, resolve, resolve_dict};
use crate::decode::{decode_string, decode_text_object};
use crate::model::{DestView, Destination, LinkAction, PageTarget};

/// Action of an outline item: `/Dest` wins over `/A`.
pub(crate) fn item_action(doc: &LopdfDocument, item: &Dictionary, pages: &[ObjectId]) -> LinkAction {
    if let Ok(dest) = item.get(b"Dest") {
        return match parse_dest(doc, dest, pages) {
            Some(dest) => LinkAction::GoTo(dest),
            None => LinkAction::None,
        };
    }

    match dict_get_dict(doc, item, b"A") {
        Some(action) => parse_action(doc, action, pages),
        None => LinkAction::None,
    }
}

/// Decode an action dictionary by its `/S` type.
pub(crate) fn parse_action(doc: &LopdfDocument, action: &Dictionary, pages: &[ObjectId]) -> LinkAction {
    let Some(kind) = dict_get(doc, action, b"S").and_then(name_str) else {
        return LinkAction::None;
    };

    let dest = || {
        action
            .get(b"D")
            .ok()
            .and_then(|d| parse_dest(doc, d, pages))
    };

    match kind.as_str() {
        "GoTo" => dest().map(LinkAction::GoTo).unwrap_or(LinkAction::None),
        "GoToR" => LinkAction::GoToRemote {
            file: file_spec(doc, action),
            dest: dest(),
        },
        "Launch" => LinkAction::Launch {
            file: file_spec(doc, action),
            params: dict_get_dict(doc, action, b"Win")
                .and_then(|win| dict_get(doc, win, b"P"))
                .and_then(decode_text_object),
        },
        "URI" => match dict_get(doc, action, b"URI") {
            Some(Object::String(bytes, _)) => LinkAction::Uri(String::from_utf8_lossy(bytes).into_owned()),
            _ => LinkAction::None,
        },
        "Named" => dict_get(doc, action, b"N")
            .and_then(name_str)
            .map(LinkAction::Named)
            .unwrap_or(LinkAction::None),
        other => LinkAction::Unknown(other.to_string()),
    }
}

/// `/F` of an action: a string, or a file specification dictionary.
fn file_spec(doc: &LopdfDocument, action: &Dictionary) -> Option<String> {
    match dict_get(doc, action, b"F")? {
        Object::String(bytes, _) => decode_string(bytes),
        Object::Dictionary(spec) => dict_get(doc, spec, b"UF")
            .or_else(|| dict_get(doc, spec, b"F"))
            .and_then(decode_text_object),
        _ => None,
    }
}

/// Decode a destination: an explicit array, a name, or a `/D` dictionary.
pub(crate) fn parse_dest(doc: &LopdfDocument, obj: &Object, pages: &[ObjectId]) -> Option<Destination> {
    // Page references inside the array must stay unresolved.
    let obj = match obj {
        Object::Reference(_) => resolve(doc, obj)?,
        direct => direct,
    };

    match obj {
        Object::Name(name) => Some(Destination::Named(String::from_utf8_lossy(name).into_owned())),
        Object::String(bytes, _) => Some(Destination::Named(String::from_utf8_lossy(bytes).into_owned())),
        Object::Array(items) => explicit_dest(doc, items, pages),
        Object::Dictionary(_) => {
            let dict = resolve_dict(doc, obj)?;
            parse_dest(doc, dict.get(b"D").ok()?, pages)
        }
        _ => None,
    }
}

fn explicit_dest(doc: &LopdfDocument, items: &[Object], pages: &[ObjectId]) -> Option<Destination> {
    let page = match items.first()? {
        Object::Reference(id) => match pages.iter().position(|page| page == id) {
            Some(index) => PageTarget::Page(index as u32 + 1),
            None => PageTarget::Unresolved(id.0, id.1),
        },
        Object::Integer(index) => PageTarget::Index(u32::try_from(*index).ok()?),
        _ => return None,
    };

    let kind = resolve(doc, items.get(1)?).and_then(name_str)?;
    // `null` or missing operands leave the current value unchanged.
    let arg = |i: usize| items.get(i).and_then(|o| resolve(doc, o)).and_then(number);

    let view = match kind.as_str() {
        "XYZ" => DestView::Xyz {
            left: arg(2),
            top: arg(3),
            zoom: arg(4).filter(|zoom| *zoom != 0.0),
        },
        "Fit" => DestView::Fit,
        "FitH" => DestView::FitH { top: arg(2) },
        "FitV" => DestView::FitV { left: arg(2) },
        "FitR" => DestView::FitR {
            left: arg(2)?,
            bottom: arg(3)?,
            right: arg(4)?,
            top: arg(5)?,
        },
        "FitB" => DestView::FitB,
        "FitBH" => DestView::FitBH { top: arg(2) },
        "FitBV" => DestView::FitBV { left: arg(2) },
        _ => return None,
    };

    Some(Destination::Explicit { page, view })
}
