//! System font lookup for text shapes.
//!
//! Family names resolve through fontdb once per (family, bold) pair. Each
//! resolved face is parsed once and kept for the life of the process, so
//! aliases of the same face share one font. When nothing matches, text
//! shapes still measure with a fixed advance and simply draw nothing.

use fontdb::{Database, Family, Query, Stretch, Style, Weight, ID};
use parking_lot::Mutex;
use rusttype::Font;
use std::collections::HashMap;
use std::sync::OnceLock;

#[derive(Default)]
struct FontCache {
    faces: HashMap<(String, bool), Option<ID>>,
    fonts: HashMap<ID, Option<&'static Font<'static>>>,
}

fn database() -> &'static Database {
    static DB: OnceLock<Database> = OnceLock::new();
    DB.get_or_init(|| {
        let mut db = Database::new();
        db.load_system_fonts();
        tracing::debug!(faces = db.len(), "Loaded system font database");
        db
    })
}

/// Maps a template font family name onto fontdb families. The generic
/// names used by stored templates map onto fontdb's generic families.
fn query_families(family: &str) -> Vec<Family<'_>> {
    match family.trim() {
        "" | "Sans" | "sans-serif" => vec![Family::SansSerif],
        "Serif" | "serif" => vec![Family::Serif],
        "Monospace" | "monospace" => vec![Family::Monospace],
        name => vec![Family::Name(name), Family::SansSerif],
    }
}

fn resolve(family: &str, bold: bool) -> Option<ID> {
    let families = query_families(family);
    database().query(&Query {
        families: &families,
        weight: if bold { Weight::BOLD } else { Weight::NORMAL },
        stretch: Stretch::Normal,
        style: Style::Normal,
    })
}

fn parse(id: ID) -> Option<Font<'static>> {
    database()
        .with_face_data(id, |data, index| {
            Font::try_from_vec_and_index(data.to_vec(), index)
        })
        .flatten()
}

fn cache() -> &'static Mutex<FontCache> {
    static CACHE: OnceLock<Mutex<FontCache>> = OnceLock::new();
    CACHE.get_or_init(|| Mutex::new(FontCache::default()))
}

/// Resolves `family`, falling back to the system sans-serif face.
pub fn get_font_for(family: &str, bold: bool) -> Option<&'static Font<'static>> {
    let key = (family.to_string(), bold);
    let cached = cache().lock().faces.get(&key).copied();
    let id = match cached {
        Some(id) => id,
        None => {
            let id = resolve(family, bold);
            if id.is_none() {
                tracing::warn!(family, bold, "No usable system font; text will not be drawn");
            }
            cache().lock().faces.insert(key, id);
            id
        }
    };

    let id = id?;
    let mut guard = cache().lock();
    let font = *guard.fonts.entry(id).or_insert_with(|| {
        let font = parse(id);
        if font.is_none() {
            tracing::warn!(family, bold, "System font face could not be parsed");
        }
        font.map(|font| &*Box::leak(Box::new(font)))
    });
    font
}
