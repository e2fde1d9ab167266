// Keystring Layouts
// Built-in character tables and a cache so each layout is built once

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::mapping::{KeyMapping, Mapping};
use crate::modifier::ModifierKind;
use crate::Key;

/// Id of the default layout
pub const DEFAULT_LAYOUT: &str = "us";

/// Process-wide layout cache
static SHARED_CACHE: LazyLock<LayoutCache> = LazyLock::new(LayoutCache::new);

/// Unshifted character -> key code on a US ANSI keyboard
const US_BASE: &[(char, u16)] = &[
    ('a', 0x00), ('s', 0x01), ('d', 0x02), ('f', 0x03), ('h', 0x04),
    ('g', 0x05), ('z', 0x06), ('x', 0x07), ('c', 0x08), ('v', 0x09),
    ('b', 0x0B), ('q', 0x0C), ('w', 0x0D), ('e', 0x0E), ('r', 0x0F),
    ('y', 0x10), ('t', 0x11), ('1', 0x12), ('2', 0x13), ('3', 0x14),
    ('4', 0x15), ('6', 0x16), ('5', 0x17), ('=', 0x18), ('9', 0x19),
    ('7', 0x1A), ('-', 0x1B), ('8', 0x1C), ('0', 0x1D), (']', 0x1E),
    ('o', 0x1F), ('u', 0x20), ('[', 0x21), ('i', 0x22), ('p', 0x23),
    ('l', 0x25), ('j', 0x26), ('\'', 0x27), ('k', 0x28), (';', 0x29),
    ('\\', 0x2A), (',', 0x2B), ('/', 0x2C), ('n', 0x2D), ('m', 0x2E),
    ('.', 0x2F), ('`', 0x32),
];

/// Symbols typed with Shift held
const US_SHIFTED: &[(char, u16)] = &[
    ('!', 0x12), ('@', 0x13), ('#', 0x14), ('$', 0x15), ('%', 0x17),
    ('^', 0x16), ('&', 0x1A), ('*', 0x1C), ('(', 0x19), (')', 0x1D),
    ('_', 0x1B), ('+', 0x18), ('{', 0x21), ('}', 0x1E), ('|', 0x2A),
    (':', 0x29), ('"', 0x27), ('<', 0x2B), ('>', 0x2F), ('?', 0x2C),
    ('~', 0x32),
];

/// Characters typed with Option held
const US_OPTION: &[(char, u16)] = &[
    ('å', 0x00), ('∫', 0x0B), ('ç', 0x08), ('∂', 0x02), ('ƒ', 0x03),
    ('©', 0x05), ('˙', 0x04), ('∆', 0x26), ('˚', 0x28), ('¬', 0x25),
    ('µ', 0x2E), ('ø', 0x1F), ('π', 0x23), ('œ', 0x0C), ('®', 0x0F),
    ('ß', 0x01), ('†', 0x11), ('√', 0x09), ('∑', 0x0D), ('≈', 0x07),
    ('¥', 0x10), ('Ω', 0x06), ('¡', 0x12), ('™', 0x13), ('£', 0x14),
    ('¢', 0x15), ('∞', 0x17), ('§', 0x16), ('¶', 0x1A), ('•', 0x1C),
    ('ª', 0x19), ('º', 0x1D), ('–', 0x1B), ('≠', 0x18), ('“', 0x21),
    ('‘', 0x1E), ('«', 0x2A), ('…', 0x29), ('æ', 0x27), ('≤', 0x2B),
    ('≥', 0x2F), ('÷', 0x2C),
];

/// Characters typed with Shift and Option held
const US_SHIFT_OPTION: &[(char, u16)] = &[
    ('Å', 0x00), ('ı', 0x0B), ('Ç', 0x08), ('Î', 0x02), ('Ï', 0x03),
    ('˝', 0x05), ('Ó', 0x04), ('Ô', 0x26), ('Ò', 0x25), ('Â', 0x2E),
    ('Ø', 0x1F), ('∏', 0x23), ('Œ', 0x0C), ('‰', 0x0F), ('Í', 0x01),
    ('ˇ', 0x11), ('◊', 0x09), ('„', 0x0D), ('˛', 0x07), ('Á', 0x10),
    ('¸', 0x06), ('⁄', 0x12), ('€', 0x13), ('‹', 0x14), ('›', 0x15),
    ('ﬁ', 0x17), ('ﬂ', 0x16), ('‡', 0x1A), ('°', 0x1C), ('·', 0x19),
    ('‚', 0x1D), ('—', 0x1B), ('±', 0x18), ('”', 0x21), ('’', 0x1E),
    ('»', 0x2A), ('Ú', 0x29), ('Æ', 0x27), ('¯', 0x2B), ('˘', 0x2F),
    ('¿', 0x2C),
];

/// Control characters and whitespace; `\n` types Return like `\r`
const US_CONTROL: &[(char, Key)] = &[
    ('\r', Key::RETURN),
    ('\n', Key::RETURN),
    ('\t', Key::TAB),
    (' ', Key::SPACE),
    ('\u{8}', Key::DELETE),
    ('\u{7f}', Key::FORWARD_DELETE),
    ('\u{1b}', Key::ESCAPE),
];

/// Layouts that ship with the crate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum BuiltinLayout {
    #[strum(to_string = "us", serialize = "us-ansi", serialize = "abc")]
    Us,
}

impl BuiltinLayout {
    /// Resolve a layout id or alias
    pub fn from_id(id: &str) -> Option<Self> {
        id.parse().ok()
    }

    /// Canonical id, used as the cache key
    pub fn id(self) -> &'static str {
        match self {
            BuiltinLayout::Us => DEFAULT_LAYOUT,
        }
    }

    pub fn build(self) -> KeyMapping {
        match self {
            BuiltinLayout::Us => us_layout(),
        }
    }
}

/// Canonical ids of all built-in layouts
pub fn builtin_layout_ids() -> Vec<&'static str> {
    BuiltinLayout::iter().map(BuiltinLayout::id).collect()
}

/// Build a built-in layout table by id (aliases accepted)
pub fn builtin_layout(id: &str) -> Option<KeyMapping> {
    BuiltinLayout::from_id(id).map(BuiltinLayout::build)
}

/// The macOS US ANSI layout
pub fn us_layout() -> KeyMapping {
    let mut entries: Vec<(char, Mapping)> = Vec::new();

    for &(c, code) in US_BASE {
        entries.push((c, Mapping::plain(Key::from(code))));
        if c.is_ascii_lowercase() {
            entries.push((c.to_ascii_uppercase(), Mapping::shifted(Key::from(code))));
        }
    }
    entries.extend(US_SHIFTED.iter().map(|&(c, code)| (c, Mapping::shifted(Key::from(code)))));
    entries.extend(US_OPTION.iter().map(|&(c, code)| (c, Mapping::optioned(Key::from(code)))));
    entries.extend(US_SHIFT_OPTION.iter().map(|&(c, code)| {
        (
            c,
            Mapping::with_modifiers(Key::from(code), [ModifierKind::Shift, ModifierKind::Option]),
        )
    }));
    entries.extend(US_CONTROL.iter().map(|&(c, key)| (c, Mapping::plain(key))));

    log::debug!("built layout '{}' with {} characters", DEFAULT_LAYOUT, entries.len());
    KeyMapping::from_entries(DEFAULT_LAYOUT, entries)
}

/// Memoizes layout tables by id so each one is built at most once.
#[derive(Debug, Default)]
pub struct LayoutCache {
    layouts: RwLock<HashMap<String, Arc<KeyMapping>>>,
}

impl LayoutCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cache shared by the whole process
    pub fn shared() -> &'static LayoutCache {
        &SHARED_CACHE
    }

    /// Return the table for `id`, calling `build` only if it is not cached
    pub fn get_or_build<F>(&self, id: &str, build: F) -> Arc<KeyMapping>
    where
        F: FnOnce() -> KeyMapping,
    {
        if let Some(layout) = self.layouts.read().get(id) {
            return Arc::clone(layout);
        }
        let mut layouts = self.layouts.write();
        Arc::clone(layouts.entry(id.to_string()).or_insert_with(|| {
            log::debug!("layout '{}' not cached, building", id);
            Arc::new(build())
        }))
    }

    /// Cached built-in layout, or `None` for an unknown id
    pub fn builtin(&self, id: &str) -> Option<Arc<KeyMapping>> {
        let layout = BuiltinLayout::from_id(id)?;
        Some(self.get_or_build(layout.id(), || layout.build()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.layouts.read().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.layouts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::CharacterMap;
    use crate::modifier::ModifierSet;
    use std::cell::Cell;

    #[test]
    fn test_us_letters() {
        let layout = us_layout();
        let h = layout.get('h').unwrap();
        assert_eq!(h.key, Key::from(0x04));
        assert!(h.modifiers.is_empty());

        let upper_h = layout.get('H').unwrap();
        assert_eq!(upper_h.key, Key::from(0x04));
        assert_eq!(upper_h.modifiers, ModifierSet::shift());
    }

    #[test]
    fn test_us_shifted_symbols_share_keys_with_digits() {
        let layout = us_layout();
        for (shifted, plain) in [('!', '1'), ('@', '2'), ('(', '9'), ('>', '.')] {
            let s = layout.get(shifted).unwrap();
            assert_eq!(s.key, layout.get(plain).unwrap().key);
            assert_eq!(s.modifiers, ModifierSet::shift());
        }
    }

    #[test]
    fn test_us_option_layer() {
        let layout = us_layout();
        for (c, base) in [('∑', 'w'), ('™', '2'), ('£', '3'), ('Ω', 'z')] {
            let mapping = layout.get(c).unwrap();
            assert_eq!(mapping.key, layout.get(base).unwrap().key);
            assert_eq!(mapping.modifiers, ModifierSet::option());
        }
        let euro = layout.get('€').unwrap();
        assert_eq!(euro.modifiers, ModifierSet::shift_option());
    }

    #[test]
    fn test_newline_is_return_alias() {
        let layout = us_layout();
        assert_eq!(layout.get('\n'), layout.get('\r'));
        assert_eq!(layout.get('\t').unwrap().key, Key::TAB);
        assert_eq!(layout.get('\u{8}').unwrap().key, Key::DELETE);
    }

    #[test]
    fn test_no_character_defined_twice() {
        let total = US_BASE.len()
            + US_BASE.iter().filter(|(c, _)| c.is_ascii_lowercase()).count()
            + US_SHIFTED.len()
            + US_OPTION.len()
            + US_SHIFT_OPTION.len()
            + US_CONTROL.len();
        assert_eq!(us_layout().len(), total);
    }

    #[test]
    fn test_unmapped_character() {
        assert_eq!(us_layout().resolve_character('☃'), None);
    }

    #[test]
    fn test_builtin_aliases() {
        assert!(builtin_layout("US").is_some());
        assert!(builtin_layout("abc").is_some());
        assert!(builtin_layout("dvorak").is_none());
        assert_eq!(builtin_layout_ids(), vec!["us"]);
        assert_eq!(BuiltinLayout::from_id("Us-Ansi"), Some(BuiltinLayout::Us));
        assert_eq!(BuiltinLayout::Us.to_string(), "us");
    }

    #[test]
    fn test_cache_builds_once() {
        let cache = LayoutCache::new();
        let builds = Cell::new(0);
        let build = || {
            builds.set(builds.get() + 1);
            us_layout()
        };
        let first = cache.get_or_build("us", build);
        let second = cache.get_or_build("us", || {
            builds.set(builds.get() + 1);
            us_layout()
        });
        assert_eq!(builds.get(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert!(cache.contains("us"));
    }

    #[test]
    fn test_cache_builtin_lookup() {
        let cache = LayoutCache::new();
        let a = cache.builtin("US-ANSI").unwrap();
        let b = cache.builtin("us").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(cache.builtin("colemak").is_none());
        assert_eq!(cache.len(), 1);
    }
}
