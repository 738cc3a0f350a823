//! Process-wide language registry
//!
//! Maps names to [`Language`] handles so hosts can look languages up by the
//! name a document declares. Thorn is registered from the start.

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use tracing::debug;

use super::Language;
use crate::grammar::thorn;

static REGISTRY: Lazy<RwLock<FxHashMap<SmolStr, Language>>> = Lazy::new(|| {
    let thorn = thorn::language().clone();
    let mut languages = FxHashMap::default();
    languages.insert(SmolStr::new(thorn.name()), thorn);
    RwLock::new(languages)
});

/// Register a language under its name, returning the one it replaces
pub fn register(language: Language) -> Option<Language> {
    debug!(name = language.name(), "registering language");
    REGISTRY.write().insert(SmolStr::new(language.name()), language)
}

pub fn lookup(name: &str) -> Option<Language> {
    REGISTRY.read().get(name).cloned()
}

/// Registered names, sorted
pub fn names() -> Vec<SmolStr> {
    let mut names: Vec<SmolStr> = REGISTRY.read().keys().cloned().collect();
    names.sort();
    names
}
