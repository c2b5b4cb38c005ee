pub mod file;
pub mod memory;

pub use file::JsonFilePrefs;
pub use memory::MemoryPrefs;

pub mod prelude {
    pub use super::{JsonFilePrefs, MemoryPrefs};
    pub use nl_core::prefs::{PrefChange, PrefKey, PrefUpdate, PreferenceStore};
}
