pub mod catalogue;
pub mod document;
pub mod synth;

pub use catalogue::{builtin_club, builtin_clubs, fallback_catalogue, ClubSeed, ClubTheme};
pub use document::Page;
pub use synth::{build_pages, tags_for, Layout};
