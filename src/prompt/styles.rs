//! Static catalog of art styles offered by the demo.
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Style {
    pub id: &'static str,
    pub name: &'static str,
    #[serde(rename = "prompt")]
    pub prompt_suffix: &'static str,
    pub description: &'static str,
}

pub static STYLES: [Style; 5] = [
    Style {
        id: "bw-photography",
        name: "Black & White Photography",
        prompt_suffix: "black and white photography, dramatic lighting, strong contrast",
        description: "Dramatic monochrome with rich contrasts",
    },
    Style {
        id: "baroque",
        name: "Classical Baroque",
        prompt_suffix: "baroque style, dramatic, ornate, rich colors, chiaroscuro, detailed",
        description: "Rich, dramatic and ornate classical style",
    },
    Style {
        id: "art-nouveau",
        name: "Art Nouveau",
        prompt_suffix: "art nouveau style, elegant, decorative, floral patterns, organic forms",
        description: "Elegant decorative style with organic forms",
    },
    Style {
        id: "cinematic",
        name: "Cinematic",
        prompt_suffix: "cinematic, professional photography, dramatic lighting, shallow depth of field",
        description: "Professional movie-like photography",
    },
    Style {
        id: "minimalist",
        name: "Minimalist",
        prompt_suffix: "minimalist style, simple, clean lines, uncluttered, neutral colors",
        description: "Clean, simple and uncluttered",
    },
];

pub fn all() -> &'static [Style] {
    &STYLES
}

/// Look up a catalog entry by id (case-insensitive).
pub fn find(id: &str) -> Option<&'static Style> {
    let id = id.trim();
    STYLES.iter().find(|s| s.id.eq_ignore_ascii_case(id))
}
