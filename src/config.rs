//! Story, treemap and thumbnail configuration.
//!
//! Everything deserializes from one `story.json`; missing sections fall back
//! to the `Default` impls, which reproduce the stock presentation.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::error::Result;

/// Virtual height of a step without an override, in viewport-height units.
pub const DEFAULT_STEP_HEIGHT: f64 = 90.0;

/// Id of the implicit leading segment.
pub const HERO_ID: &str = "hero";

// ─── Steps ───────────────────────────────────────────────────────────────────

/// One frame of a cross-fade sequence.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CrossFadeFrame {
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub label: Option<String>,
}

/// Variant-specific payload of a narrative step.
#[derive(Debug, Clone, PartialEq)]
pub enum StepContent {
    /// `card`: text with an optional illustration.
    Card {
        text: String,
        image: Option<String>,
        alt: String,
    },
    /// `sampler-intro`: text plus tiles revealed progressively.
    Gallery { text: String, images: Vec<String> },
    /// `sampler-intro-single` and `compartment-single`.
    SingleImage {
        text: String,
        image: String,
        alt: String,
    },
    /// `compartment`: scroll-driven cross-fade with arrow navigation.
    CrossFade {
        text: String,
        frames: Vec<CrossFadeFrame>,
    },
    /// `object-grid`: category grid cycling by quartile.
    ObjectGrid { text: String },
    /// `treemap`: the zoomable visualization.
    Treemap,
    /// Anything else. Renders nothing.
    Unknown { kind: String },
}

impl StepContent {
    pub fn kind(&self) -> &str {
        match self {
            StepContent::Card { .. } => "card",
            StepContent::Gallery { .. } => "sampler-intro",
            StepContent::SingleImage { .. } => "sampler-intro-single",
            StepContent::CrossFade { .. } => "compartment",
            StepContent::ObjectGrid { .. } => "object-grid",
            StepContent::Treemap => "treemap",
            StepContent::Unknown { kind } => kind,
        }
    }

    /// Leniently decode a payload. Malformed content yields empty fields.
    pub fn from_parts(kind: &str, content: Value) -> Self {
        #[derive(Default, Deserialize)]
        #[serde(default)]
        struct Card {
            text: String,
            image: Option<String>,
            alt: String,
        }
        #[derive(Default, Deserialize)]
        #[serde(default)]
        struct Gallery {
            text: String,
            samplers: Vec<String>,
        }
        #[derive(Default, Deserialize)]
        #[serde(default)]
        struct Single {
            text: String,
            image: String,
            alt: Option<String>,
        }
        #[derive(Default, Deserialize)]
        #[serde(default)]
        struct Compartments {
            text: String,
            compartments: Vec<CrossFadeFrame>,
        }
        #[derive(Default, Deserialize)]
        #[serde(default)]
        struct Grid {
            text: String,
        }

        fn lenient<T: Default + serde::de::DeserializeOwned>(v: Value) -> T {
            if v.is_null() {
                return T::default();
            }
            serde_json::from_value(v).unwrap_or_else(|e| {
                log::warn!("malformed step content, using defaults: {}", e);
                T::default()
            })
        }

        match kind {
            "card" => {
                let c: Card = lenient(content);
                StepContent::Card {
                    text: c.text,
                    image: c.image.filter(|s| !s.is_empty()),
                    alt: c.alt,
                }
            }
            "sampler-intro" => {
                let g: Gallery = lenient(content);
                StepContent::Gallery {
                    text: g.text,
                    images: g.samplers,
                }
            }
            "sampler-intro-single" | "compartment-single" => {
                let s: Single = lenient(content);
                StepContent::SingleImage {
                    text: s.text,
                    image: s.image,
                    alt: s.alt.unwrap_or_else(|| "Sampler".to_string()),
                }
            }
            "compartment" => {
                let c: Compartments = lenient(content);
                StepContent::CrossFade {
                    text: c.text,
                    frames: c.compartments,
                }
            }
            "object-grid" => {
                let g: Grid = lenient(content);
                StepContent::ObjectGrid { text: g.text }
            }
            "treemap" => StepContent::Treemap,
            other => StepContent::Unknown {
                kind: other.to_string(),
            },
        }
    }
}

#[derive(Deserialize)]
struct RawStep {
    #[serde(default)]
    id: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    content: Value,
    #[serde(default)]
    height: Option<f64>,
}

/// A configured narrative step.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawStep")]
pub struct StepConfig {
    pub id: String,
    /// Explicit virtual height, overriding the per-id table.
    pub height: Option<f64>,
    pub content: StepContent,
}

impl From<RawStep> for StepConfig {
    fn from(raw: RawStep) -> Self {
        Self {
            content: StepContent::from_parts(&raw.kind, raw.content),
            id: raw.id,
            height: raw.height.filter(|h| h.is_finite() && *h > 0.0),
        }
    }
}

impl StepConfig {
    pub fn new(id: impl Into<String>, content: StepContent) -> Self {
        Self {
            id: id.into(),
            height: None,
            content,
        }
    }

    pub fn with_height(mut self, height: f64) -> Self {
        self.height = Some(height);
        self
    }
}

// ─── Categories ──────────────────────────────────────────────────────────────

/// One object-grid category.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CategoryConfig {
    pub key: String,
    pub label: String,
    /// Directory prefix for manifest entries.
    pub path: String,
    /// Location of the JSON manifest (array of file names).
    pub manifest: String,
    /// Optional JSON metadata rows.
    #[serde(default, alias = "csv")]
    pub metadata: Option<String>,
}

impl CategoryConfig {
    fn stock(key: &str, label: &str, with_metadata: bool) -> Self {
        let path = format!("assets/{}", key);
        Self {
            key: key.to_string(),
            label: label.to_string(),
            manifest: format!("{}/manifest.json", path),
            metadata: with_metadata.then(|| format!("assets/{}.json", key)),
            path,
        }
    }
}

// ─── Treemap ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TreemapConfig {
    /// Logical layout canvas, also the viewport size the camera maps onto.
    pub width: f64,
    pub height: f64,
    /// Gap between sibling rectangles.
    pub padding_inner: f64,
    /// Top-level families dropped before layout.
    pub excluded: Vec<String>,
    /// Top-level families folded into the aggregate bucket.
    pub folded: Vec<String>,
    pub aggregate_name: String,
    pub aggregate_color: String,
    pub fallback_color: String,
    /// Normalized family name → hex color.
    pub palette: BTreeMap<String, String>,
    /// Normalized family name → display name.
    pub family_names: BTreeMap<String, String>,
    /// Museum unit code → display name.
    pub unit_names: BTreeMap<String, String>,
    pub root_title: String,
    pub transition_ms: u64,
    /// Minimum unit size (px) before a leaf label is drawn.
    pub label_min_width: f64,
    pub label_min_height: f64,
}

fn table(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

impl Default for TreemapConfig {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 520.0,
            padding_inner: 1.0,
            excluded: [
                "portray, display & decorate",
                "pay & exchange",
                "commemorate & symbolize",
                "other",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            folded: ["work & build", "measure & navigate", "play", "worship"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            aggregate_name: "Other Actions".to_string(),
            aggregate_color: "#6f6f6f".to_string(),
            fallback_color: "#999999".to_string(),
            palette: table(&[
                ("eat, cook & drink", "#868D7A"),
                ("heal & care", "#9C9C80"),
                ("ignite & manage fire", "#8D927C"),
                ("textile making", "#8F8C81"),
                ("dress & accessorize", "#8F8C81"),
                ("decorate & furnish", "#7A7875"),
                ("read, write & record", "#8B928A"),
                ("perform music", "#8A726B"),
                ("smoke", "#8A726B"),
                ("fight", "#8F837A"),
            ]),
            family_names: table(&[
                ("eat, cook & drink", "Eating, Cooking & Drinking"),
                ("read, write & record", "Reading, Writing & Recording"),
                ("dress & accessorize", "Dressing & Accessorizing"),
                ("heal & care", "Healing & Caring"),
                ("work & build", "Working & Building"),
                ("commemorate & symbolize", "Commemorating & Symbolizing"),
                ("decorate & furnish", "Decorating & Furnishing"),
                ("fight", "Fighting & Hunting"),
                ("ignite & manage fire", "Lighting & Firekeeping"),
                ("measure & navigate", "Measuring & Navigating"),
                ("perform music", "Performing Music"),
                ("play", "Playing"),
                ("smoke", "Smoking"),
                ("textile making", "Making Textiles"),
                ("worship", "Worshipping"),
                ("other", "Other"),
                ("other actions", "Other Actions"),
            ]),
            unit_names: table(&[
                ("AAA", "Archives of American Art"),
                ("ACM", "Anacostia Community Museum"),
                ("CFCHFOLKLIFE", "Ralph Rinzler Folklife Archives and Collections"),
                ("CHNDM", "Cooper Hewitt, Smithsonian Design Museum"),
                ("EEPA", "Eliot Elisofon Photographic Archives"),
                ("FBR", "Smithsonian Field Book Project"),
                ("FSG", "Freer Gallery of Art and Arthur M. Sackler Gallery"),
                ("HAC", "Smithsonian Gardens"),
                ("HMSG", "Hirshhorn Museum and Sculpture Garden"),
                ("HSFA", "Human Studies Film Archives"),
                ("NAA", "National Anthropological Archives"),
                ("NASM", "National Air and Space Museum"),
                ("NMAAHC", "National Museum of African American History and Culture"),
                ("NMAH", "National Museum of American History"),
                ("NMAI", "National Museum of the American Indian"),
                ("NMAfA", "National Museum of African Art"),
                ("NMNH", "National Museum of Natural History"),
                ("NMNHANTHRO", "NMNH - Anthropology Dept."),
                ("NMNHBIRDS", "NMNH - Vertebrate Zoology - Birds Division"),
                ("NMNHBOTANY", "NMNH - Botany Dept."),
                ("NMNHEDUCATION", "NMNH - Education & Outreach"),
                ("NMNHENTO", "NMNH - Entomology Dept."),
                ("NMNHFISHES", "NMNH - Vertebrate Zoology - Fishes Division"),
                ("NMNHHERPS", "NMNH - Vertebrate Zoology - Herpetology Division"),
                ("NMNHINV", "NMNH - Invertebrate Zoology Dept."),
                ("NMNHMAMMALS", "NMNH - Vertebrate Zoology - Mammals Division"),
                ("NMNHMINSCI", "NMNH - Mineral Sciences Dept."),
                ("NMNHPALEO", "NMNH - Paleobiology Dept."),
                ("NPG", "National Portrait Gallery"),
                ("NPM", "National Postal Museum"),
                ("NZP", "Smithsonian's National Zoo & Conservation Biology Institute"),
                ("SAAM", "Smithsonian American Art Museum"),
                ("SIA", "Smithsonian Institution Archives"),
                ("SIL", "Smithsonian Libraries"),
            ]),
            root_title: "All Actions".to_string(),
            transition_ms: 550,
            label_min_width: 70.0,
            label_min_height: 30.0,
        }
    }
}

impl TreemapConfig {
    /// Human-friendly family name; the raw name when no mapping exists.
    pub fn family_display_name(&self, raw: &str) -> String {
        self.family_names
            .get(&crate::keys::normalize_name(raw))
            .cloned()
            .unwrap_or_else(|| raw.to_string())
    }

    /// Museum display name for a unit code, empty when unknown.
    pub fn unit_display_name(&self, code: &str) -> &str {
        self.unit_names.get(code.trim()).map(String::as_str).unwrap_or("")
    }
}

// ─── Thumbnails ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ThumbnailConfig {
    /// Content endpoint; the record id is appended.
    pub base_url: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Entries per detail view that get a lookup.
    pub cap: usize,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.si.edu/openaccess/api/v1.0/content/".to_string(),
            api_key_env: "SI_API_KEY".to_string(),
            cap: 50,
        }
    }
}

// ─── Data files ──────────────────────────────────────────────────────────────

/// Locations of the treemap datasets, relative to the data source.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DataFiles {
    /// Hierarchical `{name, children}` tree.
    pub treemap: String,
    /// Flat `{ objectType: [row…] }` detail rows.
    pub details: String,
}

impl Default for DataFiles {
    fn default() -> Self {
        Self {
            treemap: "treemap_jsons/treemap_data.json".to_string(),
            details: "treemap_jsons/object_details.json".to_string(),
        }
    }
}

// ─── Story ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StoryConfig {
    pub steps: Vec<StepConfig>,
    pub categories: Vec<CategoryConfig>,
    pub default_height: f64,
    /// Step id → virtual height.
    pub heights: BTreeMap<String, f64>,
    /// Cross-fade window width.
    pub blend: f64,
    /// Whether carousel arrows wrap around.
    pub carousel_wrap: bool,
    /// Object grid tile cap.
    pub grid_cap: usize,
    pub treemap: TreemapConfig,
    pub thumbnails: ThumbnailConfig,
    pub data: DataFiles,
}

impl Default for StoryConfig {
    fn default() -> Self {
        let mut heights = BTreeMap::new();
        heights.insert("sampler-compartment".to_string(), 220.0);
        heights.insert("treemap".to_string(), 220.0);
        Self {
            steps: Vec::new(),
            categories: vec![
                CategoryConfig::stock("samplers", "Samplers", true),
                CategoryConfig::stock("teapots", "Teapots", false),
                CategoryConfig::stock("books", "Books", false),
                CategoryConfig::stock("clocks", "Clocks", false),
            ],
            default_height: DEFAULT_STEP_HEIGHT,
            heights,
            blend: 0.30,
            carousel_wrap: true,
            grid_cap: 21,
            treemap: TreemapConfig::default(),
            thumbnails: ThumbnailConfig::default(),
            data: DataFiles::default(),
        }
    }
}

impl StoryConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_value(v: Value) -> Result<Self> {
        Ok(serde_json::from_value(v)?)
    }

    /// Virtual height for a step: its own override, then the id table, then the default.
    pub fn height_of(&self, step: &StepConfig) -> f64 {
        step.height
            .or_else(|| self.heights.get(&step.id).copied())
            .unwrap_or(self.default_height)
    }
}
