//! Engine configuration tables.
//!
//! Every empirically tuned constant of the inference heuristics lives here
//! as data. The defaults are the calibrated values; recalibration never
//! touches control flow.

/// Configuration for the whole inference engine.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Style profiling knobs
    pub profile: ProfileConfig,

    /// Title extraction knobs
    pub title: TitleConfig,

    /// Heading classification knobs
    pub classifier: ClassifierConfig,

    /// Hierarchy assignment knobs
    pub hierarchy: HierarchyConfig,
}

impl EngineConfig {
    /// Create a config with the calibrated defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the profiling table.
    pub fn with_profile(mut self, profile: ProfileConfig) -> Self {
        self.profile = profile;
        self
    }

    /// Replace the title table.
    pub fn with_title(mut self, title: TitleConfig) -> Self {
        self.title = title;
        self
    }

    /// Replace the classifier table.
    pub fn with_classifier(mut self, classifier: ClassifierConfig) -> Self {
        self.classifier = classifier;
        self
    }

    /// Replace the hierarchy table.
    pub fn with_hierarchy(mut self, hierarchy: HierarchyConfig) -> Self {
        self.hierarchy = hierarchy;
        self
    }
}

/// Style profiling constants.
#[derive(Debug, Clone)]
pub struct ProfileConfig {
    /// Minimum accumulated characters for a size to qualify as body text
    pub body_char_threshold: usize,

    /// Body size assumed when a document defeats every heuristic
    pub fallback_body_size: f32,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            body_char_threshold: 100,
            fallback_body_size: 10.0,
        }
    }
}

/// Title extraction constants.
#[derive(Debug, Clone)]
pub struct TitleConfig {
    /// Fraction of page height scanned for candidates (from the top)
    pub top_region: f32,

    /// Minimum size ratio to body text for a candidate
    pub min_size_ratio: f32,

    /// Maximum candidate word count
    pub max_words: usize,

    /// Size-ratio tiers and their score bonuses, checked in order
    pub size_tiers: [(f32, i32); 3],

    /// Vertical-position tiers (fraction of page height) and bonuses
    pub position_tiers: [(f32, i32); 3],

    /// Bonus for bold/heavy/black weight
    pub weight_bonus: i32,

    /// Word-count range earning the length bonus
    pub length_range: (usize, usize),

    /// Length bonus
    pub length_bonus: i32,

    /// Continuation lines must sit within this many title-font-sizes
    pub merge_gap_factor: f32,

    /// Maximum size difference for a continuation line
    pub merge_max_size_diff: f32,

    /// Minimum score for a continuation line
    pub merge_min_score: i32,

    /// A word (longer than 2 chars) repeated more than this many times
    /// marks the merged text as degenerate
    pub max_word_repeats: usize,
}

impl Default for TitleConfig {
    fn default() -> Self {
        Self {
            top_region: 0.5,
            min_size_ratio: 1.3,
            max_words: 20,
            size_tiers: [(2.0, 10), (1.5, 7), (1.3, 5)],
            position_tiers: [(0.1, 5), (0.2, 3), (0.3, 1)],
            weight_bonus: 3,
            length_range: (3, 15),
            length_bonus: 2,
            merge_gap_factor: 3.0,
            merge_max_size_diff: 4.0,
            merge_min_score: 3,
            max_word_repeats: 3,
        }
    }
}

/// Heading classification constants.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Header/footer band as a fraction of page height, top and bottom
    pub header_footer_band: f32,

    /// Maximum heading word count
    pub max_words: usize,

    /// Minimum heading word count
    pub min_words: usize,

    /// Maximum fraction of punctuation/symbol characters
    pub max_punct_ratio: f32,

    /// Size ratio above which a line counts as larger than body
    pub larger_ratio: f32,

    /// Size ratio above which a line counts as much larger
    pub much_larger_ratio: f32,

    /// Size ratio above which a marginal size bonus applies
    pub slight_ratio: f32,

    /// Size bonuses: much larger / larger / slight
    pub size_bonuses: (i32, i32, i32),

    /// Weight bonuses: bold / medium
    pub weight_bonuses: (i32, i32),

    /// Pattern bonuses: numbered / chapter / section / appendix
    pub pattern_bonuses: (i32, i32, i32, i32),

    /// Maximum word count for the all-caps signal
    pub caps_max_words: usize,

    /// Maximum word count for the all-caps score bonus
    pub caps_bonus_max_words: usize,

    /// Caps and title-case bonuses
    pub caps_bonus: i32,
    pub title_case_bonus: i32,

    /// Horizontal distance from page center that counts as centered
    pub center_tolerance: f32,

    /// Fraction of page width that counts as left-aligned
    pub left_margin_ratio: f32,

    /// Alignment bonus (centered or left-aligned)
    pub alignment_bonus: i32,

    /// Preceding gap must exceed this many body sizes to count as spacing
    pub gap_factor: f32,

    /// Spacing-before bonus
    pub spacing_bonus: i32,

    /// Reasonable-length bonus
    pub length_bonus: i32,

    /// Tolerance when matching a span size to a profiled heading tier
    pub tier_tolerance: f32,

    /// Tier bonuses: largest / second / third
    pub tier_bonuses: (i32, i32, i32),

    /// Base acceptance threshold
    pub base_threshold: i32,

    /// Threshold for numbered/chapter/appendix candidates
    pub structured_threshold: i32,

    /// Threshold for much-larger-and-bold or short-and-larger candidates
    pub emphasis_threshold: i32,

    /// Word count at or below which the emphasis threshold applies
    pub short_words: usize,

    /// Threshold for long or not-larger candidates (overrides the others)
    pub weak_threshold: i32,

    /// Word count above which the weak threshold applies
    pub weak_max_words: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            header_footer_band: 0.08,
            max_words: 15,
            min_words: 2,
            max_punct_ratio: 0.3,
            larger_ratio: 1.1,
            much_larger_ratio: 1.5,
            slight_ratio: 1.05,
            size_bonuses: (6, 4, 2),
            weight_bonuses: (4, 2),
            pattern_bonuses: (6, 5, 4, 5),
            caps_max_words: 10,
            caps_bonus_max_words: 5,
            caps_bonus: 3,
            title_case_bonus: 2,
            center_tolerance: 50.0,
            left_margin_ratio: 0.2,
            alignment_bonus: 1,
            gap_factor: 1.2,
            spacing_bonus: 3,
            length_bonus: 2,
            tier_tolerance: 1.0,
            tier_bonuses: (4, 3, 2),
            base_threshold: 8,
            structured_threshold: 6,
            emphasis_threshold: 7,
            short_words: 5,
            weak_threshold: 10,
            weak_max_words: 10,
        }
    }
}

/// Minimum size ratio and average score a cluster needs for a level.
#[derive(Debug, Clone, Copy)]
pub struct LevelGate {
    /// Minimum cluster size ratio to body text
    pub min_size_ratio: f32,

    /// Minimum cluster average score
    pub min_score: f32,
}

/// Hierarchy assignment constants.
#[derive(Debug, Clone)]
pub struct HierarchyConfig {
    /// Sizes within this distance merge into one cluster
    pub cluster_tolerance: f32,

    /// Sizes within this distance of an assigned cluster inherit its level
    pub inherit_tolerance: f32,

    /// Maximum distance from a heading's size to the closest mapped cluster
    pub map_tolerance: f32,

    /// Composite ranking weights: size ratio / formatting / average score
    pub weight_size: f32,
    pub weight_format: f32,
    pub weight_score: f32,

    /// Average score is normalized by this before weighting
    pub score_norm: f32,

    /// Per-level gates in H1..H4 order
    pub gates: [LevelGate; 4],

    /// Cleaned heading text must be longer than this
    pub min_text_len: usize,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            cluster_tolerance: 0.5,
            inherit_tolerance: 1.0,
            map_tolerance: 2.0,
            weight_size: 0.6,
            weight_format: 0.3,
            weight_score: 0.1,
            score_norm: 10.0,
            gates: [
                LevelGate {
                    min_size_ratio: 1.6,
                    min_score: 10.0,
                },
                LevelGate {
                    min_size_ratio: 1.4,
                    min_score: 8.0,
                },
                LevelGate {
                    min_size_ratio: 1.2,
                    min_score: 7.0,
                },
                LevelGate {
                    min_size_ratio: 1.1,
                    min_score: 6.0,
                },
            ],
            min_text_len: 2,
        }
    }
}
