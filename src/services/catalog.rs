//! Static demo data: the seed library, the trope vocabulary and the
//! candidate pool that trope recommendations are drawn from.

use crate::models::{CandidateBook, NewBook};

/// Reason attached to every seeded library title
pub const SEED_REASON: &str = "Seeded demo title";

pub struct SeedBook {
    pub title: &'static str,
    pub author: &'static str,
    pub description: &'static str,
    pub cover_url: &'static str,
}

impl SeedBook {
    pub fn to_new_book(&self) -> NewBook {
        NewBook::new(self.title, self.author)
            .with_description(self.description)
            .with_cover_url(self.cover_url)
            .with_reason(SEED_REASON)
    }
}

pub const SEED_BOOKS: &[SeedBook] = &[
    SeedBook {
        title: "Dragon's Embrace",
        author: "Lena Hargrave",
        description: "A fierce dragon rider falls for an enigmatic mage in a realm on the brink of war.",
        cover_url: "https://placehold.co/400x600?text=Dragon",
    },
    SeedBook {
        title: "Moonlit Oath",
        author: "Isla Fenwick",
        description: "Two rival witches unite to break a blood oath beneath an eclipse.",
        cover_url: "https://placehold.co/400x600?text=Moonlit",
    },
    SeedBook {
        title: "Academy of Thorns",
        author: "C. J. Rowen",
        description: "A scholarship student navigates dangerous politics and forbidden romance at a magical academy.",
        cover_url: "https://placehold.co/400x600?text=Academy",
    },
    SeedBook {
        title: "Stormbound Hearts",
        author: "N. D. Rook",
        description: "Elemental guardians must reconcile their past to calm the tempest threatening their world.",
        cover_url: "https://placehold.co/400x600?text=Storm",
    },
];

/// Vocabulary synthesized tropes are sampled from
pub const TROPE_LIBRARY: &[&str] = &[
    "enemies to lovers",
    "forbidden romance",
    "forced proximity",
    "mates bond",
    "magical academy",
    "morally gray hero",
    "slow burn",
    "found family",
    "royal intrigue",
    "redemption arc",
];

/// Tropes synthesized for a book without a fixed assignment
pub const SYNTHESIZED_TROPE_COUNT: usize = 3;

/// Fixed trope assignments, keyed by exact title
pub fn assigned_tropes(title: &str) -> Option<&'static [&'static str]> {
    match title {
        "Dragon's Embrace" => Some(&["mates bond", "morally gray hero", "forbidden romance"]),
        "Moonlit Oath" => Some(&["forced proximity", "slow burn", "royal intrigue"]),
        "Academy of Thorns" => Some(&["magical academy", "enemies to lovers", "found family"]),
        "Stormbound Hearts" => Some(&["redemption arc", "slow burn", "forbidden romance"]),
        _ => None,
    }
}

pub const TROPE_CANDIDATES: &[CandidateBook] = &[
    CandidateBook {
        id: "shadow-court-bargain",
        title: "Shadow Court Bargain",
        author: "Mira Lark",
        description: "A human negotiator is bound to a fae prince after a perilous bargain for her sister's freedom.",
        cover_url: "https://placehold.co/400x600?text=Shadow",
        tropes: &["enemies to lovers", "forbidden romance", "royal intrigue"],
        explanation: "This pick leans hard into the enemies-to-lovers tension and royal intrigue you keep revisiting.",
    },
    CandidateBook {
        id: "ashborne-vow",
        title: "Ashborne Vow",
        author: "Khalia Dusk",
        description: "An exiled fire mage must fake an engagement with her rival to reclaim her throne.",
        cover_url: "https://placehold.co/400x600?text=Ashborne",
        tropes: &["forced proximity", "enemies to lovers", "redemption arc"],
        explanation: "A fiery forced-proximity partnership that mirrors your favorite redemption arcs.",
    },
    CandidateBook {
        id: "celestial-threads",
        title: "Celestial Threads",
        author: "Rowan Illyr",
        description: "Twin seers are drafted into a celestial academy where fate knots their hearts together.",
        cover_url: "https://placehold.co/400x600?text=Celestial",
        tropes: &["magical academy", "slow burn", "found family"],
        explanation: "A lush academy setting with the slow-burn tension and found family comfort you crave.",
    },
    CandidateBook {
        id: "siren-of-the-tempest",
        title: "Siren of the Tempest",
        author: "Elara Voss",
        description: "A stormcaller and a pirate queen must join forces to calm a raging sea god.",
        cover_url: "https://placehold.co/400x600?text=Tempest",
        tropes: &["found family", "mates bond", "morally gray hero"],
        explanation: "This sea-swept adventure pairs a morally gray hero with a fated mate bond twist.",
    },
    CandidateBook {
        id: "gilded-sanctum",
        title: "Gilded Sanctum",
        author: "Aster Quinn",
        description: "A healer infiltrates a holy order and discovers her soulmate among the sworn protectors.",
        cover_url: "https://placehold.co/400x600?text=Sanctum",
        tropes: &["mates bond", "forbidden romance", "slow burn"],
        explanation: "Sweeping forbidden romance with a patient slow burn and undeniable soulmate pull.",
    },
];

/// Explanations used for library recommendations of books without a reason
pub const CANNED_EXPLANATIONS: &[&str] = &[
    "Shares the same slow-burn magic academy vibe you love.",
    "Features a fierce heroine and a brooding mage love interest.",
    "Combines political intrigue with enchanting worldbuilding.",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_assignments_use_library_vocabulary() {
        for seed in SEED_BOOKS {
            let tropes = assigned_tropes(seed.title).expect("seed titles have fixed tropes");
            assert_eq!(tropes.len(), SYNTHESIZED_TROPE_COUNT);
            assert!(tropes.iter().all(|t| TROPE_LIBRARY.contains(t)));
        }
    }

    #[test]
    fn test_lookup_requires_exact_title() {
        assert!(assigned_tropes("dragon's embrace").is_none());
        assert!(assigned_tropes("Dragon's Embrace ").is_none());
    }

    #[test]
    fn test_candidate_ids_are_unique() {
        let mut ids: Vec<&str> = TROPE_CANDIDATES.iter().map(|c| c.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), TROPE_CANDIDATES.len());
    }
}
