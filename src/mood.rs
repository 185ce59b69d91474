/// A mood maps a label to a TMDB `with_genres` filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mood {
    pub id: &'static str,
    pub label: &'static str,
    pub genres: &'static str,
}

pub const TRENDING_MOOD: &str = "trending";

pub const MOODS: [Mood; 7] = [
    Mood {
        id: TRENDING_MOOD,
        label: "Trending",
        genres: "",
    },
    Mood {
        id: "excited",
        label: "Excited",
        genres: "28,12",
    },
    Mood {
        id: "chill",
        label: "Chill",
        genres: "35,16",
    },
    Mood {
        id: "romantic",
        label: "Romantic",
        genres: "10749",
    },
    Mood {
        id: "scared",
        label: "Scared",
        genres: "27,53",
    },
    Mood {
        id: "thoughtful",
        label: "Thoughtful",
        genres: "18,99",
    },
    Mood {
        id: "mindblown",
        label: "Mind-Blown",
        genres: "878,9648",
    },
];

pub fn find(id: &str) -> Option<&'static Mood> {
    MOODS.iter().find(|m| m.id == id)
}
