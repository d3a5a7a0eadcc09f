//! ASCII faces for the companion.

use terminal_exit_core::Mood;

/// Face art for a mood, one entry per row.
pub fn face(mood: Mood) -> &'static [&'static str] {
    match mood {
        Mood::Happy => &[
            "                    ",
            "     ^  ◉  ^        ",
            "      \\ │ /         ",
            "       ◡ ◡ ◡        ",
            "                    ",
        ],
        Mood::Neutral => &[
            "                    ",
            "     ◉  ·  ◉        ",
            "                    ",
            "      ───────       ",
            "                    ",
        ],
        Mood::Thinking => &[
            "                    ",
            "     ◉ ‿  ◉         ",
            "        ‿           ",
            "      ═════════     ",
            "       (thinking)   ",
        ],
        Mood::Nervous => &[
            "                    ",
            "     ◉ ~ ◉          ",
            "       ~~           ",
            "     ~~~~~~~        ",
            "                    ",
        ],
        Mood::Sad => &[
            "                    ",
            "     •  ⌢  •        ",
            "       ⌢            ",
            "     ╭─────╮        ",
            "                    ",
        ],
    }
}
