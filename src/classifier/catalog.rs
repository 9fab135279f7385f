use super::CryCategory;

/// Caregiver-facing description of a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryInfo {
    pub title: &'static str,
    pub description: &'static str,
    pub characteristics: &'static [&'static str],
    pub caregiver_tips: &'static [&'static str],
}

const CATALOG: [CategoryInfo; CryCategory::COUNT] = [
    CategoryInfo {
        title: "Hunger",
        description: "Rhythmic, persistent cry that builds in intensity and may come in short bursts.",
        characteristics: &[
            "Low-pitched, rhythmic pattern",
            "Builds gradually in intensity",
            "Often accompanied by rooting reflex or sucking motions",
            "May start and stop in short intervals",
        ],
        caregiver_tips: &[
            "Offer feeding promptly",
            "Check when baby last ate",
            "Look for hunger cues: rooting, sucking on fists",
            "Feed in a calm, quiet environment",
        ],
    },
    CategoryInfo {
        title: "Belly Pain",
        description: "Sudden, high-pitched, intense cry with little build-up and minimal pauses.",
        characteristics: &[
            "High-pitched, piercing quality",
            "Sudden onset without warning",
            "Sustained intensity with few breaks",
            "Legs may be drawn up toward the tummy",
        ],
        caregiver_tips: &[
            "Try gentle tummy massage in clockwise circles",
            "Bicycle the legs to help release trapped gas",
            "Check for signs of illness such as fever or a hard belly",
            "Consult a healthcare provider if the crying persists",
        ],
    },
    CategoryInfo {
        title: "Burping",
        description: "Short, grunting cries that often follow a feed and ease once air is released.",
        characteristics: &[
            "Short, grunt-like bursts",
            "Lower pitch with a strained quality",
            "Often appears during or right after feeding",
            "Squirming or arching of the back",
        ],
        caregiver_tips: &[
            "Hold baby upright against your shoulder and pat gently",
            "Pause mid-feed to burp",
            "Try sitting baby on your lap while supporting the chin",
        ],
    },
    CategoryInfo {
        title: "Discomfort",
        description: "Varied pitch with restless, uneven crying that often changes when position is altered.",
        characteristics: &[
            "Variable pitch with occasional grunts",
            "Changes intensity with movement",
            "Intermittent rather than continuous",
            "Often stops when position changes",
        ],
        caregiver_tips: &[
            "Check the diaper for wetness or soiling",
            "Look for uncomfortable clothing or positions",
            "Change baby's position or location",
            "Offer gentle massage or movement",
        ],
    },
    CategoryInfo {
        title: "Too Cold or Hot",
        description: "Sustained, fussy cry that rises and falls with the room or clothing temperature.",
        characteristics: &[
            "Steady, moderately pitched whine",
            "Persists regardless of feeding or holding",
            "Skin may feel clammy or cool to the touch",
        ],
        caregiver_tips: &[
            "Feel baby's neck or back to judge temperature",
            "Add or remove a layer of clothing",
            "Keep the room between 20 and 22 °C",
        ],
    },
    CategoryInfo {
        title: "Laughter",
        description: "Bright, bouncy vocal bursts that signal a content and engaged baby.",
        characteristics: &[
            "High, bright bursts of sound",
            "Bouncy, repeating rhythm",
            "Short phrases with quick pauses",
        ],
        caregiver_tips: &[
            "Keep playing: baby is enjoying the interaction",
            "Watch for signs of overstimulation such as looking away",
        ],
    },
    CategoryInfo {
        title: "Loneliness",
        description: "Whimpering cry that starts quietly and grows when no one responds.",
        characteristics: &[
            "Soft whimpers that gradually build",
            "Pauses as if waiting for a response",
            "Calms quickly when picked up",
        ],
        caregiver_tips: &[
            "Pick baby up and offer close contact",
            "Talk or sing softly so baby hears your voice",
            "Try a baby carrier for extended closeness",
        ],
    },
    CategoryInfo {
        title: "Background Noise",
        description: "Broadband sound without the tonal structure of a cry, such as a fan or television.",
        characteristics: &[
            "No clear pitch center",
            "Steady, hiss-like energy",
            "No rhythmic crying pattern",
        ],
        caregiver_tips: &[
            "Record closer to the baby",
            "Reduce background sources such as fans or television",
        ],
    },
    CategoryInfo {
        title: "Fear",
        description: "Sudden, loud, shrill cry that starts abruptly, often after a startle.",
        characteristics: &[
            "Abrupt, loud onset",
            "Shrill, agitated pitch",
            "Often follows a loud noise or sudden movement",
        ],
        caregiver_tips: &[
            "Hold baby close and speak calmly",
            "Swaddle to recreate a secure feeling",
            "Remove or reduce whatever caused the startle",
        ],
    },
    CategoryInfo {
        title: "Silence",
        description: "Little or no sound was captured in the recording.",
        characteristics: &[
            "Very low signal energy",
            "No discernible cry pattern",
        ],
        caregiver_tips: &[
            "Check that the microphone is working and unmuted",
            "Record again while baby is crying",
        ],
    },
    CategoryInfo {
        title: "Tiredness",
        description: "Whiny, intermittent cry that builds and fades, often with yawning and eye-rubbing.",
        characteristics: &[
            "Lower intensity, whiny quality",
            "Intermittent fading pattern",
            "Often accompanied by yawning or eye-rubbing",
            "May include fussiness or restlessness",
        ],
        caregiver_tips: &[
            "Create a calm, dimly lit environment",
            "Establish a consistent sleep routine",
            "Swaddle younger babies if appropriate",
            "Use gentle motion like rocking or swaying",
        ],
    },
];

pub fn info(category: CryCategory) -> &'static CategoryInfo {
    &CATALOG[category.index()]
}
