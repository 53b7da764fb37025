use rand::seq::SliceRandom;
use rand::Rng;

/// Opening scene for a brand-new story.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StoryStarter {
    pub location: &'static str,
    pub scenario: &'static str,
}

const fn starter(location: &'static str, scenario: &'static str) -> StoryStarter {
    StoryStarter { location, scenario }
}

pub const STORY_STARTERS: [StoryStarter; 12] = [
    starter("a cozy apartment", "Your pet just woke up and is looking for something fun to do."),
    starter("a sunny park", "Your pet is outside enjoying the fresh air but seems curious about something."),
    starter("a mysterious alleyway", "Your pet has wandered into an unfamiliar place. What will happen next?"),
    starter("a bustling city street", "Your pet is watching the world go by. Something interesting catches its eye."),
    starter("a quiet library", "Your pet is surrounded by books. Maybe it's looking for a story?"),
    starter("a beach at sunset", "Your pet is watching the waves crash. It seems to be thinking about something."),
    starter("a dense forest", "Your pet is exploring the woods, sniffing out new discoveries."),
    starter("a rooftop garden", "Your pet finds itself among the plants and flowers, enjoying the view of the city below."),
    starter("a futuristic space station", "Your pet is floating in zero gravity, playfully pawing at the air."),
    starter("a pirate ship", "Your pet is aboard a ship, watching seagulls circle above. Is it ready for an adventure?"),
    starter("a hidden underground bunker", "Your pet has discovered a secret hideout. Who built this place?"),
    starter("a snow-covered village", "Your pet's paws leave prints in the fresh snow as it explores the wintery wonderland."),
];

pub fn random_starter<R: Rng + ?Sized>(rng: &mut R) -> StoryStarter {
    *STORY_STARTERS.choose(rng).unwrap_or(&STORY_STARTERS[0])
}
