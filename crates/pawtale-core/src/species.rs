use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::stats::Mood;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Species {
    #[default]
    Cat,
    Dog,
    Rabbit,
    Bird,
    Fish,
    Hamster,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown species: {0}")]
pub struct UnknownSpecies(pub String);

impl Species {
    pub const ALL: [Species; 6] = [
        Self::Cat,
        Self::Dog,
        Self::Rabbit,
        Self::Bird,
        Self::Fish,
        Self::Hamster,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::Cat => "cat",
            Self::Dog => "dog",
            Self::Rabbit => "rabbit",
            Self::Bird => "bird",
            Self::Fish => "fish",
            Self::Hamster => "hamster",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Cat => "Cat",
            Self::Dog => "Dog",
            Self::Rabbit => "Rabbit",
            Self::Bird => "Bird",
            Self::Fish => "Fish",
            Self::Hamster => "Hamster",
        }
    }

    /// Static asset shown for this species in the given mood.
    pub fn image_path(self, mood: Mood) -> String {
        format!("/static/pets/{}/{}.png", self.key(), mood.as_str())
    }

    pub fn names(self) -> &'static [&'static str] {
        match self {
            Self::Cat => CAT_NAMES,
            Self::Dog => DOG_NAMES,
            Self::Rabbit => RABBIT_NAMES,
            Self::Bird => BIRD_NAMES,
            Self::Fish => FISH_NAMES,
            Self::Hamster => HAMSTER_NAMES,
        }
    }

    pub fn suggest_name<R: Rng + ?Sized>(self, rng: &mut R) -> &'static str {
        self.names().choose(rng).copied().unwrap_or("Buddy")
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Species {
    type Err = UnknownSpecies;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|sp| sp.key().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownSpecies(s.to_owned()))
    }
}

const CAT_NAMES: &[&str] = &[
    "Whiskers", "Mittens", "Luna", "Oliver", "Leo", "Bella", "Charlie", "Lucy", "Max", "Lily",
    "Simba", "Cleo", "Felix", "Nala", "Oscar", "Milo", "Sophie", "Jack", "Kitty", "Tiger",
    "Shadow", "Smokey", "Misty", "Oreo", "Pepper", "Ginger", "Sasha", "Pumpkin", "Jasper", "Ruby",
];

const DOG_NAMES: &[&str] = &[
    "Buddy", "Max", "Bailey", "Cooper", "Daisy", "Sadie", "Molly", "Lola", "Rocky", "Maggie",
    "Charlie", "Sophie", "Jack", "Stella", "Toby", "Lucy", "Duke", "Zoe", "Teddy", "Lily",
    "Bentley", "Mia", "Rusty", "Coco", "Murphy", "Gracie", "Bear", "Penny", "Tucker", "Rosie",
];

const RABBIT_NAMES: &[&str] = &[
    "Thumper", "Hoppy", "Flopsy", "Mopsy", "Cottontail", "Bun-Bun", "Clover", "Daisy", "Oreo",
    "Cinnamon", "Snowball", "Pepper", "Nibbles", "Toffee", "Caramel", "Peanut", "Hazel", "Cocoa",
    "Marshmallow", "Nutmeg", "Ginger", "Honey", "Vanilla", "Mocha", "Licorice", "Butterscotch",
    "Cookie", "Maple", "Pumpkin", "Willow",
];

const BIRD_NAMES: &[&str] = &[
    "Tweety", "Sunny", "Sky", "Blueberry", "Kiwi", "Mango", "Peaches", "Rio", "Skye", "Zephyr",
    "Feather", "Piper", "Sparky", "Chirpy", "Phoenix", "Polly", "Robin", "Finch", "Falcon",
    "Eagle", "Hawk", "Raven", "Dove", "Sparrow", "Jay", "Oriole", "Cardinal", "Hummingbird",
    "Parrot", "Cockatiel",
];

const FISH_NAMES: &[&str] = &[
    "Bubbles", "Splash", "Nemo", "Dory", "Finn", "Goldie", "Coral", "Marlin", "Flounder", "Ariel",
    "Guppy", "Flipper", "Ripple", "Wave", "Pearl", "Shimmer", "Aqua", "Neptune", "Poseidon",
    "Marina", "Triton", "Oceana", "Tide", "Sailor", "Captain", "Shelly", "Scales", "Gill",
    "Finley", "Nessie",
];

const HAMSTER_NAMES: &[&str] = &[
    "Peanut", "Nibbles", "Squeaky", "Hammy", "Biscuit", "Cookie", "Nugget", "Tiny", "Gizmo",
    "Cinnamon", "Honey", "Oreo", "Marshmallow", "Buttercup", "Snickers", "Chewy", "Popcorn",
    "Pumpkin", "Muffin", "Cupcake", "Waffle", "Pancake", "Scooter", "Whiskers", "Fuzzy", "Teddy",
    "Pepper", "Ginger", "Nutmeg", "Cocoa",
];
