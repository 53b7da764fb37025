use serde_json::{json, Value};

use pawtale_core::event::{EFFECT_MAX, EFFECT_MIN, MAX_OPTIONS, MIN_OPTIONS};

/// JSON schema the backend must follow when producing an event.
pub fn event_schema() -> Value {
    let effect_field = |stat: &str| {
        json!({
            "type": "integer",
            "minimum": EFFECT_MIN,
            "maximum": EFFECT_MAX,
            "description": format!("Effect on {stat} ({EFFECT_MIN} to +{EFFECT_MAX})")
        })
    };

    json!({
        "type": "object",
        "properties": {
            "event_type": {
                "type": "string",
                "enum": ["random", "weather", "time_based", "stat_based"],
                "description": "The type of event being generated"
            },
            "title": {
                "type": "string",
                "description": "A short, engaging title for the event"
            },
            "description": {
                "type": "string",
                "description": "What happens, written in a friendly tone suited to the pet"
            },
            "options": {
                "type": "array",
                "minItems": MIN_OPTIONS,
                "maxItems": MAX_OPTIONS,
                "description": "The choices the player can pick from",
                "items": {
                    "type": "object",
                    "properties": {
                        "text": {"type": "string", "description": "The text of this choice"},
                        "effect": {
                            "type": "object",
                            "properties": {
                                "hunger": effect_field("hunger"),
                                "energy": effect_field("energy"),
                                "happiness": effect_field("happiness")
                            },
                            "required": ["hunger", "energy", "happiness"]
                        },
                        "reasoning": {
                            "type": "string",
                            "description": "Why this choice has these effects"
                        }
                    },
                    "required": ["text", "effect", "reasoning"]
                }
            }
        },
        "required": ["event_type", "title", "description", "options"]
    })
}
