//! Greeting dialog - asks for the user's name and city

use crate::domain::entities::{GreetingStep, UserProfile};
use crate::domain::entities::user::capitalize;
use super::profile_service::CapturedEntities;

const NAME_LENGTH_MIN: usize = 3;
const CITY_LENGTH_MIN: usize = 5;

/// Replies of one dialog step and where the dialog stands afterwards
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogTurn {
    pub replies: Vec<String>,
    pub next: Option<GreetingStep>,
}

impl DialogTurn {
    fn waiting(step: GreetingStep, replies: Vec<String>) -> Self {
        Self { replies, next: Some(step) }
    }

    fn complete(replies: Vec<String>) -> Self {
        Self { replies, next: None }
    }
}

/// Start the dialog, skipping whatever the profile already knows
pub fn begin(profile: &UserProfile) -> DialogTurn {
    advance(profile, Vec::new())
}

/// Feed the user's answer to the step the dialog is waiting on
pub fn continue_dialog(
    step: GreetingStep,
    text: &str,
    captured: CapturedEntities,
    profile: &mut UserProfile,
) -> DialogTurn {
    match step {
        GreetingStep::AskName => {
            if !captured.name {
                let name = text.trim();
                if name.chars().count() < NAME_LENGTH_MIN {
                    return DialogTurn::waiting(
                        step,
                        vec![
                            format!("Names need to be at least {} characters long.", NAME_LENGTH_MIN),
                            prompt(step, profile),
                        ],
                    );
                }
                profile.name = Some(capitalize(name));
            }
            advance(profile, Vec::new())
        }
        GreetingStep::AskCity => {
            if !captured.city {
                let city = text.trim();
                if city.chars().count() < CITY_LENGTH_MIN {
                    return DialogTurn::waiting(
                        step,
                        vec![
                            format!("City names needs to be at least {} characters long.", CITY_LENGTH_MIN),
                            prompt(step, profile),
                        ],
                    );
                }
                profile.city = Some(capitalize(city));
            }
            advance(profile, Vec::new())
        }
    }
}

/// Repeat the question of `step`
pub fn reprompt(step: GreetingStep, profile: &UserProfile) -> String {
    prompt(step, profile)
}

fn advance(profile: &UserProfile, mut replies: Vec<String>) -> DialogTurn {
    let step = if profile.name.is_none() {
        GreetingStep::AskName
    } else if profile.city.is_none() {
        GreetingStep::AskCity
    } else {
        replies.push(format!(
            "Hi {}, from {}, nice to meet you!",
            profile.name.as_deref().unwrap_or_default(),
            profile.city.as_deref().unwrap_or_default()
        ));
        replies.push("You can always say 'My name is <your name> to reintroduce yourself to me.".to_string());
        return DialogTurn::complete(replies);
    };

    replies.push(prompt(step, profile));
    DialogTurn::waiting(step, replies)
}

fn prompt(step: GreetingStep, profile: &UserProfile) -> String {
    match step {
        GreetingStep::AskName => "What is your name?".to_string(),
        GreetingStep::AskCity => format!("Hello {}, what city do you live in?", profile.display_name()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_greeting() {
        let mut profile = UserProfile::new();

        let turn = begin(&profile);
        assert_eq!(turn.next, Some(GreetingStep::AskName));
        assert_eq!(turn.replies, vec!["What is your name?"]);

        let turn = continue_dialog(GreetingStep::AskName, "ada", CapturedEntities::default(), &mut profile);
        assert_eq!(turn.next, Some(GreetingStep::AskCity));
        assert_eq!(turn.replies, vec!["Hello Ada, what city do you live in?"]);

        let turn = continue_dialog(GreetingStep::AskCity, "london", CapturedEntities::default(), &mut profile);
        assert_eq!(turn.next, None);
        assert_eq!(turn.replies[0], "Hi Ada, from London, nice to meet you!");
    }

    #[test]
    fn test_short_name_is_rejected() {
        let mut profile = UserProfile::new();
        let turn = continue_dialog(GreetingStep::AskName, "al", CapturedEntities::default(), &mut profile);
        assert_eq!(turn.next, Some(GreetingStep::AskName));
        assert_eq!(turn.replies[0], "Names need to be at least 3 characters long.");
        assert!(profile.name.is_none());
    }

    #[test]
    fn test_short_city_is_rejected() {
        let mut profile = UserProfile::new().with_name("Ada");
        let turn = continue_dialog(GreetingStep::AskCity, "Rome", CapturedEntities::default(), &mut profile);
        assert_eq!(turn.next, Some(GreetingStep::AskCity));
        assert_eq!(turn.replies[0], "City names needs to be at least 5 characters long.");
    }

    #[test]
    fn test_entity_answer_is_kept() {
        // "my name is sam" filled the name through entities already
        let mut profile = UserProfile::new().with_name("Sam");
        let captured = CapturedEntities { name: true, city: false };
        let turn = continue_dialog(GreetingStep::AskName, "my name is sam", captured, &mut profile);
        assert_eq!(profile.name.as_deref(), Some("Sam"));
        assert_eq!(turn.next, Some(GreetingStep::AskCity));
    }

    #[test]
    fn test_known_profile_completes_immediately() {
        let profile = UserProfile::new().with_name("Ada").with_city("London");
        let turn = begin(&profile);
        assert_eq!(turn.next, None);
        assert_eq!(turn.replies.len(), 2);
    }
}
