//! Cake catalog - the table from a full selection to its card
//!
//! Every step of the conversation offers only what the table can still
//! satisfy, so a finished selection always resolves to a card.

use std::collections::HashSet;
use once_cell::sync::Lazy;

use crate::domain::entities::{
    CakeKey, CakeSelection, Candle, CardId, Color, Intent, Question, Shape, Topping,
};

static STANDARD: Lazy<CakeCatalog> = Lazy::new(|| {
    use Candle::{No, Yes};
    use Color::{Blue, Brown, White, Yellow};
    use Shape::Round;
    use Topping::{Cherries, Cream, Roses, Shells};

    let both: &[Candle] = &[Yes, No];
    let candle_only: &[Candle] = &[Yes];

    let rows: &[(Shape, Color, Topping, &[Candle])] = &[
        (Round, Yellow, Cream, both),
        (Round, Yellow, Roses, both),
        (Round, Yellow, Shells, both),
        (Round, Brown, Cream, both),
        (Round, Brown, Roses, both),
        (Round, Brown, Shells, both),
        (Round, Brown, Cherries, both),
        (Round, White, Cream, both),
        (Round, White, Roses, both),
        (Round, White, Cherries, candle_only),
        (Round, Blue, Cream, both),
        (Round, Blue, Roses, candle_only),
        (Round, Blue, Shells, candle_only),
        (Round, Blue, Cherries, candle_only),
    ];

    let keys = rows
        .iter()
        .flat_map(|(shape, color, topping, candles)| {
            candles.iter().map(move |candle| CakeKey::new(*shape, *color, *topping, *candle))
        })
        .collect();

    CakeCatalog::new(keys)
});

/// What applying one cake intent to a selection produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// Value stored, ask the next question
    Ask(Question),
    /// Value stored, every field is set
    Complete(CakeKey),
    /// An earlier field is still unset, nothing stored
    Missing(Question),
    /// Value is not offered for the current selection, nothing stored
    Unavailable { question: Question, value: &'static str },
}

/// Lookup table of cake cards
#[derive(Debug, Clone)]
pub struct CakeCatalog {
    keys: Vec<CakeKey>,
    index: HashSet<CakeKey>,
}

impl CakeCatalog {
    pub fn new(keys: Vec<CakeKey>) -> Self {
        let index = keys.iter().copied().collect();
        Self { keys, index }
    }

    /// The cake cards the shop ships with
    pub fn standard() -> &'static CakeCatalog {
        &STANDARD
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn lookup(&self, key: &CakeKey) -> Option<CardId> {
        self.index.contains(key).then_some(CardId::Cake(*key))
    }

    pub fn shapes(&self) -> Vec<Shape> {
        self.distinct(|_| true, |k| k.shape)
    }

    pub fn colors(&self, shape: Shape) -> Vec<Color> {
        self.distinct(|k| k.shape == shape, |k| k.color)
    }

    pub fn toppings(&self, shape: Shape, color: Color) -> Vec<Topping> {
        self.distinct(|k| k.shape == shape && k.color == color, |k| k.topping)
    }

    pub fn candles(&self, shape: Shape, color: Color, topping: Topping) -> Vec<Candle> {
        self.distinct(
            |k| k.shape == shape && k.color == color && k.topping == topping,
            |k| k.candle,
        )
    }

    /// Option labels on offer for `question` given the selection so far
    pub fn options(&self, question: Question, selection: &CakeSelection) -> Vec<&'static str> {
        match question {
            Question::Shape => self.shapes().iter().map(Shape::as_str).collect(),
            Question::Color => selection
                .shape
                .map(|s| self.colors(s).iter().map(Color::as_str).collect())
                .unwrap_or_default(),
            Question::Topping => match (selection.shape, selection.color) {
                (Some(s), Some(c)) => self.toppings(s, c).iter().map(Topping::as_str).collect(),
                _ => Vec::new(),
            },
            Question::Candle => match (selection.shape, selection.color, selection.topping) {
                (Some(s), Some(c), Some(t)) => {
                    self.candles(s, c, t).iter().map(Candle::as_str).collect()
                }
                _ => Vec::new(),
            },
        }
    }

    /// First unset field in order shape, colour, topping, candle
    pub fn next_question(&self, selection: &CakeSelection) -> Option<Question> {
        if selection.shape.is_none() {
            Some(Question::Shape)
        } else if selection.color.is_none() {
            Some(Question::Color)
        } else if selection.topping.is_none() {
            Some(Question::Topping)
        } else if selection.candle.is_none() {
            Some(Question::Candle)
        } else {
            None
        }
    }

    /// Apply a cake attribute intent to the selection
    pub fn apply(&self, selection: &mut CakeSelection, intent: Intent) -> SelectionOutcome {
        match intent {
            Intent::Shape(shape) => {
                if self.colors(shape).is_empty() {
                    return SelectionOutcome::Unavailable { question: Question::Shape, value: shape.as_str() };
                }
                selection.shape = Some(shape);
            }
            Intent::Color(color) => {
                let Some(shape) = selection.shape else {
                    return SelectionOutcome::Missing(Question::Shape);
                };
                if !self.colors(shape).contains(&color) {
                    return SelectionOutcome::Unavailable { question: Question::Color, value: color.as_str() };
                }
                selection.color = Some(color);
            }
            Intent::Topping(topping) => {
                let (Some(shape), Some(color)) = (selection.shape, selection.color) else {
                    return SelectionOutcome::Missing(self.first_missing(selection));
                };
                if !self.toppings(shape, color).contains(&topping) {
                    return SelectionOutcome::Unavailable { question: Question::Topping, value: topping.as_str() };
                }
                selection.topping = Some(topping);
            }
            Intent::Candle(candle) => {
                let (Some(shape), Some(color), Some(topping)) =
                    (selection.shape, selection.color, selection.topping)
                else {
                    return SelectionOutcome::Missing(self.first_missing(selection));
                };
                if !self.candles(shape, color, topping).contains(&candle) {
                    return SelectionOutcome::Unavailable { question: Question::Candle, value: candle.as_str() };
                }
                selection.candle = Some(candle);
            }
            _ => {}
        }

        self.prune(selection);
        self.fill_forced(selection);

        match self.next_question(selection) {
            Some(question) => SelectionOutcome::Ask(question),
            None => match selection.key() {
                Some(key) => SelectionOutcome::Complete(key),
                None => SelectionOutcome::Ask(Question::Shape),
            },
        }
    }

    /// Clear later fields that the earlier ones no longer offer
    fn prune(&self, selection: &mut CakeSelection) {
        let Some(shape) = selection.shape else {
            selection.clear();
            return;
        };
        if let Some(color) = selection.color {
            if !self.colors(shape).contains(&color) {
                selection.color = None;
            }
        }
        let Some(color) = selection.color else {
            selection.topping = None;
            selection.candle = None;
            return;
        };
        if let Some(topping) = selection.topping {
            if !self.toppings(shape, color).contains(&topping) {
                selection.topping = None;
            }
        }
        let Some(topping) = selection.topping else {
            selection.candle = None;
            return;
        };
        if let Some(candle) = selection.candle {
            if !self.candles(shape, color, topping).contains(&candle) {
                selection.candle = None;
            }
        }
    }

    /// Skip the candle question when only one variant exists
    fn fill_forced(&self, selection: &mut CakeSelection) {
        if selection.candle.is_some() {
            return;
        }
        if let (Some(s), Some(c), Some(t)) = (selection.shape, selection.color, selection.topping) {
            if let [only] = self.candles(s, c, t).as_slice() {
                selection.candle = Some(*only);
            }
        }
    }

    fn first_missing(&self, selection: &CakeSelection) -> Question {
        self.next_question(selection).unwrap_or(Question::Shape)
    }

    fn distinct<T, F, M>(&self, filter: F, map: M) -> Vec<T>
    where
        T: PartialEq,
        F: Fn(&CakeKey) -> bool,
        M: Fn(&CakeKey) -> T,
    {
        let mut out: Vec<T> = Vec::new();
        for key in self.keys.iter().filter(|k| filter(k)) {
            let value = map(key);
            if !out.contains(&value) {
                out.push(value);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn select(catalog: &CakeCatalog, intents: &[Intent]) -> (CakeSelection, SelectionOutcome) {
        let mut selection = CakeSelection::default();
        let mut last = SelectionOutcome::Ask(Question::Shape);
        for intent in intents {
            last = catalog.apply(&mut selection, *intent);
        }
        (selection, last)
    }

    #[test]
    fn test_standard_table_size() {
        assert_eq!(CakeCatalog::standard().len(), 24);
    }

    #[test]
    fn test_round_yellow_cream_candle() {
        let catalog = CakeCatalog::standard();
        let (_, outcome) = select(catalog, &[
            Intent::Shape(Shape::Round),
            Intent::Color(Color::Yellow),
            Intent::Topping(Topping::Cream),
            Intent::Candle(Candle::Yes),
        ]);
        let key = CakeKey::new(Shape::Round, Color::Yellow, Topping::Cream, Candle::Yes);
        assert_eq!(outcome, SelectionOutcome::Complete(key));
        assert_eq!(catalog.lookup(&key).unwrap().asset_name(), "round-yellow-cream-candle");
    }

    #[test]
    fn test_lookup_missing_combination() {
        let catalog = CakeCatalog::standard();
        let key = CakeKey::new(Shape::Triangle, Color::Red, Topping::Cream, Candle::No);
        assert!(catalog.lookup(&key).is_none());
    }

    #[test]
    fn test_options_follow_the_table() {
        let catalog = CakeCatalog::standard();
        assert_eq!(catalog.shapes(), vec![Shape::Round]);
        assert_eq!(
            catalog.colors(Shape::Round),
            vec![Color::Yellow, Color::Brown, Color::White, Color::Blue]
        );
        assert_eq!(
            catalog.toppings(Shape::Round, Color::Yellow),
            vec![Topping::Cream, Topping::Roses, Topping::Shells]
        );
        assert_eq!(catalog.candles(Shape::Round, Color::Blue, Topping::Roses), vec![Candle::Yes]);
    }

    #[test]
    fn test_each_step_asks_the_next_question() {
        let catalog = CakeCatalog::standard();
        let mut selection = CakeSelection::default();
        assert_eq!(catalog.apply(&mut selection, Intent::Shape(Shape::Round)), SelectionOutcome::Ask(Question::Color));
        assert_eq!(catalog.apply(&mut selection, Intent::Color(Color::Brown)), SelectionOutcome::Ask(Question::Topping));
        assert_eq!(catalog.apply(&mut selection, Intent::Topping(Topping::Cherries)), SelectionOutcome::Ask(Question::Candle));
    }

    #[test]
    fn test_prerequisite_missing() {
        let catalog = CakeCatalog::standard();
        let (selection, outcome) = select(catalog, &[Intent::Topping(Topping::Cream)]);
        assert_eq!(outcome, SelectionOutcome::Missing(Question::Shape));
        assert!(selection.is_empty());

        let (_, outcome) = select(catalog, &[Intent::Shape(Shape::Round), Intent::Candle(Candle::No)]);
        assert_eq!(outcome, SelectionOutcome::Missing(Question::Color));
    }

    #[test]
    fn test_unavailable_values_are_not_stored() {
        let catalog = CakeCatalog::standard();
        let (selection, outcome) = select(catalog, &[Intent::Shape(Shape::Triangle)]);
        assert_eq!(outcome, SelectionOutcome::Unavailable { question: Question::Shape, value: "Triangle" });
        assert!(selection.shape.is_none());

        let (selection, outcome) = select(catalog, &[Intent::Shape(Shape::Round), Intent::Color(Color::Red)]);
        assert_eq!(outcome, SelectionOutcome::Unavailable { question: Question::Color, value: "Red" });
        assert!(selection.color.is_none());

        let (_, outcome) = select(catalog, &[
            Intent::Shape(Shape::Round),
            Intent::Color(Color::Yellow),
            Intent::Topping(Topping::Cherries),
        ]);
        assert_eq!(outcome, SelectionOutcome::Unavailable { question: Question::Topping, value: "Cherries" });
    }

    #[test]
    fn test_single_candle_variant_skips_question() {
        let catalog = CakeCatalog::standard();
        let (selection, outcome) = select(catalog, &[
            Intent::Shape(Shape::Round),
            Intent::Color(Color::Blue),
            Intent::Topping(Topping::Shells),
        ]);
        assert_eq!(selection.candle, Some(Candle::Yes));
        assert_eq!(
            outcome,
            SelectionOutcome::Complete(CakeKey::new(Shape::Round, Color::Blue, Topping::Shells, Candle::Yes))
        );
    }

    #[test]
    fn test_changing_colour_clears_unoffered_topping() {
        let catalog = CakeCatalog::standard();
        let (mut selection, _) = select(catalog, &[
            Intent::Shape(Shape::Round),
            Intent::Color(Color::Brown),
            Intent::Topping(Topping::Cherries),
            Intent::Candle(Candle::No),
        ]);
        // Yellow has no cherries, so topping and candle go
        let outcome = catalog.apply(&mut selection, Intent::Color(Color::Yellow));
        assert_eq!(outcome, SelectionOutcome::Ask(Question::Topping));
        assert_eq!(selection.topping, None);
        assert_eq!(selection.candle, None);
    }

    #[test]
    fn test_changing_colour_keeps_offered_fields() {
        let catalog = CakeCatalog::standard();
        let (mut selection, _) = select(catalog, &[
            Intent::Shape(Shape::Round),
            Intent::Color(Color::Brown),
            Intent::Topping(Topping::Cream),
            Intent::Candle(Candle::No),
        ]);
        let outcome = catalog.apply(&mut selection, Intent::Color(Color::White));
        assert_eq!(
            outcome,
            SelectionOutcome::Complete(CakeKey::new(Shape::Round, Color::White, Topping::Cream, Candle::No))
        );
    }

    #[test]
    fn test_options_for_questions() {
        let catalog = CakeCatalog::standard();
        let selection = CakeSelection {
            shape: Some(Shape::Round),
            color: Some(Color::White),
            ..Default::default()
        };
        assert_eq!(catalog.options(Question::Topping, &selection), vec!["Cream", "Roses", "Cherries"]);
        assert!(catalog.options(Question::Candle, &selection).is_empty());
    }
}
