use super::selection::CakeKey;

/// Question the bot asks to fill the next selection field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Question {
    Shape,
    Color,
    Topping,
    Candle,
}

impl Question {
    pub fn card(&self) -> CardId {
        match self {
            Question::Shape => CardId::Shapes,
            Question::Color => CardId::Colours,
            Question::Topping => CardId::Toppings,
            Question::Candle => CardId::Candles,
        }
    }

    /// Field name used in replies
    pub fn field(&self) -> &'static str {
        match self {
            Question::Shape => "shape",
            Question::Color => "colour",
            Question::Topping => "topping",
            Question::Candle => "candle",
        }
    }
}

/// Identifies one card of the fixed card set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardId {
    Welcome,
    Shapes,
    Colours,
    Toppings,
    Candles,
    Cake(CakeKey),
}

impl CardId {
    /// Stable asset name; template files are `<asset>.json`
    pub fn asset_name(&self) -> String {
        match self {
            CardId::Welcome => "welcome".to_string(),
            CardId::Shapes => "shapes".to_string(),
            CardId::Colours => "colours".to_string(),
            CardId::Toppings => "toppings".to_string(),
            CardId::Candles => "candles".to_string(),
            CardId::Cake(key) => key.asset_name(),
        }
    }

    pub fn title(&self) -> String {
        match self {
            CardId::Welcome => "Welcome to the cake shop!".to_string(),
            CardId::Shapes => "Please select the cake shape".to_string(),
            CardId::Colours => "Please select the cake colour".to_string(),
            CardId::Toppings => "Please select a topping".to_string(),
            CardId::Candles => "Would you like a candle on your cake?".to_string(),
            CardId::Cake(key) => format!("Here is your cake! A {}.", key.describe()),
        }
    }
}
