use serde::{Deserialize, Serialize};
use std::fmt;

/// Cake shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shape {
    Round,
    Rectangle,
    Triangle,
}

/// Cake colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    Yellow,
    Blue,
    Red,
    White,
    Brown,
}

/// Cake topping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topping {
    Cream,
    Cherries,
    Roses,
    Shells,
}

/// Whether the cake gets a candle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Candle {
    Yes,
    No,
}

impl Shape {
    pub fn as_str(&self) -> &'static str {
        match self {
            Shape::Round => "Round",
            Shape::Rectangle => "Rectangle",
            Shape::Triangle => "Triangle",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_lowercase().as_str() {
            "round" => Some(Shape::Round),
            "rectangle" => Some(Shape::Rectangle),
            "triangle" => Some(Shape::Triangle),
            _ => None,
        }
    }
}

impl Color {
    pub fn as_str(&self) -> &'static str {
        match self {
            Color::Yellow => "Yellow",
            Color::Blue => "Blue",
            Color::Red => "Red",
            Color::White => "White",
            Color::Brown => "Brown",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_lowercase().as_str() {
            "yellow" => Some(Color::Yellow),
            "blue" => Some(Color::Blue),
            "red" => Some(Color::Red),
            "white" => Some(Color::White),
            "brown" => Some(Color::Brown),
            _ => None,
        }
    }
}

impl Topping {
    pub fn as_str(&self) -> &'static str {
        match self {
            Topping::Cream => "Cream",
            Topping::Cherries => "Cherries",
            Topping::Roses => "Roses",
            Topping::Shells => "Shells",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_lowercase().as_str() {
            "cream" => Some(Topping::Cream),
            "cherries" | "cherry" => Some(Topping::Cherries),
            "roses" | "rose" => Some(Topping::Roses),
            "shells" | "shell" => Some(Topping::Shells),
            _ => None,
        }
    }
}

impl Candle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Candle::Yes => "Yes",
            Candle::No => "No",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_lowercase().as_str() {
            "yes" => Some(Candle::Yes),
            "no" => Some(Candle::No),
            _ => None,
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(Shape, Color, Topping, Candle);

/// Lookup key of the cake card table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CakeKey {
    pub shape: Shape,
    pub color: Color,
    pub topping: Topping,
    pub candle: Candle,
}

impl CakeKey {
    pub fn new(shape: Shape, color: Color, topping: Topping, candle: Candle) -> Self {
        Self { shape, color, topping, candle }
    }

    /// Asset name, e.g. `round-yellow-cream-candle`
    pub fn asset_name(&self) -> String {
        let candle = match self.candle {
            Candle::Yes => "candle",
            Candle::No => "no-candle",
        };
        format!(
            "{}-{}-{}-{}",
            self.shape.as_str().to_lowercase(),
            self.color.as_str().to_lowercase(),
            self.topping.as_str().to_lowercase(),
            candle
        )
    }

    pub fn describe(&self) -> String {
        let candle = match self.candle {
            Candle::Yes => "with a candle",
            Candle::No => "without a candle",
        };
        format!(
            "{} {} cake with {} {}",
            self.shape,
            self.color.as_str().to_lowercase(),
            self.topping.as_str().to_lowercase(),
            candle
        )
    }
}

/// The attributes a conversation has chosen so far
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CakeSelection {
    pub shape: Option<Shape>,
    pub color: Option<Color>,
    pub topping: Option<Topping>,
    pub candle: Option<Candle>,
}

impl CakeSelection {
    pub fn is_empty(&self) -> bool {
        self.shape.is_none() && self.color.is_none() && self.topping.is_none() && self.candle.is_none()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Complete key, once all four fields are set
    pub fn key(&self) -> Option<CakeKey> {
        Some(CakeKey {
            shape: self.shape?,
            color: self.color?,
            topping: self.topping?,
            candle: self.candle?,
        })
    }
}
