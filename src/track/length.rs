//! Track length specifications: absolute, proportional ("star"), content ("auto").

use std::fmt;
use std::str::FromStr;

use crate::error::{GridError, Result};

use super::tokenizer::{tokenize, Token};

/// How a track obtains its length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GridLength {
    /// A fixed length in layout units.
    Absolute(f64),
    /// A weighted share of the space left after absolute and content tracks.
    Proportional(f64),
    /// Sized to the content occupying the track.
    Content,
}

/// A length plus its min/max bounds, e.g. `Auto; min: 20; max: 200`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackSpec {
    pub length: GridLength,
    pub min: f64,
    pub max: f64,
}

impl TrackSpec {
    /// A fixed-length track.
    pub fn absolute(value: f64) -> Self {
        Self::unbounded(GridLength::Absolute(value))
    }

    /// A proportional track with the given weight.
    pub fn star(weight: f64) -> Self {
        Self::unbounded(GridLength::Proportional(weight))
    }

    /// A content-sized track.
    pub fn auto() -> Self {
        Self::unbounded(GridLength::Content)
    }

    fn unbounded(length: GridLength) -> Self {
        Self {
            length,
            min: 0.0,
            max: f64::INFINITY,
        }
    }

    /// Set the minimum length (builder).
    pub fn with_min(mut self, min: f64) -> Self {
        self.min = min;
        self
    }

    /// Set the maximum length (builder).
    pub fn with_max(mut self, max: f64) -> Self {
        self.max = max;
        self
    }

    /// Parse a length token string such as `"20"`, `"*"`, `"2*"` or `"Auto; min: 10"`.
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = |message: String| GridError::InvalidLength {
            input: input.to_owned(),
            message,
        };

        let tokens = tokenize(input)?;
        let mut iter = tokens.into_iter().peekable();

        let length = match iter.next() {
            Some((Token::Number, text)) => {
                let value = parse_number(input, text)?;
                if matches!(iter.peek(), Some((Token::Star, _))) {
                    iter.next();
                    GridLength::Proportional(value)
                } else {
                    GridLength::Absolute(value)
                }
            }
            Some((Token::Star, _)) => GridLength::Proportional(1.0),
            Some((Token::Ident, text)) if text.eq_ignore_ascii_case("auto") => GridLength::Content,
            Some((_, text)) => return Err(invalid(format!("unexpected `{text}`"))),
            None => return Err(invalid("empty length".into())),
        };

        let mut spec = Self::unbounded(length);
        let (mut seen_min, mut seen_max) = (false, false);

        while let Some((token, text)) = iter.next() {
            if token != Token::Semicolon {
                return Err(invalid(format!("unexpected `{text}`")));
            }
            let key = match iter.next() {
                Some((Token::Ident, key)) => key,
                Some((_, other)) => return Err(invalid(format!("expected `min` or `max`, got `{other}`"))),
                None => return Err(invalid("expected `min` or `max` after `;`".into())),
            };
            if !matches!(iter.next(), Some((Token::Colon, _))) {
                return Err(invalid(format!("expected `:` after `{key}`")));
            }
            let value = match iter.next() {
                Some((Token::Number, text)) => parse_number(input, text)?,
                _ => return Err(invalid(format!("expected a number for `{key}`"))),
            };
            match key.to_ascii_lowercase().as_str() {
                "min" if !seen_min => {
                    seen_min = true;
                    spec.min = value;
                }
                "max" if !seen_max => {
                    seen_max = true;
                    spec.max = value;
                }
                "min" | "max" => return Err(invalid(format!("duplicate `{key}`"))),
                other => return Err(invalid(format!("unknown bound `{other}`"))),
            }
        }

        spec.validate()?;
        Ok(spec)
    }

    /// Check the length value and bounds.
    pub fn validate(&self) -> Result<()> {
        if !(self.min >= 0.0 && self.min.is_finite() && self.max >= self.min) {
            return Err(GridError::UnsatisfiableBounds {
                min: self.min,
                max: self.max,
            });
        }
        let message = match self.length {
            GridLength::Absolute(v) if !(v >= 0.0 && v.is_finite()) => "length must be a non-negative number",
            GridLength::Proportional(w) if !(w > 0.0 && w.is_finite()) => "proportional weight must be positive",
            _ => return Ok(()),
        };
        Err(GridError::InvalidLength {
            input: self.to_string(),
            message: message.into(),
        })
    }

    /// Clamp `value` into `[min, max]`.
    #[inline]
    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }

    /// The resolved length of an absolute track, clamped to its bounds.
    pub fn fixed_length(&self) -> Option<f64> {
        match self.length {
            GridLength::Absolute(v) => Some(self.clamp(v)),
            _ => None,
        }
    }

    /// The weight of a proportional track.
    pub fn weight(&self) -> Option<f64> {
        match self.length {
            GridLength::Proportional(w) => Some(w),
            _ => None,
        }
    }

    pub fn is_absolute(&self) -> bool {
        matches!(self.length, GridLength::Absolute(_))
    }

    pub fn is_proportional(&self) -> bool {
        matches!(self.length, GridLength::Proportional(_))
    }

    pub fn is_content(&self) -> bool {
        self.length == GridLength::Content
    }
}

fn parse_number(input: &str, text: &str) -> Result<f64> {
    text.parse::<f64>().map_err(|e| GridError::InvalidLength {
        input: input.to_owned(),
        message: format!("bad number `{text}`: {e}"),
    })
}

impl FromStr for TrackSpec {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for GridLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            GridLength::Absolute(v) => write!(f, "{v}"),
            GridLength::Proportional(w) if w == 1.0 => write!(f, "*"),
            GridLength::Proportional(w) => write!(f, "{w}*"),
            GridLength::Content => write!(f, "Auto"),
        }
    }
}

impl fmt::Display for TrackSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.length)?;
        if self.min != 0.0 {
            write!(f, "; min: {}", self.min)?;
        }
        if self.max.is_finite() {
            write!(f, "; max: {}", self.max)?;
        }
        Ok(())
    }
}
