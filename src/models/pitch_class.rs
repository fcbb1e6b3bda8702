//! Pitch-class representation and interval arithmetic
//!
//! A pitch class carries four mutually derivable numeric representations
//! (reduced fraction, cents, decimal ratio, string length). Exactly one of
//! them is the authored "original" representation; the other three are always
//! derived through the closed-form conversions on [`PitchValue`].

use num_rational::Rational64;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest denominator considered by the continued-fraction approximation
/// when deriving a fraction from an irrational ratio.
const MAX_FRACTION_DENOMINATOR: i64 = 10_000;

/// Which of the four numeric representations a value was authored in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PitchValueKind {
    /// Reduced integer fraction, e.g. `9/8`
    Fraction,
    /// Cents above the tonic, e.g. `203.91`
    Cents,
    /// Decimal frequency ratio in `[1.0, 2.0]`, e.g. `1.125`
    DecimalRatio,
    /// Sounding string length, descending as pitch rises
    StringLength,
}

impl PitchValueKind {
    /// Ratio-kinded lattices demand exact fraction matching; the cents
    /// tolerance only applies to the other two representations.
    pub fn is_ratio_based(&self) -> bool {
        matches!(self, PitchValueKind::Fraction | PitchValueKind::DecimalRatio)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PitchValueKind::Fraction => "fraction",
            PitchValueKind::Cents => "cents",
            PitchValueKind::DecimalRatio => "decimalRatio",
            PitchValueKind::StringLength => "stringLength",
        }
    }
}

impl fmt::Display for PitchValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One authored pitch value in a single representation
///
/// This is the closed sum type over the four representations: each variant
/// carries its representation-specific payload, so a conversion formula can
/// never be applied to the wrong representation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PitchValue {
    Fraction(Rational64),
    Cents(f64),
    DecimalRatio(f64),
    StringLength(f64),
}

impl PitchValue {
    pub fn kind(&self) -> PitchValueKind {
        match self {
            PitchValue::Fraction(_) => PitchValueKind::Fraction,
            PitchValue::Cents(_) => PitchValueKind::Cents,
            PitchValue::DecimalRatio(_) => PitchValueKind::DecimalRatio,
            PitchValue::StringLength(_) => PitchValueKind::StringLength,
        }
    }

    /// Parse a raw catalog string as the given representation
    pub fn parse(raw: &str, kind: PitchValueKind) -> Option<PitchValue> {
        let raw = raw.trim();
        match kind {
            PitchValueKind::Fraction => {
                let (num, den) = raw.split_once('/')?;
                let num: i64 = num.trim().parse().ok()?;
                let den: i64 = den.trim().parse().ok()?;
                if den == 0 {
                    return None;
                }
                Some(PitchValue::Fraction(Rational64::new(num, den)))
            }
            PitchValueKind::Cents => raw.parse().ok().map(PitchValue::Cents),
            PitchValueKind::DecimalRatio => raw.parse().ok().map(PitchValue::DecimalRatio),
            PitchValueKind::StringLength => raw.parse().ok().map(PitchValue::StringLength),
        }
    }

    /// Decimal frequency ratio relative to the tonic.
    ///
    /// String lengths scale reciprocally: a string stopped at half the open
    /// length sounds the octave.
    pub fn decimal_ratio(&self, open_string_length: f64) -> f64 {
        match self {
            PitchValue::Fraction(r) => *r.numer() as f64 / *r.denom() as f64,
            PitchValue::Cents(c) => (c / 1200.0).exp2(),
            PitchValue::DecimalRatio(d) => *d,
            PitchValue::StringLength(l) => open_string_length / l,
        }
    }

    /// Cents above the tonic
    pub fn cents(&self, open_string_length: f64) -> f64 {
        match self {
            PitchValue::Cents(c) => *c,
            other => 1200.0 * other.decimal_ratio(open_string_length).log2(),
        }
    }

    /// Reduced fraction form. Exact for `Fraction`, best rational
    /// approximation (continued fractions) for the other representations.
    pub fn fraction(&self, open_string_length: f64) -> Rational64 {
        match self {
            PitchValue::Fraction(r) => r.reduced(),
            other => approximate_fraction(other.decimal_ratio(open_string_length)),
        }
    }

    /// Sounding string length for this value
    pub fn string_length(&self, open_string_length: f64) -> f64 {
        match self {
            PitchValue::StringLength(l) => *l,
            other => open_string_length / other.decimal_ratio(open_string_length),
        }
    }

    /// Render in the authored form (how the value would appear in a catalog)
    pub fn format(&self) -> String {
        match self {
            PitchValue::Fraction(r) => format!("{}/{}", r.numer(), r.denom()),
            PitchValue::Cents(c) => format!("{c}"),
            PitchValue::DecimalRatio(d) => format!("{d}"),
            PitchValue::StringLength(l) => format!("{l}"),
        }
    }
}

/// Best rational approximation of `x` by continued-fraction expansion,
/// bounded by [`MAX_FRACTION_DENOMINATOR`].
pub fn approximate_fraction(x: f64) -> Rational64 {
    if !x.is_finite() || x <= 0.0 {
        return Rational64::new(1, 1);
    }

    let mut remainder = x;
    let (mut num0, mut den0): (i64, i64) = (1, 0);
    let (mut num1, mut den1): (i64, i64) = (remainder.floor() as i64, 1);

    for _ in 0..64 {
        let frac = remainder - remainder.floor();
        if frac.abs() < 1e-12 {
            break;
        }
        remainder = 1.0 / frac;
        let term = remainder.floor() as i64;

        let num2 = term.saturating_mul(num1).saturating_add(num0);
        let den2 = term.saturating_mul(den1).saturating_add(den0);
        if den2 > MAX_FRACTION_DENOMINATOR {
            break;
        }

        num0 = num1;
        den0 = den1;
        num1 = num2;
        den1 = den2;
    }

    Rational64::new(num1.max(1), den1.max(1))
}

/// One concrete sounding pitch in a lattice
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PitchClass {
    /// Cultural note-name identifier, or `"none"` for unmapped positions
    pub note_name: String,

    /// Reduced fraction relative to the open string
    pub fraction: Rational64,

    /// Cents above the open string
    pub cents: f64,

    /// Decimal frequency ratio relative to the open string
    pub decimal_ratio: f64,

    /// Sounding string length
    pub string_length: f64,

    /// Frequency in Hz
    pub frequency: f64,

    /// Fret-division offset: open-string length minus this string length
    pub fret_division: f64,

    /// MIDI note number derived from the frequency
    pub midi_note: i32,

    /// Abjad (alphabetic) name; populated only in octave bands 1 and 2
    pub abjad_name: String,

    /// Octave band, 0..=3 (band 1 is the authored reference octave)
    pub octave: u8,

    /// Position within the octave band
    pub index: usize,

    /// The raw authored value string
    pub original_value: String,

    /// Which representation the value was authored in
    pub original_value_type: PitchValueKind,
}

impl PitchClass {
    /// Same pitch shifted by `n` octaves: frequency x2^n, cents +1200n,
    /// string length /2^n, MIDI +12n. The octave band index moves with it;
    /// note/abjad names are the octave-appropriate assignment of the caller.
    pub fn octave_shifted(&self, n: i32) -> PitchClass {
        let factor = (n as f64).exp2();
        let two_pow = Rational64::new(2, 1);
        let fraction = if n >= 0 {
            (0..n).fold(self.fraction, |acc, _| acc * two_pow)
        } else {
            (0..-n).fold(self.fraction, |acc, _| acc / two_pow)
        };

        PitchClass {
            note_name: self.note_name.clone(),
            fraction,
            cents: self.cents + 1200.0 * n as f64,
            decimal_ratio: self.decimal_ratio * factor,
            string_length: self.string_length / factor,
            frequency: self.frequency * factor,
            fret_division: self.fret_division,
            midi_note: self.midi_note + 12 * n,
            abjad_name: self.abjad_name.clone(),
            octave: (self.octave as i32 + n).clamp(0, 3) as u8,
            index: self.index,
            original_value: self.original_value.clone(),
            original_value_type: self.original_value_type,
        }
    }

    /// Global position of this pitch in its lattice
    pub fn lattice_index(&self, pitches_per_octave: usize) -> usize {
        self.octave as usize * pitches_per_octave + self.index
    }

    /// Same lattice slot (octave band and position)
    pub fn same_slot(&self, other: &PitchClass) -> bool {
        self.octave == other.octave && self.index == other.index
    }
}

/// The directed relationship between two pitch classes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PitchClassInterval {
    /// Frequency ratio `to / from` as a reduced fraction
    pub fraction: Rational64,

    /// Signed cents delta
    pub cents: f64,

    /// Decimal-ratio quotient `to / from`
    pub decimal_ratio: f64,

    /// Signed string-length delta
    pub string_length: f64,

    /// Signed fret-division delta
    pub fret_division: f64,

    /// Representation type of the endpoints
    pub original_value_type: PitchValueKind,
}

impl PitchClassInterval {
    /// Interval from `from` to `to`. Ascending intervals have positive cents
    /// and a fraction greater than one; descending intervals the opposite.
    pub fn between(from: &PitchClass, to: &PitchClass) -> PitchClassInterval {
        PitchClassInterval {
            fraction: (to.fraction / from.fraction).reduced(),
            cents: to.cents - from.cents,
            decimal_ratio: to.decimal_ratio / from.decimal_ratio,
            string_length: to.string_length - from.string_length,
            fret_division: to.fret_division - from.fret_division,
            original_value_type: from.original_value_type,
        }
    }

    /// Unsigned cents size of the interval
    pub fn cents_abs(&self) -> f64 {
        self.cents.abs()
    }

    /// The same interval in the opposite direction
    pub fn inverted(&self) -> PitchClassInterval {
        PitchClassInterval {
            fraction: Rational64::new(*self.fraction.denom(), *self.fraction.numer()),
            cents: -self.cents,
            decimal_ratio: 1.0 / self.decimal_ratio,
            string_length: -self.string_length,
            fret_division: -self.fret_division,
            original_value_type: self.original_value_type,
        }
    }
}
