/// A league score, always a whole multiple of half a point.
///
/// Stored as a count of half-points so that long replays never accumulate
/// rounding error. On the wire it is a plain JSON number (`-0.5`, `3`, ...).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Points(i64);

impl Points {
    pub const ZERO: Self = Self(0);
    pub const HALF: Self = Self(1);
    pub const ONE: Self = Self(2);

    pub const fn from_halves(halves: i64) -> Self {
        Self(halves)
    }

    pub const fn halves(self) -> i64 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 2.0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }
}

impl core::ops::Add for Points {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl core::ops::AddAssign for Points {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl core::ops::Sub for Points {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl core::ops::SubAssign for Points {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl core::ops::Neg for Points {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl core::fmt::Display for Points {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.0 % 2 == 0 {
            write!(f, "{}", self.0 / 2)
        } else {
            write!(f, "{}", self.as_f64())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotHalfPoints(pub String);

impl core::fmt::Display for NotHalfPoints {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} is not a multiple of 0.5", self.0)
    }
}

impl TryFrom<f64> for Points {
    type Error = NotHalfPoints;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        let halves = value * 2.0;
        if !halves.is_finite() || halves.fract() != 0.0 {
            return Err(NotHalfPoints(value.to_string()));
        }

        Ok(Self(halves as i64))
    }
}

impl serde::Serialize for Points {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        if self.0 % 2 == 0 {
            serializer.serialize_i64(self.0 / 2)
        } else {
            serializer.serialize_f64(self.as_f64())
        }
    }
}

impl<'de> serde::Deserialize<'de> for Points {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = f64::deserialize(deserializer)?;
        Points::try_from(raw).map_err(serde::de::Error::custom)
    }
}
