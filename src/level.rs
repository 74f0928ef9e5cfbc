use crate::error::{Error, Result};

use std::cmp::Ordering;
use std::convert::TryFrom;
use std::fmt;

/// An integer bounded to `0..=MAX`.
///
/// Every operation that would take the value outside of that range fails with
/// `Error::LevelOutOfBounds` instead of wrapping or saturating. The map uses it
/// to track its current height, and the configuration layer uses it to
/// validate user supplied maximum levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Level<const MAX: usize>(usize);

impl<const MAX: usize> Level<MAX> {
    pub const ZERO: Level<MAX> = Level(0);
    pub const TOP: Level<MAX> = Level(MAX);

    pub fn new(value: usize) -> Result<Self> {
        if value > MAX {
            return Err(Self::out_of_bounds());
        }

        Ok(Level(value))
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0
    }

    pub fn increment(&mut self) -> Result<()> {
        *self = self.checked_add(1usize)?;
        Ok(())
    }

    pub fn decrement(&mut self) -> Result<()> {
        *self = self.checked_sub(1usize)?;
        Ok(())
    }

    pub fn checked_add<T: Into<usize>>(self, rhs: T) -> Result<Self> {
        self.0
            .checked_add(rhs.into())
            .ok_or_else(Self::out_of_bounds)
            .and_then(Self::new)
    }

    pub fn checked_sub<T: Into<usize>>(self, rhs: T) -> Result<Self> {
        self.0
            .checked_sub(rhs.into())
            .ok_or_else(Self::out_of_bounds)
            .and_then(Self::new)
    }

    fn out_of_bounds() -> Error {
        Error::LevelOutOfBounds { max: MAX }
    }
}

impl<const MAX: usize> From<Level<MAX>> for usize {
    fn from(level: Level<MAX>) -> usize {
        level.0
    }
}

impl<const MAX: usize> TryFrom<usize> for Level<MAX> {
    type Error = Error;

    fn try_from(value: usize) -> Result<Self> {
        Level::new(value)
    }
}

impl<const MAX: usize> PartialEq<usize> for Level<MAX> {
    fn eq(&self, other: &usize) -> bool {
        self.0 == *other
    }
}

impl<const MAX: usize> PartialOrd<usize> for Level<MAX> {
    fn partial_cmp(&self, other: &usize) -> Option<Ordering> {
        self.0.partial_cmp(other)
    }
}

impl<const MAX: usize> fmt::Display for Level<MAX> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
