//! An ordered map backed by a probabilistic skip list.
//!
//! ```
//! use ordered_skiplist::SkipListMap;
//!
//! let mut map: SkipListMap<u32, &str> = SkipListMap::new();
//! map.insert(2, "b");
//! map.insert(1, "a");
//! assert_eq!(map.at(&1), Ok(&"a"));
//! assert_eq!(map.to_string(), "[1: a, 2: b]");
//! ```
//!
//! Nodes are stored in an [`Allocator`] and linked by index in both
//! directions at every level they take part in. Key order comes from a
//! [`Comparator`]; node heights come from a [`HeightControl`].

pub mod alloc;
pub mod compare;
pub mod config;
pub mod cursor;
pub mod error;
pub mod height_control;
pub mod iter;
pub mod level;
pub mod map;
pub mod node;
mod search;

pub use crate::alloc::Allocator;
pub use crate::compare::{Ascending, Comparator, Descending, EpsilonEq};
pub use crate::config::{Config, DEFAULT_MAX_LEVEL, DEFAULT_PROBABILITY};
pub use crate::cursor::{Cursor, CursorMut};
pub use crate::error::{Error, Result};
pub use crate::height_control::{GeometricalGenerator, HeightControl};
pub use crate::iter::{IntoIter, Iter, IterMut, Keys, Values, ValuesMut};
pub use crate::level::Level;
pub use crate::map::{Position, SkipListMap};
pub use crate::node::{Node, NodeId};
