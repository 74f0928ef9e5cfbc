//! Key ordering used by the map.
//!
//! A [`Comparator`] is a strict weak ordering over keys. Two keys are
//! considered the same entry when neither orders before the other, unless the
//! comparator overrides [`Comparator::equivalent`].
//!
//! Closures of the form `Fn(&K, &K) -> bool` are comparators, so
//! `|a: &u32, b: &u32| b < a` sorts in descending order.

/// A strict weak ordering over `K`.
pub trait Comparator<K: ?Sized> {
    /// Returns `true` if `a` sorts strictly before `b`.
    fn less(&self, a: &K, b: &K) -> bool;

    /// Returns `true` if `a` and `b` denote the same entry.
    #[inline]
    fn equivalent(&self, a: &K, b: &K) -> bool {
        !self.less(a, b) && !self.less(b, a)
    }
}

impl<K: ?Sized, F> Comparator<K> for F
where
    F: Fn(&K, &K) -> bool,
{
    #[inline]
    fn less(&self, a: &K, b: &K) -> bool {
        self(a, b)
    }
}

/// Ascending order by `PartialOrd`. This is the default comparator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ascending;

impl<K: PartialOrd + ?Sized> Comparator<K> for Ascending {
    #[inline]
    fn less(&self, a: &K, b: &K) -> bool {
        a < b
    }
}

/// Descending order by `PartialOrd`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Descending;

impl<K: PartialOrd + ?Sized> Comparator<K> for Descending {
    #[inline]
    fn less(&self, a: &K, b: &K) -> bool {
        b < a
    }
}

/// Epsilon equality for floating point keys.
///
/// Wraps another comparator and treats two `f32`/`f64` keys as the same entry
/// when their absolute difference is below the type's machine epsilon.
/// Inserting a key that is within epsilon of a stored key updates the stored
/// entry instead of creating a new one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EpsilonEq<C = Ascending>(pub C);

macro_rules! epsilon_comparator {
    ($($float:ident),*) => {
        $(
            impl<C: Comparator<$float>> Comparator<$float> for EpsilonEq<C> {
                #[inline]
                fn less(&self, a: &$float, b: &$float) -> bool {
                    !self.equivalent(a, b) && self.0.less(a, b)
                }

                #[inline]
                fn equivalent(&self, a: &$float, b: &$float) -> bool {
                    (a - b).abs() < <$float>::EPSILON
                }
            }
        )*
    };
}

epsilon_comparator!(f32, f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascending_and_descending() {
        assert!(Ascending.less(&1, &2));
        assert!(!Ascending.less(&2, &1));
        assert!(Descending.less(&2, &1));
        assert!(!Descending.less(&1, &2));
        assert!(Ascending.equivalent(&3, &3));
        assert!(Descending.equivalent(&3, &3));
        assert!(!Descending.equivalent(&3, &4));
    }

    #[test]
    fn unsized_keys() {
        assert!(Ascending.less("abc", "abd"));
        assert!(Ascending.equivalent("abc", "abc"));
    }

    #[test]
    fn closures_are_comparators() {
        let by_length = |a: &String, b: &String| a.len() < b.len();
        assert!(by_length.less(&"a".to_string(), &"bb".to_string()));
        // Same length strings are the same entry under this ordering.
        assert!(by_length.equivalent(&"aa".to_string(), &"bb".to_string()));
    }

    #[test]
    fn epsilon_equality() {
        let cmp = EpsilonEq(Ascending);
        let a = 0.1f64 + 0.2;
        let b = 0.3f64;
        assert!(Ascending.less(&b, &a));
        assert!(cmp.equivalent(&a, &b));
        assert!(!cmp.less(&a, &b));
        assert!(!cmp.less(&b, &a));
        assert!(cmp.less(&0.1f64, &0.2f64));

        let cmp = EpsilonEq(Descending);
        assert!(cmp.less(&0.2f32, &0.1f32));
        assert!(cmp.equivalent(&1.0f32, &(1.0f32 + f32::EPSILON / 2.0)));
    }
}
