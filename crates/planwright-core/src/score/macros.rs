//! Declarative macro generating the level-based score types.
//!
//! The fixed-level scores are lists of `i64` levels compared
//! lexicographically, so the struct, arithmetic, ordering and
//! slash-separated parsing are all generated from one level list. Operator
//! arithmetic saturates; the engine sums with the checked methods.

/// Defines a score type from its ordered level list.
///
/// Each level names a field, the suffix used by its string form, and its
/// [`ScoreLevel`](super::ScoreLevel) label.
///
/// # Usage
/// ```ignore
/// define_score!(
///     /// Two-level score.
///     HardSoftScore { hard => "hard": Hard, soft => "soft": Soft }
/// );
/// ```
macro_rules! define_score {
    (
        $(#[$meta:meta])*
        $type:ident { $($field:ident => $suffix:literal : $level:ident),+ }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $type {
            $($field: i64),+
        }

        impl $type {
            /// The zero score.
            pub const ZERO: $type = $type { $($field: 0),+ };

            /// Creates a score from its levels, highest priority first.
            #[inline]
            pub const fn of($($field: i64),+) -> Self {
                $type { $($field),+ }
            }

            $(
                #[inline]
                pub const fn $field(&self) -> i64 {
                    self.$field
                }
            )+

            fn levels(&self) -> Vec<i64> {
                vec![$(self.$field),+]
            }
        }

        impl $crate::score::Score for $type {
            #[inline]
            fn is_feasible(&self) -> bool {
                self.levels()[0] >= 0
            }

            #[inline]
            fn zero() -> Self {
                $type::ZERO
            }

            #[inline]
            fn levels_count() -> usize {
                [$(stringify!($field)),+].len()
            }

            fn to_level_numbers(&self) -> Vec<i64> {
                self.levels()
            }

            fn from_level_numbers(levels: &[i64]) -> Self {
                assert_eq!(
                    levels.len(),
                    <$type as $crate::score::Score>::levels_count(),
                    "{} requires exactly {} levels",
                    stringify!($type),
                    <$type as $crate::score::Score>::levels_count()
                );
                let mut it = levels.iter().copied();
                $type { $($field: it.next().unwrap_or(0)),+ }
            }

            fn checked_multiply(&self, factor: i64) -> Option<Self> {
                Some($type { $($field: self.$field.checked_mul(factor)?),+ })
            }

            fn checked_add(&self, other: &Self) -> Option<Self> {
                Some($type { $($field: self.$field.checked_add(other.$field)?),+ })
            }

            fn abs(&self) -> Self {
                $type { $($field: self.$field.saturating_abs()),+ }
            }

            fn level_label(index: usize) -> $crate::score::ScoreLevel {
                [$($crate::score::ScoreLevel::$level),+][index]
            }
        }

        impl Ord for $type {
            fn cmp(&self, other: &Self) -> std::cmp::Ordering {
                self.levels().cmp(&other.levels())
            }
        }

        impl PartialOrd for $type {
            fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
                Some(self.cmp(other))
            }
        }

        impl std::ops::Add for $type {
            type Output = Self;

            fn add(self, other: Self) -> Self {
                $type { $($field: self.$field.saturating_add(other.$field)),+ }
            }
        }

        impl std::ops::Sub for $type {
            type Output = Self;

            fn sub(self, other: Self) -> Self {
                $type { $($field: self.$field.saturating_sub(other.$field)),+ }
            }
        }

        impl std::ops::Neg for $type {
            type Output = Self;

            fn neg(self) -> Self {
                $type { $($field: self.$field.saturating_neg()),+ }
            }
        }

        impl std::fmt::Debug for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let levels: Vec<String> = self.levels().iter().map(|l| l.to_string()).collect();
                write!(f, "{}({})", stringify!($type), levels.join(", "))
            }
        }

        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&$crate::score::ParseableScore::to_string_repr(self))
            }
        }

        impl $crate::score::ParseableScore for $type {
            fn parse(s: &str) -> Result<Self, $crate::score::ScoreParseError> {
                let s = s.trim();
                let parts: Vec<&str> = s.split('/').collect();
                let suffixes: &[&str] = &[$($suffix),+];

                if parts.len() != suffixes.len() {
                    return Err($crate::score::ScoreParseError {
                        message: format!(
                            "Invalid {} format '{}': expected {} parts separated by '/'",
                            stringify!($type),
                            s,
                            suffixes.len()
                        ),
                    });
                }

                let mut parts = parts.into_iter();
                $(
                    let $field = {
                        let part = parts.next().unwrap_or_default().trim();
                        let digits = part.strip_suffix($suffix).ok_or_else(|| {
                            $crate::score::ScoreParseError {
                                message: format!(
                                    "{} part '{}' must end with '{}'",
                                    stringify!($field),
                                    part,
                                    $suffix
                                ),
                            }
                        })?;
                        digits.parse::<i64>().map_err(|e| $crate::score::ScoreParseError {
                            message: format!(
                                "Invalid {} level '{}': {}",
                                stringify!($field),
                                digits,
                                e
                            ),
                        })?
                    };
                )+

                Ok($type { $($field),+ })
            }

            fn to_string_repr(&self) -> String {
                let parts: Vec<String> = vec![$(format!("{}{}", self.$field, $suffix)),+];
                parts.join("/")
            }
        }

    };
}
