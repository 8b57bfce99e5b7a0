//! Resolves a login request to one concrete account.
//!
//! Selection works on a single [`Pool`] snapshot so the decision is
//! internally consistent, even if the snapshot is already stale relative to
//! concurrent admin writes.

use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng as _, SeedableRng};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::pool::Pool;
use super::pool_entry::PoolEntry;
use super::validation::non_blank;
use crate::error::GatewayError;

/// How the caller wants an account chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LoginMode {
    /// Use the account named by `email`.
    Specific,
    /// Pick any usable account uniformly at random.
    Random,
}

impl FromStr for LoginMode {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "specific" => Ok(Self::Specific),
            "random" => Ok(Self::Random),
            other => Err(GatewayError::InvalidInput(format!(
                "mode must be \"specific\" or \"random\", got {other:?}"
            ))),
        }
    }
}

/// A validated selection request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginTarget {
    /// A named account.
    Specific(String),
    /// Any usable account.
    Random,
}

impl LoginTarget {
    /// Combines a mode with the optional email field. Random mode ignores
    /// the email.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidInput`] if specific mode has no email.
    pub fn new(mode: LoginMode, email: Option<&str>) -> Result<Self, GatewayError> {
        match mode {
            LoginMode::Random => Ok(Self::Random),
            LoginMode::Specific => non_blank(email)
                .map(|e| Self::Specific(e.to_string()))
                .ok_or_else(|| {
                    GatewayError::InvalidInput("specific mode requires an email".into())
                }),
        }
    }
}

/// Source of uniform indices for random selection.
pub trait EntryPicker: Send + Sync + fmt::Debug {
    /// Returns an index in `0..len`. Only called with `len > 0`.
    fn pick(&self, len: usize) -> usize;
}

/// Picker backed by the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngPicker;

impl EntryPicker for ThreadRngPicker {
    fn pick(&self, len: usize) -> usize {
        rand::rng().random_range(0..len)
    }
}

/// Reproducible picker driven by a seeded [`StdRng`].
#[derive(Debug)]
pub struct SeededPicker {
    rng: Mutex<StdRng>,
}

impl SeededPicker {
    /// Creates a picker whose sequence is fixed by `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl EntryPicker for SeededPicker {
    fn pick(&self, len: usize) -> usize {
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        rng.random_range(0..len)
    }
}

/// Chooses the account for `target` from `pool`.
///
/// Only usable entries (non-empty SK) are candidates. Random mode draws
/// uniformly with no weighting and no memory of earlier picks.
///
/// # Errors
///
/// Returns [`GatewayError::NotFound`] if a specific email is absent and
/// [`GatewayError::PoolEmpty`] if random mode has no candidates.
pub fn select(
    pool: &Pool,
    target: &LoginTarget,
    picker: &dyn EntryPicker,
) -> Result<PoolEntry, GatewayError> {
    match target {
        LoginTarget::Specific(email) => pool
            .usable()
            .find(|(candidate, _)| *candidate == email.as_str())
            .map(|(email, sk)| PoolEntry {
                email: email.to_string(),
                sk: sk.to_string(),
            })
            .ok_or_else(|| GatewayError::NotFound(email.clone())),
        LoginTarget::Random => {
            let candidates: Vec<(&str, &str)> = pool.usable().collect();
            if candidates.is_empty() {
                return Err(GatewayError::PoolEmpty);
            }
            let index = picker.pick(candidates.len()) % candidates.len();
            candidates
                .get(index)
                .map(|(email, sk)| PoolEntry {
                    email: (*email).to_string(),
                    sk: (*sk).to_string(),
                })
                .ok_or(GatewayError::PoolEmpty)
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Picker replaying a fixed index sequence.
    #[derive(Debug, Default)]
    struct ScriptedPicker {
        script: Vec<usize>,
        cursor: AtomicUsize,
    }

    impl EntryPicker for ScriptedPicker {
        fn pick(&self, _len: usize) -> usize {
            let i = self.cursor.fetch_add(1, Ordering::SeqCst);
            self.script.get(i).copied().unwrap_or(0)
        }
    }

    fn pool_of(n: usize) -> Pool {
        (0..n)
            .map(|i| {
                let Ok(entry) = PoolEntry::new(&format!("u{i}@x.com"), &format!("sk{i}")) else {
                    panic!("valid entry");
                };
                entry
            })
            .collect()
    }

    #[test]
    fn mode_parses_from_text() {
        assert_eq!("random".parse::<LoginMode>(), Ok(LoginMode::Random));
        assert_eq!(" specific ".parse::<LoginMode>(), Ok(LoginMode::Specific));
        assert!(matches!(
            "sticky".parse::<LoginMode>(),
            Err(GatewayError::InvalidInput(_))
        ));
    }

    #[test]
    fn specific_mode_requires_email() {
        assert!(LoginTarget::new(LoginMode::Specific, Some(" ")).is_err());
        assert_eq!(
            LoginTarget::new(LoginMode::Random, Some("a@x.com")),
            Ok(LoginTarget::Random)
        );
    }

    #[test]
    fn specific_selection_returns_that_entry() {
        let pool = pool_of(3);
        let target = LoginTarget::Specific("u1@x.com".into());
        let Ok(entry) = select(&pool, &target, &ThreadRngPicker) else {
            panic!("entry should be found");
        };
        assert_eq!(entry.sk, "sk1");
    }

    #[test]
    fn specific_selection_of_missing_email_fails() {
        let target = LoginTarget::Specific("nobody@x.com".into());
        assert_eq!(
            select(&pool_of(2), &target, &ThreadRngPicker),
            Err(GatewayError::NotFound("nobody@x.com".into()))
        );
    }

    #[test]
    fn random_selection_on_empty_pool_fails() {
        assert_eq!(
            select(&Pool::new(), &LoginTarget::Random, &ThreadRngPicker),
            Err(GatewayError::PoolEmpty)
        );
    }

    #[test]
    fn blank_keys_are_never_selected() {
        let Ok(pool) = serde_json::from_str::<Pool>(r#"{"a@x.com":"","b@x.com":"sk-b"}"#) else {
            panic!("valid blob");
        };
        for _ in 0..20 {
            let Ok(entry) = select(&pool, &LoginTarget::Random, &ThreadRngPicker) else {
                panic!("one usable entry exists");
            };
            assert_eq!(entry.email, "b@x.com");
        }
        assert!(matches!(
            select(&pool, &LoginTarget::Specific("a@x.com".into()), &ThreadRngPicker),
            Err(GatewayError::NotFound(_))
        ));
    }

    #[test]
    fn scripted_picker_drives_choice() {
        let picker = ScriptedPicker {
            script: vec![2, 0],
            ..ScriptedPicker::default()
        };
        let pool = pool_of(3);
        let first = select(&pool, &LoginTarget::Random, &picker).map(|e| e.email);
        let second = select(&pool, &LoginTarget::Random, &picker).map(|e| e.email);
        assert_eq!(first, Ok("u2@x.com".to_string()));
        assert_eq!(second, Ok("u0@x.com".to_string()));
    }

    #[test]
    fn random_selection_is_roughly_uniform() {
        let n = 5;
        let trials = 50_000;
        let pool = pool_of(n);
        let picker = SeededPicker::new(42);

        let mut counts: HashMap<String, usize> = HashMap::new();
        for _ in 0..trials {
            let Ok(entry) = select(&pool, &LoginTarget::Random, &picker) else {
                panic!("pool is not empty");
            };
            *counts.entry(entry.email).or_default() += 1;
        }

        assert_eq!(counts.len(), n);
        let expected = trials / n;
        for (email, count) in counts {
            let deviation = count.abs_diff(expected);
            assert!(
                deviation < expected / 20,
                "{email} picked {count} times, expected about {expected}"
            );
        }
    }
}
