//! Per-request placeholder expansion.
//!
//! # Responsibilities
//! - Expand `{name}` placeholders in templates
//! - Ask providers for values on demand, in registration order
//! - Bound nested expansion, both in depth and in total lookups
//!
//! # Design Decisions
//! - Static values are consulted before registered providers
//! - Unknown placeholders expand to the empty string
//! - `\{` and `\}` are literal braces; an unterminated `{` is literal text
//! - Nothing is cached: every reference asks the providers again

use std::cell::Cell;
use std::collections::HashMap;
use std::sync::Arc;

/// Maximum nesting of expansions triggered from inside a provider.
pub const MAX_DEPTH: usize = 16;

/// Maximum provider lookups for one top-level `get` or `replace_all`.
///
/// Depth alone does not bound the work: a value that references itself twice
/// doubles the lookups at every level.
pub const MAX_LOOKUPS: usize = 1024;

/// Answer of a provider for a single placeholder name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// The name belongs to someone else.
    Unhandled,
    /// The name is recognized; the value may be missing.
    Handled(Option<String>),
}

impl Lookup {
    pub fn is_handled(&self) -> bool {
        matches!(self, Self::Handled(_))
    }

    /// Collapse to the value, treating unhandled and empty alike.
    pub fn into_value(self) -> Option<String> {
        match self {
            Self::Unhandled => None,
            Self::Handled(v) => v,
        }
    }
}

/// A lazily queried source of placeholder values.
pub trait Provider: Send + Sync {
    /// Resolve `key`, using `eval` for any nested expansion.
    fn lookup(&self, key: &str, eval: &Evaluator<'_>) -> Lookup;
}

impl<F> Provider for F
where
    F: Fn(&str, &Evaluator<'_>) -> Lookup + Send + Sync,
{
    fn lookup(&self, key: &str, eval: &Evaluator<'_>) -> Lookup {
        self(key, eval)
    }
}

/// Provider lookups left for one top-level expansion.
struct Budget {
    remaining: Cell<usize>,
    exhausted: Cell<bool>,
}

impl Budget {
    fn new() -> Self {
        Self {
            remaining: Cell::new(MAX_LOOKUPS),
            exhausted: Cell::new(false),
        }
    }

    /// Spend one lookup on `key`. Warns once when the budget runs out.
    fn take(&self, key: &str) -> bool {
        match self.remaining.get() {
            0 => {
                if !self.exhausted.replace(true) {
                    tracing::warn!(
                        placeholder = %key,
                        limit = MAX_LOOKUPS,
                        "Placeholder lookup budget exhausted, yielding empty values"
                    );
                }
                false
            }
            n => {
                self.remaining.set(n - 1);
                true
            }
        }
    }
}

/// Handle given to providers for expanding expressions against the same request.
pub struct Evaluator<'a> {
    replacer: &'a Replacer,
    depth: usize,
    budget: &'a Budget,
}

impl Evaluator<'_> {
    /// Expand every placeholder in `input`.
    pub fn replace_all(&self, input: &str) -> String {
        self.replacer.expand(input, self.depth + 1, self.budget)
    }
}

/// Placeholder expander for one request.
#[derive(Default, Clone)]
pub struct Replacer {
    statics: HashMap<String, String>,
    providers: Vec<Arc<dyn Provider>>,
}

impl std::fmt::Debug for Replacer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Replacer")
            .field("statics", &self.statics)
            .field("providers", &self.providers.len())
            .finish()
    }
}

impl Replacer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a static value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.statics.insert(key.into(), value.into());
    }

    /// Register a provider after the ones already present.
    pub fn map(&mut self, provider: Arc<dyn Provider>) {
        self.providers.push(provider);
    }

    /// Look up one placeholder name.
    pub fn get(&self, key: &str) -> Lookup {
        self.get_at(key, 0, &Budget::new())
    }

    /// Expand every placeholder in `input`.
    pub fn replace_all(&self, input: &str) -> String {
        self.expand(input, 0, &Budget::new())
    }

    fn get_at(&self, key: &str, depth: usize, budget: &Budget) -> Lookup {
        if let Some(value) = self.statics.get(key) {
            return Lookup::Handled(Some(value.clone()));
        }
        if !budget.take(key) {
            return Lookup::Unhandled;
        }
        let eval = Evaluator {
            replacer: self,
            depth,
            budget,
        };
        self.providers
            .iter()
            .map(|p| p.lookup(key, &eval))
            .find(Lookup::is_handled)
            .unwrap_or(Lookup::Unhandled)
    }

    fn expand(&self, input: &str, depth: usize, budget: &Budget) -> String {
        if depth > MAX_DEPTH {
            tracing::warn!(
                template = %input,
                "Placeholder expansion too deep, yielding empty value"
            );
            return String::new();
        }
        if !input.contains(['{', '\\']) {
            return input.to_string();
        }

        let mut out = String::with_capacity(input.len());
        let mut rest = input;
        while let Some(pos) = rest.find(['{', '\\']) {
            out.push_str(&rest[..pos]);
            let tail = &rest[pos..];

            if let Some(escaped) = tail.strip_prefix('\\') {
                match escaped.chars().next() {
                    Some(c @ ('{' | '}')) => {
                        out.push(c);
                        rest = &escaped[1..];
                    }
                    _ => {
                        out.push('\\');
                        rest = escaped;
                    }
                }
                continue;
            }

            match tail.find('}') {
                Some(end) => {
                    let key = &tail[1..end];
                    if let Some(value) = self.get_at(key, depth, budget).into_value() {
                        out.push_str(&value);
                    }
                    rest = &tail[end + 1..];
                }
                None => {
                    out.push_str(tail);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        out
    }
}
