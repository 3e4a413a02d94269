//! Command name to handler table, plus the shared arity checks.

use std::collections::BTreeMap;

use super::{GtpError, Response};

/// A command handler operating on the engine `T`.
pub type Handler<T> = fn(&mut T, &[&str]) -> Result<Response, GtpError>;

pub struct CommandRegistry<T> {
    handlers: BTreeMap<&'static str, Handler<T>>,
}

impl<T> Default for CommandRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> CommandRegistry<T> {
    #[must_use]
    pub fn new() -> Self {
        CommandRegistry {
            handlers: BTreeMap::new(),
        }
    }

    /// Register `handler` under `name`.
    ///
    /// # Panics
    /// If `name` is already registered.
    pub fn register(&mut self, name: &'static str, handler: Handler<T>) {
        let previous = self.handlers.insert(name, handler);
        assert!(previous.is_none(), "command {name:?} registered twice");
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Handler<T>> {
        self.handlers.get(name).copied()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered names in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.handlers.keys().copied().collect()
    }
}

/// Look up `name` in `registry` and run it against `target`.
///
/// Never fails: unknown names and handler errors become `?` responses.
pub fn dispatch<T>(
    registry: &CommandRegistry<T>,
    target: &mut T,
    name: &str,
    args: &[&str],
) -> Response {
    match registry.get(name) {
        Some(handler) => handler(target, args).unwrap_or_else(Response::from),
        None => GtpError::UnknownCommand.into(),
    }
}

/// Fails unless exactly `expected` arguments were given.
pub fn check_exact(expected: usize, args: &[&str]) -> Result<(), GtpError> {
    if args.len() != expected {
        return Err(GtpError::ArgCount {
            min: expected,
            max: expected,
            got: args.len(),
            args: args.join(" "),
        });
    }
    Ok(())
}

/// Fails unless between `min` and `max` arguments (inclusive) were given.
pub fn check_range(min: usize, max: usize, args: &[&str]) -> Result<(), GtpError> {
    if args.len() < min || args.len() > max {
        return Err(GtpError::ArgCount {
            min,
            max,
            got: args.len(),
            args: args.join(" "),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Default)]
    struct Counter {
        calls: usize,
    }

    fn bump(counter: &mut Counter, args: &[&str]) -> Result<Response, GtpError> {
        check_exact(0, args)?;
        counter.calls += 1;
        Ok(Response::ok_with(counter.calls.to_string()))
    }

    fn fail(_: &mut Counter, _: &[&str]) -> Result<Response, GtpError> {
        Err(GtpError::IllegalState("cannot undo".to_string()))
    }

    fn registry() -> CommandRegistry<Counter> {
        let mut registry = CommandRegistry::new();
        registry.register("zeta", bump);
        registry.register("alpha", fail);
        registry
    }

    #[test]
    fn test_dispatch_known_and_unknown() {
        let registry = registry();
        let mut counter = Counter::default();

        assert_eq!(dispatch(&registry, &mut counter, "zeta", &[]), Response::ok_with("1"));
        assert_eq!(
            dispatch(&registry, &mut counter, "nope", &[]),
            Response::error("unknown command")
        );
        assert_eq!(
            dispatch(&registry, &mut counter, "", &[]),
            Response::error("unknown command")
        );
        assert_eq!(counter.calls, 1);
    }

    #[test]
    fn test_handler_errors_become_failures() {
        let registry = registry();
        let mut counter = Counter::default();
        assert_eq!(
            dispatch(&registry, &mut counter, "alpha", &[]),
            Response::error("cannot undo")
        );
        let response = dispatch(&registry, &mut counter, "zeta", &["x"]);
        assert_eq!(response.text, "expected 0 args, got 1 args: x");
    }

    #[test]
    fn test_names_sorted() {
        let registry = registry();
        assert_eq!(registry.names(), vec!["alpha", "zeta"]);
        assert!(registry.contains("alpha"));
        assert!(!registry.contains("beta"));
    }

    #[test]
    #[should_panic(expected = "registered twice")]
    fn test_duplicate_registration_panics() {
        let mut registry = registry();
        registry.register("zeta", bump);
    }

    #[test]
    fn test_range_message() {
        let err = check_range(1, 2, &["a", "b", "c"]).unwrap_err();
        assert_eq!(err.to_string(), "expected between 1 and 2 args, got 3 args: a b c");
    }

    proptest! {
        #[test]
        fn prop_check_exact(n in 0usize..5, len in 0usize..5) {
            let args = vec!["x"; len];
            prop_assert_eq!(check_exact(n, &args).is_err(), len != n);
        }

        #[test]
        fn prop_check_range(min in 0usize..4, span in 0usize..3, len in 0usize..8) {
            let max = min + span;
            let args = vec!["x"; len];
            let result = check_range(min, max, &args);
            prop_assert_eq!(result.is_err(), len < min || len > max);
            if let Err(e) = result {
                let message = e.to_string();
                let expected = format!("got {len} args");
                prop_assert!(message.contains(&expected));
                prop_assert!(message.contains(&min.to_string()));
            }
        }
    }
}
