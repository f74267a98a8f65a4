//! Call-stack introspection behind an injectable capability.
//!
//! [`SourceDecorator`](crate::decorator::SourceDecorator) never walks the
//! stack itself; it asks a [`FrameResolver`] so tests can supply fixed
//! frames and hosts can tune which frames count as indirection.

use crate::record::{Caller, SourceMetadata};

/// Resolves the application call site of the current log call.
pub trait FrameResolver: Send + Sync {
    /// Return the call site `skip` application frames above the first
    /// non-internal frame, or `None` when the stack is not deep enough or
    /// carries no symbol names.
    fn resolve(&self, skip: usize) -> Option<Frame>;
}

/// One resolved stack frame.
///
/// `location` is `None` when the binary carries symbol names but no debug
/// line tables, as in the default release profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub function: String,
    pub location: Option<Caller>,
}

impl Frame {
    pub fn new(function: impl Into<String>, location: Option<Caller>) -> Self {
        Frame {
            function: function.into(),
            location,
        }
    }

    /// Complete the frame into a `source` value, taking the file and line
    /// from `fallback` when the frame has none.
    pub fn into_source(self, fallback: Option<&Caller>) -> Option<SourceMetadata> {
        let location = self.location.or_else(|| fallback.cloned())?;
        Some(SourceMetadata {
            function: self.function,
            file: location.file,
            line: location.line,
        })
    }
}

/// Frames of these crates are never reported as a call site.
const INTERNAL_PREFIXES: &[&str] = &[
    "log_enricher::",
    "backtrace::",
    "tracing::",
    "tracing_core::",
    "tracing_subscriber::",
    "log::",
    "std::",
    "core::",
    "alloc::",
];

const CRATE_PREFIX: &str = "log_enricher::";

const MAX_FRAMES: usize = 128;

/// [`FrameResolver`] backed by the `backtrace` crate.
///
/// The walk starts at this crate's own frames. Everything belonging to this
/// crate, to the `tracing`/`log` facades, to the standard library or to a
/// registered shim prefix is elided, so the first remaining frame is the
/// original call site no matter how many facade layers forwarded the entry.
/// `skip` then ascends past that many further application frames. Closure
/// frames fold into their enclosing function and don't count.
#[derive(Debug, Clone, Default)]
pub struct BacktraceResolver {
    shim_prefixes: Vec<String>,
}

impl BacktraceResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat every function under `prefix` (e.g. `"myapp::legacy_log::"`) as
    /// a redirection shim that is never reported.
    pub fn with_shim_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.shim_prefixes.push(prefix.into());
        self
    }

    fn is_internal(&self, name: &str) -> bool {
        INTERNAL_PREFIXES.iter().any(|p| name.starts_with(p))
            || self.shim_prefixes.iter().any(|p| name.starts_with(p.as_str()))
    }

    /// Trait impls are attributed to their self type, or to the trait when
    /// the self type is a bare generic parameter or reference (`<&mut W as ..>`).
    fn is_internal_symbol(&self, name: &str) -> bool {
        let bare = bare_path(name);
        match bare.split_once(" as ") {
            Some((self_ty, trait_path)) if !self_ty.contains("::") => self.is_internal(trait_path),
            _ => self.is_internal(bare),
        }
    }
}

impl FrameResolver for BacktraceResolver {
    fn resolve(&self, skip: usize) -> Option<Frame> {
        let mut remaining = skip;
        let mut seen_self = false;
        let mut last_function: Option<String> = None;
        let mut depth = 0;
        let mut found = None;

        backtrace::trace(|frame| {
            depth += 1;
            backtrace::resolve_frame(frame, |symbol| {
                if found.is_some() {
                    return;
                }
                let Some(name) = symbol.name() else {
                    return;
                };
                let name = format!("{:#}", name);
                if self.is_internal_symbol(&name) {
                    if bare_path(&name).starts_with(CRATE_PREFIX) {
                        seen_self = true;
                    }
                    return;
                }
                if !seen_self {
                    return;
                }

                let function = enclosing_function(&name).to_string();
                if last_function.as_deref() == Some(function.as_str()) {
                    return;
                }
                if remaining > 0 {
                    remaining -= 1;
                    last_function = Some(function);
                    return;
                }
                let location = match (symbol.filename(), symbol.lineno()) {
                    (Some(file), Some(line)) if line > 0 => {
                        Some(Caller::new(file.display().to_string(), line))
                    }
                    _ => None,
                };
                found = Some(Frame::new(function, location));
            });
            found.is_none() && depth < MAX_FRAMES
        });

        found
    }
}

/// Strip the qualified-path and reference decorations of a demangled name so
/// `<log_enricher::x::Y as Trait>::f` is matched by its crate.
fn bare_path(name: &str) -> &str {
    let name = name.trim_start_matches(|c: char| c == '<' || c == '&');
    let name = name.strip_prefix("mut ").unwrap_or(name);
    name.strip_prefix("dyn ").unwrap_or(name)
}

/// Fold closure frames (`::{{closure}}`, or `::{closure#N}` under v0
/// mangling) into the function that defines them.
fn enclosing_function(name: &str) -> &str {
    let mut function = name;
    loop {
        if let Some(outer) = function.strip_suffix("::{{closure}}") {
            function = outer;
        } else if let Some(outer) = strip_v0_closure(function) {
            function = outer;
        } else {
            return function;
        }
    }
}

fn strip_v0_closure(name: &str) -> Option<&str> {
    let body = name.strip_suffix('}')?;
    let start = body.rfind("::{closure#")?;
    let index = &body[start + "::{closure#".len()..];
    if index.chars().all(|c| c.is_ascii_digit()) {
        Some(&name[..start])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trait_impl_frames_match_their_crate() {
        let resolver = BacktraceResolver::new();
        let name = "<log_enricher::decorator::SourceDecorator as log_enricher::sink::LogSink>::write";
        assert!(resolver.is_internal_symbol(name));

        let name = "<tracing_subscriber::layer::layered::Layered<L,S> as tracing_core::subscriber::Subscriber>::event";
        assert!(resolver.is_internal_symbol(name));

        assert!(resolver.is_internal_symbol("<&mut W as core::fmt::Write>::write_str"));
        assert!(resolver.is_internal_symbol("<F as core::ops::function::FnOnce<()>>::call_once"));
    }

    #[test]
    fn application_frames_are_not_internal() {
        let resolver = BacktraceResolver::new();
        assert!(!resolver.is_internal_symbol("billing::invoice::render"));
        assert!(!resolver.is_internal_symbol("log_enricher_demo::main"));
        assert!(!resolver.is_internal_symbol("<billing::Invoice as core::fmt::Display>::fmt"));
    }

    #[test]
    fn shim_prefixes_are_elided() {
        let resolver = BacktraceResolver::new().with_shim_prefix("billing::legacy_log::");
        assert!(resolver.is_internal_symbol("billing::legacy_log::info"));
        assert!(!resolver.is_internal_symbol("billing::invoice::render"));
    }

    #[test]
    fn closures_fold_into_enclosing_function() {
        assert_eq!(
            enclosing_function("billing::run::{{closure}}::{{closure}}"),
            "billing::run"
        );
        assert_eq!(enclosing_function("billing::run"), "billing::run");
    }

    #[test]
    fn v0_closures_fold_into_enclosing_function() {
        assert_eq!(
            enclosing_function("billing::run::{closure#0}::{closure#12}"),
            "billing::run"
        );
        assert_eq!(
            enclosing_function("billing::run::{{closure}}::{closure#1}"),
            "billing::run"
        );
        assert_eq!(
            enclosing_function("billing::run::{shim:vtable#0}"),
            "billing::run::{shim:vtable#0}"
        );
    }

    #[test]
    fn frame_without_location_takes_fallback() {
        let fallback = Caller::new("src/billing.rs", 17);
        let source = Frame::new("billing::charge", None)
            .into_source(Some(&fallback))
            .unwrap();
        assert_eq!(source.function, "billing::charge");
        assert_eq!(source.file, "src/billing.rs");
        assert_eq!(source.line, 17);

        let own = Caller::new("src/invoice.rs", 3);
        let source = Frame::new("billing::render", Some(own))
            .into_source(Some(&fallback))
            .unwrap();
        assert_eq!(source.file, "src/invoice.rs");
        assert_eq!(source.line, 3);

        assert!(Frame::new("billing::charge", None).into_source(None).is_none());
    }
}
