//! Directive handlers
//!
//! Each handler is entered on the Start event of its directive node, with
//! the node's level already pushed. None of them finish synchronously: they
//! push captures or replays and continue from the completions.

use std::rc::Rc;

use tracing::{debug, info, warn};

use super::continuation::Marker;
use super::errors::{error_text, EngineResult, UsageError};
use super::levels::{Handler, LevelClose};
use super::{Engine, EngineOptions};
use crate::expr::Val;
use crate::types::Event;

/* ===================== Directive Table ===================== */

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    Eval,
    If,
    Each,
    On,
    Through,
    Debug,
}

type CommandFn = fn(&mut Engine, Event) -> EngineResult<()>;

const DIRECTIVES: &[(&str, Directive)] = &[
    ("eval", Directive::Eval),
    ("if", Directive::If),
    ("each", Directive::Each),
    ("on", Directive::On),
    ("through", Directive::Through),
    ("debug", Directive::Debug),
];

impl Directive {
    pub fn lookup(name: &str) -> Option<Directive> {
        DIRECTIVES
            .iter()
            .find(|(keyword, _)| *keyword == name)
            .map(|(_, directive)| *directive)
    }

    fn command(self) -> CommandFn {
        match self {
            Directive::Eval => command_eval,
            Directive::If => command_if,
            Directive::Each => command_each,
            Directive::On => command_on,
            Directive::Through => command_through,
            Directive::Debug => command_debug,
        }
    }

    pub fn run(self, engine: &mut Engine, event: Event) -> EngineResult<()> {
        debug!(directive = ?self, "entering directive");
        (self.command())(engine, event)
    }
}

/// How the default router treats a Start event name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagKind {
    Directive(Directive),
    UnknownDirective,
    /// `name=` or bare `=`
    Affect,
    Element,
}

impl TagKind {
    pub fn classify(name: &str, options: &EngineOptions) -> TagKind {
        if name == options.deferred_alias {
            return TagKind::Directive(Directive::On);
        }
        if let Some(keyword) = name.strip_prefix(options.directive_prefix.as_str()) {
            return Directive::lookup(keyword)
                .map(TagKind::Directive)
                .unwrap_or(TagKind::UnknownDirective);
        }
        if name.ends_with('=') {
            return TagKind::Affect;
        }
        TagKind::Element
    }
}

/* ===================== :eval ===================== */

/// `:eval expression`: evaluated for its side effects only
fn command_eval(engine: &mut Engine, _event: Event) -> EngineResult<()> {
    engine.capture_first_text(|engine, text| {
        // Failures are logged by evaluate(); nothing is rendered
        let _ = engine.evaluate(&text);
        engine.discard_sub_level()
    });
    Ok(())
}

/* ===================== :if ===================== */

/// `:if condition`
///
/// Truthy: only the directive's own End is swallowed, children flow through
/// normal routing. Falsy: the whole sub-tree is dropped.
fn command_if(engine: &mut Engine, event: Event) -> EngineResult<()> {
    engine.capture_text_and_eval(move |engine, value| match value {
        Err(err) => {
            engine.emit(event);
            engine.emit(Event::text(error_text(&err)));
            Ok(())
        }
        Ok(value) if value.is_truthy() => {
            engine
                .levels
                .set_on_end(Box::new(|_: &mut Engine| LevelClose::Suppress));
            Ok(())
        }
        Ok(_) => engine.discard_sub_level(),
    });
    Ok(())
}

/* ===================== :each ===================== */

struct EachLoop {
    item_name: String,
    index_name: Option<String>,
    items: Vec<Val>,
    body: Vec<Event>,
}

/// `:each name[, index] in expression`
fn command_each(engine: &mut Engine, event: Event) -> EngineResult<()> {
    engine.capture_first_text(move |engine, text| {
        let Some((item_name, index_name, source)) = parse_each_argument(&text) else {
            warn!("{}", UsageError::BadEachArgument(text.clone()));
            engine.emit(event);
            engine.emit(Event::text(text));
            return Ok(());
        };

        let items = match engine.evaluate(&source) {
            Ok(Val::List(items)) => items,
            Ok(other) => {
                warn!(
                    "{}",
                    UsageError::NotASequence {
                        expr: source,
                        found: other.type_name(),
                    }
                );
                return engine.discard_sub_level();
            }
            Err(err) => {
                engine.emit(Event::text(error_text(&err)));
                return engine.discard_sub_level();
            }
        };

        engine.capture_sub_level(false, move |engine, body| {
            let each = EachLoop {
                item_name,
                index_name,
                items,
                body,
            };
            play_iteration(engine, each, 0)
        });
        Ok(())
    });
    Ok(())
}

fn parse_each_argument(text: &str) -> Option<(String, Option<String>, String)> {
    let (binding, source) = text.split_once(" in ")?;
    let mut names = binding.splitn(2, ',');
    let item_name = names.next()?.trim().to_string();
    if item_name.is_empty() {
        return None;
    }
    let index_name = names
        .next()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty());
    Some((item_name, index_name, source.trim().to_string()))
}

/// Replay the loop body for item `idx`, then chain to the next one
fn play_iteration(engine: &mut Engine, each: EachLoop, idx: usize) -> EngineResult<()> {
    let Some(item) = each.items.get(idx).cloned() else {
        debug!(iterations = idx, "each complete");
        return Ok(());
    };

    let mut bindings = vec![(each.item_name.clone(), item)];
    if let Some(index_name) = &each.index_name {
        bindings.push((index_name.clone(), Val::Num(idx as f64)));
    }
    let overlay = engine.scope.install(bindings);

    let body = each.body.clone();
    engine.play_buffer(body, move |engine| {
        engine.scope.release(overlay);
        play_iteration(engine, each, idx + 1)
    });
    Ok(())
}

/* ===================== :on / :: ===================== */

/// `:on [bind=]selector`: defers the body until `selector` matches
///
/// The handler is registered on the level containing the directive.
fn command_on(engine: &mut Engine, _event: Event) -> EngineResult<()> {
    engine.capture_first_text(|engine, text| {
        let (bind_name, selector) = match text.split_once('=') {
            Some((bind, selector)) => (
                Some(bind.trim().to_string()).filter(|b| !b.is_empty()),
                selector.trim().to_string(),
            ),
            None => (None, text.trim().to_string()),
        };
        if selector.is_empty() {
            warn!("{}", UsageError::MissingSelector(text.clone()));
            return engine.discard_sub_level();
        }

        engine.capture_sub_level(false, move |engine, body| {
            debug!(%selector, bind = ?bind_name, events = body.len(), "registering deferred body");
            let body = Rc::new(body);
            let handler: Handler = Rc::new(move |engine: &mut Engine, matched: Event| {
                fire_deferred(engine, Rc::clone(&body), bind_name.clone(), matched)
            });
            engine.levels.register(selector, handler);
            Ok(())
        });
        Ok(())
    });
    Ok(())
}

/// Run a deferred body against the event that matched its selector
fn fire_deferred(
    engine: &mut Engine,
    body: Rc<Vec<Event>>,
    bind_name: Option<String>,
    matched: Event,
) -> EngineResult<()> {
    engine.continuations.open(engine.queue.len());

    let value = match &matched {
        Event::Text { text } => Val::Str(text.clone()),
        other => Val::from(other),
    };
    let mut bindings = vec![("_".to_string(), value.clone())];
    if let Some(name) = bind_name {
        bindings.push((name, value));
    }
    let overlay = engine.scope.install(bindings);

    let matched_start = matched.is_start();
    engine.play_buffer(body.as_ref().clone(), move |engine| {
        engine.scope.release(overlay);
        let unclaimed = matches!(engine.continuations.close(), Some(Marker::Open { .. }));
        if unclaimed && matched_start {
            debug!("deferred body did not go through, dropping matched sub-tree");
            return engine.discard_sub_level();
        }
        Ok(())
    });
    Ok(())
}

/* ===================== :through ===================== */

/// `:through`: releases the events intercepted by the enclosing `:on`
///
/// Everything still ahead of the innermost continuation marker is spliced
/// out of the queue and re-injected when the enclosing level closes; that
/// close is itself swallowed.
fn command_through(engine: &mut Engine, _event: Event) -> EngineResult<()> {
    engine.capture_sub_level(true, |engine, _| {
        let position = match engine.continuations.claim() {
            Ok(position) => position,
            Err(misuse) => {
                warn!("{}", misuse);
                return Ok(());
            }
        };

        let count = engine.queue.len().saturating_sub(position);
        let stash = engine.queue.take_front(count);
        debug!(count, "continuation claimed");
        engine.levels.set_on_end(Box::new(move |engine: &mut Engine| {
            debug!(count = stash.len(), "continuation released");
            engine.queue.prepend(stash);
            LevelClose::Suppress
        }));
        Ok(())
    });
    Ok(())
}

/* ===================== :debug ===================== */

fn command_debug(engine: &mut Engine, _event: Event) -> EngineResult<()> {
    let state = engine.debug_state();
    info!(
        queue = state.queue_len,
        levels = %state.level_tags.join(" < "),
        contexts = state.context_depth,
        continuations = state.open_continuations,
        overlays = state.overlay_depth,
        ":debug"
    );
    engine.discard_sub_level()
}

/* ===================== Affect ===================== */

/// `name= expression` / `= expression`
///
/// `name=` emits `<name>` followed by the value as text and leaves the
/// children and End to normal routing; bare `=` replaces the node entirely.
pub fn op_affect(engine: &mut Engine, name: String) -> EngineResult<()> {
    engine.capture_text_and_eval(move |engine, value| {
        let text = match value {
            Ok(value) => value.to_string(),
            Err(err) => error_text(&err),
        };
        let element = name.strip_suffix('=').unwrap_or(&name);
        if element.is_empty() {
            engine.emit(Event::text(text));
            return engine.discard_sub_level();
        }
        engine.emit(Event::start(element));
        engine.emit(Event::text(text));
        Ok(())
    });
    Ok(())
}
