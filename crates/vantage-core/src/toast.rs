//! Transient notification lifecycle.
//!
//! A toast is created hidden, enters after `enter_delay`, starts leaving at
//! `display` after creation and is removed `exit` later. Only one toast is on
//! screen: a new `notify` supersedes the current one, whose pending steps the
//! caller must cancel.

use web_time::{Duration, Instant};

use crate::config::ToastConfig;
use crate::geometry::Transform;
use crate::visual::{ElementId, StyleProp, VisualState};

const TRANSITION: &str = "all 0.3s ease";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastStep {
    Enter,
    Exit,
    Remove,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastPhase {
    Pending,
    Shown,
    Leaving,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ToastPlan {
    pub superseded: Option<ElementId>,
    pub initial: VisualState,
    pub steps: [(Instant, ToastStep); 3],
}

pub struct Notifier {
    enter_delay: Duration,
    display: Duration,
    exit: Duration,
    current: Option<(ElementId, ToastPhase)>,
}

impl Notifier {
    pub fn new(cfg: &ToastConfig) -> Self {
        Self {
            enter_delay: Duration::from_millis(cfg.enter_delay_ms),
            display: Duration::from_millis(cfg.display_ms),
            exit: Duration::from_millis(cfg.exit_ms),
            current: None,
        }
    }

    /// Adopts `element` as the current toast and plans its lifecycle.
    pub fn begin(&mut self, element: ElementId, now: Instant) -> ToastPlan {
        let superseded = self
            .current
            .replace((element, ToastPhase::Pending))
            .map(|(el, _)| el);
        ToastPlan {
            superseded,
            initial: VisualState::new()
                .opacity(0.0)
                .transform(Transform::CenteredX { dy: 0.0 })
                .style(StyleProp::Transition, TRANSITION),
            steps: [
                (now + self.enter_delay, ToastStep::Enter),
                (now + self.display, ToastStep::Exit),
                (now + self.display + self.exit, ToastStep::Remove),
            ],
        }
    }

    /// Advances `element`; `None` means "remove it from the page".
    pub fn step(&mut self, element: ElementId, step: ToastStep) -> Option<VisualState> {
        let phase = match step {
            ToastStep::Enter => ToastPhase::Shown,
            ToastStep::Exit => ToastPhase::Leaving,
            ToastStep::Remove => {
                if self.current.map(|(el, _)| el) == Some(element) {
                    self.current = None;
                }
                return None;
            }
        };
        if let Some((el, p)) = self.current.as_mut()
            && *el == element
        {
            *p = phase;
        }
        Some(match step {
            ToastStep::Enter => VisualState::new()
                .opacity(1.0)
                .transform(Transform::CenteredX { dy: -10.0 }),
            _ => VisualState::new()
                .opacity(0.0)
                .transform(Transform::CenteredX { dy: 10.0 }),
        })
    }

    pub fn current(&self) -> Option<(ElementId, ToastPhase)> {
        self.current
    }

    /// Forgets the current toast and returns it for removal.
    pub fn dismiss(&mut self) -> Option<ElementId> {
        self.current.take().map(|(el, _)| el)
    }
}
