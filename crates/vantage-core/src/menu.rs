//! Mobile navigation menu.
//!
//! Two states. `Toggle` flips; selecting a link, clicking outside and Escape
//! all force `Closed`. The three visual effects of a state (hamburger
//! styling, panel styling, body scroll lock) are derived from the state as
//! one `MenuVisuals` value and applied as one batch.

use bitflags::bitflags;

use crate::signal::{Signal, signal};
use crate::visual::{ElementId, VisualState, class};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MenuState {
    #[default]
    Closed,
    Open,
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct MenuVisuals: u8 {
        const TOGGLE_ACTIVE = 1 << 0;
        const PANEL_ACTIVE  = 1 << 1;
        const BODY_LOCK     = 1 << 2;
    }
}

impl MenuState {
    pub fn visuals(self) -> MenuVisuals {
        match self {
            MenuState::Open => MenuVisuals::all(),
            MenuState::Closed => MenuVisuals::empty(),
        }
    }

    pub fn is_open(self) -> bool {
        self == MenuState::Open
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuInput {
    Toggle,
    LinkSelected,
    OutsideClick,
    Escape,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MenuElements {
    pub toggle: ElementId,
    pub panel: ElementId,
    pub body: ElementId,
}

impl MenuElements {
    /// The full set of writes for `visuals`. Always all three elements, so a
    /// partial combination can't be expressed.
    pub fn batch(&self, visuals: MenuVisuals) -> [(ElementId, VisualState); 3] {
        [
            (
                self.toggle,
                VisualState::new().class(class::ACTIVE, visuals.contains(MenuVisuals::TOGGLE_ACTIVE)),
            ),
            (
                self.panel,
                VisualState::new().class(class::ACTIVE, visuals.contains(MenuVisuals::PANEL_ACTIVE)),
            ),
            (
                self.body,
                VisualState::new().class(class::MENU_OPEN, visuals.contains(MenuVisuals::BODY_LOCK)),
            ),
        ]
    }
}

pub struct MenuController {
    state: Signal<MenuState>,
}

impl Default for MenuController {
    fn default() -> Self {
        Self::new()
    }
}

impl MenuController {
    pub fn new() -> Self {
        Self {
            state: signal(MenuState::Closed),
        }
    }

    pub fn state(&self) -> MenuState {
        self.state.get()
    }

    /// Observers (e.g. an `aria-expanded` binding) subscribe here.
    pub fn state_signal(&self) -> Signal<MenuState> {
        self.state.clone()
    }

    /// Returns the new visuals if the state changed.
    pub fn handle(&self, input: MenuInput) -> Option<MenuVisuals> {
        let current = self.state.get();
        let next = match input {
            MenuInput::Toggle => match current {
                MenuState::Open => MenuState::Closed,
                MenuState::Closed => MenuState::Open,
            },
            MenuInput::LinkSelected | MenuInput::OutsideClick | MenuInput::Escape => {
                MenuState::Closed
            }
        };
        if !self.state.replace_if_changed(next) {
            return None;
        }
        log::debug!("menu {current:?} -> {next:?} on {input:?}");
        Some(next.visuals())
    }
}
