//! Navigation loop: the Browsing / Launching / Exiting state machine.
//!
//! Browsing renders the current pair (when something changed) and then blocks on the
//! next input event. Confirm passes through Launching: the surface is destroyed, the
//! player runs to completion, the surface is rebuilt and Browsing re-renders. Quit
//! moves to Exiting, which always releases the surface.

use tracing::{debug, error, info, warn};

use crate::catalog::{Catalog, MediaPair};
use crate::cursor::Selection;
use crate::display::{Display, InputEvent, Surface};
use crate::error::NavError;
use crate::launcher::{play, ProcessRunner};
use crate::render::{render, FrameCache};
use crate::settings::{DisplayConfig, PlayerConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Browsing,
    Launching,
    Exiting,
}

/// Next state for `event` while browsing. Cursor movement is applied by the caller.
pub fn transition(event: InputEvent) -> State {
    match event {
        InputEvent::Confirm => State::Launching,
        InputEvent::Quit => State::Exiting,
        InputEvent::MoveUp | InputEvent::MoveDown | InputEvent::None => State::Browsing,
    }
}

pub struct Navigator<'a, D: Display, R: ProcessRunner> {
    catalog: &'a Catalog,
    selection: Selection,
    config: &'a DisplayConfig,
    player: &'a PlayerConfig,
    display: &'a mut D,
    runner: &'a mut R,
    surface: Option<D::Surface>,
    frames: FrameCache,
    /// The shown image no longer matches the cursor (or the surface is new).
    stale: bool,
    /// Direction of the last move: +1 down, -1 up. Unrenderable pairs are skipped this way.
    heading: i64,
}

impl<'a, D: Display, R: ProcessRunner> Navigator<'a, D, R> {
    /// `None` for an empty catalog: there is nothing to browse.
    pub fn new(
        catalog: &'a Catalog,
        config: &'a DisplayConfig,
        player: &'a PlayerConfig,
        display: &'a mut D,
        runner: &'a mut R,
        cache_size: usize,
    ) -> Option<Self> {
        let selection = Selection::new(catalog.len())?;
        Some(Navigator {
            catalog,
            selection,
            config,
            player,
            display,
            runner,
            surface: None,
            frames: FrameCache::new(cache_size),
            stale: true,
            heading: 1,
        })
    }

    #[cfg(test)]
    pub fn current(&self) -> usize {
        self.selection.current()
    }

    /// Acquire the display and browse until Quit. The surface is released on every exit path.
    pub fn run(&mut self) -> Result<(), NavError> {
        self.surface = Some(self.display.create_surface(self.config)?);
        self.stale = true;
        let result = self.browse();
        self.release();
        result
    }

    fn browse(&mut self) -> Result<(), NavError> {
        let mut state = State::Browsing;
        loop {
            state = match state {
                State::Browsing => {
                    if self.stale {
                        self.show_current()?;
                        self.stale = false;
                    }
                    let event = match self.surface.as_mut() {
                        Some(surface) => self.display.wait_event(surface),
                        None => return Err(NavError::SurfaceLost),
                    };
                    self.handle(event)
                }
                State::Launching => {
                    self.launch()?;
                    State::Browsing
                }
                State::Exiting => {
                    info!("quit");
                    return Ok(());
                }
            };
        }
    }

    fn handle(&mut self, event: InputEvent) -> State {
        match event {
            InputEvent::MoveDown => {
                self.selection.next();
                self.heading = 1;
                self.stale = true;
            }
            InputEvent::MoveUp => {
                self.selection.previous();
                self.heading = -1;
                self.stale = true;
            }
            InputEvent::Confirm | InputEvent::Quit | InputEvent::None => {}
        }
        transition(event)
    }

    /// Render the selected pair, skipping past pairs that fail in the direction of the
    /// last move. Gives up after one full lap of the catalog.
    fn show_current(&mut self) -> Result<(), NavError> {
        let attempts = self.catalog.len();
        for _ in 0..attempts {
            let index = self.selection.current();
            let pair = &self.catalog[index];
            let surface = self.surface.as_mut().ok_or(NavError::SurfaceLost)?;
            match render(surface, pair, self.config, &mut self.frames) {
                Ok(()) => {
                    surface.set_title(&title(pair, index, self.catalog.len()));
                    debug!("show [{}/{}] {}", index + 1, self.catalog.len(), pair.image().display());
                    return Ok(());
                }
                Err(err) => {
                    warn!(error = %err, "skipping [{}/{}]", index + 1, self.catalog.len());
                    self.selection.advance(self.heading);
                }
            }
        }
        Err(NavError::NothingRenderable { attempts })
    }

    /// Hand the screen to the player and take it back afterwards.
    /// A player that fails to start is logged; browsing continues either way.
    fn launch(&mut self) -> Result<(), NavError> {
        let pair = &self.catalog[self.selection.current()];
        if let Some(surface) = self.surface.take() {
            self.display.destroy_surface(surface);
        }

        if let Err(err) = play(self.runner, self.player, pair.video()) {
            error!(error = %err, "cannot play {}", pair.video().display());
        }

        self.surface = Some(self.display.create_surface(self.config)?);
        self.stale = true;
        Ok(())
    }

    fn release(&mut self) {
        if let Some(surface) = self.surface.take() {
            self.display.destroy_surface(surface);
        }
    }
}

fn title(pair: &MediaPair, index: usize, total: usize) -> String {
    format!(
        "[{}/{}] {} — kv {}",
        index + 1,
        total,
        pair.label(),
        crate::VERSION
    )
}
