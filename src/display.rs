//! Display backend: the window the gallery draws into and the keyboard it listens to.
//!
//! The navigation loop only sees the [`Display`] / [`Surface`] traits and the closed
//! [`InputEvent`] set. SDL key codes never leave this module.

use sdl2::event::{Event, WindowEvent};
use sdl2::keyboard::Keycode;
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{TextureCreator, WindowCanvas};
use sdl2::video::WindowContext;
use sdl2::{EventPump, Sdl, VideoSubsystem};
use tracing::debug;

use crate::error::DisplayError;
use crate::render::Frame;
use crate::settings::DisplayConfig;

/// What the user asked for, decoded from backend-specific input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    MoveUp,
    MoveDown,
    Confirm,
    Quit,
    /// Anything the gallery does not react to.
    None,
}

/// Owns the display for the whole run and hands out surfaces.
pub trait Display {
    type Surface: Surface;

    fn create_surface(&mut self, config: &DisplayConfig) -> Result<Self::Surface, DisplayError>;

    /// Release the window so another program can take the screen.
    fn destroy_surface(&mut self, surface: Self::Surface);

    /// Block until the next input event. Never polls.
    fn wait_event(&mut self, surface: &mut Self::Surface) -> InputEvent;
}

pub trait Surface {
    /// Draw `frame` at the origin, covering the surface.
    fn blit(&mut self, frame: &Frame) -> Result<(), DisplayError>;
    /// Commit what has been drawn.
    fn present(&mut self);
    fn set_title(&mut self, title: &str);
}

/// Key-up decoding. Key-up rather than key-down so the confirm key's release
/// lands here and not in the player.
pub fn decode_key(key: Keycode) -> InputEvent {
    match key {
        Keycode::Up => InputEvent::MoveUp,
        Keycode::Down => InputEvent::MoveDown,
        Keycode::Return | Keycode::KpEnter | Keycode::Space => InputEvent::Confirm,
        Keycode::Escape => InputEvent::Quit,
        _ => InputEvent::None,
    }
}

// ── SDL2 ──────────────────────────────────────────────────────────────────

pub struct SdlDisplay {
    sdl: Sdl,
    video: VideoSubsystem,
    event_pump: EventPump,
}

impl SdlDisplay {
    pub fn init() -> Result<Self, DisplayError> {
        let sdl = sdl2::init().map_err(DisplayError::Init)?;
        let video = sdl.video().map_err(DisplayError::Init)?;
        let event_pump = sdl.event_pump().map_err(DisplayError::Init)?;
        Ok(SdlDisplay {
            sdl,
            video,
            event_pump,
        })
    }

    /// Resolution of the primary display's desktop mode.
    pub fn desktop_size(&self) -> Result<(u32, u32), DisplayError> {
        let mode = self.video.desktop_display_mode(0).map_err(DisplayError::Init)?;
        Ok((mode.w.max(1) as u32, mode.h.max(1) as u32))
    }
}

pub struct SdlSurface {
    canvas: WindowCanvas,
    texture_creator: TextureCreator<WindowContext>,
    /// Kept so an expose can be answered without asking the navigator.
    last: Option<Frame>,
}

impl Display for SdlDisplay {
    type Surface = SdlSurface;

    fn create_surface(&mut self, config: &DisplayConfig) -> Result<SdlSurface, DisplayError> {
        let mut builder = self.video.window("kv", config.width, config.height);
        builder.position_centered();
        if config.fullscreen {
            builder.fullscreen();
        }
        let window = builder
            .build()
            .map_err(|e| DisplayError::Window(e.to_string()))?;
        let canvas = window
            .into_canvas()
            .build()
            .map_err(|e| DisplayError::Window(e.to_string()))?;
        let texture_creator = canvas.texture_creator();

        self.sdl.mouse().show_cursor(!config.fullscreen);

        // Drop whatever was typed while the player had the screen.
        let stale = self.event_pump.poll_iter().count();
        if stale > 0 {
            debug!("display: dropped {} stale events", stale);
        }

        debug!(
            "display: surface {}x{} fullscreen={}",
            config.width, config.height, config.fullscreen
        );
        Ok(SdlSurface {
            canvas,
            texture_creator,
            last: None,
        })
    }

    fn destroy_surface(&mut self, surface: SdlSurface) {
        drop(surface);
        self.sdl.mouse().show_cursor(true);
        debug!("display: surface destroyed");
    }

    fn wait_event(&mut self, surface: &mut SdlSurface) -> InputEvent {
        loop {
            match self.event_pump.wait_event() {
                Event::Quit { .. } => return InputEvent::Quit,
                Event::KeyUp {
                    keycode: Some(key), ..
                } => return decode_key(key),
                Event::Window {
                    win_event: WindowEvent::Exposed,
                    ..
                } => surface.redraw(),
                _ => return InputEvent::None,
            }
        }
    }
}

impl SdlSurface {
    fn draw(&mut self, frame: &Frame) -> Result<(), DisplayError> {
        // ABGR8888 is R,G,B,A in memory on little-endian, which is what `image` produces.
        let mut texture = self
            .texture_creator
            .create_texture_streaming(PixelFormatEnum::ABGR8888, frame.width, frame.height)
            .map_err(|e| DisplayError::Draw(e.to_string()))?;
        texture
            .update(None, &frame.rgba, frame.pitch())
            .map_err(|e| DisplayError::Draw(e.to_string()))?;
        self.canvas.clear();
        self.canvas
            .copy(&texture, None, None)
            .map_err(DisplayError::Draw)?;
        Ok(())
    }

    fn redraw(&mut self) {
        if let Some(frame) = self.last.take() {
            if self.draw(&frame).is_ok() {
                self.canvas.present();
            }
            self.last = Some(frame);
        }
    }
}

impl Surface for SdlSurface {
    fn blit(&mut self, frame: &Frame) -> Result<(), DisplayError> {
        self.draw(frame)?;
        self.last = Some(frame.clone());
        Ok(())
    }

    fn present(&mut self) {
        self.canvas.present();
    }

    fn set_title(&mut self, title: &str) {
        self.canvas.window_mut().set_title(title).ok();
    }
}
