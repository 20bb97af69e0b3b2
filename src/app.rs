use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use pixels::{Pixels, SurfaceTexture};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::ActiveEventLoop,
    keyboard::{Key, NamedKey, SmolStr},
    window::{Window, WindowId},
};

use crate::framebuffer::{self, Frame};
use crate::machine::Machine;
#[cfg(feature = "audio")]
use crate::sound::Speaker;

/// Timers must be ticked at a rate of 60Hz
const TIMER_FREQ: u64 = 60;

/// The Application GUI
pub struct App {
    /// The Application's window
    window: Option<Arc<Window>>,
    /// The application's rendering plane
    pixels: Option<Pixels<'static>>,
    /// The virtual machine being hosted
    machine: Machine,
    /// The most recent frame the machine emitted
    frame: Option<Frame>,
    /// The audio device, if one could be opened
    #[cfg(feature = "audio")]
    speaker: Option<Speaker>,
    /// Number of real pixels per framebuffer cell
    scale: u32,
    /// How long one emulated instruction takes
    cpu_period: Duration,
    /// Set when the machine reported an error; stops further execution
    halted: bool,
    /// The last time the CPU was stepped. Used for frequency emulation.
    last_cpu_time: Instant,
    /// The last time the timers were ticked. Used for frequency emulation.
    last_timer_time: Instant,
}

impl App {
    /// Construct a new application hosting a loaded machine
    pub fn new(machine: Machine, scale: u32, cpu_hz: u64) -> Self {
        Self {
            window: None,
            pixels: None,
            machine,
            frame: None,
            #[cfg(feature = "audio")]
            speaker: Speaker::new(),
            scale,
            cpu_period: Duration::from_secs_f64(1.0 / cpu_hz as f64),
            halted: false,
            last_cpu_time: Instant::now(),
            last_timer_time: Instant::now(),
        }
    }

    /// Renders the last emitted frame to the [`Self::pixels`] plane. Actual
    /// redrawing is deferred to [`Self::about_to_wait`]
    fn draw(&mut self) {
        if let (Some(pixels), Some(frame)) = (&mut self.pixels, &self.frame) {
            frame.render_to_buffer(pixels.frame_mut());

            if let Err(e) = pixels.render() {
                log::error!("Rendering failed: {:?}", e);
            }
        }
    }

    /// Runs one scheduler pass: the CPU at its configured rate and the
    /// timers at 60 Hz.
    ///
    /// Both clocks advance by whole periods rather than resetting to "now",
    /// so neither drifts against wall-clock time.
    fn run_pending_cycles(&mut self) {
        while self.last_cpu_time.elapsed() >= self.cpu_period {
            if let Err(e) = self.machine.step() {
                log::error!(
                    "machine halted at {:#06X}: {}",
                    self.machine.program_counter(),
                    e
                );
                self.halted = true;
                return;
            }
            self.last_cpu_time += self.cpu_period;
        }

        let timer_period = Duration::from_secs_f64(1.0 / TIMER_FREQ as f64);
        while self.last_timer_time.elapsed() >= timer_period {
            let effects = self.machine.tick_timers();

            if let Some(frame) = effects.frame {
                self.frame = Some(frame);
            }

            #[cfg(feature = "audio")]
            if let Some(duration) = effects.tone
                && let Some(speaker) = &mut self.speaker
            {
                speaker.play_for(duration);
            }

            self.last_timer_time += timer_period;
        }
    }

    /// Maps a given character to a CHIP-8 key code
    fn map_key_to_code(key_text: SmolStr) -> Option<u8> {
        match key_text.as_ref() {
            "1" => Some(0x1),
            "2" => Some(0x2),
            "3" => Some(0x3),
            "4" => Some(0xC),
            "q" => Some(0x4),
            "w" => Some(0x5),
            "e" => Some(0x6),
            "r" => Some(0xD),
            "a" => Some(0x7),
            "s" => Some(0x8),
            "d" => Some(0x9),
            "f" => Some(0xE),
            "z" => Some(0xA),
            "x" => Some(0x0),
            "c" => Some(0xB),
            "v" => Some(0xF),
            _ => None,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        // Construct the default window and pixels rendering plane
        let width = framebuffer::WIDTH as u32;
        let height = framebuffer::HEIGHT as u32;

        // The window is an Arc in order to have an owned shared reference with the pixels plane
        log::info!(
            "Creating window ({}x{})",
            width * self.scale,
            height * self.scale
        );
        let window = Arc::new(
            match event_loop.create_window(
                Window::default_attributes()
                    .with_title("CHIP-8")
                    .with_inner_size(LogicalSize::new(width * self.scale, height * self.scale)),
            ) {
                Ok(w) => w,
                Err(e) => {
                    log::error!("Error constructing window: {:?}", e);
                    std::process::exit(1);
                }
            },
        );

        let size = window.inner_size();
        let surface_texture = SurfaceTexture::new(size.width, size.height, Arc::clone(&window));
        // the surface scales the virtual resolution up to the window
        let pixels = match Pixels::new(width, height, surface_texture) {
            Ok(p) => p,
            Err(e) => {
                log::error!("Error constructing pixel buffer: {:?}", e);
                std::process::exit(1);
            }
        };

        self.pixels = Some(pixels);
        self.window = Some(window);

        // reset the cpu and timer times
        self.last_cpu_time = Instant::now();
        self.last_timer_time = Instant::now();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::debug!("Close requested, stopping...");
                event_loop.exit();
            }
            WindowEvent::KeyboardInput {
                event:
                    // filter for non-repeated keypresses
                    KeyEvent {
                        state,
                        logical_key,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                log::trace!("Keyboard Input: {:?}, {:?}", logical_key, state);
                if let Key::Named(NamedKey::Escape) = logical_key {
                    // close the application on escape
                    event_loop.exit();
                } else if let Key::Character(str) = logical_key
                    && let Some(key_code) = Self::map_key_to_code(str)
                {
                    match state {
                        ElementState::Pressed => self.machine.key_down(key_code),
                        ElementState::Released => self.machine.key_up(key_code),
                    }
                }
            }
            WindowEvent::RedrawRequested => {
                self.draw();
            }
            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if !self.halted {
            self.run_pending_cycles();
        }

        // Request redraw and sleep until next event
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}
