use sdl2::event::Event;
use sdl2::keyboard::Scancode;
use sdl2::EventPump;
use std::collections::HashSet;

#[derive(Default)]
pub struct InputState {
    pub keys: HashSet<Scancode>,
    /// Keys that went down this frame, in order.
    pub pressed: Vec<Scancode>,
    pub quit: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, event_pump: &mut EventPump) {
        self.pressed.clear();

        for event in event_pump.poll_iter() {
            match event {
                Event::Quit { .. } => self.quit = true,
                Event::KeyDown {
                    scancode: Some(Scancode::Escape),
                    ..
                } => self.quit = true,
                Event::KeyDown {
                    scancode: Some(sc),
                    repeat: false,
                    ..
                } => {
                    self.keys.insert(sc);
                    self.pressed.push(sc);
                }
                Event::KeyUp {
                    scancode: Some(sc), ..
                } => {
                    self.keys.remove(&sc);
                }
                _ => {}
            }
        }
    }

    pub fn is_key_held(&self, sc: Scancode) -> bool {
        self.keys.contains(&sc)
    }

    pub fn was_pressed(&self, sc: Scancode) -> bool {
        self.pressed.contains(&sc)
    }

    /// -1.0, 0.0 or 1.0 from a pair of keys.
    pub fn axis(&self, negative: Scancode, positive: Scancode) -> f64 {
        let mut value = 0.0;
        if self.is_key_held(negative) {
            value -= 1.0;
        }
        if self.is_key_held(positive) {
            value += 1.0;
        }
        value
    }
}
