/// Logical keys the simulation reacts to. Raw key codes are mapped once at
/// the boundary so nothing downstream compares strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Forward,
    Back,
    Left,
    Right,
    Jump,
    /// Buy the painting in view
    Buy,
    /// Eat the mushroom in view
    Eat,
}

impl Key {
    /// Map a DOM `KeyboardEvent.code`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "KeyW" => Some(Key::Forward),
            "KeyS" => Some(Key::Back),
            "KeyA" => Some(Key::Left),
            "KeyD" => Some(Key::Right),
            "Space" => Some(Key::Jump),
            "KeyB" => Some(Key::Buy),
            "KeyE" => Some(Key::Eat),
            _ => None,
        }
    }
}

/// Held movement keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

impl InputState {
    pub fn set(&mut self, key: Key, held: bool) {
        match key {
            Key::Forward => self.forward = held,
            Key::Back => self.back = held,
            Key::Left => self.left = held,
            Key::Right => self.right = held,
            Key::Jump => self.jump = held,
            Key::Buy | Key::Eat => {}
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
