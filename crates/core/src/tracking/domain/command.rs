use std::fmt;

/// A single instruction for the pan actuator.
///
/// `Display` produces the exact wire form, newline included.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    /// Relative step; positive turns toward the left half of the image.
    Steer(i32),
    Center,
    Stop,
}

/// Which kind of command, without the payload. Used for counters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Steer,
    Center,
    Stop,
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Steer(_) => CommandKind::Steer,
            Command::Center => CommandKind::Center,
            Command::Stop => CommandKind::Stop,
        }
    }

    /// ASCII bytes as written to the link.
    pub fn to_wire(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Steer(delta) => writeln!(f, "X{delta}"),
            Command::Center => writeln!(f, "CENTER"),
            Command::Stop => writeln!(f, "STOP"),
        }
    }
}
