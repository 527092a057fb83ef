//! Where `System.Console.WriteLine` output goes.
//!
//! Enum dispatch over the three destinations: the process's stdout, a
//! capture buffer (tests and embedding hosts), or nowhere.

use std::sync::Arc;

use parking_lot::Mutex;

pub enum Console {
    Stdout,
    Buffer(Mutex<String>),
    Silent,
}

impl Console {
    pub fn write_line(&self, line: &str) {
        match self {
            Console::Stdout => println!("{line}"),
            Console::Buffer(buffer) => {
                let mut buffer = buffer.lock();
                buffer.push_str(line);
                buffer.push('\n');
            }
            Console::Silent => {}
        }
    }

    /// Everything captured so far; empty unless this is a buffer.
    pub fn output(&self) -> String {
        match self {
            Console::Buffer(buffer) => buffer.lock().clone(),
            Console::Stdout | Console::Silent => String::new(),
        }
    }

    pub fn clear(&self) {
        if let Console::Buffer(buffer) = self {
            buffer.lock().clear();
        }
    }
}

pub type SharedConsole = Arc<Console>;

pub fn stdout_console() -> SharedConsole {
    Arc::new(Console::Stdout)
}

pub fn buffer_console() -> SharedConsole {
    Arc::new(Console::Buffer(Mutex::new(String::new())))
}

pub fn silent_console() -> SharedConsole {
    Arc::new(Console::Silent)
}

#[cfg(test)]
mod tests;
