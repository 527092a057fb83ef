//! Load options and execution limits.

use crate::console::{stdout_console, SharedConsole};
use crate::module::ModuleHandle;

/// Bounds on a single invocation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ExecutionLimits {
    /// Ops executed per invocation, across all nested calls.
    pub max_steps: u64,
    pub max_call_depth: u32,
}

impl Default for ExecutionLimits {
    fn default() -> Self {
        ExecutionLimits {
            max_steps: 10_000_000,
            max_call_depth: 1024,
        }
    }
}

#[derive(Clone)]
pub struct LoadOptions {
    pub limits: ExecutionLimits,
    /// Previously loaded units whose static methods this unit may call.
    pub dependencies: Vec<ModuleHandle>,
    pub console: SharedConsole,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions {
            limits: ExecutionLimits::default(),
            dependencies: Vec::new(),
            console: stdout_console(),
        }
    }
}

impl LoadOptions {
    #[must_use]
    pub fn limits(mut self, limits: ExecutionLimits) -> Self {
        self.limits = limits;
        self
    }

    #[must_use]
    pub fn dependency(mut self, module: ModuleHandle) -> Self {
        self.dependencies.push(module);
        self
    }

    #[must_use]
    pub fn console(mut self, console: SharedConsole) -> Self {
        self.console = console;
        self
    }
}
