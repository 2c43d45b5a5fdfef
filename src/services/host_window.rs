//! Host window adapter

use std::sync::Mutex;
use tracing::{debug, info};

use crate::{error::WidgetError, state::WindowSize};

/// Window-manager capabilities the widget drives. Every call is best effort.
pub trait HostWindow: Send + Sync {
    fn resize(&self, size: WindowSize) -> Result<(), WidgetError>;
    fn current_size(&self) -> Result<WindowSize, WidgetError>;
    fn focus(&self) -> Result<(), WidgetError>;
    /// Open a new window at `size`, or focus the one already open
    fn open(&self, size: WindowSize) -> Result<(), WidgetError>;
    fn close(&self) -> Result<(), WidgetError>;
}

#[derive(Debug)]
struct Geometry {
    size: WindowSize,
    open: bool,
    focused: bool,
}

/// Window with no real surface behind it; tracks geometry in memory and
/// refuses calls once closed
#[derive(Debug)]
pub struct HeadlessWindow {
    geometry: Mutex<Geometry>,
}

impl HeadlessWindow {
    pub fn new(size: WindowSize) -> Self {
        Self {
            geometry: Mutex::new(Geometry {
                size,
                open: true,
                focused: true,
            }),
        }
    }

    pub fn is_open(&self) -> bool {
        self.geometry.lock().map(|g| g.open).unwrap_or(false)
    }

    pub fn is_focused(&self) -> bool {
        self.geometry.lock().map(|g| g.open && g.focused).unwrap_or(false)
    }

    fn with_open<T>(&self, f: impl FnOnce(&mut Geometry) -> T) -> Result<T, WidgetError> {
        let mut geometry = self.geometry.lock()
            .map_err(|e| WidgetError::HostAdapterUnavailable(format!("window lock: {}", e)))?;
        if !geometry.open {
            return Err(WidgetError::HostAdapterUnavailable("window is closed".to_string()));
        }
        Ok(f(&mut geometry))
    }
}

impl HostWindow for HeadlessWindow {
    fn resize(&self, size: WindowSize) -> Result<(), WidgetError> {
        self.with_open(|g| g.size = size)?;
        debug!("Window resized to {}x{}", size.width, size.height);
        Ok(())
    }

    fn current_size(&self) -> Result<WindowSize, WidgetError> {
        self.with_open(|g| g.size)
    }

    fn focus(&self) -> Result<(), WidgetError> {
        self.with_open(|g| g.focused = true)
    }

    fn open(&self, size: WindowSize) -> Result<(), WidgetError> {
        let mut geometry = self.geometry.lock()
            .map_err(|e| WidgetError::HostAdapterUnavailable(format!("window lock: {}", e)))?;
        if !geometry.open {
            geometry.size = size;
            geometry.open = true;
            info!("Window opened at {}x{}", size.width, size.height);
        }
        geometry.focused = true;
        Ok(())
    }

    fn close(&self) -> Result<(), WidgetError> {
        self.with_open(|g| {
            g.open = false;
            g.focused = false;
        })?;
        info!("Window closed");
        Ok(())
    }
}
