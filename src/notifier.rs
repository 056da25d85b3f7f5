// 🔔 Change Notification
// Lets list screens learn that a record was saved so they can reload

use std::rc::Rc;

/// Something that wants to hear about saved records
pub trait ChangeListener {
    fn on_changed(&self);
}

impl<F: Fn()> ChangeListener for F {
    fn on_changed(&self) {
        self()
    }
}

/// Ordered list of listeners, invoked synchronously.
///
/// Listeners are shared handles: the screen that subscribes keeps its own
/// `Rc`, so the listener lives as long as that screen does.
#[derive(Default)]
pub struct ChangeNotifier {
    listeners: Vec<Rc<dyn ChangeListener>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: Rc<dyn ChangeListener>) {
        self.listeners.push(listener);
    }

    /// Calls every listener once. Returns how many were called.
    pub fn notify(&self) -> usize {
        for listener in &self.listeners {
            listener.on_changed();
        }
        self.listeners.len()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl std::fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
