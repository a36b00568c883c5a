//! Drawing targets and scoped, exclusive access to them.

use super::scene::Scene;
use super::settings::Viewport;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// A target that can present a [`Scene`].
pub trait Surface: Send {
    /// False while the target is not ready or already torn down.
    fn is_valid(&self) -> bool;

    /// Current pixel dimensions, if known.
    fn size(&self) -> Option<Viewport>;

    /// Clears to the scene background and draws the scene as one unit.
    fn present(&mut self, scene: &Scene) -> anyhow::Result<()>;
}

#[derive(Default)]
struct SlotInner {
    surface: Mutex<Option<Box<dyn Surface>>>,
    viewport: Mutex<Viewport>,
}

/// Shared holder for the attached surface.
///
/// Frames acquire the surface through [`SurfaceSlot::draw_with`], which holds
/// the lock for exactly the duration of one submission. The slot also keeps
/// the last viewport it saw so callers can read it without waiting on a frame.
#[derive(Clone, Default)]
pub struct SurfaceSlot {
    inner: Arc<SlotInner>,
}

impl std::fmt::Debug for SurfaceSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfaceSlot")
            .field("viewport", &self.viewport())
            .finish_non_exhaustive()
    }
}

impl SurfaceSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `surface`, returning the one it replaces.
    pub fn attach(&self, surface: Box<dyn Surface>) -> Option<Box<dyn Surface>> {
        if let Some(viewport) = surface.size() {
            self.publish_viewport(viewport);
        }
        let mut slot = self.lock_surface();
        slot.replace(surface)
    }

    /// Removes the surface. Blocks until any in-flight frame has been submitted.
    pub fn detach(&self) -> Option<Box<dyn Surface>> {
        self.lock_surface().take()
    }

    pub fn is_attached(&self) -> bool {
        self.lock_surface().is_some()
    }

    /// Last viewport reported by the surface.
    pub fn viewport(&self) -> Viewport {
        *self
            .inner
            .viewport
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Re-reads the surface size and publishes it.
    pub fn refresh_viewport(&self) -> Viewport {
        let size = self.lock_surface().as_ref().and_then(|surface| surface.size());
        match size {
            Some(viewport) => {
                self.publish_viewport(viewport);
                viewport
            }
            None => self.viewport(),
        }
    }

    /// Acquires the surface, composes a scene for its current size and presents it.
    ///
    /// Returns false when the frame was skipped: no surface, an invalid
    /// surface, an empty viewport, or a failed submission. The lock is released
    /// on every path.
    pub fn draw_with<F>(&self, compose: F) -> bool
    where
        F: FnOnce(Viewport) -> Scene,
    {
        let mut slot = self.lock_surface();
        let Some(surface) = slot.as_mut() else {
            tracing::trace!("No surface attached; skipping frame");
            return false;
        };

        if !surface.is_valid() {
            tracing::trace!("Surface not valid; skipping frame");
            return false;
        }

        let viewport = match surface.size() {
            Some(viewport) if !viewport.is_empty() => viewport,
            _ => {
                tracing::trace!("Surface has no area; skipping frame");
                return false;
            }
        };
        self.publish_viewport(viewport);

        let scene = compose(viewport);
        match surface.present(&scene) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to present frame: {e}");
                false
            }
        }
    }

    fn publish_viewport(&self, viewport: Viewport) {
        *self
            .inner
            .viewport
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = viewport;
    }

    fn lock_surface(&self) -> std::sync::MutexGuard<'_, Option<Box<dyn Surface>>> {
        self.inner
            .surface
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Headless surface that records every presented scene.
///
/// Clones share the same log and validity flag, so a test can keep one
/// handle while the renderer owns another.
#[derive(Debug, Clone)]
pub struct MemorySurface {
    viewport: Viewport,
    valid: Arc<AtomicBool>,
    scenes: Arc<Mutex<Vec<Scene>>>,
}

impl MemorySurface {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            valid: Arc::new(AtomicBool::new(true)),
            scenes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn set_valid(&self, valid: bool) {
        self.valid.store(valid, Ordering::Release);
    }

    pub fn frame_count(&self) -> usize {
        self.lock_scenes().len()
    }

    pub fn last_scene(&self) -> Option<Scene> {
        self.lock_scenes().last().cloned()
    }

    pub fn scenes(&self) -> Vec<Scene> {
        self.lock_scenes().clone()
    }

    fn lock_scenes(&self) -> std::sync::MutexGuard<'_, Vec<Scene>> {
        self.scenes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Surface for MemorySurface {
    fn is_valid(&self) -> bool {
        self.valid.load(Ordering::Acquire)
    }

    fn size(&self) -> Option<Viewport> {
        Some(self.viewport)
    }

    fn present(&mut self, scene: &Scene) -> anyhow::Result<()> {
        self.lock_scenes().push(scene.clone());
        Ok(())
    }
}
