use egui::{Context, TextureHandle, TextureId, TextureOptions};

use crate::renderer::Surface;

/// Keeps one GPU texture in sync with one raster [`Surface`].
///
/// The surface bumps its version every time it is cleared, so the texture is
/// only re-uploaded on frames where something was actually repainted or the
/// surface was recreated at another size.
pub struct SurfaceTexture {
    name: &'static str,
    handle: Option<TextureHandle>,
    /// Version and size of the surface last uploaded
    uploaded: Option<(u64, [u32; 2])>,
    uploads: u64,
}

impl SurfaceTexture {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            handle: None,
            uploaded: None,
            uploads: 0,
        }
    }

    /// Texture showing `surface`, uploading it first if it changed.
    pub fn texture_id(&mut self, ctx: &Context, surface: &Surface) -> TextureId {
        let current = (surface.version(), [surface.width(), surface.height()]);
        if let Some(handle) = &self.handle {
            if self.uploaded == Some(current) {
                return handle.id();
            }
        }

        let image = surface.to_color_image();
        let id = match &mut self.handle {
            Some(handle) => {
                handle.set(image, TextureOptions::NEAREST);
                handle.id()
            }
            None => {
                let handle = ctx.load_texture(self.name, image, TextureOptions::NEAREST);
                let id = handle.id();
                self.handle = Some(handle);
                id
            }
        };
        self.uploaded = Some(current);
        self.uploads += 1;
        log::trace!("uploaded {} v{} (upload #{})", self.name, surface.version(), self.uploads);
        id
    }

    #[cfg(test)]
    fn uploads(&self) -> u64 {
        self.uploads
    }
}
