/// Represents a single acquired frame.
///
/// Short-lived: holding the surface texture blocks acquisition of the next one.
/// [`Gpu::submit`](super::Gpu::submit) consumes the encoder and hands the
/// texture back for presentation.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}
