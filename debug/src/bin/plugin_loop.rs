//! Host loop without a window: ReefPlugin as RenderBackend, one triangle, one off-screen frame.

use reef_bridge::ReefPlugin;
use render_api::{DrawItem, DrawSource, ExtractedFrame, ModelData, RenderBackend, SubMesh, IDENTITY_MATRIX};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let (device, queue) = pollster::block_on(request_device())?;
    let mut backend: Box<dyn RenderBackend> = Box::new(ReefPlugin::new(device, queue).map_err(anyhow::Error::msg)?);

    let triangle = SubMesh {
        positions: vec![[0.0, 0.5, 0.0], [-0.5, -0.5, 0.0], [0.5, -0.5, 0.0]],
        normals: vec![[0.0, 0.0, 1.0]; 3],
        texcoords: Vec::new(),
        diffuse_color: [1.0, 0.5, 0.2],
        has_color: true,
        vertex_count: 3,
    };
    let data = ModelData::from_sub_mesh(triangle);
    let mesh = backend.upload_mesh("triangle", &data, 1.0);

    let frame = ExtractedFrame {
        view: IDENTITY_MATRIX,
        proj: IDENTITY_MATRIX,
        viewport_size: (800, 600),
        draws: vec![DrawItem {
            source: DrawSource::Model(0),
            mesh,
            texture: None,
            model: IDENTITY_MATRIX,
            diffuse_color: data.resolved_color(),
            fish_color: [1.0, 1.0, 1.0],
            vertex_count: data.point_count as u32,
        }],
        ..ExtractedFrame::default()
    };
    backend.render_frame(&frame).map_err(anyhow::Error::msg)?;
    log::info!("plugin_loop: one frame OK");
    Ok(())
}

async fn request_device() -> anyhow::Result<(wgpu::Device, wgpu::Queue)> {
    let instance = wgpu::Instance::default();
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions::default())
        .await
        .ok_or_else(|| anyhow::anyhow!("no adapter"))?;
    Ok(adapter.request_device(&wgpu::DeviceDescriptor::default(), None).await?)
}
