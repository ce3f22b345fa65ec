/// Globe Engine - planet-scale geometry pipeline on a software rasterizer
/// Split-precision instanced markers and screen-space polylines, each with
/// colour, picking and depth passes
pub mod camera;
pub mod error;
pub mod frame;
pub mod geo_object;
pub mod logging;
pub mod perf;
pub mod polyline;
pub mod precision;
pub mod program;
pub mod rendering;
pub mod scale_law;

pub use camera::{CameraFrame, GlobeCamera};
pub use error::{RenderError, Result};
pub use frame::FrameContext;
pub use geo_object::{
    draw_geo_objects, geo_object, geo_object_depth, geo_object_picking, GeoObjectBuffer,
    GeoObjectInstance, GeoObjectStyle, LocalMesh, Material, MeshVertex,
};
pub use logging::{init_logging, LoggingConfig};
pub use perf::{CounterSnapshot, FunctionCounters, PerfStats, PerfTimer, FUNCTION_COUNTERS};
pub use polyline::{
    polyline_picking, polyline_screen, tessellate_ribbon, Order, PolylineBuilder,
    PolylineGeometry, PolylineStyle, PolylineVertexWindow, VisibleSphere,
};
pub use precision::{camera_relative_delta, rte_view_matrix, RteTransform, SplitCoordinate};
pub use program::{Program, UniformBindings, UniformType, UniformValue};
pub use rendering::{DrawStats, Framebuffer, RasterConfig, Rasterizer, Texture};
pub use scale_law::DistanceScaleLaw;
